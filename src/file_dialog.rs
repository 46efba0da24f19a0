use crate::{LoaderError, LoaderResult};

use rfd::AsyncFileDialog;
use std::path::PathBuf;

/// Opens a file dialog asynchronously, allowing the user to choose the file to load.
///
/// The dialog offers CSV and spreadsheet filters. If the user cancels, the function
/// returns a `LoaderError::FileNotFound` error with an empty path, which the caller
/// treats as "nothing to do".
///
/// ### Returns
///
/// - `Ok(PathBuf)`: The path to the selected file.
/// - `Err(LoaderError::FileNotFound)`: The dialog was cancelled.
pub async fn open_file() -> LoaderResult<PathBuf> {
    let opt_file = AsyncFileDialog::new()
        .set_title("Choose the file to load")
        .add_filter("CSV or Excel", &["csv", "xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .pick_file()
        .await;

    opt_file
        .map(|file| file.path().to_path_buf())
        .ok_or_else(|| LoaderError::FileNotFound(PathBuf::new()))
}

/// True when `error` only means the user closed the dialog without choosing a file.
pub fn is_dialog_cancelled(error: &LoaderError) -> bool {
    matches!(error, LoaderError::FileNotFound(path) if path.as_os_str().is_empty())
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
