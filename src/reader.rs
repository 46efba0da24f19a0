//! Reads an uploaded CSV file or spreadsheet workbook into a Polars `DataFrame`.
//!
//! Every column is read as text. Values are only coerced to numbers by the sum preview
//! (`aggregate.rs`); the bulk load hands the text to the database untouched.

use crate::{
    FileExtension, LoadMode, LoaderError, LoaderResult, check_header_names, generate_labels,
};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveTime;
use polars::prelude::*;
use tokio::task::spawn_blocking;

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

/// Reads `path` according to its extension and the load `mode`.
///
/// In positional mode the columns are named with spreadsheet letters (`A`, `B`, ...).
///
/// ### Returns
/// The `DataFrame` and the detected `FileExtension`, or a `FileType` error for
/// unsupported or missing extensions.
pub async fn read_dataframe(
    path: &Path,
    mode: LoadMode,
) -> LoaderResult<(DataFrame, FileExtension)> {
    let extension = FileExtension::from_path(path);
    let owned_path = path.to_path_buf();

    let df = match &extension {
        FileExtension::Csv => read_csv_data(owned_path, mode).await?,
        FileExtension::Workbook => {
            execute_blocking(move || read_workbook_data(&owned_path, mode)).await?
        }
        FileExtension::Unknown(ext) => {
            return Err(LoaderError::FileType(format!(
                "Unsupported extension: `{}` for file: `{}`. Upload a CSV or XLSX file.",
                ext,
                path.display()
            )));
        }
        FileExtension::Missing => {
            return Err(LoaderError::FileType(format!(
                "Missing extension for file: `{}`",
                path.display()
            )));
        }
    };

    tracing::debug!(
        "fn read_dataframe(): loaded {:?} file in {:?} mode. Shape: {:?}",
        extension,
        mode,
        df.shape()
    );

    Ok((df, extension))
}

/// Reads a comma-separated file with every column as `String`.
///
/// - `with_has_header(false)`: the header line (header-mapped mode) is read as data and
///   promoted by `promote_header_row`, so repeated names reach `check_header_names` verbatim.
/// - `with_infer_schema_length(Some(0))`: no type inference, values keep their exact text.
/// - `with_missing_is_null(true)`: empty fields become nulls (written back as empty fields).
/// - A zero-byte file yields an empty `DataFrame` instead of a parse error.
async fn read_csv_data(path: PathBuf, mode: LoadMode) -> LoaderResult<DataFrame> {
    if std::fs::metadata(&path)?.len() == 0 {
        tracing::warn!("CSV file {:?} is empty.", path);
        return Ok(DataFrame::empty());
    }

    let csv_parse_options = CsvParseOptions::default()
        .with_encoding(CsvEncoding::LossyUtf8)
        .with_missing_is_null(true)
        .with_separator(b',');

    let csv_reader = CsvReadOptions::default()
        .with_parse_options(csv_parse_options)
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path))?;

    let mut df = execute_blocking(move || csv_reader.finish().map_err(LoaderError::from)).await?;

    match mode {
        LoadMode::HeaderMapped => promote_header_row(df),
        LoadMode::Positional => {
            df.set_column_names(&generate_labels(df.width()))?;
            Ok(df)
        }
    }
}

/// Uses the first row of `df` as column names and returns the remaining rows.
///
/// The names are checked with `check_header_names` before anything else happens.
fn promote_header_row(df: DataFrame) -> LoaderResult<DataFrame> {
    if df.height() == 0 {
        return Ok(DataFrame::empty());
    }

    let names = df
        .columns()
        .iter()
        .map(|column| {
            let values = column.str()?;
            Ok(values.get(0).unwrap_or_default().to_string())
        })
        .collect::<LoaderResult<Vec<String>>>()?;

    check_header_names(&names)?;

    let mut data = df.slice(1, df.height() - 1);
    data.set_column_names(&names)?;
    Ok(data)
}

/// Reads the first sheet of a workbook (xlsx, xlsm, xls, ods).
///
/// Cells are addressed from `A1`, whatever the first used cell is: a blank leading
/// column is kept as an all-null column so every field stays in its sheet position.
/// Header-mapped mode takes sheet row 1 as column names; positional mode names the
/// columns `A`, `B`, ...
fn read_workbook_data(path: &Path, mode: LoadMode) -> LoaderResult<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        tracing::warn!("Workbook {:?} has no sheets.", path);
        return Ok(DataFrame::empty());
    };

    let range = workbook.worksheet_range(&sheet_name)?;

    // Absolute, inclusive end of the used area; `None` for an empty sheet.
    let Some((last_row, last_col)) = range.end() else {
        tracing::warn!("Sheet '{}' of {:?} is empty.", sheet_name, path);
        return Ok(DataFrame::empty());
    };
    let (height, width) = (last_row as usize + 1, last_col as usize + 1);

    tracing::debug!(
        "Reading sheet '{}' of {:?}: {} rows x {} columns from A1 (used area starts at {:?})",
        sheet_name,
        path,
        height,
        width,
        range.start()
    );

    let cell_text = |row: usize, col: usize| -> Option<String> {
        range
            .get_value((row as u32, col as u32))
            .and_then(cell_to_text)
    };

    let (names, first_data_row): (Vec<String>, usize) = match mode {
        LoadMode::HeaderMapped => {
            let names: Vec<String> = (0..width)
                .map(|col| cell_text(0, col).unwrap_or_default())
                .collect();
            check_header_names(&names)?;
            (names, 1)
        }
        LoadMode::Positional => (generate_labels(width), 0),
    };

    let columns: Vec<Column> = names
        .into_iter()
        .enumerate()
        .map(|(col, name)| {
            let values: Vec<Option<String>> = (first_data_row..height)
                .map(|row| cell_text(row, col))
                .collect();
            Column::new(name.into(), values)
        })
        .collect();

    Ok(DataFrame::new_infer_height(columns)?)
}

/// Renders a workbook cell as text, or `None` for empty and error cells.
///
/// Whole floats are written without a decimal part (`3.0` -> `"3"`), since spreadsheets
/// store every number as a float.
pub fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(datetime) if datetime.time() == NaiveTime::MIN => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Executes a potentially blocking operation (file parsing, CSV writing) on a separate
/// Tokio blocking thread.
///
/// ### Returns
/// The closure's value, or `TokioJoin` if the blocking task panicked or was cancelled.
pub async fn execute_blocking<T, F>(op: F) -> LoaderResult<T>
where
    F: FnOnce() -> LoaderResult<T> + Send + 'static,
    T: Debug + Send + 'static,
{
    // Result<LoaderResult<T>, JoinError>
    spawn_blocking(op).await?
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
