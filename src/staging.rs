//! Temporary delimited file handed to `LOAD DATA LOCAL INFILE`.

use crate::{LoaderResult, execute_blocking};

use polars::prelude::*;
use std::{io::Write, path::Path};
use tempfile::{Builder, TempPath};

/// A CSV copy of the dataset on disk, removed when dropped.
///
/// Removal is best effort: `TempPath` ignores deletion errors on drop, which is
/// exactly the "suppress, never surface" policy for the staging file.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    rows: usize,
}

impl StagedFile {
    /// Writes `df` to a new temporary `.csv` file on a blocking thread.
    ///
    /// Format: `,` separator, `"` quoting (embedded quotes doubled), `\n` line
    /// terminator, nulls as empty fields. The header line is written only when
    /// `include_header` is set.
    pub async fn write(df: &DataFrame, include_header: bool) -> LoaderResult<Self> {
        // Cheap clone: columns are reference counted.
        let mut df = df.clone();

        execute_blocking(move || {
            let mut file = Builder::new()
                .prefix("polars-load-")
                .suffix(".csv")
                .tempfile()?;

            CsvWriter::new(file.as_file_mut())
                .include_header(include_header)
                .with_separator(b',')
                .with_quote_char(b'"')
                .with_quote_style(QuoteStyle::Necessary)
                .finish(&mut df)?;

            file.as_file_mut().flush()?;

            let rows = df.height();
            let path = file.into_temp_path();

            tracing::debug!(
                "Staged {} rows (header: {}) in {:?}",
                rows,
                include_header,
                path
            );

            Ok(StagedFile { path, rows })
        })
        .await
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_staging`
#[cfg(test)]
mod tests_staging {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df!(
            "id" => &["1", "2"],
            "name" => &[Some("Ana \"the\" first"), None],
            "note" => &["a,b", "plain"],
        )
    }

    #[tokio::test]
    async fn test_write_with_header() -> LoaderResult<()> {
        let staged = StagedFile::write(&sample()?, true).await?;
        let content = std::fs::read_to_string(staged.path())?;
        println!("{content}");

        assert_eq!(
            content,
            "id,name,note\n1,\"Ana \"\"the\"\" first\",\"a,b\"\n2,,plain\n"
        );
        assert_eq!(staged.rows(), 2);
        assert_eq!(
            staged.path().extension().and_then(|e| e.to_str()),
            Some("csv")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_write_without_header() -> LoaderResult<()> {
        let staged = StagedFile::write(&sample()?, false).await?;
        let content = std::fs::read_to_string(staged.path())?;

        assert_eq!(content, "1,\"Ana \"\"the\"\" first\",\"a,b\"\n2,,plain\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_file_removed_on_drop() -> LoaderResult<()> {
        let staged = StagedFile::write(&sample()?, true).await?;
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_after_external_removal_is_silent() -> LoaderResult<()> {
        let staged = StagedFile::write(&sample()?, false).await?;
        std::fs::remove_file(staged.path())?;
        drop(staged); // Must not panic.
        Ok(())
    }
}
