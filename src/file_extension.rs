use crate::PathExtension;
use std::path::Path;

/// Represents the extension of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileExtension {
    /// CSV file extension.
    Csv,
    /// Spreadsheet workbook (xlsx, xlsm, xls, ods). Only the first sheet is read.
    Workbook,
    /// Unknown file extension, storing the extension as a string.
    Unknown(String),
    /// Missing file extension, when no extension is present in the path.
    Missing,
}

impl FileExtension {
    /// Determines the file extension from a given path.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension_as_lowercase()
            .as_deref() // Converts `Option<String>` to `Option<&str>` for matching.
        {
            Some("csv") => FileExtension::Csv,
            Some("xlsx" | "xlsm" | "xls" | "ods") => FileExtension::Workbook,
            Some(ext) => FileExtension::Unknown(ext.to_owned()),
            None => FileExtension::Missing,
        }
    }
}

#[cfg(test)]
mod tests_file_extension {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FileExtension::from_path(Path::new("data.csv")), FileExtension::Csv);
        assert_eq!(FileExtension::from_path(Path::new("DATA.CSV")), FileExtension::Csv);
        assert_eq!(
            FileExtension::from_path(Path::new("/tmp/modelo.xlsx")),
            FileExtension::Workbook
        );
        assert_eq!(
            FileExtension::from_path(Path::new("old.XLS")),
            FileExtension::Workbook
        );
        assert_eq!(
            FileExtension::from_path(Path::new("data.parquet")),
            FileExtension::Unknown("parquet".to_string())
        );
        assert_eq!(FileExtension::from_path(Path::new("data")), FileExtension::Missing);
    }
}
