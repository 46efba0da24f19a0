//! Load plans and the SQL statements of the truncate-then-load sequence.

use crate::{Dataset, LoadMode, LoaderError, LoaderResult};

use std::{collections::HashSet, fmt, path::Path};

/// Destination schema used when none is given on the command line.
pub const DEFAULT_SCHEMA: &str = "app_marco_new";

/// Destination table used when none is given on the command line.
pub const DEFAULT_TABLE: &str = "modelo_ap";

/// The single table whose contents are replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub schema: String,
    pub table: String,
}

impl Default for TargetTable {
    fn default() -> Self {
        TargetTable {
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl fmt::Display for TargetTable {
    /// Renders the fully qualified, backtick-quoted name: `` `schema`.`table` ``.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.table)
        )
    }
}

/// How the staged file's fields map onto the destination columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// The staged file starts with a header line (skipped by the server) and
    /// fields go to the named columns, in this order.
    HeaderMapped { columns: Vec<String> },
    /// The staged file has no header; fields go to the table's columns in
    /// their native order.
    Positional,
}

impl LoadPlan {
    /// Derives the plan from a parsed dataset.
    ///
    /// ### Errors
    /// `InvalidHeader` when a header-mapped dataset has blank or duplicate column names.
    pub fn for_dataset(dataset: &Dataset) -> LoaderResult<Self> {
        match dataset.settings.mode {
            LoadMode::HeaderMapped => {
                let columns = dataset.labels();
                check_header_names(&columns)?;
                Ok(LoadPlan::HeaderMapped { columns })
            }
            LoadMode::Positional => Ok(LoadPlan::Positional),
        }
    }

    /// Whether the staged file carries the header line.
    pub fn include_header(&self) -> bool {
        matches!(self, LoadPlan::HeaderMapped { .. })
    }
}

/// Rejects header rows that cannot name destination columns: blank names and duplicates.
///
/// Names are compared case-insensitively, as MySQL column names are.
pub fn check_header_names<S: AsRef<str>>(names: &[S]) -> LoaderResult<()> {
    if names.is_empty() {
        return Err(LoaderError::InvalidHeader(
            "the header row has no columns".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for (index, name) in names.iter().map(AsRef::as_ref).enumerate() {
        if name.trim().is_empty() {
            return Err(LoaderError::InvalidHeader(format!(
                "column {} has an empty name",
                index + 1
            )));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(LoaderError::InvalidHeader(format!(
                "column name '{name}' appears more than once"
            )));
        }
    }

    Ok(())
}

/// Quotes a MySQL identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Escapes a file path for use inside a single-quoted SQL string literal.
/// Backslashes (Windows separators) are doubled first, then single quotes.
fn quote_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `TRUNCATE TABLE <target>;`
pub fn truncate_sql(target: &TargetTable) -> String {
    format!("TRUNCATE TABLE {target};")
}

/// `SELECT COUNT(*) FROM <target>;`
pub fn count_sql(target: &TargetTable) -> String {
    format!("SELECT COUNT(*) FROM {target};")
}

/// Builds the `LOAD DATA LOCAL INFILE` statement for the staged file.
///
/// The field format matches what `StagedFile::write` produces: comma separated,
/// double-quote enclosed, quotes escaped by doubling, `\n` line terminator.
/// Header-mapped plans add `IGNORE 1 ROWS` and the destination column list.
pub fn load_sql(target: &TargetTable, path: &Path, plan: &LoadPlan) -> String {
    let mut sql = format!(
        "LOAD DATA LOCAL INFILE {path} \
        INTO TABLE {target} \
        CHARACTER SET utf8mb4 \
        FIELDS TERMINATED BY ',' ENCLOSED BY '\"' ESCAPED BY '\"' \
        LINES TERMINATED BY '\\n'",
        path = quote_path(path),
    );

    if let LoadPlan::HeaderMapped { columns } = plan {
        let column_list = columns
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" IGNORE 1 ROWS ({column_list})"));
    }

    sql.push(';');
    sql
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_plan`
#[cfg(test)]
mod tests_plan {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_target_table_display() {
        assert_eq!(
            TargetTable::default().to_string(),
            "`app_marco_new`.`modelo_ap`"
        );

        let odd = TargetTable {
            schema: "my`db".to_string(),
            table: "t".to_string(),
        };
        assert_eq!(odd.to_string(), "`my``db`.`t`");
    }

    #[test]
    fn test_truncate_and_count_sql() {
        let target = TargetTable::default();
        assert_eq!(
            truncate_sql(&target),
            "TRUNCATE TABLE `app_marco_new`.`modelo_ap`;"
        );
        assert_eq!(
            count_sql(&target),
            "SELECT COUNT(*) FROM `app_marco_new`.`modelo_ap`;"
        );
    }

    #[test]
    fn test_load_sql_header_mapped() {
        let plan = LoadPlan::HeaderMapped {
            columns: vec!["id".to_string(), "name".to_string(), "amount".to_string()],
        };
        let sql = load_sql(&TargetTable::default(), Path::new("/tmp/load-1.csv"), &plan);

        assert_eq!(
            sql,
            "LOAD DATA LOCAL INFILE '/tmp/load-1.csv' \
            INTO TABLE `app_marco_new`.`modelo_ap` \
            CHARACTER SET utf8mb4 \
            FIELDS TERMINATED BY ',' ENCLOSED BY '\"' ESCAPED BY '\"' \
            LINES TERMINATED BY '\\n' \
            IGNORE 1 ROWS (`id`, `name`, `amount`);"
        );
    }

    #[test]
    fn test_load_sql_positional_has_no_header_skip_or_columns() {
        let sql = load_sql(
            &TargetTable::default(),
            Path::new("/tmp/load-2.csv"),
            &LoadPlan::Positional,
        );

        assert!(sql.ends_with("LINES TERMINATED BY '\\n';"));
        assert!(!sql.contains("IGNORE"));
        assert!(!sql.contains('('));
    }

    #[test]
    fn test_quote_path_escapes_backslashes_and_quotes() {
        let path = PathBuf::from(r"C:\Temp\o'brien.csv");
        assert_eq!(quote_path(&path), r"'C:\\Temp\\o\'brien.csv'");
    }

    #[test]
    fn test_check_header_names() {
        assert!(check_header_names(&["id", "name", "amount"]).is_ok());

        for bad in [
            vec![],
            vec!["id", ""],
            vec!["id", "   "],
            vec!["id", "name", "ID"],
        ] {
            assert!(
                matches!(check_header_names(&bad), Err(LoaderError::InvalidHeader(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_plan_include_header() {
        assert!(LoadPlan::HeaderMapped { columns: vec![] }.include_header());
        assert!(!LoadPlan::Positional.include_header());
    }
}
