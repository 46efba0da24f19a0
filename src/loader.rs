//! Replaces the contents of the destination table with the uploaded dataset.

use crate::{
    Database, Dataset, LoadPlan, LoaderResult, Session, StagedFile, TargetTable, count_sql,
    load_sql, truncate_sql,
};

/// What happened when the replacement was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The table was truncated and reloaded; `rows` is the count read back afterwards.
    Loaded { rows: u64 },
    /// The dataset had no rows. Nothing was staged and the database was not touched.
    EmptyInput,
}

impl LoadOutcome {
    /// The text shown to the user for this outcome.
    pub fn message(&self, target: &TargetTable) -> String {
        match self {
            LoadOutcome::Loaded { rows } => format!(
                "Load completed. Rows currently in `{}`: {}.",
                target.table, rows
            ),
            LoadOutcome::EmptyInput => "The file has no rows. Nothing was loaded.".to_string(),
        }
    }

    /// True for outcomes shown as a warning rather than a success.
    pub fn is_warning(&self) -> bool {
        matches!(self, LoadOutcome::EmptyInput)
    }
}

/// Truncates `target` and bulk-loads `dataset` into it.
///
/// ### Steps
/// 1. Empty dataset: return `EmptyInput` without staging or connecting.
/// 2. Build the load plan (header names are checked here).
/// 3. Stage the rows in a temporary CSV file.
/// 4. Open a session that may read only that file.
/// 5. `TRUNCATE`, `LOAD DATA LOCAL INFILE`, `COMMIT`, `SELECT COUNT(*)`.
/// 6. Close the session.
///
/// The staged file is dropped (and deleted) when this function returns, on every path.
/// A failure after the `TRUNCATE` leaves the table empty; it is not restored.
///
/// ### Returns
/// The outcome, or the first error encountered (its text is meant to be shown verbatim).
pub async fn replace_table(
    db: &dyn Database,
    dataset: &Dataset,
    target: &TargetTable,
) -> LoaderResult<LoadOutcome> {
    // 1. Nothing to load.
    if dataset.is_empty() {
        tracing::warn!(
            "{:?} has no data rows; {} left untouched.",
            dataset.settings.absolute_path,
            target
        );
        return Ok(LoadOutcome::EmptyInput);
    }

    // 2. Plan.
    let plan = LoadPlan::for_dataset(dataset)?;
    tracing::debug!("Load plan for {target}: {plan:?}");

    // 3. Stage.
    let staged = StagedFile::write(&dataset.df, plan.include_header()).await?;
    tracing::info!(
        "Staged {} rows for {} in {:?}",
        staged.rows(),
        target,
        staged.path()
    );

    // 4. Connect.
    let mut session = db.open(staged.path()).await?;

    // 5. Run the statements. The session is closed whether or not they succeed.
    let result = run_statements(session.as_mut(), &staged, &plan, target).await;

    // 6. Close.
    match (result, session.close().await) {
        (Ok(rows), Ok(())) => {
            tracing::info!("{target} reloaded: {rows} rows.");
            Ok(LoadOutcome::Loaded { rows })
        }
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), close_result) => {
            if let Err(close_error) = close_result {
                tracing::warn!("Closing the session after a failed load also failed: {close_error}");
            }
            tracing::error!("Load into {target} failed: {error}");
            Err(error)
        }
    }
}

/// TRUNCATE, LOAD, COMMIT and COUNT, in that order, stopping at the first error.
async fn run_statements(
    session: &mut dyn Session,
    staged: &StagedFile,
    plan: &LoadPlan,
    target: &TargetTable,
) -> LoaderResult<u64> {
    session.execute(&truncate_sql(target)).await?;
    tracing::info!("{target} truncated.");

    session
        .execute(&load_sql(target, staged.path(), plan))
        .await?;

    session.execute("COMMIT;").await?;

    session.query_count(&count_sql(target)).await
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_loader`
#[cfg(test)]
mod tests_loader {
    use super::*;
    use crate::{
        DbConfig, LoadMode, LoadSettings, LoaderError, MySqlDatabase, database::mock::MockDatabase,
    };
    use polars::prelude::*;
    use std::{path::PathBuf, sync::Arc};

    fn dataset(df: DataFrame, mode: LoadMode) -> Dataset {
        Dataset {
            df: Arc::new(df),
            settings: Arc::new(LoadSettings {
                absolute_path: PathBuf::from("modelo.csv"),
                mode,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn header_dataset() -> PolarsResult<Dataset> {
        let df = df!(
            "id" => &["1", "2", "3"],
            "name" => &["a", "b", "c"],
            "amount" => &["10", "20", "30"],
        )?;
        Ok(dataset(df, LoadMode::HeaderMapped))
    }

    fn positional_dataset() -> PolarsResult<Dataset> {
        let df = df!(
            "A" => &["1", "2"],
            "B" => &["x", "y"],
        )?;
        Ok(dataset(df, LoadMode::Positional))
    }

    #[tokio::test]
    async fn test_empty_input_touches_nothing() -> LoaderResult<()> {
        let empty = df!("id" => Vec::<String>::new())?;
        let db = MockDatabase::default();
        let target = TargetTable::default();

        let outcome = replace_table(&db, &dataset(empty, LoadMode::HeaderMapped), &target).await?;

        assert_eq!(outcome, LoadOutcome::EmptyInput);
        assert!(outcome.is_warning());
        assert_eq!(db.journal().opened, 0);
        assert!(db.journal().statements.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_columns_is_empty_input() -> LoaderResult<()> {
        let db = MockDatabase::default();
        let outcome = replace_table(
            &db,
            &dataset(DataFrame::empty(), LoadMode::Positional),
            &TargetTable::default(),
        )
        .await?;

        assert_eq!(outcome, LoadOutcome::EmptyInput);
        assert_eq!(db.journal().opened, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_header_mapped_statement_sequence() -> LoaderResult<()> {
        let db = MockDatabase {
            count: 3,
            ..Default::default()
        };
        let target = TargetTable::default();

        let outcome = replace_table(&db, &header_dataset()?, &target).await?;
        assert_eq!(outcome, LoadOutcome::Loaded { rows: 3 });
        assert_eq!(
            outcome.message(&target),
            "Load completed. Rows currently in `modelo_ap`: 3."
        );

        let journal = db.journal();
        let staged_path = journal.staged_path.clone().expect("open was called");
        println!("statements: {:#?}", journal.statements);

        assert_eq!(
            journal.statements,
            [
                "TRUNCATE TABLE `app_marco_new`.`modelo_ap`;".to_string(),
                load_sql(
                    &target,
                    &staged_path,
                    &LoadPlan::HeaderMapped {
                        columns: vec!["id".into(), "name".into(), "amount".into()]
                    }
                ),
                "COMMIT;".to_string(),
                "SELECT COUNT(*) FROM `app_marco_new`.`modelo_ap`;".to_string(),
            ]
        );
        assert!(journal.statements[1].contains("IGNORE 1 ROWS (`id`, `name`, `amount`)"));
        assert_eq!(
            journal.staged_content.as_deref(),
            Some("id,name,amount\n1,a,10\n2,b,20\n3,c,30\n")
        );
        assert_eq!(journal.closed, 1);

        // Removed after success.
        assert!(!staged_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_positional_load_has_no_header() -> LoaderResult<()> {
        let db = MockDatabase {
            count: 2,
            ..Default::default()
        };

        let outcome = replace_table(&db, &positional_dataset()?, &TargetTable::default()).await?;
        assert_eq!(outcome, LoadOutcome::Loaded { rows: 2 });

        let journal = db.journal();
        let load = &journal.statements[1];
        assert!(load.starts_with("LOAD DATA LOCAL INFILE"));
        assert!(!load.contains("IGNORE 1 ROWS"));
        assert!(!load.contains("(`A`"));
        assert_eq!(journal.staged_content.as_deref(), Some("1,x\n2,y\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_after_truncate_is_surfaced() -> LoaderResult<()> {
        let db = MockDatabase {
            fail_on: Some("LOAD DATA"),
            ..Default::default()
        };

        let result = replace_table(&db, &header_dataset()?, &TargetTable::default()).await;

        let error = result.expect_err("the load must fail");
        assert_eq!(error.to_string(), "Other error: mock server rejected: LOAD DATA");

        let journal = db.journal();
        // TRUNCATE ran before the failure; nothing after it.
        assert_eq!(journal.statements.len(), 2);
        assert!(journal.statements[0].starts_with("TRUNCATE"));
        assert_eq!(journal.closed, 1);

        // Removed after failure too.
        let staged_path = journal.staged_path.clone().expect("open was called");
        assert!(!staged_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_failure_removes_staged_file() -> LoaderResult<()> {
        let db = MockDatabase {
            fail_open: true,
            ..Default::default()
        };

        let result = replace_table(&db, &header_dataset()?, &TargetTable::default()).await;
        assert!(result.is_err());

        let journal = db.journal();
        assert!(journal.statements.is_empty());
        let staged_path = journal.staged_path.clone().expect("open was called");
        assert!(!staged_path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_header_fails_before_database() -> LoaderResult<()> {
        let df = df!("id" => &["1"], "ID" => &["2"])?;
        let db = MockDatabase::default();

        let result = replace_table(
            &db,
            &dataset(df, LoadMode::HeaderMapped),
            &TargetTable::default(),
        )
        .await;

        assert!(matches!(result, Err(LoaderError::InvalidHeader(_))));
        assert_eq!(db.journal().opened, 0);
        Ok(())
    }

    #[test]
    fn test_outcome_messages() {
        let target = TargetTable::default();
        assert_eq!(
            LoadOutcome::Loaded { rows: 0 }.message(&target),
            "Load completed. Rows currently in `modelo_ap`: 0."
        );
        assert!(LoadOutcome::EmptyInput.message(&target).contains("no rows"));
        assert!(!LoadOutcome::Loaded { rows: 1 }.is_warning());
    }

    /// Loads a three-row file into a real server.
    ///
    /// Needs `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and a table
    /// `app_marco_new.modelo_ap (id, name, amount)` with `local_infile` enabled:
    /// `cargo test -- --ignored test_live_mysql_replace`
    #[tokio::test]
    #[ignore]
    async fn test_live_mysql_replace() -> LoaderResult<()> {
        let args = crate::Arguments {
            db_host: std::env::var("DB_HOST").ok(),
            db_port: std::env::var("DB_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(crate::DEFAULT_DB_PORT),
            db_user: std::env::var("DB_USER").ok(),
            db_password: std::env::var("DB_PASSWORD").ok(),
            db_name: std::env::var("DB_NAME").ok(),
            ..Default::default()
        };
        let db = MySqlDatabase::new(DbConfig::from_args(&args)?);
        let target = TargetTable::default();

        let outcome = replace_table(&db, &header_dataset()?, &target).await?;
        println!("{}", outcome.message(&target));

        assert_eq!(outcome, LoadOutcome::Loaded { rows: 3 });
        Ok(())
    }
}
