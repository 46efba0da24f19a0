//! Database sessions used by the truncate-then-load flow.
//!
//! The flow only needs three things from a connection: run a statement, read one
//! count, and close. `Database` and `Session` capture exactly that, so the flow can
//! run against MySQL in production and against a recording mock in tests.

use crate::{Arguments, LoaderError, LoaderResult};

use mysql_async::{Conn, OptsBuilder, WhiteListFsHandler, prelude::Queryable};
use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
};

/// Boxed future returned by the object-safe database traits.
pub type DbFuture<'a, T> = Pin<Box<dyn Future<Output = LoaderResult<T>> + Send + 'a>>;

/// Something that can open a session allowed to read one staged file.
pub trait Database: Send + Sync {
    /// Opens a session. The server may read `staged_file` (and nothing else)
    /// through `LOAD DATA LOCAL INFILE`.
    fn open<'a>(&'a self, staged_file: &'a Path) -> DbFuture<'a, Box<dyn Session>>;
}

/// One open database session.
pub trait Session: Send {
    /// Runs a statement and discards any result set.
    fn execute<'a>(&'a mut self, statement: &'a str) -> DbFuture<'a, ()>;

    /// Runs a statement whose first column of the first row is a count.
    fn query_count<'a>(&'a mut self, statement: &'a str) -> DbFuture<'a, u64>;

    /// Closes the session.
    fn close(self: Box<Self>) -> DbFuture<'static, ()>;
}

/// Connection settings for the MySQL server.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

// The password is never printed, not even in debug logs.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("database", &self.database)
            .finish()
    }
}

impl DbConfig {
    /// Builds the connection settings from the command line (or its environment fallbacks).
    ///
    /// ### Errors
    /// `MissingConfig` naming the first absent or blank setting among host, user and database.
    /// The password may be absent (accounts without a password).
    pub fn from_args(args: &Arguments) -> LoaderResult<Self> {
        fn required(
            value: &Option<String>,
            name: &'static str,
            flag: &'static str,
            env: &'static str,
        ) -> LoaderResult<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(LoaderError::MissingConfig { name, flag, env })
        }

        Ok(DbConfig {
            host: required(&args.db_host, "host", "db-host", "DB_HOST")?,
            port: args.db_port,
            user: required(&args.db_user, "user", "db-user", "DB_USER")?,
            password: args.db_password.clone(),
            database: required(&args.db_name, "database", "db-name", "DB_NAME")?,
        })
    }
}

/// MySQL implementation of `Database`, backed by `mysql_async`.
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    config: DbConfig,
}

impl MySqlDatabase {
    pub fn new(config: DbConfig) -> Self {
        MySqlDatabase { config }
    }

    /// Connection options: utf8mb4 session, local infile limited to `staged_file`.
    fn options(&self, staged_file: &Path) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(self.config.password.clone())
            .db_name(Some(self.config.database.clone()))
            .init(vec!["SET NAMES utf8mb4"])
            .local_infile_handler(Some(WhiteListFsHandler::new([
                staged_file.to_path_buf()
            ])))
    }
}

impl Database for MySqlDatabase {
    fn open<'a>(&'a self, staged_file: &'a Path) -> DbFuture<'a, Box<dyn Session>> {
        Box::pin(async move {
            tracing::info!(
                "Connecting to MySQL at {}:{} (database: {}, user: {})",
                self.config.host,
                self.config.port,
                self.config.database,
                self.config.user
            );

            let conn = Conn::new(self.options(staged_file)).await?;
            let session: Box<dyn Session> = Box::new(MySqlSession { conn });
            Ok(session)
        })
    }
}

/// An open `mysql_async` connection.
struct MySqlSession {
    conn: Conn,
}

impl Session for MySqlSession {
    fn execute<'a>(&'a mut self, statement: &'a str) -> DbFuture<'a, ()> {
        Box::pin(async move {
            tracing::debug!("execute: {statement}");
            self.conn.query_drop(statement).await?;
            Ok(())
        })
    }

    fn query_count<'a>(&'a mut self, statement: &'a str) -> DbFuture<'a, u64> {
        Box::pin(async move {
            tracing::debug!("query: {statement}");
            let count: Option<u64> = self.conn.query_first(statement).await?;
            Ok(count.unwrap_or_default())
        })
    }

    fn close(self: Box<Self>) -> DbFuture<'static, ()> {
        Box::pin(async move {
            self.conn.disconnect().await?;
            tracing::debug!("MySQL session closed");
            Ok(())
        })
    }
}


//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_database`
#[cfg(test)]
mod tests_database {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_config_from_args() -> LoaderResult<()> {
        let args = Arguments::try_parse_from([
            "polars-load",
            "--db-host",
            "db.local",
            "--db-user",
            "loader",
            "--db-password",
            "secret",
            "--db-name",
            "app_marco_new",
        ])
        .map_err(|e| LoaderError::Other(e.to_string()))?;

        let config = DbConfig::from_args(&args)?;

        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 3306);
        assert_eq!(config.user, "loader");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.database, "app_marco_new");
        Ok(())
    }

    #[test]
    fn test_config_missing_host() {
        let args = Arguments {
            db_host: None,
            db_user: Some("loader".to_string()),
            db_name: Some("db".to_string()),
            ..Default::default()
        };

        let result = DbConfig::from_args(&args);
        assert!(matches!(
            result,
            Err(LoaderError::MissingConfig { name: "host", .. })
        ));
    }

    #[test]
    fn test_config_blank_user_is_missing() {
        let args = Arguments {
            db_host: Some("localhost".to_string()),
            db_user: Some("   ".to_string()),
            db_name: Some("db".to_string()),
            ..Default::default()
        };

        let error = DbConfig::from_args(&args).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Missing database setting 'user' (use --db-user or the DB_USER environment variable)"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DbConfig {
            host: "h".to_string(),
            port: 3306,
            user: "u".to_string(),
            password: Some("hunter2".to_string()),
            database: "d".to_string(),
        };

        let text = format!("{config:?}");
        println!("{text}");
        assert!(!text.contains("hunter2"));
        assert!(text.contains("********"));
    }
}
