use crate::{
    DEFAULT_PREVIEW_ROWS, DEFAULT_SCHEMA, DEFAULT_SUM_LABEL, DEFAULT_TABLE, LoaderError,
    LoaderResult, MAX_PREVIEW_ROWS, TargetTable,
};

use clap::Parser;
use clap::builder::TypedValueParser;
use regex::Regex;
use std::path::PathBuf;

// https://stackoverflow.com/questions/74068168/clap-rs-not-printing-colors-during-help
fn get_styles() -> clap::builder::Styles {
    let cyan = anstyle::Color::Ansi(anstyle::AnsiColor::Cyan);
    let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
    let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);

    clap::builder::Styles::styled()
        .placeholder(anstyle::Style::new().fg_color(Some(yellow)))
        .usage(anstyle::Style::new().fg_color(Some(cyan)).bold())
        .header(
            anstyle::Style::new()
                .fg_color(Some(cyan))
                .bold()
                .underline(),
        )
        .literal(anstyle::Style::new().fg_color(Some(green)))
}

// https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template
const APPLET_TEMPLATE: &str = "\
{before-help}
{about-with-newline}
{usage-heading} {usage}

{all-args}
{after-help}";

const EX1: &str = r#" polars-load modelo.csv"#;
const EX2: &str = r#" polars-load -p --sum-column K modelo.xlsx"#;
const EX3: &str = r#" DB_HOST=db DB_USER=loader DB_NAME=app_marco_new polars-load -y modelo.csv"#;

/// Default MySQL port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Plain MySQL identifier: letter or underscore first, then letters, digits, `_` or `$`.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$]{0,63}$";

/// Command-line arguments for the Polars Load application.
#[derive(Parser, Debug, Clone)]
#[command(
    // Read from `Cargo.toml`.
    author, version, about,
    long_about = None,
    next_line_help = true,
    help_template = APPLET_TEMPLATE,
    styles=get_styles(),
    after_help = format!("EXAMPLES:\n{EX1}\n{EX2}\n{EX3}")
)]
pub struct Arguments {
    /// Optional path to the file to load (CSV or XLSX).
    #[arg(
        value_name = "FILE_PATH",
        default_value = ".",
        required = false,
        help = "Path to the CSV/XLSX file to load [Optional]",
        long_help = "Path to the input file.\n\
        If omitted, opens the UI to pick a file manually (menu or drag-drop)."
    )]
    pub path: PathBuf,

    /// Read the file without a header row and load its columns by position.
    #[arg(
        short = 'p',
        long,
        help = "Headerless file: label columns A, B, C... and load them by position",
        long_help = "\
Treats every line of the file as data. Columns are labelled like a spreadsheet
(A, B, ..., Z, AA, ...) and loaded into the destination table in its native
column order. Shows the sum of one numeric column before loading.",
        action = clap::ArgAction::SetTrue
    )]
    pub positional: bool,

    /// Column summed in positional mode. [Default: N]
    #[arg(
        long,
        value_name = "LABEL",
        default_value = DEFAULT_SUM_LABEL,
        help = "Column label to sum in positional mode (falls back to the first column)",
        value_parser = validate_sum_label
    )]
    pub sum_column: String,

    /// Number of rows shown in the preview. [Default: 100]
    #[arg(
        long,
        value_name = "ROWS",
        default_value_t = DEFAULT_PREVIEW_ROWS,
        help = "Number of rows shown in the preview",
        value_parser = clap::value_parser!(u64).range(1..=MAX_PREVIEW_ROWS as u64).map(|n| n as usize)
    )]
    pub preview_rows: usize,

    /// Destination schema. [Default: app_marco_new]
    #[arg(
        long,
        value_name = "SCHEMA",
        default_value = DEFAULT_SCHEMA,
        help = "Schema of the table to replace",
        value_parser = validate_schema
    )]
    pub schema: String,

    /// Destination table. [Default: modelo_ap]
    #[arg(
        long,
        value_name = "TABLE",
        default_value = DEFAULT_TABLE,
        help = "Table whose contents are replaced",
        value_parser = validate_table
    )]
    pub table: String,

    /// MySQL server host.
    #[arg(long, value_name = "HOST", env = "DB_HOST")]
    pub db_host: Option<String>,

    /// MySQL server port.
    #[arg(long, value_name = "PORT", env = "DB_PORT", default_value_t = DEFAULT_DB_PORT)]
    pub db_port: u16,

    /// MySQL user.
    #[arg(long, value_name = "USER", env = "DB_USER")]
    pub db_user: Option<String>,

    /// MySQL password.
    #[arg(long, value_name = "PASSWORD", env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// MySQL database used for the connection.
    #[arg(long, value_name = "DATABASE", env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Replace the table without opening the window [requires FILE_PATH].
    #[arg(
        short = 'y',
        long,
        help = "Load FILE_PATH and replace the table without opening the window",
        long_help = "\
Non-interactive mode: reads FILE_PATH, prints a short preview, truncates the
destination table and loads the file into it. Exits with a non-zero status on error.",
        action = clap::ArgAction::SetTrue,
        requires = "path"
    )]
    pub yes: bool,
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            path: PathBuf::from("."),
            positional: false,
            sum_column: DEFAULT_SUM_LABEL.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
            db_host: None,
            db_port: DEFAULT_DB_PORT,
            db_user: None,
            db_password: None,
            db_name: None,
            yes: false,
        }
    }
}

impl Arguments {
    /// Build `Arguments` struct.
    pub fn build() -> Arguments {
        Arguments::parse()
    }

    /// The table selected by `--schema` and `--table`.
    pub fn target(&self) -> TargetTable {
        TargetTable {
            schema: self.schema.clone(),
            table: self.table.clone(),
        }
    }
}

// --- Validation Functions ---

/// Validates a schema or table name: a plain identifier, at most 64 characters.
fn validate_identifier(value: &str, arg_name: &str) -> LoaderResult<String> {
    let identifier = Regex::new(IDENTIFIER_PATTERN).map_err(|e| LoaderError::InvalidArgument {
        arg_name: arg_name.to_string(),
        reason: format!("Invalid regex syntax: {e}"),
    })?;

    if identifier.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(LoaderError::InvalidArgument {
            arg_name: arg_name.to_string(),
            reason: "Expected letters, digits, '_' or '$', not starting with a digit (max 64)"
                .to_string(),
        })
    }
}

/// clap validator for the '--schema' argument.
fn validate_schema(s: &str) -> LoaderResult<String> {
    validate_identifier(s, "--schema")
}

/// clap validator for the '--table' argument.
fn validate_table(s: &str) -> LoaderResult<String> {
    validate_identifier(s, "--table")
}

/// clap validator for '--sum-column': a spreadsheet letter label (upper-cased).
fn validate_sum_label(s: &str) -> LoaderResult<String> {
    let label = s.trim().to_uppercase();
    crate::label_to_index(&label).map_err(|e| LoaderError::InvalidArgument {
        arg_name: "--sum-column".to_string(),
        reason: e.to_string(),
    })?;
    Ok(label)
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
