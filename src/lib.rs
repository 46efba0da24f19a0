#![warn(clippy::all)]
#![doc = include_str!("../README.md")]

// Modules that make up the Polars Load library.
mod aggregate;
mod args;
mod database;
mod dataset;
mod error;
mod file_dialog;
mod file_extension;
mod labels;
mod layout;
mod loader;
mod metadata;
mod plan;
mod reader;
mod settings;
mod staging;
mod traits;

// Publicly expose the contents of these modules.
pub use self::{
    aggregate::*,
    args::{Arguments, DEFAULT_DB_PORT},
    database::{Database, DbConfig, DbFuture, MySqlDatabase, Session},
    dataset::*,
    error::*,
    file_dialog::*,
    file_extension::*,
    labels::*,
    layout::*,
    loader::*,
    metadata::*,
    plan::*,
    reader::*,
    settings::*,
    staging::*,
    traits::*,
};
