#![warn(clippy::all)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use polars_load::{
    Arguments, Dataset, DbConfig, LoadMode, LoadSettings, LoaderError, LoaderResult, LoaderApp,
    MySqlDatabase, column_sum, default_sum_label, replace_table,
};
use tracing::error;

/*
cargo fmt
cargo test -- --nocapture
cargo test -- --show-output tests_loader
cargo test -- --ignored test_live_mysql_replace
cargo run -- --help
cargo run -- modelo.csv
cargo run -- -p -y modelo.xlsx
cargo doc --open
cargo b -r && cargo install --path=.
*/

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    // Initialize the tracing subscriber for logging.
    // Use RUST_LOG environment variable to set logging level.  eg `export RUST_LOG=info`
    tracing_subscriber::fmt::init();

    // Parse command-line arguments.
    let args = Arguments::build();

    // Non-interactive load: no window.
    if args.yes {
        if let Err(err) = run_headless(&args) {
            error!("Error during load: {err}");
            eprintln!("Error during load: {err}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        centered: true,
        persist_window: true,
        vsync: true,
        viewport: egui::ViewportBuilder::default().with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "PolarsLoad",
        native_options,
        Box::new(move |creation_context| {
            let app = LoaderApp::new(creation_context, args).inspect_err(|err| {
                error!("Failed to initialize LoaderApp: {err}");
            })?;
            Ok(Box::new(app))
        }),
    )
}

/// Reads `args.path`, prints a short preview and replaces the table.
fn run_headless(args: &Arguments) -> LoaderResult<()> {
    let settings = LoadSettings::new(args)?;
    if !settings.has_path() {
        return Err(LoaderError::FileNotFound(args.path.clone()));
    }

    // Resolve the credentials before reading anything.
    let db = MySqlDatabase::new(DbConfig::from_args(args)?);
    let target = args.target();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let dataset = Dataset::load_data(settings).await?;

        println!("{}", dataset.preview());
        println!("Rows: {}", dataset.height());

        if dataset.settings.mode == LoadMode::Positional {
            let labels = dataset.labels();
            if let Some(label) = default_sum_label(&labels, &dataset.settings.sum_label) {
                let summary = column_sum(&dataset.df, label)?;
                println!(
                    "Sum of {}: {:.2} ({} numeric cells, {} counted as zero)",
                    summary.label, summary.total, summary.numeric_cells, summary.skipped_cells
                );
            }
        }

        let outcome = replace_table(&db, &dataset, &target).await?;
        let message = outcome.message(&target);

        if outcome.is_warning() {
            tracing::warn!("{message}");
        } else {
            tracing::info!("{message}");
        }
        println!("{message}");

        Ok(())
    })
}
