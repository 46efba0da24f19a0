use egui::{Direction, Layout, TextStyle, Ui};
use egui_extras::{Column, TableBuilder, TableRow};
use polars::prelude::*;
use std::sync::Arc;

use crate::{FileExtension, LoadSettings, LoaderResult, read_dataframe};

/// The uploaded dataset: a DataFrame, its file extension, and the settings it was read with.
///
/// Held only while the file is on screen. Row and column counts never change for the
/// lifetime of a `Dataset`; picking another file or switching the load mode builds a new one.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// The Polars DataFrame, wrapped in an Arc for shared ownership.
    pub df: Arc<DataFrame>,
    /// File extension (csv or workbook).
    pub extension: Arc<FileExtension>,
    /// Settings used to read the file (path, load mode, preview size).
    pub settings: Arc<LoadSettings>,
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset {
            df: Arc::new(DataFrame::default()),
            extension: Arc::new(FileExtension::Missing),
            settings: Arc::new(LoadSettings::default()),
        }
    }
}

impl Dataset {
    /// Reads the file named by `settings.absolute_path` (CSV or workbook).
    ///
    /// ### Returns
    ///
    /// A `LoaderResult` containing the `Dataset` or the read error.
    pub async fn load_data(settings: LoadSettings) -> LoaderResult<Self> {
        tracing::debug!("fn load_data()\nsettings: {settings:#?}");

        let (df, extension) = read_dataframe(&settings.absolute_path, settings.mode).await?;

        tracing::info!(
            "Loaded {:?}: {} rows x {} columns",
            settings.absolute_path,
            df.height(),
            df.width()
        );

        Ok(Self {
            df: Arc::new(df),
            extension: Arc::new(extension),
            settings: Arc::new(settings),
        })
    }

    /// Column labels: the file's header names, or spreadsheet letters in positional mode.
    pub fn labels(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// True when there is nothing to load.
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// The first `settings.preview_rows` rows.
    pub fn preview(&self) -> DataFrame {
        self.df.head(Some(self.settings.preview_rows))
    }

    /// Renders the preview rows as an `egui` table.
    ///
    /// Headers are the column labels; every cell is shown as text, nulls as empty cells.
    pub fn render_table(&self, ui: &mut Ui) {
        let preview = self.preview();

        let analyze_header = |mut table_row: TableRow<'_, '_>| {
            for column_name in preview.get_column_names() {
                table_row.col(|ui| {
                    ui.with_layout(Layout::centered_and_justified(Direction::LeftToRight), |ui| {
                        ui.strong(column_name.as_str());
                    });
                });
            }
        };

        let analyze_rows = |mut table_row: TableRow<'_, '_>| {
            let row_index = table_row.index();

            for column in preview.columns() {
                let value = match column.get(row_index) {
                    Ok(AnyValue::String(s)) => s.to_string(),
                    Ok(AnyValue::StringOwned(s)) => s.to_string(),
                    Ok(AnyValue::Null) => String::new(),
                    Ok(any_value) => any_value.to_string(),
                    Err(_) => "Error: Value not found".to_string(),
                };

                table_row.col(|ui| {
                    ui.with_layout(
                        Layout::left_to_right(egui::Align::Center).with_main_wrap(false),
                        |ui| {
                            ui.label(value);
                        },
                    );
                });
            }
        };

        let style = ui.style();
        let text_height = TextStyle::Body.resolve(style).size;
        let col_number = preview.width().max(1) as f32;
        let available_space = ui.available_width()
            - col_number * style.spacing.item_spacing.x
            - style.spacing.scroll.bar_width;

        let initial_col_width = available_space / col_number;
        let header_height = style.spacing.interact_size.y + 2.0 * style.spacing.item_spacing.y;
        let min_col_width = style.spacing.interact_size.x.max(initial_col_width / 4.0);

        let column = Column::initial(initial_col_width)
            .at_least(min_col_width)
            .resizable(true)
            .clip(true);

        TableBuilder::new(ui)
            .striped(true)
            .columns(column, preview.width())
            .column(Column::remainder())
            .auto_shrink([false, false])
            .header(header_height, analyze_header)
            .body(|body| {
                body.rows(text_height, preview.height(), analyze_rows);
            });
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
