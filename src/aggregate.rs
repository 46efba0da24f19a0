//! Ad-hoc numeric sum of one column, shown before a positional load.

use crate::{LoaderError, LoaderResult, label_to_index};

use egui::{Color32, ComboBox, Frame, Grid, Stroke, Ui};
use polars::prelude::*;

/// Result of summing one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSum {
    /// Label of the summed column.
    pub label: String,
    /// Sum of every cell that parses as a number.
    pub total: f64,
    /// Cells that parsed as numbers.
    pub numeric_cells: usize,
    /// Null or non-numeric cells (contributing zero).
    pub skipped_cells: usize,
}

/// Picks the column preselected for the sum: `preferred` if present, otherwise the first label.
pub fn default_sum_label<'a>(labels: &'a [String], preferred: &str) -> Option<&'a str> {
    labels
        .iter()
        .find(|label| label.as_str() == preferred)
        .or_else(|| labels.first())
        .map(String::as_str)
}

/// Sums the column named `label` after coercing each cell to a number.
///
/// Cells are trimmed and parsed as `f64`. Text, nulls, `NaN` and infinities count
/// as zero and are reported in `skipped_cells`.
pub fn column_sum(df: &DataFrame, label: &str) -> LoaderResult<ColumnSum> {
    let column = df
        .column(label)
        .map_err(|_| LoaderError::ColumnNotFound(label.to_string()))?;

    let text = column.cast(&DataType::String)?;
    let values = text.str()?;

    let mut total = 0.0;
    let mut numeric_cells = 0;

    for value in values.into_iter().flatten() {
        if let Some(number) = parse_number(value) {
            total += number;
            numeric_cells += 1;
        }
    }

    let summary = ColumnSum {
        label: label.to_string(),
        total,
        numeric_cells,
        skipped_cells: df.height() - numeric_cells,
    };

    tracing::debug!("fn column_sum(): {summary:?}");

    Ok(summary)
}

/// Parses a cell as a finite number, ignoring surrounding whitespace.
fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

impl ColumnSum {
    /// Renders the sum summary (row count, selected column, its position, total).
    ///
    /// The label selector is a `ComboBox` bound to `selected`; the caller recomputes
    /// the sum when the selection changes.
    pub fn render(&self, ui: &mut Ui, labels: &[String], selected: &mut String, rows: usize) {
        Frame::default()
            .stroke(Stroke::new(1.0, Color32::GRAY))
            .outer_margin(2.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                Grid::new("column_sum_grid")
                    .num_columns(2)
                    .spacing([10.0, 20.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("Rows:");
                        ui.label(rows.to_string());
                        ui.end_row();

                        ui.label("Column to sum:");
                        ComboBox::from_id_salt("sum_column_selector")
                            .selected_text(selected.as_str())
                            .show_ui(ui, |ui| {
                                for label in labels {
                                    ui.selectable_value(selected, label.clone(), label.as_str());
                                }
                            });
                        ui.end_row();

                        if let Some(index) = self.index() {
                            ui.label("Column position:");
                            ui.label((index + 1).to_string());
                            ui.end_row();
                        }

                        ui.label(format!("Sum of {}:", self.label));
                        ui.label(format!("{:.2}", self.total));
                        ui.end_row();

                        ui.label("Numeric cells:");
                        ui.label(self.numeric_cells.to_string())
                            .on_hover_text(format!(
                                "{} empty or non-numeric cells were counted as zero.",
                                self.skipped_cells
                            ));
                        ui.end_row();
                    });
            });
    }

    /// Zero-based position of the summed column, when its label is a spreadsheet letter.
    pub fn index(&self) -> Option<usize> {
        label_to_index(&self.label).ok()
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
