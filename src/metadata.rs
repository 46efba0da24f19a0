use crate::{Dataset, FileExtension, LoadMode};

use egui::{Color32, Frame, Grid, Stroke, Ui};

/// Summary of the uploaded file shown in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    /// File name without directories.
    file_name: String,
    /// Csv or workbook.
    kind: &'static str,
    /// How the file is read and loaded.
    mode: LoadMode,
    /// Number of data rows (header excluded).
    row_count: usize,
    /// Number of columns.
    col_count: usize,
    /// Column labels, in file order.
    labels: Vec<String>,
}

impl FileMetadata {
    /// Creates `FileMetadata` from a `Dataset`.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let file_name = dataset
            .settings
            .absolute_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let kind = match dataset.extension.as_ref() {
            FileExtension::Csv => "CSV",
            FileExtension::Workbook => "Spreadsheet (first sheet)",
            FileExtension::Unknown(_) | FileExtension::Missing => "Unknown",
        };

        FileMetadata {
            file_name,
            kind,
            mode: dataset.settings.mode,
            row_count: dataset.height(),
            col_count: dataset.df.width(),
            labels: dataset.labels(),
        }
    }

    /// Renders the file metadata (name, type, rows, columns) to the UI.
    pub fn render_metadata(&self, ui: &mut Ui) {
        Frame::default()
            .stroke(Stroke::new(1.0, Color32::GRAY))
            .outer_margin(2.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                Grid::new("metadata_grid")
                    .num_columns(2)
                    .spacing([10.0, 20.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("File:");
                        ui.label(&self.file_name);
                        ui.end_row();

                        ui.label("Type:");
                        ui.label(self.kind);
                        ui.end_row();

                        ui.label("Columns:");
                        ui.label(self.col_count.to_string());
                        ui.end_row();

                        ui.label("Rows:");
                        ui.label(self.row_count.to_string());
                        ui.end_row();
                    });
            });
    }

    /// Renders the column labels, one collapsing header per column.
    ///
    /// In header-mapped mode the label is the destination column; in positional mode
    /// the header shows the position it is loaded into. Right-click copies the label.
    pub fn render_schema(&self, ui: &mut Ui) {
        ui.label("Tip: Right-click a column name to copy it to the clipboard.");

        for (index, label) in self.labels.iter().enumerate() {
            let header_response = ui.collapsing(label, |ui| {
                ui.label(format!("position: {}", index + 1));
                match self.mode {
                    LoadMode::HeaderMapped => ui.label(format!("loaded into column `{label}`")),
                    LoadMode::Positional => {
                        ui.label(format!("loaded into table column #{}", index + 1))
                    }
                };
            });

            if header_response
                .header_response
                .clicked_by(egui::PointerButton::Secondary)
            {
                ui.ctx().copy_text(label.clone());
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
