use crate::{Arguments, LoaderResult};

use egui::{Align, DragValue, Grid, Layout, Ui, Vec2};
use std::{
    fmt,
    path::{Path, PathBuf},
};

// --- Constants ---

/// Number of rows rendered in the preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Column preselected for the sum preview in positional mode (when present).
pub const DEFAULT_SUM_LABEL: &str = "N";

/// Upper bound of the preview row selector.
pub const MAX_PREVIEW_ROWS: usize = 10_000;

// --- LoadMode ---

/// How the uploaded file is mapped onto the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// The first row names destination columns; fields are loaded by name.
    #[default]
    HeaderMapped,
    /// No header row; fields are loaded by position into the table's native column order.
    Positional,
}

impl LoadMode {
    /// Whether the first row of the file is a header.
    pub fn has_header(&self) -> bool {
        matches!(self, LoadMode::HeaderMapped)
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::HeaderMapped => write!(f, "Header row (map by column name)"),
            LoadMode::Positional => write!(f, "No header (map by position)"),
        }
    }
}

// --- LoadSettings Struct ---

/// Holds configuration parameters related to **reading** the uploaded file.
///
/// Instances are created from `Arguments`, updated by the UI in `render_settings`, and passed
/// to `Dataset::load_data`. Changes here trigger a re-read of the file, because the load
/// mode decides whether the first row is data or a header.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSettings {
    /// The canonical, absolute path to the uploaded file.
    pub absolute_path: PathBuf,
    /// Header-mapped or positional.
    pub mode: LoadMode,
    /// Number of rows shown in the preview table.
    pub preview_rows: usize,
    /// Preferred column label for the sum preview (positional mode).
    pub sum_label: String,
}

impl Default for LoadSettings {
    fn default() -> Self {
        LoadSettings {
            absolute_path: PathBuf::new(),
            mode: LoadMode::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            sum_label: DEFAULT_SUM_LABEL.to_string(),
        }
    }
}

impl LoadSettings {
    /// Creates a new `LoadSettings` instance configured from command-line `Arguments`.
    ///
    /// The path is only canonicalized when it points to a file; the default `.` means
    /// "no file yet" and the window starts empty.
    pub fn new(args: &Arguments) -> LoaderResult<Self> {
        let absolute_path = if args.path.is_file() {
            args.path.canonicalize()?
        } else {
            PathBuf::new()
        };

        let mode = if args.positional {
            LoadMode::Positional
        } else {
            LoadMode::HeaderMapped
        };

        Ok(LoadSettings {
            absolute_path,
            mode,
            preview_rows: args.preview_rows,
            sum_label: args.sum_column.clone(),
        })
    }

    /// Sets the data source path, canonicalizing it.
    pub fn set_path(&mut self, path: &Path) -> LoaderResult<()> {
        self.absolute_path = path.canonicalize()?;
        tracing::debug!("absolute_path set to: {:#?}", self.absolute_path);
        Ok(())
    }

    /// Whether a file has been chosen.
    pub fn has_path(&self) -> bool {
        !self.absolute_path.as_os_str().is_empty()
    }

    // --- UI Rendering Methods ---

    /// Renders the widgets for the "Settings" section of the side panel.
    ///
    /// Widgets modify `self` directly. The state before and after rendering is compared;
    /// on change, `Some(self.clone())` is returned so that `layout.rs` can re-read the file.
    pub fn render_settings(&mut self, ui: &mut Ui) -> Option<LoadSettings> {
        let settings_before_render = self.clone();
        let mut result = None;

        let width_max = ui.available_width();
        let grid = Grid::new("load_settings_grid")
            .num_columns(2)
            .spacing([10.0, 20.0])
            .striped(true);

        ui.allocate_ui_with_layout(
            Vec2::new(width_max, ui.available_height()),
            Layout::top_down(Align::LEFT),
            |ui| {
                grid.show(ui, |ui| {
                    ui.label("File layout:");
                    ui.vertical(|ui| {
                        ui.radio_value(
                            &mut self.mode,
                            LoadMode::HeaderMapped,
                            LoadMode::HeaderMapped.to_string(),
                        )
                        .on_hover_text(
                            "The first row names the destination columns.\n\
                            Columns may come in any order.",
                        );
                        ui.radio_value(
                            &mut self.mode,
                            LoadMode::Positional,
                            LoadMode::Positional.to_string(),
                        )
                        .on_hover_text(
                            "Every row is data. Columns must follow the\n\
                            destination table's column order exactly.",
                        );
                    });
                    ui.end_row();

                    ui.label("Preview rows:");
                    ui.add(
                        DragValue::new(&mut self.preview_rows)
                            .speed(1)
                            .range(1..=MAX_PREVIEW_ROWS),
                    );
                    ui.end_row();
                });
            },
        );

        if *self != settings_before_render && self.has_path() {
            tracing::debug!("Settings changed: {self:#?}");
            result = Some(self.clone());
        }

        result
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
