use crate::{
    Alert, Arguments, ColumnSum, Dataset, DbConfig, FileMetadata, LoadMode, LoadOutcome,
    LoadSettings, LoaderError, LoaderResult, MyStyle, MySqlDatabase, Notification, TargetTable,
    column_sum, default_sum_label, is_dialog_cancelled, open_file, replace_table,
};

use egui::{
    Button, CentralPanel, Color32, Context, Direction, FontId, Frame, Grid, Hyperlink, Layout,
    RichText, ScrollArea, SidePanel, Stroke, TopBottomPanel, ViewportCommand, menu,
    style::Visuals, warn_if_debug_build, widgets,
};
use std::{path::Path, sync::Arc};
use tokio::sync::oneshot::{self, Receiver, error::TryRecvError};
use tracing::error;

/// Type alias for a boxed, dynamically dispatched Future that reads a file into a `Dataset`.
pub type DataFuture = Box<dyn Future<Output = LoaderResult<Dataset>> + Unpin + Send + 'static>;

/// Type alias for a boxed Future that replaces the destination table.
pub type LoadFuture = Box<dyn Future<Output = LoaderResult<LoadOutcome>> + Unpin + Send + 'static>;

/// State of a background operation's result channel.
enum PipeState<T> {
    /// Nothing is running.
    Idle,
    /// Still running; the receiver was put back.
    Pending,
    /// Finished (or the task vanished without answering).
    Ready(LoaderResult<T>),
}

/// Polls a oneshot receiver without blocking, taking it out of `pipe` once it has answered.
fn poll_pipe<T>(pipe: &mut Option<Receiver<LoaderResult<T>>>) -> PipeState<T> {
    let Some(mut output) = pipe.take() else {
        return PipeState::Idle;
    };

    match output.try_recv() {
        Ok(result) => PipeState::Ready(result),
        Err(TryRecvError::Empty) => {
            *pipe = Some(output);
            PipeState::Pending
        }
        Err(TryRecvError::Closed) => PipeState::Ready(Err(LoaderError::ChannelReceive(
            "Operation terminated without response.".to_string(),
        ))),
    }
}

/// The main application window: pick a file, preview it, replace the table.
pub struct LoaderApp {
    /// The file currently on screen.
    pub dataset: Option<Arc<Dataset>>,
    /// Read settings (path, load mode, preview size), edited in the side panel.
    pub settings: LoadSettings,
    /// Metadata of the file on screen.
    pub metadata: Option<FileMetadata>,
    /// Sum preview (positional mode only).
    pub column_sum: Option<ColumnSum>,
    /// Label chosen in the sum selector.
    pub sum_selection: String,
    /// Optional notification window (error, warning, success).
    pub notification: Option<Box<dyn Notification>>,

    /// Table whose contents are replaced.
    target: TargetTable,
    /// Command-line arguments; database settings are resolved from them on each load.
    args: Arguments,

    /// Tokio runtime for asynchronous operations (file reading, database load).
    runtime: tokio::runtime::Runtime,
    /// Channel for receiving the result of reading a file.
    data_pipe: Option<Receiver<LoaderResult<Dataset>>>,
    /// Channel for receiving the result of replacing the table.
    load_pipe: Option<Receiver<LoaderResult<LoadOutcome>>>,
    /// Active asynchronous tasks.
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl LoaderApp {
    /// Creates a new `LoaderApp`. When `args.path` names a file, reading it starts immediately.
    pub fn new(cc: &eframe::CreationContext<'_>, args: Arguments) -> LoaderResult<Self> {
        cc.egui_ctx.set_style_init(Visuals::dark());

        let settings = LoadSettings::new(&args)?;
        tracing::debug!("LoaderApp::new()\nsettings: {settings:#?}");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let mut app = LoaderApp {
            dataset: None,
            sum_selection: settings.sum_label.clone(),
            settings,
            metadata: None,
            column_sum: None,
            notification: None,
            target: args.target(),
            args,
            runtime,
            data_pipe: None,
            load_pipe: None,
            tasks: Vec::new(),
        };

        if app.settings.has_path() {
            let future = Dataset::load_data(app.settings.clone());
            app.run_data_future(Box::new(Box::pin(future)), &cc.egui_ctx);
        }

        Ok(app)
    }

    /// Checks if a Notification is active and displays it.
    fn check_notification(&mut self, ctx: &Context) {
        if let Some(notification) = &mut self.notification
            && !notification.show(ctx)
        {
            self.notification = None;
        }
    }

    /// Processes a finished file read, if any. Returns `true` while the read is still running.
    fn check_data_pending(&mut self) -> bool {
        match poll_pipe(&mut self.data_pipe) {
            PipeState::Idle => false,
            PipeState::Pending => true,
            PipeState::Ready(Ok(dataset)) => {
                self.set_dataset(dataset);
                false
            }
            PipeState::Ready(Err(err)) => {
                error!("Reading the file failed: {err}");
                self.notification = Some(Box::new(Alert::error(err.to_string())));
                false
            }
        }
    }

    /// Processes a finished table replacement, if any. Returns `true` while it is still running.
    fn check_load_pending(&mut self) -> bool {
        match poll_pipe(&mut self.load_pipe) {
            PipeState::Idle => false,
            PipeState::Pending => true,
            PipeState::Ready(Ok(outcome)) => {
                let message = outcome.message(&self.target);
                let alert = if outcome.is_warning() {
                    Alert::warning(message)
                } else {
                    Alert::success(message)
                };
                self.notification = Some(Box::new(alert));
                false
            }
            PipeState::Ready(Err(err)) => {
                error!("Load into {} failed: {err}", self.target);
                self.notification =
                    Some(Box::new(Alert::error(format!("Error during load: {err}"))));
                false
            }
        }
    }

    /// Stores a freshly read dataset and refreshes everything derived from it.
    fn set_dataset(&mut self, dataset: Dataset) {
        self.settings = dataset.settings.as_ref().clone();
        self.metadata = Some(FileMetadata::from_dataset(&dataset));

        self.column_sum = None;
        if dataset.settings.mode == LoadMode::Positional {
            let labels = dataset.labels();
            if let Some(label) = default_sum_label(&labels, &self.settings.sum_label) {
                self.sum_selection = label.to_string();
                self.refresh_sum(&dataset);
            }
        }

        self.dataset = Some(Arc::new(dataset));
    }

    /// Recomputes the column sum for the label in `sum_selection`.
    fn refresh_sum(&mut self, dataset: &Dataset) {
        match column_sum(&dataset.df, &self.sum_selection) {
            Ok(summary) => self.column_sum = Some(summary),
            Err(err) => {
                self.column_sum = None;
                self.notification = Some(Box::new(Alert::error(err.to_string())));
            }
        }
    }

    /// Starts reading `path` with the current settings.
    fn open_path(&mut self, path: &Path, ctx: &Context) {
        match self.settings.set_path(path) {
            Ok(()) => {
                let future = Dataset::load_data(self.settings.clone());
                self.run_data_future(Box::new(Box::pin(future)), ctx);
            }
            Err(err) => {
                self.notification = Some(Box::new(Alert::error(err.to_string())));
            }
        }
    }

    /// Starts replacing the destination table with the dataset on screen.
    ///
    /// Database settings are resolved here, so a missing credential only matters
    /// once a load is requested.
    fn start_replace(&mut self, dataset: Arc<Dataset>, ctx: &Context) {
        let config = match DbConfig::from_args(&self.args) {
            Ok(config) => config,
            Err(err) => {
                self.notification =
                    Some(Box::new(Alert::error(format!("Error during load: {err}"))));
                return;
            }
        };

        tracing::info!(
            "Replacing {} with {:?} ({} rows, {})",
            self.target,
            dataset.settings.absolute_path,
            dataset.height(),
            dataset.settings.mode
        );

        let target = self.target.clone();
        let future = async move {
            let db = MySqlDatabase::new(config);
            replace_table(&db, &dataset, &target).await
        };

        self.run_load_future(Box::new(Box::pin(future)), ctx);
    }

    /// Runs a `DataFuture` to read a file asynchronously.
    fn run_data_future(&mut self, future: DataFuture, ctx: &Context) {
        let (tx, rx) = oneshot::channel::<LoaderResult<Dataset>>();
        self.data_pipe = Some(rx);
        self.spawn(future, tx, ctx);
    }

    /// Runs a `LoadFuture` to replace the table asynchronously.
    fn run_load_future(&mut self, future: LoadFuture, ctx: &Context) {
        let (tx, rx) = oneshot::channel::<LoaderResult<LoadOutcome>>();
        self.load_pipe = Some(rx);
        self.spawn(future, tx, ctx);
    }

    /// Spawns `future` on the runtime; its result is sent over `tx` and a repaint is requested.
    fn spawn<T, F>(&mut self, future: F, tx: oneshot::Sender<LoaderResult<T>>, ctx: &Context)
    where
        T: Send + 'static,
        F: Future<Output = LoaderResult<T>> + Send + 'static,
    {
        // Before scheduling a new future, drop finished tasks.
        self.tasks.retain(|task| !task.is_finished());

        let ctx_clone = ctx.clone();

        let handle = self.runtime.spawn(async move {
            let result = future.await;
            if tx.send(result).is_err() {
                error!("Receiver dropped before the result could be sent.");
            }
            ctx_clone.request_repaint();
        });

        self.tasks.push(handle);
    }

    /// Renders the About section of the File menu.
    fn render_about(ui: &mut egui::Ui) {
        Frame::default()
            .stroke(Stroke::new(1.0, Color32::GRAY))
            .outer_margin(2.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                let version = env!("CARGO_PKG_VERSION");
                let authors = env!("CARGO_PKG_AUTHORS");
                let description = env!("CARGO_PKG_DESCRIPTION");

                Grid::new("about_grid")
                    .num_columns(1)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        ui.with_layout(Layout::centered_and_justified(Direction::LeftToRight), |ui| {
                            ui.label(RichText::new("Polars Load").font(FontId::proportional(30.0)));
                        });
                        ui.end_row();

                        ui.with_layout(Layout::centered_and_justified(Direction::LeftToRight), |ui| {
                            ui.label(format!("Version: {version}"));
                        });
                        ui.end_row();
                        ui.end_row();

                        ui.with_layout(Layout::centered_and_justified(Direction::LeftToRight), |ui| {
                            ui.label(RichText::new(description).font(FontId::proportional(20.0)));
                        });
                        ui.end_row();
                        ui.end_row();

                        ui.horizontal(|ui| {
                            let url = "https://github.com/pola-rs/polars";
                            ui.label("Powered by ");
                            ui.add(Hyperlink::from_label_and_url("Polars", url))
                                .on_hover_text(url);
                        });
                        ui.end_row();

                        ui.horizontal(|ui| {
                            let url = "https://github.com/emilk/egui";
                            ui.label("Built with ");
                            ui.add(Hyperlink::from_label_and_url("egui", url))
                                .on_hover_text(url);
                        });
                        ui.end_row();
                        ui.end_row();

                        ui.label(format!("Author: {authors}"));
                        ui.end_row();
                    });
            });
    }
}

impl eframe::App for LoaderApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.check_notification(ctx);

        let busy = self.check_data_pending() | self.check_load_pending();

        // Handle dropped files (ignored while busy).
        if !busy
            && let Some(dropped_file) = ctx.input(|i| i.raw.dropped_files.last().cloned())
            && let Some(path) = &dropped_file.path
        {
            self.open_path(path, ctx);
        }

        //  | menu_bar        widgets |
        //  ---------------------------
        //  |          |              |
        //  | Settings |  preview     |
        //  | Metadata |  table       |
        //  | Sum      |              |
        //  ---------------------------
        //  | file path footer        |

        TopBottomPanel::top("top_panel").show(ctx, |ui| {
            menu::bar(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.menu_button("File", |ui| {
                        if ui.add_enabled(!busy, Button::new("Open")).clicked() {
                            match self.runtime.block_on(open_file()) {
                                Ok(path) => self.open_path(&path, ctx),
                                Err(err) if is_dialog_cancelled(&err) => {}
                                Err(err) => {
                                    self.notification =
                                        Some(Box::new(Alert::error(err.to_string())));
                                }
                            }
                            ui.close_menu();
                        }

                        ui.menu_button("About", Self::render_about);

                        if ui.button("Quit").clicked() {
                            ui.ctx().send_viewport_cmd(ViewportCommand::Close);
                        }
                    });

                    // Add spacing to align theme switch to the right.
                    let delta = ui.available_width() - 15.0;
                    if delta > 0.0 {
                        ui.add_space(delta);
                        widgets::global_theme_preference_switch(ui);
                    }
                });
            });
        });

        SidePanel::left("side_panel")
            .resizable(true)
            .show(ctx, |ui| {
                if busy {
                    ui.disable();
                }

                ScrollArea::vertical().show(ui, |ui| {
                    ui.collapsing("Settings", |ui| {
                        if let Some(settings) = self.settings.render_settings(ui) {
                            let future = Dataset::load_data(settings);
                            self.run_data_future(Box::new(Box::pin(future)), ctx);
                        }
                    });

                    if let Some(metadata) = &self.metadata {
                        ui.collapsing("Metadata", |ui| {
                            metadata.render_metadata(ui);
                        });
                    }

                    if let (Some(dataset), Some(metadata), Some(summary)) =
                        (&self.dataset, &self.metadata, &self.column_sum)
                    {
                        let dataset = Arc::clone(dataset);
                        let mut selection = self.sum_selection.clone();

                        ui.collapsing("Column sum", |ui| {
                            summary.render(
                                ui,
                                metadata.labels(),
                                &mut selection,
                                metadata.row_count(),
                            );
                        });

                        if selection != self.sum_selection {
                            self.sum_selection = selection;
                            self.refresh_sum(&dataset);
                        }
                    }

                    if let Some(metadata) = &self.metadata {
                        ui.collapsing("Schema", |ui| {
                            metadata.render_schema(ui);
                        });
                    }
                });
            });

        TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.dataset {
                Some(dataset) => {
                    ui.label(format!("{:#?}", dataset.settings.absolute_path));
                }
                None => {
                    ui.label("no file set");
                }
            });
        });

        // CentralPanel must be added after all other panels.
        CentralPanel::default().show(ctx, |ui| {
            warn_if_debug_build(ui);

            if busy {
                ui.disable();
            }

            match self.dataset.clone() {
                Some(dataset) => {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "Confirming replaces every row of {} with the {} rows of this file ({}).",
                            self.target,
                            dataset.height(),
                            dataset.settings.mode
                        ));

                        ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                            if busy {
                                ui.spinner();
                            }

                            let button = Button::new(
                                RichText::new("Load and replace table").color(Color32::WHITE),
                            )
                            .fill(Color32::from_rgb(170, 40, 40));

                            if ui
                                .add_enabled(!busy, button)
                                .on_hover_text(format!("TRUNCATE {} and load this file", self.target))
                                .clicked()
                            {
                                self.start_replace(Arc::clone(&dataset), ctx);
                            }
                        });
                    });

                    ui.separator();

                    ScrollArea::horizontal()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            ui.style_mut().spacing.scroll.handle_min_length = 32.0;
                            dataset.render_table(ui);
                        });
                }
                None => {
                    if busy {
                        ui.centered_and_justified(|ui| {
                            ui.spinner();
                        });
                    } else {
                        ui.centered_and_justified(|ui| {
                            ui.label("Drag and drop a CSV or XLSX file here.");
                        });
                    }
                }
            }
        });
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//
