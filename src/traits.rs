//! Defines custom traits, trait implementations for `egui` types, and general utility traits.
//!
//! This module centralizes extensions to existing types (`egui::Context`, `std::path::Path`)
//! and defines the `Notification` interface used by `layout.rs` for the error, warning
//! and success windows shown after a load attempt.

use egui::{
    Align, Color32, Context,
    FontFamily::Proportional,
    FontId, Frame, Layout, Spacing, Stroke, Style,
    TextStyle::{Body, Button, Heading, Monospace, Small},
    Vec2, Visuals, Window,
    style::ScrollStyle,
};

use std::{ffi::OsStr, path::Path};

/// Defines custom text styles for the egui context.
/// Overrides default `egui` font sizes for different logical text styles (Heading, Body, etc.).
/// Used by `MyStyle::set_style_init`.
pub const CUSTOM_TEXT_STYLE: [(egui::TextStyle, egui::FontId); 5] = [
    (Heading, FontId::new(18.0, Proportional)),
    (Body, FontId::new(16.0, Proportional)),
    (Button, FontId::new(16.0, Proportional)),
    (Monospace, FontId::new(15.0, Proportional)), // Adjusted size for Proportional font
    (Small, FontId::new(14.0, Proportional)),
];

/// A trait for applying custom styling to the `egui` context (`Context`).
/// Used once at startup by `layout.rs::LoaderApp::new`.
pub trait MyStyle {
    /// Applies a pre-defined application style to the `egui` context.
    fn set_style_init(&self, visuals: Visuals);
}

impl MyStyle for Context {
    /// Configures the application's look and feel (theme, spacing, text styles) by modifying `egui::Style`.
    fn set_style_init(&self, visuals: Visuals) {
        let scroll = ScrollStyle {
            handle_min_length: 32.0,
            ..ScrollStyle::default()
        };

        let spacing = Spacing {
            scroll,
            item_spacing: [8.0, 6.0].into(),
            ..Spacing::default()
        };

        let style = Style {
            visuals,
            spacing,
            text_styles: CUSTOM_TEXT_STYLE.into(),
            ..Style::default()
        };

        self.set_style(style);
    }
}

/// Trait for modal Notification windows (errors, warnings, load results).
/// Allows `layout.rs` to manage different notification types polymorphically via `Box<dyn Notification>`.
pub trait Notification: Send + Sync + 'static {
    /// Renders the notification window using `egui::Window`.
    /// Called repeatedly by `layout.rs::check_notification` while the notification is active.
    ///
    /// ### Returns
    /// `true` if the window should remain open, `false` if closed.
    fn show(&mut self, ctx: &Context) -> bool;
}

/// How a message shown to the user should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A failure: file could not be read, or the load sequence failed.
    Error,
    /// Nothing went wrong, but nothing was done either (e.g., empty upload).
    Warning,
    /// The table was replaced.
    Success,
}

impl Severity {
    /// Window title for this severity.
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Success => "Load completed",
        }
    }

    /// Background and border colors of the message frame.
    fn colors(&self) -> (Color32, Color32) {
        match self {
            Severity::Error => (Color32::from_rgb(255, 200, 200), Color32::DARK_RED),
            Severity::Warning => (Color32::from_rgb(255, 235, 190), Color32::from_rgb(160, 100, 0)),
            Severity::Success => (Color32::from_rgb(212, 253, 183), Color32::DARK_GREEN),
        }
    }
}

/// Notification struct for displaying a message to the user. Implements `Notification`.
pub struct Alert {
    /// Decides the window title and colors.
    pub severity: Severity,
    /// The message content. Set by the caller in `layout.rs`.
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Alert {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Alert {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Alert {
            severity: Severity::Success,
            message: message.into(),
        }
    }
}

impl Notification for Alert {
    /// Renders the notification window.
    ///
    /// ### Logic
    /// 1. Define `open` state (initially `true`).
    /// 2. Create `egui::Window` titled after the severity, bound to `open`.
    /// 3. Use a `Frame` colored by severity for visual emphasis.
    /// 4. Return the `open` state.
    fn show(&mut self, ctx: &Context) -> bool {
        let mut open = true;
        let (fill, border) = self.severity.colors();

        Window::new(self.severity.title())
            .collapsible(false)
            .open(&mut open)
            .show(ctx, |ui| {
                let width_max = ui.available_width() * 0.80;
                ui.allocate_ui_with_layout(
                    Vec2::new(width_max, ui.available_height()),
                    Layout::top_down(Align::LEFT),
                    |ui| {
                        Frame::default()
                            .fill(fill)
                            .stroke(Stroke::new(1.0, border))
                            .outer_margin(2.0)
                            .inner_margin(10.0)
                            .show(ui, |ui| {
                                ui.colored_label(Color32::BLACK, &self.message);
                            });
                    },
                );
            });

        open
    }
}

/// Trait to extend `Path` with a convenient method for getting the lowercase file extension.
/// Used by `file_extension.rs`.
pub trait PathExtension {
    /// Returns the file extension as a lowercase `String`, or `None`.
    fn extension_as_lowercase(&self) -> Option<String>;
}

impl PathExtension for Path {
    /// Gets extension, converts to &str, then lowercases.
    fn extension_as_lowercase(&self) -> Option<String> {
        self.extension() // 1. Get OsStr extension.
            .and_then(OsStr::to_str) // 2. Try converting to &str.
            .map(str::to_lowercase) // 3. Convert to lowercase String if successful.
    }
}

// --- Unit Tests ---


#[cfg(test)]
mod tests_alert {
    use super::*;

    #[test]
    fn test_alert_constructors_set_severity() {
        assert_eq!(Alert::error("boom").severity, Severity::Error);
        assert_eq!(Alert::warning("empty").severity, Severity::Warning);
        assert_eq!(Alert::success("done").severity, Severity::Success);
        assert_eq!(Alert::success("done").message, "done");
        assert_eq!(Severity::Success.title(), "Load completed");
    }
}
