pub mod header;
pub mod help;
pub mod monitor;
pub mod statusbar;
pub mod theme;
pub mod tweaks;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, Tab};

pub fn draw(frame: &mut Frame, app: &App) {
    let [header_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    header::render(frame, header_area, app.tab, &app.device, &app.theme);

    match app.tab {
        Tab::Monitor => monitor::render(frame, content_area, &app.monitor, &app.device, &app.theme),
        Tab::Tweaks => tweaks::render(frame, content_area, app, &app.theme),
    }

    statusbar::render(
        frame,
        status_area,
        app.tab,
        app.input_mode,
        &app.edit_buffer,
        app.status_message.as_ref(),
        app.tweaks.any_dirty(),
        &app.theme,
    );

    // Help overlay rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_sections(), &app.theme);
    }
}

#[cfg(test)]
mod tests;
