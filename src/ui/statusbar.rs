use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, StatusMessage, Tab};
use crate::ui::theme::Theme;

#[allow(clippy::too_many_arguments)]
pub fn render(
    frame: &mut Frame,
    area: Rect,
    tab: Tab,
    input_mode: InputMode,
    edit_buffer: &str,
    status_message: Option<&StatusMessage>,
    any_dirty: bool,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some(status) = status_message {
        let color = if status.is_error {
            theme.status_err
        } else {
            theme.status_ok
        };
        let line = Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let line = match input_mode {
        InputMode::Edit => {
            let mut spans = vec![
                Span::styled(
                    " Edit ",
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {edit_buffer}"),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc", "Cancel", theme));
            spans.extend(pill_spans("Enter", "Set", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help => {
            let mut spans = Vec::new();
            spans.extend(pill_spans("q", "Quit", theme));
            spans.extend(pill_spans("Tab", "Switch", theme));
            match tab {
                Tab::Monitor => {
                    spans.extend(pill_spans("c", "Clusters/Cores", theme));
                }
                Tab::Tweaks => {
                    spans.extend(pill_spans("\u{2191}\u{2193}", "Select", theme));
                    spans.extend(pill_spans("\u{2190}\u{2192}", "Cycle", theme));
                    spans.extend(pill_spans("Enter", "Edit", theme));
                    spans.extend(pill_spans("s", "Save", theme));
                    spans.extend(pill_spans("a", "Apply", theme));
                    spans.extend(pill_spans("r", "Reload", theme));
                }
            }
            spans.extend(pill_spans("?", "Help", theme));
            if any_dirty {
                spans.push(Span::styled(
                    "  unsaved changes",
                    Style::default().fg(theme.dirty).add_modifier(Modifier::BOLD),
                ));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
