use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::app::{App, InputMode};
use crate::format::truncate_unicode;
use crate::tweaks::definition::value_of;
use crate::ui::theme::Theme;

const UNSAVED: &str = "unsaved";
const VALUE_WIDTH: usize = 15;

pub fn render(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Tweaks ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let header = Row::new(["", "Current", "Saved", "Pending", ""]).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );

    let mut rows = Vec::new();
    let mut field_index = 0;
    for tweak in app.tweaks.iter() {
        let mut title = vec![Span::styled(
            tweak.definition().title,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )];
        if !tweak.is_available() {
            title.push(Span::styled(
                "  not available",
                Style::default().fg(theme.text_secondary),
            ));
            rows.push(Row::new([Cell::from(Line::from(title))]));
            continue;
        }
        if !tweak.is_loaded() {
            title.push(Span::styled(
                "  failed to load",
                Style::default().fg(theme.status_err),
            ));
            rows.push(Row::new([Cell::from(Line::from(title))]));
            continue;
        }
        let marker = if tweak.is_dirty() { UNSAVED } else { "" };
        rows.push(Row::new([
            Cell::from(Line::from(title)),
            Cell::from(""),
            Cell::from(""),
            Cell::from(""),
            Cell::from(Span::styled(marker, Style::default().fg(theme.dirty))),
        ]));

        let state = tweak.state();
        let dirty = state.dirty_fields();
        for field in tweak.definition().fields {
            if !field.is_visible(state.pending()) {
                continue;
            }
            let selected = field_index == app.selected;
            field_index += 1;

            let current = field.display_value(value_of(state.current(), field.key));
            let saved = state
                .saved()
                .map(|saved| field.display_value(value_of(saved, field.key)))
                .unwrap_or_else(|| "--".to_string());
            let pending = if selected && app.input_mode == InputMode::Edit {
                format!("{}\u{2588}", app.edit_buffer)
            } else {
                field.display_value(value_of(state.pending(), field.key))
            };
            let changed = dirty.contains(&field.key);

            let mut style = Style::default().fg(theme.text_primary);
            if selected {
                style = style.bg(theme.selection_bg).add_modifier(Modifier::BOLD);
            }
            let pending_style = if changed {
                Style::default().fg(theme.dirty)
            } else {
                Style::default()
            };
            rows.push(
                Row::new([
                    Cell::from(format!("  {}", field.label)),
                    Cell::from(truncate_unicode(&current, VALUE_WIDTH)),
                    Cell::from(truncate_unicode(&saved, VALUE_WIDTH)),
                    Cell::from(pending).style(pending_style),
                    Cell::from(if changed { "*" } else { "" }),
                ])
                .style(style),
            );
        }
    }

    let widths = [
        Constraint::Length(24),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Min(7),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
