use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::HelpSection;
use crate::ui::theme::Theme;

const KEY_WIDTH: usize = 8;

/// Centered overlay listing keybinds under one heading per tab.
pub fn render(frame: &mut Frame, area: Rect, sections: &[HelpSection], theme: &Theme) {
    let lines = help_lines(sections, theme);

    let width = 44u16.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keybinds ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            " Esc closes ",
            Style::default().fg(theme.text_secondary),
        )));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().bg(theme.surface_bg)),
        overlay,
    );
}

fn help_lines<'a>(sections: &'a [HelpSection], theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (idx, section) in sections.iter().enumerate() {
        if section.entries.is_empty() {
            continue;
        }
        if idx > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for (key, desc) in &section.entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {key:>KEY_WIDTH$} "),
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
            ]));
        }
    }
    lines
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
