use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::Tab;
use crate::system::device::DeviceInfo;
use crate::ui::theme::Theme;

const TABS: [Tab; 2] = [Tab::Monitor, Tab::Tweaks];

pub fn render(frame: &mut Frame, area: Rect, active: Tab, device: &DeviceInfo, theme: &Theme) {
    let mut spans = vec![Span::styled(
        " fctop ",
        Style::default()
            .fg(theme.header_accent_fg)
            .bg(theme.header_accent_bg)
            .add_modifier(Modifier::BOLD),
    )];

    for tab in TABS {
        spans.push(Span::raw(" "));
        let style = if tab == active {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
    }

    spans.push(Span::styled(
        format!("  {}", device.display_name()),
        Style::default().fg(theme.text_primary),
    ));
    spans.push(Span::styled(
        format!("  {}", device.family.label()),
        Style::default().fg(theme.text_secondary),
    ));
    if let Some(release) = &device.release {
        let mut kernel = release.linux_version.clone();
        if let Some(version) = &release.floppy_version {
            kernel.push_str(&format!(" {version}"));
        }
        if let Some(variant) = release.variant {
            kernel.push_str(&format!(" {}", variant.label()));
        }
        kernel.push_str(&format!(" {}", release.build.label()));
        spans.push(Span::styled(
            format!("  {kernel}"),
            Style::default().fg(theme.text_secondary),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
