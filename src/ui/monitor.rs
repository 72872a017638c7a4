use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Sparkline};

use crate::format::{ABSENT, format_bytes, format_freq_khz, format_kib, format_percent, or_absent};
use crate::monitor::{CpuView, MonitorView};
use crate::system::cpu::{CpuReport, CpuStatus, cluster_label};
use crate::system::device::DeviceInfo;
use crate::system::gpu::{GpuPlatform, GpuReading};
use crate::system::history::HistorySeries;
use crate::system::memory::{DirtyLimits, MemoryReport};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    monitor: &MonitorView,
    device: &DeviceInfo,
    theme: &Theme,
) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
    let [cpu_area, gpu_area] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(right);

    render_memory(frame, left, monitor, theme);
    render_cpu(frame, cpu_area, monitor, device, theme);
    render_gpu(frame, gpu_area, monitor.gpu.as_ref(), theme);
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn kv_line<'a>(label: &str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), Style::default().fg(theme.text_secondary)),
        Span::styled(value, Style::default().fg(theme.text_primary)),
    ])
}

fn placeholder(frame: &mut Frame, area: Rect, block: Block, theme: &Theme) {
    let text = Paragraph::new(Line::from(Span::styled(
        ABSENT,
        Style::default().fg(theme.text_secondary),
    )))
    .block(block);
    frame.render_widget(text, area);
}

fn render_memory(frame: &mut Frame, area: Rect, monitor: &MonitorView, theme: &Theme) {
    let Some(memory) = &monitor.memory else {
        placeholder(frame, area, panel("Memory", theme), theme);
        return;
    };

    let [ram_area, swap_area, ram_spark, swap_spark, info_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(3),
    ])
    .areas(area);

    let mem = &memory.meminfo;
    render_gauge(
        frame,
        ram_area,
        "RAM",
        mem.used_percent(),
        format!(
            "{} / {} ({})",
            format_kib(mem.used_kb()),
            format_kib(mem.total_kb()),
            format_percent(mem.used_percent())
        ),
        theme,
    );
    render_gauge(
        frame,
        swap_area,
        "Swap",
        mem.swap_used_percent(),
        format!(
            "{} / {} ({})",
            format_kib(mem.swap_used_kb()),
            format_kib(mem.swap_total_kb()),
            format_percent(mem.swap_used_percent())
        ),
        theme,
    );
    render_history(
        frame,
        ram_spark,
        "RAM history",
        &monitor.history.memory,
        theme.sparkline_memory,
        theme,
    );
    render_history(
        frame,
        swap_spark,
        "Swap history",
        &monitor.history.swap,
        theme.sparkline_swap,
        theme,
    );

    let info = Paragraph::new(memory_lines(memory, theme)).block(panel("VM", theme));
    frame.render_widget(info, info_area);
}

fn render_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    percent: f32,
    label: String,
    theme: &Theme,
) {
    let ratio = if percent.is_finite() {
        (percent as f64 / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(panel(title, theme))
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_history(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &HistorySeries,
    color: ratatui::style::Color,
    theme: &Theme,
) {
    let block = panel(title, theme);
    let points = series.points();
    if points.is_empty() {
        frame.render_widget(block, area);
        return;
    }
    // Percent with two decimals of resolution.
    let data: Vec<u64> = points.iter().map(|p| (p * 100.0).round() as u64).collect();
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(10000)
        .style(Style::default().fg(color));
    frame.render_widget(sparkline, area);
}

fn memory_lines<'a>(memory: &MemoryReport, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        kv_line(
            "ZRAM size",
            memory
                .zram_disksize
                .filter(|size| *size > 0)
                .map(format_bytes)
                .unwrap_or_else(|| ABSENT.to_string()),
            theme,
        ),
        kv_line(
            "ZRAM algorithm",
            memory
                .zram_algorithm
                .clone()
                .unwrap_or_else(|| ABSENT.to_string()),
            theme,
        ),
        kv_line(
            "Swappiness",
            memory
                .swappiness
                .clone()
                .unwrap_or_else(|| ABSENT.to_string()),
            theme,
        ),
    ];
    match &memory.dirty {
        DirtyLimits::Ratio { dirty, background } => {
            let show = |v: &Option<String>| match v {
                Some(v) => format!("{v}%"),
                None => ABSENT.to_string(),
            };
            lines.push(kv_line("Dirty ratio", show(dirty), theme));
            lines.push(kv_line("Dirty bg ratio", show(background), theme));
        }
        DirtyLimits::Bytes { dirty, background } => {
            lines.push(kv_line("Dirty bytes", format_bytes(*dirty), theme));
            lines.push(kv_line("Dirty bg bytes", format_bytes(*background), theme));
        }
    }
    lines
}

fn render_cpu(
    frame: &mut Frame,
    area: Rect,
    monitor: &MonitorView,
    device: &DeviceInfo,
    theme: &Theme,
) {
    let title = format!("CPU ({})", monitor.cpu_view.label());
    let block = panel(&title, theme);
    let Some(cpu) = &monitor.cpu else {
        placeholder(frame, area, block, theme);
        return;
    };
    let mut lines = cpu_lines(cpu, monitor, theme);
    let status = cpu.status(device.family);
    if !status.is_empty() {
        lines.push(Line::raw(""));
        lines.extend(status_lines(&status, theme));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn cpu_lines<'a>(cpu: &'a CpuReport, monitor: &MonitorView, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for policy in &cpu.policies {
        let label = cluster_label(policy, &monitor.roles);
        match monitor.cpu_view {
            CpuView::Cluster => {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{label:<24}"),
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:>10}", format_freq_khz(policy.cur_khz)),
                        Style::default().fg(theme.text_primary),
                    ),
                    Span::styled(
                        format!(
                            "  {} - {}  {}",
                            format_freq_khz(policy.min_khz),
                            format_freq_khz(policy.max_khz),
                            or_absent(&policy.governor)
                        ),
                        Style::default().fg(theme.text_secondary),
                    ),
                ]));
            }
            CpuView::Core => {
                lines.push(Line::from(Span::styled(
                    label,
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                for (core, khz) in cpu.core_frequencies(policy) {
                    lines.push(kv_line(&format!("  {core}"), format_freq_khz(khz), theme));
                }
            }
        }
    }
    lines
}

fn status_lines<'a>(status: &CpuStatus, theme: &Theme) -> Vec<Line<'a>> {
    [
        ("Unlocked", &status.unlocked),
        ("EMS efficient", &status.ems_efficient),
        ("MSM perf boost", &status.msm_perf_boost),
    ]
    .into_iter()
    .filter_map(|(label, flag)| flag.as_ref().map(|flag| kv_line(label, flag.label(), theme)))
    .collect()
}

fn render_gpu(frame: &mut Frame, area: Rect, gpu: Option<&GpuReading>, theme: &Theme) {
    let Some(gpu) = gpu else {
        placeholder(frame, area, panel("GPU", theme), theme);
        return;
    };
    let platform = match gpu.platform() {
        GpuPlatform::Adreno => "Adreno",
        _ => "Exynos",
    };
    let title = format!("GPU ({platform})");
    let clocks = gpu.clocks();
    let mut lines = vec![
        kv_line("Model", or_absent(&clocks.model).to_string(), theme),
        kv_line("Current", format_freq_khz(clocks.cur_khz), theme),
        kv_line(
            "Range",
            format!(
                "{} - {}",
                format_freq_khz(clocks.min_khz),
                format_freq_khz(clocks.max_khz)
            ),
            theme,
        ),
        kv_line("Governor", or_absent(&clocks.governor).to_string(), theme),
    ];
    for (label, value) in gpu.features() {
        lines.push(kv_line(label, value, theme));
    }
    frame.render_widget(Paragraph::new(lines).block(panel(&title, theme)), area);
}
