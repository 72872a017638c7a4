use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::action::{Action, Direction};
use crate::app::{App, InputMode, ResolvedKeybinds, StatusMessage, Tab};
use crate::channel::scripted::ScriptedChannel;
use crate::config::{Config, KeybindsConfig};
use crate::monitor::{CpuView, MonitorView};
use crate::sampler::Sampler;
use crate::system::collector::Collector;
use crate::system::cpu::CpuReport;
use crate::system::device::DeviceInfo;
use crate::system::gpu::{GpuProbe, parse_exynos};
use crate::system::memory::MemoryReport;
use crate::system::snapshot::SystemSnapshot;
use crate::system::units::UnitThresholds;
use crate::tweaks::TweakStore;
use crate::ui::theme::Theme;
use crate::ui::{header, help, monitor, statusbar};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn floppy_device() -> DeviceInfo {
    DeviceInfo::from_parts(
        Some("a25x"),
        Some("SM-A256E"),
        Some("5.10.247-Floppy-v6.2-RKS-g4184e67c28bf-dirty"),
    )
}

fn make_snapshot() -> SystemSnapshot {
    let memory = "MemTotal: 1000 kB\nMemAvailable: 250 kB\nSwapTotal: 100 kB\nSwapFree: 50 kB\n__SEP__\n2147483648\n__SEP__\nlzo [lz4] zstd\n__SEP__\n100\n__SEP__\n20\n__SEP__\n0\n__SEP__\n10\n__SEP__\n0";
    let cpu = "policy0|0 1|1000000|300000|1800000|schedutil\npolicy4|4 5|2400000|500000|2800000|schedutil\n__SEP__\ncpu0|1000000\ncpu1|900000\ncpu4|2400000\ncpu5|2200000\n__SEP__\nconsole=ttyS0 superfloppy=2";
    let gpu = "600000\n__SEP__\n100000\n__SEP__\n900000\n__SEP__\ninteractive\n__SEP__\n1\n__SEP__\n0\n__SEP__\nMali-G68";
    SystemSnapshot {
        memory: Some(MemoryReport::parse(memory)),
        cpu: Some(CpuReport::parse(cpu)),
        gpu: parse_exynos(gpu, &UnitThresholds::default()),
    }
}

fn monitor_view(cpu_view: CpuView) -> MonitorView {
    let mut view = MonitorView::new(60, cpu_view);
    view.ingest(make_snapshot());
    view
}

#[test]
fn header_shows_tabs_and_kernel() {
    let device = floppy_device();
    let theme = Theme::dark();
    let output = render_to_string(140, 1, |frame| {
        header::render(frame, frame.area(), Tab::Monitor, &device, &theme);
    });
    assert!(output.contains("fctop"));
    assert!(output.contains("Monitor"));
    assert!(output.contains("Tweaks"));
    assert!(output.contains("SM-A256E (a25x)"));
    assert!(output.contains("Floppy1280"));
    assert!(output.contains("v6.2 RKSU"));
}

#[test]
fn monitor_cluster_view_renders_all_domains() {
    let view = monitor_view(CpuView::Cluster);
    let device = floppy_device();
    let theme = Theme::dark();
    let output = render_to_string(160, 30, |frame| {
        monitor::render(frame, frame.area(), &view, &device, &theme);
    });
    assert!(output.contains("(75.0%)"));
    assert!(output.contains("Little - 0 (cpu0-1)"));
    assert!(output.contains("Big - 4 (cpu4-5)"));
    assert!(output.contains("2.40 GHz"));
    assert!(output.contains("Enabled (2)"));
    assert!(output.contains("GPU (Exynos)"));
    assert!(output.contains("Mali-G68"));
    assert!(output.contains("600 MHz"));
    assert!(output.contains("2.0 GiB"));
    assert!(output.contains("lz4"));
}

#[test]
fn monitor_core_view_lists_cores() {
    let view = monitor_view(CpuView::Core);
    let device = DeviceInfo::default();
    let theme = Theme::dark();
    let output = render_to_string(160, 30, |frame| {
        monitor::render(frame, frame.area(), &view, &device, &theme);
    });
    assert!(output.contains("CPU (Cores)"));
    assert!(output.contains("cpu1"));
    assert!(output.contains("900 MHz"));
    assert!(output.contains("Unlocked"));
}

#[test]
fn monitor_without_data_shows_placeholders() {
    let view = MonitorView::new(60, CpuView::Cluster);
    let device = DeviceInfo::default();
    let theme = Theme::light();
    let output = render_to_string(100, 24, |frame| {
        monitor::render(frame, frame.area(), &view, &device, &theme);
    });
    assert!(output.contains("Memory"));
    assert!(output.contains("GPU"));
    assert!(output.contains("--"));
}

#[test]
fn statusbar_prefers_status_message() {
    let theme = Theme::dark();
    let status = StatusMessage {
        text: "zram: backend rejected save".to_string(),
        is_error: true,
        created: Instant::now(),
    };
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(
            frame,
            frame.area(),
            Tab::Tweaks,
            InputMode::Normal,
            "",
            Some(&status),
            true,
            &theme,
        );
    });
    assert!(output.contains("zram: backend rejected save"));
    assert!(!output.contains("Quit"));
}

#[test]
fn statusbar_edit_mode_shows_buffer() {
    let theme = Theme::dark();
    let output = render_to_string(100, 1, |frame| {
        statusbar::render(
            frame,
            frame.area(),
            Tab::Tweaks,
            InputMode::Edit,
            "2048",
            None,
            false,
            &theme,
        );
    });
    assert!(output.contains("Edit"));
    assert!(output.contains("2048"));
    assert!(output.contains("Cancel"));
}

#[test]
fn statusbar_flags_unsaved_changes() {
    let theme = Theme::dark();
    let output = render_to_string(160, 1, |frame| {
        statusbar::render(
            frame,
            frame.area(),
            Tab::Tweaks,
            InputMode::Normal,
            "",
            None,
            true,
            &theme,
        );
    });
    assert!(output.contains("Save"));
    assert!(output.contains("unsaved changes"));
}

#[test]
fn help_overlay_groups_keybinds_by_tab() {
    let theme = Theme::dark();
    let keybinds = ResolvedKeybinds::from_config(&KeybindsConfig::default());
    let sections = keybinds.help_sections();
    let output = render_to_string(80, 30, |frame| {
        help::render(frame, frame.area(), &sections, &theme);
    });
    assert!(output.contains("Keybinds"));
    assert!(output.contains("Global"));
    assert!(output.contains("Monitor"));
    assert!(output.contains("Clusters / cores"));
    assert!(output.contains("Save tweak"));
    assert!(output.contains("Esc closes"));
}

fn tweak_device() -> Arc<ScriptedChannel> {
    let channel = Arc::new(ScriptedChannel::new());
    channel
        .respond(
            "zram.sh' get_current",
            "disksize=4294967296\nalgorithm=lz4\nenabled=1\navailable=lz4,zstd",
        )
        .respond("zram.sh' get_saved", "")
        .respond("thermal.sh' is_available", "available=0");
    channel
}

#[tokio::test]
async fn tweaks_tab_shows_state_columns() {
    let channel = tweak_device();
    let mut config = Config::default();
    config.general.start_tab = "tweaks".to_string();
    let collector = Arc::new(Collector::new(channel.clone(), GpuProbe::default()));
    let (sampler, _rx) = Sampler::new(collector, Duration::from_secs(60));
    let tweaks = TweakStore::builtin(channel.clone(), Path::new("/m"));
    let mut app = App::new(&config, sampler, tweaks, DeviceInfo::default());
    app.load_tweaks().await;

    app.dispatch(Action::Navigate(Direction::Down)).await;
    app.dispatch(Action::Navigate(Direction::Right)).await;

    let output = render_to_string(100, 14, |frame| crate::ui::draw(frame, &app));
    assert!(output.contains("ZRAM"));
    assert!(output.contains("4096 MiB"));
    assert!(output.contains("Algorithm"));
    assert!(output.contains("zstd"));
    assert!(output.contains("unsaved"));
    assert!(output.contains("Thermal"));
    assert!(output.contains("not available"));
}
