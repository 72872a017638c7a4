use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use std::hint::black_box;
use fctop::monitor::{CpuView, MonitorView};
use fctop::system::cpu::{CpuReport, classify_clusters};
use fctop::system::device::DeviceInfo;
use fctop::system::gpu::parse_adreno;
use fctop::system::history::HistorySeries;
use fctop::system::memory::MemoryReport;
use fctop::system::snapshot::SystemSnapshot;
use fctop::system::units::UnitThresholds;
use fctop::ui::monitor;
use fctop::ui::theme::Theme;

const MEMORY_OUTPUT: &str = "MemTotal: 7823456 kB\nMemFree: 123456 kB\nMemAvailable: 3456789 kB\nBuffers: 1234 kB\nCached: 2345678 kB\nSwapTotal: 4194300 kB\nSwapFree: 2097150 kB\n__SEP__\n4294967296\n__SEP__\nlzo [lz4] zstd\n__SEP__\n100\n__SEP__\n20\n__SEP__\n0\n__SEP__\n10\n__SEP__\n0";

const ADRENO_OUTPUT: &str = "585000000\n__SEP__\n257000000\n__SEP__\n840000000\n__SEP__\nmsm-adreno-tz\n__SEP__\nAdreno610v1\n__SEP__\n2\n__SEP__\nY\n__SEP__\n15\n__SEP__\n50\n__SEP__\n5000";

fn make_cpu_output(policies: usize) -> String {
    let mut out = String::new();
    let mut core = 0;
    for idx in 0..policies {
        let cpus: Vec<String> = (core..core + 2).map(|c| c.to_string()).collect();
        out.push_str(&format!(
            "policy{core}|{}|{}|300000|2800000|schedutil\n",
            cpus.join(" "),
            1_000_000 + idx * 100_000
        ));
        core += 2;
    }
    out.push_str("__SEP__\n");
    for c in 0..core {
        out.push_str(&format!("cpu{c}|{}\n", 900_000 + c * 10_000));
    }
    out.push_str("__SEP__\nconsole=ttyS0 superfloppy=1 ems_efficient=0");
    out
}

fn bench_parsers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_domains");
    let thresholds = UnitThresholds::default();

    group.bench_function("memory", |b| {
        b.iter(|| black_box(MemoryReport::parse(black_box(MEMORY_OUTPUT))))
    });
    group.bench_function("adreno", |b| {
        b.iter(|| black_box(parse_adreno(black_box(ADRENO_OUTPUT), &thresholds)))
    });
    for policies in [2usize, 3, 8] {
        let output = make_cpu_output(policies);
        group.bench_with_input(BenchmarkId::new("cpu", policies), &output, |b, output| {
            b.iter(|| {
                let report = CpuReport::parse(black_box(output));
                black_box(classify_clusters(&report.policies));
            })
        });
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_push_points_60_600");

    for capacity in [60usize, 600] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut series = HistorySeries::new(capacity);
                let mut value = 0.0f32;
                b.iter(|| {
                    value = (value + 7.5) % 100.0;
                    series.push(black_box(value));
                    black_box(series.points());
                })
            },
        );
    }

    group.finish();
}

fn bench_monitor_render(c: &mut Criterion) {
    let mut view = MonitorView::new(60, CpuView::Core);
    let thresholds = UnitThresholds::default();
    for _ in 0..60 {
        view.ingest(SystemSnapshot {
            memory: Some(MemoryReport::parse(MEMORY_OUTPUT)),
            cpu: Some(CpuReport::parse(&make_cpu_output(3))),
            gpu: Some(parse_adreno(ADRENO_OUTPUT, &thresholds)),
        });
    }
    let device = DeviceInfo::default();
    let theme = Theme::dark();

    c.bench_function("monitor_render_160x50", |b| {
        b.iter(|| {
            let backend = TestBackend::new(160, 50);
            let mut terminal = Terminal::new(backend).expect("bench terminal init failed");
            terminal
                .draw(|frame| {
                    monitor::render(frame, Rect::new(0, 0, 160, 50), black_box(&view), &device, &theme);
                })
                .expect("bench draw failed");
            black_box(terminal.backend());
        })
    });
}

criterion_group!(benches, bench_parsers, bench_history, bench_monitor_render);
criterion_main!(benches);
