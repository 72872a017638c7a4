use crate::system::cpu::{ClusterRoleMap, CpuReport, classify_clusters};
use crate::system::gpu::GpuReading;
use crate::system::history::HistoryStore;
use crate::system::memory::MemoryReport;
use crate::system::snapshot::SystemSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpuView {
    #[default]
    Cluster,
    Core,
}

impl CpuView {
    pub fn toggle(self) -> Self {
        match self {
            CpuView::Cluster => CpuView::Core,
            CpuView::Core => CpuView::Cluster,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CpuView::Cluster => "Clusters",
            CpuView::Core => "Cores",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "core" | "cores" => CpuView::Core,
            _ => CpuView::Cluster,
        }
    }
}

/// What the monitor view shows, rebuilt from each accepted tick.
#[derive(Debug, Clone, Default)]
pub struct MonitorView {
    pub history: HistoryStore,
    pub memory: Option<MemoryReport>,
    pub cpu: Option<CpuReport>,
    pub gpu: Option<GpuReading>,
    pub roles: ClusterRoleMap,
    pub cpu_view: CpuView,
    pub ticks: u64,
}

impl MonitorView {
    pub fn new(history_length: usize, cpu_view: CpuView) -> Self {
        Self {
            history: HistoryStore::new(history_length),
            cpu_view,
            ..Self::default()
        }
    }

    /// Fans a tick out to the history series and the cluster roles. A domain
    /// missing from this tick clears its panel; history only grows on ticks
    /// that produced memory data.
    pub fn ingest(&mut self, snapshot: SystemSnapshot) {
        if let Some(memory) = &snapshot.memory {
            self.history.record(
                memory.meminfo.used_percent(),
                memory.meminfo.swap_used_percent(),
            );
        }
        self.roles = snapshot
            .cpu
            .as_ref()
            .map(|cpu| classify_clusters(&cpu.policies))
            .unwrap_or_default();
        self.memory = snapshot.memory;
        self.cpu = snapshot.cpu;
        self.gpu = snapshot.gpu;
        self.ticks += 1;
    }

    pub fn toggle_cpu_view(&mut self) {
        self.cpu_view = self.cpu_view.toggle();
    }
}
