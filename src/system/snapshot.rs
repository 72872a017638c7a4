use serde::Serialize;

use crate::system::cpu::CpuReport;
use crate::system::gpu::GpuReading;
use crate::system::memory::MemoryReport;

/// One tick's readings. A domain whose fetch failed is `None`; the others
/// are still valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub memory: Option<MemoryReport>,
    pub cpu: Option<CpuReport>,
    pub gpu: Option<GpuReading>,
}

impl SystemSnapshot {
    pub fn is_empty(&self) -> bool {
        self.memory.is_none() && self.cpu.is_none() && self.gpu.is_none()
    }
}
