use tracing::{Instrument, debug, debug_span};

use crate::channel::SharedChannel;
use crate::system::gpu::GpuProbe;
use crate::system::snapshot::SystemSnapshot;
use crate::system::{cpu, gpu, memory};

/// Gathers one tick's worth of readings from the device.
pub struct Collector {
    channel: SharedChannel,
    gpu_probe: GpuProbe,
}

impl Collector {
    pub fn new(channel: SharedChannel, gpu_probe: GpuProbe) -> Self {
        Self { channel, gpu_probe }
    }

    pub fn gpu_probe(&self) -> &GpuProbe {
        &self.gpu_probe
    }

    /// Fetches memory, CPU and GPU concurrently and returns once all three
    /// have resolved. Each domain fails on its own.
    pub async fn sample(&self) -> SystemSnapshot {
        let channel = self.channel.as_ref();
        async {
            let (memory, cpu, gpu) = tokio::join!(
                memory::fetch(channel),
                cpu::fetch(channel),
                gpu::fetch(channel, &self.gpu_probe),
            );
            let snapshot = SystemSnapshot { memory, cpu, gpu };
            debug!(
                memory = snapshot.memory.is_some(),
                cpu = snapshot.cpu.is_some(),
                gpu = snapshot.gpu.is_some(),
                "sample complete"
            );
            snapshot
        }
        .instrument(debug_span!("collector.sample"))
        .await
    }
}
