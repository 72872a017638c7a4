//! Polling scheduler for the monitor view.
//!
//! The sampler is `Polling` only while the monitor view is active and the
//! terminal is visible; otherwise it is `Idle` and issues no commands at all.
//! Ticks are serial: the next tick starts only after all three domain fetches
//! of the previous one have resolved.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, info};

use crate::system::collector::Collector;
use crate::system::snapshot::SystemSnapshot;

const MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Polling,
}

/// One completed tick, tagged with the polling session that produced it.
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub generation: u64,
    pub tick: u64,
    pub snapshot: SystemSnapshot,
}

struct Running {
    token: CancellationToken,
    _task: JoinHandle<()>,
}

pub struct Sampler {
    collector: Arc<Collector>,
    interval: Duration,
    tx: mpsc::UnboundedSender<SampleReport>,
    view_active: bool,
    page_visible: bool,
    generation: u64,
    running: Option<Running>,
}

impl Sampler {
    pub fn new(
        collector: Arc<Collector>,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SampleReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sampler = Self {
            collector,
            interval: interval.max(MIN_INTERVAL),
            tx,
            view_active: false,
            page_visible: true,
            generation: 0,
            running: None,
        };
        (sampler, rx)
    }

    pub fn state(&self) -> SamplerState {
        if self.running.is_some() {
            SamplerState::Polling
        } else {
            SamplerState::Idle
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_view_active(&mut self, active: bool) {
        self.view_active = active;
        self.reconcile();
    }

    pub fn set_page_visible(&mut self, visible: bool) {
        self.page_visible = visible;
        self.reconcile();
    }

    fn reconcile(&mut self) {
        if self.view_active && self.page_visible {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Starts polling. Calling this while already polling does nothing.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        self.generation += 1;
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.collector),
            self.interval,
            self.generation,
            token.clone(),
            self.tx.clone(),
        ));
        info!(generation = self.generation, interval = ?self.interval, "sampler polling");
        self.running = Some(Running { token, _task: task });
    }

    /// Cancels future ticks. A fetch already in flight is allowed to finish
    /// but its result is never sent.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
            info!(generation = self.generation, "sampler idle");
        }
    }

    /// Whether a report should still be rendered: the sampler must be polling
    /// and the report must come from the current session.
    pub fn accepts(&self, report: &SampleReport) -> bool {
        self.running.is_some() && report.generation == self.generation
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
        }
    }
}

async fn poll_loop(
    collector: Arc<Collector>,
    period: Duration,
    generation: u64,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<SampleReport>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        tick += 1;
        let snapshot = collector
            .sample()
            .instrument(debug_span!("sampler.tick", generation, tick))
            .await;

        if token.is_cancelled() {
            debug!(generation, tick, "discarding sample from stopped session");
            break;
        }
        let report = SampleReport {
            generation,
            tick,
            snapshot,
        };
        if tx.send(report).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedChannel;
    use crate::system::gpu::GpuProbe;

    fn device() -> Arc<ScriptedChannel> {
        let channel = Arc::new(ScriptedChannel::new());
        channel
            .respond("/proc/meminfo", "MemTotal: 1000 kB\nMemAvailable: 400 kB")
            .respond("cpufreq", "policy0|0 1|1000000|300000|1800000|schedutil")
            .respond("/sys/kernel/gpu", "600000");
        channel
    }

    fn sampler(channel: &Arc<ScriptedChannel>) -> (Sampler, mpsc::UnboundedReceiver<SampleReport>) {
        let collector = Arc::new(Collector::new(channel.clone(), GpuProbe::default()));
        Sampler::new(collector, Duration::from_secs(1))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SampleReport>) -> Vec<SampleReport> {
        let mut reports = Vec::new();
        while let Ok(report) = rx.try_recv() {
            reports.push(report);
        }
        reports
    }

    #[tokio::test(start_paused = true)]
    async fn idle_until_view_active() {
        let channel = device();
        let (sampler, _rx) = sampler(&channel);
        assert_eq!(sampler.state(), SamplerState::Idle);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(channel.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_once_per_second() {
        let channel = device();
        let (mut sampler, mut rx) = sampler(&channel);
        sampler.set_view_active(true);
        assert_eq!(sampler.state(), SamplerState::Polling);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].tick, 3);
        assert!(reports.iter().all(|r| r.snapshot.memory.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_noop() {
        let channel = device();
        let (mut sampler, _rx) = sampler(&channel);
        sampler.start();
        sampler.start();
        sampler.set_view_active(true);
        assert_eq!(sampler.generation(), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(channel.call_count("/proc/meminfo"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_page_suspends_polling() {
        let channel = device();
        let (mut sampler, mut rx) = sampler(&channel);
        sampler.set_page_visible(false);
        sampler.set_view_active(true);
        assert_eq!(sampler.state(), SamplerState::Idle);

        sampler.set_page_visible(true);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(drain(&mut rx).len(), 1);

        sampler.set_page_visible(false);
        let calls = channel.calls().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(channel.calls().len(), calls);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_never_overlap() {
        let channel = device();
        channel.set_delay(Duration::from_millis(2500));
        let (mut sampler, mut rx) = sampler(&channel);
        sampler.set_view_active(true);
        tokio::time::sleep(Duration::from_secs(6)).await;
        // Ticks start at 0s, 2.5s and 5s; the third is still in flight.
        assert_eq!(channel.call_count("/proc/meminfo"), 3);
        assert_eq!(drain(&mut rx).len(), 2);
        assert_eq!(channel.max_in_flight(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_after_stop_is_dropped() {
        let channel = device();
        channel.set_delay(Duration::from_millis(800));
        let (mut sampler, mut rx) = sampler(&channel);
        sampler.set_view_active(true);
        tokio::time::sleep(Duration::from_millis(400)).await;
        sampler.set_view_active(false);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(channel.call_count("/proc/meminfo"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_from_old_sessions_are_rejected() {
        let channel = device();
        let (mut sampler, mut rx) = sampler(&channel);
        sampler.set_view_active(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let old = drain(&mut rx).remove(0);
        assert!(sampler.accepts(&old));

        sampler.set_view_active(false);
        assert!(!sampler.accepts(&old));

        sampler.set_view_active(true);
        assert_eq!(sampler.generation(), 2);
        assert!(!sampler.accepts(&old));
    }
}
