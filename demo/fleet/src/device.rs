//! Simulated device loop.
//!
//! A device waits a random startup delay in `[0, batch_interval)` so a fleet
//! started together does not flush in lockstep, then runs two timers:
//!
//! - every `sample_interval` it advances its signals and buffers a sample
//! - every `batch_interval` it drains the buffer and hands a non-empty batch
//!   to the dispatcher without waiting for the upload
//!
//! Both timers first fire one full period after the startup delay. Ticks
//! missed while the task was descheduled are skipped, not replayed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use telemetry_core::MetricPayload;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::buffer::SampleBuffer;
use crate::dispatcher::{dispatch, Dispatcher};
use crate::signal::EnvironmentSignals;

/// Timer settings for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Time between samples
    pub sample_interval: Duration,
    /// Time between batch uploads
    pub batch_interval: Duration,
}

/// One simulated device.
pub struct DeviceSimulator {
    asset_id: Uuid,
    config: DeviceConfig,
    signals: EnvironmentSignals,
    buffer: SampleBuffer,
    dispatcher: Arc<dyn Dispatcher>,
    rng: StdRng,
}

impl DeviceSimulator {
    /// Create a device with a fresh asset id and entropy-seeded signals.
    pub fn new(config: DeviceConfig, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_rng(config, dispatcher, StdRng::from_entropy())
    }

    /// Create a device driven by the given generator.
    pub fn with_rng(config: DeviceConfig, dispatcher: Arc<dyn Dispatcher>, mut rng: StdRng) -> Self {
        let signals = EnvironmentSignals::start(&mut rng);
        Self {
            asset_id: Uuid::new_v4(),
            config,
            signals,
            buffer: SampleBuffer::new(),
            dispatcher,
            rng,
        }
    }

    /// Asset identifier reported with every batch
    pub fn asset_id(&self) -> Uuid {
        self.asset_id
    }

    /// Draw a startup delay in `[0, batch_interval)`.
    pub fn startup_delay(&mut self) -> Duration {
        let window = u64::try_from(self.config.batch_interval.as_nanos()).unwrap_or(u64::MAX);
        if window == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.rng.gen_range(0..window))
    }

    /// Advance the signals and buffer a sample stamped `ts`.
    pub fn record_sample(&mut self, ts: DateTime<Utc>) {
        let sample = self.signals.sample(&mut self.rng, ts);
        self.buffer.push(sample);
    }

    /// Drain the buffer and ship it in the background.
    ///
    /// Returns `None` without dispatching when nothing is buffered.
    pub fn flush(&self) -> Option<JoinHandle<()>> {
        let samples = self.buffer.drain()?;
        let payload = MetricPayload::new(self.asset_id.to_string(), samples);
        info!(
            asset_id = %self.asset_id,
            samples = payload.len(),
            "Sending metrics batch"
        );
        Some(dispatch(self.dispatcher.clone(), payload))
    }

    /// Run until the task is aborted.
    pub async fn run(mut self) {
        let delay = self.startup_delay();
        info!(
            asset_id = %self.asset_id,
            interval = ?self.config.sample_interval,
            batch = ?self.config.batch_interval,
            startup_delay = ?delay,
            "Starting device"
        );
        tokio::time::sleep(delay).await;

        let clock = SampleClock::start();
        let mut sample_timer = timer(self.config.sample_interval);
        let mut batch_timer = timer(self.config.batch_interval);

        loop {
            tokio::select! {
                fired = sample_timer.tick() => {
                    self.record_sample(clock.at(fired));
                }
                _ = batch_timer.tick() => {
                    self.flush();
                }
            }
        }
    }
}

/// Spawn `count` devices sharing one dispatcher.
pub fn spawn_fleet(
    count: usize,
    config: DeviceConfig,
    dispatcher: Arc<dyn Dispatcher>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|_| tokio::spawn(DeviceSimulator::new(config, dispatcher.clone()).run()))
        .collect()
}

fn timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

/// Maps monotonic instants onto wall-clock time from a single anchor, so
/// sample timestamps never move backwards when the system clock is adjusted.
struct SampleClock {
    wall: DateTime<Utc>,
    instant: Instant,
}

impl SampleClock {
    fn start() -> Self {
        Self {
            wall: Utc::now(),
            instant: Instant::now(),
        }
    }

    fn at(&self, instant: Instant) -> DateTime<Utc> {
        let elapsed = instant.saturating_duration_since(self.instant);
        self.wall + chrono::Duration::from_std(elapsed).unwrap_or_default()
    }
}
