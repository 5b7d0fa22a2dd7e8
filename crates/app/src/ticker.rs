//! Quota ticker: the background task that advances every service's quota
//! once per period and resets all quotas once a day.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use quotaswitch_domain::time::ResetSchedule;

use crate::ports::{FirewallBackend, MetricsRecorder};
use crate::services::control_service::ControlService;

/// Default tick period: quotas are counted in minutes.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Periodic driver for [`ControlService::tick_all`] and
/// [`ControlService::reset_all`].
pub struct QuotaTicker<B, M> {
    control: Arc<ControlService<B, M>>,
    period: Duration,
    schedule: ResetSchedule,
    clock: fn() -> NaiveTime,
}

fn local_time() -> NaiveTime {
    chrono::Local::now().time()
}

impl<B, M> QuotaTicker<B, M>
where
    B: FirewallBackend + Send + Sync + 'static,
    M: MetricsRecorder + Send + Sync + 'static,
{
    /// Create a ticker over the given control service.
    pub fn new(control: Arc<ControlService<B, M>>, period: Duration, schedule: ResetSchedule) -> Self {
        Self {
            control,
            period,
            schedule,
            clock: local_time,
        }
    }

    /// Replace the wall clock consulted for the reset check (local time by default).
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the ticker loop on the current runtime.
    ///
    /// The task runs until `cancel` is triggered.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Tick every period until `cancel` is triggered.
    ///
    /// The first firing happens one full period after start. A firing that
    /// runs late delays the following ones instead of bursting to catch up.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            period_secs = self.period.as_secs(),
            reset_hour = self.schedule.hour(),
            "quota ticker started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.run_once((self.clock)()).await;
                }
            }
        }

        tracing::info!("quota ticker stopped");
    }

    /// One firing: tick every service, then reset all quotas if `at` is the
    /// configured reset time. Returns whether a reset happened.
    pub async fn run_once(&self, at: NaiveTime) -> bool {
        self.control.tick_all().await;

        if self.schedule.is_due(at) {
            self.control.reset_all().await;
            return true;
        }
        false
    }
}
