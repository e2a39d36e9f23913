//! Fixed-rate simulation clock for Craftroom rooms.
//!
//! A room actor owns one [`TickScheduler`] and races
//! [`TickScheduler::wait_for_tick`] against its command channel:
//!
//! ```rust,ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => handle(cmd),
//!         tick = scheduler.wait_for_tick() => {
//!             world.tick(tick.number);
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! Tick numbers follow wall-clock time. When the actor falls behind, the
//! missed ticks are either skipped (numbers jump, so anything timed in
//! ticks such as the day/night cycle stays on schedule) or replayed in a
//! short burst, depending on [`LatePolicy`].

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do with ticks whose deadline already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatePolicy {
    /// Fire once and jump the tick number past the missed ones.
    #[default]
    Skip,
    /// Fire missed ticks back to back, at most `max_burst` of them; the rest
    /// are skipped.
    CatchUp { max_burst: u32 },
    /// Fire once and restart the schedule from now. Tick numbers stay
    /// dense but drift from wall-clock time.
    Slip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Ticks per second. Zero disables ticking entirely.
    pub rate_hz: u32,
    pub policy: LatePolicy,
    /// Fraction of the tick period a handler may use before a warning.
    pub budget_warn_ratio: f64,
    /// Upper bound of a random delay added before the first tick, so rooms
    /// created together do not tick in lockstep.
    pub start_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1,
            policy: LatePolicy::default(),
            budget_warn_ratio: 0.8,
            start_jitter: Duration::from_millis(50),
        }
    }
}

impl TickConfig {
    pub const MAX_RATE_HZ: u32 = 60;

    pub fn with_rate(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values.
    pub fn validated(mut self) -> Self {
        if self.rate_hz > Self::MAX_RATE_HZ {
            warn!(rate = self.rate_hz, max = Self::MAX_RATE_HZ, "tick rate clamped");
            self.rate_hz = Self::MAX_RATE_HZ;
        }
        self.budget_warn_ratio = self.budget_warn_ratio.clamp(0.0, 1.0);
        self
    }

    pub fn period(&self) -> Option<Duration> {
        (self.rate_hz > 0).then(|| Duration::from_secs(1) / self.rate_hz)
    }
}

// ---------------------------------------------------------------------------
// Tick info and stats
// ---------------------------------------------------------------------------

/// One fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Wall-clock aligned tick number, starting at 1.
    pub number: u64,
    /// Nominal period.
    pub dt: Duration,
    /// How far past its deadline this tick fired.
    pub late_by: Duration,
    /// Ticks dropped just before this one.
    pub skipped: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStats {
    pub fired: u64,
    pub skipped: u64,
    /// Ticks that fired at least one full period late.
    pub late: u64,
    pub slowest: Duration,
    pub last: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct TickScheduler {
    config: TickConfig,
    period: Option<Duration>,
    number: u64,
    deadline: Option<TokioInstant>,
    started: Option<Instant>,
    stats: TickStats,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.period();
        let deadline = period.map(|p| TokioInstant::now() + p + start_jitter(config.start_jitter));

        match period {
            Some(p) => debug!(rate_hz = config.rate_hz, period_ms = p.as_millis() as u64, policy = ?config.policy, "tick scheduler created"),
            None => debug!("tick scheduler created without a tick rate"),
        }

        Self {
            config,
            period,
            number: 0,
            deadline,
            started: None,
            stats: TickStats::default(),
        }
    }

    pub fn with_rate(rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(rate_hz))
    }

    /// Sleeps until the next tick is due.
    ///
    /// Pends forever when the rate is zero, which makes it safe as a
    /// `select!` branch.
    pub async fn wait_for_tick(&mut self) -> Tick {
        let (deadline, period) = match (self.deadline, self.period) {
            (Some(deadline), Some(period)) => (deadline, period),
            _ => std::future::pending().await,
        };

        time::sleep_until(deadline).await;

        let now = TokioInstant::now();
        self.started = Some(Instant::now());
        let late_by = now.saturating_duration_since(deadline);
        let missed = (late_by.as_nanos() / period.as_nanos()) as u64;

        let (skipped, next) = match self.config.policy {
            LatePolicy::Skip => (missed, deadline + periods(period, missed + 1)),
            LatePolicy::CatchUp { max_burst } => {
                let skipped = missed.saturating_sub(u64::from(max_burst));
                (skipped, deadline + periods(period, skipped + 1))
            }
            LatePolicy::Slip => (0, now + period),
        };
        if missed > 0 {
            warn!(
                tick = self.number + 1,
                missed,
                skipped,
                late_ms = late_by.as_millis() as u64,
                "tick running late"
            );
            self.stats.late += 1;
        }

        self.number += 1 + skipped;
        self.deadline = Some(next);
        self.stats.fired += 1;
        self.stats.skipped += skipped;
        trace!(tick = self.number, "tick fired");

        Tick {
            number: self.number,
            dt: period,
            late_by,
            skipped,
        }
    }

    /// Marks the end of the handler for the last fired tick and records
    /// how long it took. A call without a fired tick does nothing.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.started.take() else {
            return;
        };
        let elapsed = started.elapsed();
        self.stats.last = elapsed;
        self.stats.slowest = self.stats.slowest.max(elapsed);

        if let Some(period) = self.period {
            let used = elapsed.as_secs_f64() / period.as_secs_f64();
            if used >= self.config.budget_warn_ratio {
                warn!(
                    tick = self.number,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = period.as_secs_f64() * 1000.0,
                    "tick handler near its budget"
                );
            }
        }
    }

    /// True when configured with a zero rate.
    pub fn is_idle(&self) -> bool {
        self.period.is_none()
    }

    /// Number of the last fired tick.
    pub fn tick_count(&self) -> u64 {
        self.number
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn rate_hz(&self) -> u32 {
        self.config.rate_hz
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Ticks that make up `span`, rounded up. Zero when idle.
    pub fn ticks_in(&self, span: Duration) -> u64 {
        match self.period {
            Some(period) => span.as_nanos().div_ceil(period.as_nanos()) as u64,
            None => 0,
        }
    }
}

fn periods(period: Duration, n: u64) -> Duration {
    period.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}

fn start_jitter(bound: Duration) -> Duration {
    let bound_us = bound.as_micros() as u64;
    if bound_us == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::rng().random_range(0..bound_us))
}
