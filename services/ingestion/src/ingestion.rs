//! Ingestion loop
//!
//! Alternates between two states, Idle and Fetching, until the process
//! exits. Each Fetching pass polls the feed once and inserts every feature
//! the magnitude policy accepts.
//!
//! Failure handling is explicit configuration:
//! - [`FailurePolicy::Exit`]: the first failed cycle ends the loop with its
//!   error; the caller terminates the process.
//! - [`FailurePolicy::Log`]: a failed cycle is retried with exponential
//!   backoff, and if every attempt fails the cycle is logged and skipped.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use quake_store::SharedStore;
use quake_types::errors::{FetchError, StoreError};
use quake_types::filter::RecordPolicy;
use tracing::{debug, error, info, warn};

use crate::feed::FeedSource;

/// Errors that end an ingestion cycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("insert failed after {inserted} records: {source}")]
    Store {
        inserted: usize,
        #[source]
        source: StoreError,
    },
}

/// What happens when a cycle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the loop and surface the error.
    Exit,
    /// Retry, then log and wait for the next cycle.
    #[default]
    Log,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exit" | "fail-fast" => Ok(FailurePolicy::Exit),
            "log" | "retry" => Ok(FailurePolicy::Log),
            other => Err(format!("unknown failure policy '{other}' (expected 'log' or 'exit')")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Exit => write!(f, "exit"),
            FailurePolicy::Log => write!(f, "log"),
        }
    }
}

/// Bounded exponential backoff between attempts of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per cycle, including the first (minimum 1).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

/// Configuration for the ingestion loop.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// `None` runs a single cycle at startup.
    pub interval: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub retry: RetryPolicy,
    pub policy: RecordPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(120)),
            failure_policy: FailurePolicy::Log,
            retry: RetryPolicy::default(),
            policy: RecordPolicy::unfiltered(),
        }
    }
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub fetched: usize,
    pub inserted: usize,
    /// Features rejected by the magnitude policy.
    pub skipped: usize,
}

/// Running totals across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub attempts: u64,
    pub inserted: u64,
    pub skipped: u64,
}

/// Drives a feed into the store.
pub struct Ingester<F> {
    feed: F,
    store: SharedStore,
    config: IngestConfig,
    stats: IngestStats,
}

impl<F: FeedSource> Ingester<F> {
    pub fn new(feed: F, store: SharedStore, config: IngestConfig) -> Self {
        info!(
            interval_secs = config.interval.map(|d| d.as_secs()),
            failure_policy = %config.failure_policy,
            min_magnitude = config.policy.min_magnitude,
            "Ingester initialized"
        );

        Self {
            feed,
            store,
            config,
            stats: IngestStats::default(),
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Poll the feed once and insert accepted features.
    ///
    /// Records inserted before a store failure stay inserted.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, IngestError> {
        self.stats.attempts += 1;

        let features = self.feed.fetch_latest().await?;
        let mut report = CycleReport {
            fetched: features.len(),
            ..CycleReport::default()
        };

        for feature in features {
            let record = feature.into_record();
            if !self.config.policy.accepts(&record) {
                report.skipped += 1;
                continue;
            }

            if let Err(source) = self.store.insert_record(&record).await {
                self.stats.inserted += report.inserted as u64;
                self.stats.skipped += report.skipped as u64;
                return Err(IngestError::Store {
                    inserted: report.inserted,
                    source,
                });
            }
            report.inserted += 1;
        }

        self.stats.inserted += report.inserted as u64;
        self.stats.skipped += report.skipped as u64;
        Ok(report)
    }

    /// Run one cycle, retrying per the configured policy.
    ///
    /// Under [`FailurePolicy::Exit`] there is exactly one attempt.
    ///
    /// A retry re-runs the whole cycle. Records inserted before a store
    /// failure stay inserted and are written again by the next attempt, so
    /// an N-feature feed can produce more than N rows in one cycle.
    pub async fn run_cycle_with_retry(&mut self) -> Result<CycleReport, IngestError> {
        let attempts = match self.config.failure_policy {
            FailurePolicy::Exit => 1,
            FailurePolicy::Log => self.config.retry.max_attempts.max(1),
        };

        let mut attempt = 1;
        loop {
            match self.run_cycle().await {
                Ok(report) => return Ok(report),
                Err(err) if attempt < attempts => {
                    let delay = self.config.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Ingestion attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Run until the process exits (or once, with no interval).
    ///
    /// Returns `Err` only under [`FailurePolicy::Exit`].
    pub async fn run(&mut self) -> Result<(), IngestError> {
        loop {
            debug!("Ingestion cycle starting");

            match self.run_cycle_with_retry().await {
                Ok(report) => {
                    self.stats.cycles += 1;
                    info!(
                        fetched = report.fetched,
                        inserted = report.inserted,
                        skipped = report.skipped,
                        "Ingestion cycle complete"
                    );
                }
                Err(err) => {
                    self.stats.cycles += 1;
                    self.stats.failed_cycles += 1;
                    match self.config.failure_policy {
                        FailurePolicy::Exit => {
                            error!(error = %err, "Ingestion failed, stopping");
                            return Err(err);
                        }
                        FailurePolicy::Log => {
                            error!(error = %err, "Ingestion cycle failed, waiting for next cycle");
                        }
                    }
                }
            }

            match self.config.interval {
                Some(interval) => tokio::time::sleep(interval).await,
                None => return Ok(()),
            }
        }
    }
}
