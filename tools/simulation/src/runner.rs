//! Generator loop
//!
//! produce → submit → log → sleep, forever (or until `max_records`).
//! A failed submission is logged and the loop carries on.

use std::time::Duration;

use tracing::{info, warn};

use crate::bots::RecordSource;
use crate::submit::Submitter;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Label used in log lines.
    pub name: String,
    pub interval: Duration,
    /// Stop after this many records; `None` runs until the source ends.
    pub max_records: Option<u64>,
}

impl GeneratorConfig {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            max_records: None,
        }
    }

    pub fn with_max_records(mut self, max_records: u64) -> Self {
        self.max_records = Some(max_records);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub submitted: u64,
    pub failed: u64,
}

impl GeneratorStats {
    pub fn produced(&self) -> u64 {
        self.submitted + self.failed
    }
}

pub async fn run_generator<S: RecordSource>(
    mut source: S,
    submitter: &Submitter,
    config: &GeneratorConfig,
) -> GeneratorStats {
    let mut stats = GeneratorStats::default();

    info!(
        generator = %config.name,
        endpoint = submitter.endpoint(),
        interval_secs = config.interval.as_secs(),
        "Generator started"
    );

    loop {
        let Some(record) = source.next_record().await else {
            info!(generator = %config.name, "Record source exhausted");
            break;
        };

        match submitter.submit(&record).await {
            Ok(()) => {
                stats.submitted += 1;
                info!(generator = %config.name, ?record, "Record submitted");
            }
            Err(e) => {
                stats.failed += 1;
                warn!(generator = %config.name, error = %e, "Error while adding data");
            }
        }

        if config.max_records.is_some_and(|max| stats.produced() >= max) {
            break;
        }

        tokio::time::sleep(config.interval).await;
    }

    stats
}
