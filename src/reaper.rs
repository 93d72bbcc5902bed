use chrono::{DateTime, Duration, Utc};

use crate::client::RegistryClient;
use crate::config::ReaperConfig;
use crate::error::{ReaperError, Result};
use crate::token::TokenProvider;
use crate::types::TagRecord;

/// Cut-off point for a run: tags last active strictly before it are expired.
pub fn threshold(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(retention_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// What a run does with a single tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Expired,
    Retained,
    /// No usable timestamp; never deleted
    Undated,
}

pub fn classify(tag: &TagRecord, threshold: DateTime<Utc>) -> Verdict {
    match tag.last_activity {
        Some(at) if at < threshold => Verdict::Expired,
        Some(_) => Verdict::Retained,
        None => Verdict::Undated,
    }
}

/// Outcome of a run that got past authentication and listing
#[derive(Debug, Default)]
pub struct RunReport {
    pub deleted: Vec<String>,
    pub failures: Vec<ReaperError>,
    pub retained: usize,
    pub undated: Vec<String>,
}

impl RunReport {
    /// True iff every attempted deletion succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

pub struct Reaper {
    client: RegistryClient,
    tokens: TokenProvider,
    retention_days: u32,
}

impl Reaper {
    pub fn new(config: &ReaperConfig) -> Result<Self> {
        Ok(Self {
            client: RegistryClient::new(config)?,
            tokens: TokenProvider::from_credentials(&config.credentials),
            retention_days: config.retention_days,
        })
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Authenticate, list, then delete every expired tag in listing order.
    ///
    /// Auth and listing failures are returned as `Err` before anything is
    /// deleted. Individual delete failures are collected in the report and
    /// do not stop the remaining deletions.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let token = self.tokens.token(&self.client).await?;

        let tags = self.client.list_tags(&token).await?;
        let threshold = threshold(now, self.retention_days);
        tracing::info!(
            "Found {} tag(s) in {}, deleting those last pushed before {}",
            tags.len(),
            self.client.repository(),
            threshold.to_rfc3339()
        );

        let mut report = RunReport::default();
        for tag in tags {
            match classify(&tag, threshold) {
                Verdict::Retained => report.retained += 1,
                Verdict::Undated => {
                    tracing::warn!("Skipping tag without push time: {}", tag.name);
                    report.undated.push(tag.name);
                }
                Verdict::Expired => match self.client.delete_tag(&tag.name, &token).await {
                    Ok(_) => {
                        tracing::info!("Deleted tag: {}", tag.name);
                        report.deleted.push(tag.name);
                    }
                    Err(e) => {
                        tracing::error!(tag = %tag.name, "{}", e);
                        report.failures.push(e);
                    }
                },
            }
        }

        tracing::info!(
            "Deleted {}, failed {}, kept {}, undated {}",
            report.deleted.len(),
            report.failures.len(),
            report.retained,
            report.undated.len()
        );

        Ok(report)
    }
}
