//! Sequential batch driver.
//!
//! Records are processed one at a time in input order. A failing record
//! is logged with its row identifier and display title, tagged with the
//! stage that rejected it, and the run continues with the next record.

use crate::detect::ScriptDetector;
use crate::error::NameError;
use crate::name::{NameContext, NameRecord, RawNameRecord};
use crate::registry::PlaceRegistry;
use crate::translit::Transliterator;
use tracing::{error, info};

/// Which derivation passes run after a record validates.
#[derive(Debug, Clone, Copy)]
pub struct DerivationPasses {
    pub romanize: bool,
    pub sluggify: bool,
    pub summarize: bool,
}

impl Default for DerivationPasses {
    fn default() -> Self {
        Self {
            romanize: true,
            sluggify: true,
            summarize: true,
        }
    }
}

/// A record the batch could not process.
#[derive(Debug)]
pub struct BatchFailure {
    /// Caller-side row identifier, when the input carried one.
    pub nameid: Option<String>,
    pub title: String,
    /// Processing stage that rejected the record.
    pub stage: &'static str,
    pub error: NameError,
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<NameRecord>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    fn fail(&mut self, raw: &RawNameRecord, stage: &'static str, err: NameError) {
        error!(
            "[{}] record {} ({:?}) failed: {}",
            stage,
            raw.nameid.as_deref().unwrap_or("?"),
            raw.display_title(),
            err
        );
        self.failures.push(BatchFailure {
            nameid: raw.nameid.clone(),
            title: raw.display_title().to_string(),
            stage,
            error: err,
        });
    }
}

/// Validate and derive every record in `raws`, in order.
pub async fn process_batch<R, T, D>(
    raws: &[RawNameRecord],
    ctx: &NameContext<'_, R, T, D>,
    passes: DerivationPasses,
) -> BatchOutcome
where
    R: PlaceRegistry,
    T: Transliterator,
    D: ScriptDetector,
{
    let mut outcome = BatchOutcome::default();

    for raw in raws {
        let mut record = match NameRecord::new(raw, ctx).await {
            Ok(record) => record,
            Err(err) => {
                outcome.fail(raw, "validate-name", err);
                continue;
            }
        };

        if passes.romanize {
            if let Err(err) = record.generate_romanized(ctx).await {
                outcome.fail(raw, "generate-romanized", err);
                continue;
            }
        }
        if passes.sluggify {
            if let Err(err) = record.generate_slug(ctx).await {
                outcome.fail(raw, "generate-slug", err);
                continue;
            }
        }
        if passes.summarize {
            if let Err(err) = record.generate_summary(ctx).await {
                outcome.fail(raw, "generate-summary", err);
                continue;
            }
        }

        if !record.complete() {
            info!(
                "record {} ({:?}) validated but is incomplete",
                raw.nameid.as_deref().unwrap_or("?"),
                raw.display_title()
            );
        }
        outcome.records.push(record);
    }

    info!(
        "batch finished: {} processed, {} failed",
        outcome.records.len(),
        outcome.failures.len()
    );
    outcome
}
