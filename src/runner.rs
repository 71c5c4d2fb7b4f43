use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::extractor::ValueExtractor;
use crate::fetcher::Fetcher;
use crate::models::Task;
use crate::notification::{Delivery, NotifierGateway};
use crate::store::{improves, format_value, BestValueStore};
use crate::utils::error::{ExtractionError, TaskError};

/// Collaborators shared by every runner. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct RunnerContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub store: Arc<dyn BestValueStore>,
    pub gateway: NotifierGateway,
}

/// What a single poll cycle ended with. None of these stop the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    FetchFailed,
    ExtractionFailed(ExtractionError),
    NotImproved {
        value: Decimal,
        best: Decimal,
    },
    Improved {
        value: Decimal,
        previous: Option<Decimal>,
        /// `None` when the notification could not be delivered.
        delivery: Option<Delivery>,
    },
}

/// Owns one task: validates it once, then polls it on its period until a
/// fatal error.
pub struct TaskRunner {
    task: Task,
    extractor: ValueExtractor,
    ctx: RunnerContext,
}

/// Validates and runs `task`. Only returns when the task is finished for good.
pub async fn launch(task: Task, ctx: RunnerContext) -> TaskError {
    match TaskRunner::new(task, ctx) {
        Ok(runner) => runner.run().await,
        Err(e) => e,
    }
}

impl TaskRunner {
    pub fn new(task: Task, ctx: RunnerContext) -> Result<Self, TaskError> {
        task.validate()?;
        let extractor = ValueExtractor::new(&task.name, &task.regexp)?;
        Ok(Self {
            task,
            extractor,
            ctx,
        })
    }

    /// Polls every period, the first poll one full period after start.
    /// Cycles never overlap: a slow cycle delays the next tick.
    pub async fn run(self) -> TaskError {
        let period = self.task.period_duration();
        tracing::info!(
            task = %self.task.name,
            url = %self.task.url.trim(),
            period_minutes = self.task.period,
            recipients = self.task.email.recipients.len(),
            "start task"
        );

        let Some(start) = Instant::now().checked_add(period) else {
            return TaskError::config(&self.task.name, "period", "period is out of range");
        };
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                return e;
            }
        }
    }

    /// One fetch/extract/compare/store/notify cycle.
    pub async fn poll_once(&self) -> Result<PollOutcome, TaskError> {
        let name = self.task.name.as_str();
        let url = self.task.url.trim();
        metrics::counter!("pricewatch_polls_total", "task" => name.to_string()).increment(1);

        let content = match self.ctx.fetcher.fetch(url).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(task = %name, url = %url, "fetch url error: {}", e);
                metrics::counter!("pricewatch_fetch_failures_total", "task" => name.to_string())
                    .increment(1);
                return Ok(PollOutcome::FetchFailed);
            }
        };

        let value = match self.extractor.extract(&content).and_then(normalize) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    task = %name,
                    content_length = content.len(),
                    "get price error: {}",
                    e
                );
                metrics::counter!("pricewatch_extraction_failures_total", "task" => name.to_string())
                    .increment(1);
                return Ok(PollOutcome::ExtractionFailed(e));
            }
        };

        let best = self.ctx.store.read(name).await;
        if !improves(value, best) {
            tracing::debug!(task = %name, value = %format_value(value), "no better price");
            return Ok(PollOutcome::NotImproved {
                value,
                best: best.unwrap_or(value),
            });
        }

        self.ctx
            .store
            .write(name, value)
            .await
            .map_err(|source| TaskError::Persistence {
                task: name.to_string(),
                value,
                source,
            })?;

        tracing::info!(
            task = %name,
            value = %format_value(value),
            previous = ?best.map(format_value),
            "found better price"
        );
        metrics::counter!("pricewatch_improvements_total", "task" => name.to_string()).increment(1);

        let delivery = match self.ctx.gateway.notify(&self.task, value).await {
            Ok(delivery) => Some(delivery),
            Err(e) => {
                tracing::warn!(task = %name, "send notification error: {}", e);
                metrics::counter!("pricewatch_notify_failures_total", "task" => name.to_string())
                    .increment(1);
                None
            }
        };

        Ok(PollOutcome::Improved {
            value,
            previous: best,
            delivery,
        })
    }
}

// Compare and persist at the stored precision so the three always agree.
fn normalize(value: Decimal) -> Result<Decimal, ExtractionError> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return Err(ExtractionError::InvalidOrZeroValue(value.to_string()));
    }
    Ok(rounded)
}
