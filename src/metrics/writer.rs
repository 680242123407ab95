use std::{collections::HashMap, num::NonZeroUsize};

use async_trait::async_trait;
use log::debug;

use super::{MetricHistoryStore, MetricSink};
use crate::{
    error::Result,
    hooks::{Stage, StepContext},
};

/// Periodically flushes the latest value of every metric to its sinks.
///
/// Flushes on every step where `(step + 1) % period == 0` and once more after training.
/// A metric is only written if it received new entries since the previous flush.
pub struct PeriodicWriter {
    period: NonZeroUsize,
    sinks: Vec<Box<dyn MetricSink>>,
    /// Entry count of each metric at the previous flush.
    flushed: HashMap<String, usize>,
}

impl PeriodicWriter {
    pub const NAME: &'static str = "periodic_writer";

    /// Creates a new `PeriodicWriter`.
    ///
    /// # Arguments
    /// * `period` - Steps between two flushes.
    /// * `sinks` - Where each flush is written.
    pub fn new(period: NonZeroUsize, sinks: Vec<Box<dyn MetricSink>>) -> Self {
        Self {
            period,
            sinks,
            flushed: HashMap::new(),
        }
    }

    fn flush(&mut self, step: usize, storage: &MetricHistoryStore) -> Result<()> {
        let mut pending = Vec::new();
        for (name, entries) in storage.iter() {
            let seen = self.flushed.get(name).copied().unwrap_or(0);
            if entries.len() > seen {
                if let Some(latest) = entries.last() {
                    pending.push((name.to_string(), latest.value));
                }
                self.flushed.insert(name.to_string(), entries.len());
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        debug!(step = step, metrics = pending.len(); "flushing metrics");
        for sink in &mut self.sinks {
            sink.write(step, &pending)?;
        }

        Ok(())
    }
}

#[async_trait]
impl Stage for PeriodicWriter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn after_step(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        if (ctx.step + 1) % self.period.get() != 0 {
            return Ok(());
        }

        match ctx.storage.as_deref() {
            Some(storage) => self.flush(ctx.step, storage),
            None => Ok(()),
        }
    }

    async fn after_train(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        match ctx.storage.as_deref() {
            Some(storage) => self.flush(ctx.step, storage),
            None => Ok(()),
        }
    }
}
