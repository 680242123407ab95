use std::collections::HashMap;

use super::{MetricErr, Result};

/// One recorded value of a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricEntry {
    pub value: f64,
    pub step: usize,
}

#[derive(Debug, Clone, Default)]
struct Series {
    entries: Vec<MetricEntry>,
    /// Index of the first occurrence of the minimum value.
    best: usize,
}

/// Append-only, per-metric ordered log of `(value, step)` pairs.
///
/// Metrics iterate in the order they were first recorded. The running minimum of each
/// metric is maintained incrementally; on ties the earliest entry stays the minimum.
#[derive(Debug, Clone, Default)]
pub struct MetricHistoryStore {
    slots: HashMap<String, usize>,
    series: Vec<(String, Series)>,
}

impl MetricHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the metric `name`, tagged with `step`.
    ///
    /// # Errors
    /// `MetricErr::NonFinite` for NaN or infinite values and `MetricErr::StepRegression`
    /// when `step` is lower than the metric's last recorded step.
    pub fn append(&mut self, name: &str, value: f64, step: usize) -> Result<()> {
        if !value.is_finite() {
            return Err(MetricErr::NonFinite {
                name: name.to_string(),
                step,
                value,
            });
        }

        let slot = match self.slots.get(name) {
            Some(&slot) => slot,
            None => {
                self.series.push((name.to_string(), Series::default()));
                self.slots.insert(name.to_string(), self.series.len() - 1);
                self.series.len() - 1
            }
        };

        let series = &mut self.series[slot].1;
        if let Some(last) = series.entries.last() {
            if last.step > step {
                return Err(MetricErr::StepRegression {
                    name: name.to_string(),
                    last: last.step,
                    got: step,
                });
            }
        }

        series.entries.push(MetricEntry { value, step });
        let newest = series.entries.len() - 1;
        if value < series.entries[series.best].value {
            series.best = newest;
        }

        Ok(())
    }

    /// Whether the most recently appended value of `name` is the first occurrence of
    /// the minimum over its whole history.
    ///
    /// An exact repeat of an earlier minimum is not a new minimum. Unknown metrics have
    /// no minimum.
    pub fn is_new_minimum(&self, name: &str) -> bool {
        self.get(name).is_some_and(|series| {
            !series.entries.is_empty() && series.best == series.entries.len() - 1
        })
    }

    /// The full ordered history of `name`.
    pub fn values(&self, name: &str) -> Option<&[MetricEntry]> {
        self.get(name).map(|series| series.entries.as_slice())
    }

    pub fn latest(&self, name: &str) -> Option<MetricEntry> {
        self.get(name).and_then(|series| series.entries.last().copied())
    }

    /// The first entry holding the minimum value of `name`.
    pub fn best(&self, name: &str) -> Option<MetricEntry> {
        self.get(name)
            .and_then(|series| series.entries.get(series.best).copied())
    }

    /// Metric names in first-recorded order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(name, _)| name.as_str())
    }

    /// Every metric with its history, in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MetricEntry])> {
        self.series
            .iter()
            .map(|(name, series)| (name.as_str(), series.entries.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn get(&self, name: &str) -> Option<&Series> {
        self.slots.get(name).map(|&slot| &self.series[slot].1)
    }
}
