use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use crate::{
    annotation::IngestErr,
    checkpoint::CheckpointErr,
    config::ConfigErr,
    metrics::MetricErr,
    model::{LossMap, LossPhase, ModelErr},
    sync::ReduceErr,
};

/// The crate's result type.
pub type Result<T> = std::result::Result<T, SegErr>;

/// Every fatal condition of an ingestion or training run.
#[derive(Debug)]
pub enum SegErr {
    Ingest(IngestErr),
    Config(ConfigErr),
    Metric(MetricErr),
    Reduce(ReduceErr),
    Checkpoint(CheckpointErr),
    Model(ModelErr),
    Io(io::Error),
    NonFiniteLoss {
        step: usize,
        phase: LossPhase,
        losses: LossMap,
    },
    WorkerFailed(String),
}

impl Display for SegErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegErr::Ingest(e) => write!(f, "ingestion failed: {e}"),
            SegErr::Config(e) => write!(f, "configuration error: {e}"),
            SegErr::Metric(e) => write!(f, "metric error: {e}"),
            SegErr::Reduce(e) => write!(f, "cross-worker reduction failed: {e}"),
            SegErr::Checkpoint(e) => write!(f, "checkpoint error: {e}"),
            SegErr::Model(e) => e.fmt(f),
            SegErr::Io(e) => write!(f, "i/o error: {e}"),
            SegErr::NonFiniteLoss {
                step,
                phase,
                losses,
            } => write!(f, "non-finite {phase} loss at step {step}: {losses:?}"),
            SegErr::WorkerFailed(reason) => write!(f, "worker failed: {reason}"),
        }
    }
}

impl Error for SegErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SegErr::Ingest(e) => Some(e),
            SegErr::Config(e) => Some(e),
            SegErr::Metric(e) => Some(e),
            SegErr::Reduce(e) => Some(e),
            SegErr::Checkpoint(e) => Some(e),
            SegErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IngestErr> for SegErr {
    fn from(value: IngestErr) -> Self {
        Self::Ingest(value)
    }
}

impl From<ConfigErr> for SegErr {
    fn from(value: ConfigErr) -> Self {
        Self::Config(value)
    }
}

impl From<MetricErr> for SegErr {
    fn from(value: MetricErr) -> Self {
        Self::Metric(value)
    }
}

impl From<ReduceErr> for SegErr {
    fn from(value: ReduceErr) -> Self {
        Self::Reduce(value)
    }
}

impl From<CheckpointErr> for SegErr {
    fn from(value: CheckpointErr) -> Self {
        Self::Checkpoint(value)
    }
}

impl From<ModelErr> for SegErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}

impl From<io::Error> for SegErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
