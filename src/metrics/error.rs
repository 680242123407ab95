use std::{
    error::Error,
    fmt::{self, Display},
};

/// The metrics module's result type.
pub type Result<T> = std::result::Result<T, MetricErr>;

/// Rejected appends to a `MetricHistoryStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricErr {
    StepRegression {
        name: String,
        last: usize,
        got: usize,
    },
    NonFinite {
        name: String,
        step: usize,
        value: f64,
    },
}

impl Display for MetricErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricErr::StepRegression { name, last, got } => write!(
                f,
                "metric {name} was last recorded at step {last}, cannot record step {got}"
            ),
            MetricErr::NonFinite { name, step, value } => {
                write!(f, "metric {name} at step {step} is not finite: {value}")
            }
        }
    }
}

impl Error for MetricErr {}
