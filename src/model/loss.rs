use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use crate::error::{Result, SegErr};

/// Named scalar loss components, ordered by name.
pub type LossMap = BTreeMap<String, f64>;

/// Where a loss was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossPhase {
    Training,
    Validation,
}

impl Display for LossPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossPhase::Training => f.write_str("training"),
            LossPhase::Validation => f.write_str("validation"),
        }
    }
}

/// Sum of all the components.
pub fn total(losses: &LossMap) -> f64 {
    losses.values().sum()
}

/// Checks that every component and their sum are finite.
///
/// # Returns
/// The summed loss, or `SegErr::NonFiniteLoss` carrying the offending components.
pub fn ensure_finite(step: usize, phase: LossPhase, losses: &LossMap) -> Result<f64> {
    let sum = total(losses);
    if sum.is_finite() && losses.values().all(|v| v.is_finite()) {
        return Ok(sum);
    }

    Err(SegErr::NonFiniteLoss {
        step,
        phase,
        losses: losses.clone(),
    })
}
