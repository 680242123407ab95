use std::{
    error::Error,
    fmt::{self, Display},
};

/// The sync module's result type.
pub type Result<T> = std::result::Result<T, ReduceErr>;

/// Failure to agree on a reduced value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceErr {
    ComponentMismatch {
        rank: usize,
        expected: Vec<String>,
        got: Vec<String>,
    },
    RankOutOfRange {
        rank: usize,
        world_size: usize,
    },
    WorldSizeMismatch {
        expected: usize,
        got: usize,
    },
}

impl Display for ReduceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceErr::ComponentMismatch {
                rank,
                expected,
                got,
            } => write!(
                f,
                "worker {rank} reported components {got:?}, expected {expected:?}"
            ),
            ReduceErr::RankOutOfRange { rank, world_size } => {
                write!(f, "rank {rank} is out of range for {world_size} worker(s)")
            }
            ReduceErr::WorldSizeMismatch { expected, got } => {
                write!(f, "reducer spans {expected} worker(s) but caller expects {got}")
            }
        }
    }
}

impl Error for ReduceErr {}
