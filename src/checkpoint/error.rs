use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The checkpoint module's result type.
pub type Result<T> = std::result::Result<T, CheckpointErr>;

#[derive(Debug)]
pub enum CheckpointErr {
    Io { path: PathBuf, source: io::Error },
    NotFound(String),
    InvalidName(String),
}

impl Display for CheckpointErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointErr::Io { path, source } => {
                write!(f, "checkpoint i/o on {}: {source}", path.display())
            }
            CheckpointErr::NotFound(name) => write!(f, "no checkpoint named {name}"),
            CheckpointErr::InvalidName(name) => write!(f, "invalid checkpoint name {name:?}"),
        }
    }
}

impl Error for CheckpointErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CheckpointErr::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
