use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The config module's result type.
pub type Result<T> = std::result::Result<T, ConfigErr>;

/// Invalid or unusable run configuration, detected before training starts.
#[derive(Debug)]
pub enum ConfigErr {
    MissingDatasetDir(PathBuf),
    EmptyCategories,
    ZeroIterations {
        epochs: usize,
        train_size: usize,
        batch_size: usize,
    },
    InvalidValue {
        field: &'static str,
        reason: String,
    },
    EmptyShard {
        rank: usize,
        world_size: usize,
        total: usize,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConfigErr {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::MissingDatasetDir(dir) => {
                write!(f, "dataset directory {} does not exist", dir.display())
            }
            ConfigErr::EmptyCategories => f.write_str("the category list must not be empty"),
            ConfigErr::ZeroIterations {
                epochs,
                train_size,
                batch_size,
            } => write!(
                f,
                "{epochs} epoch(s) over {train_size} training image(s) \
                 with batch size {batch_size} yields zero iterations"
            ),
            ConfigErr::InvalidValue { field, reason } => {
                write!(f, "invalid value for {field}: {reason}")
            }
            ConfigErr::EmptyShard {
                rank,
                world_size,
                total,
            } => write!(
                f,
                "worker {rank} of {world_size} receives no examples out of {total}"
            ),
            ConfigErr::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigErr::Json { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigErr::Io { source, .. } => Some(source),
            ConfigErr::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
