use std::{
    error::Error,
    fmt::{self, Display},
};

/// An error raised by a model implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelErr(String);

impl ModelErr {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model failure: {}", self.0)
    }
}

impl Error for ModelErr {}
