use super::{IngestErr, Result};
use crate::config::{ConfigErr, DEFAULT_CATEGORIES, Result as ConfigResult};

/// Fixed, ordered list of category names.
///
/// Indices are positions in the list. Labels are matched by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    names: Vec<String>,
}

impl CategoryTable {
    /// Creates a new `CategoryTable`.
    ///
    /// # Arguments
    /// * `names` - The category names, in index order.
    ///
    /// # Returns
    /// The table, or `ConfigErr::EmptyCategories` if `names` is empty.
    pub fn new<I, S>(names: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigErr::EmptyCategories);
        }

        Ok(Self { names })
    }

    /// The AMF category list used when none is configured.
    pub fn from_defaults() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Resolves `label` to its category index.
    ///
    /// # Arguments
    /// * `filename` - The image the label belongs to, reported on failure.
    /// * `label` - The free-text label of an annotation row.
    ///
    /// # Returns
    /// The index of the first category equal to `label`.
    pub fn resolve(&self, filename: &str, label: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|name| name == label)
            .ok_or_else(|| IngestErr::UnknownCategory {
                filename: filename.to_string(),
                label: label.to_string(),
            })
    }

    /// The amount of categories, which is also the model's class count.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
