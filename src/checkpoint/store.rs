use super::Result;

/// Saves and loads opaque model states by name.
///
/// Saving under an existing name replaces its contents.
pub trait CheckpointStore: Send + Sync {
    fn save(&self, name: &str, state: &[u8]) -> Result<()>;

    fn load(&self, name: &str) -> Result<Vec<u8>>;
}
