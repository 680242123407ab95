use std::collections::HashMap;

use parking_lot::Mutex;

use super::{CheckpointErr, CheckpointStore, Result};

/// Keeps checkpoints in memory and counts every save.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<String, Vec<u8>>,
    saves: Vec<String>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every save so far, in call order.
    pub fn saves(&self) -> Vec<String> {
        self.inner.lock().saves.clone()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, name: &str, state: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.states.insert(name.to_string(), state.to_vec());
        inner.saves.push(name.to_string());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        self.inner
            .lock()
            .states
            .get(name)
            .cloned()
            .ok_or_else(|| CheckpointErr::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_and_counts() {
        let store = MemoryCheckpointStore::new();
        store.save("model_best", b"v1").unwrap();
        store.save("model_best", b"v2").unwrap();

        assert_eq!(store.load("model_best").unwrap(), b"v2");
        assert_eq!(store.saves(), vec!["model_best", "model_best"]);
        assert!(matches!(store.load("other"), Err(CheckpointErr::NotFound(_))));
    }
}
