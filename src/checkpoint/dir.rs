use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;

use super::{CheckpointErr, CheckpointStore, Result};

/// Extension of the files written by `DirCheckpointStore`.
pub const CHECKPOINT_EXT: &str = "pth";

/// Stores every checkpoint as `<dir>/<name>.pth`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a reader never
/// observes a partially written state.
#[derive(Debug, Clone)]
pub struct DirCheckpointStore {
    dir: PathBuf,
}

impl DirCheckpointStore {
    /// Creates a new `DirCheckpointStore`, creating `dir` if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CheckpointErr::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file backing checkpoint `name`.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(CheckpointErr::InvalidName(name.to_string()));
        }

        Ok(self.dir.join(format!("{name}.{CHECKPOINT_EXT}")))
    }
}

impl CheckpointStore for DirCheckpointStore {
    fn save(&self, name: &str, state: &[u8]) -> Result<()> {
        let path = self.path_of(name)?;
        let tmp = path.with_extension(format!("{CHECKPOINT_EXT}.tmp"));

        fs::write(&tmp, state).map_err(|source| CheckpointErr::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(CheckpointErr::Io { path, source });
        }

        debug!(path:? = path, bytes = state.len(); "checkpoint written");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CheckpointErr::NotFound(name.to_string()),
            _ => CheckpointErr::Io { path, source },
        })
    }
}
