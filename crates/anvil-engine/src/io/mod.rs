use relative_path::{Component, RelativePath, RelativePathBuf};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid content id: {0:?}")]
    InvalidId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid content directory: {0}")]
    InvalidContentDir(String),
}

/// Persistence collaborator: stored page content is an opaque string keyed
/// by content id. Saving is a full overwrite, last writer wins.
pub trait ContentStore {
    /// `Ok(None)` when nothing is stored under `id`.
    fn load(&self, id: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, id: &str, text: &str) -> Result<(), StoreError>;
}

/// One `<id>.json` file per content id under a root directory. Ids may
/// contain `/` to nest pages in subdirectories.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a content id. Rejects empty ids, absolute ids and
    /// any `.`/`..` component so a store can never reach outside its root.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let invalid = || StoreError::InvalidId(id.to_string());
        if id.trim().is_empty() || id.starts_with('/') || id.contains('\\') {
            return Err(invalid());
        }
        let relative = RelativePath::new(id);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(invalid());
        }
        let file = RelativePathBuf::from(format!("{id}.json"));
        Ok(file.to_path(&self.root))
    }

    /// Every stored content id, sorted.
    pub fn content_ids(&self) -> Result<Vec<String>, StoreError> {
        validate_content_dir(&self.root)?;
        let mut files = Vec::new();
        scan_directory_recursive(&self.root, &mut files)?;

        let mut ids: Vec<String> = files
            .iter()
            .filter_map(|path| path.strip_prefix(&self.root).ok())
            .filter_map(|path| RelativePathBuf::from_path(path).ok())
            .filter_map(|path| path.as_str().strip_suffix(".json").map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl ContentStore for FileStore {
    fn load(&self, id: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(StoreError::Io)
    }

    fn save(&mut self, id: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        log::debug!("saving {id} to {}", path.display());
        fs::write(&path, text).map_err(StoreError::Io)
    }
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    let entries = fs::read_dir(dir).map_err(StoreError::Io)?;

    for entry in entries {
        let entry = entry.map_err(StoreError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "json"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_content_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() || !path.is_dir() {
        return Err(StoreError::InvalidContentDir(format!(
            "{} does not exist",
            path.display()
        )));
    }

    Ok(())
}

/// In-memory store for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, text: &str) -> Self {
        self.items.insert(id.to_string(), text.to_string());
        self
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.items.get(id).map(String::as_str)
    }
}

impl ContentStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(id).cloned())
    }

    fn save(&mut self, id: &str, text: &str) -> Result<(), StoreError> {
        self.items.insert(id.to_string(), text.to_string());
        Ok(())
    }
}
