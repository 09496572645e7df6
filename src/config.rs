use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ViewError, ViewResult};
use crate::models::{SortSpec, DEFAULT_PAGE_SIZE};

/// View settings. Every key is optional in the file; missing keys take the
/// dashboard defaults (10 rows per page, name ascending).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    pub page_size: usize,
    pub default_sort: SortSpec,
    /// Where the export action writes its CSV files.
    pub export_dir: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_sort: SortSpec::default(),
            export_dir: None,
        }
    }
}

impl ViewConfig {
    pub fn from_file(path: &Path) -> ViewResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ViewConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise falls back to defaults.
    pub fn load(path: Option<&Path>) -> ViewResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ViewResult<()> {
        if self.page_size == 0 {
            return Err(ViewError::InvalidPageSize);
        }
        Ok(())
    }

    pub fn export_dir(&self) -> &Path {
        self.export_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}
