//! Path leaf type with optional expansion and existence handling.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Post-processing applied to a path-typed flag value.
///
/// Steps run in a fixed order: `~` expansion, absolutisation, directory
/// creation, existence check.
///
/// # Examples
///
/// ```
/// use argslot_core::PathOptions;
///
/// let opts = PathOptions::new().absolute();
/// let resolved = opts.resolve("some/dir").unwrap();
/// assert!(resolved.is_absolute());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOptions {
    /// Replace a leading `~` with the user's home directory.
    pub expanduser: bool,
    /// Make the path absolute against the current directory.
    pub absolute: bool,
    /// Fail unless the path exists.
    pub ensure: bool,
    /// Create the directory (and its parents) if missing.
    pub mkdir: bool,
}

impl PathOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanduser(mut self) -> Self {
        self.expanduser = true;
        self
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }

    pub fn ensure(mut self) -> Self {
        self.ensure = true;
        self
    }

    pub fn mkdir(mut self) -> Self {
        self.mkdir = true;
        self
    }

    /// Applies the configured steps to a raw command-line token.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, ShapeError> {
        let mut path = PathBuf::from(raw);
        if self.expanduser {
            path = expand_user(&path)?;
        }
        if self.absolute {
            path = std::path::absolute(&path).map_err(|e| ShapeError::Resolve {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }
        if self.mkdir {
            fs::create_dir_all(&path).map_err(|e| ShapeError::CreateDir {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }
        if self.ensure && !path.exists() {
            return Err(ShapeError::MissingPath(path));
        }
        Ok(path)
    }
}

fn expand_user(path: &Path) -> Result<PathBuf, ShapeError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(ShapeError::NoHome)?;
    Ok(home.join(rest))
}
