use anyhow::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::Collection;

const CSV_HEADER: &str = "id,created_at,updated_at,data\n";

/// CsvConnection maps collections to files under a base directory and
/// makes sure those files exist with a header row.
///
/// Unscoped collections live at `{base}/{kind}.csv`; per-user collections
/// live at `{base}/{user}/{kind}.csv`.
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the platform data directory (`.../timekeeper`)
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory()?)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))?;
        Ok(data_dir.join("timekeeper"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory holding every collection of one user
    pub fn get_user_directory(&self, user_id: &str) -> PathBuf {
        self.base_directory
            .join(Self::generate_safe_directory_name(user_id))
    }

    pub fn get_collection_file_path(&self, collection: &Collection) -> PathBuf {
        let (kind, owner) = collection.parts();
        let file_name = format!("{}.csv", Self::generate_safe_directory_name(kind));
        match owner {
            Some(user_id) => self.get_user_directory(user_id).join(file_name),
            None => self.base_directory.join(file_name),
        }
    }

    /// Ensure a collection file exists with the CSV header
    pub fn ensure_collection_file_exists(&self, collection: &Collection) -> std::io::Result<PathBuf> {
        let file_path = self.get_collection_file_path(collection);

        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if !file_path.exists() {
            fs::write(&file_path, CSV_HEADER)?;
            debug!("Created collection file {:?}", file_path);
        }

        Ok(file_path)
    }

    /// Turn an arbitrary id or name into something safe to use as a path
    /// component
    pub fn generate_safe_directory_name(name: &str) -> String {
        let result: String = name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        if result.is_empty() {
            "_".to_string()
        } else {
            result
        }
    }
}
