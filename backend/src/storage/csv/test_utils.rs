//! Test utilities for CSV-backed tests.
//!
//! The temporary directory is removed when the environment is dropped, even
//! if the test panics.

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::record_store::CsvRecordStore;
use crate::storage::traits::RecordStore;

pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    pub fn record_store(&self) -> Arc<dyn RecordStore> {
        Arc::new(CsvRecordStore::new(self.connection.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
        Ok(())
    }
}
