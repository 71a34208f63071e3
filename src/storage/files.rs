use redb::ReadableTable;

use super::db::{Registry, RegistryError};
use super::models::FileRecord;
use super::tables::*;

impl Registry {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Store a new file record. Records are append-only: an existing id is rejected.
    pub fn insert_file(&self, file: &FileRecord) -> Result<(), RegistryError> {
        debug_assert!(!file.file_id.is_empty(), "file id must not be empty");
        debug_assert_eq!(
            file.columns.len(),
            file.column_types.len(),
            "every column must carry a type"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(FILES)?;
            if table.get(file.file_id.as_str())?.is_some() {
                return Err(RegistryError::AlreadyExists(file.file_id.clone()));
            }
            let data = rmp_serde::to_vec_named(file)?;
            table.insert(file.file_id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a file by its id
    pub fn get_file(&self, file_id: &str) -> Result<Option<FileRecord>, RegistryError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        match table.get(file_id)? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// Get all file records, ordered by id
    pub fn list_files(&self) -> Result<Vec<FileRecord>, RegistryError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        let mut files = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let file: FileRecord = rmp_serde::from_slice(value.value())?;
            files.push(file);
        }

        Ok(files)
    }
}
