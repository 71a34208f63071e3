use redb::ReadableTable;

use super::db::{Registry, RegistryError};
use super::models::DatabaseRecord;
use super::tables::*;

impl Registry {
    // ========================================================================
    // Database operations
    // ========================================================================

    /// Store a new database record and add it to its source file's index
    pub fn insert_database(&self, database: &DatabaseRecord) -> Result<(), RegistryError> {
        debug_assert!(
            !database.database_id.is_empty(),
            "database id must not be empty"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(DATABASES)?;
            if table.get(database.database_id.as_str())?.is_some() {
                return Err(RegistryError::AlreadyExists(database.database_id.clone()));
            }
            let data = rmp_serde::to_vec_named(database)?;
            table.insert(database.database_id.as_str(), data.as_slice())?;

            // Maintain source index
            let mut index_table = write_txn.open_table(FILE_DATABASES)?;
            let mut database_ids: Vec<String> = match index_table.get(database.file_id.as_str())? {
                Some(v) => rmp_serde::from_slice(v.value())?,
                None => Vec::new(),
            };

            if !database_ids.contains(&database.database_id) {
                database_ids.push(database.database_id.clone());
                let index_data = rmp_serde::to_vec_named(&database_ids)?;
                index_table.insert(database.file_id.as_str(), index_data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a database by its id
    pub fn get_database(&self, database_id: &str) -> Result<Option<DatabaseRecord>, RegistryError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(DATABASES)?;

        match table.get(database_id)? {
            Some(data) => {
                let database: DatabaseRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(database))
            }
            None => Ok(None),
        }
    }

    /// Get all databases materialized from a file, in creation order
    pub fn databases_for_file(&self, file_id: &str) -> Result<Vec<DatabaseRecord>, RegistryError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(FILE_DATABASES)?;
        let databases_table = read_txn.open_table(DATABASES)?;

        let database_ids: Vec<String> = match index_table.get(file_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut databases = Vec::new();
        for database_id in database_ids {
            if let Some(data) = databases_table.get(database_id.as_str())? {
                let database: DatabaseRecord = rmp_serde::from_slice(data.value())?;
                databases.push(database);
            }
        }

        Ok(databases)
    }

    /// Get all database records, ordered by id
    pub fn list_databases(&self) -> Result<Vec<DatabaseRecord>, RegistryError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(DATABASES)?;

        let mut databases = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let database: DatabaseRecord = rmp_serde::from_slice(value.value())?;
            databases.push(database);
        }

        Ok(databases)
    }
}
