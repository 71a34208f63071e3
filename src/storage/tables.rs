use redb::TableDefinition;

/// File records: file_id -> FileRecord (msgpack)
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Database records: database_id -> DatabaseRecord (msgpack)
pub const DATABASES: TableDefinition<&str, &[u8]> = TableDefinition::new("databases");

/// Source index: file_id -> msgpack Vec of database ids materialized from it
pub const FILE_DATABASES: TableDefinition<&str, &[u8]> = TableDefinition::new("file_databases");
