use super::RelationalSource;
use crate::data::{BlockVariant, ConnectionRecord, FunctionMapping, LogEntry};
use crate::error::SourceError;
use rusqlite::{Connection, OpenFlags, Params, Row, params};
use std::path::Path;
use tracing::debug;

/// DDL of the tables this crate reads. The generator owns the real database;
/// this is used to build fixture databases with the same shape.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS log_summary (
    log_name TEXT NOT NULL,
    diagram_name TEXT NOT NULL,
    mito_block TEXT NOT NULL,
    instance_port TEXT NOT NULL,
    description TEXT
);
CREATE TABLE IF NOT EXISTS diagram_parameter (
    diagram_name TEXT NOT NULL,
    block TEXT NOT NULL,
    i_o_name TEXT NOT NULL,
    port_name TEXT,
    block_type TEXT,
    source_port_id TEXT,
    interconnection TEXT,
    variant TEXT
);
CREATE TABLE IF NOT EXISTS function_mapping_info (
    source_target_symbol TEXT NOT NULL,
    source_port_id TEXT NOT NULL,
    dest_param_id TEXT,
    generation_type TEXT,
    variant TEXT
);
CREATE TABLE IF NOT EXISTS temp_generated_artifact (
    block TEXT NOT NULL,
    port TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS diagram_blocks (
    diagram_name TEXT NOT NULL,
    block TEXT NOT NULL
);
";

/// The generator's SQLite database, opened read-only.
pub struct MitoDatabase {
    conn: Connection,
}

impl MitoDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SourceError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "opened generator database");
        Ok(Self { conn })
    }

    /// Wraps an already open connection, e.g. an in-memory database.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn rows<T, P, F>(
        &self,
        table: &str,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<Vec<T>, SourceError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let query_error = |e: rusqlite::Error| SourceError::Query {
            table: table.to_string(),
            message: e.to_string(),
        };
        let mut stmt = self.conn.prepare(sql).map_err(query_error)?;
        let rows = stmt.query_map(params, map).map_err(query_error)?;
        rows.collect::<Result<Vec<T>, _>>().map_err(query_error)
    }
}

fn mapping_from_row(row: &Row<'_>) -> rusqlite::Result<FunctionMapping> {
    Ok(FunctionMapping {
        source_symbol: row.get(0)?,
        source_port_id: row.get(1)?,
        dest_param_id: row.get(2)?,
        generation_type: row.get(3)?,
        variant: row.get(4)?,
    })
}

impl RelationalSource for MitoDatabase {
    fn log_entries(&self, run_id: &str) -> Result<Vec<LogEntry>, SourceError> {
        self.rows(
            "log_summary",
            "SELECT diagram_name, mito_block, instance_port, description
             FROM log_summary WHERE log_name = ?1",
            params![run_id],
            |row| {
                Ok(LogEntry {
                    diagram_name: row.get(0)?,
                    block_name: row.get(1)?,
                    instance_port: row.get(2)?,
                    description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            },
        )
    }

    fn parameter_block_types(
        &self,
        diagram: &str,
        block: &str,
        port: &str,
    ) -> Result<Vec<Option<String>>, SourceError> {
        self.rows(
            "diagram_parameter",
            "SELECT block_type FROM diagram_parameter
             WHERE diagram_name = ?1 AND block = ?2 AND i_o_name = ?3",
            params![diagram, block, port],
            |row| row.get(0),
        )
    }

    fn connection_records(&self, diagram: &str) -> Result<Vec<ConnectionRecord>, SourceError> {
        self.rows(
            "diagram_parameter",
            "SELECT diagram_name, block, port_name, block_type, source_port_id, interconnection
             FROM diagram_parameter
             WHERE diagram_name = ?1 AND interconnection IS NOT NULL",
            params![diagram],
            |row| {
                Ok(ConnectionRecord {
                    diagram_name: row.get(0)?,
                    block: row.get(1)?,
                    port_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    block_type: row.get(3)?,
                    source_port_id: row.get(4)?,
                    interconnection: row.get(5)?,
                })
            },
        )
    }

    fn mappings_by_port(
        &self,
        symbol: &str,
        port_id: &str,
    ) -> Result<Vec<FunctionMapping>, SourceError> {
        self.rows(
            "function_mapping_info",
            "SELECT source_target_symbol, source_port_id, dest_param_id, generation_type, variant
             FROM function_mapping_info
             WHERE source_target_symbol = ?1 AND source_port_id = ?2",
            params![symbol, port_id],
            mapping_from_row,
        )
    }

    fn mappings_by_variant(&self, variant: &str) -> Result<Vec<FunctionMapping>, SourceError> {
        self.rows(
            "function_mapping_info",
            "SELECT source_target_symbol, source_port_id, dest_param_id, generation_type, variant
             FROM function_mapping_info WHERE variant = ?1",
            params![variant],
            mapping_from_row,
        )
    }

    fn generated_ports(
        &self,
        block: &str,
        port_fragment: &str,
    ) -> Result<Vec<String>, SourceError> {
        // instr() keeps the substring test case-sensitive, unlike LIKE.
        self.rows(
            "temp_generated_artifact",
            "SELECT port FROM temp_generated_artifact
             WHERE block = ?1 AND instr(port, ?2) > 0",
            params![block, port_fragment],
            |row| row.get(0),
        )
    }

    fn block_count(&self, diagram: &str) -> Result<usize, SourceError> {
        let counts: Vec<i64> = self.rows(
            "diagram_blocks",
            "SELECT COUNT(*) FROM diagram_blocks WHERE diagram_name = ?1",
            params![diagram],
            |row| row.get(0),
        )?;
        Ok(counts.first().copied().unwrap_or(0).max(0) as usize)
    }

    fn block_variants(&self, diagram: &str) -> Result<Vec<BlockVariant>, SourceError> {
        self.rows(
            "diagram_parameter",
            "SELECT block, variant FROM diagram_parameter
             WHERE diagram_name = ?1 AND variant IS NOT NULL",
            params![diagram],
            |row| {
                Ok(BlockVariant {
                    block: row.get(0)?,
                    variant: row.get(1)?,
                })
            },
        )
    }
}
