//! Target-database access for the merge pipeline.
//!
//! The reconciler only needs three operations against the target schema:
//! existence checks, canonical definition retrieval, and raw statement
//! execution. They are grouped behind [`SchemaBackend`] so the decision logic
//! and the run loop can be exercised against an in-memory fake.

use mysql::{OptsBuilder, Pool, PooledConn, Row, prelude::Queryable};
use thiserror::Error;

use crate::config::DbSettings;

const TABLE_EXISTS_QUERY: &str =
    "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("unable to connect to MySQL server: {0}")]
    Connect(String),
    #[error("unable to prepare database `{database}`: {message}")]
    EnsureDatabase { database: String, message: String },
    #[error("schema lookup failed: {0}")]
    Metadata(String),
    #[error("statement execution failed: {0}")]
    Execute(String),
}

pub trait SchemaBackend {
    /// Whether a table of this name exists in the target schema.
    fn table_exists(&mut self, table: &str) -> Result<bool, BackendError>;
    /// The server's canonical definition for an existing table, `None` when
    /// the table is absent.
    fn table_definition(&mut self, table: &str) -> Result<Option<String>, BackendError>;
    /// Executes one DDL/DML statement verbatim.
    fn execute(&mut self, sql: &str) -> Result<(), BackendError>;
}

pub struct MysqlBackend {
    conn: PooledConn,
    schema: String,
}

impl MysqlBackend {
    /// Opens a server-level connection (no database selected yet) so the
    /// target database can be created on first use.
    pub fn connect(settings: &DbSettings) -> Result<Self, BackendError> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(settings.host.clone()))
            .tcp_port(settings.port)
            .user(Some(settings.user.clone()))
            .pass(settings.password.clone());
        let pool = Pool::new(opts).map_err(|err| BackendError::Connect(err.to_string()))?;
        let mut conn = pool
            .get_conn()
            .map_err(|err| BackendError::Connect(err.to_string()))?;
        conn.query_drop(format!("SET NAMES {}", settings.charset))
            .map_err(|err| BackendError::Connect(err.to_string()))?;
        Ok(Self {
            conn,
            schema: settings.name.clone(),
        })
    }

    /// Creates the target database if needed and selects it.
    pub fn ensure_database(&mut self, charset: &str, collation: &str) -> Result<(), BackendError> {
        let database = self.schema.clone();
        let create = format!(
            "CREATE DATABASE IF NOT EXISTS `{database}` CHARACTER SET {charset} COLLATE {collation}"
        );
        self.conn
            .query_drop(create)
            .and_then(|()| self.conn.query_drop(format!("USE `{database}`")))
            .map_err(|err| BackendError::EnsureDatabase {
                database,
                message: err.to_string(),
            })
    }

    pub fn ping(&mut self) -> Result<(), BackendError> {
        self.conn
            .query_drop("SELECT 1")
            .map_err(|err| BackendError::Metadata(err.to_string()))
    }
}

impl SchemaBackend for MysqlBackend {
    fn table_exists(&mut self, table: &str) -> Result<bool, BackendError> {
        let count: Option<u64> = self
            .conn
            .exec_first(TABLE_EXISTS_QUERY, (self.schema.as_str(), table))
            .map_err(|err| BackendError::Metadata(err.to_string()))?;
        Ok(count.unwrap_or(0) > 0)
    }

    fn table_definition(&mut self, table: &str) -> Result<Option<String>, BackendError> {
        if !self.table_exists(table)? {
            return Ok(None);
        }
        let escaped = table.replace('`', "``");
        let row: Option<Row> = self
            .conn
            .query_first(format!("SHOW CREATE TABLE `{escaped}`"))
            .map_err(|err| BackendError::Metadata(err.to_string()))?;
        // SHOW CREATE TABLE reports (table name, definition).
        Ok(row.and_then(|row| row.get::<String, usize>(1)))
    }

    fn execute(&mut self, sql: &str) -> Result<(), BackendError> {
        self.conn
            .query_drop(sql)
            .map_err(|err| BackendError::Execute(err.to_string()))
    }
}
