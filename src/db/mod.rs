//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! The `Db` is the storage collaborator for the rest of the crate. It is created once, when the
//! `Config` is created or loaded, and handed around explicitly from there.

mod categories;
mod expenses;
mod migrations;

use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

/// The schema version that this build of the program expects.
const CURRENT_VERSION: i32 = 1;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database file already exists at '{}'", path.display());
        }
        let pool = connect(path, true, max_connections).await?;
        migrations::bootstrap(&pool).await?;
        migrations::run(&pool, 0, CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite connection pool
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let pool = connect(path, false, max_connections).await?;
        let version = migrations::current_version(&pool).await?;
        if version > CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports \
                ({CURRENT_VERSION})"
            );
        }
        migrations::run(&pool, version, CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn connect(path: &Path, create: bool, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at {}", path.display()))
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that comparing the strings is the
/// same as comparing the instants.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp '{s}' in database"))?;
    Ok(parsed.with_timezone(&Utc))
}
