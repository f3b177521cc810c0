//! Database migrations and schema management.

use crate::error::DbResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database from version {} to {}",
            current_version, SCHEMA_VERSION
        );
        run_migrations(conn, current_version)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> DbResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Workflow runs
        CREATE TABLE IF NOT EXISTS workflows (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            mode TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'created',
            error TEXT,
            document_path TEXT NOT NULL,
            item_master_path TEXT,
            summary TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_workflows_status ON workflows(status);
        CREATE INDEX IF NOT EXISTS idx_workflows_created ON workflows(created_at);

        -- Match results, one row per extracted candidate
        CREATE TABLE IF NOT EXISTS match_results (
            id TEXT PRIMARY KEY,
            workflow_id TEXT NOT NULL REFERENCES workflows(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            identifier TEXT NOT NULL,
            description TEXT NOT NULL,
            quantity REAL,
            attributes TEXT DEFAULT '{}',
            source_file TEXT NOT NULL DEFAULT '',
            matched_id TEXT,
            matched_identifier TEXT,
            matched_description TEXT,
            match_source TEXT,
            confidence REAL NOT NULL DEFAULT 0,
            classification TEXT NOT NULL,
            edited INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_match_results_workflow ON match_results(workflow_id);

        -- Curated knowledge base
        CREATE TABLE IF NOT EXISTS kb_items (
            id TEXT PRIMARY KEY,
            identifier TEXT NOT NULL,
            description TEXT NOT NULL,
            attributes TEXT DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'pending',
            source_workflow_id TEXT,
            created_at TEXT NOT NULL,
            decided_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_kb_items_status ON kb_items(status);
        CREATE INDEX IF NOT EXISTS idx_kb_items_identifier ON kb_items(identifier);
        CREATE INDEX IF NOT EXISTS idx_kb_items_decided ON kb_items(decided_at);

        -- Enable foreign keys
        PRAGMA foreign_keys = ON;
        "#,
    )?;

    Ok(())
}

fn run_migrations(conn: &Connection, from_version: i32) -> DbResult<()> {
    // Future migrations go here
    let _ = (conn, from_version);

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}
