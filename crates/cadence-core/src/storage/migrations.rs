//! Database schema migrations for cadence.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version. Returns 0 for an initial database.
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// The base tables are created by `Store::migrate()` directly; this just
/// marks the version.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: rewards catalog and points ledger.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS rewards (
            id          TEXT PRIMARY KEY,
            owner       TEXT NOT NULL,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            cost_points INTEGER NOT NULL,
            redeemed    INTEGER NOT NULL DEFAULT 0,
            redeemed_at TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS points_ledger (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            owner  TEXT NOT NULL,
            delta  INTEGER NOT NULL,
            reason TEXT NOT NULL,
            at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_rewards_owner ON rewards(owner);
        CREATE INDEX IF NOT EXISTS idx_points_ledger_owner ON points_ledger(owner);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
