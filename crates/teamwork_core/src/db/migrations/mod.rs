//! Schema migrations for the key-value backing table.
//!
//! # Responsibility
//! - List every schema step this binary understands, oldest first.
//! - Bring a connection up to the newest step inside one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly 1.
//! - `PRAGMA user_version` always equals the last applied step.
//! - A failing step rolls back every step applied in the same run.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "kv_store",
        sql: include_str!("0001_kv_store.sql"),
    },
    SchemaStep {
        version: 2,
        name: "seed_collections",
        sql: include_str!("0002_seed_collections.sql"),
    },
];

/// Newest schema version this binary can open.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MigrationFailed` naming the step whose SQL was rejected.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = read_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(from);
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::MigrationFailed {
                version: step.version,
                name: step.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}

fn pending_steps(from: u32) -> &'static [SchemaStep] {
    let applied = STEPS
        .iter()
        .take_while(|step| step.version <= from)
        .count();
    &STEPS[applied..]
}

fn read_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, STEPS};

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        assert_eq!(pending_steps(0).len(), STEPS.len());
        assert_eq!(pending_steps(1).len(), STEPS.len() - 1);
        assert!(pending_steps(latest_version()).is_empty());
    }
}
