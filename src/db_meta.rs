use std::path::Path;

use rusqlite::OptionalExtension;
use rusqlite::{params, Connection, Result, NO_PARAMS};

use crate::schema;

pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = match Connection::open(db_path) {
        Ok(c) => c,
        Err(e) => {
            error!(
                "can't open sqlite database '{}': {}",
                db_path.to_string_lossy(),
                e
            );
            return Err(e);
        }
    };

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    Ok(conn)
}

fn schema_version(conn: &Connection) -> Result<Option<u32>> {
    trace!("trying to get schema version");

    conn.execute_batch(schema::META_SCHEMA)?;

    conn.query_row(
        "SELECT value FROM loader_meta WHERE key = 'schema'",
        NO_PARAMS,
        |row| row.get(0),
    )
    .optional()
}

fn create_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(schema::LOADER_SCHEMA)?;
    tx.execute(
        "INSERT INTO loader_meta (key, value) VALUES ('schema', ?)",
        params![schema::SCHEMA_VERSION],
    )?;

    tx.commit()
}

/// Creates any missing tables on an unversioned database and records the
/// version. Returns `false` if the database carries an incompatible version.
pub fn ensure_schema(conn: &mut Connection) -> Result<bool> {
    match schema_version(conn)? {
        Some(version) if version == schema::SCHEMA_VERSION => {
            debug!("schema version {}", version);
            Ok(true)
        }
        Some(version) => {
            error!(
                "schema version mismatch: database has {}, loader expects {}",
                version,
                schema::SCHEMA_VERSION
            );
            Ok(false)
        }
        None => {
            info!("creating schema version {}", schema::SCHEMA_VERSION);
            create_schema(conn)?;
            Ok(true)
        }
    }
}

/// Drops every loader table and creates them again.
pub fn reset_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(schema::META_SCHEMA)?;

    info!("dropping tables");
    conn.execute_batch(schema::DROP_SCHEMA)?;

    info!("creating schema version {}", schema::SCHEMA_VERSION);
    create_schema(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
            WHERE type = 'table' AND name IN ('artist', 'song', 'users', 'time', 'songplay')",
            NO_PARAMS,
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn ensure_schema_creates_tables_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert!(ensure_schema(&mut conn).unwrap());
        assert_eq!(table_count(&conn), 5);

        conn.execute(
            "INSERT INTO artist (artist_id, name) VALUES ('AR1', 'Someone')",
            NO_PARAMS,
        )
        .unwrap();

        assert!(ensure_schema(&mut conn).unwrap());
        let artists: i64 = conn
            .query_row("SELECT COUNT(*) FROM artist", NO_PARAMS, |row| row.get(0))
            .unwrap();
        assert_eq!(artists, 1);
    }

    #[test]
    fn ensure_schema_rejects_other_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(schema::META_SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO loader_meta (key, value) VALUES ('schema', ?)",
            params![schema::SCHEMA_VERSION + 1],
        )
        .unwrap();

        assert!(!ensure_schema(&mut conn).unwrap());
        assert_eq!(table_count(&conn), 0);
    }

    #[test]
    fn ensure_schema_adopts_unversioned_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(schema::LOADER_SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO artist (artist_id, name) VALUES ('AR1', 'Someone')",
            NO_PARAMS,
        )
        .unwrap();

        assert!(ensure_schema(&mut conn).unwrap());

        assert_eq!(table_count(&conn), 5);
        assert_eq!(schema_version(&conn).unwrap(), Some(schema::SCHEMA_VERSION));
        let artists: i64 = conn
            .query_row("SELECT COUNT(*) FROM artist", NO_PARAMS, |row| row.get(0))
            .unwrap();
        assert_eq!(artists, 1);
    }

    #[test]
    fn reset_schema_empties_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(ensure_schema(&mut conn).unwrap());
        conn.execute(
            "INSERT INTO users (user_id, first_name, level) VALUES (1, 'Lily', 'free')",
            NO_PARAMS,
        )
        .unwrap();

        reset_schema(&mut conn).unwrap();

        assert_eq!(table_count(&conn), 5);
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", NO_PARAMS, |row| row.get(0))
            .unwrap();
        assert_eq!(users, 0);
        assert_eq!(schema_version(&conn).unwrap(), Some(schema::SCHEMA_VERSION));
    }
}
