use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::SCHEMA;
use super::{FileStore, PermissionStore, Provisioning, SessionStore, Store, UserStore};
use crate::error::{Error, Result};
use crate::types::*;

const USER_COLUMNS: &str = "id, email, password, is_admin, created_at, updated_at";
const FILE_COLUMNS: &str =
    "id, owner_id, name, is_directory, is_root, parent_id, created_at, updated_at";
const PERMISSION_COLUMNS: &str =
    "id, item_type, item_id, user_id, is_owner, can_read, can_write, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Each call returns an independent store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        is_directory: row.get(3)?,
        is_root: row.get(4)?,
        parent_id: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn permission_from_row(row: &Row<'_>) -> rusqlite::Result<Permission> {
    Ok(Permission {
        id: row.get(0)?,
        item_type: row.get(1)?,
        item_id: row.get(2)?,
        user_id: row.get(3)?,
        is_owner: row.get(4)?,
        can_read: row.get(5)?,
        can_write: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

// Row writers take a plain connection so they can run either directly or
// inside a transaction (which derefs to a connection).

fn insert_user(conn: &Connection, user: &User) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO users (id, email, password, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.email,
            user.password,
            user.is_admin,
            format_datetime(&user.created_at),
            format_datetime(&user.updated_at),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(Error::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )))
        }
        Err(e) => Err(Error::from(e)),
    }
}

fn insert_file(conn: &Connection, file: &File) -> Result<()> {
    conn.execute(
        "INSERT INTO files (id, owner_id, name, is_directory, is_root, parent_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            file.id,
            file.owner_id,
            file.name,
            file.is_directory,
            file.is_root,
            file.parent_id,
            format_datetime(&file.created_at),
            format_datetime(&file.updated_at),
        ],
    )?;
    Ok(())
}

fn insert_permission(conn: &Connection, permission: &Permission) -> Result<()> {
    conn.execute(
        "INSERT INTO permissions (id, item_type, item_id, user_id, is_owner, can_read, can_write, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            permission.id,
            permission.item_type,
            permission.item_id,
            permission.user_id,
            permission.is_owner,
            permission.can_read,
            permission.can_write,
            format_datetime(&permission.created_at),
            format_datetime(&permission.updated_at),
        ],
    )?;
    Ok(())
}

impl UserStore for SqliteStore {
    fn all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE users SET email = ?1, password = ?2, is_admin = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                user.email,
                user.password,
                user.is_admin,
                format_datetime(&user.updated_at),
                user.id
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict(format!(
                    "email '{}' is already registered",
                    user.email
                )))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl FileStore for SqliteStore {
    fn all_files(&self) -> Result<Vec<File>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map([], file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_file(&self, id: &str) -> Result<Option<File>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
            params![id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn user_root_file(&self, user_id: &str) -> Result<Option<File>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files WHERE owner_id = ?1 AND is_root = 1"),
            params![user_id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_children(&self, parent_id: &str) -> Result<Vec<File>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE parent_id = ?1 ORDER BY name"
        ))?;

        let rows = stmt.query_map(params![parent_id], file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

impl PermissionStore for SqliteStore {
    fn all_permissions(&self) -> Result<Vec<Permission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map([], permission_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn file_permissions(&self, file_id: &str) -> Result<Vec<Permission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE item_type = ?1 AND item_id = ?2"
        ))?;

        let rows = stmt.query_map(params![ItemType::File, file_id], permission_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_permission_by_id(&self, id: &str) -> Result<Option<Permission>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = ?1"),
            params![id],
            permission_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_permission(
        &self,
        item_type: ItemType,
        item_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {PERMISSION_COLUMNS} FROM permissions
                 WHERE item_type = ?1 AND item_id = ?2 AND user_id = ?3"
            ),
            params![item_type, item_id, user_id],
            permission_from_row,
        )
        .optional()
        .map_err(Error::from)
    }
}

impl SessionStore for SqliteStore {
    fn create_session(&self, session: &Session) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sessions (id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.id,
                session.user_id,
                format_datetime(&session.created_at)
            ],
        )?;
        Ok(())
    }

    fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, created_at FROM sessions WHERE id = ?1",
            params![id],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn provision_user(&self, provisioning: &Provisioning) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        insert_user(&tx, &provisioning.user)?;
        insert_file(&tx, &provisioning.root)?;
        insert_permission(&tx, &provisioning.permission)?;

        tx.commit()?;
        Ok(())
    }

    fn create_file_with_owner(&self, file: &File, permission: &Permission) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        match insert_file(&tx, file) {
            Err(e) if e.is_constraint_violation() => {
                return Err(Error::Conflict(format!(
                    "'{}' already exists in this directory",
                    file.name
                )));
            }
            other => other?,
        }
        insert_permission(&tx, permission)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Files below the user's own files go too (parent_id cascades), so
        // collect the whole subtree before clearing permissions on it.
        tx.execute(
            "WITH RECURSIVE doomed(id) AS (
                 SELECT id FROM files WHERE owner_id = ?1
                 UNION
                 SELECT f.id FROM files f JOIN doomed d ON f.parent_id = d.id
             )
             DELETE FROM permissions WHERE item_type = ?2 AND item_id IN (SELECT id FROM doomed)",
            params![id, ItemType::File],
        )?;
        tx.execute("DELETE FROM files WHERE owner_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn close(&self) -> Result<()> {
        self.conn()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}
