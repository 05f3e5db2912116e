use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// ItemType identifies what kind of item a permission row applies to.
/// Stored as an integer so new kinds can be added without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ItemType {
    File = 1,
}

impl ItemType {
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(ItemType::File),
            _ => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::File => write!(f, "file"),
        }
    }
}

impl ToSql for ItemType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for ItemType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        ItemType::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// Permission grants one user access to one item.
/// The (item_type, item_id, user_id) triple is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub item_type: ItemType,
    pub item_id: String,
    pub user_id: String,
    pub is_owner: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Full access for the user who created the item.
    #[must_use]
    pub fn owner(item_type: ItemType, item_id: &str, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_type,
            item_id: item_id.to_string(),
            user_id: user_id.to_string(),
            is_owner: true,
            can_read: true,
            can_write: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ownership implies read access.
    #[must_use]
    pub const fn allows_read(&self) -> bool {
        self.is_owner || self.can_read
    }

    /// Ownership implies write access.
    #[must_use]
    pub const fn allows_write(&self) -> bool {
        self.is_owner || self.can_write
    }
}
