//! Record store handles.
//!
//! A [`RecordStore`] is opened once at startup, shared with every worker
//! through `web::Data`, and closed after the server stops. Both backends keep
//! a single attendance record per user and day; a later write for the same
//! day replaces the earlier status.

mod memory;
mod mysql;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_more::Display;

use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    subject::{Subject, SubjectAction},
    user::User,
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display, PartialEq)]
pub enum StoreError {
    /// A unique key already exists
    #[display(fmt = "conflict")]
    Conflict,
    #[display(fmt = "not found")]
    NotFound,
    #[display(fmt = "store backend error: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000") => {
                StoreError::Conflict
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub enum RecordStore {
    MySql(MySqlStore),
    Memory(MemoryStore),
}

impl RecordStore {
    pub fn memory() -> Self {
        RecordStore::Memory(MemoryStore::default())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            RecordStore::MySql(_) => "mysql",
            RecordStore::Memory(_) => "memory",
        }
    }

    /// Inserts or overwrites the record for `(user_id, date)`.
    pub async fn upsert_record(
        &self,
        user_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        match self {
            RecordStore::MySql(s) => s.upsert_record(user_id, date, status).await,
            RecordStore::Memory(s) => s.upsert_record(user_id, date, status),
        }
    }

    /// All records owned by `user_id`, oldest date first.
    pub async fn records_for(&self, user_id: &str) -> Result<Vec<AttendanceRecord>, StoreError> {
        match self {
            RecordStore::MySql(s) => s.records_for(user_id).await,
            RecordStore::Memory(s) => s.records_for(user_id),
        }
    }

    pub async fn calendar_for(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<NaiveDate, AttendanceStatus>, StoreError> {
        Ok(self
            .records_for(user_id)
            .await?
            .into_iter()
            .map(|r| (r.date, r.status))
            .collect())
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        match self {
            RecordStore::MySql(s) => s.insert_user(user).await,
            RecordStore::Memory(s) => s.insert_user(user),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        match self {
            RecordStore::MySql(s) => s.find_user_by_username(username).await,
            RecordStore::Memory(s) => s.find_user_by_username(username),
        }
    }

    pub async fn create_subject(&self, user_id: &str, subject: &Subject) -> Result<(), StoreError> {
        match self {
            RecordStore::MySql(s) => s.create_subject(user_id, subject).await,
            RecordStore::Memory(s) => s.create_subject(user_id, subject),
        }
    }

    /// Subjects owned by `user_id` in creation order.
    pub async fn subjects_for(&self, user_id: &str) -> Result<Vec<Subject>, StoreError> {
        match self {
            RecordStore::MySql(s) => s.subjects_for(user_id).await,
            RecordStore::Memory(s) => s.subjects_for(user_id),
        }
    }

    /// Applies `action` to one of the user's subjects and returns the result.
    ///
    /// Fails with [`StoreError::NotFound`] when the subject does not exist or
    /// belongs to another user.
    pub async fn apply_to_subject(
        &self,
        user_id: &str,
        subject_id: &str,
        action: SubjectAction,
    ) -> Result<Subject, StoreError> {
        match self {
            RecordStore::MySql(s) => s.apply_to_subject(user_id, subject_id, action).await,
            RecordStore::Memory(s) => s.apply_to_subject(user_id, subject_id, action),
        }
    }

    pub async fn close(&self) {
        if let RecordStore::MySql(s) = self {
            s.close().await;
        }
    }
}
