use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use super::StoreError;
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    subject::{Subject, SubjectAction},
    user::User,
};

/// Process-local store used when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    // user id -> date -> status
    records: HashMap<String, BTreeMap<NaiveDate, AttendanceStatus>>,
    subjects: HashMap<String, Vec<Subject>>,
}

impl MemoryStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    pub(super) fn upsert_record(
        &self,
        user_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        self.write()?
            .records
            .entry(user_id.to_string())
            .or_default()
            .insert(date, status);

        Ok(AttendanceRecord {
            user_id: user_id.to_string(),
            date,
            status,
        })
    }

    pub(super) fn records_for(&self, user_id: &str) -> Result<Vec<AttendanceRecord>, StoreError> {
        let inner = self.read()?;
        let records = inner
            .records
            .get(user_id)
            .map(|days| {
                days.iter()
                    .map(|(date, status)| AttendanceRecord {
                        user_id: user_id.to_string(),
                        date: *date,
                        status: *status,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    pub(super) fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.users.contains_key(&user.username) {
            return Err(StoreError::Conflict);
        }
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    pub(super) fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(username).cloned())
    }

    pub(super) fn create_subject(&self, user_id: &str, subject: &Subject) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let owned = inner.subjects.entry(user_id.to_string()).or_default();
        if owned.iter().any(|s| s.id == subject.id) {
            return Err(StoreError::Conflict);
        }
        owned.push(subject.clone());
        Ok(())
    }

    pub(super) fn subjects_for(&self, user_id: &str) -> Result<Vec<Subject>, StoreError> {
        Ok(self
            .read()?
            .subjects
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    pub(super) fn apply_to_subject(
        &self,
        user_id: &str,
        subject_id: &str,
        action: SubjectAction,
    ) -> Result<Subject, StoreError> {
        let mut inner = self.write()?;
        let subject = inner
            .subjects
            .get_mut(user_id)
            .and_then(|owned| owned.iter_mut().find(|s| s.id == subject_id))
            .ok_or(StoreError::NotFound)?;

        subject.apply(action);
        Ok(subject.clone())
    }
}
