use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::{MySqlPool, mysql::MySqlPoolOptions, prelude::FromRow};

use super::StoreError;
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    subject::{Subject, SubjectAction},
    user::User,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(36) NOT NULL PRIMARY KEY,
        username VARCHAR(64) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance_records (
        user_id VARCHAR(36) NOT NULL,
        date DATE NOT NULL,
        status VARCHAR(16) NOT NULL,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        PRIMARY KEY (user_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subjects (
        seq BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        id VARCHAR(36) NOT NULL UNIQUE,
        user_id VARCHAR(36) NOT NULL,
        name VARCHAR(128) NOT NULL,
        attended INT UNSIGNED NOT NULL DEFAULT 0,
        total INT UNSIGNED NOT NULL DEFAULT 0,
        INDEX idx_subjects_user (user_id)
    )
    "#,
];

#[derive(FromRow)]
struct RecordRow {
    user_id: String,
    date: NaiveDate,
    status: String,
}

impl TryFrom<RecordRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status).map_err(|_: strum::ParseError| {
            StoreError::Backend(format!("unknown attendance status {:?}", row.status))
        })?;
        Ok(AttendanceRecord {
            user_id: row.user_id,
            date: row.date,
            status,
        })
    }
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connects and creates the tables if they are missing.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    pub(super) async fn upsert_record(
        &self,
        user_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance_records (user_id, date, status)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE status = VALUES(status)
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            user_id: user_id.to_string(),
            date,
            status,
        })
    }

    pub(super) async fn records_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT user_id, date, status
            FROM attendance_records
            WHERE user_id = ?
            ORDER BY date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AttendanceRecord::try_from)
        .collect()
    }

    pub(super) async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO users (id, username, password) VALUES (?, ?, ?)"#)
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub(super) async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub(super) async fn create_subject(
        &self,
        user_id: &str,
        subject: &Subject,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subjects (id, user_id, name, attended, total)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subject.id)
        .bind(user_id)
        .bind(&subject.name)
        .bind(subject.attended)
        .bind(subject.total)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub(super) async fn subjects_for(&self, user_id: &str) -> Result<Vec<Subject>, StoreError> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, attended, total
            FROM subjects
            WHERE user_id = ?
            ORDER BY seq
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    pub(super) async fn apply_to_subject(
        &self,
        user_id: &str,
        subject_id: &str,
        action: SubjectAction,
    ) -> Result<Subject, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent toggles on the same subject serialized
        let mut subject = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, attended, total
            FROM subjects
            WHERE id = ? AND user_id = ?
            FOR UPDATE
            "#,
        )
        .bind(subject_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        subject.apply(action);

        sqlx::query("UPDATE subjects SET attended = ?, total = ? WHERE id = ?")
            .bind(subject.attended)
            .bind(subject.total)
            .bind(&subject.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(subject)
    }

    pub(super) async fn close(&self) {
        self.pool.close().await;
    }
}
