use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_more::Display;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use super::board::{SubjectBoard, SubjectCard};
use crate::api::attendance::{RecordAttendance, RecordResponse};
use crate::api::subject::{CreateSubject, MarkAttendance};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus},
    subject::Subject,
};
use crate::models::{CredentialsReq, LoginResponse, RegisterResponse};

#[derive(Debug, Display)]
pub enum ClientError {
    #[display(fmt = "not logged in")]
    NotAuthenticated,
    #[display(fmt = "unknown subject {}", _0)]
    UnknownSubject(String),
    #[display(fmt = "request failed: {}", _0)]
    Http(reqwest::Error),
    /// The server answered with a non-success status
    #[display(fmt = "server responded {}: {}", status, message)]
    Api { status: u16, message: String },
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

/// Keeps a [`SubjectBoard`] in sync with the attendance API.
///
/// Mutations are applied to the board first, then sent. On success the board
/// is replaced by the server's list; on failure the touched card is rolled
/// back and the error returned.
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    board: SubjectBoard,
}

impl SyncClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            board: SubjectBoard::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn board(&self) -> &SubjectBoard {
        &self.board
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(&CredentialsReq {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        parse(resp).await
    }

    /// Logs in and keeps the issued token for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&CredentialsReq {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let login: LoginResponse = parse(resp).await?;
        self.token = Some(login.access_token);
        Ok(())
    }

    /// Replaces the board with the server's subjects.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let resp = self.authed(Method::GET, "/subjects")?.send().await?;
        let subjects: Vec<Subject> = parse(resp).await?;
        self.board.reconcile(subjects);
        Ok(())
    }

    pub async fn add_subject(&mut self, name: &str) -> Result<Subject, ClientError> {
        let resp = self
            .authed(Method::POST, "/subjects")?
            .json(&CreateSubject {
                name: name.to_string(),
            })
            .send()
            .await?;
        let subject: Subject = parse(resp).await?;
        self.refresh().await?;
        Ok(subject)
    }

    /// Toggles a card's "mark present" state.
    ///
    /// Nothing is sent when the toggle leaves the counts unchanged.
    pub async fn set_attendance(&mut self, subject_id: &str, checked: bool) -> Result<(), ClientError> {
        let previous = self
            .board
            .get(subject_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownSubject(subject_id.to_string()))?;

        if self.board.set_checked(subject_id, checked).is_none() {
            return Ok(());
        }

        let path = format!("/subjects/{subject_id}/attendance");
        let result = self
            .send::<_, Subject>(Method::PUT, &path, Some(&MarkAttendance { present: checked }))
            .await;
        self.settle(previous, result).await
    }

    /// Counts one more held class for the subject and unchecks its card.
    pub async fn add_class(&mut self, subject_id: &str) -> Result<(), ClientError> {
        let previous = self
            .board
            .get(subject_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownSubject(subject_id.to_string()))?;

        self.board.add_class(subject_id);

        let path = format!("/subjects/{subject_id}/classes");
        let result = self.send::<(), Subject>(Method::POST, &path, None).await;
        self.settle(previous, result).await
    }

    pub async fn record_today(
        &self,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, ClientError> {
        let resp: RecordResponse = self
            .send(Method::POST, "/attendance", Some(&RecordAttendance { status }))
            .await?;
        Ok(resp.record)
    }

    pub async fn history(&self) -> Result<Vec<AttendanceRecord>, ClientError> {
        self.send::<(), _>(Method::GET, "/attendance", None).await
    }

    pub async fn calendar(&self) -> Result<BTreeMap<NaiveDate, AttendanceStatus>, ClientError> {
        self.send::<(), _>(Method::GET, "/attendance/calendar", None).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.authed(method, path)?;
        if let Some(body) = body {
            req = req.json(body);
        }
        parse(req.send().await?).await
    }

    // Re-fetch after an accepted mutation, roll the card back otherwise
    async fn settle(
        &mut self,
        previous: SubjectCard,
        result: Result<Subject, ClientError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(_) => self.refresh().await,
            Err(e) => {
                tracing::warn!(subject_id = %previous.subject.id, error = %e, "Sync failed, rolling back");
                self.board.restore(previous);
                Err(e)
            }
        }
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
