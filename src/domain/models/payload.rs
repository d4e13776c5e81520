use std::fmt::Display;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle state of a verification session as reported by the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    InReview,
    Approved,
    Declined,
    Expired,
    Abandoned,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::NotStarted => "Not Started",
            SessionStatus::InProgress => "In Progress",
            SessionStatus::InReview => "In Review",
            SessionStatus::Approved => "Approved",
            SessionStatus::Declined => "Declined",
            SessionStatus::Expired => "Expired",
            SessionStatus::Abandoned => "Abandoned",
            SessionStatus::Other(status) => status,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Not Started" => SessionStatus::NotStarted,
            "In Progress" => SessionStatus::InProgress,
            "In Review" => SessionStatus::InReview,
            "Approved" => SessionStatus::Approved,
            "Declined" => SessionStatus::Declined,
            "Expired" => SessionStatus::Expired,
            "Abandoned" => SessionStatus::Abandoned,
            _ => SessionStatus::Other(value),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(value: SessionStatus) -> Self {
        match value {
            SessionStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a verification session, shaped like the events Didit posts to
/// the KYC webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycSessionPayload {
    pub session_id: String,
    pub status: SessionStatus,
    pub session_number: i64,
    pub session_token: String,
    pub url: String,
}

impl KycSessionPayload {
    pub fn sample() -> Self {
        let session_token = Uuid::new_v4().simple().to_string();
        Self {
            session_id: Uuid::new_v4().to_string(),
            status: SessionStatus::NotStarted,
            session_number: 1,
            url: format!("https://verify.didit.me/session/{}", session_token),
            session_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactFormSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "_replyto")]
    pub reply_to: String,
}

impl ContactFormSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let email = email.into();
        Self {
            name: name.into(),
            reply_to: email.clone(),
            email,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn sample() -> Self {
        Self::new(
            "Webhook Probe",
            "probe@example.com",
            "Connectivity check",
            "Test submission sent by hookprobe.",
        )
    }
}

/// Minimal payload used to check that a webhook is reachable at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticPayload {
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    pub timestamp: String,
}

impl DiagnosticPayload {
    pub fn connectivity() -> Self {
        Self {
            test: "webhook".to_string(),
            session_id: None,
            status: None,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbePayload {
    ContactForm(ContactFormSubmission),
    KycSession(KycSessionPayload),
    Diagnostic(DiagnosticPayload),
    Raw(Value),
}

impl ProbePayload {
    /// Points the payload at a specific session. Diagnostic payloads grow the
    /// `session_id`/`status` fields; contact forms and raw payloads are left as is.
    pub fn with_session(
        mut self,
        session_id: Option<String>,
        status: Option<SessionStatus>,
    ) -> Self {
        match &mut self {
            ProbePayload::KycSession(session) => {
                if let Some(session_id) = session_id {
                    session.session_id = session_id;
                }
                if let Some(status) = status {
                    session.status = status;
                }
            }
            ProbePayload::Diagnostic(diagnostic) => {
                if session_id.is_some() {
                    diagnostic.session_id = session_id;
                }
                if status.is_some() {
                    diagnostic.status = status;
                }
            }
            ProbePayload::ContactForm(_) | ProbePayload::Raw(_) => {}
        }
        self
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ProbePayload::Raw(_))
    }
}
