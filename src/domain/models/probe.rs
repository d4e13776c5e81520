use std::{fmt::Display, time::Duration};

use reqwest::{
    header::{
        HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE,
        USER_AGENT,
    },
    Url,
};
use secrecy::Secret;
use serde::Serialize;
use serde_json::Value;

use crate::common::{
    configuration::{TargetSettings, TargetsSettings},
    errors::ProbeError,
    schema_validator::PayloadSchema,
};

use super::payload::{ContactFormSubmission, DiagnosticPayload, KycSessionPayload, ProbePayload};

pub const DIDIT_USER_AGENT: &str = "Didit-Webhook/1.0";

/// The endpoints the probe knows how to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProbeVariant {
    /// Formspree contact form submission.
    ContactForm,
    /// Didit-shaped session event to the public KYC webhook.
    KycPublic,
    /// Connectivity check against the simple KYC webhook.
    KycSimple,
}

impl ProbeVariant {
    pub fn default_payload(&self) -> ProbePayload {
        match self {
            ProbeVariant::ContactForm => ProbePayload::ContactForm(ContactFormSubmission::sample()),
            ProbeVariant::KycPublic => ProbePayload::KycSession(KycSessionPayload::sample()),
            ProbeVariant::KycSimple => ProbePayload::Diagnostic(DiagnosticPayload::connectivity()),
        }
    }

    pub fn default_user_agent(&self) -> Option<&'static str> {
        match self {
            ProbeVariant::ContactForm => None,
            ProbeVariant::KycPublic | ProbeVariant::KycSimple => Some(DIDIT_USER_AGENT),
        }
    }

    pub fn default_expected_status(&self) -> ExpectedStatus {
        match self {
            ProbeVariant::KycPublic => ExpectedStatus::Exactly(200),
            ProbeVariant::ContactForm | ProbeVariant::KycSimple => ExpectedStatus::AnySuccess,
        }
    }

    pub fn schema(&self) -> PayloadSchema {
        match self {
            ProbeVariant::ContactForm => PayloadSchema::ContactForm,
            ProbeVariant::KycPublic => PayloadSchema::KycSession,
            ProbeVariant::KycSimple => PayloadSchema::Diagnostic,
        }
    }

    pub fn target<'a>(&self, targets: &'a TargetsSettings) -> &'a TargetSettings {
        match self {
            ProbeVariant::ContactForm => &targets.contact_form,
            ProbeVariant::KycPublic => &targets.kyc_public,
            ProbeVariant::KycSimple => &targets.kyc_simple,
        }
    }
}

impl Display for ProbeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeVariant::ContactForm => write!(f, "contact-form"),
            ProbeVariant::KycPublic => write!(f, "kyc-public"),
            ProbeVariant::KycSimple => write!(f, "kyc-simple"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedStatus {
    #[default]
    AnySuccess,
    Exactly(u16),
}

impl ExpectedStatus {
    pub fn matches(&self, status: u16) -> bool {
        match self {
            ExpectedStatus::AnySuccess => (200..=299).contains(&status),
            ExpectedStatus::Exactly(expected) => status == *expected,
        }
    }
}

/// A single POST the probe will issue. The JSON body is rendered once at
/// construction so the bytes on the wire and `content_length` always agree.
#[derive(Debug)]
pub struct ProbeRequest {
    endpoint: Url,
    payload: Value,
    body: Vec<u8>,
    headers: HeaderMap,
    user_agent: Option<HeaderValue>,
    bearer_token: Option<Secret<String>>,
    expected: ExpectedStatus,
    timeout: Option<Duration>,
}

impl ProbeRequest {
    pub fn new(endpoint: &str, payload: &impl Serialize) -> Result<Self, ProbeError> {
        let endpoint = Url::parse(endpoint).map_err(|err| ProbeError::InvalidUrl {
            url: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidUrl {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", endpoint.scheme()),
            });
        }

        let payload = serde_json::to_value(payload)?;
        let body = serde_json::to_vec(&payload)?;

        Ok(Self {
            endpoint,
            payload,
            body,
            headers: HeaderMap::new(),
            user_agent: None,
            bearer_token: None,
            expected: ExpectedStatus::default(),
            timeout: None,
        })
    }

    /// Adds an extra header. `user-agent` is routed to `with_user_agent`;
    /// `content-type` and `content-length` are derived from the JSON body and
    /// `authorization` comes from `with_bearer_token`, so those are refused.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ProbeError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| ProbeError::InvalidHeader {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        if header_name == CONTENT_TYPE || header_name == CONTENT_LENGTH {
            return Err(ProbeError::InvalidHeader {
                name: name.to_string(),
                reason: "set from the JSON body".to_string(),
            });
        }
        if header_name == AUTHORIZATION {
            return Err(ProbeError::InvalidHeader {
                name: name.to_string(),
                reason: "use a bearer token instead".to_string(),
            });
        }
        if header_name == USER_AGENT {
            return self.with_user_agent(value);
        }

        let header_value = HeaderValue::from_str(value).map_err(|err| ProbeError::InvalidHeader {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Result<Self, ProbeError> {
        let user_agent = HeaderValue::try_from(user_agent.into()).map_err(|err| {
            ProbeError::InvalidHeader {
                name: "user-agent".to_string(),
                reason: err.to_string(),
            }
        })?;
        self.user_agent = Some(user_agent);
        Ok(self)
    }

    /// Every header sent on the wire, with one value per name.
    pub fn wire_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, user_agent.clone());
        }
        headers
    }

    pub fn with_bearer_token(mut self, token: Secret<String>) -> Self {
        self.bearer_token = Some(token);
        self
    }

    pub fn expecting(mut self, expected: ExpectedStatus) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_ref()
            .and_then(|user_agent| user_agent.to_str().ok())
    }

    pub fn bearer_token(&self) -> Option<&Secret<String>> {
        self.bearer_token.as_ref()
    }

    pub fn expected(&self) -> ExpectedStatus {
        self.expected
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// How a single delivery ended. Neither failure kind is an `Err`: the probe
/// reports them and lets the caller decide what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { status: u16, body: String },
    Rejected { status: u16, body: String },
    TransportFailure { message: String },
}

impl ProbeOutcome {
    pub fn classify(status: u16, body: String, expected: ExpectedStatus) -> Self {
        if expected.matches(status) {
            ProbeOutcome::Success { status, body }
        } else {
            ProbeOutcome::Rejected { status, body }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Success { status, .. } | ProbeOutcome::Rejected { status, .. } => {
                Some(*status)
            }
            ProbeOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success { body, .. } | ProbeOutcome::Rejected { body, .. } => Some(body),
            ProbeOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ProbeOutcome::Success { .. } => 0,
            ProbeOutcome::TransportFailure { .. } => 1,
            ProbeOutcome::Rejected { .. } => 2,
        }
    }

    pub fn log(&self, endpoint: &Url) {
        match self {
            ProbeOutcome::Success { status, .. } => {
                tracing::info!("Webhook {} accepted the probe with status {}", endpoint, status)
            }
            ProbeOutcome::Rejected { status, .. } => {
                tracing::warn!("Webhook {} rejected the probe with status {}", endpoint, status)
            }
            ProbeOutcome::TransportFailure { message } => {
                tracing::error!("Could not deliver the probe to {}: {}", endpoint, message)
            }
        }
    }
}

impl Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Success { status, body } => {
                writeln!(f, "✅ Webhook responded with status {}", status)?;
                write!(f, "{}", body)
            }
            ProbeOutcome::Rejected { status: 401, body } => {
                writeln!(
                    f,
                    "⚠️ Webhook responded with status 401 (unauthorized): check the auth token and whether the function requires a JWT"
                )?;
                write!(f, "{}", body)
            }
            ProbeOutcome::Rejected { status, body } => {
                writeln!(f, "⚠️ Webhook responded with status {}", status)?;
                write!(f, "{}", body)
            }
            ProbeOutcome::TransportFailure { message } => {
                write!(f, "❌ Failed to reach webhook: {}", message)
            }
        }
    }
}
