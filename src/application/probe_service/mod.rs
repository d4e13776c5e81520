pub mod webhook_probe;

use std::{path::Path, time::Duration};

use secrecy::{ExposeSecret, Secret};
use serde_json::Value;

use crate::{
    common::{configuration::TargetSettings, errors::ProbeError},
    domain::models::{
        payload::{ProbePayload, SessionStatus},
        probe::{ExpectedStatus, ProbeRequest, ProbeVariant},
    },
};

/// Per-run adjustments on top of the configured target.
#[derive(Debug, Default)]
pub struct ProbeOverrides {
    pub url: Option<String>,
    pub payload: Option<ProbePayload>,
    pub session_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub skip_validation: bool,
}

/// Resolves a variant and its configured target into a ready-to-send request.
///
/// Raw payloads are checked against the variant's schema unless
/// `skip_validation` is set; built-in payloads always conform.
pub fn build_probe_request(
    variant: ProbeVariant,
    target: &TargetSettings,
    overrides: ProbeOverrides,
) -> Result<ProbeRequest, ProbeError> {
    let payload = overrides
        .payload
        .unwrap_or_else(|| variant.default_payload())
        .with_session(overrides.session_id, overrides.status);

    let payload_value = serde_json::to_value(&payload)?;
    if payload.is_raw() && !overrides.skip_validation {
        variant.schema().validate(&payload_value)?;
    }

    let url = overrides.url.as_deref().unwrap_or(&target.url);
    let mut request = ProbeRequest::new(url, &payload_value)?;

    let user_agent = target
        .user_agent
        .as_deref()
        .or_else(|| variant.default_user_agent());
    if let Some(user_agent) = user_agent {
        request = request.with_user_agent(user_agent)?;
    }

    if let Some(token) = &target.auth_token {
        request = request.with_bearer_token(Secret::new(token.expose_secret().clone()));
    }

    let expected = target
        .expected_status
        .map(ExpectedStatus::Exactly)
        .unwrap_or_else(|| variant.default_expected_status());
    request = request.expecting(expected);

    if let Some(timeout_secs) = target.timeout_secs {
        request = request.with_timeout(Duration::from_secs(timeout_secs));
    }

    Ok(request)
}

pub fn load_payload_file(path: &Path) -> Result<ProbePayload, ProbeError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ProbeError::PayloadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents)?;
    Ok(ProbePayload::Raw(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configured_target_fills_request() {
        let mut target = TargetSettings::new("https://example.functions.supabase.co/kyc-webhook-public");
        target.auth_token = Some(Secret::new("anon-key".to_string()));
        target.timeout_secs = Some(5);

        let request =
            build_probe_request(ProbeVariant::KycPublic, &target, ProbeOverrides::default())
                .unwrap();

        assert_eq!(request.endpoint().path(), "/kyc-webhook-public");
        assert_eq!(request.user_agent(), Some("Didit-Webhook/1.0"));
        assert_eq!(request.expected(), ExpectedStatus::Exactly(200));
        assert_eq!(
            request.bearer_token().map(|token| token.expose_secret().as_str()),
            Some("anon-key")
        );
        assert_eq!(request.timeout(), Some(Duration::from_secs(5)));
        assert!(request.payload().get("session_token").is_some());
    }

    #[test]
    fn url_override_wins_over_configuration() {
        let target = TargetSettings::new("https://formspree.io/f/mwppwdpj");
        let overrides = ProbeOverrides {
            url: Some("http://127.0.0.1:9999/f/local".to_string()),
            ..ProbeOverrides::default()
        };

        let request = build_probe_request(ProbeVariant::ContactForm, &target, overrides).unwrap();

        assert_eq!(request.endpoint().as_str(), "http://127.0.0.1:9999/f/local");
        assert_eq!(request.user_agent(), None);
        assert_eq!(request.expected(), ExpectedStatus::AnySuccess);
    }

    #[test]
    fn configured_user_agent_and_status_take_precedence() {
        let mut target = TargetSettings::new("https://example.com/kyc-webhook-simple");
        target.user_agent = Some("hookprobe/0.1".to_string());
        target.expected_status = Some(202);

        let request =
            build_probe_request(ProbeVariant::KycSimple, &target, ProbeOverrides::default())
                .unwrap();

        assert_eq!(request.user_agent(), Some("hookprobe/0.1"));
        assert_eq!(request.expected(), ExpectedStatus::Exactly(202));
    }

    #[test]
    fn session_overrides_reach_the_diagnostic_payload() {
        let target = TargetSettings::new("https://example.com/kyc-webhook-simple");
        let overrides = ProbeOverrides {
            session_id: Some("sess-9".to_string()),
            status: Some(SessionStatus::from("test".to_string())),
            ..ProbeOverrides::default()
        };

        let request = build_probe_request(ProbeVariant::KycSimple, &target, overrides).unwrap();

        assert_eq!(request.payload()["session_id"], json!("sess-9"));
        assert_eq!(request.payload()["status"], json!("test"));
        assert_eq!(request.payload()["test"], json!("webhook"));
    }

    #[test]
    fn malformed_raw_payload_is_rejected_before_sending() {
        let target = TargetSettings::new("https://example.com/kyc-webhook-public");
        let overrides = ProbeOverrides {
            payload: Some(ProbePayload::Raw(json!({ "session_id": "abc" }))),
            ..ProbeOverrides::default()
        };

        let err = build_probe_request(ProbeVariant::KycPublic, &target, overrides).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidPayload(_)));
    }

    #[test]
    fn validation_can_be_skipped_for_raw_payloads() {
        let target = TargetSettings::new("https://example.com/kyc-webhook-public");
        let overrides = ProbeOverrides {
            payload: Some(ProbePayload::Raw(json!({ "session_id": "abc" }))),
            skip_validation: true,
            ..ProbeOverrides::default()
        };

        let request = build_probe_request(ProbeVariant::KycPublic, &target, overrides).unwrap();
        assert_eq!(request.payload(), &json!({ "session_id": "abc" }));
    }

    #[test]
    fn missing_payload_file_is_reported() {
        let err = load_payload_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ProbeError::PayloadFile { .. }));
    }
}
