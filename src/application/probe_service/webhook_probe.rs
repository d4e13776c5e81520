use reqwest::Client;
use secrecy::ExposeSecret;

use crate::{
    common::{errors::ProbeError, helpers::error_chain},
    domain::models::probe::{ProbeOutcome, ProbeRequest},
};

/// Delivers probe requests. One POST per call, no retries.
#[derive(Debug, Clone, Default)]
pub struct WebhookProbe {
    client: Client,
}

impl WebhookProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder()
            .build()
            .map_err(ProbeError::ClientBuild)?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    #[tracing::instrument(
        name = "Delivering webhook probe",
        skip(self, request),
        fields(
            endpoint = %request.endpoint(),
            content_length = request.content_length(),
        )
    )]
    pub async fn deliver(&self, request: &ProbeRequest) -> ProbeOutcome {
        let mut builder = self
            .client
            .post(request.endpoint().clone())
            .headers(request.wire_headers())
            .body(request.body().to_vec());

        if let Some(token) = request.bearer_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let outcome = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => ProbeOutcome::classify(status, body, request.expected()),
                    Err(err) => ProbeOutcome::TransportFailure {
                        message: format!(
                            "status {} received but the body could not be read: {}",
                            status,
                            error_chain(&err)
                        ),
                    },
                }
            }
            Err(err) => ProbeOutcome::TransportFailure {
                message: error_chain(&err),
            },
        };

        outcome.log(request.endpoint());
        outcome
    }
}
