use std::{net::TcpListener, sync::Arc};

use actix_web::web;
use hookprobe::application::probe_service::{
    build_probe_request, webhook_probe::WebhookProbe, ProbeOverrides,
};
use hookprobe::common::configuration::TargetSettings;
use hookprobe::common::telemetry::{get_subscriber, init_tracing_subscriber};
use hookprobe::domain::models::delivery::Delivery;
use hookprobe::domain::models::probe::{ProbeOutcome, ProbeVariant};
use hookprobe::infrastructure::persistence::{inmemory::InMemoryDeliveryStore, DeliveryStore};
use hookprobe::infrastructure::web::{startup::run, SinkSettings};
use once_cell::sync::Lazy;
use secrecy::Secret;
use serde_json::{json, Value};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
}

async fn spawn_app(shared_secret: Option<&str>) -> TestApp {
    Lazy::force(&TRACING);
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store: Arc<dyn DeliveryStore> = Arc::new(InMemoryDeliveryStore::default());
    let sink_settings = SinkSettings {
        shared_secret: shared_secret.map(|secret| Secret::new(secret.to_string())),
    };

    let server = run(listener, web::Data::from(store), sink_settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address }
}

fn kyc_session() -> Value {
    json!({
        "session_id": "5b1c0c8e-3f7a-4d8e-9a51-2f4e1a6c9b10",
        "status": "Not Started",
        "session_number": 12,
        "session_token": "b7f0a9",
        "url": "https://verify.didit.me/session/b7f0a9"
    })
}

#[tokio::test]
async fn health_check_works() {
    let test_app = spawn_app(None).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/health_check", &test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn kyc_webhook_acknowledges_and_records_session() {
    let test_app = spawn_app(None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/kyc-webhook-public", &test_app.address))
        .header("User-Agent", "Didit-Webhook/1.0")
        .json(&kyc_session())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["received"], json!(true));
    assert_eq!(body["session_id"], kyc_session()["session_id"]);

    let deliveries: Vec<Delivery> = client
        .get(&format!("{}/api/deliveries", &test_app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Response was not a delivery list");

    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].endpoint, "/kyc-webhook-public");
    assert_eq!(deliveries[0].payload, kyc_session());
    assert_eq!(deliveries[0].user_agent.as_deref(), Some("Didit-Webhook/1.0"));
}

#[tokio::test]
async fn kyc_webhook_returns_a_400_when_fields_are_missing() {
    let test_app = spawn_app(None).await;
    let client = reqwest::Client::new();
    let test_cases = vec![
        (json!({ "status": "Not Started" }), "missing the session id"),
        (
            json!({ "session_id": "abc", "status": "test", "session_number": "one", "session_token": "t", "url": "u" }),
            "session number is not an integer",
        ),
        (json!({}), "empty object"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = client
            .post(&format!("{}/kyc-webhook-public", &test_app.address))
            .json(&invalid_body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            400,
            response.status().as_u16(),
            "The sink did not fail with 400 Bad Request when the payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn deliveries_without_the_shared_secret_are_unauthorized() {
    let test_app = spawn_app(Some("s3cret")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/kyc-webhook-simple", &test_app.address))
        .json(&json!({ "test": "webhook" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = client
        .post(&format!("{}/kyc-webhook-simple", &test_app.address))
        .bearer_auth("wrong")
        .json(&json!({ "test": "webhook" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = client
        .post(&format!("{}/kyc-webhook-simple", &test_app.address))
        .bearer_auth("s3cret")
        .json(&json!({ "test": "webhook" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn contact_form_submission_is_accepted() {
    let test_app = spawn_app(None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/f/mwppwdpj", &test_app.address))
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Hello",
            "message": "Just checking in",
            "_replyto": "ada@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Response was not JSON");
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn unknown_delivery_returns_a_404() {
    let test_app = spawn_app(None).await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!(
            "{}/api/deliveries/{}",
            &test_app.address,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn probe_variants_are_acknowledged_by_the_sink() {
    let test_app = spawn_app(None).await;
    let webhook_probe = WebhookProbe::default();

    for (variant, path) in [
        (ProbeVariant::KycPublic, "/kyc-webhook-public"),
        (ProbeVariant::KycSimple, "/kyc-webhook-simple"),
        (ProbeVariant::ContactForm, "/f/mwppwdpj"),
    ] {
        let target = TargetSettings::new(format!("{}{}", test_app.address, path));
        let request = build_probe_request(variant, &target, ProbeOverrides::default())
            .expect("Failed to build probe request");

        let outcome = webhook_probe.deliver(&request).await;

        assert!(
            outcome.is_success(),
            "The {} probe was not acknowledged: {:?}",
            variant,
            outcome
        );
    }
}

#[tokio::test]
async fn probe_without_token_reports_unauthorized_sink() {
    let test_app = spawn_app(Some("s3cret")).await;
    let target = TargetSettings::new(format!("{}/kyc-webhook-simple", test_app.address));
    let request = build_probe_request(ProbeVariant::KycSimple, &target, ProbeOverrides::default())
        .expect("Failed to build probe request");

    let outcome = WebhookProbe::default().deliver(&request).await;

    assert!(matches!(outcome, ProbeOutcome::Rejected { status: 401, .. }));

    let mut target = TargetSettings::new(format!("{}/kyc-webhook-simple", test_app.address));
    target.auth_token = Some(Secret::new("s3cret".to_string()));
    let request = build_probe_request(ProbeVariant::KycSimple, &target, ProbeOverrides::default())
        .expect("Failed to build probe request");

    let outcome = WebhookProbe::default().deliver(&request).await;

    assert!(outcome.is_success());
}
