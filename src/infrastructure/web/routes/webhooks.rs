use actix_web::{http::header, web, HttpRequest, HttpResponse};
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    common::{
        errors::StoreError,
        schema_validator::PayloadSchema,
    },
    domain::models::delivery::Delivery,
    infrastructure::{persistence::DeliveryStore, web::SinkSettings},
};

#[tracing::instrument(
    name = "Receiving KYC session webhook",
    skip_all,
    fields(session_id = tracing::field::Empty)
)]
pub async fn receive_kyc_public(
    req: HttpRequest,
    payload: web::Json<Value>,
    store: web::Data<dyn DeliveryStore>,
    settings: web::Data<SinkSettings>,
) -> HttpResponse {
    if !is_authorized(&req, &settings) {
        return unauthorized();
    }

    let payload = payload.into_inner();
    if let Err(err) = PayloadSchema::KycSession.validate(&payload) {
        tracing::warn!("Rejected KYC session delivery: {}", err);
        return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
    }

    let session_id = payload["session_id"].clone();
    if let Some(session_id) = session_id.as_str() {
        tracing::Span::current().record("session_id", session_id);
    }

    match record(&req, payload, store.get_ref()).await {
        Ok(delivery) => HttpResponse::Ok().json(json!({
            "received": true,
            "session_id": session_id,
            "delivery_id": delivery.id
        })),
        Err(err) => not_recorded(err),
    }
}

#[tracing::instrument(name = "Receiving diagnostic webhook", skip_all)]
pub async fn receive_kyc_simple(
    req: HttpRequest,
    payload: web::Json<Value>,
    store: web::Data<dyn DeliveryStore>,
    settings: web::Data<SinkSettings>,
) -> HttpResponse {
    if !is_authorized(&req, &settings) {
        return unauthorized();
    }

    let payload = payload.into_inner();
    if !payload.is_object() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Expected a JSON object as the webhook body" }));
    }

    match record(&req, payload.clone(), store.get_ref()).await {
        Ok(delivery) => HttpResponse::Ok().json(json!({
            "ok": true,
            "received": payload,
            "delivery_id": delivery.id
        })),
        Err(err) => not_recorded(err),
    }
}

#[tracing::instrument(
    name = "Receiving contact form submission",
    skip_all,
    fields(form_id = %form_id)
)]
pub async fn receive_contact_form(
    req: HttpRequest,
    form_id: web::Path<String>,
    payload: web::Json<Value>,
    store: web::Data<dyn DeliveryStore>,
    settings: web::Data<SinkSettings>,
) -> HttpResponse {
    if !is_authorized(&req, &settings) {
        return unauthorized();
    }

    let payload = payload.into_inner();
    if let Err(err) = PayloadSchema::ContactForm.validate(&payload) {
        tracing::warn!("Rejected contact form submission: {}", err);
        return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
    }

    match record(&req, payload, store.get_ref()).await {
        Ok(delivery) => HttpResponse::Ok().json(json!({
            "ok": true,
            "delivery_id": delivery.id
        })),
        Err(err) => not_recorded(err),
    }
}

fn is_authorized(req: &HttpRequest, settings: &SinkSettings) -> bool {
    let Some(secret) = &settings.shared_secret else {
        return true;
    };

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token == secret.expose_secret())
        .unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    tracing::warn!("Rejected delivery without a valid bearer token");
    HttpResponse::Unauthorized().json(json!({ "error": "unauthorized" }))
}

fn not_recorded(err: StoreError) -> HttpResponse {
    tracing::error!("Failed to record delivery: {}", err);
    HttpResponse::InternalServerError().json(json!({
        "message": "The delivery was accepted but could not be recorded",
        "error": err.to_string()
    }))
}

async fn record(
    req: &HttpRequest,
    payload: Value,
    store: &dyn DeliveryStore,
) -> Result<Delivery, StoreError> {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let delivery = Delivery::new(req.path(), payload, user_agent);
    store.record_delivery(&delivery).await?;
    tracing::info!("Recorded delivery {} for {}", delivery.id, delivery.endpoint);
    Ok(delivery)
}
