use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{common::errors::StoreError, infrastructure::persistence::DeliveryStore};

#[tracing::instrument(name = "Listing recorded deliveries", skip(store))]
pub async fn list_deliveries(store: web::Data<dyn DeliveryStore>) -> HttpResponse {
    match store.get_ref().list_deliveries().await {
        Ok(deliveries) => HttpResponse::Ok().json(deliveries),
        Err(err) => HttpResponse::InternalServerError().json(json!({ "error": err.to_string() })),
    }
}

#[tracing::instrument(
    name = "Fetching recorded delivery",
    skip_all,
    fields(delivery_id = %delivery_id)
)]
pub async fn get_delivery(
    delivery_id: web::Path<Uuid>,
    store: web::Data<dyn DeliveryStore>,
) -> HttpResponse {
    match store.get_ref().get_delivery(delivery_id.into_inner()).await {
        Ok(delivery) => HttpResponse::Ok().json(delivery),
        Err(err @ StoreError::DeliveryNotFound(_)) => {
            HttpResponse::NotFound().json(json!({ "error": err.to_string() }))
        }
    }
}
