pub mod inmemory;

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use crate::{common::errors::StoreError, domain::models::delivery::Delivery};

#[async_trait]
pub trait DeliveryStore: Debug + Send + Sync {
    async fn record_delivery(&self, delivery: &Delivery) -> Result<(), StoreError>;
    async fn list_deliveries(&self) -> Result<Vec<Delivery>, StoreError>;
    async fn get_delivery(&self, id: Uuid) -> Result<Delivery, StoreError>;
}
