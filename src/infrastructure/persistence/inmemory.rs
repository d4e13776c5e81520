use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::common::errors::StoreError;
use crate::domain::models::delivery::Delivery;

use super::DeliveryStore;

/// Keeps deliveries in arrival order for the lifetime of the sink.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryStore {
    deliveries: Mutex<Vec<Delivery>>,
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn record_delivery(&self, delivery: &Delivery) -> Result<(), StoreError> {
        let mut deliveries_lock = self.deliveries.lock().await;
        deliveries_lock.push(delivery.clone());
        Ok(())
    }

    async fn list_deliveries(&self) -> Result<Vec<Delivery>, StoreError> {
        let deliveries_lock = self.deliveries.lock().await;
        Ok(deliveries_lock.clone())
    }

    async fn get_delivery(&self, id: Uuid) -> Result<Delivery, StoreError> {
        let deliveries_lock = self.deliveries.lock().await;
        deliveries_lock
            .iter()
            .find(|delivery| delivery.id == id)
            .cloned()
            .ok_or(StoreError::DeliveryNotFound(id))
    }
}
