pub mod deliveries;
mod health_check;
pub mod webhooks;

pub use health_check::*;
