pub mod configuration;
pub mod errors;
pub mod helpers;
pub mod schema_validator;
pub mod telemetry;
