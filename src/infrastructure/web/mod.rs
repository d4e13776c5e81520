pub mod routes;
pub mod startup;

use secrecy::Secret;

/// Runtime knobs for the webhook sink.
#[derive(Debug, Default)]
pub struct SinkSettings {
    pub shared_secret: Option<Secret<String>>,
}
