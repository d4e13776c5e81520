use std::path::{Path, PathBuf};

use secrecy::Secret;
use serde::Deserialize;

use crate::domain::models::probe::DIDIT_USER_AGENT;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub targets: TargetsSettings,
}

/// Settings for the local webhook sink.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// When set, every delivery must carry `Authorization: Bearer <shared_secret>`.
    pub shared_secret: Option<Secret<String>>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            shared_secret: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TargetsSettings {
    pub contact_form: TargetSettings,
    pub kyc_public: TargetSettings,
    pub kyc_simple: TargetSettings,
}

/// Mirrors `configuration/base.yaml`: Formspree for the contact form, the
/// local sink for both KYC targets.
impl Default for TargetsSettings {
    fn default() -> Self {
        let mut kyc_public = TargetSettings::new("http://127.0.0.1:8000/kyc-webhook-public");
        kyc_public.user_agent = Some(DIDIT_USER_AGENT.to_string());
        kyc_public.expected_status = Some(200);

        let mut kyc_simple = TargetSettings::new("http://127.0.0.1:8000/kyc-webhook-simple");
        kyc_simple.user_agent = Some(DIDIT_USER_AGENT.to_string());

        Self {
            contact_form: TargetSettings::new("https://formspree.io/f/mwppwdpj"),
            kyc_public,
            kyc_simple,
        }
    }
}

/// One endpoint a probe can be pointed at.
#[derive(Debug, Deserialize)]
pub struct TargetSettings {
    pub url: String,
    pub auth_token: Option<Secret<String>>,
    pub user_agent: Option<String>,
    /// Exact status the target must answer with. Any 2xx when absent.
    pub expected_status: Option<u16>,
    pub timeout_secs: Option<u64>,
}

impl TargetSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            user_agent: None,
            expected_status: None,
            timeout_secs: None,
        }
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// Layers `base.yaml`, `<APP_ENVIRONMENT>.yaml` and `APP_`-prefixed
/// environment variables (e.g. `APP_TARGETS__KYC_PUBLIC__URL`). The files are
/// read from `APP_CONFIGURATION_DIR`, or `./configuration` when unset.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let configuration_directory = match std::env::var_os("APP_CONFIGURATION_DIR") {
        Some(directory) => PathBuf::from(directory),
        None => std::env::current_dir()
            .map_err(|err| {
                config::ConfigError::Message(format!(
                    "Failed to determine the current directory: {}",
                    err
                ))
            })?
            .join("configuration"),
    };

    get_configuration_from(&configuration_directory)
}

/// Both files are optional; missing keys fall back to the built-in defaults.
pub fn get_configuration_from(
    configuration_directory: &Path,
) -> Result<Settings, config::ConfigError> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
