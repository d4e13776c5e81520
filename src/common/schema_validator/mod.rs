use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::errors::SchemaViolationError;

pub fn kyc_session_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "session_id": { "type": "string", "minLength": 1 },
            "status": { "type": "string" },
            "session_number": { "type": "integer" },
            "session_token": { "type": "string" },
            "url": { "type": "string" }
        },
        "required": ["session_id", "status", "session_number", "session_token", "url"]
    })
}

pub fn contact_form_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "email": { "type": "string", "minLength": 3 },
            "subject": { "type": "string" },
            "message": { "type": "string" },
            "_replyto": { "type": "string" }
        },
        "required": ["name", "email", "message"]
    })
}

pub fn diagnostic_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "test": { "type": "string" },
            "session_id": { "type": "string" },
            "status": { "type": "string" },
            "timestamp": { "type": "string" }
        },
        "required": ["test"]
    })
}

type CompiledSchema = Result<JSONSchema, String>;

static KYC_SESSION: Lazy<CompiledSchema> = Lazy::new(|| compile(&kyc_session_schema()));
static CONTACT_FORM: Lazy<CompiledSchema> = Lazy::new(|| compile(&contact_form_schema()));
static DIAGNOSTIC: Lazy<CompiledSchema> = Lazy::new(|| compile(&diagnostic_schema()));

fn compile(schema: &Value) -> CompiledSchema {
    JSONSchema::compile(schema).map_err(|err| format!("invalid schema: {}", err))
}

/// The payload shapes the probe sends and the sink accepts. Each schema is
/// compiled once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    KycSession,
    ContactForm,
    Diagnostic,
}

impl PayloadSchema {
    fn compiled(&self) -> &'static CompiledSchema {
        match self {
            PayloadSchema::KycSession => &KYC_SESSION,
            PayloadSchema::ContactForm => &CONTACT_FORM,
            PayloadSchema::Diagnostic => &DIAGNOSTIC,
        }
    }

    pub fn validate(&self, payload: &Value) -> Result<(), SchemaViolationError> {
        let compiled = self
            .compiled()
            .as_ref()
            .map_err(|err| SchemaViolationError::new(err.clone()))?;
        check(compiled, payload)
    }
}

/// Validates against an arbitrary schema, compiling it on every call.
pub fn validate_payload(schema: &Value, payload: &Value) -> Result<(), SchemaViolationError> {
    let compiled = compile(schema).map_err(SchemaViolationError::new)?;
    check(&compiled, payload)
}

fn check(compiled: &JSONSchema, payload: &Value) -> Result<(), SchemaViolationError> {
    let result = compiled.validate(payload).map_err(|errors| {
        errors
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{}: {}", path, err)
                }
            })
            .collect::<Vec<String>>()
            .join("; ")
    });

    result.map_err(SchemaViolationError::new)
}
