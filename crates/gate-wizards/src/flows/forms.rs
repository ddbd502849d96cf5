//! Helpers de validación de formularios compartidos por los steps.
//!
//! Todos fallan cerrado con `FlowError::Validation`; ninguna de estas
//! comprobaciones toca la red.

use gate_core::{EntityRefs, FlowError};
use serde_json::Value;

pub fn require_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, FlowError> {
    match input.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(FlowError::Validation(format!("'{field}' is required"))),
    }
}

pub fn require_bool(input: &Value, field: &str) -> Result<bool, FlowError> {
    input.get(field)
         .and_then(Value::as_bool)
         .ok_or_else(|| FlowError::Validation(format!("'{field}' is required")))
}

pub fn require_u64(input: &Value, field: &str) -> Result<u64, FlowError> {
    input.get(field)
         .and_then(Value::as_u64)
         .ok_or_else(|| FlowError::Validation(format!("'{field}' must be a positive number")))
}

/// Formato de email mínimo: algo@dominio.tld. El backend re-valida; esto
/// sólo evita llamadas remotas con basura evidente.
pub fn require_email<'a>(input: &'a Value, field: &str) -> Result<&'a str, FlowError> {
    let value = require_str(input, field)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid {
        return Err(FlowError::Validation(format!("'{field}' is not a valid email address")));
    }
    Ok(value)
}

/// Id opaco producido por un step anterior. Su ausencia es un defecto de
/// cableado del flujo, no un error de usuario.
pub fn require_ref<'a>(refs: &'a EntityRefs, key: &str) -> Result<&'a str, FlowError> {
    refs.get(key)
        .map(String::as_str)
        .ok_or_else(|| FlowError::Internal(format!("missing entity ref '{key}'")))
}
