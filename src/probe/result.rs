// src/probe/result.rs
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A protocol-specific diagnostic value attached to a healthy result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

pub type ProtocolFields = BTreeMap<String, FieldValue>;

/// Outcome of one probe run. Serialized with a `status` tag of
/// `healthy` / `unhealthy` and the protocol fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    Healthy {
        response_time_ms: f64,
        connection: String,
        #[serde(flatten)]
        fields: ProtocolFields,
    },
    Unhealthy {
        error: String,
        connection: String,
    },
}

impl ProbeResult {
    pub fn healthy(connection: impl Into<String>, elapsed: Duration, fields: ProtocolFields) -> Self {
        ProbeResult::Healthy {
            response_time_ms: round_ms(elapsed),
            connection: connection.into(),
            fields,
        }
    }

    pub fn unhealthy(connection: impl Into<String>, error: impl fmt::Display) -> Self {
        ProbeResult::Unhealthy {
            error: error.to_string(),
            connection: connection.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeResult::Healthy { .. })
    }

    pub fn connection(&self) -> &str {
        match self {
            ProbeResult::Healthy { connection, .. } | ProbeResult::Unhealthy { connection, .. } => connection,
        }
    }

    pub fn response_time_ms(&self) -> Option<f64> {
        match self {
            ProbeResult::Healthy { response_time_ms, .. } => Some(*response_time_ms),
            ProbeResult::Unhealthy { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProbeResult::Unhealthy { error, .. } => Some(error),
            ProbeResult::Healthy { .. } => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match self {
            ProbeResult::Healthy { fields, .. } => fields.get(name),
            ProbeResult::Unhealthy { .. } => None,
        }
    }

    /// Shorthand for a textual protocol field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_str)
    }
}

/// Milliseconds rounded to two decimals.
fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_healthy_serializes_flat() {
        let mut fields = ProtocolFields::new();
        fields.insert("version".into(), "7.2.0".into());
        let result = ProbeResult::healthy("redis:6379", Duration::from_micros(12_346), fields);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "healthy",
                "response_time_ms": 12.35,
                "connection": "redis:6379",
                "version": "7.2.0",
            })
        );
    }

    #[test]
    fn test_unhealthy_has_no_response_time() {
        let result = ProbeResult::unhealthy("db:3306", "Connection failed: refused");
        assert!(!result.is_healthy());
        assert_eq!(result.response_time_ms(), None);
        assert_eq!(result.connection(), "db:3306");
        assert_eq!(result.error(), Some("Connection failed: refused"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "unhealthy",
                "error": "Connection failed: refused",
                "connection": "db:3306",
            })
        );
    }
}
