use std::fmt;

use async_trait::async_trait;
use axum::http::{StatusCode, request::Parts};
use serde_json::Value;

/// Rejection raised by an extra validation step.
///
/// The status and message are sent to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

/// Second-stage check applied to a decoded payload.
///
/// Runs after decryption succeeded. `parts` gives access to the rest of the
/// request (method, uri, headers) for checks that need it.
#[async_trait]
pub trait ExtraValidation: Send + Sync {
    async fn validate(&self, payload: &Value, parts: &Parts) -> Result<(), Rejection>;
}

// 同期 closure はそのまま ExtraValidation として渡せる
#[async_trait]
impl<F> ExtraValidation for F
where
    F: Fn(&Value) -> Result<(), Rejection> + Send + Sync,
{
    async fn validate(&self, payload: &Value, _parts: &Parts) -> Result<(), Rejection> {
        self(payload)
    }
}

/// Rejects payloads that lack any of the listed top-level keys.
#[derive(Clone, Default)]
pub struct RequireClaims {
    claims: Vec<String>,
}

impl fmt::Debug for RequireClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.claims).finish()
    }
}

impl RequireClaims {
    pub fn new<I, S>(claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            claims: claims.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[async_trait]
impl ExtraValidation for RequireClaims {
    async fn validate(&self, payload: &Value, _parts: &Parts) -> Result<(), Rejection> {
        let missing = self
            .claims
            .iter()
            .find(|claim| payload.get(claim.as_str()).is_none_or(Value::is_null));

        match missing {
            Some(claim) => Err(Rejection::forbidden(format!("missing claim: {}", claim))),
            None => Ok(()),
        }
    }
}
