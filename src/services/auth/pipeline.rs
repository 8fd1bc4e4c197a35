use std::{fmt, sync::Arc};

use axum::http::{HeaderName, request::Parts};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ConfigError;
use crate::services::auth::codec::{BEARER_PREFIX, CodecError, TokenCodec};
use crate::services::auth::extra::{ExtraValidation, Rejection};
use crate::services::auth::options::{AuthOptions, DEFAULT_HEADER_NAME, MIN_SECRET_LEN};
use crate::services::auth::sources::TokenSource;

/// Per-request authentication outcome.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No enabled source carried a credential.
    #[error("no credential presented")]
    MissingCredential,

    /// A credential was found but does not use the `Bearer ` scheme.
    #[error("credential from {source_label} does not use the Bearer scheme")]
    MalformedScheme { source_label: &'static str },

    #[error("credential from {source_label} rejected: {error}")]
    InvalidToken {
        source_label: &'static str,
        #[source]
        error: CodecError,
    },

    #[error("extra validation rejected the credential: {0}")]
    Rejected(#[from] Rejection),
}

/// Validated, immutable authentication pipeline.
///
/// Built once at startup with [`AuthPipeline::initialize`] and shared behind an
/// `Arc`. Holds no per-request state, so any number of requests may go through
/// it concurrently.
#[derive(Clone)]
pub struct AuthPipeline {
    codec: TokenCodec,
    sources: Vec<TokenSource>,
    extra_validation: Option<Arc<dyn ExtraValidation>>,
}

impl fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthPipeline")
            .field("sources", &self.sources)
            .field("extra_validation", &self.extra_validation.is_some())
            .finish_non_exhaustive()
    }
}

impl AuthPipeline {
    pub fn initialize(options: AuthOptions) -> Result<Self, ConfigError> {
        let secret = options.secret.ok_or(ConfigError::Missing("secret"))?;

        let len = secret.chars().count();
        if len < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                len,
                min: MIN_SECRET_LEN,
            });
        }

        let header_name = match options.header_name.as_deref() {
            None => HeaderName::from_static(DEFAULT_HEADER_NAME),
            Some(name) => HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::Invalid("header_name"))?,
        };

        if options.disable_headers && options.disable_query && options.disable_cookies {
            return Err(ConfigError::NoSourceEnabled);
        }

        // 優先順位: header -> query -> cookie
        let mut sources = Vec::with_capacity(3);
        if !options.disable_headers {
            sources.push(TokenSource::Header(header_name));
        }
        if !options.disable_query {
            sources.push(TokenSource::Query);
        }
        if !options.disable_cookies {
            sources.push(TokenSource::Cookie);
        }

        Ok(Self {
            codec: TokenCodec::new(&secret),
            sources,
            extra_validation: options.extra_validation,
        })
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    /// Mint a fresh `Bearer ...` token carrying `payload`.
    pub fn generate_auth_token<T>(&self, payload: &T) -> Result<String, CodecError>
    where
        T: Serialize + ?Sized,
    {
        self.codec.encode(payload)
    }

    /// Mint a token for the empty payload `{}`.
    pub fn generate_empty_auth_token(&self) -> Result<String, CodecError> {
        self.codec.encode(&Value::Object(Map::new()))
    }

    /// First enabled source holding a non-empty value, with its label.
    pub fn find_candidate(&self, parts: &Parts) -> Option<(&'static str, String)> {
        self.sources
            .iter()
            .find_map(|source| source.extract(parts).map(|token| (source.label(), token)))
    }

    /// Locate, decrypt and (optionally) re-validate the request credential.
    pub async fn authenticate(&self, parts: &Parts) -> Result<Value, AuthError> {
        let (source_label, candidate) =
            self.find_candidate(parts).ok_or(AuthError::MissingCredential)?;

        if !candidate.starts_with(BEARER_PREFIX) {
            return Err(AuthError::MalformedScheme { source_label });
        }

        let payload = self
            .codec
            .decode(&candidate)
            .map_err(|error| AuthError::InvalidToken {
                source_label,
                error,
            })?;

        if let Some(validation) = &self.extra_validation {
            validation.validate(&payload, parts).await?;
        }

        tracing::debug!(source = source_label, "credential accepted");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;

    const SECRET: &str = "11111111111111111111";

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn initialize_accepts_valid_options() {
        assert!(AuthPipeline::initialize(AuthOptions::new("1".repeat(20))).is_ok());
        assert!(
            AuthPipeline::initialize(AuthOptions::new("1".repeat(20)).with_header_name("x-auth"))
                .is_ok()
        );
        assert!(
            AuthPipeline::initialize(
                AuthOptions::new("1".repeat(20)).with_extra_validation(|_: &Value| -> Result<(), Rejection> { Ok(()) })
            )
            .is_ok()
        );
    }

    #[test]
    fn initialize_rejects_invalid_options() {
        assert_eq!(
            AuthPipeline::initialize(AuthOptions::default()).unwrap_err(),
            ConfigError::Missing("secret")
        );
        assert_eq!(
            AuthPipeline::initialize(AuthOptions::new("1")).unwrap_err(),
            ConfigError::SecretTooShort { len: 1, min: 20 }
        );
        assert_eq!(
            AuthPipeline::initialize(AuthOptions::new(SECRET).with_header_name("bad header"))
                .unwrap_err(),
            ConfigError::Invalid("header_name")
        );
        assert_eq!(
            AuthPipeline::initialize(AuthOptions::new(SECRET).with_header_name("")).unwrap_err(),
            ConfigError::Invalid("header_name")
        );
        assert_eq!(
            AuthPipeline::initialize(
                AuthOptions::new(SECRET)
                    .with_disable_headers(true)
                    .with_disable_query(true)
                    .with_disable_cookies(true)
            )
            .unwrap_err(),
            ConfigError::NoSourceEnabled
        );
    }

    #[test]
    fn secret_length_counts_characters() {
        // 20 文字 (bytes ではない)
        assert!(AuthPipeline::initialize(AuthOptions::new("あ".repeat(20))).is_ok());
        assert!(AuthPipeline::initialize(AuthOptions::new("あ".repeat(19))).is_err());
    }

    #[test]
    fn sources_follow_header_query_cookie_order() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();
        let labels: Vec<_> = pipeline.sources().iter().map(TokenSource::label).collect();
        assert_eq!(labels, ["header", "query", "cookie"]);

        let pipeline =
            AuthPipeline::initialize(AuthOptions::new(SECRET).with_disable_query(true)).unwrap();
        let labels: Vec<_> = pipeline.sources().iter().map(TokenSource::label).collect();
        assert_eq!(labels, ["header", "cookie"]);
    }

    #[test]
    fn header_wins_over_query_and_cookie() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();
        let p = parts(
            Request::builder()
                .uri("/?authorization=from-query")
                .header(header::AUTHORIZATION, "from-header")
                .header(header::COOKIE, "authorization=from-cookie"),
        );
        assert_eq!(
            pipeline.find_candidate(&p),
            Some(("header", "from-header".to_string()))
        );

        let p = parts(
            Request::builder()
                .uri("/?authorization=from-query")
                .header(header::AUTHORIZATION, "")
                .header(header::COOKIE, "authorization=from-cookie"),
        );
        assert_eq!(
            pipeline.find_candidate(&p),
            Some(("query", "from-query".to_string()))
        );
    }

    #[tokio::test]
    async fn authenticate_maps_each_failure() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();

        let p = parts(Request::builder().uri("/"));
        assert!(matches!(
            pipeline.authenticate(&p).await,
            Err(AuthError::MissingCredential)
        ));

        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, "bacon 1354"));
        assert!(matches!(
            pipeline.authenticate(&p).await,
            Err(AuthError::MalformedScheme { source_label: "header" })
        ));

        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, "Bearer fake123"));
        assert!(matches!(
            pipeline.authenticate(&p).await,
            Err(AuthError::InvalidToken { .. })
        ));

        // 先に見つかった header が不正なら query の有効な token は見ない
        let token = pipeline.generate_auth_token(&json!({ "a": 1 })).unwrap();
        let query = format!("/?authorization={}", token.replace(' ', "%20"));
        let p = parts(
            Request::builder()
                .uri(query.as_str())
                .header(header::AUTHORIZATION, "13543125132"),
        );
        assert!(matches!(
            pipeline.authenticate(&p).await,
            Err(AuthError::MalformedScheme { .. })
        ));
    }

    #[tokio::test]
    async fn authenticate_returns_payload() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();

        let token = pipeline.generate_empty_auth_token().unwrap();
        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, token));
        assert_eq!(pipeline.authenticate(&p).await.unwrap(), json!({}));

        let token = pipeline.generate_auth_token(&json!({ "a": 1 })).unwrap();
        let p = parts(Request::builder().uri("/").header(header::COOKIE, format!("authorization={}", token)));
        assert_eq!(pipeline.authenticate(&p).await.unwrap(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn extra_validation_can_reject() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET).with_extra_validation(
            |payload: &Value| {
                if payload["id"].as_i64().unwrap_or_default() > 10 {
                    return Err(Rejection::new(StatusCode::PAYMENT_REQUIRED, "pay up"));
                }
                Ok(())
            },
        ))
        .unwrap();

        let token = pipeline.generate_auth_token(&json!({ "id": 15 })).unwrap();
        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, token));
        match pipeline.authenticate(&p).await {
            Err(AuthError::Rejected(rejection)) => {
                assert_eq!(rejection.status, StatusCode::PAYMENT_REQUIRED);
                assert_eq!(rejection.message, "pay up");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let token = pipeline.generate_auth_token(&json!({ "id": 3 })).unwrap();
        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, token));
        assert_eq!(pipeline.authenticate(&p).await.unwrap(), json!({ "id": 3 }));
    }

    #[tokio::test]
    async fn pipelines_with_different_secrets_are_isolated() {
        let a = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();
        let b = AuthPipeline::initialize(AuthOptions::new("22222222222222222222")).unwrap();

        let token = a.generate_auth_token(&json!({ "a": 1 })).unwrap();
        let p = parts(Request::builder().uri("/").header(header::AUTHORIZATION, token));

        assert!(a.authenticate(&p).await.is_ok());
        assert!(matches!(
            b.authenticate(&p).await,
            Err(AuthError::InvalidToken { error: CodecError::Decrypt, .. })
        ));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let pipeline = AuthPipeline::initialize(AuthOptions::new(SECRET)).unwrap();
        assert!(!format!("{:?}", pipeline).contains(SECRET));
    }
}
