/*
 * Responsibility
 * - AuthPipeline の設定入力 (AuthOptions)
 * - typed builder と、型なし JSON ドキュメントからの読み込み
 * - 値の検証そのものは pipeline::AuthPipeline::initialize で行う
 */
use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::config::ConfigError;
use crate::services::auth::extra::ExtraValidation;

pub const DEFAULT_HEADER_NAME: &str = "authorization";
pub const MIN_SECRET_LEN: usize = 20;

#[derive(Clone, Default)]
pub struct AuthOptions {
    pub(crate) secret: Option<String>,
    pub(crate) header_name: Option<String>,
    pub(crate) disable_headers: bool,
    pub(crate) disable_query: bool,
    pub(crate) disable_cookies: bool,
    pub(crate) extra_validation: Option<Arc<dyn ExtraValidation>>,
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret
        f.debug_struct("AuthOptions")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("header_name", &self.header_name)
            .field("disable_headers", &self.disable_headers)
            .field("disable_query", &self.disable_query)
            .field("disable_cookies", &self.disable_cookies)
            .field("extra_validation", &self.extra_validation.is_some())
            .finish()
    }
}

impl AuthOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    pub fn with_disable_headers(mut self, disable: bool) -> Self {
        self.disable_headers = disable;
        self
    }

    pub fn with_disable_query(mut self, disable: bool) -> Self {
        self.disable_query = disable;
        self
    }

    pub fn with_disable_cookies(mut self, disable: bool) -> Self {
        self.disable_cookies = disable;
        self
    }

    pub fn with_extra_validation<V>(mut self, validation: V) -> Self
    where
        V: ExtraValidation + 'static,
    {
        self.extra_validation = Some(Arc::new(validation));
        self
    }

    pub fn with_shared_extra_validation(mut self, validation: Arc<dyn ExtraValidation>) -> Self {
        self.extra_validation = Some(validation);
        self
    }

    /// Read options from an untyped JSON document.
    ///
    /// Keys: `secret`, `header_name`, `disable_headers`, `disable_query`,
    /// `disable_cookies`, `extra_validation`. A JSON document cannot carry a
    /// callable, so `extra_validation` must be absent or `null`; attach one with
    /// [`AuthOptions::with_extra_validation`] afterwards.
    ///
    /// Only shape/type problems are reported here. Length and source checks run
    /// in `AuthPipeline::initialize`.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let map = match value {
            Value::Null => return Err(ConfigError::Missing("secret")),
            Value::Object(map) => map,
            _ => {
                return Err(ConfigError::WrongType {
                    key: "options",
                    expected: "an object",
                });
            }
        };

        let secret = match map.get("secret") {
            None | Some(Value::Null) => return Err(ConfigError::Missing("secret")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ConfigError::WrongType {
                    key: "secret",
                    expected: "a string",
                });
            }
        };

        let header_name = match map.get("header_name") {
            None => None,
            Some(Value::Null) => return Err(ConfigError::Null("header_name")),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ConfigError::WrongType {
                    key: "header_name",
                    expected: "a string",
                });
            }
        };

        if !matches!(map.get("extra_validation"), None | Some(Value::Null)) {
            return Err(ConfigError::WrongType {
                key: "extra_validation",
                expected: "null or a function",
            });
        }

        Ok(Self {
            secret: Some(secret),
            header_name,
            disable_headers: flag(map, "disable_headers")?,
            disable_query: flag(map, "disable_query")?,
            disable_cookies: flag(map, "disable_cookies")?,
            extra_validation: None,
        })
    }
}

fn flag(map: &serde_json::Map<String, Value>, key: &'static str) -> Result<bool, ConfigError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ConfigError::WrongType {
            key,
            expected: "a boolean",
        }),
    }
}
