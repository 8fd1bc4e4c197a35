//! Stateless bearer token authentication for axum services.
//!
//! Tokens are `Bearer <base64url(nonce ++ ChaCha20-Poly1305 ciphertext)>` sealed
//! with a key derived from a shared secret. [`services::auth::AuthPipeline`]
//! mints them and validates incoming requests; the guard in
//! [`middleware::auth::access`] turns the outcome into a 401/403 response or an
//! [`api::v1::extractors::AuthCtx`] for handlers.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
