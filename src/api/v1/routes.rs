/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、/me は Bearer guard の内側
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let private = Router::new().route("/me", get(me));
    let private = middleware::auth::access::apply(private, state);

    public.merge(private)
}
