/*
 * Responsibility
 * - GET /me : token に封入されていた payload をそのまま返す
 * - Bearer guard の後ろでだけ呼ばれる
 */
use axum::Json;
use serde_json::Value;

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Value> {
    Json(ctx.payload)
}
