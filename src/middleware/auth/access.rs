//! Bearer token guard → 復号した payload を AuthCtx として extensions に入れる
//!
//! - token は header → query → cookie の順に探す (無効化された source は見ない)
//! - 見つからなければ 401、見つかったが不正なら 403
//! - extra validation の拒否は、その status / message をそのまま返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// 保護したい Router に認証を掛ける。
///
/// 例：
/// ```ignore
/// let private = Router::new().route("/me", get(me));
/// let private = middleware::auth::access::apply(private, state.clone());
/// app = app.nest("/api/v1", private);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // extra validation に request 全体を見せるため parts に分解する
    let (mut parts, body) = req.into_parts();

    let payload = match state.auth.authenticate(&parts).await {
        Ok(payload) => payload,
        Err(AuthError::MissingCredential) => {
            tracing::debug!(path = %parts.uri.path(), "no credential presented");
            return Err(AppError::Unauthorized);
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %parts.uri.path(), "credential rejected");
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    parts.extensions.insert(AuthCtx::new(payload));

    Ok(next.run(Request::from_parts(parts, body)).await)
}
