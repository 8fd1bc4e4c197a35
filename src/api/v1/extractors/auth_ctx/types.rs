/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が token を復号して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 復号・検証ロジックは middleware/services 側の責務
 * - payload の形は発行側が決める (任意の JSON)
 */
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `payload` は token に封入されていた JSON そのもの
/// - 寿命は 1 request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCtx {
    pub payload: Value,
}

impl AuthCtx {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// top-level の値を 1 つ取り出す (payload が object でなければ None)
    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// payload を任意の型として読み直す
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
