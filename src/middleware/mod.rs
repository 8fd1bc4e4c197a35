/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth (Bearer guard) と http (横断的な transport 層)
 */
pub mod auth;
pub mod http;
