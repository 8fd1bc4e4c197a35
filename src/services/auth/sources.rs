//! Token sources.
//!
//! Each source looks at one transport location of an incoming request and
//! returns the raw candidate string when that location carries a non-empty
//! value. The pipeline keeps an ordered list of enabled sources and stops at the
//! first hit.

use axum::http::{HeaderMap, HeaderName, header, request::Parts};

/// Query parameter and cookie name read from the query string and the cookie header.
pub const CREDENTIAL_PARAM: &str = "authorization";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Header(HeaderName),
    Query,
    Cookie,
}

impl TokenSource {
    pub fn extract(&self, parts: &Parts) -> Option<String> {
        match self {
            TokenSource::Header(name) => from_header(&parts.headers, name),
            TokenSource::Query => parts.uri.query().and_then(from_query),
            TokenSource::Cookie => from_cookies(&parts.headers),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TokenSource::Header(_) => "header",
            TokenSource::Query => "query",
            TokenSource::Cookie => "cookie",
        }
    }
}

// HeaderMap の lookup は大文字小文字を区別しない
fn from_header(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let value = headers.get(name)?;
    if value.is_empty() {
        return None;
    }
    // Non-visible bytes still count as a presented credential; the codec rejects them.
    Some(String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == CREDENTIAL_PARAM)
        .map(|(_, value)| value.into_owned())
        .find(|value| !value.is_empty())
}

// Cookie header はバイト列のまま分割する。
// 他の cookie に非 ASCII が混ざっていても authorization の値だけを拾う。
fn from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|v| v.as_bytes().split(|b| *b == b';'))
        .filter_map(cookie_value)
        .map(|raw| decode_cookie_value(unquote(&String::from_utf8_lossy(raw))))
        .find(|value| !value.is_empty())
}

fn cookie_value(pair: &[u8]) -> Option<&[u8]> {
    let eq = pair.iter().position(|b| *b == b'=')?;
    let (name, value) = (&pair[..eq], &pair[eq + 1..]);
    (name.trim_ascii() == CREDENTIAL_PARAM.as_bytes()).then_some(value.trim_ascii())
}

// Cookie values are percent-encoded by most clients; reuse the form decoder on a
// synthetic `v=<value>` pair so `=` inside the value survives.
fn decode_cookie_value(raw: &str) -> String {
    url::form_urlencoded::parse(format!("v={}", raw).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
