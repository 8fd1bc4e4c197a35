/*
 * Responsibility
 * - payload (JSON) <-> opaque bearer token の変換 (encode/decode)
 * - 認証付き暗号 (ChaCha20-Poly1305) と鍵導出をここに閉じ込める
 * - pipeline からはこの codec だけを使う (方式変更の影響を局所化)
 *
 * Token layout:
 *   "Bearer " + base64url_nopad(nonce[12] ++ ciphertext ++ tag[16])
 */
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::{error::Error, fmt};

pub const BEARER_PREFIX: &str = "Bearer ";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    MissingBearerPrefix,
    InvalidEncoding,
    Truncated { len: usize },
    Decrypt,
    Encrypt,
    Serialize(serde_json::Error),
    MalformedPayload(serde_json::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MissingBearerPrefix => write!(f, "token does not start with 'Bearer '"),
            CodecError::InvalidEncoding => write!(f, "token is not valid base64url"),
            CodecError::Truncated { len } => {
                write!(f, "token too short: {} bytes after decoding", len)
            }
            CodecError::Decrypt => write!(f, "token decryption failed"),
            CodecError::Encrypt => write!(f, "token encryption failed"),
            CodecError::Serialize(e) => write!(f, "payload serialization failed: {}", e),
            CodecError::MalformedPayload(e) => write!(f, "decrypted payload is not json: {}", e),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Serialize(e) | CodecError::MalformedPayload(e) => Some(e),
            _ => None,
        }
    }
}

/// Symmetric token codec keyed by a secret string.
///
/// - The 32-byte key is `SHA-256(secret)`; the secret itself is not retained.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    key: [u8; 32],
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }

    /// Encrypt `payload` into a fresh `Bearer ...` token.
    ///
    /// A new random nonce is drawn on every call, so two tokens for the same
    /// payload never compare equal.
    pub fn encode<T>(&self, payload: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let plaintext = serde_json::to_vec(payload).map_err(CodecError::Serialize)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|_| CodecError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", BEARER_PREFIX, URL_SAFE_NO_PAD.encode(sealed)))
    }

    /// Strip the scheme, authenticate and decrypt, then parse the JSON payload.
    pub fn decode(&self, token: &str) -> Result<Value> {
        let encoded = token
            .strip_prefix(BEARER_PREFIX)
            .ok_or(CodecError::MissingBearerPrefix)?;

        let sealed = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CodecError::InvalidEncoding)?;

        // 空の payload でも JSON 化すれば 1 byte 以上になる
        if sealed.len() <= NONCE_LEN + TAG_LEN {
            return Err(CodecError::Truncated { len: sealed.len() });
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CodecError::Decrypt)?;

        serde_json::from_slice(&plaintext).map_err(CodecError::MalformedPayload)
    }
}

pub fn encode<T>(secret: &str, payload: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    TokenCodec::new(secret).encode(payload)
}

pub fn decode(secret: &str, token: &str) -> Result<Value> {
    TokenCodec::new(secret).decode(token)
}
