//! Request signing.
//!
//! Every API call carries `appKey`, `signature` and `timestamp` headers, where
//! `signature = hex(md5(appKey + "+" + appSecret + "+" + timestamp))` and the
//! timestamp is whole Unix seconds taken at call time.

use md5::{Digest, Md5};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// App key/secret pair issued by the vendor. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_key: String,
    app_secret: String,
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Signs for the current wall-clock second. Never cached: the remote
    /// rejects stale timestamps.
    pub fn sign_now(&self) -> SignedRequest {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.sign_at(ts)
    }

    /// Signs for an explicit timestamp (seconds since the Unix epoch).
    pub fn sign_at(&self, timestamp: u64) -> SignedRequest {
        SignedRequest {
            app_key: self.app_key.clone(),
            signature: signature(&self.app_key, &self.app_secret, timestamp),
            timestamp,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Authentication header values for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub app_key: String,
    pub signature: String,
    pub timestamp: u64,
}

impl SignedRequest {
    /// Header lines in `Name: value` form, ready for a curl header list.
    pub fn header_lines(&self) -> [String; 3] {
        [
            format!("appKey: {}", self.app_key),
            format!("signature: {}", self.signature),
            format!("timestamp: {}", self.timestamp),
        ]
    }
}

/// Lowercase hex MD5 of `app_key+app_secret+timestamp` joined with `+`.
pub fn signature(app_key: &str, app_secret: &str, timestamp: u64) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{}+{}+{}", app_key, app_secret, timestamp).as_bytes());
    hex::encode(hasher.finalize())
}
