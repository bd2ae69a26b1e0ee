//! Request signing
//!
//! Every token is `access_key:urlsafe_b64(hmac_sha1(secret_key, data))`.
//! Base64 uses the URL-safe alphabet with padding kept.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use hmac::{Hmac, Mac};
use qn_core::Credentials;
use serde_json::json;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Lifetime of upload tokens, in seconds
pub const UPLOAD_TOKEN_EXPIRES: i64 = 3600;

/// URL-safe base64 with padding
pub fn urlsafe_b64(data: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(data)
}

/// Encoded entry URI addressing `bucket:key`
pub fn encode_entry(bucket: &str, key: &str) -> String {
    urlsafe_b64(format!("{bucket}:{key}"))
}

/// Credential signer
#[derive(Clone)]
pub struct Auth {
    access_key: String,
    secret_key: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

impl Auth {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            access_key: credentials.access_key.clone(),
            secret_key: credentials.secret_key.clone(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Sign arbitrary bytes
    pub fn sign(&self, data: &[u8]) -> String {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(data);
        let digest = mac.finalize().into_bytes();
        format!("{}:{}", self.access_key, urlsafe_b64(digest))
    }

    /// Sign base64-encoded data and append the encoded data to the token
    pub fn sign_with_data(&self, data: &[u8]) -> String {
        let encoded = urlsafe_b64(data);
        format!("{}:{}", self.sign(encoded.as_bytes()), encoded)
    }

    /// `Authorization` header value for a management request
    ///
    /// The signed data is the path, the query (if any), a newline and the
    /// form-encoded body (if any).
    pub fn management_token(&self, url: &Url, form_body: Option<&[u8]>) -> String {
        let mut data = url.path().as_bytes().to_vec();
        if let Some(query) = url.query() {
            data.push(b'?');
            data.extend_from_slice(query.as_bytes());
        }
        data.push(b'\n');
        if let Some(body) = form_body {
            data.extend_from_slice(body);
        }
        format!("QBox {}", self.sign(&data))
    }

    /// Upload token scoped to `bucket:key`, valid until `deadline` (Unix seconds)
    pub fn upload_token(&self, bucket: &str, key: &str, deadline: i64) -> String {
        let policy = json!({
            "deadline": deadline,
            "scope": format!("{bucket}:{key}"),
        });
        self.sign_with_data(policy.to_string().as_bytes())
    }

    /// Private download URL valid until `deadline` (Unix seconds)
    pub fn private_download_url(&self, base_url: &str, deadline: i64) -> String {
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{base_url}{separator}e={deadline}");
        let token = self.sign(url.as_bytes());
        format!("{url}&token={token}")
    }
}

/// Unix time `secs` seconds from now
pub(crate) fn deadline_after(secs: i64) -> i64 {
    jiff::Timestamp::now().as_second().saturating_add(secs)
}
