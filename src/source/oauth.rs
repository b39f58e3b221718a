//! OAuth 1.0a request signing (HMAC-SHA1) for user-context calls.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use time::OffsetDateTime;

use super::ApiError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters pass through, everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LEN: usize = 32;

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

#[derive(Debug, Clone)]
pub struct UserKeys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

/// Per-request nonce and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub nonce: String,
    pub timestamp: i64,
}

impl Stamp {
    pub fn fresh<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let nonce = rng
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        Self {
            nonce,
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

fn protocol_params<'a>(keys: &'a UserKeys, stamp: &'a Stamp, timestamp: &'a str) -> [(&'a str, &'a str); 6] {
    [
        ("oauth_consumer_key", keys.consumer_key.as_str()),
        ("oauth_nonce", stamp.nonce.as_str()),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", keys.token.as_str()),
        ("oauth_version", "1.0"),
    ]
}

/// Base64 HMAC-SHA1 signature over the method, URL and every query, body and
/// protocol parameter.
pub fn signature(
    keys: &UserKeys,
    stamp: &Stamp,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, ApiError> {
    let timestamp = stamp.timestamp.to_string();
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .copied()
        .chain(protocol_params(keys, stamp, &timestamp))
        .map(|(key, value)| (encode(key), encode(value)))
        .collect();
    encoded.sort();
    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&parameter_string)
    );
    let signing_key = format!("{}&{}", encode(&keys.consumer_secret), encode(&keys.token_secret));

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .map_err(|err| ApiError::MissingConfig(format!("invalid signing key: {err}")))?;
    mac.update(base.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Value for the `Authorization` header of a signed request.
pub fn authorization_header(
    keys: &UserKeys,
    stamp: &Stamp,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, ApiError> {
    let signature = signature(keys, stamp, method, url, params)?;
    let timestamp = stamp.timestamp.to_string();
    let mut fields: Vec<(&str, &str)> = protocol_params(keys, stamp, &timestamp).to_vec();
    fields.push(("oauth_signature", signature.as_str()));
    fields.sort();
    let rendered = fields
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {rendered}"))
}
