//! Request signing.
//!
//! The signed string is
//!
//! ```text
//! POST\n{base64(md5(body))}\ntext/plain\n{date}
//! ```
//!
//! HMAC-SHA1 over it is keyed with the access key and the header value is
//! `DWAY {secret_key}:{base64(hmac)}`. `body` must be the exact bytes sent,
//! i.e. after compression.
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

/// Content type of every upload, part of the signed string.
pub const TEXT_PLAIN: &str = "text/plain";

/// Scheme of the `Authorization` header value.
pub const SCHEME: &str = "DWAY";

type HmacSha1 = Hmac<Sha1>;

/// Base64 encoded MD5 digest of `body`.
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(Md5::digest(body))
}

/// The canonical string covered by the signature.
pub fn string_to_sign(body: &[u8], date: &str) -> String {
    format!("POST\n{}\n{TEXT_PLAIN}\n{date}", content_md5(body))
}

/// Computes the `Authorization` header value for an upload of `body` sent
/// with the `Date` header `date`.
pub fn sign(body: &[u8], date: &str, access_key: &str, secret_key: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(access_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(string_to_sign(body, date).as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    format!("{SCHEME} {secret_key}:{signature}")
}
