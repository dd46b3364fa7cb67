//! Salted HMAC-SHA256 signing of request parameters.
//!
//! The signed text is the parameters plus a derived `salt` entry, sorted by
//! key and joined as a form-encoded query string.

use super::strings::random_alphanumeric;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::{BTreeMap, HashMap};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SALT_PARAM: &str = "salt";
pub const SIGNATURE_PARAM: &str = "signature";

pub fn generate_salt(len: usize) -> String {
    random_alphanumeric(len)
}

/// `x{salt}y{salt}z`
pub fn make_secret_salt(salt: &str) -> String {
    format!("x{salt}y{salt}z")
}

/// Form encoding with spaces as `+`.
fn query_escape(s: &str) -> String {
    urlencoding::encode(s).replace("%20", "+")
}

/// The exact text that gets signed. A caller-supplied `salt` parameter is
/// replaced by the mixed salt.
pub fn canonical_query(params: &HashMap<String, String>, salt: &str) -> String {
    let mut sorted: BTreeMap<&str, String> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    sorted.insert(SALT_PARAM, make_secret_salt(salt));

    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", query_escape(k), query_escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercase hex HMAC-SHA256 of the canonical query.
pub fn generate_signature(params: &HashMap<String, String>, secret: &str, salt: &str) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(canonical_query(params, salt).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Recomputes the signature without the `signature` parameter and compares
/// in constant time. An empty salt never validates.
pub fn validate_signature(
    params: &HashMap<String, String>,
    received: &str,
    secret: &str,
    salt: &str,
) -> bool {
    if salt.is_empty() {
        return false;
    }
    let unsigned: HashMap<String, String> = params
        .iter()
        .filter(|(k, _)| k.as_str() != SIGNATURE_PARAM)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let expected = generate_signature(&unsigned, secret, salt);
    if expected.is_empty() || expected.len() != received.len() {
        return false;
    }
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "3fA7kB2qXv6Lz8WnT0JyR9cE1UMopgNdZsQiHbY5VtCxlGuMPAeKjDwhSnrFOVbX";

    fn params() -> HashMap<String, String> {
        [
            ("user_id", "9633C2AB-23D8-460A-AE54-8966262186E8"),
            ("platform", "ios"),
            ("timestamp", "1762161115"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn salts() {
        for len in [8, 16, 32] {
            let salt = generate_salt(len);
            assert_eq!(salt.len(), len);
            assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        }
        assert_ne!(generate_salt(16), generate_salt(16));
        assert_eq!(make_secret_salt("abc"), "xabcyabcz");
        assert_eq!(make_secret_salt(""), "xyz");
    }

    #[test]
    fn canonical_form_is_sorted_and_escaped() {
        let mut p = HashMap::new();
        p.insert("b".to_string(), "hello world".to_string());
        p.insert("a".to_string(), "x&y=z".to_string());
        p.insert("salt".to_string(), "ignored".to_string());
        assert_eq!(
            canonical_query(&p, "s1"),
            "a=x%26y%3Dz&b=hello+world&salt=xs1ys1z"
        );
    }

    #[test]
    fn signature_matches_manual_hmac() {
        let salt = "3ZC9wC0j";
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(canonical_query(&params(), salt).as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        let signature = generate_signature(&params(), SECRET, salt);
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
        assert_eq!(signature, generate_signature(&params(), SECRET, salt));
        assert_ne!(signature, generate_signature(&params(), SECRET, "other"));
    }

    #[test]
    fn validation_ignores_signature_param() {
        let salt = "3ZC9wC0j";
        let signature = generate_signature(&params(), SECRET, salt);

        let mut signed = params();
        signed.insert("signature".to_string(), signature.clone());
        assert!(validate_signature(&signed, &signature, SECRET, salt));

        assert!(!validate_signature(&signed, &signature, SECRET, ""));
        assert!(!validate_signature(&signed, &signature, "wrong", salt));
        assert!(!validate_signature(&signed, "deadbeef", SECRET, salt));

        signed.insert("platform".to_string(), "web".to_string());
        assert!(!validate_signature(&signed, &signature, SECRET, salt));
    }

    #[test]
    fn empty_params_still_sign() {
        let signature = generate_signature(&HashMap::new(), "k", "s");
        assert_eq!(signature.len(), 64);
        assert!(validate_signature(&HashMap::new(), &signature, "k", "s"));
    }
}
