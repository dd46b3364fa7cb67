//! Format validators for user-supplied fields.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("email regex")
});
static PHONE_CN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone regex"));
static ID_CARD_CN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9]\d{5}(18|19|20)\d{2}((0[1-9])|(1[0-2]))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$")
        .expect("id card regex")
});
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color regex"));
static MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$|^([0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}$|^([0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$")
        .expect("mac regex")
});

const ID_CARD_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
const ID_CARD_CHECK_CODES: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

pub fn is_email(s: &str) -> bool {
    s.len() <= 254 && EMAIL.is_match(s)
}

/// Absolute URL with a scheme and a host.
pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|u| u.host_str().is_some_and(|h| !h.is_empty()))
}

pub fn is_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

pub fn is_ipv4(s: &str) -> bool {
    matches!(s.parse::<IpAddr>(), Ok(IpAddr::V4(_)))
}

pub fn is_ipv6(s: &str) -> bool {
    matches!(s.parse::<IpAddr>(), Ok(IpAddr::V6(_)))
}

/// Mainland China mobile number.
pub fn is_phone(s: &str) -> bool {
    PHONE_CN.is_match(s)
}

/// Mainland China 18-digit resident ID, including the check digit.
pub fn is_id_card(s: &str) -> bool {
    ID_CARD_CN.is_match(s) && id_card_checksum_ok(s)
}

fn id_card_checksum_ok(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 18 {
        return false;
    }
    let mut sum = 0;
    for (c, weight) in chars.iter().zip(ID_CARD_WEIGHTS) {
        match c.to_digit(10) {
            Some(d) => sum += d * weight,
            None => return false,
        }
    }
    ID_CARD_CHECK_CODES[(sum % 11) as usize] == chars[17].to_ascii_uppercase()
}

pub fn is_numeric(s: &str) -> bool {
    s.parse::<f64>().is_ok_and(f64::is_finite)
}

pub fn is_integer(s: &str) -> bool {
    s.parse::<i64>().is_ok()
}

pub fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

pub fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}

/// Length in characters within `[min, max]`.
pub fn is_length(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.chars().count())
}

pub fn is_min_length(s: &str, min: usize) -> bool {
    s.chars().count() >= min
}

pub fn is_max_length(s: &str, max: usize) -> bool {
    s.chars().count() <= max
}

/// At least 8 characters with upper, lower, digit and symbol.
pub fn is_strong_password(s: &str) -> bool {
    if s.chars().count() < 8 {
        return false;
    }
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in s.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_numeric() {
            digit = true;
        } else if c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace()) {
            special = true;
        }
    }
    upper && lower && digit && special
}

/// At least 6 characters with a letter and a digit.
pub fn is_weak_password(s: &str) -> bool {
    s.chars().count() >= 6 && s.chars().any(char::is_alphabetic) && s.chars().any(char::is_numeric)
}

/// 13 to 19 digits passing the Luhn check; spaces and dashes are ignored.
pub fn is_credit_card(s: &str) -> bool {
    let digits: String = s.chars().filter(|c| *c != ' ' && *c != '-').collect();
    (13..=19).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && luhn_check(&digits)
}

pub fn luhn_check(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// A JSON object or array.
pub fn is_json(s: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(s.trim()),
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_))
    )
}

pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR.is_match(s)
}

pub fn is_mac(s: &str) -> bool {
    MAC.is_match(s)
}
