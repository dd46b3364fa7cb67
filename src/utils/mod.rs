pub mod crypto;
pub mod signature;
pub mod strings;
pub mod time;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client platform reported by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Web,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }

    pub fn is_valid(value: &str) -> bool {
        value.parse::<Platform>().is_ok()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms() {
        assert!(Platform::is_valid("ios"));
        assert!(Platform::is_valid("web"));
        assert!(!Platform::is_valid("IOS"));
        assert!(!Platform::is_valid("android"));
        assert_eq!(Platform::Web.to_string(), "web");
        assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), "\"ios\"");
    }
}
