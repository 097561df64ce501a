// ── MacAddress ──
//
// Device identifiers arrive in whatever case the scanner or the operator
// used. Every comparison in this crate goes through `MacAddress` so that
// `aa:bb:..` and `AA:BB:..` name the same tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address, normalized to uppercase colon-separated form (AA:BB:CC:DD:EE:FF).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let upper = raw.as_ref().trim().to_uppercase().replace('-', ":");

        if upper.len() == 12 && upper.chars().all(|c| c.is_ascii_hexdigit()) {
            let octets: Vec<&str> = (0..6).filter_map(|i| upper.get(i * 2..i * 2 + 2)).collect();
            return Self(octets.join(":"));
        }

        Self(upper)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a well-formed six-octet address.
    pub fn is_valid(&self) -> bool {
        let parts: Vec<&str> = self.0.split(':').collect();
        parts.len() == 6
            && parts
                .iter()
                .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
    }

    /// Last two octets, as used in the fallback display label.
    pub fn short_suffix(&self) -> String {
        let len = self.0.chars().count();
        self.0.chars().skip(len.saturating_sub(5)).collect()
    }

    /// Case-insensitive comparison against a raw identifier string.
    pub fn matches(&self, raw: &str) -> bool {
        Self::new(raw) == *self
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for MacAddress {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for MacAddress {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
