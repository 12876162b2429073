use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COUNTRY_CODE, MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};

/// How mobile numbers are canonicalized into `+<country code><subscriber>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonePolicy {
    /// Prepended to numbers written without an international prefix
    pub default_country_code: String,
    pub min_digits: usize,
    pub max_digits: usize,
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self {
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            min_digits: MIN_PHONE_DIGITS,
            max_digits: MAX_PHONE_DIGITS,
        }
    }
}

impl PhonePolicy {
    pub fn with_country_code(code: impl Into<String>) -> Self {
        Self {
            default_country_code: code.into(),
            ..Self::default()
        }
    }
}

/// Canonicalize a mobile number, or `None` when it does not look like one.
///
/// Separators are dropped; a leading `+` or `00` marks an international number.
/// Numbers of up to ten digits without that marker are treated as national:
/// one trunk `0` is removed and the default country code is prepended.
/// The output always carries a `+`, so feeding it back in returns it unchanged.
pub fn normalize_mobile(raw: &str, policy: &PhonePolicy) -> Option<String> {
    let trimmed = raw.trim();
    let mut digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut international = trimmed.starts_with('+');

    if !international && digits.starts_with("00") {
        digits.replace_range(..2, "");
        international = true;
    }

    if digits.len() < policy.min_digits {
        return None;
    }

    if !international && digits.len() <= 10 {
        let national = digits.strip_prefix('0').unwrap_or(&digits);
        let country: String = policy
            .default_country_code
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits = format!("{country}{national}");
    }

    if digits.len() > policy.max_digits {
        return None;
    }

    Some(format!("+{digits}"))
}
