//! Count-text parsing for GitHub-formatted counters ("160k", "1,234").

use regex::Regex;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Why a count string could not be turned into a number
#[derive(Debug, Error, PartialEq, Eq)]
enum CountParseError {
    #[error("invalid pattern: {0}")]
    Pattern(String),
    #[error("'{0}' is not a decimal number")]
    NotDecimal(String),
    #[error("'{0}' overflows")]
    Overflow(String),
    #[error("'{0}' contains non-ASCII digits")]
    NonAsciiDigits(String),
}

/// Extract a count from display text.
///
/// The text is trimmed and lower-cased first. A "k" anywhere selects the
/// thousands form: the first run of digits and dots is read as a decimal and
/// multiplied by 1000, truncating any sub-unit remainder. Otherwise `,`
/// separators are dropped and the first run of digits is parsed.
///
/// Returns 0 when nothing numeric is found or any step fails; this function
/// never reports an error to the caller. Digits from other scripts ("١٢k")
/// count as a failed step.
pub fn extract_number_from_text(text: &str) -> u64 {
    let text = text.trim().to_lowercase();
    debug!("Extracting number from: {text}");

    match parse_count(&text) {
        Ok(Some(number)) => {
            debug!("Parsed number: {number}");
            number
        }
        Ok(None) => {
            warn!("Could not parse number from: {text}");
            0
        }
        Err(e) => {
            error!("Error parsing number from '{text}': {e}");
            0
        }
    }
}

fn parse_count(text: &str) -> Result<Option<u64>, CountParseError> {
    if text.contains('k') {
        let re = Regex::new(r"[\d.]+").map_err(|e| CountParseError::Pattern(e.to_string()))?;
        // The "k" form requires a match; no match is a failed step, not a miss.
        let Some(m) = re.find(text) else {
            return Err(CountParseError::NotDecimal(text.to_string()));
        };
        let number = thousands(ascii_digits(m.as_str())?)?;
        debug!("Parsed 'k' format: {number}");
        return Ok(Some(number));
    }

    let stripped = text.replace(',', "");
    let re = Regex::new(r"\d+").map_err(|e| CountParseError::Pattern(e.to_string()))?;
    match re.find(&stripped) {
        Some(m) => ascii_digits(m.as_str())?
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CountParseError::Overflow(m.as_str().to_string())),
        None => Ok(None),
    }
}

/// `\d` matches any Unicode decimal digit; only ASCII ones are converted.
fn ascii_digits(matched: &str) -> Result<&str, CountParseError> {
    if matched.is_ascii() {
        Ok(matched)
    } else {
        Err(CountParseError::NonAsciiDigits(matched.to_string()))
    }
}

/// `"1.5"` -> 1500, computed on the decimal digits so "2.3" gives 2300.
fn thousands(decimal: &str) -> Result<u64, CountParseError> {
    let not_decimal = || CountParseError::NotDecimal(decimal.to_string());
    let overflow = || CountParseError::Overflow(decimal.to_string());

    let (whole, fraction) = match decimal.split_once('.') {
        Some((w, f)) => (w, f),
        None => (decimal, ""),
    };
    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(not_decimal());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };

    let mut milli: u64 = 0;
    for (i, digit) in fraction.bytes().take(3).enumerate() {
        let value = u64::from(digit - b'0');
        milli += value * 10u64.pow(2 - i as u32);
    }

    whole
        .checked_mul(1000)
        .and_then(|n| n.checked_add(milli))
        .ok_or_else(overflow)
}
