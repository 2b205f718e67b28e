use anyhow::{Context, Result};
use regex::Regex;

use super::locators::NUMBER_TOKEN;
use super::normalize::normalize;

const DETAILS_MAX_CHARS: usize = 800;

/// Compiled patterns shared by the value cleaners.
#[derive(Debug)]
pub(crate) struct CleanerPatterns {
    plain_degrees: Regex,
    dms_degrees: Regex,
    api_digits: Regex,
    date_token: Regex,
    date_shaped: Regex,
    number_token: Regex,
}

impl CleanerPatterns {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            plain_degrees: Regex::new(r"^([NSWE]?)\s*(-?\d+(?:\.\d+)?)\s*([NSWE]?)$")
                .context("failed to compile plain-degrees regex")?,
            dms_degrees: Regex::new(
                r#"([NSWE]?)\s*(\d{1,3})[° ]\s*(\d{1,2})[' ]\s*(\d{1,2}(?:\.\d+)?)"?\s*([NSWE]?)"#,
            )
            .context("failed to compile DMS regex")?,
            api_digits: Regex::new(r"(\d{2})-?(\d{3})-?(\d{5})")
                .context("failed to compile API number regex")?,
            date_token: Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}")
                .context("failed to compile date token regex")?,
            date_shaped: Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$")
                .context("failed to compile date shape regex")?,
            number_token: Regex::new(NUMBER_TOKEN)
                .context("failed to compile number token regex")?,
        })
    }

    /// Converts a coordinate to signed decimal degrees. Accepts a plain
    /// decimal or a degree/minute/second form, each with an optional
    /// hemisphere letter before or after. When letters appear on both ends
    /// the leading one decides the sign.
    pub(crate) fn dms_to_decimal(&self, raw: &str) -> Option<f64> {
        let text = normalize(raw).to_uppercase();
        if text.is_empty() {
            return None;
        }

        if let Some(captures) = self.plain_degrees.captures(&text) {
            let value = captures.get(2)?.as_str().parse::<f64>().ok()?;
            let hemisphere = resolve_hemisphere(
                captures.get(1).map(|m| m.as_str()),
                captures.get(3).map(|m| m.as_str()),
            );
            return Some(apply_hemisphere(value, hemisphere));
        }

        let captures = self.dms_degrees.captures(&text)?;
        let degrees = captures.get(2)?.as_str().parse::<f64>().ok()?;
        let minutes = captures.get(3)?.as_str().parse::<f64>().ok()?;
        let seconds = captures.get(4)?.as_str().parse::<f64>().ok()?;
        let hemisphere = resolve_hemisphere(
            captures.get(1).map(|m| m.as_str()),
            captures.get(5).map(|m| m.as_str()),
        );

        Some(apply_hemisphere(
            degrees + minutes / 60.0 + seconds / 3600.0,
            hemisphere,
        ))
    }

    /// Formats an API well number as `NN-NNN-NNNNN` when a ten-digit run is
    /// present, otherwise hands back the whitespace-stripped input.
    pub(crate) fn normalize_api(&self, raw: &str) -> Option<String> {
        let compact = raw
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<String>();
        if compact.is_empty() {
            return None;
        }

        match self.api_digits.captures(&compact) {
            Some(captures) => Some(format!(
                "{}-{}-{}",
                &captures[1], &captures[2], &captures[3]
            )),
            None => Some(compact),
        }
    }

    pub(crate) fn extract_date_token(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(
            self.date_token
                .find(trimmed)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| trimmed.to_string()),
        )
    }

    pub(crate) fn is_date_shaped(&self, raw: &str) -> bool {
        self.date_shaped.is_match(raw.trim())
    }

    /// The first number-shaped token of a capture with its thousands
    /// separators removed. Trailing units, remarks and further numbers on
    /// the same line are dropped.
    pub(crate) fn first_number(&self, raw: &str) -> Option<String> {
        let token = self.number_token.find(raw)?;
        clean_numeric(token.as_str())
    }

    pub(crate) fn apply(&self, cleaner: Cleaner, raw: &str) -> Option<FieldValue> {
        match cleaner {
            Cleaner::Text => non_empty(raw).map(FieldValue::Text),
            Cleaner::Details => non_empty(raw)
                .map(|text| text.chars().take(DETAILS_MAX_CHARS).collect::<String>())
                .map(FieldValue::Text),
            Cleaner::Numeric => self.first_number(raw).map(FieldValue::Text),
            Cleaner::Unit => clean_unit_token(raw).map(FieldValue::Text),
            Cleaner::Date => self.extract_date_token(raw).map(FieldValue::Text),
            Cleaner::ApiNumber => self.normalize_api(raw).map(FieldValue::Text),
            Cleaner::Coordinate { limit } => self
                .dms_to_decimal(raw)
                .filter(|value| value.is_finite() && value.abs() <= limit)
                .map(FieldValue::Degrees),
        }
    }
}

/// How a located raw string becomes a field value. `Numeric` keeps the
/// first number token only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cleaner {
    Text,
    Details,
    Numeric,
    Unit,
    Date,
    ApiNumber,
    Coordinate { limit: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Text(String),
    Degrees(f64),
}

/// Keeps digits and decimal points only. Well-formedness is not checked,
/// so `1.2.3` passes through unchanged.
pub(crate) fn clean_numeric(raw: &str) -> Option<String> {
    let cleaned = raw
        .chars()
        .filter(|character| character.is_ascii_digit() || *character == '.')
        .collect::<String>();
    (!cleaned.is_empty()).then_some(cleaned)
}

pub(crate) fn clean_unit_token(raw: &str) -> Option<String> {
    let cleaned = raw
        .chars()
        .filter(|character| character.is_ascii_alphabetic() || *character == '/')
        .collect::<String>();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn resolve_hemisphere<'a>(leading: Option<&'a str>, trailing: Option<&'a str>) -> &'a str {
    leading
        .filter(|letter| !letter.is_empty())
        .or(trailing)
        .unwrap_or("")
}

fn apply_hemisphere(value: f64, hemisphere: &str) -> f64 {
    if matches!(hemisphere, "S" | "W") {
        -value.abs()
    } else {
        value
    }
}
