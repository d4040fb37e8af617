//! Ordered field-path extraction over loosely structured upstream JSON.
//!
//! Upstream payloads move the same metric between several keys and nesting
//! levels depending on plan and API revision. Each metric is described as an
//! ordered list of [`FieldPath`]s; the first path that resolves to a usable
//! value wins and later paths are never consulted.

use serde_json::Value;

/// Which of the three per-symbol payloads a path starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Quote,
    Statistics,
    Profile,
}

/// A key path rooted in one payload section, e.g. `statistics.valuations_metrics.pe_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub section: Section,
    pub keys: &'static [&'static str],
}

impl FieldPath {
    pub const fn new(section: Section, keys: &'static [&'static str]) -> Self {
        Self { section, keys }
    }

    pub const fn quote(keys: &'static [&'static str]) -> Self {
        Self::new(Section::Quote, keys)
    }

    pub const fn statistics(keys: &'static [&'static str]) -> Self {
        Self::new(Section::Statistics, keys)
    }

    pub const fn profile(keys: &'static [&'static str]) -> Self {
        Self::new(Section::Profile, keys)
    }

    /// Walks the key path; a missing key or a non-object intermediate yields `None`.
    pub fn resolve<'a>(&self, payloads: &'a RawPayloads) -> Option<&'a Value> {
        self.keys
            .iter()
            .try_fold(payloads.section(self.section), |value, key| value.get(*key))
            .filter(|value| !value.is_null())
    }
}

/// The three raw upstream bodies for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayloads {
    pub quote: Value,
    pub statistics: Value,
    pub profile: Value,
}

impl RawPayloads {
    pub fn new(quote: Value, statistics: Value, profile: Value) -> Self {
        Self {
            quote,
            statistics,
            profile,
        }
    }

    pub fn section(&self, section: Section) -> &Value {
        match section {
            Section::Quote => &self.quote,
            Section::Statistics => &self.statistics,
            Section::Profile => &self.profile,
        }
    }
}

/// First path whose value parses to a finite number, else `0.0`.
pub fn extract_number(payloads: &RawPayloads, paths: &[FieldPath]) -> f64 {
    paths
        .iter()
        .filter_map(|path| path.resolve(payloads))
        .find_map(parse_number)
        .unwrap_or(0.0)
}

/// First path whose value is a non-blank string.
pub fn extract_text(payloads: &RawPayloads, paths: &[FieldPath]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| path.resolve(payloads))
        .find_map(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            _ => None,
        })
}

/// First path whose value has a leading integer.
pub fn extract_count(payloads: &RawPayloads, paths: &[FieldPath]) -> Option<i64> {
    paths
        .iter()
        .filter_map(|path| path.resolve(payloads))
        .find_map(|value| match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
            Value::String(text) => parse_int_prefix(text),
            _ => None,
        })
}

/// Numbers pass through; strings parse by longest numeric prefix (`"12.5%"` is 12.5).
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_float_prefix(text),
        _ => None,
    }
}

fn parse_float_prefix(input: &str) -> Option<f64> {
    let text = input.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = digits_from(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits_from(end + 1);
        if integer_digits + fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent_digits = digits_from(end + 1 + sign);
        if exponent_digits > 0 {
            end += 1 + sign + exponent_digits;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_int_prefix(input: &str) -> Option<i64> {
    let text = input.trim_start();
    let sign = usize::from(matches!(text.as_bytes().first(), Some(b'+' | b'-')));
    let digits = text.as_bytes()[sign..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse::<i64>().ok()
}
