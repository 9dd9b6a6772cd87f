//! Search filters
//!
//! A [`Filters`] value is built per search from the query string (or the
//! CLI) and thrown away afterwards. The wire format follows the search form:
//! `location=cara&beds=3%2B&price=20000-50000&types=house,flat`.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Upper price bound used when the user leaves "max" empty
pub const DEFAULT_PRICE_CEILING: u64 = 1_000_000;

/// Longest location text shown in a chip before truncation
const LOCATION_CHIP_CHARS: usize = 12;

/// Characters left as-is in query values and path segments
pub(crate) const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

lazy_static! {
    static ref NON_DECIMAL: Regex = Regex::new(r"[^0-9.]").unwrap();
}

/// Errors reported back to the search form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Max price cannot be lower than Min price")]
    MaxBelowMin,
}

/// Minimum bedroom requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Beds {
    #[default]
    Any,
    AtLeast(u32),
}

impl Beds {
    /// Parse a form value: "" / "any" -> Any, "3+" -> AtLeast(3), "2" -> AtLeast(2).
    /// Anything unparseable is treated as Any.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("any") {
            return Beds::Any;
        }
        match value.trim_end_matches('+').parse::<u32>() {
            Ok(n) => Beds::AtLeast(n),
            Err(_) => {
                tracing::debug!("Ignoring unparseable beds filter {:?}", value);
                Beds::Any
            }
        }
    }

    pub fn matches(&self, beds: u32) -> bool {
        match self {
            Beds::Any => true,
            Beds::AtLeast(min) => beds >= *min,
        }
    }

    /// Value as it appears in a query string
    pub fn as_param(&self) -> Option<String> {
        match self {
            Beds::Any => None,
            Beds::AtLeast(n) if *n >= 3 => Some(format!("{}+", n)),
            Beds::AtLeast(n) => Some(n.to_string()),
        }
    }

    fn chip(&self) -> Option<String> {
        match self {
            Beds::Any => None,
            Beds::AtLeast(n) if *n >= 3 => Some(format!("{}+ Beds", n)),
            Beds::AtLeast(1) => Some("1 Bed".to_string()),
            Beds::AtLeast(n) => Some(format!("{} Beds", n)),
        }
    }
}

/// Inclusive price range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

impl PriceRange {
    /// Parse the encoded "min-max" form.
    ///
    /// An absent bound takes its default (0 for min, `ceiling` for max); a
    /// present but non-numeric bound coerces to 0. Never fails, and does not
    /// re-check that max >= min.
    pub fn parse(encoded: &str, ceiling: u64) -> Self {
        let (min, max) = match encoded.split_once('-') {
            Some((min, max)) => (min, Some(max)),
            None => (encoded, None),
        };
        Self {
            min: parse_bound(min).unwrap_or(0),
            max: max.and_then(parse_bound).unwrap_or(ceiling),
        }
    }

    /// Build a range from the raw min/max text inputs of the search form.
    ///
    /// Empty or zero bounds fall back to 0 and `ceiling`, max is clamped up to
    /// min, then capped at `ceiling`.
    pub fn from_inputs(min: &str, max: &str, ceiling: u64) -> Self {
        let min = parse_bound(&sanitize_decimal(min)).unwrap_or(0);
        let max = match parse_bound(&sanitize_decimal(max)) {
            Some(0) | None => ceiling,
            Some(max) => max,
        };
        let max = max.max(min).min(ceiling);
        Self { min, max }
    }

    pub fn contains(&self, price: u64) -> bool {
        self.min <= price && price <= self.max
    }

    fn chip(&self, ceiling: u64) -> String {
        let low = if self.min == 0 {
            "Any".to_string()
        } else {
            self.min.to_string()
        };
        let high = if self.max >= ceiling {
            compact_amount(ceiling)
        } else {
            self.max.to_string()
        };
        format!("${}–${}", low, high)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Parse one price bound. `None` when absent, `Some(0)` when malformed.
fn parse_bound(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v.floor() as u64),
        _ => Some(0),
    }
}

/// Keep digits and the first decimal point only
pub fn sanitize_decimal(input: &str) -> String {
    let digits = NON_DECIMAL.replace_all(input, "");
    let mut seen_dot = false;
    digits
        .chars()
        .filter(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect()
}

/// Check the raw min/max inputs the way the search form does
pub fn validate_price_inputs(min: &str, max: &str) -> Result<(), FilterError> {
    let min = sanitize_decimal(min);
    let max = sanitize_decimal(max);
    if min.is_empty() || max.is_empty() {
        return Ok(());
    }
    let min: f64 = min.parse().unwrap_or(0.0);
    let max: f64 = max.parse().unwrap_or(0.0);
    if max < min {
        Err(FilterError::MaxBelowMin)
    } else {
        Ok(())
    }
}

/// 1_000_000 -> "1M", 250_000 -> "250K"
fn compact_amount(amount: u64) -> String {
    if amount >= 1_000_000 && amount % 1_000_000 == 0 {
        format!("{}M", amount / 1_000_000)
    } else if amount >= 1_000 && amount % 1_000 == 0 {
        format!("{}K", amount / 1_000)
    } else {
        amount.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A search query against the listing collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Case-insensitive substring of city or neighborhood; empty means any
    pub location: String,
    pub beds: Beds,
    pub price: Option<PriceRange>,
    /// Accepted listing types in selection order; empty means any
    pub types: IndexSet<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
            && self.beds == Beds::Any
            && self.price.is_none()
            && self.types.is_empty()
    }

    /// Select a type, or deselect it if already selected
    pub fn toggle_type(&mut self, kind: &str) {
        if !self.types.shift_remove(kind) {
            self.types.insert(kind.to_string());
        }
    }

    /// Short labels for every active filter, in form order
    pub fn chips(&self, ceiling: u64) -> Vec<String> {
        let mut chips = Vec::new();

        if !self.location.is_empty() {
            let shown: String = self.location.chars().take(LOCATION_CHIP_CHARS).collect();
            if self.location.chars().count() > LOCATION_CHIP_CHARS {
                chips.push(format!("{}...", shown));
            } else {
                chips.push(shown);
            }
        }

        if let Some(chip) = self.beds.chip() {
            chips.push(chip);
        }

        if !self.types.is_empty() {
            let names: Vec<String> = self.types.iter().map(|t| capitalize(t)).collect();
            let mut chip = names.join(", ");
            if self.types.len() > 2 {
                chip.push_str(" + more");
            }
            chips.push(chip);
        }

        if let Some(price) = &self.price {
            chips.push(price.chip(ceiling));
        }

        chips
    }

    /// Encode back into a query string (without the leading '?')
    pub fn to_query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if !self.location.is_empty() {
            pairs.push(("location", self.location.clone()));
        }
        if let Some(beds) = self.beds.as_param() {
            pairs.push(("beds", beds));
        }
        if let Some(price) = &self.price {
            pairs.push(("price", price.to_string()));
        }
        if !self.types.is_empty() {
            let types: Vec<&str> = self.types.iter().map(String::as_str).collect();
            pairs.push(("types", types.join(",")));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(&value, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Filters as they arrive on the wire
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub location: Option<String>,
    pub beds: Option<String>,
    pub price: Option<String>,
    /// Comma-separated list of types
    pub types: Option<String>,
    /// Raw "min" input of the search form; used when `price` is absent
    pub min_price: Option<String>,
    /// Raw "max" input of the search form; used when `price` is absent
    pub max_price: Option<String>,
}

impl FilterParams {
    /// Validation message for the raw min/max inputs, if any
    pub fn price_error(&self) -> Option<FilterError> {
        validate_price_inputs(
            self.min_price.as_deref().unwrap_or_default(),
            self.max_price.as_deref().unwrap_or_default(),
        )
        .err()
    }

    /// An encoded `price` wins; otherwise the min/max inputs are sanitized
    /// and clamped with [`PriceRange::from_inputs`].
    pub fn into_filters(self, ceiling: u64) -> Filters {
        let types = self
            .types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let min = self.min_price.as_deref().unwrap_or_default();
        let max = self.max_price.as_deref().unwrap_or_default();
        let price = match self.price.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(encoded) => Some(PriceRange::parse(encoded, ceiling)),
            None if sanitize_decimal(min).is_empty() && sanitize_decimal(max).is_empty() => None,
            None => Some(PriceRange::from_inputs(min, max, ceiling)),
        };

        Filters {
            location: self.location.unwrap_or_default(),
            beds: self.beds.as_deref().map(Beds::parse).unwrap_or_default(),
            price,
            types,
        }
    }
}
