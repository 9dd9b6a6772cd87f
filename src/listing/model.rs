//! Listing model

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A property listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Identifier, unique within a collection
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    pub title: String,

    /// Asking price in whole US dollars
    #[serde(deserialize_with = "deserialize_price")]
    pub price: u64,

    pub beds: u32,
    pub baths: u32,
    pub sqft: u32,
    pub city: String,
    pub neighborhood: String,

    #[serde(default)]
    pub image_url: String,

    #[serde(default)]
    pub is_new: bool,

    /// Free-text category ("house", "flat", ...)
    #[serde(rename = "type")]
    pub kind: String,
}

impl Listing {
    /// Price formatted as US currency without cents ("$85,000")
    pub fn formatted_price(&self) -> String {
        format_usd(self.price)
    }

    /// Translation key for well-known type codes
    pub fn type_label_key(&self) -> Option<&'static str> {
        match self.kind.as_str() {
            "SFH" => Some("listing_card.sfh"),
            "Apartment" => Some("listing_card.apartment"),
            "Condo" => Some("listing_card.condo"),
            _ => None,
        }
    }
}

/// Format a dollar amount with thousands separators
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPrice::deserialize(deserializer)? {
        RawPrice::Whole(n) => Ok(n),
        RawPrice::Fractional(f) if f.is_finite() && f >= 0.0 => Ok(f.round() as u64),
        RawPrice::Fractional(f) => Err(de::Error::custom(format!("invalid price {}", f))),
        RawPrice::Text(s) => parse_price_text(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid price {:?}", s))),
    }
}

/// Parse a currency-formatted price such as "$85,000" or "48000.00"
pub fn parse_price_text(text: &str) -> Option<u64> {
    let whole = text.split('.').next().unwrap_or_default();
    let digits: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
