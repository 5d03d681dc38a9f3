use super::favorites::Favorites;
use serde::{Deserialize, Serialize};

/// A listed asset as returned by `GET /v2/assets`
///
/// Example JSON (fields not listed here are ignored):
/// ```json
/// {
///     "id": "bitcoin",
///     "rank": "1",
///     "symbol": "BTC",
///     "name": "Bitcoin",
///     "priceUsd": "67012.3847162539"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Decimal as text, kept verbatim
    #[serde(default)]
    pub price_usd: Option<String>,
}

impl Asset {
    /// Key under which this asset is stored in [`Favorites`]
    pub fn favorite_key(&self) -> String {
        Favorites::normalize(&self.name)
    }

    pub fn price_f64(&self) -> Option<f64> {
        self.price_usd.as_deref().and_then(|p| p.trim().parse().ok())
    }

    /// Price rounded to two decimals, `-` when missing or not a number
    pub fn display_price(&self) -> String {
        format_price(self.price_f64())
    }
}

/// Two-decimal rendering used by both tables
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", round_ties_away(v)),
        _ => "-".to_string(),
    }
}

/// `{:.2}` rounds exact ties to even. Values with an odd number of
/// eighths (x.125, x.375, ...) are the only exact two-decimal ties, and
/// those round away from zero instead.
fn round_ties_away(v: f64) -> f64 {
    let eighths = v * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (v * 100.0).round() / 100.0
    } else {
        v
    }
}
