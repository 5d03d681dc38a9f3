use super::favorites::Favorites;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One trade frame from `wss://ws.coincap.io/trades/{exchange}`
///
/// Example frame:
/// ```json
/// {
///     "exchange": "binance",
///     "base": "bitcoin",
///     "quote": "tether",
///     "direction": "buy",
///     "price": 67012.51,
///     "volume": 0.0123,
///     "timestamp": 1712345678901,
///     "priceUsd": 67019.93
/// }
/// ```
///
/// Numeric fields show up either as JSON numbers or as decimal strings
/// depending on the feed, both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    #[serde(default)]
    pub exchange: String,
    pub base: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub direction: String,
    pub price: TradeNumber,
    pub volume: TradeNumber,
    pub price_usd: TradeNumber,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl TradeEvent {
    /// Whether this trade belongs on the watchlist for the given favorites
    pub fn is_watched_by(&self, favorites: &Favorites) -> bool {
        favorites.is_favorite(&self.base)
    }
}

/// Numeric trade field that remembers the text it arrived as
///
/// Displays the received text, so `"0.05210000"` stays `0.05210000`.
/// JSON numbers keep their shortest decimal form.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeNumber {
    value: f64,
    text: String,
}

impl TradeNumber {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<f64> for TradeNumber {
    fn from(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl PartialEq<f64> for TradeNumber {
    fn eq(&self, other: &f64) -> bool {
        self.value == *other
    }
}

impl fmt::Display for TradeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for TradeNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

impl<'de> Deserialize<'de> for TradeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberOrString)
    }
}

struct NumberOrString;

impl<'de> serde::de::Visitor<'de> for NumberOrString {
    type Value = TradeNumber;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<TradeNumber, E> {
        Ok(TradeNumber::from(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<TradeNumber, E> {
        Ok(TradeNumber {
            value: v as f64,
            text: v.to_string(),
        })
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<TradeNumber, E> {
        Ok(TradeNumber {
            value: v as f64,
            text: v.to_string(),
        })
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<TradeNumber, E> {
        let text = v.trim();
        let value = text
            .parse::<f64>()
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))?;
        Ok(TradeNumber {
            value,
            text: text.to_string(),
        })
    }
}
