//! CoinCap assets REST API
//!
//! One call: a page of assets ordered by rank.
//! - `GET /v2/assets?limit={n}&offset={m}`

pub mod client;
pub mod types;

pub use client::{assets_url, AssetsApiError, AssetsClient, Result};
pub use types::{AssetPage, AssetsResponse};
