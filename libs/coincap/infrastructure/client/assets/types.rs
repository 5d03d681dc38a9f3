use crate::domain::Asset;
use serde::{Deserialize, Serialize};

/// Envelope of `GET /v2/assets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsResponse {
    pub data: Vec<Asset>,
    /// Server time in epoch ms
    #[serde(default)]
    pub timestamp: Option<u64>,
}

/// Assets of one page, tagged with the page they were requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPage {
    pub page: usize,
    pub assets: Vec<Asset>,
}

impl AssetPage {
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
