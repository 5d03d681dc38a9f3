use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Favorites shared between the UI and the trade stream handler
pub type SharedFavorites = Arc<RwLock<Favorites>>;

/// Set of favorited asset keys
///
/// Keys are normalized (trimmed, lowercased) on the way in, so
/// `"Bitcoin"`, `"bitcoin "` and `"BITCOIN"` are the same favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    keys: HashSet<String>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| Self::normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn into_shared(self) -> SharedFavorites {
        Arc::new(RwLock::new(self))
    }

    pub fn normalize(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Flip presence of `key`. Returns true if it is a favorite afterwards.
    pub fn toggle(&mut self, key: &str) -> bool {
        let key = Self::normalize(key);
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.keys.contains(&Self::normalize(key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in alphabetical order
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_original_state() {
        let mut favorites = Favorites::from_keys(["ethereum"]);
        let original = favorites.clone();

        assert!(favorites.toggle("Bitcoin"));
        assert!(!favorites.toggle("Bitcoin"));
        assert_eq!(favorites, original);

        assert!(!favorites.toggle("ethereum"));
        assert!(favorites.toggle("ethereum"));
        assert_eq!(favorites, original);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut favorites = Favorites::new();
        favorites.toggle("Bitcoin");

        assert!(favorites.is_favorite("bitcoin"));
        assert!(favorites.is_favorite("BITCOIN"));
        assert!(favorites.is_favorite(" Bitcoin "));
        assert!(!favorites.is_favorite("bitcoin-cash"));
    }

    #[test]
    fn test_from_keys_skips_blank_entries() {
        let favorites = Favorites::from_keys(["Solana", "  ", "solana", "XRP"]);
        assert_eq!(favorites.sorted_keys(), vec!["solana", "xrp"]);
    }
}
