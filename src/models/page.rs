//! Pagination window for list queries.

use serde::{Deserialize, Deserializer, Serialize};

/// A pagination window over an ordered result set.
///
/// `limit` and `skip` are bound as query parameters, never interpolated
/// into the Cypher text. `u32` keeps negative values unrepresentable and
/// the limit is clamped to [`Page::MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    limit: u32,
    skip: u32,
}

impl Page {
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT_LIMIT: u32 = 1000;

    /// Upper bound on a single page.
    pub const MAX_LIMIT: u32 = 100_000;

    /// Creates a window, clamping `limit` to [`Self::MAX_LIMIT`].
    pub fn new(limit: u32, skip: u32) -> Self {
        Self {
            limit: limit.min(Self::MAX_LIMIT),
            skip,
        }
    }

    /// The window size, as bound to `LIMIT $limit`.
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// The window offset, as bound to `SKIP $skip`.
    pub fn skip(&self) -> i64 {
        i64::from(self.skip)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

// Routes through `new` so a decoded window cannot carry a limit above
// `MAX_LIMIT`. Absent fields fall back to the `Default` window.
impl<'de> Deserialize<'de> for Page {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Window {
            #[serde(default = "default_limit")]
            limit: u32,
            #[serde(default)]
            skip: u32,
        }

        fn default_limit() -> u32 {
            Page::DEFAULT_LIMIT
        }

        let window = Window::deserialize(deserializer)?;
        Ok(Page::new(window.limit, window.skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window() {
        let page = Page::default();
        assert_eq!(page.limit(), 1000);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn limit_clamped_to_max() {
        let page = Page::new(u32::MAX, 10);
        assert_eq!(page.limit(), i64::from(Page::MAX_LIMIT));
        assert_eq!(page.skip(), 10);
    }

    #[test]
    fn explicit_window_kept() {
        let page = Page::new(25, 50);
        assert_eq!(page.limit(), 25);
        assert_eq!(page.skip(), 50);
    }

    #[test]
    fn deserialized_window_is_clamped() {
        let page: Page = serde_json::from_str(r#"{"limit": 4000000000, "skip": 5}"#)
            .expect("window should decode");
        assert_eq!(page.limit(), i64::from(Page::MAX_LIMIT));
        assert_eq!(page.skip(), 5);
    }

    #[test]
    fn deserialized_window_defaults_match_the_default_page() {
        let page: Page = serde_json::from_str("{}").expect("window should decode");
        assert_eq!(page, Page::default());
    }
}
