//! Cache scopes
//!
//! A CacheScope is the unit of isolation for a binary data store:
//! one evaluation cycle of one named computation, for one configuration,
//! at one valuation time. Two scopes never share storage state.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when rendering a scope as a storage key.
///
/// The ASCII unit separator cannot appear in practical view or
/// configuration names, so distinct scopes always render to distinct keys.
const STORAGE_KEY_SEPARATOR: char = '\u{1F}';

/// Isolation unit for one evaluation cycle's cached values
///
/// Scopes are opaque to the storage layer: it only relies on equality,
/// hashing and [`storage_key`](CacheScope::storage_key). A scope comes into
/// existence when the first value is requested or stored for it and is
/// released when the owning cycle completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheScope {
    /// Name of the computation (view) being evaluated
    pub view_name: String,
    /// Name of the calculation configuration within the view
    pub config_name: String,
    /// Valuation time of the evaluation cycle
    pub valuation_time: DateTime<Utc>,
}

impl CacheScope {
    /// Create a scope for one cycle of one view configuration
    pub fn new(
        view_name: impl Into<String>,
        config_name: impl Into<String>,
        valuation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            view_name: view_name.into(),
            config_name: config_name.into(),
            valuation_time,
        }
    }

    /// Stable string naming this scope's logical sub-database
    ///
    /// Used by persistent backends as the per-scope table name. Equal
    /// scopes always render the same key; distinct scopes render distinct
    /// keys.
    pub fn storage_key(&self) -> String {
        // Full nanosecond precision: the rendering must be as fine-grained
        // as scope equality, or two distinct scopes would share a table
        format!(
            "{}{sep}{}{sep}{}",
            self.view_name,
            self.config_name,
            self.valuation_time
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            sep = STORAGE_KEY_SEPARATOR,
        )
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.view_name,
            self.config_name,
            self.valuation_time.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valuation(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_scope_equality() {
        let a = CacheScope::new("Risk", "Default", valuation(10));
        let b = CacheScope::new("Risk", "Default", valuation(10));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scope_differs_by_each_field() {
        let base = CacheScope::new("Risk", "Default", valuation(10));
        assert_ne!(base, CacheScope::new("PnL", "Default", valuation(10)));
        assert_ne!(base, CacheScope::new("Risk", "Stressed", valuation(10)));
        assert_ne!(base, CacheScope::new("Risk", "Default", valuation(11)));
    }

    #[test]
    fn test_storage_key_is_stable_and_distinct() {
        let a = CacheScope::new("Risk", "Default", valuation(10));
        let b = CacheScope::new("Risk", "Default", valuation(10));
        let c = CacheScope::new("Risk", "Stressed", valuation(10));

        assert_eq!(a.storage_key(), b.storage_key());
        assert_ne!(a.storage_key(), c.storage_key());
    }

    #[test]
    fn test_storage_key_separates_similar_names() {
        // "Risk" + "A" must not collide with "RiskA" + ""
        let a = CacheScope::new("Risk", "A", valuation(10));
        let b = CacheScope::new("RiskA", "", valuation(10));
        assert_ne!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn test_storage_key_keeps_sub_microsecond_precision() {
        let base = valuation(10);
        let a = CacheScope::new("Risk", "Default", base);
        let b = CacheScope::new("Risk", "Default", base + chrono::Duration::nanoseconds(1));

        assert_ne!(a, b);
        assert_ne!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn test_scope_display() {
        let scope = CacheScope::new("Risk", "Default", valuation(10));
        let rendered = scope.to_string();
        assert!(rendered.contains("Risk"));
        assert!(rendered.contains("Default"));
    }
}
