use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Correlates a dispatched search with its completion in logs and events.
id_newtype!(DispatchId);

impl DispatchId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Normalized form used to compare tag names and search text.
pub fn normalize_tag_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_ids_increase() {
        let first = DispatchId(1);
        assert_eq!(first.next(), DispatchId(2));
        assert!(first < first.next());
        assert_eq!(first.next().to_string(), "2");
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_tag_name("  Beach Trip "), "beach trip");
        assert_eq!(normalize_tag_name(""), "");
    }
}
