// ── Wanted-interface set ──
//
// The operator names the WAN interfaces to watch as a comma-separated
// list ("X1,X2"). Both acquisition clients filter against this set, so
// every record they return is guaranteed to carry one of these names.

use std::collections::BTreeSet;
use std::fmt;

/// Uppercased, de-duplicated set of interface identifiers to monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WantedInterfaces(BTreeSet<String>);

impl WantedInterfaces {
    /// Parse a comma-separated list. Blank entries are dropped.
    pub fn parse_list(raw: &str) -> Self {
        raw.split(',').collect()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.trim().to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for WantedInterfaces {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for WantedInterfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_uppercases_and_dedupes() {
        let wanted = WantedInterfaces::parse_list(" x1, X2 ,,x1 ");
        assert_eq!(wanted.len(), 2);
        assert_eq!(wanted.to_string(), "X1,X2");
    }

    #[test]
    fn membership_ignores_case() {
        let wanted = WantedInterfaces::parse_list("X1");
        assert!(wanted.contains("x1"));
        assert!(!wanted.contains("X10"));
    }

    #[test]
    fn blank_list_is_empty() {
        assert!(WantedInterfaces::parse_list(" , ").is_empty());
    }
}
