use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ASCII `"<prefix>_<n>"` stable identifier. `n` is monotonically increasing
/// per prefix and never reused, even after the entity it named is removed.
///
/// Ordering compares the numeric suffix, not the raw string, so `"deer_2" <
/// "deer_10"` the way callers mean "id ascending" — i.e. creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpseId(String);

fn numeric_suffix(s: &str) -> Option<u64> {
    s.rsplit_once('_').and_then(|(_, n)| n.parse().ok())
}

impl AnimalId {
    pub fn new(prefix: &str, n: u64) -> Self {
        Self(format!("{prefix}_{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CorpseId {
    pub fn new(n: u64) -> Self {
        Self(format!("corpse_{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialOrd for AnimalId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnimalId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (numeric_suffix(&self.0), numeric_suffix(&other.0)) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CorpseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CorpseId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (numeric_suffix(&self.0), numeric_suffix(&other.0)) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CorpseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animal_id_format() {
        let id = AnimalId::new("deer", 7);
        assert_eq!(id.as_str(), "deer_7");
    }

    #[test]
    fn test_corpse_id_format() {
        let id = CorpseId::new(3);
        assert_eq!(id.as_str(), "corpse_3");
    }

    #[test]
    fn test_ids_ordered_by_string() {
        let a = AnimalId::new("deer", 1);
        let b = AnimalId::new("deer", 2);
        assert!(a < b);
    }
}
