//! Statistical-method synonym substitution for render option names.
//!
//! Products publish the same quantity as either an instantaneous or a
//! periodic-aggregate field, so the option name chosen in the UI may use the
//! other label. One substitution pass swaps every known term for its partner.

use explorer_common::{ExplorerError, ExplorerResult};
use regex::{Captures, Regex};

/// Default pairs: analysis <-> point_in_time, instantaneous <-> periodic_max.
const DEFAULT_PAIRS: &[(&str, &str)] = &[
    ("analysis", "point_in_time"),
    ("instantaneous", "periodic_max"),
];

/// Symmetric term substitution table.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    pairs: Vec<(String, String)>,
    pattern: Option<Regex>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let pairs = DEFAULT_PAIRS
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()));
        Self::build(pairs.collect()).unwrap_or_else(|_| Self::empty())
    }
}

impl SynonymTable {
    /// Table with no substitutions.
    pub fn empty() -> Self {
        Self {
            pairs: Vec::new(),
            pattern: None,
        }
    }

    /// Table from configured pairs.
    pub fn from_pairs(pairs: &[[String; 2]]) -> ExplorerResult<Self> {
        Self::build(
            pairs
                .iter()
                .map(|[a, b]| (a.clone(), b.clone()))
                .collect(),
        )
    }

    fn build(pairs: Vec<(String, String)>) -> ExplorerResult<Self> {
        let terms: Vec<String> = pairs
            .iter()
            .flat_map(|(a, b)| [regex::escape(a), regex::escape(b)])
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            return Ok(Self::empty());
        }

        let pattern = Regex::new(&terms.join("|"))
            .map_err(|e| ExplorerError::Config(format!("invalid synonym table: {}", e)))?;

        Ok(Self {
            pairs,
            pattern: Some(pattern),
        })
    }

    fn partner(&self, term: &str) -> Option<&str> {
        self.pairs.iter().find_map(|(a, b)| {
            if a == term {
                Some(b.as_str())
            } else if b == term {
                Some(a.as_str())
            } else {
                None
            }
        })
    }

    /// Option name with every known term swapped, or `None` if nothing changed.
    pub fn alternate(&self, option: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        let replaced = pattern.replace_all(option, |caps: &Captures| {
            let term = &caps[0];
            self.partner(term).unwrap_or(term).to_string()
        });

        if replaced == option {
            None
        } else {
            Some(replaced.into_owned())
        }
    }
}
