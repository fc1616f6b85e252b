// src/ledger.rs

//! Import replacement ledger with exhaustiveness tracking
//!
//! A ledger maps original import identifiers to their replacements and
//! records which entries a rewrite pass actually consumed. Lookups
//! mutate ledger state, so a ledger is single-use: each rewrite pass
//! gets its own instance, and [`ReplacementLedger::assert_exhausted`]
//! is called exactly once when the pass completes.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Replacement descriptor for one original import identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Substitute import path; `None` means remove with no substitute
    pub target: Option<String>,
    /// Version requirement for the substitute, if it is a real module
    pub version: Option<String>,
    /// True if the target is a subfolder of another module and does not
    /// carry its own manifest
    pub subcomponent: bool,
}

impl Replacement {
    pub fn to_path(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            version: None,
            subcomponent: false,
        }
    }

    /// Removal with no substitute
    pub fn drop() -> Self {
        Self {
            target: None,
            version: None,
            subcomponent: false,
        }
    }
}

#[derive(Debug)]
struct Entry {
    replacement: Replacement,
    mandatory: bool,
    seen: bool,
}

/// Single-use mapping from original import identifiers to replacements
#[derive(Debug, Default)]
pub struct ReplacementLedger {
    // BTreeMap keeps exhaustion reports deterministic
    entries: BTreeMap<String, Entry>,
}

impl ReplacementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement for `original`. The first registration
    /// wins; later registrations for the same identifier are ignored.
    ///
    /// Mandatory entries must be consumed by the pass or
    /// [`assert_exhausted`](Self::assert_exhausted) fails; best-effort
    /// entries may go unmatched.
    pub fn register(&mut self, original: impl Into<String>, replacement: Replacement, mandatory: bool) {
        self.entries.entry(original.into()).or_insert(Entry {
            replacement,
            mandatory,
            seen: false,
        });
    }

    /// Look up the replacement for `original`, marking the entry seen
    pub fn lookup(&mut self, original: &str) -> Option<&Replacement> {
        self.entries.get_mut(original).map(|entry| {
            entry.seen = true;
            &entry.replacement
        })
    }

    /// Whether a replacement is registered, without consuming it
    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    /// Fail if any mandatory entry was never consumed. `pass` names the
    /// rewrite pass for the error report.
    pub fn assert_exhausted(&self, pass: &str) -> Result<()> {
        let unmatched: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.mandatory && !e.seen)
            .map(|(original, _)| original.clone())
            .collect();

        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingReplacements {
                pass: pass.to_string(),
                entries: unmatched,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_marks_seen() {
        let mut ledger = ReplacementLedger::new();
        ledger.register("a/b", Replacement::to_path("c/d"), true);

        assert!(ledger.assert_exhausted("test").is_err());
        let rep = ledger.lookup("a/b").cloned().unwrap();
        assert_eq!(rep.target.as_deref(), Some("c/d"));
        assert!(ledger.assert_exhausted("test").is_ok());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut ledger = ReplacementLedger::new();
        ledger.register("a", Replacement::to_path("first"), true);
        ledger.register("a", Replacement::to_path("second"), true);

        let rep = ledger.lookup("a").unwrap();
        assert_eq!(rep.target.as_deref(), Some("first"));
    }

    #[test]
    fn test_best_effort_entries_may_go_unmatched() {
        let mut ledger = ReplacementLedger::new();
        ledger.register("optional", Replacement::drop(), false);
        assert!(ledger.assert_exhausted("test").is_ok());
    }

    #[test]
    fn test_exhaustion_error_lists_every_unmatched_entry() {
        let mut ledger = ReplacementLedger::new();
        ledger.register("b", Replacement::to_path("x"), true);
        ledger.register("a", Replacement::to_path("y"), true);
        ledger.register("c", Replacement::to_path("z"), true);
        ledger.lookup("c");

        match ledger.assert_exhausted("source") {
            Err(crate::Error::MissingReplacements { pass, entries }) => {
                assert_eq!(pass, "source");
                assert_eq!(entries, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected MissingReplacements, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_miss_leaves_state_alone() {
        let mut ledger = ReplacementLedger::new();
        ledger.register("a", Replacement::to_path("x"), true);
        assert!(ledger.lookup("unrelated/import").is_none());
        assert!(ledger.assert_exhausted("test").is_err());
    }
}
