use std::collections::HashSet;

use serde::Serialize;

use crate::lead::Lead;

/// Result of checking a candidate batch against leads already saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupOutcome {
    pub new_leads: Vec<Lead>,
    pub duplicate_leads: Vec<Lead>,
}

impl DedupOutcome {
    #[must_use]
    pub fn total(&self) -> usize {
        self.new_leads.len() + self.duplicate_leads.len()
    }
}

/// Partitions `candidates` into new and duplicate leads by normalized phone.
///
/// A candidate is a duplicate iff its digits-only phone is already in
/// `existing` or was accepted earlier in the same batch. Candidates without a
/// usable phone cannot be matched and are always new. Both partitions keep
/// input order.
#[must_use]
pub fn dedupe_against<'a, I>(candidates: Vec<Lead>, existing: I) -> DedupOutcome
where
    I: IntoIterator<Item = &'a Lead>,
{
    let known = existing
        .into_iter()
        .filter_map(Lead::normalized_phone)
        .collect();
    partition_by_phone(candidates, known)
}

/// Same as [`dedupe_against`] with the existing side already reduced to a
/// set of normalized phones, e.g. from a cross-list lookup.
#[must_use]
pub fn partition_by_phone(candidates: Vec<Lead>, mut known: HashSet<String>) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    for lead in candidates {
        match lead.normalized_phone() {
            Some(phone) if known.contains(&phone) => outcome.duplicate_leads.push(lead),
            Some(phone) => {
                known.insert(phone);
                outcome.new_leads.push(lead);
            }
            None => outcome.new_leads.push(lead),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, phone: Option<&str>) -> Lead {
        Lead {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            ..Lead::default()
        }
    }

    fn names(leads: &[Lead]) -> Vec<&str> {
        leads.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn matches_existing_phone_across_formats() {
        let existing = vec![lead("Saved", Some("(11) 99999-0000"))];
        let candidates = vec![
            lead("Same number", Some("11 99999 0000")),
            lead("Other", Some("11988887777")),
        ];
        let outcome = dedupe_against(candidates, &existing);
        assert_eq!(names(&outcome.new_leads), ["Other"]);
        assert_eq!(names(&outcome.duplicate_leads), ["Same number"]);
    }

    #[test]
    fn catches_duplicates_within_the_batch() {
        let candidates = vec![
            lead("First", Some("11999990000")),
            lead("Second", Some("+11 (99999) 0000")),
            lead("Third", Some("11999990000")),
        ];
        let outcome = dedupe_against(candidates, std::iter::empty());
        assert_eq!(names(&outcome.new_leads), ["First"]);
        assert_eq!(names(&outcome.duplicate_leads), ["Second", "Third"]);
    }

    #[test]
    fn leads_without_phone_are_always_new() {
        let existing = vec![lead("Saved", None)];
        let candidates = vec![lead("A", None), lead("B", Some("---"))];
        let outcome = dedupe_against(candidates, &existing);
        assert_eq!(names(&outcome.new_leads), ["A", "B"]);
        assert!(outcome.duplicate_leads.is_empty());
    }

    #[test]
    fn partition_is_exhaustive_and_preserves_order() {
        let existing = vec![lead("x", Some("1111")), lead("y", Some("3333"))];
        let candidates = vec![
            lead("a", Some("1111")),
            lead("b", Some("2222")),
            lead("c", Some("3333")),
            lead("d", Some("2222")),
            lead("e", None),
        ];
        let outcome = dedupe_against(candidates.clone(), &existing);
        assert_eq!(outcome.total(), candidates.len());
        assert_eq!(names(&outcome.new_leads), ["b", "e"]);
        assert_eq!(names(&outcome.duplicate_leads), ["a", "c", "d"]);
    }

    #[test]
    fn partition_by_known_phone_set() {
        let known: HashSet<String> = ["11988887777".to_string()].into_iter().collect();
        let outcome = partition_by_phone(vec![lead("B", Some("(11) 98888-7777"))], known);
        assert!(outcome.new_leads.is_empty());
        assert_eq!(outcome.duplicate_leads.len(), 1);
    }
}
