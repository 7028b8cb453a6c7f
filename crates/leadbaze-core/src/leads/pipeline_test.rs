//! End-to-end checks over filter -> sort -> paginate.

use super::*;
use crate::lead::Lead;

fn lead(name: &str, phone: &str, rating: Option<f64>, reviews: Option<u32>) -> Lead {
    Lead {
        name: name.to_string(),
        phone: Some(phone.to_string()),
        rating,
        review_count: reviews,
        ..Lead::default()
    }
}

fn catalogue() -> Vec<Lead> {
    vec![
        lead("Mercado Sol", "11999990001", Some(4.2), Some(80)),
        lead("Açougue Boi", "1132140000", Some(3.9), Some(12)),
        lead("Café Lua", "21988880000", None, Some(300)),
        lead("Barbearia X", "123", Some(4.9), None),
        lead("Doceria Mel", "31977770000", Some(4.5), Some(45)),
        lead("Ferragens Y", "4133330000", Some(2.5), Some(7)),
        lead("Hortifruti Z", "11966660000", Some(4.0), Some(80)),
    ]
}

#[test]
fn readme_scenario() {
    let leads = vec![
        lead("A", "11999990000", Some(4.8), None),
        lead("B", "11988887777", Some(3.2), None),
    ];
    let criteria = LeadCriteria {
        min_rating: parse_threshold("rating", "4").unwrap(),
        ..LeadCriteria::default()
    };
    let mut rows = filter_leads(&leads, &criteria);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "A");

    sort_leads(
        &mut rows,
        LeadSort {
            by: SortBy::Name,
            order: SortOrder::Asc,
        },
    );
    let page = paginate(&rows, 1, 1);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "A");
}

#[test]
fn filter_never_invents_leads() {
    let leads = catalogue();
    let criteria = LeadCriteria {
        search_term: "a".to_string(),
        min_reviews: Some(10),
        phone: PhoneFilter::Mobile,
        ..LeadCriteria::default()
    };
    let rows = filter_leads(&leads, &criteria);
    assert!(!rows.is_empty());
    for row in rows {
        assert!(leads.iter().any(|l| std::ptr::eq(l, row)));
    }
}

#[test]
fn neutral_criteria_is_identity() {
    let leads = catalogue();
    let rows = filter_leads(&leads, &LeadCriteria::default());
    let expected: Vec<&Lead> = leads.iter().collect();
    assert_eq!(rows, expected);
}

#[test]
fn sorting_twice_is_idempotent() {
    let leads = catalogue();
    for by in [SortBy::Relevance, SortBy::Rating, SortBy::Reviews, SortBy::Name] {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sort = LeadSort { by, order };
            let mut once: Vec<&Lead> = leads.iter().collect();
            sort_leads(&mut once, sort);
            let mut twice = once.clone();
            sort_leads(&mut twice, sort);
            assert_eq!(once, twice, "{by:?} {order:?}");
        }
    }
}

#[test]
fn name_order_reverses_exactly() {
    let leads = catalogue();
    let mut asc: Vec<&Lead> = leads.iter().collect();
    sort_leads(
        &mut asc,
        LeadSort {
            by: SortBy::Name,
            order: SortOrder::Asc,
        },
    );
    let mut desc: Vec<&Lead> = leads.iter().collect();
    sort_leads(
        &mut desc,
        LeadSort {
            by: SortBy::Name,
            order: SortOrder::Desc,
        },
    );
    asc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn pages_cover_every_filtered_row_once() {
    let leads = catalogue();
    let criteria = LeadCriteria {
        min_rating: Some(1.0),
        ..LeadCriteria::default()
    };
    let mut rows = filter_leads(&leads, &criteria);
    sort_leads(&mut rows, LeadSort::default());

    for size in 1..=rows.len() + 1 {
        let rebuilt: Vec<&Lead> = (1..=page_count(rows.len(), size))
            .flat_map(|p| paginate(&rows, size, p).iter().copied())
            .collect();
        assert_eq!(rebuilt, rows, "page size {size}");
    }
}

#[test]
fn dedup_partition_is_disjoint_and_exhaustive() {
    let existing = vec![lead("Saved", "(11) 99999-0001", None, None)];
    let candidates = catalogue();
    let outcome = dedupe_against(candidates.clone(), &existing);

    assert_eq!(outcome.total(), candidates.len());
    for l in &outcome.new_leads {
        assert!(!outcome.duplicate_leads.contains(l));
    }
    assert_eq!(outcome.duplicate_leads.len(), 1);
    assert_eq!(outcome.duplicate_leads[0].name, "Mercado Sol");
}
