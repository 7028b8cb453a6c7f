use std::borrow::Borrow;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::CoreError;
use crate::lead::Lead;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Ranks by review count, same key as [`SortBy::Reviews`].
    #[default]
    Relevance,
    Rating,
    Reviews,
    Name,
}

impl FromStr for SortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "rating" => Ok(Self::Rating),
            "reviews" => Ok(Self::Reviews),
            "name" => Ok(Self::Name),
            _ => Err(CoreError::InvalidFilter {
                field: "sort_by",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(CoreError::InvalidFilter {
                field: "sort_order",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadSort {
    pub by: SortBy,
    pub order: SortOrder,
}

impl LeadSort {
    /// Compares two leads on `by`, flipped for [`SortOrder::Desc`].
    #[must_use]
    pub fn compare(self, a: &Lead, b: &Lead) -> Ordering {
        let ord = compare_leads(a, b, self.by);
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Ascending comparison of two leads on the `by` key.
///
/// Missing ratings and review counts compare as 0.
#[must_use]
pub fn compare_leads(a: &Lead, b: &Lead, by: SortBy) -> Ordering {
    match by {
        SortBy::Relevance | SortBy::Reviews => a
            .review_count
            .unwrap_or(0)
            .cmp(&b.review_count.unwrap_or(0)),
        SortBy::Rating => a.rating.unwrap_or(0.0).total_cmp(&b.rating.unwrap_or(0.0)),
        SortBy::Name => collate(&a.name, &b.name),
    }
}

/// Stable sort in place. Ties keep their input order in both directions.
pub fn sort_leads<L: Borrow<Lead>>(leads: &mut [L], sort: LeadSort) {
    leads.sort_by(|a, b| sort.compare(a.borrow(), b.borrow()));
}

/// Name comparison that ignores case and Latin diacritics first, so
/// `"Álvaro"` sorts next to `"alvaro"` rather than after `"Zé"`. Falls back
/// to a plain comparison to keep the order total.
fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, rating: Option<f64>, reviews: Option<u32>) -> Lead {
        Lead {
            name: name.to_string(),
            rating,
            review_count: reviews,
            ..Lead::default()
        }
    }

    fn names(leads: &[Lead]) -> Vec<&str> {
        leads.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn relevance_and_reviews_share_the_review_count_key() {
        let a = lead("A", Some(5.0), Some(10));
        let b = lead("B", Some(1.0), Some(200));
        assert_eq!(compare_leads(&a, &b, SortBy::Relevance), Ordering::Less);
        assert_eq!(
            compare_leads(&a, &b, SortBy::Relevance),
            compare_leads(&a, &b, SortBy::Reviews)
        );
    }

    #[test]
    fn missing_numbers_sort_as_zero() {
        let mut leads = vec![
            lead("rated", Some(2.0), None),
            lead("unrated", None, None),
        ];
        sort_leads(
            &mut leads,
            LeadSort {
                by: SortBy::Rating,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(names(&leads), ["unrated", "rated"]);
    }

    #[test]
    fn name_sort_ignores_case_and_accents() {
        let mut leads = vec![
            lead("Zé Bar", None, None),
            lead("Álvaro Pães", None, None),
            lead("bistrô", None, None),
        ];
        sort_leads(
            &mut leads,
            LeadSort {
                by: SortBy::Name,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(names(&leads), ["Álvaro Pães", "bistrô", "Zé Bar"]);
    }

    #[test]
    fn descending_reverses_untied_sequence() {
        let base = vec![
            lead("A", Some(3.0), None),
            lead("B", Some(4.5), None),
            lead("C", Some(1.0), None),
        ];
        let mut asc = base.clone();
        sort_leads(
            &mut asc,
            LeadSort {
                by: SortBy::Rating,
                order: SortOrder::Asc,
            },
        );
        let mut desc = base;
        sort_leads(
            &mut desc,
            LeadSort {
                by: SortBy::Rating,
                order: SortOrder::Desc,
            },
        );
        let mut reversed = names(&asc);
        reversed.reverse();
        assert_eq!(names(&desc), reversed);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut leads = vec![
            lead("first", None, Some(5)),
            lead("second", None, Some(5)),
        ];
        sort_leads(&mut leads, LeadSort::default());
        assert_eq!(names(&leads), ["first", "second"]);
    }

    #[test]
    fn sort_parsing() {
        assert_eq!("Rating".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("price".parse::<SortBy>().is_err());
        assert_eq!(SortOrder::Asc.reversed(), SortOrder::Desc);
    }
}
