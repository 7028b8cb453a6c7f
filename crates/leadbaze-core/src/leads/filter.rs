use std::str::FromStr;

use crate::error::CoreError;
use crate::lead::Lead;
use crate::phone::PhoneKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WebsiteFilter {
    #[default]
    All,
    With,
    Without,
}

impl FromStr for WebsiteFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "with" | "yes" => Ok(Self::With),
            "without" | "no" => Ok(Self::Without),
            _ => Err(CoreError::InvalidFilter {
                field: "website",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhoneFilter {
    #[default]
    All,
    Mobile,
    Landline,
}

impl FromStr for PhoneFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "mobile" => Ok(Self::Mobile),
            "landline" => Ok(Self::Landline),
            _ => Err(CoreError::InvalidFilter {
                field: "phone",
                value: s.to_string(),
            }),
        }
    }
}

/// Active filter set. `LeadCriteria::default()` lets every lead through.
///
/// Criteria combine with AND. Unset criteria (empty strings, `None`,
/// `All`) are pass-throughs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadCriteria {
    /// Case-insensitive substring over name, address and phone.
    pub search_term: String,
    /// Case-insensitive substring of the address.
    pub city: String,
    pub min_rating: Option<f64>,
    pub min_reviews: Option<u32>,
    pub max_reviews: Option<u32>,
    pub website: WebsiteFilter,
    pub phone: PhoneFilter,
}

impl LeadCriteria {
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Missing ratings and review counts compare as 0.
    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        self.matches_search(lead)
            && self.matches_city(lead)
            && self.matches_rating(lead)
            && self.matches_reviews(lead)
            && self.matches_website(lead)
            && self.matches_phone(lead)
    }

    fn matches_search(&self, lead: &Lead) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        lead.name.to_lowercase().contains(&needle)
            || lead.address.to_lowercase().contains(&needle)
            || lead
                .phone
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle))
    }

    fn matches_city(&self, lead: &Lead) -> bool {
        let city = self.city.trim().to_lowercase();
        city.is_empty() || lead.address.to_lowercase().contains(&city)
    }

    fn matches_rating(&self, lead: &Lead) -> bool {
        self.min_rating
            .is_none_or(|min| lead.rating.unwrap_or(0.0) >= min)
    }

    fn matches_reviews(&self, lead: &Lead) -> bool {
        let reviews = lead.review_count.unwrap_or(0);
        self.min_reviews.is_none_or(|min| reviews >= min)
            && self.max_reviews.is_none_or(|max| reviews <= max)
    }

    fn matches_website(&self, lead: &Lead) -> bool {
        match self.website {
            WebsiteFilter::All => true,
            WebsiteFilter::With => lead.has_website(),
            WebsiteFilter::Without => !lead.has_website(),
        }
    }

    fn matches_phone(&self, lead: &Lead) -> bool {
        match self.phone {
            PhoneFilter::All => true,
            PhoneFilter::Mobile => lead.phone_kind() == PhoneKind::Mobile,
            PhoneFilter::Landline => lead.phone_kind() == PhoneKind::Landline,
        }
    }
}

/// Returns the leads matching `criteria`, in input order.
#[must_use]
pub fn filter_leads<'a>(leads: &'a [Lead], criteria: &LeadCriteria) -> Vec<&'a Lead> {
    leads.iter().filter(|l| criteria.matches(l)).collect()
}

/// Parses a select-box style threshold where `"all"` or an empty string
/// means "no threshold".
///
/// # Errors
///
/// Returns [`CoreError::InvalidFilter`] when the value is neither `"all"`
/// nor parseable as `T`.
pub fn parse_threshold<T: FromStr>(field: &'static str, raw: &str) -> Result<Option<T>, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| CoreError::InvalidFilter {
            field,
            value: raw.to_string(),
        })
}
