//! Filter, sort and paging flags shared by every command that shows leads.

use clap::Args;
use leadbaze_core::leads::parse_threshold;
use leadbaze_core::{
    CoreError, Lead, LeadCriteria, LeadSort, LeadTable, PhoneFilter, SortBy, SortOrder,
    WebsiteFilter,
};

#[derive(Debug, Clone, PartialEq, Args)]
pub(crate) struct FilterArgs {
    /// Text matched against name, address and phone
    #[arg(long)]
    pub search: Option<String>,
    /// City or neighbourhood matched against the address
    #[arg(long)]
    pub city: Option<String>,
    /// Minimum rating (e.g. 4.5), or "all"
    #[arg(long, default_value = "all")]
    pub min_rating: String,
    /// Minimum number of reviews, or "all"
    #[arg(long, default_value = "all")]
    pub min_reviews: String,
    /// Maximum number of reviews, or "all"
    #[arg(long, default_value = "all")]
    pub max_reviews: String,
    /// Website presence: all, with, without
    #[arg(long, default_value = "all")]
    pub website: WebsiteFilter,
    /// Phone type: all, mobile, landline
    #[arg(long, default_value = "all")]
    pub phone: PhoneFilter,
    /// Sort key: relevance, rating, reviews, name
    #[arg(long, default_value = "relevance")]
    pub sort_by: SortBy,
    /// Sort direction: asc, desc
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
    /// Page to display (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (defaults to LEADBAZE_PAGE_SIZE)
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl FilterArgs {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFilter`] when a threshold is neither
    /// `"all"` nor a number.
    pub(crate) fn criteria(&self) -> Result<LeadCriteria, CoreError> {
        Ok(LeadCriteria {
            search_term: self.search.clone().unwrap_or_default(),
            city: self.city.clone().unwrap_or_default(),
            min_rating: parse_threshold("min_rating", &self.min_rating)?,
            min_reviews: parse_threshold("min_reviews", &self.min_reviews)?,
            max_reviews: parse_threshold("max_reviews", &self.max_reviews)?,
            website: self.website,
            phone: self.phone,
        })
    }

    pub(crate) fn sort(&self) -> LeadSort {
        LeadSort {
            by: self.sort_by,
            order: self.order,
        }
    }

    /// Builds a table over `leads` with these flags applied, landing on the
    /// requested page (clamped to the last page).
    ///
    /// # Errors
    ///
    /// As [`FilterArgs::criteria`].
    pub(crate) fn into_table(&self, leads: Vec<Lead>, default_page_size: usize) -> Result<LeadTable, CoreError> {
        let mut table = LeadTable::new(leads, self.page_size.unwrap_or(default_page_size));
        table.set_criteria(self.criteria()?);
        table.set_sort(self.sort());
        table.set_page(self.page);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        filters: FilterArgs,
    }

    fn parse(args: &[&str]) -> FilterArgs {
        let mut argv = vec!["harness"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).expect("valid args").filters
    }

    fn lead(name: &str, rating: f64, reviews: u32) -> Lead {
        Lead {
            name: name.to_owned(),
            rating: Some(rating),
            review_count: Some(reviews),
            ..Lead::default()
        }
    }

    #[test]
    fn defaults_are_neutral() {
        let args = parse(&[]);
        assert!(args.criteria().expect("criteria").is_neutral());
        assert_eq!(args.sort(), LeadSort::default());
        assert_eq!(args.page, 1);
    }

    #[test]
    fn thresholds_and_enums_parse() {
        let args = parse(&[
            "--min-rating",
            "4.5",
            "--max-reviews",
            "100",
            "--website",
            "without",
            "--phone",
            "mobile",
            "--sort-by",
            "name",
            "--order",
            "asc",
        ]);
        let criteria = args.criteria().expect("criteria");
        assert_eq!(criteria.min_rating, Some(4.5));
        assert_eq!(criteria.min_reviews, None);
        assert_eq!(criteria.max_reviews, Some(100));
        assert_eq!(criteria.website, WebsiteFilter::Without);
        assert_eq!(criteria.phone, PhoneFilter::Mobile);
        assert_eq!(args.sort().by, SortBy::Name);
        assert_eq!(args.sort().order, SortOrder::Asc);
    }

    #[test]
    fn unknown_enum_value_is_a_parse_error() {
        assert!(Harness::try_parse_from(["harness", "--phone", "fax"]).is_err());
    }

    #[test]
    fn bad_threshold_is_reported() {
        let args = parse(&["--min-reviews", "lots"]);
        assert!(matches!(
            args.criteria(),
            Err(CoreError::InvalidFilter {
                field: "min_reviews",
                ..
            })
        ));
    }

    #[test]
    fn into_table_clamps_page() {
        let leads = vec![lead("A", 4.0, 1), lead("B", 5.0, 2), lead("C", 3.0, 3)];
        let table = parse(&["--page", "9", "--page-size", "2"])
            .into_table(leads, 10)
            .expect("table");
        assert_eq!(table.page(), 2);
        let view = table.view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "A");
    }
}
