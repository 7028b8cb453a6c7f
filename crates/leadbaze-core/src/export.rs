//! CSV export of lead rows.
//!
//! Every field is quoted so phone numbers and CEP-style codes keep their
//! leading zeros when the file is opened in a spreadsheet.

use std::io::Write;

use serde::Serialize;

use crate::error::CoreError;
use crate::lead::Lead;

const HEADER: [&str; 7] = [
    "name", "address", "phone", "rating", "reviews", "website", "category",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    address: &'a str,
    phone: &'a str,
    rating: Option<f64>,
    reviews: Option<u32>,
    website: &'a str,
    category: &'a str,
}

impl<'a> From<&'a Lead> for CsvRow<'a> {
    fn from(lead: &'a Lead) -> Self {
        Self {
            name: &lead.name,
            address: &lead.address,
            phone: lead.phone.as_deref().unwrap_or_default(),
            rating: lead.rating,
            reviews: lead.review_count,
            website: lead.website.as_deref().unwrap_or_default(),
            category: lead.category.as_deref().unwrap_or_default(),
        }
    }
}

/// Writes a header row followed by one row per lead.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] if serialization fails or
/// [`CoreError::Io`] if the writer cannot be flushed.
pub fn write_leads_csv<W: Write>(writer: W, leads: &[Lead]) -> Result<(), CoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for lead in leads {
        wtr.serialize(CsvRow::from(lead))?;
    }
    wtr.flush()?;
    Ok(())
}

/// # Errors
///
/// Same as [`write_leads_csv`].
pub fn leads_to_csv_string(leads: &[Lead]) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    write_leads_csv(&mut buf, leads)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_for_empty_input() {
        let out = leads_to_csv_string(&[]).unwrap();
        assert_eq!(
            out,
            "\"name\",\"address\",\"phone\",\"rating\",\"reviews\",\"website\",\"category\"\n"
        );
    }

    #[test]
    fn quotes_fields_and_escapes_embedded_quotes() {
        let lead = Lead {
            name: "Bar \"do Zé\"".to_string(),
            address: "Rua 1, Centro".to_string(),
            phone: Some("011 3214-5678".to_string()),
            rating: Some(4.5),
            review_count: Some(87),
            website: None,
            category: Some("Bar".to_string()),
            ..Lead::default()
        };
        let out = leads_to_csv_string(&[lead]).unwrap();
        let row = out.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"Bar \"\"do Zé\"\"\",\"Rua 1, Centro\",\"011 3214-5678\",\"4.5\",\"87\",\"\",\"Bar\""
        );
    }

    #[test]
    fn missing_numbers_are_empty() {
        let lead = Lead {
            name: "A".to_string(),
            ..Lead::default()
        };
        let out = leads_to_csv_string(&[lead]).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert_eq!(out.lines().nth(1).unwrap(), "\"A\",\"\",\"\",\"\",\"\",\"\",\"\"");
    }
}
