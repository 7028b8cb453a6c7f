//! Plain-text tables for terminal output.

use leadbaze_core::{Lead, LeadList, LeadPage, PhoneKind};

/// Cuts `value` to at most `width` characters, marking the cut with `…`.
pub(super) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

fn phone_label(lead: &Lead) -> &'static str {
    match lead.phone_kind() {
        PhoneKind::Mobile => "mobile",
        PhoneKind::Landline => "landline",
        PhoneKind::Unclassified => "",
    }
}

fn lead_row(index: usize, lead: &Lead) -> String {
    let rating = lead
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let reviews = lead
        .review_count
        .map_or_else(|| "-".to_string(), |r| r.to_string());
    format!(
        "{:<5}{:<32}{:<18}{:<10}{:<8}{:<9}{}",
        index,
        truncate(&lead.name, 30),
        truncate(lead.phone.as_deref().unwrap_or("-"), 16),
        phone_label(lead),
        rating,
        reviews,
        truncate(lead.website.as_deref().unwrap_or("-"), 40),
    )
}

pub(super) fn render_lead_page(page: &LeadPage<'_>) -> String {
    if page.total_items == 0 {
        return "no leads match the current filters".to_string();
    }
    let header = format!(
        "{:<5}{:<32}{:<18}{:<10}{:<8}{:<9}WEBSITE",
        "#", "NAME", "PHONE", "TYPE", "RATING", "REVIEWS"
    );
    let mut lines = vec![header.clone(), "-".repeat(header.len())];
    let first = page.first_index();
    for (offset, lead) in page.items.iter().enumerate() {
        lines.push(lead_row(first + offset, lead));
    }
    let mut footer = format!(
        "page {}/{} \u{b7} {} matching leads",
        page.page, page.total_pages, page.total_items
    );
    if page.has_next() {
        footer.push_str(&format!(" \u{b7} --page {} for more", page.page + 1));
    }
    lines.push(footer);
    lines.join("\n")
}

pub(super) fn render_lists(lists: &[LeadList]) -> String {
    let header = format!(
        "{:<38}{:<32}{:<10}{:<8}CREATED",
        "ID", "NAME", "STATUS", "LEADS"
    );
    let mut lines = vec![header.clone(), "-".repeat(header.len())];
    for list in lists {
        lines.push(format!(
            "{:<38}{:<32}{:<10}{:<8}{}",
            list.id,
            truncate(&list.name, 30),
            list.status,
            list.total_leads,
            list.created_at.format("%Y-%m-%d"),
        ));
    }
    lines.join("\n")
}
