use crate::lead::{Lead, LeadKey};

use super::filter::LeadCriteria;
use super::page::{page_count, paginate, LeadPage};
use super::sort::LeadSort;

/// Selector state for an interactive lead table.
///
/// Holds the full lead set plus the active criteria, sort and page, and
/// derives the visible rows on demand. Two rules are enforced on every
/// mutation:
///
/// - changing the criteria (or the lead set, or the page size) resets the
///   current page to 1;
/// - a lead excluded by the active criteria is never selected.
#[derive(Debug, Clone)]
pub struct LeadTable {
    leads: Vec<Lead>,
    criteria: LeadCriteria,
    sort: LeadSort,
    page: usize,
    page_size: usize,
}

impl LeadTable {
    /// A zero `page_size` is raised to 1.
    #[must_use]
    pub fn new(leads: Vec<Lead>, page_size: usize) -> Self {
        let mut table = Self {
            leads,
            criteria: LeadCriteria::default(),
            sort: LeadSort::default(),
            page: 1,
            page_size: page_size.max(1),
        };
        table.prune_selection();
        table
    }

    #[must_use]
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    #[must_use]
    pub fn into_leads(self) -> Vec<Lead> {
        self.leads
    }

    #[must_use]
    pub fn criteria(&self) -> &LeadCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn sort(&self) -> LeadSort {
        self.sort
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_criteria(&mut self, criteria: LeadCriteria) {
        self.criteria = criteria;
        self.page = 1;
        self.prune_selection();
    }

    /// Edits the criteria in place, with the same reset rules as
    /// [`LeadTable::set_criteria`].
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut LeadCriteria)) {
        let mut criteria = self.criteria.clone();
        edit(&mut criteria);
        self.set_criteria(criteria);
    }

    pub fn set_sort(&mut self, sort: LeadSort) {
        self.sort = sort;
    }

    /// Clamps `page` into `1..=total_pages`.
    pub fn set_page(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        self.page = page.clamp(1, last);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Swaps the lead set, e.g. after a fresh generation run.
    pub fn replace_leads(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
        self.page = 1;
        self.prune_selection();
    }

    /// Flips selection for the lead with `key` and returns its new state.
    ///
    /// Leads hidden by the criteria cannot be selected; the call returns
    /// `false` without changing anything. Only the first lead with `key` is
    /// reached, so id-less leads sharing a name and phone need
    /// [`LeadTable::toggle_row`].
    pub fn toggle_selected(&mut self, key: &LeadKey) -> bool {
        let criteria = &self.criteria;
        match self.leads.iter_mut().find(|l| &l.key() == key) {
            Some(lead) if criteria.matches(lead) => {
                lead.selected = !lead.selected;
                lead.selected
            }
            _ => false,
        }
    }

    /// Flips selection for the lead at `row` of the filtered, sorted rows
    /// (0-based, across pages) and returns its new state, or `None` when
    /// `row` is past the last filtered lead.
    pub fn toggle_row(&mut self, row: usize) -> Option<bool> {
        let index = *self.filtered_indices().get(row)?;
        let lead = &mut self.leads[index];
        lead.selected = !lead.selected;
        Some(lead.selected)
    }

    /// Selects every lead matching the criteria, on all pages.
    pub fn select_all_filtered(&mut self) {
        let criteria = &self.criteria;
        for lead in &mut self.leads {
            lead.selected = criteria.matches(lead);
        }
    }

    pub fn clear_selection(&mut self) {
        for lead in &mut self.leads {
            lead.selected = false;
        }
    }

    #[must_use]
    pub fn selected_leads(&self) -> Vec<&Lead> {
        self.leads.iter().filter(|l| l.selected).collect()
    }

    /// All leads matching the criteria, in sort order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Lead> {
        self.filtered_indices()
            .into_iter()
            .map(|i| &self.leads[i])
            .collect()
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        page_count(
            self.leads.iter().filter(|l| self.criteria.matches(l)).count(),
            self.page_size,
        )
    }

    /// The current page of the filtered, sorted leads.
    #[must_use]
    pub fn view(&self) -> LeadPage<'_> {
        let rows = self.filtered();
        let total_items = rows.len();
        LeadPage {
            items: paginate(&rows, self.page_size, self.page).to_vec(),
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages: page_count(total_items, self.page_size),
        }
    }

    /// Positions in `leads` of the rows matching the criteria, in sort order.
    fn filtered_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.leads.len())
            .filter(|&i| self.criteria.matches(&self.leads[i]))
            .collect();
        indices.sort_by(|&a, &b| self.sort.compare(&self.leads[a], &self.leads[b]));
        indices
    }

    fn prune_selection(&mut self) {
        let criteria = &self.criteria;
        for lead in &mut self.leads {
            if lead.selected && !criteria.matches(lead) {
                lead.selected = false;
            }
        }
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
