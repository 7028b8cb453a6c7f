use crate::lead::Lead;

/// Number of pages needed for `total` items. Zero items means zero pages.
#[must_use]
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Returns the 1-indexed `page` of `items`: `[(page-1)*size, page*size)`.
///
/// Page 0, a zero page size, or a page past the end yield an empty slice.
#[must_use]
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page_size == 0 || page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// One rendered page of a filtered and sorted lead collection.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadPage<'a> {
    pub items: Vec<&'a Lead>,
    pub page: usize,
    pub page_size: usize,
    /// Leads matching the criteria, across all pages.
    pub total_items: usize,
    pub total_pages: usize,
}

impl LeadPage<'_> {
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-indexed position of the first item on this page, 0 when empty.
    #[must_use]
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn paginate_returns_half_open_window() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 3, 1), &[1, 2, 3]);
        assert_eq!(paginate(&items, 3, 2), &[4, 5, 6]);
        assert_eq!(paginate(&items, 3, 3), &[7]);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<u32> = (1..=7).collect();
        assert!(paginate(&items, 3, 0).is_empty());
        assert!(paginate(&items, 3, 4).is_empty());
        assert!(paginate(&items, 0, 1).is_empty());
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn pages_concatenate_back_to_input() {
        let items: Vec<u32> = (1..=23).collect();
        let size = 5;
        let rebuilt: Vec<u32> = (1..=page_count(items.len(), size))
            .flat_map(|p| paginate(&items, size, p).iter().copied())
            .collect();
        assert_eq!(rebuilt, items);
    }
}
