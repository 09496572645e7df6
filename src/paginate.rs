use crate::models::PageRequest;

/// One window over an ordered collection. `page_number` is the clamped value
/// actually served, which may differ from what was asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// 1-based positions of the first and last item on this page, or `None`
    /// for an empty collection.
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page_number - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }

    /// "Showing 1 to 10 of 23 students"
    pub fn range_label(&self, noun: &str) -> String {
        match self.item_range() {
            Some((first, last)) => format!(
                "Showing {first} to {last} of {} {noun}",
                self.total_items
            ),
            None => format!("No {noun} to show"),
        }
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Slices `items` to the requested page, clamping the page number into
/// `1..=total_pages`. Never fails and never returns an out-of-range page.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page_number = page_number.clamp(1, total_pages);

    let start = ((page_number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        page_number,
        page_size,
        total_pages,
        total_items: items.len(),
    }
}

pub fn paginate_request<T>(items: &[T], request: PageRequest) -> Page<'_, T> {
    paginate(items, request.page_size, request.page_number)
}
