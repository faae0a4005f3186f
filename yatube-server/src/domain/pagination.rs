use serde::Serialize;

/// Splits an ordered result set into fixed-size pages.
///
/// Out-of-range page numbers never fail: anything below 1 resolves to the
/// first page, anything past the end resolves to the last one. An empty
/// result set still has exactly one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: u32,
}

/// Where a requested page lands once clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    /// `page_size` of zero is bumped to one.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size)).max(1)
    }

    pub fn window(&self, total: u64, requested: i64) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = u64::try_from(requested.max(1))
            .unwrap_or(1)
            .min(num_pages);
        PageWindow {
            number,
            num_pages,
            offset: (number - 1) * u64::from(self.page_size),
            limit: u64::from(self.page_size),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total: u64) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_split_ten_and_three() {
        let paginator = Paginator::new(10);

        let first = paginator.window(13, 1);
        assert_eq!((first.number, first.offset, first.limit), (1, 0, 10));
        assert_eq!(first.num_pages, 2);

        let second = paginator.window(13, 2);
        assert_eq!((second.number, second.offset), (2, 10));
    }

    #[test]
    fn past_the_end_clamps_to_last_page() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(13, 3), paginator.window(13, 2));
        assert_eq!(paginator.window(13, i64::MAX).number, 2);
    }

    #[test]
    fn zero_and_negative_clamp_to_first_page() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(13, 0).number, 1);
        assert_eq!(paginator.window(13, -5).number, 1);
        assert_eq!(paginator.window(13, i64::MIN).offset, 0);
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let paginator = Paginator::new(10);
        let window = paginator.window(0, 1);
        assert_eq!((window.number, window.num_pages, window.offset), (1, 1, 0));
        assert_eq!(paginator.window(0, 7).number, 1);
    }

    #[test]
    fn exact_multiple_keeps_last_page_full() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(20), 2);
        let last = paginator.window(20, 3);
        assert_eq!((last.number, last.offset), (2, 10));
    }

    #[test]
    fn page_flags_follow_position() {
        let paginator = Paginator::new(10);
        let page = Page::new(vec![1; 10], paginator.window(25, 2), 25);
        assert!(page.has_next);
        assert!(page.has_previous);

        let only = Page::<u8>::new(vec![], paginator.window(0, 1), 0);
        assert!(!only.has_next);
        assert!(!only.has_previous);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        assert_eq!(Paginator::new(0).page_size(), 1);
    }
}
