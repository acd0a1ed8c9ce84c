use serde::Serialize;

/// One page of a listing. Pages are numbered from 1.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Row offset of `page` (1-based; 0 is treated as 1).
pub fn offset(page: u32, per_page: u32) -> u32 {
    page.max(1).saturating_sub(1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, per_page: u32, total: u64) -> Page<()> {
        Page { items: Vec::new(), page, per_page, total }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(page(1, 20, 41).total_pages(), 3);
        assert_eq!(page(1, 20, 40).total_pages(), 2);
        assert_eq!(page(1, 20, 0).total_pages(), 0);
    }

    #[test]
    fn has_next_stops_at_last_page() {
        assert!(page(1, 20, 21).has_next());
        assert!(!page(2, 20, 21).has_next());
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(offset(1, 20), 0);
        assert_eq!(offset(3, 20), 40);
        assert_eq!(offset(0, 20), 0);
    }
}
