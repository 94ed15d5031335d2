use crate::models::Post;

/// Page window over a filtered result set / 分页窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Effective page, clamped to the last page / 实际页码
    pub page_number: usize,
    pub page_size: usize,
    /// Zero-based offset of the first item / 起始偏移
    pub offset: usize,
    /// 0 when nothing matches / 无结果时为0
    pub last_page: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// Compute the window for `total` matches / 计算分页窗口
    ///
    /// Page number and size below 1 are raised to 1. Requests past the end
    /// are served the last page.
    pub fn compute(total: usize, page_number: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let mut page_number = page_number.max(1);

        let last_page = if total == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        if last_page > 0 && page_number > last_page {
            page_number = last_page;
        }

        Self {
            page_number,
            page_size,
            offset: (page_number - 1).saturating_mul(page_size),
            last_page,
            has_prev: page_number > 1 && last_page > 0,
            has_next: page_number < last_page,
        }
    }

    /// Whether the window selects nothing / 窗口是否为空
    pub fn is_empty(&self, total: usize) -> bool {
        total == 0 || self.offset >= total
    }

    /// Number of items the window selects / 当前页条目数
    pub fn len(&self, total: usize) -> usize {
        if self.is_empty(total) {
            0
        } else {
            (total - self.offset).min(self.page_size)
        }
    }
}

/// Total matches with the posts of one window / 匹配总数与当前页文章
#[derive(Debug, Clone)]
pub struct PostPage {
    pub total: usize,
    pub window: PageWindow,
    pub posts: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_is_ceiling() {
        for total in 0..60usize {
            for size in 1..12usize {
                let w = PageWindow::compute(total, 1, size);
                assert_eq!(w.last_page, (total + size - 1) / size);
                assert_eq!(w.last_page == 0, total == 0);
            }
        }
    }

    #[test]
    fn test_past_end_serves_last_page() {
        let w = PageWindow::compute(25, 9, 10);
        assert_eq!(w.page_number, 3);
        assert_eq!(w.offset, 20);
        assert_eq!(w.len(25), 5);
        assert!(w.has_prev);
        assert!(!w.has_next);
    }

    #[test]
    fn test_empty_total() {
        let w = PageWindow::compute(0, 4, 10);
        assert_eq!(w.last_page, 0);
        assert!(!w.has_prev);
        assert!(!w.has_next);
        assert!(w.is_empty(0));
        assert_eq!(w.len(0), 0);
    }

    #[test]
    fn test_first_and_middle_pages() {
        let first = PageWindow::compute(2, 1, 1);
        assert_eq!(first.last_page, 2);
        assert!(!first.has_prev);
        assert!(first.has_next);
        assert_eq!(first.len(2), 1);

        let middle = PageWindow::compute(30, 2, 10);
        assert_eq!(middle.offset, 10);
        assert!(middle.has_prev);
        assert!(middle.has_next);
    }

    #[test]
    fn test_zero_inputs_are_raised() {
        let w = PageWindow::compute(5, 0, 0);
        assert_eq!(w.page_number, 1);
        assert_eq!(w.page_size, 1);
        assert_eq!(w.last_page, 5);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_huge_page_on_empty_set_does_not_overflow() {
        let w = PageWindow::compute(0, usize::MAX, usize::MAX);
        assert!(w.is_empty(0));
    }
}
