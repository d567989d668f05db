//! Greedy first-fit packing of variable-height items into fixed-height
//! pages. Items are never split and never reordered.

/// A run of consecutive items placed on one page.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// Index of the first item in the input slice.
    pub start: usize,
    pub items: &'a [T],
    pub used_height: f32,
}

/// Running fill state of the current page. The block paginator drives it
/// with one call per block, the text renderer with one call per line.
#[derive(Clone, Copy, Debug)]
pub struct PageFill {
    max_height: f32,
    used: f32,
    count: usize,
}

impl PageFill {
    pub fn new(max_height: f32) -> Self {
        PageFill {
            max_height,
            used: 0.0,
            count: 0,
        }
    }

    /// Places an item of `height`. Returns `true` when the item does not fit
    /// on a non-empty page and therefore opens a new one. An item taller than
    /// a whole page is still admitted, alone.
    pub fn admit(&mut self, height: f32) -> bool {
        if self.count > 0 && self.used + height > self.max_height {
            self.used = height;
            self.count = 1;
            true
        } else {
            self.used += height;
            self.count += 1;
            false
        }
    }

    /// Height used on the current page, including the last admitted item.
    pub fn used(&self) -> f32 {
        self.used
    }

    pub fn remaining(&self) -> f32 {
        self.max_height - self.used
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Forces the next admitted item onto a fresh page.
    pub fn break_page(&mut self) {
        self.used = 0.0;
        self.count = 0;
    }
}

/// Packs `items` (with their measured `heights`) into pages of at most
/// `max_height`. Zero items produce zero pages.
pub fn paginate<'a, T>(items: &'a [T], heights: &[f32], max_height: f32) -> Vec<Page<'a, T>> {
    debug_assert_eq!(items.len(), heights.len());
    let count = items.len().min(heights.len());

    let mut pages = Vec::new();
    let mut fill = PageFill::new(max_height);
    let mut start = 0;
    let mut page_height = 0.0;

    for (i, &h) in heights[..count].iter().enumerate() {
        if fill.admit(h) {
            pages.push(Page {
                start,
                items: &items[start..i],
                used_height: page_height,
            });
            start = i;
        }
        page_height = fill.used();
    }
    if start < count {
        pages.push(Page {
            start,
            items: &items[start..count],
            used_height: page_height,
        });
    }
    pages
}

/// Height available for content between the top and bottom margins.
pub fn content_height(page_height: f32, margin: f32) -> f32 {
    page_height - 2.0 * margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_reports_break_only_on_non_empty_page() {
        let mut fill = PageFill::new(10.0);
        assert!(!fill.admit(25.0));
        assert!(fill.admit(1.0));
        assert_eq!(fill.used(), 1.0);
        assert!(!fill.admit(9.0));
        assert_eq!(fill.remaining(), 0.0);
    }

    #[test]
    fn used_height_is_sum_of_page_items() {
        let items = ["a", "b", "c"];
        let pages = paginate(&items, &[30.0, 30.0, 30.0], 65.0);
        assert_eq!(pages[0].used_height, 60.0);
        assert_eq!(pages[1].used_height, 30.0);
        assert_eq!(pages[1].start, 2);
    }
}
