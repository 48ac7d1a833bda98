use std::fmt;

/// A borrowed run of consecutive items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    items: &'a [T],
}

impl<'a, T> Page<'a, T> {
    pub fn items(&self) -> &'a [T] { self.items }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl<T: fmt::Display> fmt::Display for Page<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Paginator<'a, T> {
    pages: Vec<Page<'a, T>>,
}

impl<'a, T> Paginator<'a, T> {
    /// Slice `items` into pages of `page_size`; the last page may be shorter.
    /// A zero page size is treated as one.
    pub fn new(items: &'a [T], page_size: usize) -> Self {
        let pages = items.chunks(page_size.max(1)).map(|items| Page { items }).collect();
        Self { pages }
    }

    pub fn len(&self) -> usize { self.pages.len() }

    pub fn is_empty(&self) -> bool { self.pages.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, Page<'a, T>> { self.pages.iter() }
}

impl<'a, T> IntoIterator for Paginator<'a, T> {
    type Item = Page<'a, T>;
    type IntoIter = std::vec::IntoIter<Page<'a, T>>;

    fn into_iter(self) -> Self::IntoIter { self.pages.into_iter() }
}

pub fn paginate<T>(items: &[T], page_size: usize) -> Paginator<'_, T> { Paginator::new(items, page_size) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_is_short() {
        let items = [1, 2, 3, 4, 5];
        let pages: Vec<Vec<i32>> = paginate(&items, 2).into_iter().map(|p| p.items().to_vec()).collect();
        assert_eq!(pages, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn empty_input_has_no_pages() {
        let items: [i32; 0] = [];
        assert!(paginate(&items, 3).is_empty());
    }

    #[test]
    fn page_displays_items_back_to_back() {
        let items = ["a", "b", "c"];
        let pager = paginate(&items, 5);
        assert_eq!(pager.len(), 1);
        assert_eq!(pager.iter().next().unwrap().to_string(), "abc");
        assert_eq!(paginate(&items, 0).len(), 3);
    }
}
