/// A selection index that always stays inside `0..len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    index: usize,
}

impl ListCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set(&mut self, index: usize, len: usize) {
        self.index = index.min(len.saturating_sub(1));
    }

    pub fn next(&mut self, len: usize) {
        self.set(self.index + 1, len);
    }

    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.set(usize::MAX, len);
    }

    pub fn selected<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut cursor = ListCursor::new();
        cursor.prev();
        assert_eq!(cursor.index(), 0);
        cursor.next(3);
        cursor.next(3);
        cursor.next(3);
        assert_eq!(cursor.index(), 2);
        cursor.last(5);
        assert_eq!(cursor.index(), 4);
        cursor.set(4, 2);
        assert_eq!(cursor.index(), 1);
        cursor.first();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_empty_list() {
        let mut cursor = ListCursor::new();
        cursor.next(0);
        cursor.last(0);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.selected::<u8>(&[]), None);
        assert_eq!(cursor.selected(&['a', 'b']), Some(&'a'));
    }
}
