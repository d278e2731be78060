//! Sorting helper used by the query pipeline.

use crate::query::Comparator;

/// Sorts a snapshot of records with an optional [`Comparator`].
///
/// Exposes the classic length / swap / less triple over the slice so index-based
/// algorithms can be run against it, and a stable [`Sorter::sort`].
pub struct Sorter<'a, T> {
    items: &'a mut [T],
    comparator: Option<&'a Comparator<T>>,
}

impl<'a, T> Sorter<'a, T> {
    pub fn new(items: &'a mut [T], comparator: Option<&'a Comparator<T>>) -> Self {
        Self { items, comparator }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.items.swap(i, j);
    }

    /// Returns `true` if the item at `i` sorts strictly before the item at `j`.
    ///
    /// # Panics
    ///
    /// Panics if the sorter was created without a comparator.
    pub fn less(&self, i: usize, j: usize) -> bool {
        match self.comparator {
            Some(comparator) => comparator.less(&self.items[i], &self.items[j]),
            None => panic!("Sorter::less called but the compare function is missing"),
        }
    }

    /// Stably sorts the items. Does nothing without a comparator.
    pub fn sort(&mut self) {
        if let Some(comparator) = self.comparator {
            self.items.sort_by(|a, b| comparator.compare(a, b));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable() {
        let by_len = Comparator::new(|a: &(usize, &str), b: &(usize, &str)| a.1.len() < b.1.len());
        let mut items = vec![(0, "Key 11"), (1, "Key 2"), (2, "Key 33"), (3, "Key 4")];

        Sorter::new(&mut items, Some(&by_len)).sort();

        assert_eq!(
            items.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![1, 3, 0, 2]
        );
    }

    #[test]
    fn len_swap_and_less() {
        let ascending = Comparator::new(|a: &i32, b: &i32| a < b);
        let mut items = vec![3, 1];
        let mut sorter = Sorter::new(&mut items, Some(&ascending));

        assert_eq!(sorter.len(), 2);
        assert!(sorter.less(1, 0));

        sorter.swap(0, 1);
        assert!(sorter.less(0, 1));
        assert_eq!(items, vec![1, 3]);
    }

    #[test]
    fn sort_without_comparator_keeps_order() {
        let mut items = vec![3, 1, 2];

        Sorter::new(&mut items, None).sort();

        assert_eq!(items, vec![3, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "compare function is missing")]
    fn less_without_comparator_panics() {
        let mut items = vec![1, 2];

        Sorter::new(&mut items, None).less(0, 1);
    }
}
