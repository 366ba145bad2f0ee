//! Ordered annotation storage.

use tale_ir::Span;

/// A value attached to the byte range `[from, to)` of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation<T> {
    pub from: u32,
    pub to: u32,
    pub value: T,
}

impl<T> Annotation<T> {
    pub fn new(span: Span, value: T) -> Self {
        Annotation {
            from: span.start,
            to: span.end,
            value,
        }
    }

    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }
}

/// Annotations sorted by `from`, stable for equal starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeSet<T> {
    items: Vec<Annotation<T>>,
}

impl<T> Default for RangeSet<T> {
    fn default() -> Self {
        RangeSet { items: Vec::new() }
    }
}

impl<T> RangeSet<T> {
    /// Build from annotations in any order.
    pub fn from_unsorted(mut items: Vec<Annotation<T>>) -> Self {
        items.sort_by_key(|a| a.from);
        RangeSet { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation<T>> {
        self.items.iter()
    }

    /// Annotations starting inside `span`.
    pub fn starting_in(&self, span: Span) -> &[Annotation<T>] {
        let lo = self.items.partition_point(|a| a.from < span.start);
        let hi = self.items.partition_point(|a| a.from < span.end);
        &self.items[lo..hi.max(lo)]
    }

    /// Annotations whose range covers `offset`; zero-length ones match
    /// their own position.
    pub fn at(&self, offset: u32) -> impl Iterator<Item = &Annotation<T>> {
        let hi = self.items.partition_point(|a| a.from <= offset);
        self.items[..hi]
            .iter()
            .filter(move |a| offset < a.to || (a.from == a.to && a.from == offset))
    }

    /// Replace every annotation starting inside `span` with `added`, which
    /// must itself start inside `span`. Returns the removed annotations.
    pub fn splice(&mut self, span: Span, added: Vec<Annotation<T>>) -> Vec<Annotation<T>> {
        let lo = self.items.partition_point(|a| a.from < span.start);
        let hi = self.items.partition_point(|a| a.from < span.end).max(lo);
        let mut added = added;
        added.sort_by_key(|a| a.from);
        self.items.splice(lo..hi, added).collect()
    }
}

impl<'a, T> IntoIterator for &'a RangeSet<T> {
    type Item = &'a Annotation<T>;
    type IntoIter = std::slice::Iter<'a, Annotation<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(spans: &[(u32, u32)]) -> RangeSet<u32> {
        RangeSet::from_unsorted(
            spans
                .iter()
                .map(|&(from, to)| Annotation::new(Span::new(from, to), from))
                .collect(),
        )
    }

    fn starts(set: &RangeSet<u32>) -> Vec<u32> {
        set.iter().map(|a| a.from).collect()
    }

    #[test]
    fn test_from_unsorted_orders_by_start() {
        assert_eq!(starts(&set(&[(5, 6), (0, 2), (3, 4)])), vec![0, 3, 5]);
    }

    #[test]
    fn test_splice_replaces_only_the_slice() {
        let mut annotations = set(&[(0, 2), (3, 4), (5, 6), (8, 9)]);
        let removed = annotations.splice(
            Span::new(3, 6),
            vec![Annotation::new(Span::new(4, 5), 40)],
        );
        assert_eq!(removed.iter().map(|a| a.from).collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(starts(&annotations), vec![0, 4, 8]);
    }

    #[test]
    fn test_lookup() {
        let annotations = set(&[(0, 4), (2, 3), (6, 6)]);
        assert_eq!(annotations.at(2).count(), 2);
        assert_eq!(annotations.at(6).count(), 1);
        assert_eq!(annotations.starting_in(Span::new(1, 7)).len(), 2);
    }
}
