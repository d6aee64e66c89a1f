//! A vector indexed by a strongly typed index.

use std::{
    fmt,
    hash::{Hash, Hasher},
    iter::{Enumerate, Map},
    marker::PhantomData,
};

pub use derive::Index;

pub struct IndexMap<I, T> {
    values: Vec<T>,
    _marker: PhantomData<fn(&I)>,
}

impl<I, T> IndexMap<I, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::bare(Vec::with_capacity(capacity))
    }

    pub fn bare(values: Vec<T>) -> Self {
        Self {
            values,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.values.last_mut()
    }

    pub fn pop(&mut self) -> Option<T> {
        self.values.pop()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<I: Index, T> IndexMap<I, T> {
    #[must_use]
    pub fn next_index(&self) -> I {
        I::new(self.values.len())
    }

    #[must_use]
    pub fn last_index(&self) -> Option<I> {
        Some(I::new(self.values.len().checked_sub(1)?))
    }

    pub fn insert(&mut self, value: T) -> I {
        let index = self.next_index();
        self.values.push(value);
        index
    }

    /// Retain the values matching the predicate and return the mapping from old to new indices.
    ///
    /// The relative order of the retained values is preserved.
    pub fn retain(&mut self, mut predicate: impl FnMut(I, &T) -> bool) -> Vec<Option<I>> {
        let mut mapping = Vec::with_capacity(self.values.len());
        let mut next = 0;
        let mut position = 0;

        self.values.retain(|value| {
            let keep = predicate(I::new(position), value);
            position += 1;

            mapping.push(keep.then(|| {
                next += 1;
                I::new(next - 1)
            }));
            keep
        });

        mapping
    }

    pub fn get(&self, index: I) -> Option<&T> {
        self.values.get(index.value())
    }

    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.values.get_mut(index.value())
    }

    pub fn iter<'a>(&'a self) -> Iter<'a, I, T> {
        self.values
            .iter()
            .enumerate()
            .map(map_entry as fn((usize, &'a T)) -> (I, &'a T))
    }

    pub fn iter_mut<'a>(&'a mut self) -> IterMut<'a, I, T> {
        self.values
            .iter_mut()
            .enumerate()
            .map(map_entry as fn((usize, &'a mut T)) -> (I, &'a mut T))
    }

    pub fn indices(&self) -> impl Iterator<Item = I> {
        (0..self.len()).map(I::new)
    }
}

impl<I, T> Default for IndexMap<I, T> {
    fn default() -> Self {
        Self::bare(Vec::new())
    }
}

impl<I, T: Clone> Clone for IndexMap<I, T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, T: PartialEq> PartialEq for IndexMap<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<I, T: Eq> Eq for IndexMap<I, T> {}

impl<I, T: PartialOrd> PartialOrd for IndexMap<I, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.values.partial_cmp(&other.values)
    }
}

impl<I, T: Ord> Ord for IndexMap<I, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.values.cmp(&other.values)
    }
}

impl<I, T: Hash> Hash for IndexMap<I, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl<I: Index, T> std::ops::Index<I> for IndexMap<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.values[index.value()]
    }
}

impl<I: Index, T> std::ops::IndexMut<I> for IndexMap<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.values[index.value()]
    }
}

impl<I: Index + fmt::Debug, T: fmt::Debug> fmt::Debug for IndexMap<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self).finish()
    }
}

impl<I: Index, T> IntoIterator for IndexMap<I, T> {
    type Item = (I, T);
    type IntoIter = IntoIter<I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values
            .into_iter()
            .enumerate()
            .map(map_entry as fn((usize, T)) -> (I, T))
    }
}

impl<'a, I: Index, T> IntoIterator for &'a IndexMap<I, T> {
    type Item = (I, &'a T);
    type IntoIter = Iter<'a, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, I: Index, T> IntoIterator for &'a mut IndexMap<I, T> {
    type Item = (I, &'a mut T);
    type IntoIter = IterMut<'a, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

fn map_entry<I: Index, T>((index, value): (usize, T)) -> (I, T) {
    (I::new(index), value)
}

pub type IntoIter<I, T> = Map<Enumerate<std::vec::IntoIter<T>>, fn((usize, T)) -> (I, T)>;
pub type Iter<'a, I, T> = Map<Enumerate<std::slice::Iter<'a, T>>, fn((usize, &'a T)) -> (I, &'a T)>;
pub type IterMut<'a, I, T> =
    Map<Enumerate<std::slice::IterMut<'a, T>>, fn((usize, &'a mut T)) -> (I, &'a mut T)>;

/// A type usable as the index of an [`IndexMap`].
///
/// Implementations are usually [derived](derive@Index) for newtypes around integers.
pub trait Index {
    fn new(index: usize) -> Self;

    fn value(self) -> usize;
}

#[cfg(test)]
mod test {
    use super::{Index, IndexMap};

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    struct Key(usize);

    impl Index for Key {
        fn new(index: usize) -> Self {
            Self(index)
        }

        fn value(self) -> usize {
            self.0
        }
    }

    #[test]
    fn insertion_yields_consecutive_indices() {
        let mut map = IndexMap::<Key, &str>::new();

        assert_eq!(map.insert("zero"), Key(0));
        assert_eq!(map.insert("one"), Key(1));
        assert_eq!(map[Key(1)], "one");
        assert_eq!(map.last_index(), Some(Key(1)));
    }

    #[test]
    fn retaining_remaps_indices() {
        let mut map = IndexMap::<Key, u32>::bare(vec![10, 11, 12, 13]);

        let mapping = map.retain(|_, &value| value % 2 == 1);

        assert_eq!(mapping, vec![None, Some(Key(0)), None, Some(Key(1))]);
        assert_eq!(map.into_vec(), vec![11, 13]);
    }

    #[test]
    fn iteration_pairs_indices_with_values() {
        let map = IndexMap::<Key, char>::bare(vec!['a', 'b']);

        let pairs: Vec<_> = map.iter().map(|(key, &value)| (key, value)).collect();

        assert_eq!(pairs, vec![(Key(0), 'a'), (Key(1), 'b')]);
    }
}
