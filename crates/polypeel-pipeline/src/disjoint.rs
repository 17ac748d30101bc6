//! Disjoint-set forest over dense element indices.
//!
//! A thin wrapper around [`petgraph::unionfind::UnionFind`] that adds the
//! one query the segmenter needs beyond `union`/`find`: enumerating every
//! group with its members.

use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;

/// Partition of `0..len` into disjoint groups.
///
/// Starts with every element in its own group. Merges are idempotent and
/// never split a group.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    forest: UnionFind<usize>,
    len: usize,
}

impl DisjointSet {
    /// `len` singleton groups.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            forest: UnionFind::new(len),
            len,
        }
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Merge the groups containing `a` and `b`. Returns `false` if they
    /// were already one group.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        self.forest.union(a, b)
    }

    /// Representative of `x`'s group. Stable until the next merge.
    pub fn find(&mut self, x: usize) -> usize {
        self.forest.find_mut(x)
    }

    /// `true` if `a` and `b` are in the same group.
    #[must_use]
    pub fn same(&self, a: usize, b: usize) -> bool {
        self.forest.equiv(a, b)
    }

    /// Every group, keyed by its smallest member, with members ascending.
    ///
    /// Keying by the smallest member makes the result independent of
    /// which representative the forest happened to pick.
    #[must_use]
    pub fn group_members(&self) -> BTreeMap<usize, Vec<usize>> {
        let labels = self.forest.clone().into_labeling();
        let mut seed_of_root: BTreeMap<usize, usize> = BTreeMap::new();
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        // Ascending scan: the first member seen for a root is its seed.
        for (member, root) in labels.into_iter().enumerate() {
            let seed = *seed_of_root.entry(root).or_insert(member);
            groups.entry(seed).or_default().push(member);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_singletons() {
        let set = DisjointSet::new(4);
        assert_eq!(set.len(), 4);
        assert!(!set.same(0, 1));
        assert_eq!(set.group_members().len(), 4);
    }

    #[test]
    fn merge_is_transitive() {
        let mut set = DisjointSet::new(5);
        assert!(set.merge(0, 3));
        assert!(set.merge(3, 4));
        assert!(set.same(0, 4));
        assert_eq!(set.find(0), set.find(4));
        assert!(!set.same(0, 1));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut set = DisjointSet::new(3);
        assert!(set.merge(1, 2));
        assert!(!set.merge(2, 1));
        assert!(!set.merge(1, 1));
    }

    #[test]
    fn groups_keyed_by_smallest_member() {
        let mut set = DisjointSet::new(6);
        set.merge(5, 2);
        set.merge(4, 1);
        set.merge(1, 5);
        let groups = set.group_members();
        let expected: BTreeMap<usize, Vec<usize>> =
            BTreeMap::from([(0, vec![0]), (1, vec![1, 2, 4, 5]), (3, vec![3])]);
        assert_eq!(groups, expected);
    }

    #[test]
    fn empty_set() {
        let set = DisjointSet::new(0);
        assert!(set.is_empty());
        assert!(set.group_members().is_empty());
    }
}
