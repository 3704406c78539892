//! Disjoint-set forest over provisional labels.
//!
//! Invariant: `parent[i] <= i` for every node, with equality exactly at the
//! roots. Unions always hang the larger root under the smaller one, so the
//! root of a class is the smallest label ever minted into it. That makes the
//! final renumbering a single left-to-right pass.

use std::collections::TryReserveError;

/// Provisional label id. `0` is the background and never a set member.
pub(crate) type Label = u32;

#[derive(Debug, Default)]
pub(crate) struct DisjointSet {
    parent: Vec<Label>,
}

impl DisjointSet {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
        }
    }

    /// Empty the forest and make room for `max_labels` labels without
    /// reallocating during the scan.
    pub(crate) fn reset(&mut self, max_labels: usize) -> Result<(), TryReserveError> {
        self.parent.clear();
        self.parent.try_reserve_exact(max_labels + 1)?;
        // Slot 0 is the background bucket.
        self.parent.push(0);
        Ok(())
    }

    pub(crate) fn release(&mut self) {
        self.parent = Vec::new();
    }

    /// Number of provisional labels minted so far.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.parent.len().saturating_sub(1)
    }

    /// Mint a fresh singleton label.
    #[inline]
    pub(crate) fn make_set(&mut self) -> Label {
        let label = self.parent.len() as Label;
        self.parent.push(label);
        label
    }

    #[inline]
    fn root_of(&self, mut i: Label) -> Label {
        while self.parent[i as usize] < i {
            i = self.parent[i as usize];
        }
        i
    }

    /// Point every node on the path from `i` directly at `root`.
    #[inline]
    fn compress(&mut self, mut i: Label, root: Label) {
        while self.parent[i as usize] < i {
            let next = self.parent[i as usize];
            self.parent[i as usize] = root;
            i = next;
        }
        self.parent[i as usize] = root;
    }

    /// Representative of `i`'s class, compressing the path on the way.
    #[inline]
    pub(crate) fn find(&mut self, i: Label) -> Label {
        let root = self.root_of(i);
        self.compress(i, root);
        root
    }

    /// Join the classes of `a` and `b`; the larger root is hung under the
    /// smaller one, which is returned.
    #[inline]
    pub(crate) fn union(&mut self, a: Label, b: Label) -> Label {
        let root_a = self.find(a);
        let root_b = self.find(b);
        let (root, child) = if root_a <= root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[child as usize] = root;
        root
    }

    /// Renumber classes densely from 1 in order of their smallest label.
    ///
    /// Afterwards `parent[l]` holds the final id of label `l` (see
    /// [`DisjointSet::final_label`]) and the forest must be `reset` before
    /// reuse. Returns the number of ids including the background bucket.
    pub(crate) fn flatten(&mut self) -> usize {
        let mut next: Label = 1;
        for i in 1..self.parent.len() {
            let p = self.parent[i];
            if (p as usize) < i {
                // `p` was visited earlier and already holds its final id.
                self.parent[i] = self.parent[p as usize];
            } else {
                self.parent[i] = next;
                next += 1;
            }
        }
        next as usize
    }

    /// Final id of a provisional label after [`DisjointSet::flatten`].
    #[inline]
    pub(crate) fn final_label(&self, label: Label) -> Label {
        self.parent[label as usize]
    }
}
