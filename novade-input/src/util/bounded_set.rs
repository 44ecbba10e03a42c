//! Fixed-capacity set of nonzero `u32` values.
//!
//! Used for currently pressed buttons and keys. Live values are always stored
//! at the front of the backing array; zero marks an absent slot and zeros only
//! ever trail live values.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedSet<const N: usize> {
    values: [u32; N],
    len: usize,
}

impl<const N: usize> Default for BoundedSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BoundedSet<N> {
    pub const fn new() -> Self {
        Self { values: [0; N], len: 0 }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn contains(&self, value: u32) -> bool {
        value != 0 && self.as_slice().contains(&value)
    }

    fn position(&self, value: u32) -> Option<usize> {
        self.as_slice().iter().position(|&v| v == value)
    }

    /// Inserts `value` at the end of the live region.
    ///
    /// Returns `false` if the value is zero, already present, or the set is full.
    /// A full set is logged: it means the hardware reported more simultaneous
    /// presses than it architecturally supports.
    pub fn add(&mut self, value: u32) -> bool {
        if value == 0 || self.contains(value) {
            return false;
        }
        if self.len == N {
            warn!("BoundedSet: capacity {} exhausted, dropping value {}", N, value);
            return false;
        }
        self.values[self.len] = value;
        self.len += 1;
        true
    }

    /// Removes `value` in O(1) by moving the last live value into its slot.
    pub fn remove(&mut self, value: u32) -> bool {
        if value == 0 {
            return false;
        }
        match self.position(value) {
            Some(index) => {
                self.len -= 1;
                self.values[index] = self.values[self.len];
                self.values[self.len] = 0;
                true
            }
            None => false,
        }
    }

    /// Moves every nonzero entry to the front, preserving relative order, and
    /// recomputes the live count.
    pub fn compact(&mut self) {
        let mut write = 0;
        for read in 0..N {
            let value = self.values[read];
            if value != 0 {
                self.values[write] = value;
                write += 1;
            }
        }
        for slot in &mut self.values[write..] {
            *slot = 0;
        }
        self.len = write;
    }

    /// Zeroes the slot holding `value` without reordering.
    ///
    /// Leaves a zero inside the live region, so it is only valid right before
    /// [`compact`](Self::compact). Until then `len`, `iter` and `as_slice`
    /// still count the cleared slot.
    pub(crate) fn clear_value(&mut self, value: u32) -> bool {
        if value == 0 {
            return false;
        }
        match self.position(value) {
            Some(index) => {
                self.values[index] = 0;
                true
            }
            None => false,
        }
    }

    /// Releases every value matching `predicate` at once, keeping the order of
    /// the survivors. Returns how many values were released.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(u32) -> bool) -> usize {
        let mut released = 0;
        for index in 0..self.len {
            let value = self.values[index];
            if predicate(value) && self.clear_value(value) {
                released += 1;
            }
        }
        if released > 0 {
            self.compact();
        }
        released
    }

    pub fn clear(&mut self) {
        self.values = [0; N];
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_invariants<const N: usize>(set: &BoundedSet<N>) {
        assert!(set.len() <= N);
        let live = set.as_slice();
        assert!(live.iter().all(|&v| v != 0), "live region holds a zero: {:?}", live);
        for (i, a) in live.iter().enumerate() {
            assert!(!live[i + 1..].contains(a), "duplicate value {}", a);
        }
        assert!(set.values[set.len..].iter().all(|&v| v == 0), "zeros must trail live values");
    }

    #[test]
    fn test_add_rejects_zero_and_duplicates() {
        let mut set = BoundedSet::<4>::new();
        assert!(!set.add(0));
        assert!(set.add(272));
        assert!(!set.add(272));
        assert_eq!(set.as_slice(), &[272]);
    }

    #[test]
    fn test_add_fails_when_full() {
        let mut set = BoundedSet::<2>::new();
        assert!(set.add(1));
        assert!(set.add(2));
        assert!(!set.add(3));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(3));
    }

    #[test]
    fn test_remove_swaps_last_into_hole() {
        let mut set = BoundedSet::<4>::new();
        for v in [10, 20, 30] {
            set.add(v);
        }
        assert!(set.remove(10));
        assert_eq!(set.as_slice(), &[30, 20]);
        assert!(!set.remove(10));
        assert!(!set.remove(0));
        assert_invariants(&set);
    }

    #[test]
    fn test_remove_where_preserves_order() {
        let mut set = BoundedSet::<8>::new();
        for v in [1, 2, 3, 4, 5] {
            set.add(v);
        }
        assert_eq!(set.remove_where(|v| v % 2 == 0), 2);
        assert_eq!(set.as_slice(), &[1, 3, 5]);
        assert_invariants(&set);
    }

    #[test]
    fn test_clear_value_then_compact_releases_batch() {
        let mut set = BoundedSet::<4>::new();
        for v in [4, 5, 6] {
            set.add(v);
        }
        assert!(set.clear_value(4));
        assert!(set.clear_value(6));
        assert!(!set.clear_value(7));
        set.compact();
        assert_eq!(set.as_slice(), &[5]);
        assert_invariants(&set);
    }

    #[test]
    fn test_compact_on_normalized_set_is_noop() {
        let mut set = BoundedSet::<4>::new();
        set.add(7);
        set.add(9);
        let before = set;
        set.compact();
        assert_eq!(set, before);
    }

    #[rstest]
    #[case(&[(true, 1), (true, 2), (false, 1), (true, 3), (true, 3), (false, 9)])]
    #[case(&[(true, 5), (true, 6), (true, 7), (true, 8), (true, 9), (false, 6), (true, 10)])]
    #[case(&[(false, 1), (true, 0), (true, 4), (false, 4), (false, 4), (true, 4)])]
    fn test_operation_sequences_keep_invariants(#[case] ops: &[(bool, u32)]) {
        let mut set = BoundedSet::<4>::new();
        for &(is_add, value) in ops {
            if is_add {
                set.add(value);
            } else {
                set.remove(value);
            }
            assert_invariants(&set);
        }
    }
}
