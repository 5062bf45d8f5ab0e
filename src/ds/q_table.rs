use std::collections::{hash_map, HashMap};

use crate::algo::tabular::Hashable;

/// A table of action values that grows one state at a time
///
/// Each state maps to a row of exactly `n_actions` values, indexed by action. Rows are
/// allocated lazily and zero-initialized the first time a state is looked up mutably,
/// and are never removed.
#[derive(Debug, Clone)]
pub struct QTable<S> {
    rows: HashMap<S, Box<[f32]>>,
    n_actions: usize,
}

impl<S: Hashable> QTable<S> {
    /// Create an empty table whose rows hold `n_actions` values
    pub fn new(n_actions: usize) -> Self {
        Self {
            rows: HashMap::new(),
            n_actions,
        }
    }

    /// Length of every row
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Number of states with an allocated row
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the row for `state` without allocating it
    pub fn get(&self, state: &S) -> Option<&[f32]> {
        self.rows.get(state).map(|row| &row[..])
    }

    /// Get the row for `state`, inserting a row of zeros if absent
    pub fn row(&mut self, state: S) -> &[f32] {
        self.row_mut(state)
    }

    /// Get the row for `state` mutably, inserting a row of zeros if absent
    pub fn row_mut(&mut self, state: S) -> &mut [f32] {
        let (n_actions, n_rows) = (self.n_actions, self.rows.len());
        match self.rows.entry(state) {
            hash_map::Entry::Occupied(e) => &mut e.into_mut()[..],
            hash_map::Entry::Vacant(e) => {
                log::trace!("Allocating row {n_rows} of the Q table");
                &mut e.insert(vec![0.0; n_actions].into_boxed_slice())[..]
            }
        }
    }

    /// Iterate over every allocated `(state, row)` pair in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &[f32])> {
        self.rows.iter().map(|(state, row)| (state, &row[..]))
    }
}
