// dqguard-core/src/domain/dataset/mask.rs

/// Per-row selector produced by condition evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMask(Vec<bool>);

impl RowMask {
    pub fn all(len: usize) -> Self {
        Self(vec![true; len])
    }

    pub fn none(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn from_fn<F: FnMut(usize) -> bool>(len: usize, f: F) -> Self {
        Self((0..len).map(f).collect())
    }

    /// Logical AND, row by row.
    pub fn intersect(&mut self, other: &RowMask) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = *a && *b;
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_set(&self, row: usize) -> bool {
        self.0.get(row).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|b| *b)
    }

    /// Indexes of selected rows, ascending.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for RowMask {
    fn from(v: Vec<bool>) -> Self {
        Self(v)
    }
}
