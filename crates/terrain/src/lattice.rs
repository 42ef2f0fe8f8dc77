use std::collections::BTreeMap;
use std::sync::Arc;

/// Grid resolution: number of cells along each axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Density {
    pub rows: usize,
    pub columns: usize,
}

impl Density {
    pub const fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Number of elevation posts (cell corners).
    pub fn post_count(&self) -> usize {
        (self.rows + 1) * (self.columns + 1)
    }
}

/// Normalized boundary positions of every row and column of a grid at one
/// density. Fractions run from exactly `0.0` to exactly `1.0`, so the first
/// and last boundaries land on the tile edges without rounding drift.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    density: Density,
    row_fractions: Vec<f64>,
    column_fractions: Vec<f64>,
}

impl Lattice {
    pub fn new(density: Density) -> Self {
        Self {
            density,
            row_fractions: fractions(density.rows),
            column_fractions: fractions(density.columns),
        }
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn row_fraction(&self, row: usize) -> Option<f64> {
        self.row_fractions.get(row).copied()
    }

    pub fn column_fraction(&self, column: usize) -> Option<f64> {
        self.column_fractions.get(column).copied()
    }
}

fn fractions(cells: usize) -> Vec<f64> {
    let mut out: Vec<f64> = (0..=cells).map(|i| i as f64 / cells as f64).collect();
    if let Some(last) = out.last_mut() {
        *last = 1.0;
    }
    out
}

/// Owned cache of lattices keyed by density. Grids built through the same
/// cache share one `Lattice` per density.
#[derive(Debug, Default)]
pub struct LatticeCache {
    entries: BTreeMap<Density, Arc<Lattice>>,
    hits: u64,
    misses: u64,
}

impl LatticeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, density: Density) -> Arc<Lattice> {
        if let Some(lattice) = self.entries.get(&density) {
            self.hits += 1;
            return Arc::clone(lattice);
        }
        self.misses += 1;
        let lattice = Arc::new(Lattice::new(density));
        self.entries.insert(density, Arc::clone(&lattice));
        lattice
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Density, Lattice, LatticeCache};

    #[test]
    fn fractions_hit_tile_edges_exactly() {
        let lattice = Lattice::new(Density::new(3, 7));
        assert_eq!(lattice.row_fraction(0), Some(0.0));
        assert_eq!(lattice.row_fraction(3), Some(1.0));
        assert_eq!(lattice.column_fraction(7), Some(1.0));
        assert_eq!(lattice.row_fraction(4), None);
    }

    #[test]
    fn cache_shares_lattices_per_density() {
        let mut cache = LatticeCache::new();
        let a = cache.get_or_build(Density::new(4, 4));
        let b = cache.get_or_build(Density::new(4, 4));
        let c = cache.get_or_build(Density::new(8, 4));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
        assert_eq!((cache.hits(), cache.misses()), (1, 2));
    }
}
