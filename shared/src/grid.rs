use rand::Rng;

use crate::error::{Error, Result};

/// Ages stay below this cap. Age 0 is dead, anything else is alive.
pub const MAX_GENERATIONS: u8 = 10;

/// Square toroidal grid of cell ages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<u8>>,
}

impl Grid {
    pub fn new(size: usize) -> Result<Self> {
        if size < 1 {
            return Err(Error::InvalidSize { size, min: 1 });
        }
        Ok(Grid {
            size,
            cells: vec![vec![0; size]; size],
        })
    }

    /// Builds a grid from rows already known to be square with ages in range.
    pub(crate) fn from_rows(cells: Vec<Vec<u8>>) -> Self {
        debug_assert!(!cells.is_empty() && cells.iter().all(|row| row.len() == cells.len()));
        Grid { size: cells.len(), cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: isize, col: isize) -> u8 {
        let (row, col) = self.wrap(row, col);
        self.cells[row][col]
    }

    /// Stores `age` at the wrapped coordinate. Ages past the cap wrap the same
    /// way aging does, so they never land on 0.
    pub fn set(&mut self, row: isize, col: isize, age: u8) {
        let (row, col) = self.wrap(row, col);
        self.cells[row][col] = clamp_age(age);
    }

    pub fn is_alive_at(&self, row: isize, col: isize) -> bool {
        self.get(row, col) > 0
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&age| age == 0)
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&age| age > 0).count()
    }

    /// Same grid with every age collapsed to 0 or 1.
    pub fn to_binary(&self) -> Grid {
        Grid {
            size: self.size,
            cells: self
                .cells
                .iter()
                .map(|row| row.iter().map(|&age| age.min(1)).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Copies this grid into a new one of `new_size`, anchored at the top-left
    /// corner. Cells outside the overlap are dropped or left dead.
    pub fn migrate(&self, new_size: usize) -> Result<Grid> {
        let mut migrated = Grid::new(new_size)?;
        let overlap = self.size.min(new_size);
        for row in 0..overlap {
            migrated.cells[row][..overlap].copy_from_slice(&self.cells[row][..overlap]);
        }
        Ok(migrated)
    }

    /// Fills the grid with newborn cells, each alive with probability `density`.
    pub fn randomize(&mut self, density: f64) {
        self.randomize_with(&mut rand::rng(), density);
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R, density: f64) {
        let density = density.clamp(0.0, 1.0);
        for age in self.cells.iter_mut().flatten() {
            *age = u8::from(rng.random_bool(density));
        }
    }

    /// Reduces any coordinate onto the torus.
    pub(crate) fn wrap(&self, row: isize, col: isize) -> (usize, usize) {
        let size = self.size as isize;
        (row.rem_euclid(size) as usize, col.rem_euclid(size) as usize)
    }
}

fn clamp_age(age: u8) -> u8 {
    if age < MAX_GENERATIONS {
        age
    } else {
        (age - 1) % (MAX_GENERATIONS - 1) + 1
    }
}
