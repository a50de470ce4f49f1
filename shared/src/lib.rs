/**
* Game of Life on a torus, with aging cells.
*
* A living cell with two living neighbors lives on and grows one generation older.
* Any cell with exactly three living neighbors is alive in the next generation.
* Every other cell is dead in the next generation.
* Ages wrap within 1..MAX_GENERATIONS, so a living cell never reads as dead.
*/

pub mod config;
pub mod error;
pub mod format;
pub mod grid;
pub mod rules;
pub mod simulation;

pub use config::{Palette, SimulationConfig, DEFAULT_GRID_SIZE, DEFAULT_STEP_DELAY, MIN_GRID_SIZE};
pub use error::{Error, FormatError, Result};
pub use grid::{Grid, MAX_GENERATIONS};
pub use simulation::{Simulation, Snapshot, StateObserver};
