use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, trace};

use crate::config::{self, Palette, SimulationConfig};
use crate::error::{Error, Result};
use crate::format;
use crate::grid::{Grid, MAX_GENERATIONS};
use crate::rules;

/// Told about every new grid state: after each generation and after every
/// toggle, resize, load or reset.
///
/// Called with the simulation state locked, so implementations must not call
/// back into the [`Simulation`].
pub trait StateObserver: Send + Sync {
    fn on_state_changed(&self, grid: &Grid, generation: u64);
}

impl<F> StateObserver for F
where
    F: Fn(&Grid, u64) + Send + Sync,
{
    fn on_state_changed(&self, grid: &Grid, generation: u64) {
        self(grid, generation)
    }
}

/// Frozen copy of a session, used to start an independent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    grid: Grid,
    generation: u64,
    step_delay: Duration,
    palette: Palette,
}

impl Snapshot {
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }
}

struct SimulationState {
    grid: Grid,
    generation: u64,
    running: bool,
    step_delay: Duration,
    palette: Palette,
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the grid and the stepping loop.
///
/// While the loop runs it is the only thing that changes the grid; toggling,
/// resizing, loading and resetting fail with [`Error::InvalidState`] until
/// [`Simulation::stop`] is called or the grid dies out.
pub struct Simulation {
    state: Arc<Mutex<SimulationState>>,
    observer: Arc<dyn StateObserver>,
    worker: Option<Worker>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, observer: Arc<dyn StateObserver>) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.size)?;
        Ok(Self::from_parts(
            SimulationState {
                grid,
                generation: 0,
                running: false,
                step_delay: config.step_delay,
                palette: config.palette,
            },
            observer,
        ))
    }

    pub fn from_snapshot(snapshot: Snapshot, observer: Arc<dyn StateObserver>) -> Self {
        Self::from_parts(
            SimulationState {
                grid: snapshot.grid,
                generation: snapshot.generation,
                running: false,
                step_delay: snapshot.step_delay,
                palette: snapshot.palette,
            },
            observer,
        )
    }

    fn from_parts(state: SimulationState, observer: Arc<dyn StateObserver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            observer,
            worker: None,
        }
    }

    /// Start stepping in the background. Returns `false` and does nothing if
    /// the loop is already running or there is nothing alive to step.
    pub fn start(&mut self) -> bool {
        // A loop that stopped on an empty grid has already exited.
        self.join_worker();

        {
            let mut state = lock(&self.state);
            if state.running || state.grid.is_empty() {
                return false;
            }
            state.running = true;
            debug!("starting at generation {}", state.generation);
        }

        let (stop, stop_signal) = mpsc::channel();
        let state = Arc::clone(&self.state);
        let observer = Arc::clone(&self.observer);
        let handle = thread::spawn(move || run(&state, &*observer, &stop_signal));
        self.worker = Some(Worker { stop, handle });
        true
    }

    /// Ask the loop to finish and wait for it. A generation already being
    /// computed is completed first.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            // The loop may already be gone if the grid emptied.
            let _ = worker.stop.send(());
            if worker.handle.join().is_err() {
                error!("simulation loop panicked");
            }
        }

        let mut state = lock(&self.state);
        if std::mem::replace(&mut state.running, false) {
            debug!("stopped at generation {}", state.generation);
        }
    }

    /// Flip one cell between dead and newborn. Every other living cell is
    /// flattened to age 1 and the generation count starts over.
    pub fn toggle_cell(&self, row: isize, col: isize) -> Result<()> {
        let mut state = self.stopped()?;
        let mut grid = state.grid.to_binary();
        grid.set(row, col, 1 - grid.get(row, col));
        state.grid = grid;
        state.generation = 0;
        self.observer.on_state_changed(&state.grid, state.generation);
        Ok(())
    }

    pub fn resize(&self, new_size: usize) -> Result<()> {
        config::check_size(new_size)?;
        let mut state = self.stopped()?;
        debug!("resizing grid from {} to {}", state.grid.size(), new_size);
        let grid = state.grid.migrate(new_size)?;
        self.replace_grid(&mut state, grid);
        Ok(())
    }

    /// Replace the grid with one parsed from save text. The current grid is
    /// kept if the text is malformed.
    pub fn load(&self, text: &str) -> Result<()> {
        let mut state = self.stopped()?;
        let grid = format::deserialize(text)?;
        debug!("loaded {0}x{0} grid", grid.size());
        self.replace_grid(&mut state, grid);
        Ok(())
    }

    pub fn load_from<R: Read>(&self, reader: R) -> Result<()> {
        let mut state = self.stopped()?;
        let grid = format::read_grid(reader)?;
        debug!("loaded {0}x{0} grid", grid.size());
        self.replace_grid(&mut state, grid);
        Ok(())
    }

    pub fn save(&self) -> String {
        format::serialize(&lock(&self.state).grid)
    }

    pub fn save_to<W: Write>(&self, writer: W) -> Result<()> {
        let grid = self.grid();
        format::write_grid(writer, &grid)
    }

    /// Clear every cell, keeping the current size.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.stopped()?;
        let grid = Grid::new(state.grid.size())?;
        debug!("reset {0}x{0} grid", grid.size());
        self.replace_grid(&mut state, grid);
        Ok(())
    }

    /// Seed the grid with newborn cells, each alive with probability `density`.
    pub fn randomize(&self, density: f64) -> Result<()> {
        let mut state = self.stopped()?;
        let mut grid = Grid::new(state.grid.size())?;
        grid.randomize(density);
        self.replace_grid(&mut state, grid);
        Ok(())
    }

    pub fn clone_state(&self) -> Snapshot {
        let state = lock(&self.state);
        Snapshot {
            grid: state.grid.clone(),
            generation: state.generation,
            step_delay: state.step_delay,
            palette: state.palette,
        }
    }

    /// Takes effect from the next wait of a running loop.
    pub fn set_step_delay(&self, step_delay: Duration) {
        lock(&self.state).step_delay = step_delay;
    }

    pub fn set_palette(&self, palette: Palette) {
        lock(&self.state).palette = palette;
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    pub fn size(&self) -> usize {
        lock(&self.state).grid.size()
    }

    pub fn grid(&self) -> Grid {
        lock(&self.state).grid.clone()
    }

    pub fn step_delay(&self) -> Duration {
        lock(&self.state).step_delay
    }

    pub fn palette(&self) -> Palette {
        lock(&self.state).palette
    }

    fn stopped(&self) -> Result<MutexGuard<'_, SimulationState>> {
        let state = lock(&self.state);
        if state.running {
            return Err(Error::InvalidState);
        }
        Ok(state)
    }

    fn replace_grid(&self, state: &mut SimulationState, grid: Grid) {
        state.grid = grid;
        state.generation = 0;
        self.observer.on_state_changed(&state.grid, state.generation);
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take_if(|worker| worker.handle.is_finished()) {
            if worker.handle.join().is_err() {
                error!("simulation loop panicked");
            }
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

// State is only ever changed as a whole under the lock, so a poisoned lock
// still holds a consistent state.
fn lock(state: &Mutex<SimulationState>) -> MutexGuard<'_, SimulationState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run(state: &Mutex<SimulationState>, observer: &dyn StateObserver, stop_signal: &Receiver<()>) {
    loop {
        if !matches!(stop_signal.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }

        let step_delay = {
            let mut state = lock(state);
            state.grid = rules::step_generation(&state.grid, MAX_GENERATIONS);
            state.generation += 1;
            trace!("generation {}: {} alive", state.generation, state.grid.live_count());
            observer.on_state_changed(&state.grid, state.generation);

            if state.grid.is_empty() {
                state.running = false;
                info!("grid died out at generation {}", state.generation);
                return;
            }
            state.step_delay
        };

        match stop_signal.recv_timeout(step_delay) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
