use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::Arc;
use std::time::Duration;

use aging_life::{Grid, Palette, Simulation, SimulationConfig, StateObserver, MIN_GRID_SIZE};
use anyhow::Context;
use eframe::egui;
use eframe::egui::{ScrollArea, Ui};
use eframe::run_native;

const MAX_GRID_SIZE: usize = 100;
const MAX_DELAY_MILLIS: u64 = 2000;
const CELL_SIZE: f32 = 12.0;
const RANDOM_DENSITY: f64 = 0.3;
const DEFAULT_SAVE_PATH: &str = "saved_grid.csv";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    run_native(
        "Aging Life",
        eframe::NativeOptions::default(),
        Box::new(|cc| {
            let ctx = cc.egui_ctx.clone();
            Ok(Box::new(GuiOfLife::new(ctx)?))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the GUI: {err}"))
}

/// One independent simulation, as created at startup or by "Clone".
struct Session {
    name: String,
    simulation: Simulation,
    size: usize,
    delay_millis: u64,
}

impl Session {
    fn new(name: String, simulation: Simulation) -> Self {
        let size = simulation.size();
        let delay_millis = simulation.step_delay().as_millis() as u64;
        Self {
            name,
            simulation,
            size,
            delay_millis,
        }
    }
}

struct GuiOfLife {
    ctx: egui::Context,
    sessions: Vec<Session>,
    selected: usize,
    path: String,
    status: String,
}

impl GuiOfLife {
    fn new(ctx: egui::Context) -> anyhow::Result<Self> {
        let simulation = Simulation::new(SimulationConfig::default(), repaint_on_change(&ctx))
            .context("create initial simulation")?;
        Ok(Self {
            ctx,
            sessions: vec![Session::new("Session 1".to_string(), simulation)],
            selected: 0,
            path: DEFAULT_SAVE_PATH.to_string(),
            status: String::new(),
        })
    }

    fn session(&mut self) -> &mut Session {
        &mut self.sessions[self.selected]
    }

    fn report(&mut self, result: anyhow::Result<String>) {
        self.status = match result {
            Ok(message) => {
                log::info!("{message}");
                message
            }
            Err(err) => {
                log::warn!("{err:#}");
                format!("{err:#}")
            }
        };
    }

    fn toggle_running(&mut self) {
        let simulation = &mut self.session().simulation;
        if simulation.is_running() {
            simulation.stop();
        } else if !simulation.start() {
            self.status = "Nothing alive to simulate".to_string();
        }
    }

    fn save(&mut self) -> anyhow::Result<String> {
        let path = self.path.clone();
        let simulation = &mut self.session().simulation;
        simulation.stop();
        let file = File::create(&path).with_context(|| format!("create {path}"))?;
        simulation
            .save_to(BufWriter::new(file))
            .with_context(|| format!("save grid to {path}"))?;
        Ok(format!("Saved grid to {path}"))
    }

    fn open(&mut self) -> anyhow::Result<String> {
        let path = self.path.clone();
        let session = self.session();
        session.simulation.stop();
        let file = File::open(&path).with_context(|| format!("open {path}"))?;
        session
            .simulation
            .load_from(BufReader::new(file))
            .with_context(|| format!("load grid from {path}"))?;
        session.size = session.simulation.size();
        Ok(format!("Loaded {0}x{0} grid from {path}", session.size))
    }

    fn clone_session(&mut self) {
        let snapshot = {
            let simulation = &mut self.session().simulation;
            simulation.stop();
            simulation.clone_state()
        };
        let simulation = Simulation::from_snapshot(snapshot, repaint_on_change(&self.ctx));
        let name = format!("Session {}", self.sessions.len() + 1);
        self.sessions.push(Session::new(name, simulation));
        self.selected = self.sessions.len() - 1;
    }

    fn controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let label = if self.session().simulation.is_running() { "Stop" } else { "Start" };
            if ui.button(label).clicked() {
                self.toggle_running();
            }
            if ui.button("Reset").clicked() {
                let simulation = &mut self.session().simulation;
                simulation.stop();
                let result = simulation.reset().map(|_| "Grid cleared".to_string());
                self.report(result.map_err(Into::into));
            }
            if ui.button("Randomize").clicked() {
                let simulation = &mut self.session().simulation;
                simulation.stop();
                let result = simulation.randomize(RANDOM_DENSITY).map(|_| "Grid randomized".to_string());
                self.report(result.map_err(Into::into));
            }
            if ui.button("Invert colors").clicked() {
                let simulation = &self.session().simulation;
                let palette = simulation.palette();
                simulation.set_palette(Palette {
                    alive: palette.dead,
                    dead: palette.alive,
                });
            }
            if ui.button("Clone").clicked() {
                self.clone_session();
            }
        });

        ui.horizontal(|ui| {
            let session = self.session();
            if ui
                .add(egui::Slider::new(&mut session.size, MIN_GRID_SIZE..=MAX_GRID_SIZE).text("Grid size"))
                .changed()
            {
                session.simulation.stop();
                let result = session.simulation.resize(session.size);
                if let Err(err) = result {
                    session.size = session.simulation.size();
                    self.report(Err(err.into()));
                }
            }

            let session = self.session();
            if ui
                .add(egui::Slider::new(&mut session.delay_millis, 0..=MAX_DELAY_MILLIS).text("Delay (ms)"))
                .changed()
            {
                session
                    .simulation
                    .set_step_delay(Duration::from_millis(session.delay_millis));
            }
        });

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.path);
            if ui.button("Save").clicked() {
                let result = self.save();
                self.report(result);
            }
            if ui.button("Open").clicked() {
                let result = self.open();
                self.report(result);
            }
        });

        if self.sessions.len() > 1 {
            ui.horizontal(|ui| {
                for (index, session) in self.sessions.iter().enumerate() {
                    if ui.selectable_label(index == self.selected, session.name.as_str()).clicked() {
                        self.selected = index;
                    }
                }
            });
        }
    }

    fn create_grid(&mut self, ui: &mut Ui) {
        let simulation = &self.session().simulation;
        let grid = simulation.grid();
        let palette = simulation.palette();
        let size = grid.size();

        ui.label(format!("Generation: {}", simulation.generation()));

        // Calculate the grid starting point
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(CELL_SIZE * size as f32, CELL_SIZE * size as f32),
            egui::Sense::click(),
        );

        let painter = ui.painter();
        for (row_index, row) in grid.rows().enumerate() {
            for (col_index, &age) in row.iter().enumerate() {
                let pos = rect.min + egui::vec2(col_index as f32 * CELL_SIZE, row_index as f32 * CELL_SIZE);
                let color = if age > 0 { palette.alive } else { palette.dead };
                painter.rect_filled(
                    egui::Rect::from_min_size(pos, egui::vec2(CELL_SIZE, CELL_SIZE)).shrink(0.5),
                    CELL_SIZE / 4f32,
                    to_color32(color),
                );
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let offset = (pos - rect.min) / CELL_SIZE;
                let (row, col) = (offset.y.floor() as isize, offset.x.floor() as isize);
                // Clicks while running are ignored, as they would race the loop.
                if let Err(err) = simulation.toggle_cell(row, col) {
                    log::debug!("ignored click at ({row}, {col}): {err}");
                }
            }
        }
    }
}

impl eframe::App for GuiOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::both().show(ui, |ui| {
                ui.heading("Game of Life");
                self.controls(ui);
                if !self.status.is_empty() {
                    ui.label(self.status.as_str());
                }
                self.create_grid(ui);
            });
        });
    }
}

fn repaint_on_change(ctx: &egui::Context) -> Arc<dyn StateObserver> {
    let ctx = ctx.clone();
    Arc::new(move |_: &Grid, _: u64| ctx.request_repaint())
}

/// Palette colors are stored as 0xAARRGGBB.
fn to_color32(argb: u32) -> egui::Color32 {
    let [a, r, g, b] = argb.to_be_bytes();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}
