//! Interactive application shell: control panel, canvas, pointer
//! interaction, and exports, wired to the renderer and the collaborators.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::physics::charges::{ChargeSystem, Preset};
use crate::physics::trajectory::Tracer;
use crate::physics::wave::WaveField;
use crate::render::contour::{ScalarGrid, DEFAULT_LEVEL_COUNT};
use crate::render::{ContourPalette, Renderer};

const WAVE_CELLS: usize = 320;
/// Slab of higher permittivity shown in the wave strip.
const SLAB_SPAN: (f32, f32) = (0.62, 0.80);
/// Tracers further than this outside the canvas are dropped.
const TRACER_MARGIN: f32 = 60.0;
const MAX_TRACERS: usize = 24;
/// Frame delta cap; a dragged window must not teleport the simulation.
const MAX_FRAME_DT: f32 = 0.1;
/// Resolution used when rasterizing the potential map for PNG export.
const EXPORT_RESOLUTION: f32 = 4.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Field,
    Wave,
}

pub struct FieldscopeApp {
    mode: Mode,
    charges: ChargeSystem,
    wave: WaveField,
    tracers: Vec<Tracer>,
    renderer: Renderer,
    rng: StdRng,

    running: bool,
    last_update: Instant,
    fps: f32,

    show_contours: bool,
    show_arrows: bool,
    show_flow: bool,
    show_tracers: bool,
    show_energy: bool,
    hue_contours: bool,

    level_count: usize,
    grid_resolution: f32,
    arrow_spacing: f32,
    slab_eps: f32,
    tracer_speed: f32,

    canvas_size: Vec2,
    needs_reseed: bool,
    csv_filename: String,
    json_filename: String,
    png_filename: String,
    error_msg: String,
}

impl FieldscopeApp {
    pub fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        let mut charges = ChargeSystem::new();
        charges.load_preset(Preset::Dipole, 800.0, 600.0, &mut rng);

        let slab_eps = 2.0;
        let mut wave = WaveField::new(WAVE_CELLS);
        wave.set_slab(SLAB_SPAN.0, SLAB_SPAN.1, slab_eps);

        Self {
            mode: Mode::Field,
            charges,
            wave,
            tracers: Vec::new(),
            renderer: Renderer::new(800.0, 600.0),
            rng,
            running: true,
            last_update: Instant::now(),
            fps: 60.0,
            show_contours: true,
            show_arrows: false,
            show_flow: true,
            show_tracers: true,
            show_energy: true,
            hue_contours: false,
            level_count: DEFAULT_LEVEL_COUNT,
            grid_resolution: 14.0,
            arrow_spacing: 44.0,
            slab_eps,
            tracer_speed: 80.0,
            canvas_size: Vec2::ZERO,
            needs_reseed: true,
            csv_filename: "fieldscope_energy.csv".to_string(),
            json_filename: "fieldscope_params.json".to_string(),
            png_filename: "fieldscope_potential.png".to_string(),
            error_msg: String::new(),
        }
    }

    fn frame_dt(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_update)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        self.last_update = now;
        self.fps = 0.9 * self.fps + 0.1 / dt.max(1e-6);
        dt
    }

    fn apply_preset(&mut self, preset: Preset) {
        let size = if self.canvas_size.length() > 1.0 {
            self.canvas_size
        } else {
            vec2(800.0, 600.0)
        };
        self.charges
            .load_preset(preset, size.x, size.y, &mut self.rng);
        self.tracers.clear();
        self.renderer.reset_energy();
        self.needs_reseed = true;
        log::info!("loaded {preset:?} preset: {} charges", self.charges.len());
    }

    fn reset_simulation(&mut self) {
        self.tracers.clear();
        self.wave.reset();
        self.renderer.reset_energy();
        self.needs_reseed = true;
    }

    fn advance_simulation(&mut self, dt: f32) {
        match self.mode {
            Mode::Field => {
                self.renderer.tick(dt);
                for tracer in &mut self.tracers {
                    let e = self.charges.field_at(tracer.position.x, tracer.position.y);
                    tracer.step(e, dt);
                }
                if self.canvas_size.length() > 1.0 {
                    let (w, h) = (self.canvas_size.x, self.canvas_size.y);
                    self.tracers.retain(|t| t.in_bounds(w, h, TRACER_MARGIN));
                }
                let kinetic: f32 = self
                    .tracers
                    .iter()
                    .map(|t| 0.5 * t.velocity.length_sq())
                    .sum();
                self.renderer.push_energy(kinetic);
            }
            Mode::Wave => {
                self.wave.step(dt);
                self.renderer.push_energy(self.wave.energy());
            }
        }
    }

    fn launch_tracer(&mut self, at: Pos2) {
        let e = self.charges.field_at(at.x, at.y);
        let dir = if e.length() > 1e-6 {
            e.normalized()
        } else {
            vec2(1.0, 0.0)
        };
        if self.tracers.len() >= MAX_TRACERS {
            self.tracers.remove(0);
        }
        self.tracers
            .push(Tracer::new(at, dir * self.tracer_speed, 1.0));
    }

    fn export_csv(&self) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.csv_filename)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "index,energy")?;
        for (i, sample) in self.renderer.energy_history().iter().enumerate() {
            writeln!(writer, "{},{}", i, sample)?;
        }
        Ok(())
    }

    fn export_json(&self) -> io::Result<()> {
        let data = serde_json::json!({
            "mode": match self.mode { Mode::Field => "field", Mode::Wave => "wave" },
            "charges": self.charges.charges(),
            "contour_levels": self.level_count,
            "grid_resolution": self.grid_resolution,
            "arrow_spacing": self.arrow_spacing,
            "flow_speed": self.renderer.flow_speed,
            "wave_frequency": self.wave.frequency,
            "slab_eps": self.slab_eps,
            "tracer_speed": self.tracer_speed,
        });
        let file = File::create(&self.json_filename)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &data)?;
        Ok(())
    }

    fn export_png(&self) -> Result<(), image::ImageError> {
        let grid = ScalarGrid::sample(
            self.canvas_size.x,
            self.canvas_size.y,
            EXPORT_RESOLUTION,
            |x, y| self.charges.potential_at(x, y),
        );
        let (min_v, max_v) = grid.extent().unwrap_or((0.0, 0.0));
        let span = max_v - min_v;
        let map = self.renderer.colormap;
        let img = image::RgbaImage::from_fn(grid.cols() as u32, grid.rows() as u32, |x, y| {
            let v = grid.value(y as usize, x as usize);
            let t = if span > 0.0 { (v - min_v) / span } else { 0.5 };
            let c = map(t);
            image::Rgba([c.r(), c.g(), c.b(), 255])
        });
        img.save(&self.png_filename)?;
        Ok(())
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Fieldscope");
            ui.separator();

            egui::ComboBox::from_label("Mode")
                .selected_text(match self.mode {
                    Mode::Field => "Field",
                    Mode::Wave => "Wave",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.mode, Mode::Field, "Field");
                    ui.selectable_value(&mut self.mode, Mode::Wave, "Wave");
                });

            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "Pause" } else { "Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }
                if ui.button("Step").clicked() && !self.running {
                    self.advance_simulation(1.0 / 60.0);
                }
                if ui.button("Reset").clicked() {
                    self.reset_simulation();
                }
            });

            ui.separator();
            ui.heading("Layers");
            ui.checkbox(&mut self.show_contours, "Contours");
            ui.checkbox(&mut self.show_arrows, "Field arrows");
            ui.checkbox(&mut self.show_flow, "Flow particles");
            ui.checkbox(&mut self.show_tracers, "Tracer trails");
            ui.checkbox(&mut self.show_energy, "Energy chart");
            if ui.checkbox(&mut self.hue_contours, "Hue contour palette").changed() {
                self.renderer.palette = if self.hue_contours {
                    ContourPalette::HueRamp
                } else {
                    ContourPalette::Diverging
                };
            }

            ui.separator();
            ui.heading("Field");
            ui.add(egui::Slider::new(&mut self.level_count, 4..=24).text("Contour Levels"));
            ui.add(egui::Slider::new(&mut self.grid_resolution, 8.0..=40.0).text("Grid Resolution"));
            ui.add(egui::Slider::new(&mut self.arrow_spacing, 24.0..=96.0).text("Arrow Spacing"));
            ui.add(egui::Slider::new(&mut self.renderer.flow_speed, 0.0..=2.5).text("Flow Speed"));
            ui.add(egui::Slider::new(&mut self.tracer_speed, 20.0..=200.0).text("Tracer Launch Speed"));

            ui.separator();
            ui.heading("Presets");
            ui.horizontal(|ui| {
                if ui.button("Single").clicked() {
                    self.apply_preset(Preset::Single);
                }
                if ui.button("Dipole").clicked() {
                    self.apply_preset(Preset::Dipole);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Quadrupole").clicked() {
                    self.apply_preset(Preset::Quadrupole);
                }
                if ui.button("Random").clicked() {
                    self.apply_preset(Preset::Random);
                }
                if ui.button("Clear").clicked() {
                    self.charges.clear();
                    self.needs_reseed = true;
                }
            });

            ui.separator();
            ui.heading("Wave");
            ui.add(egui::Slider::new(&mut self.wave.frequency, 0.5..=8.0).text("Frequency"));
            if ui
                .add(egui::Slider::new(&mut self.slab_eps, 1.0..=4.0).text("Slab Permittivity"))
                .changed()
            {
                self.wave.set_slab(SLAB_SPAN.0, SLAB_SPAN.1, self.slab_eps);
            }

            ui.separator();
            ui.heading("Readout");
            ui.label(format!("FPS: {:.0}", self.fps));
            ui.label(format!("Charges: {}", self.charges.len()));
            ui.label(format!(
                "Flow particles: {} on {} lines",
                self.renderer.flow_particle_count(),
                self.renderer.field_line_count()
            ));
            ui.label(format!("Tracers: {}", self.tracers.len()));

            ui.separator();
            ui.heading("Export");
            ui.add(egui::TextEdit::singleline(&mut self.csv_filename).hint_text("CSV Filename"));
            if ui.button("Export Energy CSV").clicked() {
                if let Err(e) = self.export_csv() {
                    log::warn!("csv export failed: {e}");
                    self.error_msg = format!("CSV Export Error: {}", e);
                } else {
                    log::info!("energy history written to {}", self.csv_filename);
                }
            }
            ui.add(egui::TextEdit::singleline(&mut self.json_filename).hint_text("JSON Filename"));
            if ui.button("Export Params JSON").clicked() {
                if let Err(e) = self.export_json() {
                    log::warn!("json export failed: {e}");
                    self.error_msg = format!("JSON Export Error: {}", e);
                } else {
                    log::info!("parameters written to {}", self.json_filename);
                }
            }
            ui.add(egui::TextEdit::singleline(&mut self.png_filename).hint_text("PNG Filename"));
            if ui.button("Export Potential PNG").clicked() {
                if self.canvas_size.length() < 1.0 {
                    self.error_msg = "PNG Export Error: canvas not laid out yet".to_string();
                } else if let Err(e) = self.export_png() {
                    log::warn!("png export failed: {e}");
                    self.error_msg = format!("PNG Export Error: {}", e);
                } else {
                    log::info!("potential map written to {}", self.png_filename);
                }
            }

            ui.separator();
            ui.label("Click: add + charge");
            ui.label("Shift+Click: add - charge");
            ui.label("Right-click: launch tracer");
        });
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;

            self.renderer.resize(rect.width(), rect.height());
            if (self.canvas_size - rect.size()).length() > 1.0 {
                self.canvas_size = rect.size();
                self.needs_reseed = true;
            }

            let hover = response.hover_pos();
            self.renderer.set_pointer(hover.map(|p| {
                vec2(
                    (p.x - rect.left()) / rect.width().max(1.0),
                    (p.y - rect.top()) / rect.height().max(1.0),
                )
            }));

            if self.mode == Mode::Field {
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let local = pos - rect.left_top();
                        let q = if ctx.input(|i| i.modifiers.shift) {
                            -1.0
                        } else {
                            1.0
                        };
                        self.charges.add(local.x, local.y, q);
                        self.needs_reseed = true;
                    }
                }
                if response.secondary_clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let local = pos - rect.left_top();
                        self.launch_tracer(pos2(local.x, local.y));
                    }
                }
            }

            if self.needs_reseed && rect.width() > 1.0 {
                let lines = self.charges.trace_field_lines(rect.width(), rect.height());
                self.renderer.seed_flow(lines, &mut self.rng);
                self.needs_reseed = false;
            }

            self.renderer.clear(&painter, rect);
            match self.mode {
                Mode::Field => {
                    if self.show_contours && !self.charges.is_empty() {
                        let grid = ScalarGrid::sample(
                            rect.width(),
                            rect.height(),
                            self.grid_resolution,
                            |x, y| self.charges.potential_at(x, y),
                        );
                        self.renderer
                            .draw_contours(&painter, rect, &grid, self.level_count);
                    }
                    if self.show_arrows {
                        self.renderer.draw_vector_field(
                            &painter,
                            rect,
                            self.arrow_spacing,
                            &|p| self.charges.field_at(p.x, p.y),
                        );
                    }
                    if self.show_flow {
                        self.renderer.draw_flow_lines(&painter, rect);
                    }
                    if self.show_tracers {
                        for tracer in &self.tracers {
                            self.renderer.draw_tracer(&painter, rect, tracer.trail());
                        }
                    }
                    let glyphs: Vec<(Pos2, f32)> = self
                        .charges
                        .charges()
                        .iter()
                        .map(|c| (c.position(), c.charge))
                        .collect();
                    self.renderer.draw_charges(&painter, rect, &glyphs);

                    if let Some(p) = hover {
                        let local = p - rect.left_top();
                        let potential = self.charges.potential_at(local.x, local.y);
                        let field = self.charges.field_at(local.x, local.y);
                        self.renderer
                            .draw_probe(&painter, rect, potential, field.length());
                    }
                }
                Mode::Wave => {
                    let strip = rect.shrink2(vec2(24.0, rect.height() * 0.2));
                    self.renderer.draw_wave_strip(
                        &painter,
                        strip,
                        self.wave.ey(),
                        self.wave.hz(),
                        self.wave.material(),
                        self.wave.source_cell(),
                    );
                }
            }

            if self.show_energy {
                let chart = Rect::from_min_size(
                    pos2(rect.right() - 236.0, rect.bottom() - 116.0),
                    vec2(220.0, 100.0),
                );
                if rect.contains_rect(chart) {
                    self.renderer.draw_energy_graph(&painter, chart);
                }
            }
        });
    }
}

impl Default for FieldscopeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for FieldscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = self.frame_dt();
        if self.running {
            self.advance_simulation(dt);
        }

        self.side_panel(ctx);
        self.canvas(ctx);

        if !self.error_msg.is_empty() {
            egui::Window::new("Error").show(ctx, |ui| {
                ui.label(&self.error_msg);
                if ui.button("Close").clicked() {
                    self.error_msg.clear();
                }
            });
        }

        ctx.request_repaint();
    }
}
