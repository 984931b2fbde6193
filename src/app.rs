use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::logging::init_logging;
use crate::phase::Phase;
use crate::render::{
    canvas_to_cells, draw_center_box, draw_panel, draw_star, draw_star_ascii, Anim, Backdrop,
    Pixel, Terminal, Viewport, HELP_TEXT,
};
use crate::sim::{Simulation, PRESETS};
use crate::Args;
use std::cmp::{max, min};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Main,
    Help,
}

pub(crate) struct App {
    settings: Settings,
    /// What was on disk; only display toggles are written back.
    stored: Settings,
    paths: Paths,
    save_on_exit: bool,
    sim: Simulation,
    term: Terminal,
    backdrop: Backdrop,
    scene: Scene,
    should_quit: bool,
    started_at: Instant,
    shown_phase: Phase,
    phase_since: Instant,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let stored = load_settings(&paths.settings_path);

        let mut settings = stored.clone();
        settings.apply_args(args);
        let settings = settings.sanitized();

        init_logging(settings.log_file.as_deref())?;
        info!(
            settings = %paths.settings_path.display(),
            mass = settings.initial_mass,
            tick_ms = settings.tick_ms,
            phase_ms = settings.phase_ms,
            "starting session"
        );

        let mut sim = Simulation::new(settings.initial_mass, settings.clock());
        if args.autostart {
            sim.start();
        }

        let term = Terminal::begin()?;
        let now = Instant::now();

        Ok(Self {
            backdrop: Backdrop::new(settings.seed, 140),
            settings,
            stored,
            paths,
            save_on_exit: !args.no_save,
            sim,
            term,
            scene: Scene::Main,
            should_quit: false,
            started_at: now,
            shown_phase: Phase::MainSequence,
            phase_since: now,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap;
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        let mut last_frame = Instant::now();

        while !self.should_quit {
            self.term.resize_if_needed()?;

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(self.scene, &ev) {
                    self.apply(action);
                    if self.should_quit {
                        break;
                    }
                }
            }

            // sim
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            self.sim.advance(real_dt);

            let phase = self.sim.state().phase;
            if phase != self.shown_phase {
                self.shown_phase = phase;
                self.phase_since = now;
            }

            // render
            self.render_frame(now)?;

            // frame cap
            spin_sleep(frame_dt, Instant::now());
        }

        Ok(())
    }

    fn apply(&mut self, action: Action) {
        debug!(?action, "input");
        match action {
            Action::StartPause => self.sim.toggle(),
            Action::Reset => self.sim.reset(),
            Action::NudgeMass(steps) => self.sim.nudge_mass(steps),
            Action::Preset(i) => {
                if let Some(p) = PRESETS.get(i) {
                    info!(preset = p.name, "preset selected");
                    self.sim.set_mass(p.mass);
                }
            }
            Action::ToggleBraille => self.settings.enable_braille = !self.settings.enable_braille,
            Action::ToggleColor => self.settings.enable_color = !self.settings.enable_color,
            Action::HelpToggle => {
                self.scene = match self.scene {
                    Scene::Help => Scene::Main,
                    Scene::Main => Scene::Help,
                };
            }
            Action::Back => self.scene = Scene::Main,
            Action::Quit => self.should_quit = true,
        }
    }

    fn render_frame(&mut self, now: Instant) -> anyhow::Result<()> {
        let bg = crossterm::style::Color::Black;
        self.term.cur.clear(bg);

        let obs = self.sim.observe();
        let anim = Anim {
            t: now.saturating_duration_since(self.started_at).as_secs_f32(),
            phase_t: now.saturating_duration_since(self.phase_since).as_secs_f32(),
        };

        // Left panel for text; star stage on the right, above the key line.
        let cols = self.term.cols as i32;
        let rows = self.term.rows as i32;
        let panel_w = max(0, min(max(44, cols * 2 / 5), cols - 10));
        let stage_x = panel_w;
        let stage_w = cols - stage_x;
        let stage_h = max(0, rows - 1);

        if self.settings.enable_braille {
            self.term.canvas.clear(Pixel::default());
            let vp = Viewport {
                x: stage_x * 2,
                y: 0,
                w: stage_w * 2,
                h: stage_h * 4,
            };
            self.backdrop.draw(&mut self.term.canvas, vp, anim.t);
            draw_star(&mut self.term.canvas, &obs, vp, anim);
            canvas_to_cells(
                &self.term.canvas,
                &mut self.term.cur,
                self.settings.enable_color,
                bg,
            );
        } else {
            let vp = Viewport {
                x: stage_x,
                y: 0,
                w: stage_w,
                h: stage_h,
            };
            draw_star_ascii(&mut self.term.cur, &obs, vp, anim, self.settings.enable_color);
        }

        draw_panel(&mut self.term.cur, &obs, &self.settings, panel_w as u16);

        if self.scene == Scene::Help {
            draw_center_box(&mut self.term.cur, "How it works", HELP_TEXT);
        }

        self.term.present(true)?;
        Ok(())
    }

    fn persist_settings(&mut self) -> anyhow::Result<()> {
        if !self.save_on_exit {
            return Ok(());
        }
        let mut out = self.stored.clone();
        out.enable_braille = self.settings.enable_braille;
        out.enable_color = self.settings.enable_color;
        if out != self.stored {
            save_settings_atomic(&self.paths.settings_path, &out)?;
            self.stored = out;
        }
        Ok(())
    }
}

pub(crate) fn run(args: &Args) -> anyhow::Result<()> {
    let mut app = App::init(args)?;
    let res = app.run();
    // restore the terminal before reporting anything
    let restored = app.term.end();
    res?;
    restored?;
    app.persist_settings()?;
    info!("session ended");
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
