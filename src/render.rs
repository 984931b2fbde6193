use crate::config::Settings;
use crate::phase::Phase;
use crate::sim::{Observation, PRESETS, SLIDER_MAX_MASS, SLIDER_MIN_MASS};
use crate::table::scaling_relations;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self, p: Pixel) {
        self.px.fill(p);
    }
    pub(crate) fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;

        // Braille: 2×4 pixels per cell
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        // prev no longer mirrors the screen
        execute!(self.out, ResetColor, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub(crate) fn canvas_to_cells(
    canvas: &PixelCanvas,
    out: &mut CellBuffer,
    enable_color: bool,
    bg: Color,
) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let mut mask: u8 = 0;
            let mut sum = [0u32; 3];
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = cx * 2 + dx;
                    let y = cy * 4 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];
                    // alpha threshold decides ink
                    if p.a >= 32 {
                        mask |= braille_bit(dx, dy);
                        sum[0] += p.r as u32;
                        sum[1] += p.g as u32;
                        sum[2] += p.b as u32;
                        ink_count += 1;
                    }
                }
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');

            let fg = if enable_color && ink_count > 0 {
                Color::Rgb {
                    r: (sum[0] / ink_count) as u8,
                    g: (sum[1] / ink_count) as u8,
                    b: (sum[2] / ink_count) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

/* -----------------------------
   Phase palette
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

const fn hex(v: u32) -> Rgb {
    Rgb {
        r: (v >> 16) as u8,
        g: (v >> 8) as u8,
        b: v as u8,
    }
}

impl Rgb {
    fn lerp(self, o: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t + 0.5) as u8;
        Rgb {
            r: mix(self.r, o.r),
            g: mix(self.g, o.g),
            b: mix(self.b, o.b),
        }
    }

    fn px(self, alpha: f32) -> Pixel {
        Pixel {
            r: self.r,
            g: self.g,
            b: self.b,
            a: (alpha.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        }
    }

    fn color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

pub(crate) const ACCENT: Rgb = hex(0x4ecdc4);
const WIND: Rgb = hex(0xffffff);
const FUSION: Rgb = hex(0xffff00);

pub(crate) struct StarStyle {
    /// Radial gradient, centre (0.0) to limb (1.0).
    pub(crate) stops: &'static [(f32, Rgb)],
    pub(crate) glow: Rgb,
    pub(crate) rim: Option<Rgb>,
}

pub(crate) fn star_style(phase: Phase) -> StarStyle {
    const fn three(a: u32, b: u32, c: u32) -> [(f32, Rgb); 3] {
        [(0.0, hex(a)), (0.7, hex(b)), (1.0, hex(c))]
    }
    static MAIN_SEQUENCE: [(f32, Rgb); 3] = three(0xffff00, 0xff8800, 0xff4400);
    static RED_GIANT: [(f32, Rgb); 3] = three(0xff4444, 0xcc0000, 0x880000);
    static HELIUM: [(f32, Rgb); 3] = three(0xffaa00, 0xff6600, 0xcc4400);
    static AGB: [(f32, Rgb); 3] = three(0xff6666, 0xdd2222, 0xaa0000);
    static NEBULA: [(f32, Rgb); 3] = three(0x66ffff, 0x2299ff, 0x0066cc);
    static WHITE_DWARF: [(f32, Rgb); 3] = three(0xffffff, 0xccccff, 0x8888ff);
    static NEUTRON: [(f32, Rgb); 3] = three(0x8888ff, 0x4444cc, 0x222288);
    static BLACK_HOLE: [(f32, Rgb); 3] = three(0x000000, 0x333333, 0x000000);
    static SUPERNOVA: [(f32, Rgb); 4] = [
        (0.0, hex(0xffffff)),
        (0.3, hex(0xffff44)),
        (0.6, hex(0xff4444)),
        (1.0, hex(0x8844ff)),
    ];

    match phase {
        Phase::MainSequence => StarStyle {
            stops: &MAIN_SEQUENCE,
            glow: hex(0xffff00),
            rim: None,
        },
        Phase::RedGiant => StarStyle {
            stops: &RED_GIANT,
            glow: hex(0xff4444),
            rim: None,
        },
        Phase::HeliumBurning => StarStyle {
            stops: &HELIUM,
            glow: hex(0xffaa00),
            rim: None,
        },
        Phase::AsymptoticGiant => StarStyle {
            stops: &AGB,
            glow: hex(0xff6666),
            rim: None,
        },
        Phase::PlanetaryNebula => StarStyle {
            stops: &NEBULA,
            glow: hex(0x66ffff),
            rim: None,
        },
        Phase::WhiteDwarf => StarStyle {
            stops: &WHITE_DWARF,
            glow: hex(0xffffff),
            rim: None,
        },
        Phase::Supernova => StarStyle {
            stops: &SUPERNOVA,
            glow: hex(0xffffff),
            rim: None,
        },
        Phase::NeutronStar => StarStyle {
            stops: &NEUTRON,
            glow: hex(0x8888ff),
            rim: None,
        },
        Phase::BlackHole => StarStyle {
            stops: &BLACK_HOLE,
            glow: hex(0xffffff),
            rim: Some(hex(0xff4444)),
        },
    }
}

pub(crate) fn sample_gradient(stops: &[(f32, Rgb)], t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mut prev = stops[0];
    for &stop in stops {
        if t <= stop.0 {
            if stop.0 <= prev.0 {
                return stop.1;
            }
            return prev.1.lerp(stop.1, (t - prev.0) / (stop.0 - prev.0));
        }
        prev = stop;
    }
    prev.1
}

/* -----------------------------
   Stage geometry and effects

   Sizes are in stage units: the stage is 400 units tall and the
   star's drawn diameter is 60·log10(10·R) units, capped at 200.
------------------------------ */

pub(crate) const STAGE_HEIGHT: f32 = 400.0;
const MAX_DIAMETER: f32 = 200.0;
const MIN_DIAMETER: f32 = 4.0;

pub(crate) fn visual_diameter(radius: f64) -> f32 {
    let d = 60.0 * (radius * 10.0).log10();
    if d.is_finite() {
        (d as f32).clamp(MIN_DIAMETER, MAX_DIAMETER)
    } else {
        MIN_DIAMETER
    }
}

/// Supernova swell: 1× → 3× → 1× over the first two seconds of the phase.
pub(crate) fn blast_scale(phase_t: f32) -> f32 {
    if !(0.0..2.0).contains(&phase_t) {
        return 1.0;
    }
    let u = phase_t / 2.0;
    if u < 0.5 {
        1.0 + 4.0 * u
    } else {
        3.0 - 4.0 * (u - 0.5)
    }
}

/// Fusion glow breathing on a 2 s period: (opacity, scale).
pub(crate) fn fusion_pulse(t: f32) -> (f32, f32) {
    let w = 0.5 - 0.5 * (TAU * t / 2.0).cos();
    (0.3 + 0.5 * w, 1.0 + 0.1 * w)
}

/// Expanding wind shell on a 3 s loop: (diameter in stage units, opacity).
pub(crate) fn wind_ring(t: f32) -> (f32, f32) {
    let u = (t.rem_euclid(3.0)) / 3.0;
    let eased = 1.0 - (1.0 - u) * (1.0 - u);
    (STAGE_HEIGHT * eased, 1.0 - u)
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Anim {
    /// Seconds since the session started.
    pub(crate) t: f32,
    /// Seconds since the current phase was entered.
    pub(crate) phase_t: f32,
}

struct BackdropStar {
    x: f32,
    y: f32,
    twinkle: f32,
    brightness: f32,
}

pub(crate) struct Backdrop {
    stars: Vec<BackdropStar>,
}

impl Backdrop {
    pub(crate) fn new(seed: u64, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| BackdropStar {
                x: rng.gen_range(0.0..1.0),
                y: rng.gen_range(0.0..1.0),
                twinkle: rng.gen_range(0.0..TAU),
                brightness: rng.gen_range(0.25..0.9),
            })
            .collect();
        Self { stars }
    }

    pub(crate) fn draw(&self, canvas: &mut PixelCanvas, vp: Viewport, t: f32) {
        let tint = hex(0xb8c4ff);
        for s in &self.stars {
            let x = vp.x + (s.x * vp.w as f32) as i32;
            let y = vp.y + (s.y * vp.h as f32) as i32;
            let a = s.brightness * (0.6 + 0.4 * (t * 1.7 + s.twinkle).sin());
            canvas.blend_over(x, y, tint.px(a));
        }
    }
}

struct StarGeometry {
    /// Disc radius in sub-pixels.
    radius: f32,
    /// Outer edge of the glow in sub-pixels.
    glow: f32,
    units_to_px: f32,
}

fn star_geometry(obs: &Observation, stage_px: f32, anim: Anim) -> StarGeometry {
    let units_to_px = stage_px / STAGE_HEIGHT;
    let mut diameter = visual_diameter(obs.properties.radius);
    let mut shadow = 25.0;
    if obs.phase == Phase::Supernova {
        let s = blast_scale(anim.phase_t);
        diameter *= s;
        shadow *= s * s;
    }
    let radius = (diameter * 0.5 * units_to_px).max(1.0);
    StarGeometry {
        radius,
        glow: radius + shadow * units_to_px,
        units_to_px,
    }
}

pub(crate) fn draw_star(canvas: &mut PixelCanvas, obs: &Observation, vp: Viewport, anim: Anim) {
    let style = star_style(obs.phase);
    let geo = star_geometry(obs, vp.h as f32, anim);
    let cx = vp.x + vp.w / 2;
    let cy = vp.y + vp.h / 2;

    let reach = geo.glow.ceil() as i32;
    for y in -reach..=reach {
        for x in -reach..=reach {
            let d = ((x * x + y * y) as f32).sqrt();
            let p = if d <= geo.radius {
                match style.rim {
                    Some(rim) if d >= geo.radius - 1.5 => rim.px(1.0),
                    _ => sample_gradient(style.stops, d / geo.radius).px(0.95),
                }
            } else if d <= geo.glow {
                let fall = 1.0 - (d - geo.radius) / (geo.glow - geo.radius);
                style.glow.px(0.45 * fall * fall)
            } else {
                continue;
            };
            canvas.blend_over(cx + x, cy + y, p);
        }
    }

    if obs.phase.is_fusing() {
        let (opacity, scale) = fusion_pulse(anim.t);
        // 60% of the stage, transparent from 70% of its radius outward
        let r = 0.3 * vp.h as f32 * scale * 0.7;
        let reach = r.ceil() as i32;
        for y in -reach..=reach {
            for x in -reach..=reach {
                let d = ((x * x + y * y) as f32).sqrt();
                if d > r {
                    continue;
                }
                let a = 0.3 * opacity * (1.0 - d / r);
                canvas.blend_over(cx + x, cy + y, FUSION.px(a));
            }
        }
    }

    if obs.phase.sheds_material() {
        let (diameter, opacity) = wind_ring(anim.t);
        let r = diameter * 0.5 * geo.units_to_px;
        if r >= 1.0 {
            let steps = (TAU * r).ceil().max(8.0) as i32;
            for i in 0..steps {
                let a = TAU * i as f32 / steps as f32;
                let x = cx + (a.cos() * r).round() as i32;
                let y = cy + (a.sin() * r).round() as i32;
                canvas.blend_over(x, y, WIND.px(0.8 * opacity));
            }
        }
    }
}

/// Character-cell fallback for terminals without braille glyphs.
pub(crate) fn draw_star_ascii(
    buf: &mut CellBuffer,
    obs: &Observation,
    vp: Viewport,
    anim: Anim,
    enable_color: bool,
) {
    let style = star_style(obs.phase);
    // one cell is 2×4 sub-pixels
    let geo = star_geometry(obs, (vp.h * 4) as f32, anim);
    let cx = vp.x + vp.w / 2;
    let cy = vp.y + vp.h / 2;

    let reach_x = (geo.radius / 2.0).ceil() as i32 + 1;
    let reach_y = (geo.radius / 4.0).ceil() as i32 + 1;
    for y in -reach_y..=reach_y {
        for x in -reach_x..=reach_x {
            let dx = (x * 2) as f32;
            let dy = (y * 4) as f32;
            let t = (dx * dx + dy * dy).sqrt() / geo.radius;
            if t > 1.0 {
                continue;
            }
            let ch = match style.rim {
                Some(_) if t >= 0.75 => 'O',
                Some(_) => ' ',
                None if t < 0.35 => '@',
                None if t < 0.65 => 'O',
                None if t < 0.9 => 'o',
                None => '.',
            };
            let fg = match (enable_color, style.rim) {
                (false, _) => Color::White,
                (true, Some(rim)) => rim.color(),
                (true, None) => sample_gradient(style.stops, t).color(),
            };
            let (px, py) = (cx + x, cy + y);
            if px >= vp.x && px < vp.x + vp.w && py >= vp.y && py < vp.y + vp.h {
                buf.set(
                    px as u16,
                    py as u16,
                    Cell {
                        ch,
                        fg,
                        bg: Color::Black,
                    },
                );
            }
        }
    }
}

/* -----------------------------
   Side panel
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

pub(crate) fn bar(value01: f64, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f64 + 0.5) as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { '░' });
    }
    s.push(']');
    s
}

pub(crate) fn slider(mass: f64, width: usize) -> String {
    let width = width.max(2);
    let span = SLIDER_MAX_MASS - SLIDER_MIN_MASS;
    let t = ((mass - SLIDER_MIN_MASS) / span).clamp(0.0, 1.0);
    let knob = (t * (width - 1) as f64).round() as usize;
    (0..width)
        .map(|i| if i == knob { '●' } else { '─' })
        .collect()
}

/// Greedy word wrap; words longer than `width` are split.
pub(crate) fn wrap_text(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in s.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let wl = word.len();
        let ll = line.chars().count();
        if ll > 0 && ll + 1 + wl > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub(crate) fn status_label(obs: &Observation) -> &'static str {
    if obs.running {
        "▶ evolving"
    } else if obs.progress >= 1.0 {
        "■ complete"
    } else if obs.age > 0.0 {
        "❚❚ paused"
    } else {
        "● ready"
    }
}

pub(crate) fn stat_lines(obs: &Observation) -> [String; 4] {
    let p = obs.properties;
    [
        format!(
            "Age          {:>8} Myr of {}",
            obs.age.round() as i64,
            obs.max_age.round() as i64
        ),
        format!("Temperature  {:>8} K", p.temperature.round() as i64),
        format!("Radius       {:>8.3} R☉", p.radius),
        format!("Luminosity   {:>8.2} L☉", p.luminosity),
    ]
}

pub(crate) fn relation_lines(mass: f64) -> [String; 4] {
    let s = scaling_relations(mass);
    [
        format!("T = 5800 × M^0.5   = {} K", s.temperature.round() as i64),
        format!("R = M^0.8          = {:.3} R☉", s.radius),
        format!("L = M^3.5          = {:.2} L☉", s.luminosity),
        format!("τ = 10¹⁰ × M^-2.5 y ≈ {:.1} Gyr", s.lifetime_gyr),
    ]
}

pub(crate) fn draw_panel(buf: &mut CellBuffer, obs: &Observation, settings: &Settings, width: u16) {
    let bg = Color::Black;
    let tint = |c: Rgb| if settings.enable_color { c.color() } else { Color::White };
    let fg = Color::White;
    let dim = if settings.enable_color {
        Color::DarkGrey
    } else {
        Color::White
    };
    let accent = tint(ACCENT);
    let inner = width.saturating_sub(2) as usize;
    let x = 1;
    let mut y = 0u16;

    draw_text(buf, x, y, "Stellar Evolution Simulator", accent, bg);
    y += 2;

    let mass_line = format!(
        "Mass {} {:>4.1} M☉",
        slider(obs.mass, inner.saturating_sub(13)),
        obs.mass
    );
    draw_text(buf, x, y, &mass_line, fg, bg);
    y += 1;

    let mut px = x;
    for (i, preset) in PRESETS.iter().enumerate() {
        let label = format!("{} {} ", i + 1, preset.name);
        let col = if preset.mass == obs.mass { accent } else { dim };
        if px as usize + label.chars().count() > width as usize {
            break;
        }
        draw_text(buf, px, y, &label, col, bg);
        px += label.chars().count() as u16;
    }
    y += 2;

    draw_text(buf, x, y, obs.info.title, tint(star_style(obs.phase).stops[0].1), bg);
    let status = status_label(obs);
    let sx = width.saturating_sub(status.chars().count() as u16 + 1);
    if sx > x + obs.info.title.chars().count() as u16 {
        draw_text(buf, sx, y, status, accent, bg);
    }
    y += 1;
    for line in wrap_text(obs.info.description, inner).iter().take(5) {
        draw_text(buf, x, y, line, dim, bg);
        y += 1;
    }
    y += 1;

    let progress = format!(
        "{} {:>5.1}%",
        bar(obs.progress, inner.saturating_sub(9)),
        obs.progress * 100.0
    );
    draw_text(buf, x, y, "Stellar lifetime progress", accent, bg);
    y += 1;
    draw_text(buf, x, y, &progress, fg, bg);
    y += 2;

    for line in stat_lines(obs).iter() {
        draw_text(buf, x, y, line, fg, bg);
        y += 1;
    }
    y += 1;

    draw_text(buf, x, y, "Mass-property relations", accent, bg);
    y += 1;
    for line in relation_lines(obs.mass).iter() {
        draw_text(buf, x, y, line, dim, bg);
        y += 1;
    }
    y += 1;

    for (i, phase) in obs.sequence.iter().enumerate() {
        let (mark, col) = if i < obs.phase_index {
            ("✓", dim)
        } else if i == obs.phase_index {
            ("▸", tint(star_style(*phase).stops[0].1))
        } else {
            ("·", dim)
        };
        let info = phase.info();
        let line = if info.duration > 0.0 {
            format!("{mark} {:<26}~{:.1}%", info.title, info.duration * 100.0)
        } else {
            format!("{mark} {}", info.title)
        };
        draw_text(buf, x, y, &line, col, bg);
        y += 1;
    }

    let help = "space start/pause | r reset | ←→ mass | 1-4 presets | v render | c color | h help | q quit";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, dim, bg);
}

pub(crate) const HELP_TEXT: &str = "Pick an initial mass, then let the star age.\n\
Each phase gets an equal slice of the run.\n\n\
space/enter  start or pause\n\
r            reset to zero age\n\
←/→ -/+      change mass by 0.5 M☉\n\
1 2 3 4      Red Dwarf, Sun-like, Massive, Supergiant\n\
v / c        braille or ASCII / colour on or off\n\n\
Values come from interpolated observational data.\n\
The power laws are simplified approximations for\n\
main-sequence stars, shown for comparison.\n\n\
Esc or H to close help.";

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;
    let bw = 60.min(w.saturating_sub(4));
    let bh = 19.min(h.saturating_sub(4));
    if bw < 4 || bh < 4 {
        return;
    }
    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;
    let fg = Color::White;
    let bg = Color::Black;
    let put = |buf: &mut CellBuffer, x: u16, y: u16, ch: char| buf.set(x, y, Cell { ch, fg, bg });

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            put(buf, x, y, ' ');
        }
    }
    for x in x0..x0 + bw {
        put(buf, x, y0, '─');
        put(buf, x, y0 + bh - 1, '─');
    }
    for y in y0..y0 + bh {
        put(buf, x0, y, '│');
        put(buf, x0 + bw - 1, y, '│');
    }
    put(buf, x0, y0, '┌');
    put(buf, x0 + bw - 1, y0, '┐');
    put(buf, x0, y0 + bh - 1, '└');
    put(buf, x0 + bw - 1, y0 + bh - 1, '┘');

    draw_text(buf, x0 + 2, y0 + 1, title, fg, bg);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        let clipped: String = line.chars().take((bw - 4) as usize).collect();
        draw_text(buf, x0 + 2, yy, &clipped, fg, bg);
        yy += 1;
    }
}
