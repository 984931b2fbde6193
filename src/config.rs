use crate::sim::{snap_slider_mass, ClockConfig, DEFAULT_MASS};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) initial_mass: f64,
    pub(crate) tick_ms: u64,
    pub(crate) phase_ms: u64,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) enable_braille: bool,
    pub(crate) seed: u64,
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_mass: DEFAULT_MASS,
            tick_ms: 100,
            phase_ms: 5000,
            fps_cap: 30,
            enable_color: true,
            enable_braille: true,
            seed: 0x5EED_57A2_u64,
            log_file: None,
        }
    }
}

impl Settings {
    pub(crate) fn sanitized(mut self) -> Self {
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self.tick_ms = self.tick_ms.max(10);
        self.phase_ms = self.phase_ms.max(self.tick_ms);
        self.initial_mass = if self.initial_mass.is_finite() {
            snap_slider_mass(self.initial_mass)
        } else {
            DEFAULT_MASS
        };
        self
    }

    pub(crate) fn clock(&self) -> ClockConfig {
        ClockConfig {
            tick: Duration::from_millis(self.tick_ms),
            phase_span: Duration::from_millis(self.phase_ms),
        }
    }

    pub(crate) fn apply_args(&mut self, args: &crate::Args) {
        if let Some(m) = args.mass {
            self.initial_mass = m;
        }
        if let Some(t) = args.tick_ms {
            self.tick_ms = t;
        }
        if let Some(p) = args.phase_ms {
            self.phase_ms = p;
        }
        if let Some(f) = args.fps {
            self.fps_cap = f;
        }
        if let Some(s) = args.seed {
            self.seed = s;
        }
        if args.no_color {
            self.enable_color = false;
        }
        if args.ascii {
            self.enable_braille = false;
        }
        if let Some(ref path) = args.log_file {
            self.log_file = Some(path.clone());
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "stellarevo", "Stellarevo")
        .context("could not resolve project directories")?;
    let dir = proj.config_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("replacing {}", to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "initial_mass": 8.0, "enable_color": false }"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.initial_mass, 8.0);
        assert!(!s.enable_color);
        assert_eq!(s.tick_ms, 100);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let s = Settings {
            enable_braille: false,
            fps_cap: 60,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let s = Settings {
            initial_mass: 0.2,
            tick_ms: 0,
            phase_ms: 1,
            fps_cap: 1000,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(s.initial_mass, 0.5);
        assert_eq!(s.tick_ms, 10);
        assert_eq!(s.phase_ms, 10);
        assert_eq!(s.fps_cap, 240);

        let s = Settings {
            initial_mass: f64::NAN,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(s.initial_mass, DEFAULT_MASS);
    }

    #[test]
    fn clock_from_settings() {
        let c = Settings::default().clock();
        assert_eq!(c.tick, Duration::from_millis(100));
        assert_eq!(c.ticks_per_phase(), 50);
    }
}
