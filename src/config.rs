/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::sim::SimConfig;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub history_depth: usize,
    pub particles_per_target: u32,
    pub gamepad: GamepadConfig,
    pub levels_file: String,
    pub start_stage: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub move_ticks: u32,            // ticks to cross one cell
    pub slide_ticks_per_cell: u32,  // pushed block travel time per cell
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub undo: Vec<String>,
    pub restart: Vec<String>,
    pub confirm: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    history: TomlHistory,
    #[serde(default)]
    effects: TomlEffects,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move_ticks")]
    move_ticks: u32,
    #[serde(default = "default_slide_ticks")]
    slide_ticks_per_cell: u32,
}

#[derive(Deserialize, Debug)]
struct TomlHistory {
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

#[derive(Deserialize, Debug)]
struct TomlEffects {
    #[serde(default = "default_particles")]
    particles_per_target: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_undo")]
    undo: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_file")]
    levels_file: String,
    #[serde(default)]
    start_stage: usize,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 ticks per second
fn default_move_ticks() -> u32 { 10 }
fn default_slide_ticks() -> u32 { 10 }
fn default_max_depth() -> usize { 256 }
fn default_particles() -> u32 { 24 }

fn default_undo() -> Vec<String> { vec!["B".into(), "L1".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_levels_file() -> String { "levels.txt".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            move_ticks: default_move_ticks(),
            slide_ticks_per_cell: default_slide_ticks(),
        }
    }
}

impl Default for TomlHistory {
    fn default() -> Self {
        TomlHistory { max_depth: default_max_depth() }
    }
}

impl Default for TomlEffects {
    fn default() -> Self {
        TomlEffects { particles_per_target: default_particles() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            undo: default_undo(),
            restart: default_restart(),
            confirm: default_confirm(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: default_levels_file(),
            start_stage: 0,
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG / system data dirs.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        GameConfig::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse a config document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                move_ticks: cfg.timing.move_ticks.max(1),
                slide_ticks_per_cell: cfg.timing.slide_ticks_per_cell.max(1),
            },
            history_depth: cfg.history.max_depth,
            particles_per_target: cfg.effects.particles_per_target,
            gamepad: GamepadConfig {
                undo: cfg.gamepad.undo,
                restart: cfg.gamepad.restart,
                confirm: cfg.gamepad.confirm,
                quit: cfg.gamepad.quit,
            },
            levels_file: cfg.general.levels_file,
            start_stage: cfg.general.start_stage,
        }
    }

    /// The values the simulation core needs.
    pub fn sim(&self) -> SimConfig {
        SimConfig {
            move_ticks: self.timing.move_ticks,
            slide_ticks_per_cell: self.timing.slide_ticks_per_cell,
            history_depth: self.history_depth,
            particles_per_target: self.particles_per_target,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
pub(crate) fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to
        // the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/slidebreak)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/slidebreak");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/slidebreak)
    let sys = PathBuf::from("/usr/share/slidebreak");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("using {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{}: {}; using default settings", path.display(), ConfigError::from(e));
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
