/// Level loader with pack support.
///
/// ## Sources (priority order):
///   1. Pack file named by `general.levels_file` (searched next to the
///      executable, then CWD, then XDG/system data dirs)
///   2. Built-in embedded stages
///
/// ## Pack format:
///   ```text
///   ## Pack Name
///   ## Author: name
///   ---
///   # Stage 1 - Name
///   ! wrap
///   <map rows>
///   ---
///   # Stage 2 - Name
///   <map rows>
///   ```
///
/// Stages are separated by a line containing only `---`.
/// Pack metadata lines start with `##` and only appear before the first `---`.
/// A file without any `---` is read as a single stage.
/// `! wrap` makes the stage toroidal.
///
/// ## Tile legend:
///   '#' = Wall           'P' / '@' = Actor
///   'a' = Target A       'b' = Target B
///   'S' = Slide block    'x' = Toggle target
///   '.' / ' ' = Floor    '0'..'6' = raw tile code
///
/// Levels are assumed valid; unknown glyphs read as floor and ragged rows
/// are padded with floor.

use std::path::{Path, PathBuf};

use crate::config::{candidate_dirs, GameConfig};
use crate::domain::grid::{Grid, Topology};
use crate::domain::tile::Tile;

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    pub topology: Topology,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackInfo {
    pub name: String,
    pub author: String,
}

pub struct LevelPack {
    pub info: PackInfo,
    pub levels: Vec<LevelDef>,
}

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("cannot read level pack {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level pack {} contains no stages", .0.display())]
    Empty(PathBuf),
}

impl LevelDef {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// The immutable base layer a stage is built from and reset to.
    pub fn base_layer(&self) -> Grid {
        let width = self.width();
        let mut grid = Grid::new(width, self.height(), self.topology);
        for (y, row) in self.rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set(x as i32, y as i32, tile_for_glyph(ch).unwrap_or(Tile::Floor));
            }
        }
        grid
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read every stage from one pack file.
pub fn load_pack_file(path: &Path) -> Result<Vec<LevelDef>, LevelError> {
    read_pack(path).map(|pack| pack.levels)
}

/// The configured pack, or the embedded stages if it cannot be used.
pub fn load_pack(config: &GameConfig) -> LevelPack {
    for dir in candidate_dirs() {
        let path = dir.join(&config.levels_file);
        if !path.is_file() { continue; }
        match read_pack(&path) {
            Ok(pack) => {
                log::info!("loaded {} stages from {}", pack.levels.len(), path.display());
                return pack;
            }
            Err(e) => log::warn!("{e}; trying next location"),
        }
    }
    log::info!("no usable {} found, using built-in stages", config.levels_file);
    LevelPack {
        info: PackInfo { name: "Built-in".to_string(), author: String::new() },
        levels: embedded_levels(),
    }
}

fn read_pack(path: &Path) -> Result<LevelPack, LevelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    let pack = parse_pack(&content);
    if pack.levels.is_empty() {
        return Err(LevelError::Empty(path.to_path_buf()));
    }
    Ok(pack)
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_pack(content: &str) -> LevelPack {
    let info = parse_pack_info(content);

    if !content.lines().any(|l| l.trim() == "---") {
        let levels = parse_stage(content).into_iter().collect();
        return LevelPack { info, levels };
    }

    let mut levels = vec![];
    let mut current_section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        if line.trim() == "---" {
            if in_levels {
                levels.extend(parse_stage(&current_section));
            }
            current_section.clear();
            in_levels = true;
            continue;
        }
        // Pack metadata lives before the first separator
        if !in_levels { continue; }
        current_section.push_str(line);
        current_section.push('\n');
    }
    levels.extend(parse_stage(&current_section));

    LevelPack { info, levels }
}

fn parse_pack_info(content: &str) -> PackInfo {
    let mut info = PackInfo::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed == "---" { break; }
        if let Some(author) = trimmed.strip_prefix("## Author:") {
            info.author = author.trim().to_string();
        } else if let Some(name) = trimmed.strip_prefix("##") {
            if info.name.is_empty() {
                info.name = name.trim().to_string();
            }
        }
    }
    info
}

// ══════════════════════════════════════════════════════════════
// Single-stage parsing
// ══════════════════════════════════════════════════════════════

fn parse_stage(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut topology = Topology::Bounded;
    let mut rows: Vec<String> = vec![];

    for line in content.lines() {
        let line = line.trim_end();
        if rows.is_empty() && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if let Some(directive) = line.strip_prefix('!') {
            if directive.trim().eq_ignore_ascii_case("wrap") {
                topology = Topology::Toroidal;
            }
        } else if rows.is_empty() && line.trim().is_empty() {
            continue;
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < max_width {
            row.extend(std::iter::repeat('.').take(max_width - len));
        }
    }

    if name.is_empty() {
        name = "Untitled Stage".to_string();
    }

    Some(LevelDef { name, rows, topology })
}

/// Distinguish `# Stage Name` from `#P..a#` (map data).
/// A name line starts with a single `#` and either has a space right after
/// it followed by text, or contains something that is not a map glyph.
/// A map's first row therefore cannot open with `# `; use `.` for floor.
fn is_name_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('#') else { return false };
    if rest.starts_with('#') { return false; }
    let spaced = rest.starts_with(' ') && !rest.trim().is_empty();
    spaced || rest.chars().any(|c| tile_for_glyph(c).is_none())
}

pub fn tile_for_glyph(ch: char) -> Option<Tile> {
    match ch {
        '.' | ' ' => Some(Tile::Floor),
        '#' => Some(Tile::Wall),
        'P' | '@' => Some(Tile::Actor),
        'a' => Some(Tile::TargetA),
        'b' => Some(Tile::TargetB),
        'S' => Some(Tile::SlideBlock),
        'x' => Some(Tile::Toggle),
        '0'..='6' => ch.to_digit(10).and_then(|d| Tile::from_code(d as u16)),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback stages
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Break", Topology::Bounded, &[
            "#########",
            "#P...#..#",
            "#.......#",
            "#...a...#",
            "#.......#",
            "#########",
        ]),
        make_embedded("Soft Wall", Topology::Bounded, &[
            "##########",
            "#P....#..#",
            "#........#",
            "#....b...#",
            "#...a....#",
            "##########",
        ]),
        make_embedded("Pusher", Topology::Bounded, &[
            "#########",
            "#P......#",
            "#S......#",
            "#.....a.#",
            "#.......#",
            "#########",
        ]),
        make_embedded("Switch", Topology::Bounded, &[
            "#########",
            "#P......#",
            "#.......#",
            "#x.a.b..#",
            "##......#",
            "#########",
        ]),
        make_embedded("Tandem", Topology::Bounded, &[
            "#########",
            "#P.P....#",
            "#.......#",
            "#.......#",
            "#......a#",
            "#########",
        ]),
        make_embedded("Wraparound", Topology::Toroidal, &[
            "#....",
            "..#..",
            "..aP#",
            ".#...",
            "...#.",
        ]),
    ]
}

fn make_embedded(name: &str, topology: Topology, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
        topology,
    }
}
