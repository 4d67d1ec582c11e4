/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the stage. Actors and the sliding block are
/// drawn at their interpolated positions on top of the static board, so
/// an `InFlight` or lifted `Actor` cell never shows through.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use slidebreak::domain::entity::Direction;
use slidebreak::domain::tile::Tile;
use slidebreak::sim::StageSimulation;

use crate::Phase;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty terminal cell, also used for
    /// `Clear(ClearType::All)` so row gaps match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs ──

/// Each board cell is two terminal columns wide so cells look square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FLOOR_BG: Color = Color::Rgb { r: 30, g: 30, b: 46 };

/// Glyph pair and colors for a static board cell.
fn tile_look(tile: Tile) -> ([char; 2], Color, Color) {
    match tile {
        Tile::Wall => (['█', '█'], Color::Rgb { r: 110, g: 110, b: 130 }, FLOOR_BG),
        Tile::TargetA => (['▓', '▓'], Color::Rgb { r: 60, g: 200, b: 230 }, FLOOR_BG),
        Tile::TargetB => (['▒', '▒'], Color::Rgb { r: 220, g: 90, b: 200 }, FLOOR_BG),
        Tile::Toggle => (['<', '>'], Color::Rgb { r: 120, g: 230, b: 90 }, FLOOR_BG),
        Tile::SlideBlock => SLIDE_LOOK,
        // Actors and in-flight blocks are drawn from their own positions.
        Tile::Floor | Tile::Actor | Tile::InFlight => (['·', ' '], Color::Rgb { r: 60, g: 60, b: 80 }, FLOOR_BG),
    }
}

const SLIDE_LOOK: ([char; 2], Color, Color) = (['[', ']'], Color::Rgb { r: 240, g: 200, b: 60 }, FLOOR_BG);
const ACTOR_FG: Color = Color::Rgb { r: 255, g: 140, b: 40 };

/// Actor glyph with an arrow on the side it last moved toward.
fn actor_look(facing: Direction) -> ([char; 2], Color, Color) {
    let chars = match facing {
        Direction::Up => ['◆', '▲'],
        Direction::Down => ['◆', '▼'],
        Direction::Left => ['◀', '◆'],
        Direction::Right => ['◆', '▶'],
    };
    (chars, ACTOR_FG, FLOOR_BG)
}

// ── Renderer ──

/// Leave the alternate screen and raw mode. Safe to call from a panic
/// hook, where the `Renderer` may be mid-frame.
pub fn restore_terminal() -> io::Result<()> {
    execute!(
        io::stdout(),
        ResetColor,
        cursor::Show,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()
}

/// Everything one frame shows. Built by the game loop each frame.
pub struct Screen<'a> {
    pub stage: &'a StageSimulation,
    pub stage_name: &'a str,
    pub pack_name: &'a str,
    pub stage_count: usize,
    pub phase: Phase,
    pub message: &'a str,
    pub gamepad: bool,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_stage: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_stage: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        restore_terminal()
    }

    pub fn render(&mut self, screen: &Screen) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        let stage_changed = self.last_stage != Some(screen.stage.stage_index());
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }
        if resized || stage_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_stage = Some(screen.stage.stage_index());
        }

        self.front.clear();
        self.compose_hud(screen);
        self.compose_board(screen.stage);
        self.compose_footer(screen);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors. ResetColor would fall back to the
        // terminal's own default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, screen: &Screen) {
        let stage = screen.stage;
        let hud = format!(
            " {}  Stage {}/{}: {}  Targets:{}  Undo:{}{} ",
            screen.pack_name,
            stage.stage_index() + 1,
            screen.stage_count,
            screen.stage_name,
            stage.targets_remaining(),
            stage.history_depth(),
            if screen.gamepad { "  [pad]" } else { "" },
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_board(&mut self, stage: &StageSimulation) {
        let grid = stage.grid();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = grid.get(x as i32, y as i32, Tile::Wall);
                self.put_glyph(x as f32, y as f32, grid.width(), tile_look(tile));
            }
        }

        if let Some((sx, sy)) = stage.slide_render_position() {
            self.put_glyph(sx, sy, grid.width(), SLIDE_LOOK);
        }
        for actor in stage.actors() {
            let (ax, ay) = stage.actor_render_position(actor);
            self.put_glyph(ax, ay, grid.width(), actor_look(actor.facing));
        }
    }

    /// Draw a two-column glyph at a fractional board position.
    /// Horizontal motion is shown at half-cell resolution; columns past the
    /// right edge wrap, which only happens on toroidal boards.
    fn put_glyph(&mut self, x: f32, y: f32, board_w: usize, look: ([char; 2], Color, Color)) {
        let (chars, fg, bg) = look;
        let span = (board_w * CELL_W) as i32;
        if span == 0 { return; }
        let col = (x * CELL_W as f32).round() as i32;
        let row = MAP_ROW + y.round().max(0.0) as usize;
        for (i, ch) in chars.into_iter().enumerate() {
            let c = (col + i as i32).rem_euclid(span) as usize;
            self.front.set(MAP_COL + c, row, Cell::new(ch, fg, bg));
        }
    }

    fn compose_footer(&mut self, screen: &Screen) {
        let board_h = screen.stage.grid().height();
        let msg_row = MAP_ROW + board_h + 1;
        let banner = match screen.phase {
            Phase::Playing => None,
            Phase::Cleared => Some("STAGE CLEAR!  [Enter] Next stage".to_string()),
            Phase::Complete => Some("ALL STAGES CLEAR!  [Enter] Play again  [Esc] Quit".to_string()),
        };
        let text = banner.or_else(|| (!screen.message.is_empty()).then(|| screen.message.to_string()));
        if let Some(text) = text {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" {text} "), Color::Black, MSG_BG);
        }

        let help = " Arrows/WASD:Move  U/Z:Undo  R:Restart  Esc:Quit  │  Pad: B/L1:Undo  Y:Restart";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }
}
