/// Entry point and game loop.
///
/// The binary is the input and render collaborator for the `slidebreak`
/// library: it turns keyboard and gamepad state into one `FrameInput` per
/// tick, steps the stage at a fixed rate, and redraws every frame.

mod ui;

use std::time::{Duration, Instant};

use env_logger::Env;

use slidebreak::config::GameConfig;
use slidebreak::domain::entity::FrameInput;
use slidebreak::domain::grid::{Grid, Topology};
use slidebreak::sim::level::{self, LevelPack};
use slidebreak::sim::{step, StageEvent, StageSimulation, UndoRefusal};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_QUIT, KEYS_RESTART, KEYS_UNDO};
use ui::renderer::{Renderer, Screen};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MESSAGE_TICKS: u32 = 60;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Board cleared; waiting for confirm to load the next stage.
    Cleared,
    /// The last stage of the pack is cleared.
    Complete,
}

/// Everything the loop owns between frames.
struct Session {
    config: GameConfig,
    pack: LevelPack,
    stage: StageSimulation,
    phase: Phase,
    message: String,
    message_timer: u32,
}

impl Session {
    fn new(config: GameConfig, pack: LevelPack) -> Self {
        let start = config.start_stage.min(pack.levels.len().saturating_sub(1));
        let stage = build_stage(&pack, start, &config);
        Session { config, pack, stage, phase: Phase::Playing, message: String::new(), message_timer: 0 }
    }

    fn load(&mut self, index: usize) {
        self.stage = build_stage(&self.pack, index, &self.config);
        self.phase = Phase::Playing;
        self.set_message(&format!("Stage {}", index + 1));
    }

    fn stage_name(&self) -> &str {
        self.pack.levels.get(self.stage.stage_index())
            .map(|def| def.name.as_str())
            .unwrap_or("")
    }

    fn set_message(&mut self, text: &str) {
        self.message = text.to_string();
        self.message_timer = MESSAGE_TICKS;
    }

    /// Translate step events into HUD feedback and phase changes.
    fn absorb(&mut self, events: &[StageEvent]) {
        for event in events {
            match event {
                StageEvent::TargetsToggled => self.set_message("Targets toggled"),
                StageEvent::UndoRefused(UndoRefusal::NothingToUndo) => self.set_message("Nothing to undo"),
                StageEvent::UndoRefused(UndoRefusal::Busy) => self.set_message("Wait for the board to settle"),
                StageEvent::Restarted => self.set_message("Stage restarted"),
                StageEvent::StageCleared => log::info!("stage {} cleared", self.stage.stage_index() + 1),
                _ => {}
            }
        }
        // Undo can bring a cleared board back into play.
        self.phase = if self.stage.is_cleared() { Phase::Cleared } else { Phase::Playing };
    }

    /// Confirm on a cleared stage: next stage, or the end of the pack.
    fn advance(&mut self) {
        match self.stage.next_stage_index() {
            Some(next) if next < self.pack.levels.len() => self.load(next),
            Some(_) => self.phase = Phase::Complete,
            None => {}
        }
    }

    fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}

fn build_stage(pack: &LevelPack, index: usize, config: &GameConfig) -> StageSimulation {
    let base = pack.levels.get(index)
        .map(|def| def.base_layer())
        .unwrap_or_else(|| Grid::new(1, 1, Topology::Bounded));
    StageSimulation::new(index, base, config.sim())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let pack = level::load_pack(&config);
    let mut session = Session::new(config, pack);

    // A panic inside the loop (e.g. two slides launched on one tick) must
    // not leave the shell in raw mode on the alternate screen.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = ui::renderer::restore_terminal();
        default_hook(info);
    }));

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
}

fn game_loop(session: &mut Session, renderer: &mut Renderer) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&session.config.gamepad);
    let tick_rate = Duration::from_millis(session.config.timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    // Edge-triggered requests latched until the next tick consumes them.
    let mut pending_undo = false;
    let mut pending_restart = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        pending_undo |= kb.any_pressed(KEYS_UNDO) || gp.undo_pressed();
        pending_restart |= kb.any_pressed(KEYS_RESTART) || gp.restart_pressed();

        if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
            match session.phase {
                Phase::Cleared => session.advance(),
                Phase::Complete => session.load(0),
                Phase::Playing => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if session.phase != Phase::Complete {
                let input = FrameInput {
                    movement: kb.movement().or_else(|| gp.movement()),
                    undo: pending_undo,
                    restart: pending_restart,
                };
                let events = step(&mut session.stage, input);
                session.absorb(&events);
            }
            pending_undo = false;
            pending_restart = false;
            session.tick_message();
            last_tick = Instant::now();
        }

        renderer.render(&Screen {
            stage: &session.stage,
            stage_name: session.stage_name(),
            pack_name: &session.pack.info.name,
            stage_count: session.pack.levels.len(),
            phase: session.phase,
            message: &session.message,
            gamepad: gp.connected,
        })?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
