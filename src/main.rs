use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use sky_battle::audio::{SilentPlayer, TrackId};
use sky_battle::collaborators::{InputEvent, LevelFactory};
use sky_battle::config::{GameConfig, CONFIG_PATH};
use sky_battle::display::{self, TerminalScene};
use sky_battle::entities::Choice;
use sky_battle::error::GameError;
use sky_battle::progression::{Campaign, Game};

type TerminalGame = Game<TerminalScene, SilentPlayer, Campaign>;

// ── Held-key detection ────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// at 20 FPS a window of 3 frames (150 ms) outlasts the OS repeat interval.
const HOLD_WINDOW: u64 = 3;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Title screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "✈  SKY  BATTLE  ✈";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(4),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let lines: &[(&str, Color)] = &[
        ("Survive two waves, then bring down the boss.", Color::White),
        ("ENTER : Start   Q : Quit", Color::DarkGrey),
        ("↑ ↓ / W S : Move   SPACE : Fire", Color::DarkGrey),
    ];
    for (i, (line, color)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(1) + (i as u16) * 2;
        out.queue(cursor::MoveTo(cx.saturating_sub(line.chars().count() as u16 / 2), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*line))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Movement keys are tracked in a `key_frame` map (frame of last press or
/// repeat) so Up/Down count as held between repeats, and a release event or
/// the hold window expiring turns into a `Stop` command.  Fire is one shot
/// per press or repeat event.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut TerminalGame,
    rx: &mpsc::Receiver<Event>,
    tick: Duration,
) -> Result<(), GameError> {
    let mut rng = thread_rng();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                            if kind == KeyEventKind::Press =>
                        {
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char(' ') => {
                            game.handle_input(InputEvent::Fire, Instant::now(), &mut rng);
                        }
                        KeyCode::Char('n') | KeyCode::Char('N') if kind == KeyEventKind::Press => {
                            game.choose(Choice::NextLevel);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if kind == KeyEventKind::Press => {
                            game.choose(Choice::Restart);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Movement from held keys ───────────────────────────────────────────
        let up = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]
            .iter()
            .any(|k| is_held(&key_frame, k, frame));
        let down = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]
            .iter()
            .any(|k| is_held(&key_frame, k, frame));
        let movement = match (up, down) {
            (true, false) => InputEvent::MoveUp,
            (false, true) => InputEvent::MoveDown,
            _ => InputEvent::Stop,
        };
        let now = Instant::now();
        game.handle_input(movement, now, &mut rng);

        game.frame(now, &mut rng);
        game.generate_enemy_fire(now, &mut rng);

        let (width, height) = terminal::size()?;
        display::render(out, game.presentation(), game.level(), width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < tick {
            thread::sleep(tick - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    // The terminal is in raw mode, so logging stays off unless RUST_LOG is
    // set (redirect stderr to a file to read it).
    let env = env_logger::Env::default().default_filter_or("off");
    env_logger::Builder::from_env(env).init();

    let config = GameConfig::load(CONFIG_PATH);
    let game = build_game(&config)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the tick never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let tick = Duration::from_millis(config.world.tick_millis);
    let result = run(&mut out, game, &rx, tick);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

/// Construction failures here are the only fatal errors.
fn build_game(config: &GameConfig) -> Result<TerminalGame, GameError> {
    let mut campaign = Campaign::new(config.clone());
    let level = campaign.first_level(Instant::now())?;

    let mut tracks = HashMap::new();
    tracks.insert(TrackId::Background, PathBuf::from(&config.audio.background_music));
    let audio = SilentPlayer::new(tracks, config.audio.volume);

    let scene = TerminalScene::new(config.glyphs.clone());
    Game::new(level, scene, audio, campaign)
}

fn run<W: Write>(
    out: &mut W,
    mut game: TerminalGame,
    rx: &mpsc::Receiver<Event>,
    tick: Duration,
) -> Result<(), GameError> {
    match show_menu(out, rx)? {
        MenuResult::Quit => Ok(()),
        MenuResult::Start => game_loop(out, &mut game, rx, tick),
    }
}
