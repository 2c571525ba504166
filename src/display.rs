//! Terminal presentation: all crossterm I/O lives here.
//!
//! [`TerminalScene`] is the `Presentation` the simulation talks to; it only
//! records what should be on screen.  [`render`] turns that record plus the
//! level's actor positions into terminal commands once per frame.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::collaborators::Presentation;
use crate::config::WorldConfig;
use crate::entities::{Actor, ActorId, Bounds, Choice, LevelKind, Overlay, Sprite};
use crate::level::LevelEngine;

const FALLBACK_GLYPH: &str = "?";

const WIN_BANNER: [&str; 3] = [
    "╔══════════════════╗",
    "║     YOU  WIN     ║",
    "╚══════════════════╝",
];
const GAME_OVER_BANNER: [&str; 3] = [
    "╔══════════════════╗",
    "║    GAME  OVER    ║",
    "╚══════════════════╝",
];

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_LEVEL: Color = Color::Cyan;
const C_HUD_KILLS: Color = Color::Yellow;
const C_HUD_HEARTS: Color = Color::Red;
const C_SHIELD: Color = Color::Blue;
const C_HINT: Color = Color::DarkGrey;

fn sprite_color(sprite: Sprite) -> Color {
    match sprite {
        Sprite::UserPlane => Color::White,
        Sprite::EnemyPlane => Color::Green,
        Sprite::BossPlane => Color::Red,
        Sprite::UserFire => Color::Cyan,
        Sprite::EnemyFire => Color::Magenta,
        Sprite::Fireball => Color::DarkYellow,
    }
}

// ── Scene record ─────────────────────────────────────────────────────────────

struct Visual {
    sprite: Sprite,
    glyph: String,
}

pub struct TerminalScene {
    glyphs: HashMap<String, String>,
    missing_glyphs: HashSet<Sprite>,
    visuals: HashMap<ActorId, Visual>,
    overlays: HashSet<Overlay>,
    hearts: u32,
    choices: Vec<Choice>,
}

impl TerminalScene {
    pub fn new(glyphs: HashMap<String, String>) -> Self {
        TerminalScene {
            glyphs,
            missing_glyphs: HashSet::new(),
            visuals: HashMap::new(),
            overlays: HashSet::new(),
            hearts: 0,
            choices: Vec::new(),
        }
    }

    /// Configured glyph for `sprite`, or the fallback (warned once).
    fn glyph_for(&mut self, sprite: Sprite) -> String {
        if let Some(glyph) = self.glyphs.get(sprite.name()).filter(|g| !g.is_empty()) {
            return glyph.clone();
        }
        if self.missing_glyphs.insert(sprite) {
            log::warn!(
                "no glyph configured for {}; using {FALLBACK_GLYPH:?}",
                sprite.name()
            );
        }
        FALLBACK_GLYPH.to_string()
    }

    pub fn is_visible(&self, id: ActorId) -> bool {
        self.visuals.contains_key(&id)
    }

    pub fn has_overlay(&self, overlay: Overlay) -> bool {
        self.overlays.contains(&overlay)
    }

    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }
}

impl Presentation for TerminalScene {
    fn render(&mut self, actor: &Actor) {
        let visual = Visual {
            sprite: actor.sprite,
            glyph: self.glyph_for(actor.sprite),
        };
        self.visuals.insert(actor.id, visual);
    }

    fn remove(&mut self, actor: &Actor) {
        self.visuals.remove(&actor.id);
    }

    fn show_overlay(&mut self, overlay: Overlay) {
        self.overlays.insert(overlay);
    }

    fn hide_overlay(&mut self, overlay: Overlay) {
        self.overlays.remove(&overlay);
    }

    fn update_health_display(&mut self, hearts: u32) {
        self.hearts = hearts;
    }

    fn offer_choices(&mut self, choices: &[Choice]) {
        self.choices = choices.to_vec();
    }

    fn clear(&mut self) {
        self.visuals.clear();
        self.overlays.clear();
        self.hearts = 0;
        self.choices.clear();
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    scene: &TerminalScene,
    level: &LevelEngine,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, scene, level, width)?;

    for actor in level.actors() {
        if let Some(visual) = scene.visuals.get(&actor.id) {
            draw_actor(out, actor, visual, level, width, height)?;
        }
    }

    if scene.has_overlay(Overlay::Win) {
        draw_banner(out, &WIN_BANNER, Color::Green, width, height)?;
    } else if scene.has_overlay(Overlay::GameOver) {
        draw_banner(out, &GAME_OVER_BANNER, Color::Red, width, height)?;
    }
    if !scene.choices.is_empty() {
        draw_choices(out, &scene.choices, width, height)?;
    }

    draw_controls_hint(out, height)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    scene: &TerminalScene,
    level: &LevelEngine,
    width: u16,
) -> std::io::Result<()> {
    // Hearts on the left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEARTS))?;
    out.queue(Print("♥".repeat(scene.hearts as usize)))?;

    // Level in the centre
    let level_str = match level.kind() {
        LevelKind::One => "[ LEVEL 1 ]",
        LevelKind::Two => "[ LEVEL 2 ]",
        LevelKind::Boss => "[ BOSS ]",
    };
    let lx = (width / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(level_str))?;

    // Kills and shield on the right
    let mut right = format!(
        "Kills: {}/{}",
        level.kill_count(),
        level.config().kills_to_advance
    );
    if scene.has_overlay(Overlay::Shield) {
        right = format!("SHIELD  {right}");
    }
    let rx = width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    let color = if scene.has_overlay(Overlay::Shield) {
        C_SHIELD
    } else {
        C_HUD_KILLS
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(&right))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Terminal cell inside the border for an actor's top-left corner.
///
/// Actors may sit partly above or below the world (the player and boss
/// bands reach past the top edge), so the row is clamped into the play
/// area.  `None` only once the box has left horizontally.
fn world_to_cell(
    bounds: &Bounds,
    world: &WorldConfig,
    width: u16,
    height: u16,
) -> Option<(u16, u16)> {
    if bounds.x + bounds.width <= 0.0 || bounds.x >= world.width {
        return None;
    }
    let cols = width.saturating_sub(2);
    let rows = height.saturating_sub(4);
    let x = bounds.x.max(0.0) / world.width;
    let y = bounds.y.clamp(0.0, world.height) / world.height;
    let col = ((x * f64::from(cols)) as u16).min(cols.saturating_sub(1));
    let row = ((y * f64::from(rows)) as u16).min(rows.saturating_sub(1));
    Some((1 + col, 2 + row))
}

fn draw_actor<W: Write>(
    out: &mut W,
    actor: &Actor,
    visual: &Visual,
    level: &LevelEngine,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let Some((col, row)) = world_to_cell(&actor.bounds(), level.world(), width, height) else {
        return Ok(());
    };
    // Clip at the right wall.
    let room = width.saturating_sub(1).saturating_sub(col) as usize;
    let glyph: String = visual.glyph.chars().take(room).collect();
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(sprite_color(visual.sprite)))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    lines: &[&str],
    color: Color,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2 + 1);
    out.queue(style::SetForegroundColor(color))?;
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(*line))?;
    }
    Ok(())
}

fn draw_choices<W: Write>(
    out: &mut W,
    choices: &[Choice],
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let text = choices
        .iter()
        .map(|c| match c {
            Choice::NextLevel => "[N] Next Level",
            Choice::Restart => "[R] Try Again",
        })
        .collect::<Vec<_>>()
        .join("   ");
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, height / 2 + 2))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("↑ ↓ / W S : Move   SPACE : Fire   Q : Quit"))?;
    Ok(())
}
