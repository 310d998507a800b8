/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::SpeedConfig;
use crate::domain::map::TILE_SIZE;
use crate::domain::player::Facing;
use crate::domain::tile::Tile;
use crate::sim::interact::DoorState;
use crate::sim::session::LevelSession;

// ── Phase: which screen is on display ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameComplete,
}

/// Everything the renderer needs to draw one frame.
/// Borrowed from the main loop; the renderer never mutates game state.
pub struct FrameView<'a> {
    pub phase: Phase,
    pub session: Option<&'a LevelSession>,
    pub speed: &'a SpeedConfig,
    pub message: &'a str,
    pub level_count: usize,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear. By using the SAME explicit RGB
    /// for both `Clear(ClearType::All)` and every cell's background, the gap
    /// color matches the cell color exactly, eliminating visible lines.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 30 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    /// Fill a whole row with a background color.
    fn fill_row(&mut self, y: usize, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', fg, bg));
        }
    }
}

// ── Renderer ──

/// Each map tile = 2 terminal columns (terminal cells are ~2:1 tall).
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
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
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &FrameView) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(view.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(view.phase);
        }

        // Build front buffer
        self.front.clear();

        match view.phase {
            Phase::Title => self.compose_title(view),
            Phase::Playing => self.compose_game(view),
            Phase::GameComplete => self.compose_game_complete(view),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here, it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, view: &FrameView) {
        let session = match view.session {
            Some(s) => s,
            None => return,
        };
        let map = &session.map;

        // Center the map horizontally when the terminal is wider than it.
        let map_cols = map.width * CELL_W;
        let off_x = self.front.width.saturating_sub(map_cols) / 2;

        // ── HUD row ──
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        let hud = format!(
            " Level {:<2}  Keys:{}  ♥×{} ",
            session.level_index,
            session.player.keys_held,
            session.player.lives,
        );
        self.front.fill_row(HUD_ROW, Color::White, hud_bg);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Map tiles ──
        for row in 0..map.height {
            let y = MAP_ROW + row;
            if y >= self.front.height {
                break;
            }
            for col in 0..map.width {
                let x = off_x + col * CELL_W;
                if x + 1 >= self.front.width {
                    break;
                }
                self.compose_tile(map.tile_at(col, row), x, y);
            }
        }

        // ── Keys still on the floor ──
        let key_fg = Color::Rgb { r: 255, g: 220, b: 50 };
        for key in &session.interactions.keys {
            let (col, row) = key.tile;
            let x = off_x + col * CELL_W;
            let y = MAP_ROW + row;
            self.front.set(x, y, Cell::new('⚷', key_fg, Color::Reset));
            self.front.set(x + 1, y, Cell::new(' ', key_fg, Color::Reset));
        }

        // ── Doors ──
        for door in &session.interactions.doors {
            let (col, row) = door.tile;
            let x = off_x + col * CELL_W;
            let y = MAP_ROW + row;
            match door.state {
                DoorState::Closed => {
                    let fg = Color::Rgb { r: 200, g: 140, b: 40 };
                    let bg = Color::Rgb { r: 70, g: 45, b: 10 };
                    self.front.set(x, y, Cell::new('▐', fg, bg));
                    self.front.set(x + 1, y, Cell::new('▌', fg, bg));
                }
                DoorState::Opening { .. } => {
                    // Blink by mirroring the leaf glyphs each blink interval.
                    let fg = Color::Rgb { r: 255, g: 200, b: 80 };
                    let bg = Color::Rgb { r: 90, g: 60, b: 10 };
                    let (c0, c1) = if door.mirrored(view.speed.door_blink_ms) {
                        ('▌', '▐')
                    } else {
                        ('▐', '▌')
                    };
                    self.front.set(x, y, Cell::new(c0, fg, bg));
                    self.front.set(x + 1, y, Cell::new(c1, fg, bg));
                }
                DoorState::Consumed => {
                    // Gone: floor shows through (already composed above)
                }
            }
        }

        // ── Player (sub-tile position via pixel coords) ──
        let p = &session.player;
        let px = p.rect.x + p.rect.w / 2.0;
        let py = p.rect.y + p.rect.h / 2.0;
        let term_x = off_x + ((px / TILE_SIZE * CELL_W as f32) as usize).saturating_sub(1);
        let term_y = MAP_ROW + (py / TILE_SIZE) as usize;

        let head = match p.facing {
            Facing::Up => '▲',
            Facing::Down => '▽',
            Facing::Left => '◀',
            Facing::Right => '▶',
        };
        // 3-frame walk cycle shown in the body glyph
        let body = if p.moving {
            match p.anim_frame {
                0 => '╿',
                1 => '┃',
                _ => '╽',
            }
        } else {
            '┃'
        };
        let player_fg = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.set(term_x, term_y, Cell::new(head, player_fg, Color::Reset));
        self.front.set(term_x + 1, term_y, Cell::new(body, player_fg, Color::Reset));

        // ── Message bar ──
        let msg_row = MAP_ROW + map.height + 1;
        if msg_row < self.front.height && !view.message.is_empty() {
            let msg_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            let msg = format!(" ◈ {} ", view.message);
            self.front.fill_row(msg_row, Color::Black, msg_bg);
            self.front.put_str(0, msg_row, &msg, Color::Black, msg_bg);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + map.height + 3;
        if help_row < self.front.height {
            let help = " ←→↑↓/WASD: Move   R: Restart Level   Q/ESC: Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Write the visual for one map tile at terminal column x (2 cols wide).
    fn compose_tile(&mut self, tile: Tile, x: usize, y: usize) {
        let (c0, c1, fg, bg) = match tile {
            Tile::Empty => (' ', ' ', Color::Reset, Color::Reset),
            Tile::Floor => ('·', ' ', Color::Rgb { r: 60, g: 60, b: 80 }, Color::Reset),
            Tile::Wall => ('█', '█', Color::Rgb { r: 130, g: 130, b: 150 }, Color::Rgb { r: 70, g: 70, b: 85 }),
            Tile::Ladder => ('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
            // Door and Key tiles are normalized to Floor at parse time;
            // live doors/keys are drawn from the interaction lists.
            Tile::Door | Tile::Key => ('·', ' ', Color::Rgb { r: 60, g: 60, b: 80 }, Color::Reset),
        };
        self.front.set(x, y, Cell::new(c0, fg, bg));
        self.front.set(x + 1, y, Cell::new(c1, fg, bg));
    }

    // ── Static screens ──

    fn compose_title(&mut self, view: &FrameView) {
        let title = [
            r" _  __                      _        ",
            r"| |/ / ___  _  _  __ _  __ _| |_  ___ ",
            r"| ' < / -_)| || |/ _` |/ _` |  _|/ -_)",
            r"|_|\_\\___| \_, |\__, |\__,_|\__|\___|",
            r"            |__/ |___/                ",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 255, g: 200, b: 50 }, Color::Reset);
        }

        let subtitle = "◈◈  Keys open doors. Doors end levels.  ◈◈";
        self.front.put_str(4, 8, subtitle, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);

        let menu_base = 11;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(8, menu_base, "ENTER   Start", hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let info = format!("      {} levels", view.level_count);
        self.front.put_str(8, menu_base + 3, &info, Color::DarkGrey, Color::Reset);

        let help = [
            "Controls",
            "  ←→↑↓ / WASD   Move (diagonals allowed)",
            "  R              Restart level",
            "  Q / ESC        Quit",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb { r: 255, g: 200, b: 50 }
            } else {
                Color::White
            };
            self.front.put_str(8, menu_base + 5 + i, line, color, Color::Reset);
        }
    }

    fn compose_game_complete(&mut self, view: &FrameView) {
        let box_art = [
            "╔═══════════════════════════════╗",
            "║   ★ ALL DOORS OPENED! ★      ║",
            "╚═══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
        }
        let levels = format!("◈ All {} levels cleared!", view.level_count);
        self.front.put_str(8, 9, &levels, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(8, 11, "▸ ENTER: Play Again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(8, 12, "▸ Q/ESC: Quit", Color::DarkGrey, Color::Reset);
    }
}
