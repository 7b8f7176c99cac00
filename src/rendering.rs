use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
};

use crate::types::Rect;

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
    pub background: Option<Color>,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            background: None,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        self.buffer = vec![vec![' '; self.width as usize]; self.height as usize];
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.background = None;
    }

    #[cfg(test)]
    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row(y).contains(needle))
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ({:?}) ---", self.background);
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    /// Writes a finished frame. Stdout gets one queued batch per frame; the
    /// screen buffer gets a copy of the grid.
    pub fn present(&mut self, grid: &GameGrid, log_frame: bool) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => {
                if let Some(color) = grid.background {
                    queue!(s, SetBackgroundColor(color))?;
                }
                for y in 0..grid.height {
                    let line: String = grid.grid[y as usize].iter().collect();
                    queue!(s, MoveTo(0, y), Print(line))?;
                }
                queue!(s, ResetColor)?;
                s.flush()
            }
            OutputTarget::ScreenBuffer(sb) => {
                sb.clear();
                sb.background = grid.background;
                for y in 0..grid.height.min(sb.height) {
                    for x in 0..grid.width.min(sb.width) {
                        sb.buffer[y as usize][x as usize] = grid.grid[y as usize][x as usize];
                    }
                }
                if log_frame {
                    sb.print_to_log();
                }
                Ok(())
            }
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

// --- GameGrid for geometric rendering ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub background: Option<Color>,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            background: None,
        }
    }

    /// Signed coordinates so sprites can hang off any edge; out-of-range cells are dropped.
    pub fn set_char(&mut self, x: i32, y: i32, c: char) {
        if x >= 0 && y >= 0 && (y as u16) < self.height && (x as u16) < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn write_text(&mut self, x: i32, y: i32, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_char(x + i as i32, y, c);
        }
    }

    pub fn write_centered(&mut self, y: i32, text: &str) {
        let x = (self.width as i32 - text.chars().count() as i32) / 2;
        self.write_text(x.max(0), y, text);
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width as usize]; self.height as usize];
        self.background = None;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        for y in 0..terminal_height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

// --- Sprites ---

/// ASCII-art image. Spaces are transparent when blitted.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl Sprite {
    /// Returns `None` when the text has nothing drawable in it.
    pub fn parse(text: &str) -> Option<Sprite> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        while rows.first().is_some_and(|row| row.is_empty()) {
            rows.remove(0);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return None;
        }
        for row in &mut rows {
            row.resize(width, ' ');
        }
        Some(Sprite { rows, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> char {
        self.rows[y][x]
    }

    /// Nearest-neighbour scale to an arbitrary size (at least 1x1).
    pub fn scaled(&self, width: usize, height: usize) -> Sprite {
        let width = width.max(1);
        let height = height.max(1);
        let rows = (0..height)
            .map(|y| {
                let src_y = y * self.height() / height;
                (0..width)
                    .map(|x| self.rows[src_y][x * self.width() / width])
                    .collect()
            })
            .collect();
        Sprite { rows, width }
    }

    pub fn blit(&self, grid: &mut GameGrid, x: i32, y: i32) {
        for (dy, row) in self.rows.iter().enumerate() {
            for (dx, &c) in row.iter().enumerate() {
                if c != ' ' {
                    grid.set_char(x + dx as i32, y + dy as i32, c);
                }
            }
        }
    }
}

// --- Viewport: play-area units to terminal cells ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub world_width: f64,
    pub world_height: f64,
    pub columns: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(world_width: f64, world_height: f64, columns: u16, rows: u16) -> Self {
        Viewport { world_width, world_height, columns, rows }
    }

    pub fn column(&self, x: f64) -> i32 {
        (x * self.columns as f64 / self.world_width).floor() as i32
    }

    pub fn row(&self, y: f64) -> i32 {
        (y * self.rows as f64 / self.world_height).floor() as i32
    }

    pub fn cells_wide(&self, width: f64) -> usize {
        ((width * self.columns as f64 / self.world_width).round() as usize).max(1)
    }

    pub fn cells_high(&self, height: f64) -> usize {
        ((height * self.rows as f64 / self.world_height).round() as usize).max(1)
    }

    /// Scales `sprite` to cover `rect` and draws it.
    pub fn draw(&self, grid: &mut GameGrid, sprite: &Sprite, rect: Rect) {
        let scaled = sprite.scaled(self.cells_wide(rect.width), self.cells_high(rect.height));
        scaled.blit(grid, self.column(rect.x), self.row(rect.y));
    }
}
