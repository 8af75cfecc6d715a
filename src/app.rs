//! App: terminal init, main loop, key and mouse handling.

use crate::GridConfig;
use crate::grid::BlockGrid;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, Status};
use crate::vlog;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

pub struct App {
    config: GridConfig,
    grid: BlockGrid,
    theme: Theme,
    /// Seeded source for every grid dealt after the first; None deals from the thread RNG.
    rng: Option<StdRng>,
    cursor: (usize, usize),
    status: Status,
    /// Redraw needed: grid changed, cursor moved, or terminal resized.
    dirty: bool,
    /// Frame area of the last draw, for mapping mouse clicks.
    last_area: Rect,
}

impl App {
    pub fn new(config: GridConfig, grid: BlockGrid, theme: Theme, rng: Option<StdRng>) -> Self {
        Self {
            config,
            grid,
            theme,
            rng,
            cursor: (0, 0),
            status: Status::default(),
            dirty: true,
            last_area: Rect::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore: raw mode goes first so the shell is usable even if the screen writes fail.
        let raw = disable_raw_mode();
        let screen = execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        finish(result, [raw, screen])
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.dirty {
                let mut area = self.last_area;
                terminal.draw(|f| {
                    area = f.area();
                    ui::draw(f, &self.grid, &self.theme, self.cursor, self.status);
                })?;
                self.last_area = area;
                self.dirty = false;
            }

            // Nothing moves on its own, so block until the next event.
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !self.apply_action(key_to_action(key))? {
                        return Ok(());
                    }
                }
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => self.click(column, row),
                Event::Resize(..) => self.dirty = true,
                _ => {}
            }
        }
    }

    /// Returns false when the player quits.
    fn apply_action(&mut self, action: Action) -> Result<bool> {
        let (x, y) = self.cursor;
        let (max_x, max_y) = (self.grid.width() - 1, self.grid.height() - 1);
        match action {
            Action::Quit => {
                vlog!("quit after {} moves", self.status.moves);
                return Ok(false);
            }
            Action::CursorLeft => self.move_cursor(x.saturating_sub(1), y),
            Action::CursorRight => self.move_cursor((x + 1).min(max_x), y),
            Action::CursorDown => self.move_cursor(x, y.saturating_sub(1)),
            Action::CursorUp => self.move_cursor(x, (y + 1).min(max_y)),
            Action::Select => self.select(x, y),
            Action::NewGrid => self.new_grid()?,
            Action::None => {}
        }
        Ok(true)
    }

    fn move_cursor(&mut self, x: usize, y: usize) {
        if self.cursor != (x, y) {
            self.cursor = (x, y);
            self.dirty = true;
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        let Some(board) = ui::board_rect(self.last_area, self.grid.width(), self.grid.height())
        else {
            return;
        };
        if let Some((x, y)) = ui::cell_at(board, self.grid.width(), self.grid.height(), column, row)
        {
            self.move_cursor(x, y);
            self.select(x, y);
        }
    }

    /// Resolve the block at (x, y) and redraw only if the grid changed.
    fn select(&mut self, x: usize, y: usize) {
        let Some(id) = self.grid.block_at(x, y) else {
            return;
        };
        let block = self.grid.block(id);
        let (bx, by, colour) = (block.x(), block.y(), block.colour());
        let before = self.grid.remaining();
        if !self.grid.resolve_action(id) {
            vlog!("ignored click on removed slot ({bx},{by})");
            return;
        }
        let group = before - self.grid.remaining();
        vlog!(
            "resolve ({bx},{by}) {} group={group} left={}",
            colour.name(),
            self.grid.remaining()
        );
        self.status.moves += 1;
        self.status.last_group = Some(group);
        self.dirty = true;
    }

    fn new_grid(&mut self) -> Result<()> {
        let (width, height) = (self.config.width, self.config.height);
        self.grid = match self.rng.as_mut() {
            Some(rng) => BlockGrid::with_rng(width, height, rng)?,
            None => BlockGrid::new(width, height)?,
        };
        self.status = Status::default();
        self.cursor = (0, 0);
        self.dirty = true;
        vlog!("new grid {}x{}", self.config.width, self.config.height);
        Ok(())
    }
}

/// Loop result wins; otherwise the first restore failure.
fn finish<const N: usize>(result: Result<()>, restore: [std::io::Result<()>; N]) -> Result<()> {
    result?;
    for step in restore {
        step?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Colour;
    use rand::SeedableRng;

    fn app_with(grid: BlockGrid) -> App {
        let config = GridConfig {
            width: grid.width(),
            height: grid.height(),
            seed: Some(3),
        };
        App::new(config, grid, Theme::default(), Some(StdRng::seed_from_u64(3)))
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut app = app_with(BlockGrid::from_columns(vec![vec![Colour::Red; 2]; 2]).unwrap());
        app.apply_action(Action::CursorLeft).unwrap();
        app.apply_action(Action::CursorDown).unwrap();
        assert_eq!(app.cursor, (0, 0));
        for _ in 0..5 {
            app.apply_action(Action::CursorRight).unwrap();
            app.apply_action(Action::CursorUp).unwrap();
        }
        assert_eq!(app.cursor, (1, 1));
    }

    #[test]
    fn test_select_records_group_and_skips_removed() {
        let grid = BlockGrid::from_columns(vec![
            vec![Colour::Red, Colour::Blue],
            vec![Colour::Red, Colour::Green],
        ])
        .unwrap();
        let mut app = app_with(grid);
        app.dirty = false;

        app.apply_action(Action::Select).unwrap();
        assert_eq!(app.status.moves, 1);
        assert_eq!(app.status.last_group, Some(2));
        assert!(app.dirty);

        // (0, 1) now holds a removed slot after the reds fell away.
        app.dirty = false;
        app.move_cursor(0, 1);
        app.dirty = false;
        let before = app.grid.clone();
        app.apply_action(Action::Select).unwrap();
        assert_eq!(app.grid, before);
        assert_eq!(app.status.moves, 1);
        assert_eq!(app.status.last_group, Some(2));
        assert!(!app.dirty);
    }

    #[test]
    fn test_click_maps_to_block() {
        let mut app = app_with(BlockGrid::from_columns(vec![vec![Colour::Blue; 10]; 10]).unwrap());
        app.last_area = Rect::new(0, 0, 80, 24);
        let board = ui::board_rect(app.last_area, 10, 10).unwrap();
        // Bottom-right cell, second half of the two-column block.
        app.click(board.x + 19, board.y + 9);
        assert_eq!(app.cursor, (9, 0));
        assert_eq!(app.grid.remaining(), 0);
        assert_eq!(app.status.last_group, Some(100));
    }

    #[test]
    fn test_new_grid_resets_status() {
        let mut app = app_with(BlockGrid::from_columns(vec![vec![Colour::Blue; 4]; 4]).unwrap());
        app.apply_action(Action::Select).unwrap();
        assert_eq!(app.grid.remaining(), 0);
        assert!(app.apply_action(Action::NewGrid).unwrap());
        assert_eq!(app.grid.remaining(), 16);
        assert_eq!(app.status, Status::default());
        assert!(!app.apply_action(Action::Quit).unwrap());
    }

    #[test]
    fn test_new_grid_without_seed() {
        let grid = BlockGrid::new(5, 3).unwrap();
        let config = GridConfig {
            width: 5,
            height: 3,
            seed: None,
        };
        let mut app = App::new(config, grid, Theme::default(), None);
        app.apply_action(Action::NewGrid).unwrap();
        assert_eq!((app.grid.width(), app.grid.height()), (5, 3));
        assert_eq!(app.grid.remaining(), 15);
    }

    #[test]
    fn test_seeded_deals_are_reproducible() {
        let grid = || BlockGrid::new(4, 4).unwrap();
        let mut a = app_with(grid());
        let mut b = app_with(grid());
        a.apply_action(Action::NewGrid).unwrap();
        b.apply_action(Action::NewGrid).unwrap();
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_restore_errors_surface_after_loop_result() {
        let failed = || Err(std::io::Error::other("leave failed"));
        assert!(finish(Ok(()), [Ok(()), Ok(())]).is_ok());
        let err = finish(Ok(()), [Ok(()), failed()]).unwrap_err();
        assert_eq!(err.to_string(), "leave failed");
        let err = finish(Err(anyhow::anyhow!("draw failed")), [failed(), Ok(())]).unwrap_err();
        assert_eq!(err.to_string(), "draw failed");
    }
}
