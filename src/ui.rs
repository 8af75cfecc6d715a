//! Layout and drawing: playfield, cursor, sidebar, and screen → grid mapping for mouse clicks.

use crate::grid::{BlockGrid, Colour};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Each block is two terminal columns wide so it looks roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 24;
/// Colours (6) + gap + stats (5) + gap + help (7).
const SIDEBAR_HEIGHT: u16 = 20;

/// What the sidebar reports besides the grid itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// Size of the group removed by the last click, if any.
    pub last_group: Option<usize>,
    /// Clicks that changed the grid.
    pub moves: u32,
}

/// Playfield size in terminal cells (border + grid).
fn playfield_outer_size(width: usize, height: usize) -> (u16, u16) {
    (width as u16 * CELL_WIDTH + 2, height as u16 * CELL_HEIGHT + 2)
}

/// Playfield and sidebar rects centred in `area`; None when they do not fit.
fn game_layout(area: Rect, width: usize, height: usize) -> Option<(Rect, Rect)> {
    let (pw, ph) = playfield_outer_size(width, height);
    let total_w = pw + SIDEBAR_WIDTH;
    let total_h = ph.max(SIDEBAR_HEIGHT);
    if area.width < total_w || area.height < total_h {
        return None;
    }

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let active = vert[1];

    let playfield = Rect {
        x: active.x,
        y: active.y,
        width: pw,
        height: ph,
    };
    let sidebar = Rect {
        x: active.x + pw,
        y: active.y,
        width: SIDEBAR_WIDTH,
        height: SIDEBAR_HEIGHT,
    };
    Some((playfield, sidebar))
}

/// Inner board rect (no border) for the grid drawn in `area`.
pub fn board_rect(area: Rect, width: usize, height: usize) -> Option<Rect> {
    game_layout(area, width, height).map(|(playfield, _)| Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: width as u16 * CELL_WIDTH,
        height: height as u16 * CELL_HEIGHT,
    })
}

/// Grid (x, y) under a terminal cell, given the board rect. Row 0 is drawn at the bottom.
pub fn cell_at(
    board: Rect,
    width: usize,
    height: usize,
    column: u16,
    row: u16,
) -> Option<(usize, usize)> {
    if column < board.x || row < board.y {
        return None;
    }
    let x = ((column - board.x) / CELL_WIDTH) as usize;
    let from_top = ((row - board.y) / CELL_HEIGHT) as usize;
    if x >= width || from_top >= height {
        return None;
    }
    Some((x, height - 1 - from_top))
}

/// Draw the whole screen.
pub fn draw(
    frame: &mut Frame,
    grid: &BlockGrid,
    theme: &Theme,
    cursor: (usize, usize),
    status: Status,
) {
    let area = frame.area();
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(theme.bg));
    match game_layout(area, grid.width(), grid.height()) {
        Some((playfield, sidebar)) => {
            draw_playfield(frame, grid, theme, cursor, playfield);
            draw_sidebar(frame, grid, theme, status, sidebar);
        }
        None => draw_too_small(frame, grid, theme, area),
    }
}

fn draw_too_small(frame: &mut Frame, grid: &BlockGrid, theme: &Theme, area: Rect) {
    let (pw, ph) = playfield_outer_size(grid.width(), grid.height());
    let lines = vec![
        Line::from(Span::styled(
            "Terminal too small",
            Style::default().fg(theme.title),
        )),
        Line::from(Span::styled(
            format!("need {}x{}", pw + SIDEBAR_WIDTH, ph.max(SIDEBAR_HEIGHT)),
            Style::default().fg(theme.main_fg),
        )),
    ];
    let y = area.y + area.height.saturating_sub(2) / 2;
    let rect = Rect {
        x: area.x,
        y,
        width: area.width,
        height: 2.min(area.height),
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(rect, frame.buffer_mut());
}

fn draw_playfield(
    frame: &mut Frame,
    grid: &BlockGrid,
    theme: &Theme,
    cursor: (usize, usize),
    area: Rect,
) {
    let title = if grid.remaining() == 0 {
        " Collapse  | Cleared! ".to_string()
    } else {
        " Collapse ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let height = grid.height();
    let buf = frame.buffer_mut();
    for x in 0..grid.width() {
        for (y, &id) in grid.column(x).iter().enumerate() {
            let b = grid.block(id);
            let rx = inner.x + x as u16 * CELL_WIDTH;
            let ry = inner.y + (height - 1 - y) as u16 * CELL_HEIGHT;
            let (symbol, style) = if b.is_removed() {
                ("░░", Style::default().fg(theme.removed).bg(theme.bg))
            } else {
                let c = theme.block_color(b.colour());
                ("██", Style::default().fg(c).bg(c))
            };
            let (symbol, style) = if (x, y) == cursor {
                let under = style.bg.unwrap_or(theme.bg);
                (
                    "[]",
                    Style::default()
                        .fg(Color::Black)
                        .bg(under)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (symbol, style)
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, grid: &BlockGrid, theme: &Theme, status: Status, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Colours (border + 4 rows)
            Constraint::Length(1), // gap
            Constraint::Length(5), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(7), // Keys
        ])
        .split(area);

    let legend = Colour::ALL
        .iter()
        .map(|&c| {
            let col = theme.block_color(c);
            Line::from(vec![
                Span::styled("██", Style::default().fg(col)),
                Span::styled(format!(" {}", c.name()), fg_style),
            ])
        })
        .collect();
    draw_section(frame, theme, chunks[0], "Colours", legend);

    let total = grid.width() * grid.height();
    let last = status
        .last_group
        .map_or_else(|| "-".to_string(), |n| n.to_string());
    let stats = vec![
        Line::from(vec![
            Span::styled("Left: ", title_style),
            Span::styled(format!("{}/{}", grid.remaining(), total), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Moves: ", title_style),
            Span::styled(status.moves.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Last group: ", title_style),
            Span::styled(last, fg_style),
        ]),
    ];
    draw_section(frame, theme, chunks[2], "Stats", stats);

    let keys = [
        "Click     remove group",
        "Arrows    move cursor",
        "Space     remove group",
        "n         new grid",
        "q / Esc   quit",
    ]
    .into_iter()
    .map(|s| Line::from(Span::styled(s, fg_style)))
    .collect();
    draw_section(frame, theme, chunks[4], "Keys", keys);
}

/// Bordered sidebar section with a title and plain lines.
fn draw_section(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(format!(" {title} "), Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    Paragraph::new(Text::from(lines)).render(inner, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_board_rect_centred() {
        let area = Rect::new(0, 0, 80, 24);
        let board = board_rect(area, 10, 10).unwrap();
        assert_eq!((board.width, board.height), (20, 10));
        // 22 + 24 = 46 wide, 20 tall: centred in 80x24.
        assert_eq!((board.x, board.y), (18, 3));
    }

    #[test]
    fn test_board_rect_too_small() {
        assert!(board_rect(Rect::new(0, 0, 30, 10), 10, 10).is_none());
    }

    #[test]
    fn test_cell_at_maps_rows_bottom_up() {
        let board = Rect::new(10, 5, 20, 10);
        assert_eq!(cell_at(board, 10, 10, 10, 5), Some((0, 9)));
        assert_eq!(cell_at(board, 10, 10, 11, 5), Some((0, 9)));
        assert_eq!(cell_at(board, 10, 10, 12, 14), Some((1, 0)));
        assert_eq!(cell_at(board, 10, 10, 29, 14), Some((9, 0)));
    }

    #[test]
    fn test_cell_at_outside_board() {
        let board = Rect::new(10, 5, 20, 10);
        assert_eq!(cell_at(board, 10, 10, 9, 5), None);
        assert_eq!(cell_at(board, 10, 10, 30, 5), None);
        assert_eq!(cell_at(board, 10, 10, 10, 15), None);
        assert_eq!(cell_at(board, 10, 10, 10, 4), None);
    }

    #[test]
    fn test_draw_marks_removed_and_cursor() {
        let mut grid = BlockGrid::from_columns(vec![vec![Colour::Red; 10]; 10]).unwrap();
        let origin = grid.block_at(0, 0).unwrap();
        assert!(grid.resolve_action(origin));

        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &grid, &theme, (0, 0), Status::default()))
            .unwrap();

        let board = board_rect(Rect::new(0, 0, 80, 24), 10, 10).unwrap();
        let buf = terminal.backend().buffer();
        // Everything was one group, so every slot is a removed one.
        assert_eq!(buf[(board.x + 2, board.y)].symbol(), "░");
        // Cursor sits on (0, 0): bottom-left.
        assert_eq!(buf[(board.x, board.y + 9)].symbol(), "[");
        assert_eq!(buf[(board.x + 1, board.y + 9)].symbol(), "]");
    }
}
