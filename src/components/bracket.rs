use bracket_engine::{Matchup, MatchupState, Round, Slot, Team};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per matchup cell: home line, series line, away line.
pub const GAME_HEIGHT: u16 = 3;

/// Slot heights for each bracket depth (d=0 = First Round leaf, d=3 = Finals root).
/// Formula: SH[0] = GAME_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
const SH: [u16; 4] = [
    GAME_HEIGHT,                             // First Round:   3
    2 * GAME_HEIGHT + 1,                     // Semifinals:    7
    2 * (2 * GAME_HEIGHT + 1) + 1,           // Conf Finals:  15
    2 * (2 * (2 * GAME_HEIGHT + 1) + 1) + 1, // Finals:       31
];

/// Total terminal rows consumed by the whole bracket. Equals SH[3] = 31.
pub const BRACKET_HEIGHT: u16 = SH[3];

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Maximum matchup cell width in wider terminals.
const CELL_W_FULL: u16 = 22;

const DIM: Style = Style::new().fg(Color::Indexed(240));

// ---------------------------------------------------------------------------
// GameCell: pre-computed position for one matchup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameCell {
    /// Row of the series line (center of the 3-row cell), relative to the
    /// bracket origin. Not scroll-adjusted.
    pub center_row: u16,
    /// Starting x-column (origin-relative).
    pub col: u16,
    pub cell_width: u16,
    pub round: Round,
    /// Matchup position within the round.
    pub position: usize,
}

// ---------------------------------------------------------------------------
// BracketGrid: layout engine for the 16-team tree
// ---------------------------------------------------------------------------

/// Column order left → right: First Round | conn | Semis | conn | Conf Finals | conn | Finals
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// All cells in depth-major order: 8 + 4 + 2 + 1 = 15 cells.
    pub cells: Vec<GameCell>,
    /// Starting x-column for each round column.
    pub round_cols: [u16; 4],
    pub total_width: u16,
    pub cell_width: u16,
}

impl BracketGrid {
    /// Compute the layout for the given width:
    /// `4 * cell_width + 3 * CONNECTOR_WIDTH <= width`.
    ///
    /// Center rows follow the triangle formula
    /// `center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d])`:
    ///   First Round (d=0): [1, 5, 9, 13, 17, 21, 25, 29]
    ///   Semifinals  (d=1): [3, 11, 19, 27]
    ///   Conf Finals (d=2): [7, 23]
    ///   Finals      (d=3): [15]
    pub fn compute(width: u16) -> Self {
        let per_col = width.saturating_sub(CONNECTOR_WIDTH * 3) / 4;
        let cell_width = per_col.clamp(1, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;
        let round_cols = [0u16, stride, stride * 2, stride * 3];

        let first_center = [SH[0] / 2, SH[1] / 2, SH[2] / 2, SH[3] / 2];
        let spacing: [u16; 4] = [SH[1] - SH[0], SH[2] - SH[1], SH[3] - SH[2], 0];

        let mut cells = Vec::with_capacity(15);
        for round in Round::ALL {
            let d = round.depth();
            for position in 0..round.matchup_count() {
                cells.push(GameCell {
                    center_row: first_center[d] + position as u16 * spacing[d],
                    col: round_cols[d],
                    cell_width,
                    round,
                    position,
                });
            }
        }

        Self { cells, round_cols, total_width: stride * 3 + cell_width, cell_width }
    }

    pub fn cells_for_depth(&self, depth: usize) -> &[GameCell] {
        const OFFSETS: [usize; 5] = [0, 8, 12, 14, 15];
        &self.cells[OFFSETS[depth]..OFFSETS[depth + 1]]
    }

    /// Scroll offset that keeps the given cell fully visible in `height` rows.
    pub fn scroll_to(&self, round: Round, position: usize, current: u16, height: u16) -> u16 {
        let Some(cell) = self.cells.iter().find(|c| c.round == round && c.position == position) else {
            return current;
        };
        let top = cell.center_row.saturating_sub(1);
        let bottom = cell.center_row + 1;
        if top < current {
            top
        } else if height > 0 && bottom >= current + height {
            bottom + 1 - height
        } else {
            current
        }
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

pub struct BracketView<'a> {
    /// Matchups per depth, ordered by position.
    pub rounds: [Vec<&'a Matchup>; 4],
    pub grid: &'a BracketGrid,
    pub selected_round: Round,
    pub selected_position: usize,
    pub scroll_offset: u16,
}

impl<'a> Widget for BracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < GAME_HEIGHT {
            return;
        }

        for cell in &self.grid.cells {
            let matchup = self.rounds[cell.round.depth()].get(cell.position).copied();
            let selected = cell.round == self.selected_round && cell.position == self.selected_position;
            draw_game_cell(matchup, cell, selected, area, self.scroll_offset, buf);
        }

        // Each parent at depth d+1 connects to two children at depth d.
        for depth in 0..3usize {
            let child_cells = self.grid.cells_for_depth(depth);
            let parent_cells = self.grid.cells_for_depth(depth + 1);
            let conn_x_base = area.x + self.grid.round_cols[depth] + self.grid.cell_width;
            for (j, parent) in parent_cells.iter().enumerate() {
                draw_connector(
                    child_cells[2 * j].center_row,
                    parent.center_row,
                    child_cells[2 * j + 1].center_row,
                    conn_x_base,
                    area,
                    self.scroll_offset,
                    buf,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing helpers
// ---------------------------------------------------------------------------

/// Bracket-relative row → absolute screen y; `None` when off-screen.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

fn draw_game_cell(
    matchup: Option<&Matchup>,
    cell: &GameCell,
    selected: bool,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let x = area.x + cell.col;
    if x >= area.x + area.width {
        return;
    }
    let avail_w = (area.x + area.width).saturating_sub(x) as usize;

    let base_style = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Gray)
    };
    let winner_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let winner_slot = matchup.and_then(Matchup::winner_slot);

    let rows = [
        (cell.center_row.saturating_sub(1), Some(Slot::Home)),
        (cell.center_row, None),
        (cell.center_row.saturating_add(1), Some(Slot::Away)),
    ];
    for (bracket_row, slot) in rows {
        let Some(sy) = screen_y(bracket_row, scroll, area) else {
            continue;
        };

        let width = cell.cell_width as usize;
        let (content, style) = match (matchup, slot) {
            (None, _) => (" ".repeat(width), base_style),
            (Some(m), Some(slot)) => {
                let style = if winner_slot == Some(slot) {
                    if selected { winner_style.add_modifier(Modifier::REVERSED) } else { winner_style }
                } else {
                    base_style
                };
                (format_team_line(m.team(slot), m.score(slot), width), style)
            }
            (Some(m), None) => (format_status_line(m, width), DIM),
        };
        let text: String = content.chars().take(avail_w).collect();
        buf.set_string(x, sy, &text, style);
    }
}

/// `"[seed] [name       ] [score] "` padded to exactly `width` chars.
pub fn format_team_line(team: Option<&Team>, score: Option<u8>, width: usize) -> String {
    let seed = match team.and_then(|t| t.seed) {
        Some(s) => format!("{s:2}"),
        None => "  ".to_string(),
    };
    let name = team.map(|t| t.name.as_str()).unwrap_or("TBD");
    let score_str = match score {
        Some(s) => format!("{s:3}"),
        None => "   ".to_string(),
    };
    // seed(2) + sp + name + sp + score(3) + sp
    let name_w = width.saturating_sub(8);
    let name_trunc: String = name.chars().take(name_w).collect();
    let line = format!("{seed} {name_trunc:<name_w$} {score_str} ");
    line.chars().take(width).collect()
}

fn format_status_line(matchup: &Matchup, width: usize) -> String {
    let raw = match matchup.state() {
        MatchupState::Empty | MatchupState::OneTeam => " awaiting teams".to_string(),
        MatchupState::Ready => " series 0-0".to_string(),
        MatchupState::InProgress => format!(
            " series {}-{}",
            matchup.home_score.unwrap_or(0),
            matchup.away_score.unwrap_or(0)
        ),
        MatchupState::Decided => {
            let abbrev = matchup.winner.as_ref().map(|t| t.abbreviation.as_str()).unwrap_or("");
            format!(" {abbrev} advances")
        }
    };
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

/// Box-drawing connector between one parent and its two children.
///
/// ```text
///  child_top  ──┐
///               │
///  parent     ──├──
///               │
///  child_bot  ──┘
/// ```
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x
            && let Some(sy) = screen_y(row, scroll, area)
        {
            put_char(buf, x, sy, ch, DIM);
        }
    };

    put(col_a, r_top, '─');
    put(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put(col_b, row, '│');
    }
    put(col_a, r_mid, '─');
    put(col_b, r_mid, '├');
    put(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_a, r_bot, '─');
    put(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_engine::roster::Roster;

    #[test]
    fn test_bracket_height_is_31() {
        assert_eq!(BRACKET_HEIGHT, 31);
        assert_eq!(SH, [3, 7, 15, 31]);
    }

    #[test]
    fn test_grid_has_one_cell_per_matchup() {
        let grid = BracketGrid::compute(80);
        assert_eq!(grid.cells.len(), 15);
    }

    #[test]
    fn test_center_rows_per_round() {
        let grid = BracketGrid::compute(80);
        let centers = |d: usize| grid.cells_for_depth(d).iter().map(|c| c.center_row).collect::<Vec<u16>>();
        assert_eq!(centers(0), vec![1, 5, 9, 13, 17, 21, 25, 29]);
        assert_eq!(centers(1), vec![3, 11, 19, 27]);
        assert_eq!(centers(2), vec![7, 23]);
        assert_eq!(centers(3), vec![15]);
    }

    #[test]
    fn test_connectors_stop_at_the_finals() {
        let grid = BracketGrid::compute(100);
        let bracket = bracket_engine::create_bracket(2025, "render");
        let area = Rect::new(0, 0, 100, BRACKET_HEIGHT);
        let mut buf = Buffer::empty(area);
        BracketView {
            rounds: Round::ALL.map(|round| bracket.matchups_in_round(round)),
            grid: &grid,
            selected_round: Round::FirstRound,
            selected_position: 0,
            scroll_offset: 0,
        }
        .render(area, &mut buf);

        let symbol = |x: u16, y: u16| buf.cell((x, y)).map(|c| c.symbol().to_string());
        let first_conn = grid.round_cols[0] + grid.cell_width;
        assert_eq!(symbol(first_conn + 1, 1).as_deref(), Some("┐"));
        assert_eq!(symbol(first_conn + 1, 3).as_deref(), Some("├"));
        let past_finals = grid.round_cols[3] + grid.cell_width + 1;
        assert_eq!(symbol(past_finals, 15).as_deref(), Some(" "));
    }

    #[test]
    fn test_parent_center_is_midpoint_of_children() {
        let grid = BracketGrid::compute(80);
        for depth in 0..3usize {
            let children = grid.cells_for_depth(depth);
            for (j, parent) in grid.cells_for_depth(depth + 1).iter().enumerate() {
                let expected = (children[2 * j].center_row + children[2 * j + 1].center_row) / 2;
                assert_eq!(parent.center_row, expected, "depth={depth} parent={j}");
            }
        }
    }

    #[test]
    fn test_cell_width_follows_available_width() {
        let grid = BracketGrid::compute(99);
        assert_eq!(grid.cell_width, (99 - CONNECTOR_WIDTH * 3) / 4);
        assert_eq!(BracketGrid::compute(200).cell_width, CELL_W_FULL);
    }

    #[test]
    fn test_scroll_to_keeps_cell_visible() {
        let grid = BracketGrid::compute(80);
        // Last first-round cell spans rows 28..=30.
        assert_eq!(grid.scroll_to(Round::FirstRound, 7, 0, 20), 11);
        assert_eq!(grid.scroll_to(Round::FirstRound, 0, 11, 20), 0);
        assert_eq!(grid.scroll_to(Round::Finals, 0, 5, 20), 5);
    }

    #[test]
    fn test_format_team_line_width() {
        let roster = Roster::embedded().unwrap();
        let team = roster.find("western-3");
        for width in [14usize, 22] {
            let line = format_team_line(team, Some(3), width);
            assert_eq!(line.chars().count(), width, "line: {line:?}");
        }
        assert!(format_team_line(None, None, 22).contains("TBD"));
        for width in [0usize, 3, 7] {
            assert_eq!(format_team_line(team, Some(3), width).chars().count(), width);
        }
    }
}
