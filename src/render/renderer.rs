use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Difficulty, Direction, GamePhase, GameState, Position, PowerUpKind};
use crate::metrics::{SessionStats, format_clock};

/// Cells ahead of the player head shown in the corridor view
pub const CORRIDOR_DEPTH: usize = 8;

/// Screen drawn on top of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Difficulty selection with the highlighted entry
    Menu { selected: Difficulty },
}

/// What the player sees in one corridor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorridorContent {
    Empty,
    /// Past the edge of the grid
    Wall,
    Fruit,
    Opponent,
    OwnBody,
    PowerUp,
}

/// What a minimap character stands for; later variants win when a character
/// covers several cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MapCell {
    Empty,
    Fruit,
    PowerUp,
    OpponentBody,
    PlayerBody,
    OpponentHead,
    PlayerHead,
}

/// Cells straight ahead of `head`, nearest first
pub fn corridor_cells(head: Position, direction: Direction, depth: usize) -> Vec<Position> {
    let mut cells = Vec::with_capacity(depth);
    let mut cell = head;
    for _ in 0..depth {
        cell = cell.moved_in_direction(direction);
        cells.push(cell);
    }
    cells
}

pub fn corridor_content(state: &GameState, pos: Position) -> CorridorContent {
    if !state.grid.contains(pos) {
        CorridorContent::Wall
    } else if state.opponent.occupies(pos) {
        CorridorContent::Opponent
    } else if state.power_up.is_some_and(|power_up| power_up.position == pos) {
        CorridorContent::PowerUp
    } else if state.has_fruit(pos) {
        CorridorContent::Fruit
    } else if state.player.collides_with_body(pos) {
        CorridorContent::OwnBody
    } else {
        CorridorContent::Empty
    }
}

/// Downsample the grid to at most `cols` x `rows` characters
pub fn minimap_cells(state: &GameState, cols: usize, rows: usize) -> Vec<Vec<MapCell>> {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let scale_x = state.grid.width.div_ceil(cols);
    let scale_y = state.grid.height.div_ceil(rows);
    let out_cols = state.grid.width.div_ceil(scale_x);
    let out_rows = state.grid.height.div_ceil(scale_y);

    let mut map = vec![vec![MapCell::Empty; out_cols]; out_rows];
    let mut mark = |pos: Position, cell: MapCell| {
        if !state.grid.contains(pos) {
            return;
        }
        let slot = &mut map[pos.y as usize / scale_y][pos.x as usize / scale_x];
        if cell > *slot {
            *slot = cell;
        }
    };

    for &fruit in &state.fruits {
        mark(fruit, MapCell::Fruit);
    }
    if let Some(power_up) = state.power_up {
        mark(power_up.position, MapCell::PowerUp);
    }
    for &segment in state.opponent.body_segments() {
        mark(segment, MapCell::OpponentBody);
    }
    for &segment in state.player.body_segments() {
        mark(segment, MapCell::PlayerBody);
    }
    mark(state.opponent.head(), MapCell::OpponentHead);
    mark(state.player.head(), MapCell::PlayerHead);

    map
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        stats: &SessionStats,
        overlay: Overlay,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let header = self.render_stats(state, stats);
        frame.render_widget(header, chunks[0]);

        let panes = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        match overlay {
            Overlay::Menu { selected } => {
                let menu = self.render_menu(selected);
                frame.render_widget(menu, chunks[1]);
            }
            Overlay::None => {
                if state.phase.is_over() {
                    let game_over = self.render_game_over(state);
                    frame.render_widget(game_over, panes[0]);
                } else {
                    let corridor = self.render_corridor(panes[0], state);
                    frame.render_widget(corridor, panes[0]);
                }

                let minimap = self.render_minimap(panes[1], state);
                frame.render_widget(minimap, panes[1]);
            }
        }

        let controls = self.render_controls(overlay);
        frame.render_widget(controls, chunks[2]);
    }

    /// First-person view: nested frames, far cells at the top
    fn render_corridor(&self, area: Rect, state: &GameState) -> Paragraph<'static> {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cells = corridor_cells(state.player.head(), state.player.direction, CORRIDOR_DEPTH);

        let mut lines = Vec::with_capacity(CORRIDOR_DEPTH + 1);
        for (index, &cell) in cells.iter().enumerate().rev() {
            let depth = index + 1;
            lines.push(corridor_line(corridor_content(state, cell), depth, inner_width));
        }
        lines.push(Line::from(Span::styled(
            "▲ you ▲",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" View "),
            )
            .alignment(Alignment::Center)
    }

    fn render_minimap(&self, area: Rect, state: &GameState) -> Paragraph<'static> {
        let cols = area.width.saturating_sub(2) as usize;
        let rows = area.height.saturating_sub(2) as usize;
        let map = minimap_cells(state, cols, rows);
        let arrow = state.player.direction.arrow().to_string();

        let lines: Vec<Line> = map
            .into_iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .into_iter()
                    .map(|cell| match cell {
                        MapCell::PlayerHead => Span::styled(
                            arrow.clone(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                        MapCell::OpponentHead => Span::styled(
                            "■",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        MapCell::PlayerBody => {
                            Span::styled("□", Style::default().fg(Color::Green))
                        }
                        MapCell::OpponentBody => {
                            Span::styled("□", Style::default().fg(Color::Red))
                        }
                        MapCell::PowerUp => Span::styled(
                            "★",
                            Style::default()
                                .fg(Color::LightBlue)
                                .add_modifier(Modifier::BOLD),
                        ),
                        MapCell::Fruit => Span::styled("●", Style::default().fg(Color::Yellow)),
                        MapCell::Empty => Span::styled("·", Style::default().fg(Color::DarkGray)),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" Map {}x{} ", state.grid.width, state.grid.height)),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, stats: &SessionStats) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let phase_style = match state.phase {
            GamePhase::Hunt => Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            GamePhase::Win => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            GamePhase::Lose => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            GamePhase::Start | GamePhase::Survival => value,
        };

        let mut text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Phase: ", label),
            Span::styled(state.phase.name(), phase_style),
            Span::raw("    "),
            Span::styled("AI: ", label),
            Span::styled(state.difficulty.name(), value),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(
                format!("{} vs {}", state.player.len(), state.opponent.len()),
                value,
            ),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(stats.clock_label(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(
                format!("{} (len {})", stats.high_score, stats.longest_snake),
                value,
            ),
            Span::raw("    "),
            Span::styled("W/L: ", label),
            Span::styled(format!("{}/{}", stats.wins, stats.losses), value),
        ])];

        let mut status = Vec::new();
        if let Some(remaining) = state.effect_remaining() {
            status.push(Span::styled(
                format!(
                    "{} active {}s",
                    PowerUpKind::DoubleScore.label(),
                    remaining.as_secs() + 1
                ),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ));
            status.push(Span::raw("    "));
        }
        if let Some(message) = &state.message {
            status.push(Span::styled(message.clone(), Style::default().fg(Color::Cyan)));
        }
        text.push(Line::from(status));

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_menu(&self, selected: Difficulty) -> Paragraph<'static> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "SNAKE DUEL",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Eat fruit, grow to twice the red snake's length, then hunt it down.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];

        for (index, difficulty) in Difficulty::ALL.into_iter().enumerate() {
            let (side, fruits) = difficulty.preset();
            let entry = format!(
                "{} {}. {:<6}  {}x{} grid, {} fruits",
                if difficulty == selected { "▶" } else { " " },
                index + 1,
                difficulty.name(),
                side,
                side,
                fruits
            );
            let style = if difficulty == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            text.push(Line::from(Span::styled(entry, style)));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Choose difficulty "),
        )
    }

    fn render_game_over(&self, state: &GameState) -> Paragraph<'static> {
        let (title, color) = if state.phase == GamePhase::Win {
            ("YOU WIN", Color::Green)
        } else {
            ("GAME OVER", Color::Red)
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(Span::styled(
                state.message.clone().unwrap_or_default(),
                Style::default().fg(Color::White),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("    Survived: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format_clock(state.elapsed),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart, ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Enter",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to retry or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_controls(&self, overlay: Overlay) -> Paragraph<'static> {
        let text = match overlay {
            Overlay::Menu { .. } => vec![Line::from(vec![
                Span::styled("↑↓", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("1-3", Style::default().fg(Color::Cyan)),
                Span::raw(" to choose | "),
                Span::styled("Enter", Style::default().fg(Color::Cyan)),
                Span::raw(" to start | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])],
            Overlay::None => vec![Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("R", Style::default().fg(Color::Green)),
                Span::raw(" to restart | "),
                Span::styled("M", Style::default().fg(Color::Yellow)),
                Span::raw(" for menu | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])],
        };

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// One corridor frame; nearer cells draw wider frames and larger glyphs
fn corridor_line(content: CorridorContent, depth: usize, inner_width: usize) -> Line<'static> {
    let nearness = CORRIDOR_DEPTH + 1 - depth;
    let frame_width = (inner_width * nearness / (CORRIDOR_DEPTH + 1)).max(3);
    let wall = Style::default().fg(Color::DarkGray);

    if content == CorridorContent::Wall {
        return Line::from(Span::styled("█".repeat(frame_width), wall));
    }

    let (glyph, style) = match content {
        CorridorContent::Fruit => ("●", Style::default().fg(Color::Yellow)),
        CorridorContent::Opponent => (
            "◆",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        CorridorContent::OwnBody => ("○", Style::default().fg(Color::Green)),
        CorridorContent::PowerUp => (
            "★",
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ),
        CorridorContent::Empty | CorridorContent::Wall => (" ", Style::default()),
    };

    let glyph_width = (nearness / 2).max(1).min(frame_width - 2);
    let padding = frame_width - 2 - glyph_width;
    let left = padding / 2;

    Line::from(vec![
        Span::styled("│", wall),
        Span::raw(" ".repeat(left)),
        Span::styled(glyph.repeat(glyph_width), style),
        Span::raw(" ".repeat(padding - left)),
        Span::styled("│", wall),
    ])
}
