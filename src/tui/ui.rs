//! Rendering for the three game phases.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::App;
use crate::games::puzzle::{
    BoardLayout, GameSession, Notice, Phase, PieceGrid, RoundStatus, Submission, Tone, Urgency,
};

const MAX_CELL_WIDTH: u16 = 12;
const MAX_CELL_HEIGHT: u16 = 5;

/// Draws the whole screen and records the board layout in `app`.
pub fn draw(frame: &mut Frame, app: &mut App, session: &GameSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new("Swap Puzzle")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    match session.phase() {
        Phase::NameEntry => draw_name_entry(frame, chunks[1], app),
        Phase::Playing => draw_playing(frame, chunks[1], app, session),
        Phase::Summary => draw_summary(frame, chunks[1], app, session),
    }

    draw_message(frame, chunks[2], session.message());

    let help_text = match session.phase() {
        Phase::NameEntry => "Type your name | Enter: Start | Esc: Quit",
        Phase::Playing if session.status() == RoundStatus::LoadFailed => {
            "R: Retry | N: New game | Q: Quit"
        }
        Phase::Playing => {
            "Arrows/hjkl: Move | Space: Pick/Swap | Drag: Swap | Esc: Unpick | N: New game | Q: Quit"
        }
        Phase::Summary => "Enter/P: Play again | Q: Quit",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

fn draw_name_entry(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(app.name_input())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Your name (blank plays as Anonymous)"),
        );
    frame.render_widget(input, chunks[0]);
    draw_leaderboard(frame, chunks[1], app);
}

fn draw_playing(frame: &mut Frame, area: Rect, app: &mut App, session: &GameSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let title = session
        .entry()
        .map(|entry| entry.title().as_str())
        .unwrap_or("");
    let timer = session.timer();
    let timer_color = match timer.urgency() {
        Urgency::Calm => Color::Green,
        Urgency::Warning => Color::Yellow,
        Urgency::Critical => Color::Red,
    };
    let header = Line::from(vec![
        Span::raw(format!(
            "Round {}/{}   Score {}   ",
            session.round(),
            session.total_rounds(),
            session.score()
        )),
        Span::styled(
            format!("Time {}", timer.clock()),
            Style::default().fg(timer_color).add_modifier(Modifier::BOLD),
        ),
    ]);
    let header = Paragraph::new(header)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(header, chunks[0]);

    match (session.status(), session.grid()) {
        (RoundStatus::Loading, _) => {
            let loading = Paragraph::new("Loading image...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, chunks[1]);
            app.set_layout(BoardLayout::default());
        }
        (RoundStatus::LoadFailed, _) | (_, None) => {
            app.set_layout(BoardLayout::default());
        }
        (_, Some(grid)) => draw_board(frame, chunks[1], app, grid),
    }
}

fn draw_board(frame: &mut Frame, area: Rect, app: &mut App, grid: &PieceGrid) {
    let rows = u16::try_from(grid.rows()).unwrap_or(u16::MAX).max(1);
    let cols = u16::try_from(grid.cols()).unwrap_or(u16::MAX).max(1);
    let cell_width = (area.width / cols).clamp(1, MAX_CELL_WIDTH);
    let cell_height = (area.height / rows).clamp(1, MAX_CELL_HEIGHT);
    let origin_x = area.x + area.width.saturating_sub(cell_width.saturating_mul(cols)) / 2;
    let origin_y = area.y + area.height.saturating_sub(cell_height.saturating_mul(rows)) / 2;
    let layout = BoardLayout::new(origin_x, origin_y, cell_width, cell_height, rows, cols);
    app.set_layout(layout);

    let cursor = app.selector().cursor();
    let picked = app.selector().picked().or(app.dragged_cell());
    for (cell, piece) in grid.pieces().iter().enumerate() {
        let (x, y) = layout.cell_origin(cell);
        let rect = Rect::new(x, y, cell_width, cell_height).intersection(area);
        let (offset_x, offset_y) = grid.image_offset(piece);
        let background = piece_color(offset_x, offset_y);

        let mut style = Style::default().bg(background).fg(Color::White);
        if piece.is_home() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if Some(cell) == picked {
            style = style.bg(Color::Yellow).fg(Color::Black);
        }
        let borders = if cell == cursor { Borders::ALL } else { Borders::NONE };
        let label = if piece.is_home() {
            format!("{}*", piece.id() + 1)
        } else {
            format!("{}", piece.id() + 1)
        };
        let tile = Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(borders));
        frame.render_widget(tile, rect);
    }
}

/// Colour standing in for the slice of the image a piece shows.
fn piece_color(offset_x: u32, offset_y: u32) -> Color {
    let scale = |percent: u32| u8::try_from(40 + percent.min(100) * 180 / 100).unwrap_or(u8::MAX);
    Color::Rgb(scale(offset_x), scale(offset_y), 150)
}

fn draw_summary(frame: &mut Frame, area: Rect, app: &App, session: &GameSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let final_score = session.final_score().unwrap_or(0);
    let rating = session.rating().map(|r| r.message()).unwrap_or("");
    let submission = match session.submission() {
        Submission::Idle => String::new(),
        Submission::Pending => "Saving score...".to_string(),
        Submission::Saved(_) => "Score saved to the leaderboard.".to_string(),
        Submission::Failed(reason) => format!("Could not save score: {}", reason),
    };
    let text = format!(
        "{}, your final score: {}/{}\n{}\n\n{}",
        session.player_name(),
        final_score,
        session.total_rounds(),
        rating,
        submission
    );
    let summary = Paragraph::new(text)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Game Over"));
    frame.render_widget(summary, chunks[0]);
    draw_leaderboard(frame, chunks[1], app);
}

fn draw_leaderboard(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Leaderboard");
    if let Some(error) = app.leaderboard_error() {
        let paragraph = Paragraph::new(format!("Failed to fetch scores: {}", error))
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    if app.leaderboard_loading() && app.leaderboard().is_empty() {
        let paragraph = Paragraph::new("Loading scores...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("#").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Player").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Score").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("When").style(Style::default().add_modifier(Modifier::BOLD)),
    ])
    .style(Style::default().fg(Color::Yellow));

    let rows: Vec<Row> = app
        .leaderboard()
        .iter()
        .enumerate()
        .map(|(rank, record)| {
            Row::new(vec![
                Cell::from((rank + 1).to_string()),
                Cell::from(record.player_name().as_str()),
                Cell::from(record.score().to_string()),
                Cell::from(record.created_at().format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(45),
        Constraint::Length(7),
        Constraint::Min(16),
    ];
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn draw_message(frame: &mut Frame, area: Rect, message: Option<&Notice>) {
    let (text, color) = match message {
        Some(notice) => (
            notice.text(),
            match notice.tone() {
                Tone::Success => Color::Green,
                Tone::Error => Color::Red,
            },
        ),
        None => ("", Color::White),
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(paragraph, area);
}
