use castplay_core::{PlayerCommand, PlayerEngineHandle, SeekInput};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::{router::{RouteAction, RouteHandler, Tab}, state::AppState};

/// Seconds moved by one arrow press
const SEEK_STEP: i64 = 5;

// ==================================================================
// Player Route Implementation
// ==================================================================

#[derive(Debug, Clone)]
pub struct PlayerRoute;

impl RouteHandler for PlayerRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_player_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerEngineHandle,
    ) -> anyhow::Result<RouteAction> {
        let delta = match key {
            KeyCode::Right => SEEK_STEP,
            KeyCode::Left => -SEEK_STEP,
            _ => return Ok(RouteAction::None),
        };

        if state.can_seek() {
            let target = state.seek_target(delta);
            handle.cmd_tx.send(PlayerCommand::Seek(SeekInput::Position(target)))?;
        }
        Ok(RouteAction::None)
    }

    fn tab(&self) -> Tab {
        Tab::Player
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&'static str, &'static str)> {
        vec![
            ("Space", "Play/Pause"),
            ("N/P", "Next/Prev"),
            ("S", "Shuffle"),
            ("L", "Loop"),
            ("←/→", "Seek"),
            ("C", "Clear"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

/// Draw the player panel
pub fn draw_player_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Now playing info
            Constraint::Length(3), // Progress bar
            Constraint::Length(3), // Buttons
            Constraint::Min(0),    // Spacer
        ])
        .split(area);

    draw_now_playing(f, chunks[0], state);
    draw_progress(f, chunks[1], state);
    draw_buttons(f, chunks[2], state);
}

/// Draw the now playing section
fn draw_now_playing(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" 🎧 Now Playing ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(episode) = state.current() {
        let mut text = vec![
            Line::from(vec![Span::styled(
                episode.title.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![Span::styled(episode.members.as_str(), Style::default().fg(Color::Gray))]),
        ];
        if !episode.thumbnail.is_empty() {
            text.push(Line::from(vec![Span::styled(
                format!("Artwork: {}", episode.thumbnail),
                Style::default().fg(Color::DarkGray),
            )]));
        }

        f.render_widget(Paragraph::new(text), inner);
    } else {
        let text = Paragraph::new("Select an episode to listen to")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(text, inner);
    }
}

/// Draw the progress bar
fn draw_progress(f: &mut Frame, area: Rect, state: &AppState) {
    let duration = state.current().map(|e| e.duration).unwrap_or(0);
    let label = format!(
        "{} / {}",
        AppState::format_time(state.elapsed),
        AppState::format_time(duration)
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
        .ratio(state.progress())
        .label(label);

    f.render_widget(gauge, area);
}

/// Draw the control buttons, dimmed when unavailable
fn draw_buttons(f: &mut Frame, area: Rect, state: &AppState) {
    let button = |label: &'static str, enabled: bool, active: bool| {
        let style = if !enabled {
            Style::default().fg(Color::DarkGray)
        } else if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        Span::styled(format!(" {} ", label), style)
    };

    let play_label = if state.queue.is_playing { "⏸ Pause" } else { "▶ Play" };
    let buttons = Line::from(vec![
        button("🔀 Shuffle", state.can_shuffle(), state.queue.is_shuffling),
        button("⏮ Prev", state.can_play_previous(), false),
        button(play_label, state.can_toggle_play(), false),
        button("⏭ Next", state.can_play_next(), false),
        button("🔁 Loop", state.can_loop(), state.queue.is_looping),
    ]);

    let paragraph = Paragraph::new(buttons).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
