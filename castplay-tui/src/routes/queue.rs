use castplay_core::{PlayerEngineHandle, QueueCommand};
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{router::{RouteAction, RouteHandler, Tab}, state::AppState};

/// Queue route: pick an episode and play it alone or the whole list from it
#[derive(Debug, Clone)]
pub struct QueueRoute;

impl RouteHandler for QueueRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_queue_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerEngineHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => state.library_prev(),
            KeyCode::Down => state.library_next(),
            KeyCode::Enter => {
                if let Some(start) = state.library_selected() {
                    handle.cmd_tx.send(
                        QueueCommand::PlayList { episodes: state.library.clone(), start }.into()
                    )?;
                    return Ok(RouteAction::Replace(Tab::Player.route()));
                }
            }
            KeyCode::Char('o') => {
                if let Some(episode) = state.library_selected().map(|i| state.library[i].clone()) {
                    handle.cmd_tx.send(QueueCommand::Play(episode).into())?;
                    return Ok(RouteAction::Replace(Tab::Player.route()));
                }
            }
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn tab(&self) -> Tab {
        Tab::Queue
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&'static str, &'static str)> {
        vec![
            ("↑/↓", "Navigate"),
            ("Enter", "Play from here"),
            ("O", "Play only this"),
            ("Space", "Play/Pause"),
            ("N/P", "Next/Prev"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

/// Draw the queue panel
pub fn draw_queue_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(" Episodes ({}) ", state.library.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    // the library is only marked while it is what the engine is playing
    let playing_library = state.queue.items == state.library;
    let items: Vec<ListItem> = state
        .library
        .iter()
        .enumerate()
        .map(|(i, episode)| {
            let is_current = playing_library && state.queue.current_index == i;
            let prefix = if is_current { "▶ " } else { "  " };
            let style = if is_current {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{}{}", prefix, episode)).style(style)
        })
        .collect();

    if items.is_empty() {
        let empty_msg = Paragraph::new("No episodes. Pass audio files on the command line.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty_msg, area);
    } else {
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let mut list_state = state.queue_state.clone();
        f.render_stateful_widget(list, area, &mut list_state);
    }
}
