use castplay_core::PlayerEngineHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use tui_logger::{TuiLoggerWidget, TuiWidgetEvent, TuiWidgetState};

use crate::{router::{RouteAction, RouteHandler, Tab}, state::AppState};

/// Log route, scrollable through tui-logger's page mode
pub struct LogRoute {
    widget_state: TuiWidgetState,
}

impl std::fmt::Debug for LogRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRoute").finish_non_exhaustive()
    }
}

impl LogRoute {
    pub fn new() -> Self {
        Self { widget_state: TuiWidgetState::new() }
    }
}

impl RouteHandler for LogRoute {
    fn render(&self, frame: &mut Frame, area: Rect, _state: &AppState) {
        let log_widget = TuiLoggerWidget::default()
            .block(
                Block::default()
                    .title(" 📋 Log (PgUp/PgDn to Scroll) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            )
            .style(Style::default().fg(Color::White))
            .state(&self.widget_state);

        frame.render_widget(log_widget, area);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        _state: &mut AppState,
        _handle: &PlayerEngineHandle,
    ) -> anyhow::Result<RouteAction> {
        let event = match key {
            KeyCode::PageUp | KeyCode::Up => TuiWidgetEvent::PrevPageKey,
            KeyCode::PageDown | KeyCode::Down => TuiWidgetEvent::NextPageKey,
            KeyCode::End => TuiWidgetEvent::EscapeKey,
            _ => return Ok(RouteAction::None),
        };
        self.widget_state.transition(event);
        Ok(RouteAction::None)
    }

    fn tab(&self) -> Tab {
        Tab::Log
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&'static str, &'static str)> {
        vec![
            ("PgUp/PgDn", "Scroll"),
            ("End", "Follow"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}
