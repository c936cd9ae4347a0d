use anyhow::Result;
use castplay_core::PlayerEngineHandle;
use ratatui::{Frame, crossterm::event::KeyCode, layout::Rect};
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    routes::{log::LogRoute, player::PlayerRoute, queue::QueueRoute},
    state::AppState,
};

/// Top level tabs shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, strum::Display)]
pub enum Tab {
    #[strum(serialize = "Player")]
    Player,
    #[strum(serialize = "Queue")]
    Queue,
    #[strum(serialize = "Log")]
    Log,
}

impl Tab {
    pub fn next(self) -> Tab {
        let tabs: Vec<Tab> = Tab::iter().collect();
        let idx = tabs.iter().position(|t| *t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }

    pub fn route(self) -> Box<dyn RouteHandler> {
        match self {
            Tab::Player => Box::new(PlayerRoute),
            Tab::Queue => Box::new(QueueRoute),
            Tab::Log => Box::new(LogRoute::new()),
        }
    }
}

/// Trait that all routes must implement
pub trait RouteHandler: std::fmt::Debug {
    /// Render this route's UI
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);

    /// Handle keyboard input for this route
    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerEngineHandle,
    ) -> Result<RouteAction>;

    /// Tab this route belongs to
    fn tab(&self) -> Tab;

    /// Key hints for the controls bar
    fn help_items(&self, _state: &AppState) -> Vec<(&'static str, &'static str)> {
        vec![("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Actions that can be returned from route handlers
#[derive(Debug)]
pub enum RouteAction {
    /// Do nothing, stay on current route
    None,
    /// Replace current route with a new one
    Replace(Box<dyn RouteHandler>),
    /// Quit the application
    Quit,
}

/// Router holds the route currently on screen
pub struct Router {
    current: Box<dyn RouteHandler>,
}

impl Router {
    pub fn new(initial_route: Box<dyn RouteHandler>) -> Self {
        Self { current: initial_route }
    }

    pub fn current(&self) -> &dyn RouteHandler {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut Box<dyn RouteHandler> {
        &mut self.current
    }

    /// Execute a route action, returns true when the app should quit
    pub fn execute_action(&mut self, action: RouteAction) -> bool {
        match action {
            RouteAction::None => false,
            RouteAction::Replace(route) => {
                self.replace(route);
                false
            }
            RouteAction::Quit => true,
        }
    }

    /// Replace current route (tab switching)
    pub fn replace(&mut self, new_route: Box<dyn RouteHandler>) {
        log::debug!("Switching to {} tab", new_route.tab());
        self.current = new_route;
    }

    /// Move to the next tab
    pub fn cycle(&mut self) {
        let next = self.current.tab().next();
        self.replace(next.route());
    }
}
