//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    Help,
    Confirm,
}

/// Which pane receives the navigation keys.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Focus {
    #[default]
    Tree,
    Agenda,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Tree => Focus::Agenda,
            Focus::Agenda => Focus::Tree,
        }
    }
}
