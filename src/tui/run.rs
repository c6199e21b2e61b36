//! Terminal setup and teardown around the [`App`] loop.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::config::Settings;
use crate::db::autosave;
use crate::error::Result;
use crate::tui::app::App;

/// Initialise and run the terminal user interface.
/// Every change made in the interface is saved as it happens.
pub fn run_tui(settings: &Settings) -> Result<()> {
    let mut store = settings.open_store()?;
    store.subscribe(autosave(settings.db_path.clone()));
    let mut app = App::new(store, settings.today);
    info!(db = %settings.db_path.display(), "starting ui");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
