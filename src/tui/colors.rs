//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Ideal burndown line
pub const IDEAL_GRAY: Color = Color::Rgb(140, 140, 140);
/// Actual burndown line, status bar
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Due burndown line
pub const DARK_PURPLE: Color = Color::Rgb(150, 110, 170);
/// Completed leaves
pub const DARK_GREEN: Color = Color::Rgb(0, 120, 0);
/// Overdue leaves, confirm dialog
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
