// TUI widget modules for each dashboard panel.

pub mod change_bar;
pub mod metadata;
pub mod prompt;
pub mod scoreboard;
pub mod status_bar;
