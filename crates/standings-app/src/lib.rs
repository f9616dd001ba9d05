// Library root: configuration, snapshot sources, the channel protocol, and
// the application event loop. Shared by the TUI binary and integration tests.

pub mod app;
pub mod config;
pub mod protocol;
pub mod source;
