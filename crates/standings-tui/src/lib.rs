// Library root: the terminal renderer, exposed for tests.

pub mod tui;
