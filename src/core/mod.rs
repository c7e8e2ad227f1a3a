//! Process-wide state.

mod state;

pub use state::{defer_exit, is_shutdown, register_server, setup_shutdown_handler};
