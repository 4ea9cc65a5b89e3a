//! Local front-ends: a terminal UI and a line-based headless mode, both
//! hotseat games between two people sharing one keyboard.

mod app;
mod game_view;
mod headless;
mod messages;

pub use app::App;
pub use headless::HeadlessTable;
pub use messages::{describe_result, describe_update};

/// Registry key for the single game a local front-end runs.
pub const LOCAL_SESSION: &str = "local";
