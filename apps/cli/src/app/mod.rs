//! Application wiring.

mod navigator;
mod state;

pub use navigator::TerminalNavigator;
pub use state::AppContext;
