pub mod session;

pub use session::{SessionStats, format_clock};
