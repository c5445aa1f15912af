pub mod health;
pub mod stats;
pub mod ws;

pub use health::health;
pub use stats::stats;
pub use ws::handle_socket;
