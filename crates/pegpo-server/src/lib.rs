pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;
pub mod websocket;

pub use error::ChatError;
pub use server::{create_router, run_server};
pub use state::{build_gateway, AppState};
