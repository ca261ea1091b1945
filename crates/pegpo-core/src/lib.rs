pub mod chat;
pub mod intake;
pub mod relay;

pub use chat::{
    ChatRequest,
    ResponseFragment,
    RelayEvent,
};

pub use intake::{parse_http_body, parse_http_chat, parse_socket_frame, HttpChat, IntakeError};
pub use relay::{relay, Relay, RelayState, RelayStream};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
