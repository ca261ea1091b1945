pub mod request;
pub mod fragment;
pub mod event;

pub use request::ChatRequest;
pub use fragment::ResponseFragment;
pub use event::RelayEvent;
