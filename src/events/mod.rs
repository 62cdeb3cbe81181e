//! Notice-message event types and the in-process event bus.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{NoticeMessage, NotificationType};
