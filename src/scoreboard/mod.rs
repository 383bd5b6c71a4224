pub mod messages;

pub use messages::{classify_event, EventDisposition};
