// Domain entities

pub mod analytics;
pub mod config;
pub mod enriched_event;
pub mod event_row;
pub mod raw_event;
pub mod reference;
pub mod requests;
pub mod team;

pub use analytics::*;
pub use config::*;
pub use enriched_event::*;
pub use event_row::*;
pub use raw_event::*;
pub use reference::*;
pub use requests::*;
pub use team::*;
