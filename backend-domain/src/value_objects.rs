// Domain value objects
pub mod character_id;
pub mod interaction_kind;
pub mod vehicle_status;

pub use character_id::*;
pub use interaction_kind::*;
pub use vehicle_status::*;
