pub mod ingest_handlers;
pub mod ops_handlers;
pub mod report_handlers;
pub mod team_handlers;

pub use ingest_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
pub use team_handlers::*;
