pub mod census_client;
pub mod health_service;
pub mod report_service;
pub mod stream_service;

pub use census_client::*;
pub use health_service::*;
pub use report_service::*;
pub use stream_service::*;
