pub mod clickhouse_repo;
pub mod memory_repo;
pub mod reference_files;

pub use clickhouse_repo::*;
pub use memory_repo::*;
pub use reference_files::*;
