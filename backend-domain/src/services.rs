// Domain Services
// Pure session reconstruction over an already-fetched, timestamp-ordered event log.

pub mod buckets;
pub mod class_timeline;
pub mod community;
pub mod graph_coloring;
pub mod interaction_graph;
pub mod interaction_timeline;
pub mod vehicle_timeline;

pub use buckets::*;
pub use class_timeline::*;
pub use community::*;
pub use graph_coloring::*;
pub use interaction_graph::*;
pub use interaction_timeline::*;
pub use vehicle_timeline::*;
