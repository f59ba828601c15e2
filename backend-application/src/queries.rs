pub mod report_queries;
pub mod team_queries;
