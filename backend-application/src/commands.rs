pub mod ingest_commands;
pub mod team_commands;
