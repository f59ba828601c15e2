use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clickhouse::Client;
use time::OffsetDateTime;

use backend_domain::ports::{EventRepository, TeamRepository};
use backend_domain::{
    EnrichedEvent, EventKind, ReportScope, SessionEventRow, Team, TrackedCharacter, TrackedOutfit,
};

const EVENT_COLUMNS: &str = "event_time, event_kind, character_id, character_name, team_id, \
     other_id, other_name, other_team_id, payload, seq";

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
    next_seq: Arc<AtomicU64>,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String) -> Self {
        // nanosecond start keeps sequences increasing across restarts
        let seed = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos()).unwrap_or(0);
        Self {
            client,
            database,
            next_seq: Arc::new(AtomicU64::new(seed)),
        }
    }

    async fn create_tables(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        // the target database may not exist yet
        self.client
            .clone()
            .with_database("default")
            .query(&create_db)
            .execute()
            .await?;

        let create_events = r#"
CREATE TABLE IF NOT EXISTS session_events (
    event_time DateTime,
    event_kind LowCardinality(String),
    character_id String,
    character_name String,
    team_id String,
    other_id String,
    other_name String,
    other_team_id String,
    payload String,
    seq UInt64
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_kind, event_time, seq)
"#;
        self.client.query(create_events).execute().await?;
        // tables created before the insert sequence existed
        self.client
            .query("ALTER TABLE session_events ADD COLUMN IF NOT EXISTS seq UInt64")
            .execute()
            .await?;

        let create_teams = r#"
CREATE TABLE IF NOT EXISTS teams (
    team_id String,
    team_tag String,
    team_name String
) ENGINE = ReplacingMergeTree
ORDER BY team_id
"#;
        self.client.query(create_teams).execute().await?;

        let create_tracked = r#"
CREATE TABLE IF NOT EXISTS tracked_characters (
    character_id String,
    name String,
    team_id String,
    faction Nullable(String),
    server Nullable(String)
) ENGINE = ReplacingMergeTree
ORDER BY character_id
"#;
        self.client.query(create_tracked).execute().await?;

        let create_outfits = r#"
CREATE TABLE IF NOT EXISTS tracked_outfits (
    outfit_id String,
    outfit_tag String,
    outfit_name String,
    team_id String,
    member_count UInt64,
    faction Nullable(String),
    server Nullable(String)
) ENGINE = ReplacingMergeTree
ORDER BY outfit_id
"#;
        self.client.query(create_outfits).execute().await?;
        Ok(())
    }
}

/// Range scan for one kind; same-second events come back in insert order.
fn range_sql(scope: &ReportScope) -> String {
    let filter = match scope {
        ReportScope::Team(_) => "(team_id = ? OR other_team_id = ?)",
        ReportScope::Characters(_) => {
            "(has(?, lower(character_name)) OR has(?, lower(other_name)))"
        }
    };
    format!(
        "SELECT {} FROM session_events \
         WHERE event_kind = ? AND event_time >= toDateTime(?) AND event_time <= toDateTime(?) \
         AND {} ORDER BY event_time, seq",
        EVENT_COLUMNS, filter
    )
}

#[async_trait]
impl EventRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        self.create_tables().await
    }

    async fn append(&self, event: &EnrichedEvent) -> Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let row = SessionEventRow::from_event(event, seq)?;
        let mut insert = self.client.insert("session_events")?;
        insert.write(&row).await?;
        insert.end().await?;
        Ok(())
    }

    async fn query_range(
        &self,
        kind: EventKind,
        scope: &ReportScope,
        start: i64,
        end: i64,
    ) -> Result<Vec<EnrichedEvent>> {
        let sql = range_sql(scope);
        let query = match scope {
            ReportScope::Team(team) => self
                .client
                .query(&sql)
                .bind(kind.as_str())
                .bind(start)
                .bind(end)
                .bind(team.team_id.as_str())
                .bind(team.team_id.as_str()),
            ReportScope::Characters(names) => self
                .client
                .query(&sql)
                .bind(kind.as_str())
                .bind(start)
                .bind(end)
                .bind(names.as_slice())
                .bind(names.as_slice()),
        };
        let rows = query.fetch_all::<SessionEventRow>().await?;
        // participants outside subject/counterpart are only visible in the payload
        let events = rows
            .iter()
            .map(SessionEventRow::to_event)
            .collect::<Result<Vec<_>>>()?;
        Ok(events)
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for ClickhouseRepo {
    async fn find_team(&self, team_tag: &str) -> Result<Option<Team>> {
        let team = self
            .client
            .query(
                "SELECT team_id, team_tag, team_name FROM teams FINAL \
                 WHERE lower(team_tag) = lower(?) LIMIT 1",
            )
            .bind(team_tag)
            .fetch_optional::<Team>()
            .await?;
        Ok(team)
    }

    async fn list_teams(&self) -> Result<Vec<Team>> {
        let teams = self
            .client
            .query("SELECT team_id, team_tag, team_name FROM teams FINAL ORDER BY team_tag")
            .fetch_all::<Team>()
            .await?;
        Ok(teams)
    }

    async fn save_team(&self, team: &Team) -> Result<()> {
        let mut insert = self.client.insert("teams")?;
        insert.write(team).await?;
        insert.end().await?;
        Ok(())
    }

    async fn tracked_characters(&self) -> Result<Vec<TrackedCharacter>> {
        let characters = self
            .client
            .query(
                "SELECT character_id, name, team_id, faction, server \
                 FROM tracked_characters FINAL",
            )
            .fetch_all::<TrackedCharacter>()
            .await?;
        Ok(characters)
    }

    async fn save_tracked_character(&self, character: &TrackedCharacter) -> Result<()> {
        let mut insert = self.client.insert("tracked_characters")?;
        insert.write(character).await?;
        insert.end().await?;
        Ok(())
    }

    async fn remove_tracked_character(&self, character_id: &str) -> Result<()> {
        self.client
            .query("DELETE FROM tracked_characters WHERE character_id = ?")
            .bind(character_id)
            .execute()
            .await?;
        Ok(())
    }

    async fn tracked_outfits(&self) -> Result<Vec<TrackedOutfit>> {
        let outfits = self
            .client
            .query(
                "SELECT outfit_id, outfit_tag, outfit_name, team_id, member_count, faction, server \
                 FROM tracked_outfits FINAL ORDER BY outfit_tag",
            )
            .fetch_all::<TrackedOutfit>()
            .await?;
        Ok(outfits)
    }

    async fn save_tracked_outfit(&self, outfit: &TrackedOutfit) -> Result<()> {
        let mut insert = self.client.insert("tracked_outfits")?;
        insert.write(outfit).await?;
        insert.end().await?;
        Ok(())
    }

    async fn remove_tracked_outfit(&self, outfit_id: &str) -> Result<()> {
        self.client
            .query("DELETE FROM tracked_outfits WHERE outfit_id = ?")
            .bind(outfit_id)
            .execute()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_queries_break_time_ties_by_insert_order() {
        let team = ReportScope::Team(Team {
            team_id: "t-1".into(),
            team_tag: "WFAT".into(),
            team_name: "Wolfpack".into(),
        });
        let characters = ReportScope::characters(["alice"]);
        for scope in [&team, &characters] {
            let sql = range_sql(scope);
            assert!(sql.ends_with("ORDER BY event_time, seq"), "{}", sql);
            assert!(sql.contains("payload, seq FROM session_events"));
            assert_eq!(sql.matches('?').count(), 5);
        }
        assert!(range_sql(&team).contains("other_team_id = ?"));
        assert!(range_sql(&characters).contains("lower(other_name)"));
    }

    #[test]
    fn insert_sequence_starts_from_the_clock() {
        let repo = ClickhouseRepo::new(Client::default(), "warlog".into());
        let first = repo.next_seq.fetch_add(1, Ordering::Relaxed);
        let second = repo.next_seq.fetch_add(1, Ordering::Relaxed);
        assert!(first > 1_600_000_000_000_000_000);
        assert_eq!(second, first + 1);
    }
}
