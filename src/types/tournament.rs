//! Tournament and team records returned by the backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{TeamId, TournamentId, UserId};

/// A read-only reference to a tournament, fetched publicly by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub slug: String,
    pub name: String,

    /// Maximum roster size including the leader.
    #[serde(rename = "max_players_per_team", default)]
    pub max_team_size: Option<u32>,

    #[serde(default)]
    pub max_teams: Option<u32>,

    /// Scheduled start. Naive timestamps are read as UTC; unparseable values as absent.
    #[serde(default, deserialize_with = "deserialize_lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub game: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl Tournament {
    /// Roster capacity for teams in this tournament.
    ///
    /// Never below 1: the leader always occupies a slot.
    pub fn team_capacity(&self) -> usize {
        self.max_team_size.unwrap_or(1).max(1) as usize
    }
}

/// A team the backend has created. Holding one means the team has an assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTeam {
    pub id: TeamId,
    pub name: String,
    pub tournament_id: TournamentId,
    pub leader_id: UserId,
    #[serde(default)]
    pub slug: Option<String>,
}

fn deserialize_lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
