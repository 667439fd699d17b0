use std::fmt;
use std::str::FromStr;

use super::resource::ResourceKind;
use crate::constants::persistence::STORE_NAME_SUFFIX;
use crate::error::AppError;

/// The sports whose data APIs share the envelope format and the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sport {
    Baseball,
    Handball,
    Rugby,
    Volleyball,
    AmericanFootball,
    Formula1,
    Mma,
    Football,
}

impl Sport {
    pub const ALL: [Sport; 8] = [
        Sport::Baseball,
        Sport::Handball,
        Sport::Rugby,
        Sport::Volleyball,
        Sport::AmericanFootball,
        Sport::Formula1,
        Sport::Mma,
        Sport::Football,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Sport::Baseball => "baseball",
            Sport::Handball => "handball",
            Sport::Rugby => "rugby",
            Sport::Volleyball => "volleyball",
            Sport::AmericanFootball => "american-football",
            Sport::Formula1 => "formula-1",
            Sport::Mma => "mma",
            Sport::Football => "football",
        }
    }

    /// Default API base URL, without a trailing slash.
    pub fn base_url(self) -> &'static str {
        match self {
            Sport::Baseball => "https://v1.baseball.api-sports.io",
            Sport::Handball => "https://v1.handball.api-sports.io",
            Sport::Rugby => "https://v1.rugby.api-sports.io",
            Sport::Volleyball => "https://v1.volleyball.api-sports.io",
            Sport::AmericanFootball => "https://v1.american-football.api-sports.io",
            Sport::Formula1 => "https://v1.formula-1.api-sports.io",
            Sport::Mma => "https://v1.mma.api-sports.io",
            Sport::Football => "https://v3.football.api-sports.io",
        }
    }

    /// Endpoint path for `kind` on this sport's API, or `None` when the API
    /// has no such resource.
    pub fn path_for(self, kind: ResourceKind) -> Option<&'static str> {
        use ResourceKind::*;

        match (self, kind) {
            (Sport::Football, Seasons) => Some("leagues/seasons"),
            (Sport::Football, Games) => Some("fixtures"),
            (Sport::Football, GameStatistics) => Some("fixtures/statistics"),
            (Sport::Football, StandingsStages | StandingsGroups) => None,

            (Sport::Formula1, Games) => Some("races"),
            (Sport::Formula1, Standings) => Some("rankings/drivers"),
            (Sport::Formula1, TeamStatistics | GameStatistics) => None,
            (Sport::Formula1, StandingsStages | StandingsGroups) => None,
            (Sport::Formula1, Countries | Leagues | Players) => None,
            (Sport::Formula1, Odds | Bookmakers | Bets) => None,

            (Sport::Mma, Games) => Some("fights"),
            (Sport::Mma, Players) => Some("fighters"),
            (Sport::Mma, GameStatistics) => Some("fights/statistics/fighters"),
            (Sport::Mma, Leagues | Standings | StandingsStages | StandingsGroups) => None,
            (Sport::Mma, TeamStatistics) => None,

            (Sport::AmericanFootball, StandingsStages) => Some("standings/conferences"),
            (Sport::AmericanFootball, StandingsGroups) => Some("standings/divisions"),
            (Sport::AmericanFootball, Countries) => None,
            (Sport::AmericanFootball, TeamStatistics) => None,
            (Sport::AmericanFootball, GameStatistics) => Some("games/statistics/teams"),

            (Sport::Baseball | Sport::Handball | Sport::Rugby | Sport::Volleyball, Players) => None,
            (Sport::Baseball | Sport::Handball | Sport::Rugby | Sport::Volleyball, GameStatistics) => {
                None
            }

            (_, kind) => Some(kind.default_path()),
        }
    }

    /// Name of the persisted cache for this sport, e.g. `rugby-cache`.
    pub fn cache_store_name(self) -> String {
        format!("{}-{}", self.slug(), STORE_NAME_SUFFIX)
    }

    pub fn supports(self, kind: ResourceKind) -> bool {
        self.path_for(kind).is_some()
    }

    /// Resource kinds this sport's API exposes.
    pub fn resource_kinds(self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.supports(*kind))
            .collect()
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Sport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "f1" | "formula1" => return Ok(Sport::Formula1),
            "nfl" | "americanfootball" => return Ok(Sport::AmericanFootball),
            "soccer" => return Ok(Sport::Football),
            _ => {}
        }
        Sport::ALL
            .iter()
            .copied()
            .find(|sport| sport.slug() == normalized)
            .ok_or_else(|| AppError::invalid_parameter(format!("Unknown sport '{s}'")))
    }
}
