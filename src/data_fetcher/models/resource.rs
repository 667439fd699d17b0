use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A named category of cached API response.
///
/// Every kind owns its own cache table. Single-value kinds hold one entry,
/// keyed kinds hold one entry per request-parameter fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Timezone,
    Seasons,
    Countries,
    Leagues,
    Teams,
    TeamStatistics,
    Players,
    Games,
    GameStatistics,
    Standings,
    StandingsStages,
    StandingsGroups,
    Odds,
    Bookmakers,
    Bets,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 15] = [
        ResourceKind::Timezone,
        ResourceKind::Seasons,
        ResourceKind::Countries,
        ResourceKind::Leagues,
        ResourceKind::Teams,
        ResourceKind::TeamStatistics,
        ResourceKind::Players,
        ResourceKind::Games,
        ResourceKind::GameStatistics,
        ResourceKind::Standings,
        ResourceKind::StandingsStages,
        ResourceKind::StandingsGroups,
        ResourceKind::Odds,
        ResourceKind::Bookmakers,
        ResourceKind::Bets,
    ];

    /// Field name used in the persisted cache document and on the command line.
    pub fn field_name(self) -> &'static str {
        match self {
            ResourceKind::Timezone => "timezone",
            ResourceKind::Seasons => "seasons",
            ResourceKind::Countries => "countries",
            ResourceKind::Leagues => "leagues",
            ResourceKind::Teams => "teams",
            ResourceKind::TeamStatistics => "teamStatistics",
            ResourceKind::Players => "players",
            ResourceKind::Games => "games",
            ResourceKind::GameStatistics => "gameStatistics",
            ResourceKind::Standings => "standings",
            ResourceKind::StandingsStages => "standingsStages",
            ResourceKind::StandingsGroups => "standingsGroups",
            ResourceKind::Odds => "odds",
            ResourceKind::Bookmakers => "bookmakers",
            ResourceKind::Bets => "bets",
        }
    }

    /// Whether entries of this kind are addressed by a parameter fingerprint.
    pub fn is_keyed(self) -> bool {
        !matches!(
            self,
            ResourceKind::Timezone | ResourceKind::Seasons | ResourceKind::Countries
        )
    }

    /// Endpoint path shared by most sports. Sports that deviate override it
    /// in [`Sport::path_for`](super::Sport::path_for).
    pub fn default_path(self) -> &'static str {
        match self {
            ResourceKind::Timezone => "timezone",
            ResourceKind::Seasons => "seasons",
            ResourceKind::Countries => "countries",
            ResourceKind::Leagues => "leagues",
            ResourceKind::Teams => "teams",
            ResourceKind::TeamStatistics => "teams/statistics",
            ResourceKind::Players => "players",
            ResourceKind::Games => "games",
            ResourceKind::GameStatistics => "games/statistics",
            ResourceKind::Standings => "standings",
            ResourceKind::StandingsStages => "standings/stages",
            ResourceKind::StandingsGroups => "standings/groups",
            ResourceKind::Odds => "odds",
            ResourceKind::Bookmakers => "odds/bookmakers",
            ResourceKind::Bets => "odds/bets",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.field_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::invalid_parameter(format!("Unknown resource kind '{s}'")))
    }
}
