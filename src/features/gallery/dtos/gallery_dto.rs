use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::core::error::AppError;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::PaginationQuery;

/// Collections served by the gallery endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    Clubs,
    Cars,
    Events,
}

impl GalleryKind {
    pub fn list_procedure(&self) -> &'static str {
        match self {
            GalleryKind::Clubs => "get_clubs_gallery",
            GalleryKind::Cars => "get_cars_gallery",
            GalleryKind::Events => "get_events_gallery",
        }
    }

    pub fn detail_procedure(&self) -> &'static str {
        match self {
            GalleryKind::Clubs => "get_club_detail",
            GalleryKind::Cars => "get_car_detail",
            GalleryKind::Events => "get_event_detail",
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            GalleryKind::Clubs => "Club not found",
            GalleryKind::Cars => "Car not found",
            GalleryKind::Events => "Event not found",
        }
    }
}

/// Ranking boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Leaderboard {
    Horsepower,
    ClubMembers,
    EventAttendance,
    GarageSize,
}

impl Leaderboard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Leaderboard::Horsepower => "horsepower",
            Leaderboard::ClubMembers => "club_members",
            Leaderboard::EventAttendance => "event_attendance",
            Leaderboard::GarageSize => "garage_size",
        }
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Leaderboard {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horsepower" => Ok(Leaderboard::Horsepower),
            "club_members" => Ok(Leaderboard::ClubMembers),
            "event_attendance" => Ok(Leaderboard::EventAttendance),
            "garage_size" => Ok(Leaderboard::GarageSize),
            other => Err(AppError::BadRequest(format!(
                "Unknown leaderboard '{}'",
                other
            ))),
        }
    }
}

/// Query parameters for the events gallery
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Only events that have not started yet
    #[serde(default)]
    pub upcoming: bool,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl EventsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Entries to return (default: 10, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

impl LeaderboardQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One gallery record as produced by its aggregation procedure.
///
/// Embedded `owner` and `club` relations are already plain objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct GalleryItemDto(pub Map<String, Value>);

impl GalleryItemDto {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// Raw shape returned by the list procedures
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub total: i64,
}
