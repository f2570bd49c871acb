//! Data model for the accountability tracker.
//!
//! Entities are plain serde structs; collections are append-only except for
//! `User`, which is mutated in place by penalty application, and the
//! `AppSettings` singleton, which the coach may replace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved activity-type id marking a voluntary weekly forfeit.
///
/// A forfeit entry always has a duration of 0 and only affects status
/// display; it never substitutes for the weekly penalty.
pub const FORFEIT_TYPE_ID: &str = "gave-up";

/// A member of the accountability group.
///
/// Never deleted. `cumulative_penalty` only grows, except for explicit coach
/// overrides which may set it to any non-negative value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Unique within the group, compared case-insensitively.
    pub username: String,
    /// Plaintext credential; hardening is explicitly out of scope.
    pub password: String,
    /// At most one user in the group carries this flag.
    pub is_coach: bool,
    /// Accrued penalty money, in whole currency units.
    pub cumulative_penalty: u32,
    pub created_at: DateTime<Utc>,
}

/// An entry in the global activity-type catalog. Append-only; any user may
/// add a type, and names are not required to be unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityType {
    pub id: String,
    pub name: String,
    /// Emoji glyph shown next to the name.
    pub icon: String,
}

/// A logged workout. Immutable once created.
///
/// `logged_at` is the time of logging, not of the workout itself; it decides
/// which week the minutes count toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    /// References the catalog, or [`FORFEIT_TYPE_ID`].
    pub activity_type_id: String,
    pub duration_min: u32,
    pub logged_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Activity {
    /// Whether this entry is the forfeit sentinel.
    pub fn is_forfeit(&self) -> bool {
        self.activity_type_id == FORFEIT_TYPE_ID
    }
}

/// Group-wide settings singleton, mutable only by the coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub weekly_goal_minutes: u32,
    pub penalty_amount: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            weekly_goal_minutes: 60,
            penalty_amount: 5,
        }
    }
}

/// A group chat message. Append-only; displayed ascending by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    /// Snapshot of the sender's name at send time.
    pub username: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Where a user stands against the weekly goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Total minutes reached the goal. Overrides a forfeit.
    Achieved,
    /// Under goal, week still open.
    Pending,
    /// Forfeited the week without reaching the goal.
    Failed,
}

/// Per-user rollup for one week. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub user_id: String,
    pub username: String,
    pub total_minutes: u32,
    pub goal_met: bool,
    pub status: GoalStatus,
}

/// One row of a user's week-by-week history. Forfeit entries are excluded
/// from the totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekHistory {
    /// [`crate::calendar::week_id`] of the week.
    pub week_id: String,
    pub week_start: DateTime<Utc>,
    pub total_minutes: u32,
    pub goal_met: bool,
}

/// The seed catalog used when the store has no activity types yet.
pub fn default_activity_types() -> Vec<ActivityType> {
    [
        ("running", "Running", "\u{1F3C3}"),
        ("cycling", "Cycling", "\u{1F6B4}"),
        ("strength", "Strength training", "\u{1F3CB}\u{FE0F}"),
        ("swimming", "Swimming", "\u{1F3CA}"),
        ("yoga", "Yoga", "\u{1F9D8}"),
    ]
    .into_iter()
    .map(|(id, name, icon)| ActivityType {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}
