//! Application state: the object the presentation layer talks to.
//!
//! Owns the store, the logged-in user, and cached collections. Every
//! mutating action re-reads aggregate state before returning, so callers
//! always observe consistent derived data; `refresh()` is also exposed for
//! poll-driven callers. The weekly penalty sweep runs opportunistically on
//! open.

use chrono::{DateTime, Utc};

use crate::engine;
use crate::error::{Result, ValidationError};
use crate::model::{
    Activity, ActivityType, AppSettings, ChatMessage, User, WeekHistory, WeeklySummary,
};
use crate::storage::{Config, Database};
use crate::tips::{TipGenerator, FALLBACK_TIP};

/// Mutable application state shared with the presentation layer.
pub struct App {
    db: Database,
    config: Config,
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub activities: Vec<Activity>,
    pub activity_types: Vec<ActivityType>,
    pub settings: AppSettings,
    pub chat_messages: Vec<ChatMessage>,
}

impl App {
    /// Open the default store, restore the saved session, run the penalty
    /// sweep for the just-completed week, and load state.
    pub fn open() -> Result<Self> {
        let db = Database::open()?;
        let config = Config::load_or_default();
        Self::with_database(db, config, Utc::now())
    }

    /// Build on an explicit store and clock (tests, alternate data dirs).
    pub fn with_database(db: Database, config: Config, now: DateTime<Utc>) -> Result<Self> {
        let mut app = Self {
            db,
            config,
            current_user: None,
            users: Vec::new(),
            activities: Vec::new(),
            activity_types: Vec::new(),
            settings: AppSettings::default(),
            chat_messages: Vec::new(),
        };
        engine::apply_weekly_penalties(&app.db, now)?;
        // The stored session is a snapshot; re-resolve it against the users
        // collection so penalty updates from the sweep are visible.
        if let Some(saved) = app.db.session()? {
            let fresh = app.db.users()?.into_iter().find(|u| u.id == saved.id);
            if fresh.is_none() {
                app.db.clear_session()?;
            }
            app.current_user = fresh;
        }
        app.refresh()?;
        Ok(app)
    }

    /// Re-read every collection from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.users = self.db.users()?;
        self.activities = self.db.activities()?;
        self.activity_types = self.db.activity_types()?;
        self.settings = self.db.settings()?;
        self.chat_messages = self.db.messages()?;
        self.chat_messages.sort_by_key(|m| m.timestamp);
        if let Some(current) = &self.current_user {
            self.current_user = self.users.iter().find(|u| u.id == current.id).cloned();
        }
        Ok(())
    }

    fn require_login(&self) -> Result<User> {
        self.current_user
            .clone()
            .ok_or_else(|| ValidationError::NotLoggedIn.into())
    }

    fn require_coach(&self) -> Result<User> {
        let user = self.require_login()?;
        if !user.is_coach {
            return Err(ValidationError::CoachRequired.into());
        }
        Ok(user)
    }

    // === Session ===

    /// Authenticate and persist the session pointer. Returns false on bad
    /// credentials (caller re-prompts; not an error).
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        match self.db.authenticate(username, password)? {
            Some(user) => {
                self.db.set_session(&user)?;
                self.current_user = Some(user);
                self.refresh()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.db.clear_session()?;
        self.current_user = None;
        Ok(())
    }

    /// Create an account and log it in.
    pub fn signup(&mut self, username: &str, password: &str, is_coach: bool) -> Result<User> {
        let user = self.db.add_user(username, password, is_coach, Utc::now())?;
        self.db.set_session(&user)?;
        self.current_user = Some(user.clone());
        self.refresh()?;
        Ok(user)
    }

    // === Activities ===

    /// Log an activity for the current user. Duration must be at least one
    /// minute; the zero-duration forfeit entry goes through
    /// [`App::give_up_week`] instead.
    pub fn add_activity(
        &mut self,
        activity_type_id: &str,
        duration_min: u32,
        comment: Option<String>,
    ) -> Result<Activity> {
        let user = self.require_login()?;
        if duration_min == 0 {
            return Err(ValidationError::InvalidValue {
                field: "duration",
                message: "must be at least 1 minute".to_string(),
            }
            .into());
        }
        let activity =
            self.db
                .add_activity(&user.id, activity_type_id, duration_min, comment, Utc::now())?;
        self.refresh()?;
        Ok(activity)
    }

    pub fn add_activity_type(&mut self, name: &str, icon: &str) -> Result<ActivityType> {
        self.require_login()?;
        let entry = self.db.add_activity_type(name, icon)?;
        self.refresh()?;
        Ok(entry)
    }

    /// Forfeit the current week for the logged-in user.
    pub fn give_up_week(&mut self) -> Result<()> {
        let user = self.require_login()?;
        engine::give_up_week(&self.db, &user.id, Utc::now())?;
        self.refresh()
    }

    // === Coach actions ===

    pub fn update_settings(&mut self, settings: AppSettings) -> Result<()> {
        self.require_coach()?;
        if settings.weekly_goal_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "weekly_goal_minutes",
                message: "must be positive".to_string(),
            }
            .into());
        }
        self.db.put_settings(&settings)?;
        self.refresh()
    }

    pub fn update_user_penalty(&mut self, user_id: &str, new_amount: i64) -> Result<User> {
        self.require_coach()?;
        let user = engine::update_penalty(&self.db, user_id, new_amount)?;
        self.refresh()?;
        Ok(user)
    }

    /// Coach-only AI tip. Absorbs every failure into the fallback string.
    pub async fn generate_coach_tip(&self, topic: &str) -> Result<String> {
        self.require_coach()?;
        if topic.trim().is_empty() {
            return Ok(FALLBACK_TIP.to_string());
        }
        let generator = TipGenerator::new(&self.config.tips);
        Ok(generator.generate_motivational_tip(topic.trim()).await)
    }

    // === Chat ===

    pub fn send_message(&mut self, message: &str) -> Result<ChatMessage> {
        let user = self.require_login()?;
        let entry = self.db.add_message(&user, message, Utc::now())?;
        self.refresh()?;
        Ok(entry)
    }

    // === Derived reads ===

    /// Summaries for the week containing `now`, in user insertion order.
    pub fn weekly_summaries(&self, now: DateTime<Utc>) -> Result<Vec<WeeklySummary>> {
        let week = self.db.activities_in_week(now)?;
        Ok(engine::compute_weekly_summaries(
            &self.users,
            &week,
            &self.settings,
        ))
    }

    /// Week-by-week history for the logged-in user, most recent first.
    pub fn my_history(&self) -> Result<Vec<WeekHistory>> {
        let user = self.require_login()?;
        Ok(engine::weekly_history(
            &self.activities,
            &user.id,
            &self.settings,
        ))
    }

    pub fn total_penalty_pot(&self) -> u32 {
        engine::total_penalty_pot(&self.users)
    }

    /// Poll cadence for watch-mode presentation, from config.
    pub fn poll_interval_secs(&self) -> u64 {
        self.config.refresh.poll_interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::GoalStatus;
    use chrono::TimeZone;

    fn app() -> App {
        // A Tuesday, so opening never triggers the Monday sweep.
        let now = Utc.with_ymd_and_hms(2024, 3, 19, 9, 0, 0).unwrap();
        App::with_database(Database::open_memory().unwrap(), Config::default(), now).unwrap()
    }

    #[test]
    fn signup_logs_in_and_refreshes() {
        let mut app = app();
        app.signup("alice", "pw", false).unwrap();
        assert_eq!(app.current_user.as_ref().unwrap().username, "alice");
        assert_eq!(app.users.len(), 1);
        assert_eq!(app.activity_types.len(), 5);
        assert_eq!(app.settings, AppSettings::default());
    }

    #[test]
    fn login_rejects_bad_credentials_without_error() {
        let mut app = app();
        app.signup("alice", "pw", false).unwrap();
        app.logout().unwrap();
        assert!(app.current_user.is_none());
        assert!(!app.login("alice", "nope").unwrap());
        assert!(app.login("ALICE", "pw").unwrap());
    }

    #[test]
    fn mutations_require_login() {
        let mut app = app();
        assert!(matches!(
            app.add_activity("running", 30, None).unwrap_err(),
            CoreError::Validation(ValidationError::NotLoggedIn)
        ));
        assert!(matches!(
            app.send_message("hi").unwrap_err(),
            CoreError::Validation(ValidationError::NotLoggedIn)
        ));
    }

    #[test]
    fn zero_duration_activity_is_rejected() {
        let mut app = app();
        app.signup("alice", "pw", false).unwrap();
        assert!(matches!(
            app.add_activity("running", 0, None).unwrap_err(),
            CoreError::Validation(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn coach_gates_hold() {
        let mut app = app();
        app.signup("member", "pw", false).unwrap();
        let member_id = app.current_user.as_ref().unwrap().id.clone();
        assert!(matches!(
            app.update_settings(AppSettings {
                weekly_goal_minutes: 90,
                penalty_amount: 10
            })
            .unwrap_err(),
            CoreError::Validation(ValidationError::CoachRequired)
        ));

        app.logout().unwrap();
        app.signup("coach", "pw", true).unwrap();
        app.update_settings(AppSettings {
            weekly_goal_minutes: 90,
            penalty_amount: 10,
        })
        .unwrap();
        assert_eq!(app.settings.weekly_goal_minutes, 90);

        let updated = app.update_user_penalty(&member_id, 25).unwrap();
        assert_eq!(updated.cumulative_penalty, 25);
        assert_eq!(app.total_penalty_pot(), 25);
    }

    #[test]
    fn summaries_track_mutations() {
        let mut app = app();
        let now = Utc.with_ymd_and_hms(2024, 3, 19, 10, 0, 0).unwrap();
        app.signup("alice", "pw", false).unwrap();

        let summaries = app.weekly_summaries(now).unwrap();
        assert_eq!(summaries[0].status, GoalStatus::Pending);

        app.add_activity("running", 60, Some("felt great".into()))
            .unwrap();
        let summaries = app.weekly_summaries(now).unwrap();
        assert_eq!(summaries[0].status, GoalStatus::Achieved);
        assert_eq!(summaries[0].total_minutes, 60);
    }

    #[test]
    fn give_up_charges_and_marks_failed() {
        let mut app = app();
        let now = Utc.with_ymd_and_hms(2024, 3, 19, 10, 0, 0).unwrap();
        app.signup("alice", "pw", false).unwrap();
        app.give_up_week().unwrap();

        assert_eq!(app.current_user.as_ref().unwrap().cumulative_penalty, 5);
        let summaries = app.weekly_summaries(now).unwrap();
        assert_eq!(summaries[0].status, GoalStatus::Failed);
    }

    #[test]
    fn chat_is_sorted_ascending() {
        let mut app = app();
        app.signup("alice", "pw", false).unwrap();
        app.send_message("first").unwrap();
        app.send_message("second").unwrap();
        assert_eq!(app.chat_messages.len(), 2);
        assert!(app.chat_messages[0].timestamp <= app.chat_messages[1].timestamp);
        assert_eq!(app.chat_messages[0].message, "first");
    }

    #[tokio::test]
    async fn tip_requires_coach_and_falls_back_without_key() {
        let mut app = app();
        app.signup("coach", "pw", true).unwrap();
        // Default config has no API key, so generation degrades to the
        // fallback rather than erroring.
        let tip = app.generate_coach_tip("consistency").await.unwrap();
        assert_eq!(tip, crate::tips::FALLBACK_TIP);

        app.logout().unwrap();
        app.signup("member", "pw", false).unwrap();
        assert!(app.generate_coach_tip("consistency").await.is_err());
    }
}
