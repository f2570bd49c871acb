//! SQLite-backed key-value repository for the tracker's collections.
//!
//! Every collection (users, activities, activity types, chat) lives as one
//! JSON document under a fixed key in a `kv` table, alongside two singletons
//! (settings, session pointer) and the penalty ledger. A write always
//! replaces the whole serialized collection, so callers never observe a
//! partially written one.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::calendar::week_start;
use crate::error::{ConflictError, CoreError, DatabaseError, Result, ValidationError};
use crate::model::{
    default_activity_types, Activity, ActivityType, AppSettings, ChatMessage, User,
};

use super::data_dir;

const USERS_KEY: &str = "users";
const ACTIVITIES_KEY: &str = "activities";
const ACTIVITY_TYPES_KEY: &str = "activity_types";
const SETTINGS_KEY: &str = "settings";
const CHAT_MESSAGES_KEY: &str = "chat_messages";
const PENALTY_LEDGER_KEY: &str = "penalty_ledger";
const SESSION_KEY: &str = "session";

/// Key-value repository over SQLite.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/fitpact/fitpact.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("fitpact.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(DatabaseError::from)?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Read a JSON document under `key`, falling back to `default` when the
    /// key is absent or the stored document is corrupt. A corrupt document is
    /// logged and treated as the default rather than crashing the caller.
    fn read_doc<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> Result<T> {
        match self.kv_get(key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    eprintln!("fitpact: corrupt record under '{key}' ({e}), using default");
                    Ok(default())
                }
            },
            None => Ok(default()),
        }
    }

    fn write_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.kv_set(key, &serde_json::to_string(value)?)
    }

    // === Users ===

    /// All users, insertion order preserved.
    pub fn users(&self) -> Result<Vec<User>> {
        self.read_doc(USERS_KEY, Vec::new)
    }

    /// Create a user with a fresh id and zero penalty.
    ///
    /// Rejects an empty username or password, a case-insensitive username
    /// collision, and a second coach.
    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        is_coach: bool,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::EmptyField("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyField("password").into());
        }

        let mut users = self.users()?;
        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(ConflictError::UsernameTaken(username.to_string()).into());
        }
        if is_coach && users.iter().any(|u| u.is_coach) {
            return Err(ConflictError::CoachExists.into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: password.to_string(),
            is_coach,
            cumulative_penalty: 0,
            created_at: now,
        };
        users.push(user.clone());
        self.write_doc(USERS_KEY, &users)?;
        Ok(user)
    }

    /// Replace the stored record matching `user.id`.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] when no record carries that id.
    pub fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users()?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(CoreError::NotFound {
                entity: "user",
                id: user.id.clone(),
            })?;
        *slot = user.clone();
        self.write_doc(USERS_KEY, &users)
    }

    /// Case-insensitive username match plus exact password match.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let users = self.users()?;
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username) && u.password == password))
    }

    // === Activities ===

    /// All activities, insertion order preserved.
    pub fn activities(&self) -> Result<Vec<Activity>> {
        self.read_doc(ACTIVITIES_KEY, Vec::new)
    }

    /// Append an activity; the creation timestamp is `now`, the time of
    /// logging.
    pub fn add_activity(
        &self,
        user_id: &str,
        activity_type_id: &str,
        duration_min: u32,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            activity_type_id: activity_type_id.to_string(),
            duration_min,
            logged_at: now,
            comment: comment.filter(|c| !c.trim().is_empty()),
        };
        let mut activities = self.activities()?;
        activities.push(activity.clone());
        self.write_doc(ACTIVITIES_KEY, &activities)?;
        Ok(activity)
    }

    /// Activities logged within the week containing `date`:
    /// `week_start <= logged_at < week_start + 7d`.
    pub fn activities_in_week(&self, date: DateTime<Utc>) -> Result<Vec<Activity>> {
        let start = week_start(date);
        let end = start + Duration::days(7);
        Ok(self
            .activities()?
            .into_iter()
            .filter(|a| a.logged_at >= start && a.logged_at < end)
            .collect())
    }

    // === Activity types ===

    /// The catalog, seeded with the defaults when absent.
    pub fn activity_types(&self) -> Result<Vec<ActivityType>> {
        self.read_doc(ACTIVITY_TYPES_KEY, default_activity_types)
    }

    /// Append a catalog entry. Names are not required to be unique.
    pub fn add_activity_type(&self, name: &str, icon: &str) -> Result<ActivityType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }
        let entry = ActivityType {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
        };
        let mut types = self.activity_types()?;
        types.push(entry.clone());
        self.write_doc(ACTIVITY_TYPES_KEY, &types)?;
        Ok(entry)
    }

    // === Session pointer ===

    /// Point the single session slot at `user`. Last write wins.
    pub fn set_session(&self, user: &User) -> Result<()> {
        self.write_doc(SESSION_KEY, user)
    }

    /// The stored session snapshot, if any.
    pub fn session(&self) -> Result<Option<User>> {
        self.read_doc(SESSION_KEY, || None)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.kv_delete(SESSION_KEY)
    }

    // === Penalty ledger ===

    /// Whether the sweep already ran for `week_id`.
    pub fn has_penalty_run(&self, week_id: &str) -> Result<bool> {
        let ledger: BTreeMap<String, bool> = self.read_doc(PENALTY_LEDGER_KEY, BTreeMap::new)?;
        Ok(ledger.get(week_id).copied().unwrap_or(false))
    }

    /// Record that the sweep ran for `week_id`.
    pub fn mark_penalty_run(&self, week_id: &str) -> Result<()> {
        let mut ledger: BTreeMap<String, bool> =
            self.read_doc(PENALTY_LEDGER_KEY, BTreeMap::new)?;
        ledger.insert(week_id.to_string(), true);
        self.write_doc(PENALTY_LEDGER_KEY, &ledger)
    }

    // === Settings ===

    /// The settings singleton, defaulting to `{goal: 60, penalty: 5}`.
    pub fn settings(&self) -> Result<AppSettings> {
        self.read_doc(SETTINGS_KEY, AppSettings::default)
    }

    /// Replace the settings singleton.
    pub fn put_settings(&self, settings: &AppSettings) -> Result<()> {
        self.write_doc(SETTINGS_KEY, settings)
    }

    // === Chat ===

    /// Append a chat message, snapshotting the sender's username.
    pub fn add_message(&self, user: &User, message: &str, now: DateTime<Utc>) -> Result<ChatMessage> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyField("message").into());
        }
        let entry = ChatMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            message: message.to_string(),
            timestamp: now,
        };
        let mut messages = self.messages()?;
        messages.push(entry.clone());
        self.write_doc(CHAT_MESSAGES_KEY, &messages)?;
        Ok(entry)
    }

    /// All chat messages, insertion order, unfiltered.
    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        self.read_doc(CHAT_MESSAGES_KEY, Vec::new)
    }
}
