//! The weekly accountability engine.
//!
//! Derives per-user weekly summaries, applies the once-per-week penalty
//! sweep behind a durable ledger, and handles the manual forfeit and the
//! coach's penalty override. Summary computation is a pure function; the
//! sweep takes an explicit "now" so the Monday trigger is testable without
//! touching the wall clock.

use chrono::{DateTime, Datelike, Utc, Weekday};
use std::collections::BTreeMap;

use crate::calendar::{week_id, week_start};
use crate::error::{CoreError, Result, ValidationError};
use crate::model::{
    Activity, AppSettings, GoalStatus, User, WeekHistory, WeeklySummary, FORFEIT_TYPE_ID,
};
use crate::storage::Database;

/// Roll up one week of activity per user.
///
/// `week_activities` must already be restricted to the week in question
/// (see [`Database::activities_in_week`]). Meeting the goal always wins:
/// a user who forfeited and then reached the goal anyway is `Achieved`.
/// Input user order is preserved; callers may re-sort for display.
pub fn compute_weekly_summaries(
    users: &[User],
    week_activities: &[Activity],
    settings: &AppSettings,
) -> Vec<WeeklySummary> {
    users
        .iter()
        .map(|user| {
            let mine: Vec<&Activity> = week_activities
                .iter()
                .filter(|a| a.user_id == user.id)
                .collect();
            let total_minutes: u32 = mine.iter().map(|a| a.duration_min).sum();
            let goal_met = total_minutes >= settings.weekly_goal_minutes;
            let gave_up = mine.iter().any(|a| a.is_forfeit());

            let status = if goal_met {
                GoalStatus::Achieved
            } else if gave_up {
                GoalStatus::Failed
            } else {
                GoalStatus::Pending
            };

            WeeklySummary {
                user_id: user.id.clone(),
                username: user.username.clone(),
                total_minutes,
                goal_met,
                status,
            }
        })
        .collect()
}

/// Run the once-per-week penalty sweep for the week that ended yesterday.
///
/// Policy: penalties for the week ending Sunday are assessed the following
/// Monday, so this is a no-op on any other weekday. The ledger guarantees
/// at-most-once application per week no matter how often this runs (it is
/// invoked on every application startup).
///
/// Users below the goal are charged `penalty_amount` on top of their running
/// total. No pro-rating for accounts created mid-week, and a forfeit does
/// not waive the charge.
///
/// Returns the week id that was swept, or `None` when nothing was applied.
pub fn apply_weekly_penalties(db: &Database, now: DateTime<Utc>) -> Result<Option<String>> {
    if now.weekday() != Weekday::Mon {
        return Ok(None);
    }

    let last_week = now - chrono::Duration::days(1);
    let target_week_id = week_id(last_week);
    if db.has_penalty_run(&target_week_id)? {
        return Ok(None);
    }

    let settings = db.settings()?;
    let users = db.users()?;
    let week_activities = db.activities_in_week(last_week)?;

    for user in users {
        let total_minutes: u32 = week_activities
            .iter()
            .filter(|a| a.user_id == user.id)
            .map(|a| a.duration_min)
            .sum();

        if total_minutes < settings.weekly_goal_minutes {
            let mut charged = user;
            charged.cumulative_penalty += settings.penalty_amount;
            db.update_user(&charged)?;
        }
    }

    db.mark_penalty_run(&target_week_id)?;
    Ok(Some(target_week_id))
}

/// Forfeit the current week for `user_id`.
///
/// Charges `penalty_amount` immediately (independent of the Monday sweep)
/// and records a zero-duration forfeit activity, which shows the user as
/// failed for the rest of the week unless they reach the goal after all.
pub fn give_up_week(db: &Database, user_id: &str, now: DateTime<Utc>) -> Result<()> {
    let settings = db.settings()?;
    let mut user = find_user(db, user_id)?;
    user.cumulative_penalty += settings.penalty_amount;
    db.update_user(&user)?;
    db.add_activity(user_id, FORFEIT_TYPE_ID, 0, None, now)?;
    Ok(())
}

/// Coach override: set (not add) a user's cumulative penalty.
pub fn update_penalty(db: &Database, user_id: &str, new_amount: i64) -> Result<User> {
    if new_amount < 0 || new_amount > i64::from(u32::MAX) {
        return Err(ValidationError::InvalidValue {
            field: "penalty",
            message: format!("out of range: {new_amount}"),
        }
        .into());
    }
    let mut user = find_user(db, user_id)?;
    user.cumulative_penalty = new_amount as u32;
    db.update_user(&user)?;
    Ok(user)
}

/// Week-by-week totals for one user, most recent first.
///
/// Forfeit entries carry no minutes and are excluded from history.
pub fn weekly_history(
    activities: &[Activity],
    user_id: &str,
    settings: &AppSettings,
) -> Vec<WeekHistory> {
    let mut weeks: BTreeMap<String, (DateTime<Utc>, u32)> = BTreeMap::new();
    for activity in activities
        .iter()
        .filter(|a| a.user_id == user_id && !a.is_forfeit())
    {
        let entry = weeks
            .entry(week_id(activity.logged_at))
            .or_insert((week_start(activity.logged_at), 0));
        entry.1 += activity.duration_min;
    }

    weeks
        .into_iter()
        .rev()
        .map(|(week_id, (week_start, total_minutes))| WeekHistory {
            week_id,
            week_start,
            total_minutes,
            goal_met: total_minutes >= settings.weekly_goal_minutes,
        })
        .collect()
}

/// Sum of every member's accrued penalties (the group "pot").
pub fn total_penalty_pot(users: &[User]) -> u32 {
    users.iter().map(|u| u.cumulative_penalty).sum()
}

fn find_user(db: &Database, user_id: &str) -> Result<User> {
    db.users()?
        .into_iter()
        .find(|u| u.id == user_id)
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: id.to_string(),
            password: "x".to_string(),
            is_coach: false,
            cumulative_penalty: 0,
            created_at: at(2024, 3, 1, 0),
        }
    }

    fn activity(user_id: &str, type_id: &str, minutes: u32, logged_at: DateTime<Utc>) -> Activity {
        Activity {
            id: format!("{user_id}-{minutes}"),
            user_id: user_id.to_string(),
            activity_type_id: type_id.to_string(),
            duration_min: minutes,
            logged_at,
            comment: None,
        }
    }

    #[test]
    fn summary_status_matrix() {
        let settings = AppSettings::default(); // goal 60
        let users = vec![user("idle"), user("done"), user("quit"), user("late")];
        let tue = at(2024, 3, 19, 10);
        let acts = vec![
            activity("done", "running", 60, tue),
            activity("quit", "running", 30, tue),
            activity("quit", FORFEIT_TYPE_ID, 0, tue),
            activity("late", FORFEIT_TYPE_ID, 0, tue),
            activity("late", "cycling", 60, tue),
        ];

        let summaries = compute_weekly_summaries(&users, &acts, &settings);
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0].status, GoalStatus::Pending);
        assert_eq!(summaries[0].total_minutes, 0);
        assert_eq!(summaries[1].status, GoalStatus::Achieved);
        assert_eq!(summaries[2].status, GoalStatus::Failed);
        // Reaching the goal after a forfeit still counts as achieved.
        assert_eq!(summaries[3].status, GoalStatus::Achieved);
        assert!(summaries[3].goal_met);
    }

    #[test]
    fn sweep_runs_only_on_monday() {
        let db = Database::open_memory().unwrap();
        db.add_user("alice", "x", false, at(2024, 3, 12, 9)).unwrap();
        // 2024-03-19 is a Tuesday.
        assert!(apply_weekly_penalties(&db, at(2024, 3, 19, 9))
            .unwrap()
            .is_none());
        assert_eq!(db.users().unwrap()[0].cumulative_penalty, 0);
    }

    #[test]
    fn sweep_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let alice = db.add_user("alice", "x", false, at(2024, 3, 12, 9)).unwrap();
        // 30 min on Tuesday of the target week, goal is 60.
        db.add_activity(&alice.id, "running", 30, None, at(2024, 3, 19, 9))
            .unwrap();

        // 2024-03-25 is the following Monday.
        let monday = at(2024, 3, 25, 8);
        let swept = apply_weekly_penalties(&db, monday).unwrap();
        assert_eq!(swept.as_deref(), Some("2024-03-18"));
        assert_eq!(db.users().unwrap()[0].cumulative_penalty, 5);

        // Second call with the same "now" is a no-op.
        assert!(apply_weekly_penalties(&db, monday).unwrap().is_none());
        assert_eq!(db.users().unwrap()[0].cumulative_penalty, 5);
    }

    #[test]
    fn sweep_spares_users_at_goal_and_charges_forfeiters() {
        let db = Database::open_memory().unwrap();
        let fit = db.add_user("fit", "x", false, at(2024, 3, 12, 9)).unwrap();
        let quit = db.add_user("quit", "x", false, at(2024, 3, 12, 9)).unwrap();
        // Created mid-week with zero activity; still charged.
        db.add_user("fresh", "x", false, at(2024, 3, 21, 9)).unwrap();

        db.add_activity(&fit.id, "running", 90, None, at(2024, 3, 19, 9))
            .unwrap();
        give_up_week(&db, &quit.id, at(2024, 3, 20, 9)).unwrap();
        assert_eq!(db.users().unwrap()[1].cumulative_penalty, 5);

        apply_weekly_penalties(&db, at(2024, 3, 25, 8)).unwrap();
        let users = db.users().unwrap();
        assert_eq!(users[0].cumulative_penalty, 0);
        // Forfeiting does not waive the sweep: 5 (give up) + 5 (sweep).
        assert_eq!(users[1].cumulative_penalty, 10);
        assert_eq!(users[2].cumulative_penalty, 5);
    }

    #[test]
    fn give_up_then_reaching_goal_flips_to_achieved() {
        let db = Database::open_memory().unwrap();
        let alice = db.add_user("alice", "x", false, at(2024, 3, 12, 9)).unwrap();
        let wed = at(2024, 3, 20, 9);
        give_up_week(&db, &alice.id, wed).unwrap();

        let settings = db.settings().unwrap();
        let users = db.users().unwrap();
        let week = db.activities_in_week(wed).unwrap();
        let before = compute_weekly_summaries(&users, &week, &settings);
        assert_eq!(before[0].status, GoalStatus::Failed);

        db.add_activity(&alice.id, "running", 60, None, at(2024, 3, 21, 9))
            .unwrap();
        let week = db.activities_in_week(wed).unwrap();
        let after = compute_weekly_summaries(&db.users().unwrap(), &week, &settings);
        assert_eq!(after[0].status, GoalStatus::Achieved);
    }

    #[test]
    fn penalty_override_sets_exact_value() {
        let db = Database::open_memory().unwrap();
        let alice = db.add_user("alice", "x", false, at(2024, 3, 12, 9)).unwrap();
        give_up_week(&db, &alice.id, at(2024, 3, 20, 9)).unwrap();

        let updated = update_penalty(&db, &alice.id, 2).unwrap();
        assert_eq!(updated.cumulative_penalty, 2);

        assert!(matches!(
            update_penalty(&db, &alice.id, -1).unwrap_err(),
            CoreError::Validation(ValidationError::InvalidValue { .. })
        ));
        assert!(matches!(
            update_penalty(&db, "ghost", 3).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[test]
    fn history_groups_by_week_most_recent_first() {
        let settings = AppSettings::default();
        let acts = vec![
            activity("a", "running", 30, at(2024, 3, 12, 9)),
            activity("a", "cycling", 40, at(2024, 3, 14, 9)),
            activity("a", FORFEIT_TYPE_ID, 0, at(2024, 3, 14, 10)),
            activity("a", "running", 90, at(2024, 3, 19, 9)),
            activity("b", "running", 500, at(2024, 3, 19, 9)),
        ];

        let history = weekly_history(&acts, "a", &settings);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].week_id, "2024-03-18");
        assert_eq!(history[0].total_minutes, 90);
        assert!(history[0].goal_met);
        assert_eq!(history[1].week_id, "2024-03-11");
        assert_eq!(history[1].total_minutes, 70);
        assert!(history[1].goal_met);
    }

    #[test]
    fn pot_sums_everyone() {
        let mut a = user("a");
        let mut b = user("b");
        a.cumulative_penalty = 5;
        b.cumulative_penalty = 15;
        assert_eq!(total_penalty_pot(&[a, b]), 20);
    }
}
