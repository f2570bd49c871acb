use clap::Subcommand;
use fitpact_core::calendar::format_minutes;
use fitpact_core::{App, AppSettings};

#[derive(Subcommand)]
pub enum CoachAction {
    /// Show the current group settings
    Settings,
    /// Set the weekly goal in minutes
    SetGoal { minutes: u32 },
    /// Set the penalty charged per missed week
    SetPenalty { amount: u32 },
    /// Override a member's cumulative penalty to an exact value
    Penalty {
        /// Member's username
        username: String,
        /// New cumulative penalty (non-negative)
        amount: i64,
    },
    /// Generate a motivational tip for the group
    Tip {
        /// What the tip should be about
        topic: String,
    },
}

pub fn run(action: CoachAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        CoachAction::Settings => {
            println!(
                "Weekly goal: {}\nPenalty per missed week: \u{20AC}{}",
                format_minutes(app.settings.weekly_goal_minutes),
                app.settings.penalty_amount
            );
        }
        CoachAction::SetGoal { minutes } => {
            let settings = AppSettings {
                weekly_goal_minutes: minutes,
                ..app.settings.clone()
            };
            app.update_settings(settings)?;
            println!("Weekly goal set to {}", format_minutes(minutes));
        }
        CoachAction::SetPenalty { amount } => {
            let settings = AppSettings {
                penalty_amount: amount,
                ..app.settings.clone()
            };
            app.update_settings(settings)?;
            println!("Penalty set to \u{20AC}{amount} per missed week");
        }
        CoachAction::Penalty { username, amount } => {
            let user_id = app
                .users
                .iter()
                .find(|u| u.username.eq_ignore_ascii_case(&username))
                .map(|u| u.id.clone())
                .ok_or_else(|| format!("no member named '{username}'"))?;
            let updated = app.update_user_penalty(&user_id, amount)?;
            println!(
                "{} now owes \u{20AC}{}",
                updated.username, updated.cumulative_penalty
            );
        }
        CoachAction::Tip { topic } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let tip = runtime.block_on(app.generate_coach_tip(&topic))?;
            println!("{tip}");
        }
    }
    Ok(())
}
