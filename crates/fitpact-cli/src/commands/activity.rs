use chrono::Utc;
use clap::Subcommand;
use fitpact_core::calendar::{format_minutes, week_start};
use fitpact_core::App;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Log an activity for the current week
    Log {
        /// Activity type id (see `activity types`)
        activity_type: String,
        /// Duration in minutes
        minutes: u32,
        /// Optional free-text comment
        #[arg(long)]
        comment: Option<String>,
    },
    /// Your activities for the current week
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the activity-type catalog
    Types,
    /// Add a new activity type to the catalog
    AddType {
        name: String,
        /// Emoji glyph shown next to the name
        #[arg(long, default_value = "\u{1F3C5}")]
        icon: String,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        ActivityAction::Log {
            activity_type,
            minutes,
            comment,
        } => {
            if !app.activity_types.iter().any(|t| t.id == activity_type) {
                return Err(format!(
                    "unknown activity type '{activity_type}' (see `fitpact activity types`)"
                )
                .into());
            }
            let activity = app.add_activity(&activity_type, minutes, comment)?;
            println!(
                "Logged {} of {}",
                format_minutes(activity.duration_min),
                activity_type
            );
        }
        ActivityAction::List { json } => {
            let user = app
                .current_user
                .clone()
                .ok_or("not logged in (try `fitpact auth login`)")?;
            let start = week_start(Utc::now());
            let mine: Vec<_> = app
                .activities
                .iter()
                .filter(|a| a.user_id == user.id && a.logged_at >= start)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&mine)?);
                return Ok(());
            }
            if mine.is_empty() {
                println!("No activities logged this week.");
                return Ok(());
            }
            for activity in mine {
                let name = app
                    .activity_types
                    .iter()
                    .find(|t| t.id == activity.activity_type_id)
                    .map(|t| format!("{} {}", t.icon, t.name))
                    .unwrap_or_else(|| activity.activity_type_id.clone());
                let comment = activity
                    .comment
                    .as_deref()
                    .map(|c| format!("  \"{c}\""))
                    .unwrap_or_default();
                println!(
                    "{}  {}  {}{}",
                    activity.logged_at.format("%a %H:%M"),
                    name,
                    format_minutes(activity.duration_min),
                    comment
                );
            }
        }
        ActivityAction::Types => {
            for t in &app.activity_types {
                println!("{:<12} {} {}", t.id, t.icon, t.name);
            }
        }
        ActivityAction::AddType { name, icon } => {
            let entry = app.add_activity_type(&name, &icon)?;
            println!("Added activity type '{}' (id: {})", entry.name, entry.id);
        }
    }
    Ok(())
}
