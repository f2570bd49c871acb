use chrono::Utc;
use fitpact_core::calendar::{format_minutes, is_reminder_window};
use fitpact_core::model::GoalStatus;
use fitpact_core::App;

pub fn run(json: bool, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    loop {
        render(&app, json)?;
        if !watch {
            return Ok(());
        }
        std::thread::sleep(std::time::Duration::from_secs(app.poll_interval_secs()));
        app.refresh()?;
        println!();
    }
}

fn render(app: &App, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let mut summaries = app.weekly_summaries(now)?;
    summaries.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let goal = app.settings.weekly_goal_minutes;
    println!("This week (goal: {})", format_minutes(goal));
    for summary in &summaries {
        // During the Sunday-evening window a still-pending user is shown as
        // failing, matching the last-chance reminder.
        let marker = match summary.status {
            GoalStatus::Achieved => "\u{2713}",
            GoalStatus::Failed => "\u{2717}",
            GoalStatus::Pending if is_reminder_window(now) => "\u{2717}",
            GoalStatus::Pending => "\u{22EF}",
        };
        let you = match &app.current_user {
            Some(u) if u.id == summary.user_id => " (you)",
            _ => "",
        };
        println!(
            "{marker} {:<16} {:>8} / {}",
            format!("{}{you}", summary.username),
            format_minutes(summary.total_minutes),
            format_minutes(goal)
        );
    }

    println!(
        "Penalty pot: \u{20AC}{} (penalty per missed week: \u{20AC}{})",
        app.total_penalty_pot(),
        app.settings.penalty_amount
    );

    if let Some(user) = &app.current_user {
        let mine = summaries.iter().find(|s| s.user_id == user.id);
        if let Some(mine) = mine {
            if !mine.goal_met && is_reminder_window(now) {
                println!(
                    "Last chance! {} to go before the week closes tonight.",
                    format_minutes(goal.saturating_sub(mine.total_minutes))
                );
            }
        }
    }
    Ok(())
}
