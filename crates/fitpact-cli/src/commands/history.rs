use fitpact_core::calendar::format_minutes;
use fitpact_core::App;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open()?;
    let history = app.my_history()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No activity history yet. Get to work!");
        return Ok(());
    }

    for week in &history {
        let verdict = if week.goal_met {
            "goal met"
        } else {
            "goal missed"
        };
        println!(
            "Week of {}: {:>8}  ({verdict})",
            week.week_id,
            format_minutes(week.total_minutes)
        );
    }
    Ok(())
}
