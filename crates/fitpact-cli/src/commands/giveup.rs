use fitpact_core::App;

pub fn run(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;
    let penalty = app.settings.penalty_amount;

    if !yes {
        return Err(format!(
            "forfeiting charges \u{20AC}{penalty} immediately; pass --yes to confirm"
        )
        .into());
    }

    app.give_up_week()?;
    println!(
        "Week forfeited. \u{20AC}{penalty} added to your penalties. You can still \
         turn it around by reaching the goal before Sunday."
    );
    Ok(())
}
