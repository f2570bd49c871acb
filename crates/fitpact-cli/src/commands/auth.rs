use clap::Subcommand;
use fitpact_core::App;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and log in
    Signup {
        username: String,
        #[arg(long)]
        password: String,
        /// Register as the group's coach (only one coach per group)
        #[arg(long)]
        coach: bool,
    },
    /// Log in with existing credentials
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        AuthAction::Signup {
            username,
            password,
            coach,
        } => {
            let user = app.signup(&username, &password, coach)?;
            println!(
                "Welcome, {}!{}",
                user.username,
                if user.is_coach { " (coach)" } else { "" }
            );
        }
        AuthAction::Login { username, password } => {
            if app.login(&username, &password)? {
                println!("Logged in as {username}");
            } else {
                return Err("invalid username or password".into());
            }
        }
        AuthAction::Logout => {
            app.logout()?;
            println!("Logged out");
        }
        AuthAction::Whoami => match &app.current_user {
            Some(user) => println!(
                "{}{} (penalties: \u{20AC}{})",
                user.username,
                if user.is_coach { " (coach)" } else { "" },
                user.cumulative_penalty
            ),
            None => println!("Not logged in"),
        },
    }
    Ok(())
}
