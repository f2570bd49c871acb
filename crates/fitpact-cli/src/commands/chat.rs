use clap::Subcommand;
use fitpact_core::App;

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send a message to the group
    Send { message: String },
    /// Show the group chat
    List,
}

pub fn run(action: ChatAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        ChatAction::Send { message } => {
            app.send_message(&message)?;
            println!("Sent");
        }
        ChatAction::List => {
            if app.chat_messages.is_empty() {
                println!("No messages yet.");
                return Ok(());
            }
            for msg in &app.chat_messages {
                println!(
                    "[{}] {}: {}",
                    msg.timestamp.format("%Y-%m-%d %H:%M"),
                    msg.username,
                    msg.message
                );
            }
        }
    }
    Ok(())
}
