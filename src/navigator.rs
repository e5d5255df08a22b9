use colored::*;
use session_auth::Navigator;

/// Navigator for a terminal: the user follows the printed link in their browser.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect(&self, target: &str) {
        println!("{} Open in your browser: {}", "→".blue(), target.underline());
    }
}
