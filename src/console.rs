use std::io::{self, BufRead, Write};

/// User-facing text channel: status lines and the yes/no prompt.
pub trait Console {
    fn println(&mut self, line: &str);

    /// Prints `prompt` and reads one line. `None` on EOF or read error.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn println(&mut self, line: &str) {
        println!("{}", line);
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok()?;

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(answer),
        }
    }
}

/// Only an explicit `y`/`yes` (any case) counts as consent.
pub fn is_affirmative(answer: Option<&str>) -> bool {
    answer
        .map(|a| a.trim().to_ascii_lowercase())
        .is_some_and(|a| a == "y" || a == "yes")
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
