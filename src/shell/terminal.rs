//! A [`Shell`] backed by a line-oriented terminal.

use std::io::{self, BufRead, Write};

use tracing::warn;

use super::{MenuAction, Shell, INDICATOR_TITLE};
use crate::config::Credentials;

/// Terminal host: notifications are printed, the form and menu read lines.
///
/// Generic over its streams so tests can drive it with in-memory buffers.
pub struct TerminalShell<R, W> {
    input: R,
    output: W,
    actions: Vec<(String, MenuAction)>,
    status: String,
}

impl TerminalShell<io::StdinLock<'static>, io::Stdout> {
    /// Create a shell over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalShell<R, W> {
    /// Create a shell over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            actions: Vec::new(),
            status: String::new(),
        }
    }

    /// The registered menu entries, in order.
    pub fn actions(&self) -> &[(String, MenuAction)] {
        &self.actions
    }

    /// The current status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The output stream.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Print the menu and wait for a choice.
    ///
    /// Returns `None` when the user quits or input ends.
    pub fn next_action(&mut self) -> io::Result<Option<MenuAction>> {
        loop {
            writeln!(self.output, "\n{}", INDICATOR_TITLE)?;
            writeln!(self.output, "  {}", self.status)?;
            for (i, (label, _)) in self.actions.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, label)?;
            }
            writeln!(self.output, "  q) Quit")?;

            let Some(line) = self.prompt("> ")? else {
                return Ok(None);
            };
            let choice = line.trim();
            if choice.eq_ignore_ascii_case("q") {
                return Ok(None);
            }

            let picked = choice
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.actions.get(i))
                .map(|(_, action)| *action);
            match picked {
                Some(action) => return Ok(Some(action)),
                None => writeln!(self.output, "Unknown choice '{}'", choice)?,
            }
        }
    }

    /// Write `label` and read one line. `None` means end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt for a field, keeping `current` when the answer is empty.
    fn prompt_field(
        &mut self,
        name: &str,
        current: &str,
        secret: bool,
    ) -> io::Result<Option<String>> {
        let label = match (current.is_empty(), secret) {
            (true, _) => format!("{}: ", name),
            (false, true) => format!("{} [keep current]: ", name),
            (false, false) => format!("{} [{}]: ", name, current),
        };

        Ok(self.prompt(&label)?.map(|answer| {
            if answer.trim().is_empty() {
                current.to_string()
            } else {
                answer.trim().to_string()
            }
        }))
    }

    fn read_form(&mut self, initial: Option<&Credentials>) -> io::Result<Option<Credentials>> {
        let initial = initial.cloned().unwrap_or_default();
        writeln!(self.output, "Configure Jira (press Enter to keep a value)")?;

        let Some(base_url) = self.prompt_field("Jira URL", &initial.base_url, false)? else {
            return Ok(None);
        };
        let Some(email) = self.prompt_field("Email", &initial.email, false)? else {
            return Ok(None);
        };
        let Some(api_token) = self.prompt_field("API token", &initial.api_token, true)? else {
            return Ok(None);
        };

        Ok(Some(Credentials::new(base_url, email, api_token)))
    }
}

impl<R: BufRead, W: Write> Shell for TerminalShell<R, W> {
    fn show_notification(&mut self, title: &str, body: &str) {
        if let Err(e) = writeln!(self.output, "[{}] {}", title, body) {
            warn!("Failed to print notification: {}", e);
        }
    }

    fn open_config_form(&mut self, initial: Option<&Credentials>) -> Option<Credentials> {
        match self.read_form(initial) {
            Ok(creds) => creds,
            Err(e) => {
                warn!("Config form failed: {}", e);
                None
            }
        }
    }

    fn add_menu_action(&mut self, label: &str, action: MenuAction) {
        self.actions.push((label.to_string(), action));
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}
