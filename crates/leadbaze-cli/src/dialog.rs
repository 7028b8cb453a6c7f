//! Yes/no prompts for destructive commands.

use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Confirmation {
    Accepted,
    Declined,
}

impl Confirmation {
    pub(crate) fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

pub(crate) trait Dialog {
    /// Asks `prompt` and waits for an answer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the prompt cannot be written or the answer
    /// cannot be read.
    fn confirm(&mut self, prompt: &str) -> io::Result<Confirmation>;
}

/// Prompts on a writer and reads one line of answer. Anything other than
/// an explicit yes declines, including end of input.
pub(crate) struct TerminalDialog<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalDialog<io::StdinLock<'static>, io::Stderr> {
    pub(crate) fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Dialog for TerminalDialog<R, W> {
    fn confirm(&mut self, prompt: &str) -> io::Result<Confirmation> {
        write!(self.output, "{prompt} [y/N] ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "s" | "sim" => Confirmation::Accepted,
            _ => Confirmation::Declined,
        })
    }
}

/// Accepts every prompt; backs the `--yes` flag.
pub(crate) struct AssumeYes;

impl Dialog for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> io::Result<Confirmation> {
        tracing::debug!(prompt, "confirmation assumed by --yes");
        Ok(Confirmation::Accepted)
    }
}

/// Picks the dialog for a command that takes a `--yes` flag.
pub(crate) fn dialog_for(assume_yes: bool) -> Box<dyn Dialog> {
    if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalDialog::stdio())
    }
}
