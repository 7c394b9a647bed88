//! Terminal prompt for per-conflict decisions.

use dealer_engine::{ConflictDecision, ConflictResolver};
use std::io::{self, BufRead, StdinLock, Stderr, Write};

/// Asks on `output` and reads answers from `input`.
///
/// End of input or a read error cancels the merge.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
}

impl TerminalResolver<StdinLock<'static>, Stderr> {
    /// Prompt on stderr so stdout stays clean for `--json`.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, name: &str) -> io::Result<Option<ConflictDecision>> {
        write!(
            self.output,
            "Dealer '{name}' already exists. [o]verwrite, [k]eep or [c]ancel? "
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Some(ConflictDecision::Cancel));
        }

        let decision = match line.trim().to_ascii_lowercase().as_str() {
            "o" | "overwrite" => Some(ConflictDecision::Overwrite),
            "k" | "keep" => Some(ConflictDecision::Keep),
            "c" | "cancel" => Some(ConflictDecision::Cancel),
            _ => None,
        };
        Ok(decision)
    }
}

impl<R: BufRead, W: Write> ConflictResolver for TerminalResolver<R, W> {
    fn resolve(&mut self, name: &str) -> ConflictDecision {
        loop {
            match self.ask(name) {
                Ok(Some(decision)) => {
                    tracing::debug!(name, ?decision, "conflict resolved");
                    return decision;
                }
                Ok(None) => {
                    let _ = writeln!(self.output, "Please answer o, k or c.");
                }
                Err(err) => {
                    tracing::warn!("prompt failed, cancelling merge: {}", err);
                    return ConflictDecision::Cancel;
                }
            }
        }
    }
}
