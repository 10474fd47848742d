// Operator input. Everything that waits on the human goes through the
// `Prompter` trait so the dispatcher and the auto-buy loop can be driven by a
// script in tests and by `dialoguer` in the real terminal.

use crate::cancel::CancelToken;
use crate::error::Interrupted;
use dialoguer::Input;
use std::io;

pub trait Prompter {
    /// Read one raw line of input. Fails only when the operator cancels.
    fn read_line(&mut self, prompt: &str) -> Result<String, Interrupted>;

    /// Ask a y/n question; only `y`/`Y` counts as yes.
    fn yes_no(&mut self, prompt: &str) -> Result<bool, Interrupted> {
        let answer = self.read_line(&format!("{} (y/n)", prompt))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    /// Block until the operator presses Enter.
    fn acknowledge(&mut self, message: &str) -> Result<(), Interrupted> {
        self.read_line(message).map(|_| ())
    }

    /// Let the operator read whatever was printed last.
    fn pause(&mut self) -> Result<(), Interrupted> {
        self.acknowledge("Press Enter to continue")
    }
}

/// `dialoguer`-backed prompter. Ctrl+C typed at a prompt surfaces as
/// `ErrorKind::Interrupted`; a closed stdin ends the session the same way so
/// the menu does not spin on empty reads.
pub struct TerminalPrompter {
    cancel: CancelToken,
}

impl TerminalPrompter {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, Interrupted> {
        self.cancel.check()?;
        let line = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| interrupted(&self.cancel, e))?;
        self.cancel.check()?;
        Ok(line)
    }
}

/// Turn a terminal error into an interruption, tripping the shared token so
/// every other safe point agrees the session is over.
pub fn interrupted(cancel: &CancelToken, err: io::Error) -> Interrupted {
    if err.kind() == io::ErrorKind::Interrupted {
        tracing::debug!("prompt interrupted by operator");
    } else {
        tracing::warn!(error = %err, "terminal input failed");
    }
    cancel.cancel();
    Interrupted
}
