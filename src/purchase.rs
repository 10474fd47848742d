// Automated purchase retry loop ("auto-buy").
//
// Repeats a family purchase for the active session until the gateway reports
// a fatal outcome or the operator cancels. There is deliberately no attempt
// cap. Attempts are strictly serialized: attempt n+1 never starts before
// attempt n has resolved, including any pause-on-success acknowledgment.

use crate::cancel::CancelToken;
use crate::error::CollaboratorError;
use crate::prompt::Prompter;
use crate::session::Session;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Operator-supplied policy, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePolicy {
    pub family_code: String,
    pub use_decoy: bool,
    pub pause_on_success: bool,
    pub delay_seconds: u64,
    pub sequence_number: u64,
}

impl PurchasePolicy {
    pub fn new(
        family_code: impl Into<String>,
        use_decoy: bool,
        pause_on_success: bool,
        delay_seconds: u64,
    ) -> Self {
        Self {
            family_code: family_code.into(),
            use_decoy,
            pause_on_success,
            delay_seconds,
            sequence_number: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttemptOutcome {
    Success,
    Failed,
    Fatal,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Fatal => "FATAL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub outcome: AttemptOutcome,
    pub detail: Option<String>,
}

impl AttemptResult {
    pub fn new(outcome: AttemptOutcome, detail: Option<String>) -> Self {
        Self { outcome, detail }
    }

    pub fn success() -> Self {
        Self::new(AttemptOutcome::Success, None)
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self::new(AttemptOutcome::Failed, Some(detail.into()))
    }

    pub fn fatal(detail: impl Into<String>) -> Self {
        Self::new(AttemptOutcome::Fatal, Some(detail.into()))
    }
}

/// A collaborator error becomes FAILED unless the collaborator explicitly
/// said the condition is unrecoverable.
impl From<CollaboratorError> for AttemptResult {
    fn from(err: CollaboratorError) -> Self {
        match err {
            CollaboratorError::Fatal(msg) => Self::fatal(msg),
            CollaboratorError::Transient(msg) => Self::failed(msg),
            CollaboratorError::Cancelled => Self::failed("cancelled by collaborator"),
        }
    }
}

/// Performs exactly one call per invocation against the gateway.
pub trait PurchaseExecutor {
    /// Harmless request sent ahead of a real purchase.
    fn decoy(&self, session: &Session) -> Result<AttemptResult, CollaboratorError>;

    fn purchase(
        &self,
        session: &Session,
        family_code: &str,
    ) -> Result<AttemptResult, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub number: u64,
    pub result: AttemptResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The last attempt was FATAL; carries its detail.
    Fatal(Option<String>),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    pub attempts: u64,
    pub exit: LoopExit,
}

/// Run the auto-buy loop. The caller must already have the operator's
/// explicit confirmation; this function does not ask again.
///
/// `on_attempt` is called once per real purchase attempt, in order.
pub fn run_auto_buy(
    policy: &PurchasePolicy,
    session: &Session,
    executor: &dyn PurchaseExecutor,
    prompt: &mut dyn Prompter,
    cancel: &CancelToken,
    mut on_attempt: impl FnMut(&AttemptRecord),
) -> LoopReport {
    let delay = Duration::from_secs(policy.delay_seconds);
    let mut number = policy.sequence_number.max(1);
    let mut attempts = 0;

    let cancelled = |attempts| {
        tracing::info!(attempts, "auto-buy cancelled by operator");
        LoopReport { attempts, exit: LoopExit::Cancelled }
    };

    tracing::info!(
        family_code = %policy.family_code,
        use_decoy = policy.use_decoy,
        pause_on_success = policy.pause_on_success,
        delay_seconds = policy.delay_seconds,
        "auto-buy started"
    );

    loop {
        if cancel.check().is_err() {
            return cancelled(attempts);
        }

        if policy.use_decoy {
            match executor.decoy(session) {
                Ok(res) => tracing::debug!(
                    attempt = number,
                    outcome = %res.outcome,
                    detail = ?res.detail,
                    "decoy done"
                ),
                Err(e) => tracing::warn!(attempt = number, error = %e, "decoy failed"),
            }
            if cancel.check().is_err() {
                return cancelled(attempts);
            }
        }

        let result = executor
            .purchase(session, &policy.family_code)
            .unwrap_or_else(AttemptResult::from);
        attempts += 1;
        tracing::info!(
            attempt = number,
            outcome = %result.outcome,
            detail = ?result.detail,
            "purchase attempt"
        );

        let record = AttemptRecord { number, result };
        on_attempt(&record);

        match record.result.outcome {
            AttemptOutcome::Fatal => {
                return LoopReport {
                    attempts,
                    exit: LoopExit::Fatal(record.result.detail),
                };
            }
            AttemptOutcome::Success if policy.pause_on_success => {
                if prompt
                    .acknowledge("Purchase succeeded. Press Enter to keep buying")
                    .is_err()
                {
                    return cancelled(attempts);
                }
            }
            AttemptOutcome::Success | AttemptOutcome::Failed => {}
        }

        if cancel.sleep(delay).is_err() {
            return cancelled(attempts);
        }
        number += 1;
    }
}
