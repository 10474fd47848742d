// Cooperative cancellation. A single `CancelToken` is created at startup and
// handed to every place that can block on the operator or on a timer. Work
// already sent to the gateway is never aborted; callers check the token at
// their safe points and stop starting new work once it has tripped.

use crate::error::Interrupted;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Safe-point check.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, waking early if the token trips. A zero duration
    /// returns immediately (after the safe-point check). A duration too large
    /// for the clock has no deadline and only ends when the token trips.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.check()?;
        let deadline = Instant::now().checked_add(duration);
        loop {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    SLEEP_SLICE.min(deadline - now)
                }
                None => SLEEP_SLICE,
            };
            thread::sleep(slice);
            self.check()?;
        }
    }
}

/// Trip `token` when the process receives Ctrl+C. Prompts read the terminal
/// in raw mode and report Ctrl+C themselves; this covers the time spent
/// sleeping between attempts or waiting on the network.
pub fn install_ctrl_c(token: CancelToken) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;
    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("ctrl-c received");
                    token.cancel();
                }
            });
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sleep_returns_immediately() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(token.sleep(Duration::ZERO).is_ok());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn sleep_fails_fast_once_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(token.sleep(Duration::from_secs(60)), Err(Interrupted));
    }

    #[test]
    fn cancel_from_another_thread_wakes_sleeper() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            remote.cancel();
        });
        let start = Instant::now();
        assert_eq!(token.sleep(Duration::from_secs(30)), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn unrepresentable_deadline_waits_for_cancel() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            remote.cancel();
        });
        let start = Instant::now();
        assert_eq!(token.sleep(Duration::from_secs(u64::MAX)), Err(Interrupted));
        assert_eq!(token.sleep(Duration::MAX), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }
}
