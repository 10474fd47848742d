// Scripted fakes for the collaborator traits, shared by unit tests.

use crate::cancel::CancelToken;
use crate::error::{CollaboratorError, Interrupted};
use crate::handlers::{CommandHandlers, HotList, StoreView};
use crate::profile::{Balance, ProfileFetcher, Tiering};
use crate::prompt::Prompter;
use crate::purchase::{AttemptResult, PurchaseExecutor};
use crate::session::{Session, SessionStore, SubscriptionKind, Tokens};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub fn session(number: &str, kind: SubscriptionKind) -> Session {
    Session {
        number: number.to_string(),
        subscription_type: kind,
        tokens: Tokens {
            id_token: format!("id-{}", number),
            access_token: format!("access-{}", number),
            refresh_token: String::new(),
        },
        subscriber_id: format!("sub-{}", number),
    }
}

/// Replays canned lines; an exhausted script acts like Ctrl+C.
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, Interrupted> {
        self.asked.push(prompt.to_string());
        self.lines.pop_front().ok_or(Interrupted)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    sessions: Vec<Arc<Session>>,
    active: Option<String>,
}

impl MemoryStore {
    pub fn with_active(session: Session) -> Self {
        let active = Some(session.number.clone());
        Self {
            sessions: vec![Arc::new(session)],
            active,
        }
    }

    pub fn active_number(&self) -> Option<String> {
        self.active.clone()
    }
}

impl SessionStore for MemoryStore {
    fn get_active(&self) -> Option<Arc<Session>> {
        let number = self.active.as_deref()?;
        self.sessions.iter().find(|s| s.number == number).cloned()
    }

    fn set_active(&mut self, session: Arc<Session>) -> Result<(), CollaboratorError> {
        if !self.sessions.iter().any(|s| s.number == session.number) {
            self.sessions.push(Arc::clone(&session));
        }
        self.active = Some(session.number.clone());
        Ok(())
    }

    fn list(&self) -> Vec<Arc<Session>> {
        self.sessions.clone()
    }
}

/// Profile fetcher with per-number balances and call recording.
#[derive(Default)]
pub struct FakeProfiles {
    balances: RefCell<HashMap<String, Balance>>,
    balance_error: RefCell<Option<CollaboratorError>>,
    tiering: RefCell<Option<Tiering>>,
    tiering_error: RefCell<Option<CollaboratorError>>,
    balance_calls: RefCell<Vec<String>>,
    tiering_calls: RefCell<usize>,
}

impl FakeProfiles {
    pub fn set_balance(&self, number: &str, remaining: i64, expired_at: i64) {
        self.balances.borrow_mut().insert(
            number.to_string(),
            Balance {
                remaining: Some(remaining),
                expired_at: Some(expired_at),
            },
        );
    }

    pub fn set_tiering(&self, tiering: Tiering) {
        *self.tiering.borrow_mut() = Some(tiering);
    }

    pub fn fail_balance(&self, err: CollaboratorError) {
        *self.balance_error.borrow_mut() = Some(err);
    }

    pub fn fail_tiering(&self, err: CollaboratorError) {
        *self.tiering_error.borrow_mut() = Some(err);
    }

    pub fn balance_calls(&self) -> Vec<String> {
        self.balance_calls.borrow().clone()
    }

    pub fn tiering_calls(&self) -> usize {
        *self.tiering_calls.borrow()
    }
}

impl ProfileFetcher for FakeProfiles {
    fn balance(&self, session: &Session) -> Result<Balance, CollaboratorError> {
        self.balance_calls.borrow_mut().push(session.number.clone());
        if let Some(err) = self.balance_error.borrow().clone() {
            return Err(err);
        }
        Ok(self
            .balances
            .borrow()
            .get(&session.number)
            .cloned()
            .unwrap_or(Balance {
                remaining: Some(10_000),
                expired_at: Some(1_700_000_000),
            }))
    }

    fn tiering(&self, _session: &Session) -> Result<Tiering, CollaboratorError> {
        *self.tiering_calls.borrow_mut() += 1;
        if let Some(err) = self.tiering_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.tiering.borrow().clone().unwrap_or(Tiering {
            current_point: Some(120),
            tier: Some(2),
        }))
    }
}

type Scripted = Result<AttemptResult, CollaboratorError>;

/// Purchase executor that replays scripted results and records call order.
/// Once the purchase script runs out every attempt is FATAL, so a buggy loop
/// cannot spin forever in a test.
pub struct FakeExecutor {
    purchases: RefCell<VecDeque<Scripted>>,
    decoys: RefCell<VecDeque<Scripted>>,
    calls: RefCell<Vec<String>>,
    cancel_on_purchase: Option<CancelToken>,
}

impl FakeExecutor {
    pub fn new(purchases: Vec<Scripted>) -> Self {
        Self {
            purchases: RefCell::new(purchases.into()),
            decoys: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            cancel_on_purchase: None,
        }
    }

    pub fn with_decoys(self, decoys: Vec<Scripted>) -> Self {
        *self.decoys.borrow_mut() = decoys.into();
        self
    }

    /// Trip `token` while the first purchase is in flight.
    pub fn cancel_on_purchase(mut self, token: CancelToken) -> Self {
        self.cancel_on_purchase = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl PurchaseExecutor for FakeExecutor {
    fn decoy(&self, _session: &Session) -> Result<AttemptResult, CollaboratorError> {
        self.calls.borrow_mut().push("decoy".into());
        self.decoys
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(AttemptResult::success()))
    }

    fn purchase(
        &self,
        _session: &Session,
        family_code: &str,
    ) -> Result<AttemptResult, CollaboratorError> {
        self.calls.borrow_mut().push(format!("purchase:{}", family_code));
        if let Some(token) = &self.cancel_on_purchase {
            token.cancel();
        }
        self.purchases
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(AttemptResult::fatal("script exhausted")))
    }
}

/// Records every handler call as a short string.
#[derive(Default)]
pub struct RecordingHandlers {
    calls: Vec<String>,
    choices: VecDeque<Option<Session>>,
    next_error: Option<CollaboratorError>,
}

impl RecordingHandlers {
    pub fn choose(&mut self, session: Option<Session>) {
        self.choices.push_back(session);
    }

    pub fn fail_next(&mut self, err: CollaboratorError) {
        self.next_error = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.clone()
    }

    fn record(&mut self, call: String) -> Result<(), CollaboratorError> {
        self.calls.push(call);
        match self.next_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl CommandHandlers for RecordingHandlers {
    fn select_account(
        &mut self,
        _known: &[Arc<Session>],
    ) -> Result<Option<Arc<Session>>, CollaboratorError> {
        self.calls.push("select_account".into());
        Ok(self.choices.pop_front().flatten().map(Arc::new))
    }

    fn my_packages(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("my_packages".into())
    }

    fn hot_packages(&mut self, _session: &Session, list: HotList) -> Result<(), CollaboratorError> {
        self.record(format!("hot_packages:{:?}", list))
    }

    fn package_details(
        &mut self,
        _session: &Session,
        option_code: &str,
    ) -> Result<(), CollaboratorError> {
        self.record(format!("package_details:{}", option_code))
    }

    fn family_packages(
        &mut self,
        _session: &Session,
        family_code: &str,
    ) -> Result<(), CollaboratorError> {
        self.record(format!("family_packages:{}", family_code))
    }

    fn transaction_history(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("transaction_history".into())
    }

    fn family_plan(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("family_plan".into())
    }

    fn circle(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("circle".into())
    }

    fn store(
        &mut self,
        _session: &Session,
        view: StoreView,
        enterprise: bool,
    ) -> Result<(), CollaboratorError> {
        self.record(format!("store:{:?}:{}", view, enterprise))
    }

    fn register_identity(
        &mut self,
        msisdn: &str,
        kk: &str,
        nik: &str,
    ) -> Result<Value, CollaboratorError> {
        self.record(format!("register_identity:{}:{}:{}", msisdn, kk, nik))?;
        Ok(json!({"status": "ok"}))
    }

    fn validate_msisdn(
        &mut self,
        _session: &Session,
        msisdn: &str,
    ) -> Result<Value, CollaboratorError> {
        self.record(format!("validate_msisdn:{}", msisdn))?;
        Ok(json!({"valid": true}))
    }

    fn notifications(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("notifications".into())
    }

    fn monitor(
        &mut self,
        _session: &Session,
        cancel: &CancelToken,
    ) -> Result<(), CollaboratorError> {
        self.record("monitor".into())?;
        cancel.check()?;
        Ok(())
    }

    fn bookmarks(&mut self, _session: &Session) -> Result<(), CollaboratorError> {
        self.record("bookmarks".into())
    }
}
