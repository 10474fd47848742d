// Menu action handlers. The dispatcher gathers any parameters it needs from
// the operator and then calls exactly one method here; the implementation
// does the I/O and renders its own output. `TerminalHandlers` is the real
// implementation, backed by the gateway client.

use crate::api::{ApiClient, IdentityRequest};
use crate::cancel::CancelToken;
use crate::error::CollaboratorError;
use crate::prompt;
use crate::session::Session;
use crate::ui;
use chrono::Local;
use dialoguer::{Input, Select};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The two featured-package lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotList {
    Primary,
    Secondary,
}

/// Store screens that share the enterprise prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreView {
    Segments,
    FamilyList,
    Packages,
    Redeemables,
}

pub trait CommandHandlers {
    /// Let the operator pick one of `known`; `None` means nothing chosen.
    fn select_account(
        &mut self,
        known: &[Arc<Session>],
    ) -> Result<Option<Arc<Session>>, CollaboratorError>;

    fn my_packages(&mut self, session: &Session) -> Result<(), CollaboratorError>;

    fn hot_packages(&mut self, session: &Session, list: HotList) -> Result<(), CollaboratorError>;

    fn package_details(
        &mut self,
        session: &Session,
        option_code: &str,
    ) -> Result<(), CollaboratorError>;

    fn family_packages(
        &mut self,
        session: &Session,
        family_code: &str,
    ) -> Result<(), CollaboratorError>;

    fn transaction_history(&mut self, session: &Session) -> Result<(), CollaboratorError>;

    fn family_plan(&mut self, session: &Session) -> Result<(), CollaboratorError>;

    fn circle(&mut self, session: &Session) -> Result<(), CollaboratorError>;

    fn store(
        &mut self,
        session: &Session,
        view: StoreView,
        enterprise: bool,
    ) -> Result<(), CollaboratorError>;

    /// Returns the raw registration response.
    fn register_identity(
        &mut self,
        msisdn: &str,
        kk: &str,
        nik: &str,
    ) -> Result<Value, CollaboratorError>;

    /// Returns the raw validation response.
    fn validate_msisdn(
        &mut self,
        session: &Session,
        msisdn: &str,
    ) -> Result<Value, CollaboratorError>;

    fn notifications(&mut self, session: &Session) -> Result<(), CollaboratorError>;

    /// Monitoring mode; runs until the operator cancels.
    fn monitor(&mut self, session: &Session, cancel: &CancelToken) -> Result<(), CollaboratorError>;

    fn bookmarks(&mut self, session: &Session) -> Result<(), CollaboratorError>;
}

pub struct TerminalHandlers {
    api: ApiClient,
    cancel: CancelToken,
    sessions_file: PathBuf,
    monitor_interval: Duration,
}

impl TerminalHandlers {
    pub fn new(api: ApiClient, cancel: CancelToken, sessions_file: PathBuf) -> Self {
        Self {
            api,
            cancel,
            sessions_file,
            monitor_interval: Duration::from_secs(30),
        }
    }

    fn show(
        &self,
        title: &str,
        path: &str,
        session: &Session,
        query: &[(&str, String)],
    ) -> Result<(), CollaboratorError> {
        let spinner = ui::spinner("Loading...");
        let res = self.api.get_json(path, Some(session), query);
        spinner.finish_and_clear();
        ui::print_json(title, &res?);
        Ok(())
    }
}

impl CommandHandlers for TerminalHandlers {
    fn select_account(
        &mut self,
        known: &[Arc<Session>],
    ) -> Result<Option<Arc<Session>>, CollaboratorError> {
        if known.is_empty() {
            ui::print_info(&format!(
                "No saved accounts. Add a logged-in session to {} and press Enter.",
                self.sessions_file.display()
            ));
            Input::<String>::new()
                .with_prompt("Press Enter to retry")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| prompt::interrupted(&self.cancel, e))?;
            return Ok(None);
        }

        let items: Vec<String> = known
            .iter()
            .map(|s| format!("{} ({})", s.number, s.subscription_type))
            .collect();
        let choice = Select::new()
            .with_prompt("Choose account (Esc = cancel)")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(|e| prompt::interrupted(&self.cancel, e))?;
        Ok(choice.map(|i| Arc::clone(&known[i])))
    }

    fn my_packages(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("My packages", "/packages/mine", session, &[])
    }

    fn hot_packages(&mut self, session: &Session, list: HotList) -> Result<(), CollaboratorError> {
        match list {
            HotList::Primary => self.show("HOT packages", "/packages/hot", session, &[]),
            HotList::Secondary => self.show("HOT packages 2", "/packages/hot2", session, &[]),
        }
    }

    fn package_details(
        &mut self,
        session: &Session,
        option_code: &str,
    ) -> Result<(), CollaboratorError> {
        let path = format!("/packages/option/{}", option_code);
        self.show("Package details", &path, session, &[])
    }

    fn family_packages(
        &mut self,
        session: &Session,
        family_code: &str,
    ) -> Result<(), CollaboratorError> {
        let path = format!("/packages/family/{}", family_code);
        self.show("Family packages", &path, session, &[])
    }

    fn transaction_history(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("Transaction history", "/transactions", session, &[])
    }

    fn family_plan(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("Family plan", "/family-plan", session, &[])
    }

    fn circle(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("Circle", "/circle", session, &[])
    }

    fn store(
        &mut self,
        session: &Session,
        view: StoreView,
        enterprise: bool,
    ) -> Result<(), CollaboratorError> {
        let mut query = vec![("enterprise", enterprise.to_string())];
        let (title, path) = match view {
            StoreView::Segments => ("Store segments", "/store/segments"),
            StoreView::FamilyList => ("Store family list", "/store/families"),
            StoreView::Packages => ("Store packages", "/store/packages"),
            StoreView::Redeemables => ("Redeemables", "/store/redeemables"),
        };
        if matches!(view, StoreView::FamilyList | StoreView::Packages) {
            query.push(("subscription_type", session.subscription_type.to_string()));
        }
        self.show(title, path, session, &query)
    }

    fn register_identity(
        &mut self,
        msisdn: &str,
        kk: &str,
        nik: &str,
    ) -> Result<Value, CollaboratorError> {
        self.api.register_identity(&IdentityRequest { msisdn, kk, nik })
    }

    fn validate_msisdn(
        &mut self,
        session: &Session,
        msisdn: &str,
    ) -> Result<Value, CollaboratorError> {
        self.api.validate_msisdn(session, msisdn)
    }

    fn notifications(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("Notifications", "/notifications", session, &[])
    }

    fn monitor(
        &mut self,
        session: &Session,
        cancel: &CancelToken,
    ) -> Result<(), CollaboratorError> {
        ui::print_info(&format!(
            "Sentry mode: polling packages every {}s. Press Ctrl+C to stop.",
            self.monitor_interval.as_secs()
        ));
        loop {
            cancel.check()?;
            let stamp = Local::now().format("%H:%M:%S").to_string();
            match self.api.get_json("/packages/mine", Some(session), &[]) {
                Ok(v) => ui::print_json(&format!("[{}] My packages", stamp), &v),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "sentry poll failed");
                    ui::print_error(&e);
                }
            }
            cancel.sleep(self.monitor_interval)?;
        }
    }

    fn bookmarks(&mut self, session: &Session) -> Result<(), CollaboratorError> {
        self.show("Bookmarks", "/bookmarks", session, &[])
    }
}
