// Session loop and command dispatcher.
//
// One iteration: look up the active session (or ask for one), fetch and
// render a fresh profile snapshot, read one command, run it. Everything is
// sequential; the only process-lifetime state is `DispatcherState`.

use crate::cancel::CancelToken;
use crate::command::Command;
use crate::error::{CollaboratorError, Interrupted};
use crate::handlers::{CommandHandlers, HotList, StoreView};
use crate::profile::{ProfileFetcher, ProfileSnapshot};
use crate::prompt::Prompter;
use crate::purchase::{self, LoopExit, PurchaseExecutor, PurchasePolicy};
use crate::session::{Session, SessionStore};
use crate::ui::{self, Theme};
use std::sync::Arc;

const MENU_PROMPT: &str = "Choose menu (ENTER = repeat last)";

/// State that lives as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherState {
    pub last_command: Option<String>,
    pub theme: Theme,
}

impl DispatcherState {
    /// Resolve one raw input line. Non-empty input becomes the new last
    /// command; empty input replays the last command, if there is one.
    pub fn resolve_input(&mut self, raw: &str) -> Option<Command> {
        let token = raw.trim();
        if token.is_empty() {
            return self.last_command.as_deref().and_then(Command::parse);
        }
        self.last_command = Some(token.to_string());
        Command::parse(token)
    }
}

/// External collaborators the dispatcher drives.
pub struct Services<'a> {
    pub store: &'a mut dyn SessionStore,
    pub profiles: &'a dyn ProfileFetcher,
    pub purchases: &'a dyn PurchaseExecutor,
    pub handlers: &'a mut dyn CommandHandlers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// How the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The operator chose the exit command.
    Quit,
    /// The operator pressed Ctrl+C (or input closed).
    Interrupted,
}

pub struct Dispatcher<'a> {
    services: Services<'a>,
    prompt: &'a mut dyn Prompter,
    cancel: CancelToken,
    state: DispatcherState,
}

impl<'a> Dispatcher<'a> {
    pub fn new(services: Services<'a>, prompt: &'a mut dyn Prompter, cancel: CancelToken) -> Self {
        Self {
            services,
            prompt,
            cancel,
            state: DispatcherState::default(),
        }
    }

    /// Run until the operator exits or cancels.
    pub fn run(&mut self) -> Exit {
        loop {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    tracing::info!("exit requested");
                    return Exit::Quit;
                }
                Err(Interrupted) => {
                    tracing::info!("session loop interrupted");
                    return Exit::Interrupted;
                }
            }
        }
    }

    /// One pass of the loop.
    pub fn step(&mut self) -> Result<Flow, Interrupted> {
        self.cancel.check()?;

        let Some(session) = self.services.store.get_active() else {
            tracing::debug!("no active session");
            self.choose_account()?;
            return Ok(Flow::Continue);
        };

        ui::clear_screen();
        let spinner = ui::spinner("Fetching user data...");
        let snapshot = ProfileSnapshot::fetch(&session, self.services.profiles);
        spinner.finish_and_clear();

        let theme = self.state.theme;
        match &snapshot {
            Ok(snapshot) => ui::render_profile(snapshot, theme),
            Err(e) => {
                tracing::warn!(number = %session.number, error = %e, "profile fetch failed");
                ui::render_profile_error(e, theme);
            }
        }
        ui::render_menu(theme);

        let raw = self.prompt.read_line(MENU_PROMPT)?;
        match self.state.resolve_input(&raw) {
            Some(command) => self.dispatch(command, &session),
            None => {
                self.prompt.pause()?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, command: Command, session: &Arc<Session>) -> Result<Flow, Interrupted> {
        tracing::debug!(?command, number = %session.number, "dispatch");

        let outcome = match command {
            Command::SwitchAccount => {
                self.choose_account()?;
                return Ok(Flow::Continue);
            }
            Command::MyPackages => self.services.handlers.my_packages(session),
            Command::HotPackages => self.services.handlers.hot_packages(session, HotList::Primary),
            Command::HotPackages2 => {
                self.services.handlers.hot_packages(session, HotList::Secondary)
            }
            Command::PackageByOption => {
                let code = self.prompt.read_line("Option code")?;
                self.services.handlers.package_details(session, code.trim())
            }
            Command::PackagesByFamily => {
                let code = self.prompt.read_line("Family code")?;
                self.services.handlers.family_packages(session, code.trim())
            }
            Command::AutoBuy => return self.auto_buy(session),
            Command::TransactionHistory => self.services.handlers.transaction_history(session),
            Command::FamilyPlan => self.services.handlers.family_plan(session),
            Command::Circle => self.services.handlers.circle(session),
            Command::StoreSegments => self.store_view(session, StoreView::Segments)?,
            Command::StoreFamilyList => self.store_view(session, StoreView::FamilyList)?,
            Command::StorePackages => self.store_view(session, StoreView::Packages)?,
            Command::Redeemables => self.store_view(session, StoreView::Redeemables)?,
            Command::RegisterIdentity => {
                let msisdn = self.prompt.read_line("MSISDN")?;
                let kk = self.prompt.read_line("KK")?;
                let nik = self.prompt.read_line("NIK")?;
                self.services
                    .handlers
                    .register_identity(msisdn.trim(), kk.trim(), nik.trim())
                    .map(|v| ui::print_json("Registration result", &v))
            }
            Command::ValidateMsisdn => {
                let msisdn = self.prompt.read_line("MSISDN")?;
                self.services
                    .handlers
                    .validate_msisdn(session, msisdn.trim())
                    .map(|v| ui::print_json("Validation result", &v))
            }
            Command::Notifications => self.services.handlers.notifications(session),
            Command::Monitor => self.services.handlers.monitor(session, &self.cancel),
            Command::Bookmarks => self.services.handlers.bookmarks(session),
            Command::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
                return Ok(Flow::Continue);
            }
            Command::Exit => return Ok(Flow::Exit),
            Command::Unknown(token) => {
                tracing::debug!(%token, "unrecognized command");
                self.prompt.pause()?;
                return Ok(Flow::Continue);
            }
        };

        self.finish(outcome)
    }

    /// Report a handler's outcome inline and let the operator read it.
    fn finish(&mut self, outcome: Result<(), CollaboratorError>) -> Result<Flow, Interrupted> {
        match outcome {
            Ok(()) => {}
            Err(CollaboratorError::Cancelled) => return Err(Interrupted),
            Err(e) => {
                tracing::warn!(error = %e, "command failed");
                ui::print_error(&e);
            }
        }
        self.prompt.pause()?;
        Ok(Flow::Continue)
    }

    /// Abort a command over bad operator input.
    fn reject(&mut self, msg: &str) -> Result<Flow, Interrupted> {
        ui::print_warning(msg);
        self.prompt.pause()?;
        Ok(Flow::Continue)
    }

    fn store_view(
        &mut self,
        session: &Session,
        view: StoreView,
    ) -> Result<Result<(), CollaboratorError>, Interrupted> {
        let enterprise = self.prompt.yes_no("Enterprise?")?;
        Ok(self.services.handlers.store(session, view, enterprise))
    }

    fn choose_account(&mut self) -> Result<(), Interrupted> {
        let known = self.services.store.list();
        match self.services.handlers.select_account(&known) {
            Ok(Some(chosen)) => {
                if let Err(e) = self.services.store.set_active(chosen) {
                    tracing::warn!(error = %e, "could not persist active session");
                    ui::print_error(&e);
                    self.prompt.pause()?;
                }
            }
            Ok(None) => {}
            Err(CollaboratorError::Cancelled) => return Err(Interrupted),
            Err(e) => {
                ui::print_error(&e);
                self.prompt.pause()?;
            }
        }
        Ok(())
    }

    fn auto_buy(&mut self, session: &Session) -> Result<Flow, Interrupted> {
        ui::print_warning("⚠ AUTO BUY LOOP (DANGEROUS): purchases repeat with no attempt limit.");
        ui::print_warning("Press Ctrl+C at any time to stop.");

        let confirm = self.prompt.read_line("Type YES to continue")?;
        if !confirm.trim().eq_ignore_ascii_case("YES") {
            ui::print_info("Auto-buy aborted.");
            return Ok(Flow::Continue);
        }

        let family_code = self.prompt.read_line("Family code")?.trim().to_string();
        let use_decoy = self.prompt.yes_no("Use decoy?")?;
        let pause_on_success = self.prompt.yes_no("Pause on success?")?;
        let delay_raw = self.prompt.read_line("Delay seconds")?;

        if family_code.is_empty() {
            return self.reject("Family code is required.");
        }
        let Some(delay_seconds) = parse_delay(&delay_raw) else {
            return self.reject(&format!(
                "Delay must be a whole number of seconds, got {:?}.",
                delay_raw.trim()
            ));
        };

        let policy = PurchasePolicy::new(family_code, use_decoy, pause_on_success, delay_seconds);
        let report = purchase::run_auto_buy(
            &policy,
            session,
            self.services.purchases,
            &mut *self.prompt,
            &self.cancel,
            ui::print_attempt,
        );
        ui::print_loop_summary(&report);

        if report.exit == LoopExit::Cancelled {
            return Err(Interrupted);
        }
        self.prompt.pause()?;
        Ok(Flow::Continue)
    }
}

/// Empty means no delay.
fn parse_delay(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        Some(0)
    } else {
        raw.parse().ok()
    }
}
