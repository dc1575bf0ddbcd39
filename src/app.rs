use std::time::Instant;

use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use crate::auth::{AuthProvider, AuthState};
use crate::db::{BackendError, ProjectStore};
use crate::models::{Project, User};
use crate::navigation::Destination;
use crate::ui::{
    components::notice::{render_notice, Notice},
    project_detail::{self, render_project_detail, ProjectDetailState},
    project_wizard::{
        self, render_project_wizard, ProjectWizardAction, ProjectWizardState, SubmitOutcome,
        SubmitStart,
    },
    projects::{self, render_projects, ListCommand, ProjectAction, ProjectsState},
    sign_in::{self, render_sign_in, SignInAction, SignInState},
};

// Represents the current screen in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    SignIn,
    Projects,
    ProjectWizard,
    ProjectDetail(Uuid),
}

/// Completed backend calls, delivered back to the UI loop.
///
/// `mount` is the navigation generation the request was made from.
#[derive(Debug)]
pub enum AppEvent {
    AuthResolved(Result<Option<User>, BackendError>),
    SignedIn { mount: u64, result: Result<User, BackendError> },
    SignedOut(Result<(), BackendError>),
    ProjectsLoaded { mount: u64, result: Result<Vec<Project>, BackendError> },
    ProjectCreated { mount: u64, result: Result<Uuid, BackendError> },
}

// Main application state
pub struct App<S, A> {
    store: S,
    auth: A,
    auth_state: AuthState,
    screen: AppScreen,
    mount: u64,
    sign_in_state: Option<SignInState>,
    projects_state: Option<ProjectsState>,
    project_wizard_state: Option<ProjectWizardState>,
    project_detail_state: Option<ProjectDetailState>,
    notice: Option<Notice>,
    signing_out: bool,
    events: UnboundedSender<AppEvent>,
}

impl<S: ProjectStore, A: AuthProvider> App<S, A> {
    pub fn new(store: S, auth: A, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            store,
            auth,
            auth_state: AuthState::resolving(),
            screen: AppScreen::Projects,
            mount: 0,
            sign_in_state: None,
            projects_state: None,
            project_wizard_state: None,
            project_detail_state: None,
            notice: None,
            signing_out: false,
            events,
        }
    }

    /// Begin resolving the stored session and open the project list.
    pub fn start(&mut self) {
        let auth = self.auth.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = auth.restore_session().await;
            let _ = events.send(AppEvent::AuthResolved(result));
        });

        self.navigate(Destination::ProjectList);
    }

    fn show(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    /// Mount a fresh screen for `destination`. Results still in flight for the
    /// previous screen are dropped when they arrive.
    pub fn navigate(&mut self, destination: Destination) {
        let detail = match destination {
            Destination::ProjectDetail(id) => self
                .projects_state
                .as_ref()
                .and_then(|state| state.projects().iter().find(|p| p.id == id).cloned()),
            _ => None,
        };

        self.mount += 1;
        self.sign_in_state = None;
        self.projects_state = None;
        self.project_wizard_state = None;
        self.project_detail_state = None;
        tracing::debug!(?destination, mount = self.mount, "navigate");

        match destination {
            Destination::SignIn => {
                self.sign_in_state = Some(SignInState::new());
                self.screen = AppScreen::SignIn;
            }
            Destination::ProjectList => {
                self.projects_state = Some(ProjectsState::new());
                self.screen = AppScreen::Projects;
                self.sync_projects();
            }
            Destination::CreateProject => {
                self.project_wizard_state = Some(ProjectWizardState::new());
                self.screen = AppScreen::ProjectWizard;
            }
            Destination::ProjectDetail(id) => match detail {
                Some(project) => {
                    self.project_detail_state = Some(ProjectDetailState::new(project));
                    self.screen = AppScreen::ProjectDetail(id);
                }
                None => {
                    tracing::warn!(project_id = %id, "project not in the loaded list");
                    self.navigate(Destination::ProjectList);
                }
            },
        }
    }

    /// Let the list screen react to the current auth state.
    fn sync_projects(&mut self) {
        let command = match self.projects_state.as_mut() {
            Some(state) => state.on_auth(&self.auth_state),
            None => return,
        };

        match command {
            ListCommand::Wait => {}
            ListCommand::Redirect(destination) => self.navigate(destination),
            ListCommand::Fetch { owner_id, order } => {
                let store = self.store.clone();
                let events = self.events.clone();
                let mount = self.mount;
                tokio::spawn(async move {
                    let result = store.select_projects(owner_id, order).await;
                    let _ = events.send(AppEvent::ProjectsLoaded { mount, result });
                });
            }
        }
    }

    fn is_current(&self, mount: u64, what: &str) -> bool {
        if mount != self.mount {
            tracing::debug!(mount, current = self.mount, what, "dropping stale result");
            return false;
        }
        true
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::AuthResolved(result) => {
                // A sign-in or sign-out already settled the session.
                if !self.auth_state.is_resolving() {
                    tracing::debug!("ignoring late session restore");
                    return;
                }
                let user = result.unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "could not restore session");
                    None
                });
                self.auth_state = AuthState::resolved(user);
                if self.screen == AppScreen::Projects {
                    self.sync_projects();
                }
            }
            AppEvent::SignedIn { mount, result } => {
                if !self.is_current(mount, "sign in") {
                    return;
                }
                let Some(state) = self.sign_in_state.as_mut() else {
                    return;
                };
                match state.finish_submit(result) {
                    Ok((user, destination)) => {
                        self.auth_state = AuthState::resolved(Some(user));
                        self.navigate(destination);
                    }
                    Err(notice) => self.show(notice),
                }
            }
            AppEvent::SignedOut(result) => match result {
                _ if !self.signing_out => {}
                Ok(()) => {
                    self.signing_out = false;
                    self.auth_state = AuthState::resolved(None);
                    self.navigate(Destination::SignIn);
                }
                Err(err) => {
                    self.signing_out = false;
                    tracing::error!(error = %err, "error signing out");
                    self.show(Notice::error(err.message()));
                }
            },
            AppEvent::ProjectsLoaded { mount, result } => {
                if !self.is_current(mount, "project list") {
                    return;
                }
                let notice = self
                    .projects_state
                    .as_mut()
                    .and_then(|state| state.apply_fetch(result));
                if let Some(notice) = notice {
                    self.show(notice);
                }
            }
            AppEvent::ProjectCreated { mount, result } => {
                if !self.is_current(mount, "project creation") {
                    return;
                }
                let Some(state) = self.project_wizard_state.as_mut() else {
                    return;
                };
                match state.finish_submit(result) {
                    SubmitOutcome::Created { notice, destination } => {
                        self.show(notice);
                        self.navigate(destination);
                    }
                    SubmitOutcome::Failed { notice } => self.show(notice),
                }
            }
        }
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.screen {
            AppScreen::SignIn => self.handle_sign_in_key(key),
            AppScreen::Projects => self.handle_projects_key(key),
            AppScreen::ProjectWizard => self.handle_project_wizard_key(key),
            AppScreen::ProjectDetail(_) => {
                if let Some(destination) = project_detail::handle_input(key) {
                    self.navigate(destination);
                }
                false
            }
        }
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) -> bool {
        let Some(state) = self.sign_in_state.as_mut() else {
            return false;
        };
        match sign_in::handle_input(state, key) {
            Some(SignInAction::Exit) => return true,
            Some(SignInAction::Submit { email, password }) => {
                let auth = self.auth.clone();
                let events = self.events.clone();
                let mount = self.mount;
                tokio::spawn(async move {
                    let result = auth.sign_in(&email, &password).await;
                    let _ = events.send(AppEvent::SignedIn { mount, result });
                });
            }
            None => {}
        }
        false
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> bool {
        let Some(state) = self.projects_state.as_mut() else {
            return false;
        };
        match projects::handle_input(state, key) {
            Some(ProjectAction::Exit) => return true,
            Some(ProjectAction::Refresh) => self.navigate(Destination::ProjectList),
            Some(ProjectAction::Navigate(destination)) => self.navigate(destination),
            Some(ProjectAction::SignOut) if !self.signing_out => {
                self.signing_out = true;
                let auth = self.auth.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = auth.sign_out().await;
                    let _ = events.send(AppEvent::SignedOut(result));
                });
            }
            Some(ProjectAction::SignOut) | None => {}
        }
        false
    }

    fn handle_project_wizard_key(&mut self, key: KeyEvent) -> bool {
        let Some(state) = self.project_wizard_state.as_mut() else {
            return false;
        };
        match project_wizard::handle_input(state, key) {
            Some(ProjectWizardAction::Cancel) => self.navigate(Destination::ProjectList),
            Some(ProjectWizardAction::Submit) => match state.begin_submit(self.auth_state.user()) {
                SubmitStart::Blocked => {}
                SubmitStart::Rejected(notice) => self.show(notice),
                SubmitStart::Started(record) => {
                    let store = self.store.clone();
                    let events = self.events.clone();
                    let mount = self.mount;
                    tokio::spawn(async move {
                        let result = store.insert_project(&record).await;
                        let _ = events.send(AppEvent::ProjectCreated { mount, result });
                    });
                }
            },
            None => {}
        }
        false
    }

    pub fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        match self.screen {
            AppScreen::SignIn => {
                if let Some(state) = &mut self.sign_in_state {
                    render_sign_in(f, state);
                }
            }
            AppScreen::Projects => {
                if let Some(state) = &mut self.projects_state {
                    render_projects(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut self.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::ProjectDetail(_) => {
                if let Some(state) = &self.project_detail_state {
                    render_project_detail(f, state);
                }
            }
        }

        if let Some(notice) = &self.notice {
            render_notice(f, notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{project, MemoryAuth, MemoryStore};
    use crate::models::ProjectType;
    use crate::ui::projects::ListPhase;
    use chrono::Utc;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    type TestApp = App<MemoryStore, MemoryAuth>;

    fn user() -> User {
        User { id: Uuid::from_u128(5), email: "pm@example.com".into() }
    }

    fn account() -> MemoryAuth {
        MemoryAuth::with_account(user(), "pw")
    }

    fn notice_text(app: &TestApp) -> Option<&str> {
        app.notice.as_ref().map(|n| n.message.as_str())
    }

    fn app(store: MemoryStore, auth: MemoryAuth) -> (TestApp, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(store, auth, tx), rx)
    }

    fn press(app: &mut TestApp, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn pump(app: &mut TestApp, rx: &mut UnboundedReceiver<AppEvent>) {
        let event = rx.recv().await.expect("event");
        app.apply(event);
    }

    /// Start the app and let the session restore and first fetch complete.
    async fn started(
        store: MemoryStore,
        auth: MemoryAuth,
    ) -> (TestApp, UnboundedReceiver<AppEvent>) {
        let (mut app, mut rx) = app(store, auth);
        app.start();
        assert!(app.auth_state.is_resolving());
        assert_eq!(app.projects_state.as_ref().map(|s| s.phase()), Some(ListPhase::Loading));
        pump(&mut app, &mut rx).await;
        (app, rx)
    }

    fn fill_required_fields(app: &mut TestApp) {
        press(app, KeyCode::Enter);
        type_text(app, "Riverside Tower");
        press(app, KeyCode::Enter);
        press(app, KeyCode::Down);
        press(app, KeyCode::Down);
        press(app, KeyCode::Right);
        press(app, KeyCode::Right);
    }

    #[tokio::test]
    async fn anonymous_session_redirects_without_fetching() {
        let store = MemoryStore::default();
        let (app, _rx) = started(store.clone(), MemoryAuth::default()).await;

        assert_eq!(app.screen, AppScreen::SignIn);
        assert!(app.notice.as_ref().is_none());
        assert!(store.selects().is_empty());
    }

    #[tokio::test]
    async fn signed_in_session_loads_projects() {
        let store = MemoryStore::with_rows(vec![project(user().id, "Dock 4", Utc::now())]);
        let (mut app, mut rx) = started(store.clone(), account()).await;
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, AppScreen::Projects);
        assert_eq!(app.projects_state.as_ref().map(|s| s.phase()), Some(ListPhase::Ready));
        assert_eq!(store.selects().len(), 1);
    }

    #[tokio::test]
    async fn sign_in_then_list() {
        let store = MemoryStore::default();
        let auth = account();
        let (mut app, mut rx) = app(store.clone(), auth);
        app.auth_state = AuthState::resolved(None);
        app.navigate(Destination::ProjectList);
        assert_eq!(app.screen, AppScreen::SignIn);

        type_text(&mut app, "pm@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "pw");
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, AppScreen::Projects);

        pump(&mut app, &mut rx).await;
        assert_eq!(store.selects(), vec![(user().id, projects::LIST_ORDER)]);
    }

    #[tokio::test]
    async fn create_project_stores_record_and_returns_to_list() {
        let store = MemoryStore::default();
        let (mut app, mut rx) = started(store.clone(), account()).await;
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, AppScreen::ProjectWizard);
        fill_required_fields(&mut app);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('s'));

        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, AppScreen::Projects);
        assert_eq!(notice_text(&app), Some("Project created successfully!"));

        let inserted = store.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].name, "Riverside Tower");
        assert_eq!(inserted[0].project_type, ProjectType::Commercial);
        assert_eq!(inserted[0].owner_id, user().id);
        assert_eq!(inserted[0].budget, None);
    }

    #[tokio::test]
    async fn failed_insert_stays_on_form() {
        let store = MemoryStore::default();
        let (mut app, mut rx) = started(store.clone(), account()).await;
        pump(&mut app, &mut rx).await;
        store.fail_with("permission denied for table projects");

        press(&mut app, KeyCode::Char('n'));
        fill_required_fields(&mut app);
        press(&mut app, KeyCode::Char('s'));
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, AppScreen::ProjectWizard);
        assert_eq!(
            notice_text(&app),
            Some("Failed to create project: permission denied for table projects")
        );
        assert!(app.project_wizard_state.as_ref().is_some_and(|s| s.can_submit()));
    }

    #[tokio::test]
    async fn result_for_cancelled_form_is_dropped() {
        let store = MemoryStore::default();
        let (mut app, mut rx) = started(store.clone(), account()).await;
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('n'));
        fill_required_fields(&mut app);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, AppScreen::Projects);

        let mut saw_stale_insert = false;
        for _ in 0..2 {
            let event = rx.recv().await.expect("event");
            saw_stale_insert |= matches!(event, AppEvent::ProjectCreated { .. });
            app.apply(event);
        }
        assert!(saw_stale_insert);
        assert!(app.notice.as_ref().is_none());
        assert_eq!(app.screen, AppScreen::Projects);
    }

    #[tokio::test]
    async fn fetch_failure_shows_generic_notice() {
        let store = MemoryStore::default();
        store.fail_with("connection refused");
        let (mut app, mut rx) = started(store, account()).await;
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, AppScreen::Projects);
        assert_eq!(notice_text(&app), Some("Failed to fetch projects"));
    }

    #[tokio::test]
    async fn detail_and_back() {
        let row = project(user().id, "Dock 4", Utc::now());
        let id = row.id;
        let store = MemoryStore::with_rows(vec![row]);
        let (mut app, mut rx) = started(store.clone(), account()).await;
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, AppScreen::ProjectDetail(id));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, AppScreen::Projects);
        pump(&mut app, &mut rx).await;
        assert_eq!(store.selects().len(), 2);
    }

    #[tokio::test]
    async fn sign_out_returns_to_sign_in() {
        let (mut app, mut rx) = started(MemoryStore::default(), account()).await;
        pump(&mut app, &mut rx).await;

        press(&mut app, KeyCode::Char('o'));
        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, AppScreen::SignIn);
        assert!(app.auth_state.user().is_none());
    }

    #[tokio::test]
    async fn sign_out_while_session_restores_wins() {
        let (mut app, _rx) = app(MemoryStore::default(), account());
        app.start();
        assert!(app.auth_state.is_resolving());

        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('o'));
        app.apply(AppEvent::SignedOut(Ok(())));
        assert_eq!(app.screen, AppScreen::SignIn);

        // The restore spawned by start arrives after the sign-out.
        app.apply(AppEvent::AuthResolved(Ok(Some(user()))));
        assert!(app.auth_state.user().is_none());
        assert_eq!(app.screen, AppScreen::SignIn);

        // A second sign-out result without a request behind it changes nothing.
        app.navigate(Destination::CreateProject);
        app.apply(AppEvent::SignedOut(Ok(())));
        assert_eq!(app.screen, AppScreen::ProjectWizard);
    }
}
