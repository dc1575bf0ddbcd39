use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use uuid::Uuid;

use crate::auth::{AuthGate, AuthState};
use crate::db::{BackendError, OrderBy, ProjectColumn};
use crate::models::{status_label, type_label, Project};
use crate::navigation::Destination;
use crate::ui::components::notice::Notice;
use crate::ui::format::{format_budget, format_date};

/// Newest projects first.
pub const LIST_ORDER: OrderBy = OrderBy::desc(ProjectColumn::CreatedAt);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Ready,
    Redirecting,
}

/// What the list screen needs done after looking at the auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Wait,
    Fetch { owner_id: Uuid, order: OrderBy },
    Redirect(Destination),
}

// Represents the state of the project list screen
pub struct ProjectsState {
    phase: ListPhase,
    fetching: bool,
    projects: Vec<Project>,
    list_state: ListState,
}

impl ProjectsState {
    pub fn new() -> Self {
        Self {
            phase: ListPhase::Loading,
            fetching: false,
            projects: Vec::new(),
            list_state: ListState::default(),
        }
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Decide between waiting, fetching and redirecting.
    ///
    /// Nothing is fetched before auth has resolved, and at most one fetch is
    /// outstanding at a time.
    pub fn on_auth(&mut self, auth: &AuthState) -> ListCommand {
        match (self.phase, auth.gate()) {
            (ListPhase::Loading, AuthGate::Resolving) => ListCommand::Wait,
            (ListPhase::Loading, AuthGate::Anonymous) => {
                self.phase = ListPhase::Redirecting;
                ListCommand::Redirect(Destination::SignIn)
            }
            (ListPhase::Loading, AuthGate::Authenticated(owner_id)) if !self.fetching => {
                self.fetching = true;
                ListCommand::Fetch { owner_id, order: LIST_ORDER }
            }
            (ListPhase::Loading, AuthGate::Authenticated(_)) => ListCommand::Wait,
            (ListPhase::Ready | ListPhase::Redirecting, _) => ListCommand::Wait,
        }
    }

    /// Apply a fetch response. On failure the previous rows stay and an error notice is returned.
    pub fn apply_fetch(&mut self, result: Result<Vec<Project>, BackendError>) -> Option<Notice> {
        self.fetching = false;
        self.phase = ListPhase::Ready;

        match result {
            Ok(projects) => {
                tracing::debug!(count = projects.len(), "projects loaded");
                self.projects = projects;
                self.list_state.select(if self.projects.is_empty() { None } else { Some(0) });
                None
            }
            Err(err) => {
                tracing::error!(error = %err, "error fetching projects");
                Some(Notice::error("Failed to fetch projects"))
            }
        }
    }

    pub fn next(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.projects.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.projects.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }
}

impl Default for ProjectsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Display values derived from one project row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCard {
    pub name: String,
    pub description: String,
    pub status: String,
    pub project_type: String,
    pub location: Option<String>,
    pub budget: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created: String,
}

impl ProjectCard {
    pub fn schedule(&self) -> Option<String> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
            (Some(start), None) => Some(start.clone()),
            (None, Some(end)) => Some(format!("Until {}", end)),
            (None, None) => None,
        }
    }
}

impl From<&Project> for ProjectCard {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description provided".to_string()),
            status: status_label(&project.status).to_string(),
            project_type: type_label(&project.project_type).to_string(),
            location: project.location.clone().filter(|l| !l.trim().is_empty()),
            budget: format_budget(project.budget),
            start_date: project.start_date.map(format_date),
            end_date: project.end_date.map(format_date),
            created: format_date(project.created_at.date_naive()),
        }
    }
}

pub fn status_color(raw: &str) -> Color {
    match raw {
        "planning" => Color::Blue,
        "in_progress" => Color::Green,
        "on_hold" => Color::Yellow,
        "completed" => Color::Magenta,
        "cancelled" => Color::Red,
        _ => Color::Gray,
    }
}

pub enum ProjectAction {
    Exit,
    Refresh,
    SignOut,
    Navigate(Destination),
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let header = Paragraph::new(Spans::from(vec![
        Span::styled("Projects", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  Manage your construction projects"),
    ]))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.phase() {
        ListPhase::Loading | ListPhase::Redirecting => render_loading(frame, chunks[1]),
        ListPhase::Ready if state.projects.is_empty() => render_empty(frame, chunks[1]),
        ListPhase::Ready => render_cards(frame, state, chunks[1]),
    }

    let buttons_text = if state.selected_project().is_some() {
        "<N> New Project | <Enter> View Project | <R> Refresh | <O> Sign Out | <Q> Quit"
    } else {
        "<N> New Project | <R> Refresh | <O> Sign Out | <Q> Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[2]);
}

fn render_loading<B: Backend>(frame: &mut Frame<B>, area: Rect) {
    let loading = Paragraph::new("Loading projects...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(loading, area);
}

fn render_empty<B: Backend>(frame: &mut Frame<B>, area: Rect) {
    let empty = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::styled("No projects yet", Style::default().add_modifier(Modifier::BOLD))),
        Spans::from(""),
        Spans::from("Get started by creating your first construction project."),
        Spans::from(""),
        Spans::from(Span::styled(
            "<N> Create Your First Project",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(empty, area);
}

fn render_cards<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState, area: Rect) {
    let muted = Style::default().fg(Color::Gray);
    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            let card = ProjectCard::from(project);
            let mut lines = vec![
                Spans::from(vec![
                    Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(
                        format!("[{}]", card.status),
                        Style::default().fg(status_color(&project.status)),
                    ),
                    Span::styled(format!("  {}", card.project_type), muted),
                ]),
                Spans::from(Span::styled(format!("  {}", card.description), muted)),
            ];

            let mut details = vec![format!("Budget: {}", card.budget)];
            if let Some(location) = &card.location {
                details.push(format!("Location: {}", location));
            }
            if let Some(schedule) = card.schedule() {
                details.push(schedule);
            }
            details.push(format!("Created {}", card.created));
            lines.push(Spans::from(Span::styled(format!("  {}", details.join(" | ")), muted)));
            lines.push(Spans::from(""));

            ListItem::new(lines)
        })
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(projects_list, area, &mut state.list_state);
}

pub fn handle_input(state: &mut ProjectsState, key: KeyEvent) -> Option<ProjectAction> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ProjectAction::Exit),
        KeyCode::Char('n') => return Some(ProjectAction::Navigate(Destination::CreateProject)),
        KeyCode::Char('r') if state.phase == ListPhase::Ready => {
            return Some(ProjectAction::Refresh);
        }
        KeyCode::Char('o') => return Some(ProjectAction::SignOut),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Enter => {
            if let Some(project) = state.selected_project() {
                return Some(ProjectAction::Navigate(Destination::ProjectDetail(project.id)));
            }
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{project, MemoryStore};
    use crate::db::ProjectStore;
    use crate::models::User;
    use chrono::{NaiveDate, TimeZone, Utc};
    use crossterm::event::KeyModifiers;

    fn signed_in(id: u128) -> AuthState {
        AuthState::resolved(Some(User { id: Uuid::from_u128(id), email: "pm@example.com".into() }))
    }

    #[test]
    fn waits_while_auth_resolves() {
        let mut state = ProjectsState::new();
        assert_eq!(state.on_auth(&AuthState::resolving()), ListCommand::Wait);
        assert_eq!(state.phase(), ListPhase::Loading);
    }

    #[test]
    fn anonymous_redirects_and_never_fetches() {
        let mut state = ProjectsState::new();
        assert_eq!(
            state.on_auth(&AuthState::resolved(None)),
            ListCommand::Redirect(Destination::SignIn)
        );
        assert_eq!(state.phase(), ListPhase::Redirecting);
        assert_eq!(state.on_auth(&signed_in(1)), ListCommand::Wait);
    }

    #[test]
    fn authenticated_fetches_once_newest_first() {
        let mut state = ProjectsState::new();
        assert_eq!(
            state.on_auth(&signed_in(1)),
            ListCommand::Fetch { owner_id: Uuid::from_u128(1), order: LIST_ORDER }
        );
        assert_eq!(state.on_auth(&signed_in(1)), ListCommand::Wait);
        assert_eq!(LIST_ORDER, OrderBy { column: ProjectColumn::CreatedAt, ascending: false });
    }

    #[test]
    fn empty_result_is_ready_and_empty() {
        let mut state = ProjectsState::new();
        state.on_auth(&signed_in(1));
        assert!(state.apply_fetch(Ok(Vec::new())).is_none());
        assert_eq!(state.phase(), ListPhase::Ready);
        assert!(state.projects().is_empty());
        assert!(state.selected_project().is_none());
    }

    #[test]
    fn fetch_failure_keeps_previous_rows() {
        let owner = Uuid::from_u128(1);
        let mut state = ProjectsState::new();
        state.on_auth(&signed_in(1));
        state.apply_fetch(Ok(vec![project(owner, "Dock 4", Utc::now())]));

        let notice = state.apply_fetch(Err(BackendError::Rejected("timeout".into()))).unwrap();
        assert_eq!(notice.message, "Failed to fetch projects");
        assert_eq!(state.phase(), ListPhase::Ready);
        assert_eq!(state.projects().len(), 1);
    }

    #[test]
    fn first_load_failure_leaves_list_empty() {
        let mut state = ProjectsState::new();
        state.on_auth(&signed_in(1));
        assert!(state.apply_fetch(Err(BackendError::Rejected("offline".into()))).is_some());
        assert!(state.projects().is_empty());
        assert_eq!(state.phase(), ListPhase::Ready);
    }

    #[tokio::test]
    async fn newer_rows_render_first() {
        let owner = Uuid::from_u128(9);
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let store =
            MemoryStore::with_rows(vec![project(owner, "Older", t1), project(owner, "Newer", t2)]);

        let mut state = ProjectsState::new();
        let ListCommand::Fetch { owner_id, order } = state.on_auth(&signed_in(9)) else {
            panic!("expected a fetch");
        };
        state.apply_fetch(store.select_projects(owner_id, order).await);

        let names: Vec<&str> = state.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Newer", "Older"]);
        assert_eq!(state.selected_project().map(|p| p.name.as_str()), Some("Newer"));
        assert_eq!(store.selects(), vec![(owner, LIST_ORDER)]);
    }

    #[test]
    fn card_uses_labels_and_placeholders() {
        let created = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let mut row = project(Uuid::nil(), "Riverside Tower", created);
        row.status = "in_progress".into();
        row.project_type = "commercial".into();

        let card = ProjectCard::from(&row);
        assert_eq!(card.status, "In Progress");
        assert_eq!(card.project_type, "Commercial");
        assert_eq!(card.description, "No description provided");
        assert_eq!(card.budget, "Budget not set");
        assert_eq!(card.location, None);
        assert_eq!(card.schedule(), None);
        assert_eq!(card.created, "Mar 7, 2024");
    }

    #[test]
    fn card_passes_unknown_enum_values_through() {
        let mut row = project(Uuid::nil(), "Quay", Utc::now());
        row.status = "awaiting_permit".into();
        row.project_type = "marine".into();

        let card = ProjectCard::from(&row);
        assert_eq!(card.status, "awaiting_permit");
        assert_eq!(card.project_type, "marine");
        assert_eq!(status_color(&row.status), Color::Gray);
    }

    #[test]
    fn card_formats_money_and_dates() {
        let mut row = project(Uuid::nil(), "Quay", Utc::now());
        row.budget = Some(1_250_000.5);
        row.location = Some("Pier 9".into());
        row.start_date = NaiveDate::from_ymd_opt(2024, 4, 1);
        row.end_date = NaiveDate::from_ymd_opt(2025, 1, 15);

        let card = ProjectCard::from(&row);
        assert_eq!(card.budget, "$1,250,000.50");
        assert_eq!(card.location.as_deref(), Some("Pier 9"));
        assert_eq!(card.schedule().as_deref(), Some("Apr 1, 2024 - Jan 15, 2025"));
    }

    #[test]
    fn enter_opens_selected_project() {
        let owner = Uuid::from_u128(1);
        let row = project(owner, "Dock 4", Utc::now());
        let id = row.id;
        let mut state = ProjectsState::new();
        state.on_auth(&signed_in(1));
        state.apply_fetch(Ok(vec![row]));

        let action = handle_input(&mut state, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(
            action,
            Some(ProjectAction::Navigate(Destination::ProjectDetail(got))) if got == id
        ));
    }
}
