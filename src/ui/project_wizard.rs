use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::db::BackendError;
use crate::models::{NewProject, ProjectStatus, ProjectType, User};
use crate::navigation::Destination;
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::notice::Notice;
use crate::ui::format::format_date;

pub enum ProjectWizardAction {
    Cancel,
    Submit,
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Description,
    ProjectType,
    Status,
    Budget,
    Location,
    StartDate,
    EndDate,
}

impl ProjectField {
    const ORDER: [ProjectField; 8] = [
        ProjectField::Name,
        ProjectField::Description,
        ProjectField::ProjectType,
        ProjectField::Status,
        ProjectField::Budget,
        ProjectField::Location,
        ProjectField::StartDate,
        ProjectField::EndDate,
    ];

    fn label(self) -> &'static str {
        match self {
            ProjectField::Name => "Project Name *",
            ProjectField::Description => "Description",
            ProjectField::ProjectType => "Project Type *",
            ProjectField::Status => "Status",
            ProjectField::Budget => "Budget (USD)",
            ProjectField::Location => "Location",
            ProjectField::StartDate => "Start Date",
            ProjectField::EndDate => "End Date",
        }
    }

    fn is_select(self) -> bool {
        matches!(self, ProjectField::ProjectType | ProjectField::Status)
    }

    fn is_date(self) -> bool {
        matches!(self, ProjectField::StartDate | ProjectField::EndDate)
    }
}

/// Values typed into the creation form, one slot per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    name: String,
    description: String,
    project_type: Option<ProjectType>,
    status: ProjectStatus,
    budget: String,
    location: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl ProjectForm {
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_project_type(&mut self, project_type: Option<ProjectType>) {
        self.project_type = project_type;
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
    }

    pub fn set_budget(&mut self, budget: impl Into<String>) {
        self.budget = budget.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date;
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.end_date = date;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        self.project_type
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn budget(&self) -> &str {
        &self.budget
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && self.project_type.is_some()
    }

    /// The record to insert, or `None` while a required field is missing.
    pub fn to_record(&self, owner_id: Uuid) -> Option<NewProject> {
        if !self.has_required_fields() {
            return None;
        }

        Some(NewProject {
            name: self.name.trim().to_string(),
            description: blank_to_none(&self.description),
            owner_id,
            status: self.status,
            project_type: self.project_type?,
            budget: parse_budget(&self.budget),
            location: blank_to_none(&self.location),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A usable budget amount, or `None` for blank, malformed, negative or non-finite input.
pub fn parse_budget(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

/// Result of pressing submit.
#[derive(Debug)]
pub enum SubmitStart {
    /// Submit is disabled right now; nothing happens.
    Blocked,
    /// Refused before reaching the backend.
    Rejected(Notice),
    /// Send this record; the form is now busy.
    Started(NewProject),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created { notice: Notice, destination: Destination },
    Failed { notice: Notice },
}

pub struct ProjectWizardState {
    form: ProjectForm,
    pub current_field: ProjectField,
    pub editing: bool,
    start_date_state: DateInputState,
    end_date_state: DateInputState,
    submitting: bool,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self {
            form: ProjectForm::default(),
            current_field: ProjectField::Name,
            editing: false,
            start_date_state: DateInputState::new(None),
            end_date_state: DateInputState::new(None),
            submitting: false,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.form.has_required_fields()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting { "Creating..." } else { "Create Project" }
    }

    pub fn begin_submit(&mut self, user: Option<&User>) -> SubmitStart {
        if !self.can_submit() {
            return SubmitStart::Blocked;
        }
        let Some(user) = user else {
            let notice = Notice::error("You must be logged in to create a project");
            return SubmitStart::Rejected(notice);
        };
        let Some(record) = self.form.to_record(user.id) else {
            return SubmitStart::Blocked;
        };

        self.submitting = true;
        SubmitStart::Started(record)
    }

    /// Apply the insert response. The form keeps its values on failure.
    pub fn finish_submit(&mut self, result: Result<Uuid, BackendError>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(id) => {
                tracing::info!(project_id = %id, "project created");
                SubmitOutcome::Created {
                    notice: Notice::success("Project created successfully!"),
                    destination: Destination::ProjectList,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "error creating project");
                SubmitOutcome::Failed {
                    notice: Notice::error(format!("Failed to create project: {}", err.message())),
                }
            }
        }
    }

    pub fn toggle_editing(&mut self) {
        if self.current_field.is_select() {
            self.cycle_select(true);
            return;
        }

        self.editing = !self.editing;
        if self.editing {
            let today = chrono::Local::now().date_naive();
            match self.current_field {
                ProjectField::StartDate => self.start_date_state.start_editing(today),
                ProjectField::EndDate => {
                    let fallback = self.form.start_date.map_or(today, |start| start.max(today));
                    self.end_date_state.start_editing(fallback);
                }
                _ => {}
            }
        } else {
            self.start_date_state.stop_editing();
            self.end_date_state.stop_editing();
        }
        self.sync_dates();
    }

    pub fn next_field(&mut self) {
        let i = ProjectField::ORDER.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = ProjectField::ORDER[(i + 1) % ProjectField::ORDER.len()];
    }

    pub fn previous_field(&mut self) {
        let i = ProjectField::ORDER.iter().position(|f| *f == self.current_field).unwrap_or(0);
        let len = ProjectField::ORDER.len();
        self.current_field = ProjectField::ORDER[(i + len - 1) % len];
    }

    fn cycle_select(&mut self, forward: bool) {
        match self.current_field {
            ProjectField::ProjectType => {
                let all = ProjectType::ALL;
                let current = self.form.project_type.and_then(|t| all.iter().position(|x| *x == t));
                let next = match current {
                    Some(i) if forward => all[(i + 1) % all.len()],
                    Some(i) => all[(i + all.len() - 1) % all.len()],
                    None if forward => all[0],
                    None => all[all.len() - 1],
                };
                self.form.set_project_type(Some(next));
            }
            ProjectField::Status => {
                let all = ProjectStatus::ALL;
                let i = all.iter().position(|x| *x == self.form.status).unwrap_or(0);
                let next = if forward {
                    all[(i + 1) % all.len()]
                } else {
                    all[(i + all.len() - 1) % all.len()]
                };
                self.form.set_status(next);
            }
            _ => {}
        }
    }

    fn clear_current_date(&mut self) {
        match self.current_field {
            ProjectField::StartDate => self.start_date_state.clear(),
            ProjectField::EndDate => self.end_date_state.clear(),
            _ => return,
        }
        self.sync_dates();
    }

    fn sync_dates(&mut self) {
        self.form.set_start_date(self.start_date_state.date);
        self.end_date_state.set_min(self.start_date_state.date);
        self.form.set_end_date(self.end_date_state.date);
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ProjectField::Name => {
                if let Some(value) = edit_text(&self.form.name, key, |_| true) {
                    self.form.set_name(value);
                }
            }
            ProjectField::Description => {
                if let Some(value) = edit_text(&self.form.description, key, |_| true) {
                    self.form.set_description(value);
                }
            }
            ProjectField::Location => {
                if let Some(value) = edit_text(&self.form.location, key, |_| true) {
                    self.form.set_location(value);
                }
            }
            ProjectField::Budget => {
                let has_point = self.form.budget.contains('.');
                let accepts = |c: char| c.is_ascii_digit() || (c == '.' && !has_point);
                if let Some(value) = edit_text(&self.form.budget, key, accepts) {
                    self.form.set_budget(value);
                }
            }
            ProjectField::StartDate => {
                self.start_date_state.handle_input(key);
                self.sync_dates();
            }
            ProjectField::EndDate => {
                self.end_date_state.handle_input(key);
                self.sync_dates();
            }
            ProjectField::ProjectType | ProjectField::Status => {}
        }
    }

    fn display_value(&self, field: ProjectField) -> String {
        let cursor = if self.editing && field == self.current_field { "|" } else { "" };
        let form = &self.form;
        match field {
            ProjectField::Name => format!("{}{}", form.name(), cursor),
            ProjectField::Description => format!("{}{}", form.description(), cursor),
            ProjectField::Location => format!("{}{}", form.location(), cursor),
            ProjectField::Budget if form.budget().is_empty() && cursor.is_empty() => {
                "0.00".to_string()
            }
            ProjectField::Budget => format!("{}{}", form.budget(), cursor),
            ProjectField::ProjectType => match form.project_type() {
                Some(kind) => format!("< {} >", kind.label()),
                None => "< Select project type >".to_string(),
            },
            ProjectField::Status => format!("< {} >", form.status().label()),
            ProjectField::StartDate if self.editing && field == self.current_field => {
                self.start_date_state.get_display_string()
            }
            ProjectField::EndDate if self.editing && field == self.current_field => {
                self.end_date_state.get_display_string()
            }
            ProjectField::StartDate => date_or_placeholder(form.start_date(), "Select start date"),
            ProjectField::EndDate => date_or_placeholder(form.end_date(), "Select end date"),
        }
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

fn date_or_placeholder(date: Option<NaiveDate>, placeholder: &str) -> String {
    match date {
        Some(date) => format_date(date),
        None => placeholder.to_string(),
    }
}

/// Apply a key to a text value; `None` when the key changes nothing.
fn edit_text(current: &str, key: KeyCode, accepts: impl Fn(char) -> bool) -> Option<String> {
    match key {
        KeyCode::Char(c) if accepts(c) => {
            let mut value = current.to_string();
            value.push(c);
            Some(value)
        }
        KeyCode::Backspace if !current.is_empty() => {
            let mut value = current.to_string();
            value.pop();
            Some(value)
        }
        _ => None,
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Create New Project - set up your construction project details")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_buttons(f, state, chunks[2]);

    let help_text = if state.editing {
        if state.current_field.is_date() {
            "Enter - Done | Left/Right - Switch date part | Esc - Done"
        } else {
            "Enter - Done | Esc - Done"
        }
    } else if state.current_field.is_select() {
        "Left/Right - Change | Up/Down - Navigate fields | S - Create | Esc - Cancel"
    } else if state.current_field.is_date() {
        "Enter - Pick date | X - Clear | Up/Down - Navigate fields | S - Create | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Create | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = ProjectField::ORDER
        .iter()
        .map(|&field| {
            let selected = field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = state.display_value(field);
            let value_span = if selected && state.editing {
                Span::styled(value, Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(value)
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                value_span,
            ]))
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Information"));

    f.render_widget(form_list, area);
}

fn render_buttons<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let submit_style = if state.can_submit() {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let buttons = Paragraph::new(Spans::from(vec![
        Span::styled(" Cancel (Esc) ", Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled(format!(" {} (S) ", state.submit_label()), submit_style),
    ]))
    .block(Block::default().borders(Borders::TOP));

    f.render_widget(buttons, area);
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyEvent) -> Option<ProjectWizardAction> {
    match key.code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectWizardAction::Cancel);
            }
        }
        KeyCode::Enter => {
            state.toggle_editing();
        }
        KeyCode::Up if !state.editing => {
            state.previous_field();
        }
        KeyCode::Down | KeyCode::Tab if !state.editing => {
            state.next_field();
        }
        KeyCode::Left if !state.editing => state.cycle_select(false),
        KeyCode::Right if !state.editing => state.cycle_select(true),
        KeyCode::Char('x') if !state.editing => state.clear_current_date(),
        KeyCode::Char('s') if !state.editing => {
            if state.can_submit() {
                return Some(ProjectWizardAction::Submit);
            }
        }
        _ if state.editing => {
            state.edit_current_field(key.code);
        }
        _ => {}
    }

    None
}
