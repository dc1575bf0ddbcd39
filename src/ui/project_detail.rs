use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Project;
use crate::navigation::Destination;
use crate::ui::format::format_date;
use crate::ui::projects::{status_color, ProjectCard};

pub struct ProjectDetailState {
    project: Project,
    card: ProjectCard,
}

impl ProjectDetailState {
    pub fn new(project: Project) -> Self {
        let card = ProjectCard::from(&project);
        Self { project, card }
    }
}

pub fn render_project_detail<B: Backend>(f: &mut Frame<B>, state: &ProjectDetailState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(f.size());

    let card = &state.card;
    let title = Paragraph::new(Spans::from(vec![
        Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", card.status),
            Style::default().fg(status_color(&state.project.status)),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let row = |name: &str, value: String| {
        Spans::from(vec![
            Span::styled(format!("{:<12}", name), Style::default().fg(Color::Yellow)),
            Span::raw(value),
        ])
    };
    let not_set = || "Not set".to_string();
    let lines = vec![
        row("Type", card.project_type.clone()),
        row("Budget", card.budget.clone()),
        row("Location", card.location.clone().unwrap_or_else(not_set)),
        row("Start", card.start_date.clone().unwrap_or_else(not_set)),
        row("End", card.end_date.clone().unwrap_or_else(not_set)),
        row("Created", card.created.clone()),
        row("Updated", format_date(state.project.updated_at.date_naive())),
        Spans::from(""),
        Spans::from(card.description.clone()),
    ];
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Project Details"));
    f.render_widget(body, chunks[1]);

    let help = Paragraph::new("<Esc> Back to Projects")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(key: KeyEvent) -> Option<Destination> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => Some(Destination::ProjectList),
        _ => None,
    }
}
