use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::db::BackendError;
use crate::models::User;
use crate::navigation::Destination;
use crate::ui::components::centered_rect;
use crate::ui::components::notice::Notice;

pub enum SignInAction {
    Exit,
    Submit { email: String, password: String },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SignInField {
    Email,
    Password,
}

pub struct SignInState {
    email: String,
    password: String,
    current_field: SignInField,
    submitting: bool,
}

impl SignInState {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            current_field: SignInField::Email,
            submitting: false,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.email.trim().is_empty() && !self.password.is_empty()
    }

    fn begin_submit(&mut self) -> Option<SignInAction> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        Some(SignInAction::Submit {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Apply the sign-in response; on success returns the user and where to go next.
    pub fn finish_submit(
        &mut self,
        result: Result<User, BackendError>,
    ) -> Result<(User, Destination), Notice> {
        self.submitting = false;
        match result {
            Ok(user) => Ok((user, Destination::ProjectList)),
            Err(err) => {
                tracing::warn!(error = %err, "sign in failed");
                self.password.clear();
                Err(Notice::error(err.message()))
            }
        }
    }

    fn current_value(&mut self) -> &mut String {
        match self.current_field {
            SignInField::Email => &mut self.email,
            SignInField::Password => &mut self.password,
        }
    }
}

impl Default for SignInState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_sign_in<B: Backend>(f: &mut Frame<B>, state: &mut SignInState) {
    let area = centered_rect(60, 50, f.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(4), Constraint::Length(3)].as_ref())
        .split(area);

    let title = Paragraph::new("Sign in to manage your construction projects")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let masked = "*".repeat(state.password.chars().count());
    let fields = [
        (SignInField::Email, "Email", state.email.clone()),
        (SignInField::Password, "Password", masked),
    ];
    let items: Vec<ListItem> = fields
        .into_iter()
        .map(|(field, name, value)| {
            let (style, cursor) = if field == state.current_field {
                (Style::default().fg(Color::Yellow), "|")
            } else {
                (Style::default(), "")
            };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", name), style),
                Span::raw(format!("{}{}", value, cursor)),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(Block::default().borders(Borders::ALL)), chunks[1]);

    let (label, style) = if state.submitting {
        ("Signing in...", Style::default().fg(Color::DarkGray))
    } else if state.can_submit() {
        ("<Enter> Sign In", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        ("<Enter> Sign In", Style::default().fg(Color::DarkGray))
    };
    let help = Paragraph::new(Spans::from(vec![
        Span::styled(label, style),
        Span::raw(" | <Tab> Switch field | <Esc> Quit"),
    ]))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut SignInState, key: KeyEvent) -> Option<SignInAction> {
    match key.code {
        KeyCode::Esc => return Some(SignInAction::Exit),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            state.current_field = match state.current_field {
                SignInField::Email => SignInField::Password,
                SignInField::Password => SignInField::Email,
            };
        }
        KeyCode::Enter => return state.begin_submit(),
        KeyCode::Char(c) if !state.submitting => state.current_value().push(c),
        KeyCode::Backspace if !state.submitting => {
            state.current_value().pop();
        }
        _ => {}
    }
    None
}
