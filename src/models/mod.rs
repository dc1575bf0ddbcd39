mod project;
mod user;

pub use project::{status_label, type_label, NewProject, Project, ProjectStatus, ProjectType};
pub use user::User;
