use uuid::Uuid;

/// Places the screens can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    SignIn,
    ProjectList,
    ProjectDetail(Uuid),
    CreateProject,
}
