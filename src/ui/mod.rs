pub mod components;
pub mod format;
pub mod project_detail;
pub mod project_wizard;
pub mod projects;
pub mod sign_in;
