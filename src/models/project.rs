use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A project row as read back from the `projects` table.
///
/// `status` and `project_type` stay raw text so values added on the backend
/// after this client was built still render.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub project_type: String,
    pub budget: Option<f64>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate record submitted by the creation form. Absent optional fields
/// serialize as `null`, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub budget: Option<f64>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "project status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    Commercial,
    Industrial,
    Infrastructure,
}

impl ProjectType {
    pub const ALL: [ProjectType; 4] = [
        ProjectType::Residential,
        ProjectType::Commercial,
        ProjectType::Industrial,
        ProjectType::Infrastructure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Residential => "residential",
            ProjectType::Commercial => "commercial",
            ProjectType::Industrial => "industrial",
            ProjectType::Infrastructure => "infrastructure",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectType::Residential => "Residential",
            ProjectType::Commercial => "Commercial",
            ProjectType::Industrial => "Industrial",
            ProjectType::Infrastructure => "Infrastructure",
        }
    }
}

impl FromStr for ProjectType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "project type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label for a stored status, or the raw value when unknown.
pub fn status_label(raw: &str) -> &str {
    match raw.parse::<ProjectStatus>() {
        Ok(status) => status.label(),
        Err(_) => raw,
    }
}

/// Display label for a stored project type, or the raw value when unknown.
pub fn type_label(raw: &str) -> &str {
    match raw.parse::<ProjectType>() {
        Ok(kind) => kind.label(),
        Err(_) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_map_to_labels() {
        assert_eq!(status_label("in_progress"), "In Progress");
        assert_eq!(status_label("on_hold"), "On Hold");
        assert_eq!(type_label("infrastructure"), "Infrastructure");
    }

    #[test]
    fn unknown_values_fall_back_to_raw() {
        assert_eq!(status_label("archived"), "archived");
        assert_eq!(type_label("maritime"), "maritime");
        assert_eq!(status_label(""), "");
    }

    #[test]
    fn status_defaults_to_planning() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Planning);
    }

    #[test]
    fn parse_rejects_labels() {
        let err = "In Progress".parse::<ProjectStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown project status `In Progress`");
    }

    #[test]
    fn new_project_serializes_absent_fields_as_null() {
        let record = NewProject {
            name: "Riverside Tower".to_string(),
            description: None,
            owner_id: Uuid::nil(),
            status: ProjectStatus::default(),
            project_type: ProjectType::Commercial,
            budget: None,
            location: None,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 7),
            end_date: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "planning");
        assert_eq!(json["project_type"], "commercial");
        assert_eq!(json["start_date"], "2024-03-07");
        assert!(json["budget"].is_null());
        assert!(json["description"].is_null());
        assert!(json["location"].is_null());
        assert!(json["end_date"].is_null());
    }
}
