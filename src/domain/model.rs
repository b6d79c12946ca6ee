use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

pub type StudentId = Uuid;

/// One transported child, as stored in the roster slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub stop_number: String,
    pub am_route: bool,
    pub pm_route: bool,
    #[serde(default)]
    pub siblings: BTreeSet<StudentId>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Form data for creating or editing a student; everything but the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub stop_number: String,
    pub am_route: bool,
    pub pm_route: bool,
    #[serde(default)]
    pub siblings: BTreeSet<StudentId>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Am,
    Pm,
    Both,
    None,
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RouteType::Am => "AM",
            RouteType::Pm => "PM",
            RouteType::Both => "BOTH",
            RouteType::None => "NONE",
        };
        f.pad(label)
    }
}

impl Student {
    pub(crate) fn from_draft(id: StudentId, draft: StudentDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            stop_number: draft.stop_number,
            am_route: draft.am_route,
            pm_route: draft.pm_route,
            siblings: draft.siblings,
            active: draft.active,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn route_type(&self) -> RouteType {
        match (self.am_route, self.pm_route) {
            (true, true) => RouteType::Both,
            (true, false) => RouteType::Am,
            (false, true) => RouteType::Pm,
            (false, false) => RouteType::None,
        }
    }

    /// Editable fields of this student, e.g. to pre-fill an edit form.
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            stop_number: self.stop_number.clone(),
            am_route: self.am_route,
            pm_route: self.pm_route,
            siblings: self.siblings.clone(),
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_siblings_defaults_to_empty() {
        let json = r#"{
            "id": "6f1c2d7e-4b0a-4c55-9a3e-0d8b1f2a3c4d",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "stopNumber": "12",
            "amRoute": true,
            "pmRoute": false,
            "active": true
        }"#;

        let student: Student = serde_json::from_str(json).unwrap();
        assert!(student.siblings.is_empty());
        assert!(student.created_at.is_none());
        assert_eq!(student.route_type(), RouteType::Am);
        assert_eq!(student.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_serializes_camel_case_without_empty_timestamps() {
        let draft = StudentDraft {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            stop_number: "7".to_string(),
            am_route: true,
            pm_route: true,
            siblings: BTreeSet::new(),
            active: false,
        };
        let student = Student::from_draft(Uuid::new_v4(), draft.clone());

        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["firstName"], "Grace");
        assert_eq!(value["stopNumber"], "7");
        assert_eq!(value["siblings"], serde_json::json!([]));
        assert!(value.get("createdAt").is_none());
        assert_eq!(student.to_draft(), draft);
        assert_eq!(student.route_type().to_string(), "BOTH");
    }
}
