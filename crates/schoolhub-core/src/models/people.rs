//! Role-specific records wrapping a `User`, and their write payloads.

use serde::{Deserialize, Serialize};

use super::school::Subject;
use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub user: User,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: i64,
    pub user: User,
    #[serde(default)]
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub user: User,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

fn default_active() -> bool {
    true
}

/// Account fields shared by every person create/update form.
///
/// `password` and `confirm_password` are only sent on create; updates leave
/// them empty and they are skipped on the wire.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    #[serde(flatten)]
    pub person: PersonInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParentInput {
    #[serde(flatten)]
    pub person: PersonInput,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherInput {
    #[serde(flatten)]
    pub person: PersonInput,
    pub subject_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_student_defaults() {
        let json = r#"{"id":12,"sectionId":3,"user":{"id":30,"firstName":"Liya","lastName":"Haile","email":"liya@school.test","role":"STUDENT"}}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.section_id, Some(3));
        assert_eq!(student.parent_id, None);
        assert!(student.is_active);
    }

    #[test]
    fn test_student_input_wire_shape() {
        let input = StudentInput {
            person: PersonInput {
                first_name: "Liya".into(),
                last_name: "Haile".into(),
                email: "liya@school.test".into(),
                password: "secret1".into(),
                confirm_password: "secret1".into(),
                ..Default::default()
            },
            section_id: Some(3),
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["firstName"], "Liya");
        assert_eq!(value["sectionId"], 3);
        assert_eq!(value["password"], "secret1");
        assert!(value.get("confirmPassword").is_none());
        assert!(value.get("parentId").is_none());
    }

    #[test]
    fn test_update_input_omits_password() {
        let input = ParentInput {
            person: PersonInput {
                first_name: "Hana".into(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("password").is_none());
    }
}
