use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EmployeeId);

/// Which contact channel is authoritative for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPreference {
    #[default]
    Email,
    Phone,
}

impl ContactPreference {
    /// Maps a radio selection onto a channel. Only `phone` selects the phone
    /// channel; every other value falls back to email.
    pub fn from_selection(selection: &str) -> Self {
        if selection.trim().eq_ignore_ascii_case("phone") {
            Self::Phone
        } else {
            Self::Email
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub skill_name: String,
    /// Fractional years are allowed, e.g. `2.5`.
    pub experience_in_years: f64,
    pub proficiency: String,
}

impl Skill {
    pub fn new(
        skill_name: impl Into<String>,
        experience_in_years: f64,
        proficiency: impl Into<String>,
    ) -> Self {
        Self {
            skill_name: skill_name.into(),
            experience_in_years,
            proficiency: proficiency.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// `None` until the service has persisted the record.
    pub id: Option<EmployeeId>,
    pub full_name: String,
    pub contact_preference: ContactPreference,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Employee {
    pub fn active_contact(&self) -> Option<&str> {
        match self.contact_preference {
            ContactPreference::Email => Some(self.email.as_str()).filter(|v| !v.is_empty()),
            ContactPreference::Phone => self.phone.as_deref().filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_serializes_with_camel_case_keys() {
        let employee = Employee {
            id: None,
            full_name: "Ann".into(),
            contact_preference: ContactPreference::Email,
            email: "ann@gmail.com".into(),
            phone: None,
            skills: vec![Skill::new("SQL", 3.0, "intermediate")],
        };

        let value = serde_json::to_value(&employee).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": null,
                "fullName": "Ann",
                "contactPreference": "email",
                "email": "ann@gmail.com",
                "phone": null,
                "skills": [
                    {"skillName": "SQL", "experienceInYears": 3.0, "proficiency": "intermediate"}
                ]
            })
        );
    }

    #[test]
    fn employee_without_skills_key_deserializes_to_empty_list() {
        let employee: Employee = serde_json::from_str(
            r#"{"id": 4, "fullName": "Bo", "contactPreference": "phone", "email": "", "phone": "555"}"#,
        )
        .expect("deserialize");
        assert_eq!(employee.id, Some(EmployeeId(4)));
        assert!(employee.skills.is_empty());
        assert_eq!(employee.active_contact(), Some("555"));
    }

    #[test]
    fn fractional_experience_does_not_reject_the_whole_list() {
        let employees: Vec<Employee> = serde_json::from_str(
            r#"[
                {"id": 1, "fullName": "Ann", "contactPreference": "email", "email": "ann@gmail.com", "phone": null,
                 "skills": [{"skillName": "SQL", "experienceInYears": 3, "proficiency": "intermediate"}]},
                {"id": 2, "fullName": "Bo", "contactPreference": "phone", "email": "", "phone": "555",
                 "skills": [{"skillName": "Go", "experienceInYears": 2.5, "proficiency": "beginner"}]}
            ]"#,
        )
        .expect("deserialize");
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].skills[0].experience_in_years, 3.0);
        assert_eq!(employees[1].skills[0].experience_in_years, 2.5);
    }

    #[test]
    fn any_selection_other_than_phone_means_email() {
        assert_eq!(ContactPreference::from_selection("phone"), ContactPreference::Phone);
        assert_eq!(ContactPreference::from_selection(" Phone "), ContactPreference::Phone);
        assert_eq!(ContactPreference::from_selection("email"), ContactPreference::Email);
        assert_eq!(ContactPreference::from_selection("fax"), ContactPreference::Email);
        assert_eq!(ContactPreference::from_selection(""), ContactPreference::Email);
    }
}
