//! The employee create/edit form.
//!
//! Wraps a generic [`Form`] with the employee shape, the contact-preference
//! coupling and the message catalog. Every public mutator is one discrete
//! user action: it updates the tree, revalidates what depends on the change
//! and re-projects the per-field messages.

use shared::domain::{ContactPreference, Employee, EmployeeId, Skill};
use tracing::{debug, warn};

use crate::form::{
    validators::parse_non_negative, Control, ControlPath, ErrorKey, FieldControl, Form,
    FormErrors, GroupControl, GroupValidator, ListControl, MessageCatalog, ProjectionMode,
    ValidationContext, Validator,
};

pub const DEFAULT_EMAIL_DOMAIN: &str = "gmail.com";

pub const FULL_NAME: &str = "fullName";
pub const CONTACT_PREFERENCE: &str = "contactPreference";
pub const EMAIL_GROUP: &str = "emailGroup";
pub const EMAIL: &str = "email";
pub const CONFIRM_EMAIL: &str = "confirmEmail";
pub const PHONE: &str = "phone";
pub const SKILLS: &str = "skills";

const FULL_NAME_MIN: usize = 2;
const FULL_NAME_MAX: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillField {
    Name,
    Experience,
    Proficiency,
}

impl SkillField {
    pub const ALL: [SkillField; 3] = [Self::Name, Self::Experience, Self::Proficiency];

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "skillName",
            Self::Experience => "experienceInYears",
            Self::Proficiency => "proficiency",
        }
    }
}

/// Create forms only reveal messages after interaction; edit forms also
/// reveal them for pre-filled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    fn projection(self) -> ProjectionMode {
        match self {
            Self::Create => ProjectionMode::Interacted,
            Self::Edit => ProjectionMode::InteractedOrFilled,
        }
    }
}

pub fn email_path() -> ControlPath {
    ControlPath::root().key(EMAIL_GROUP).key(EMAIL)
}

pub fn confirm_email_path() -> ControlPath {
    ControlPath::root().key(EMAIL_GROUP).key(CONFIRM_EMAIL)
}

pub fn skill_path(index: usize, field: SkillField) -> ControlPath {
    ControlPath::root().key(SKILLS).index(index).key(field.key())
}

#[derive(Debug, Clone)]
pub struct EmployeeForm {
    form: Form,
    catalog: MessageCatalog,
    mode: FormMode,
    errors: FormErrors,
}

impl EmployeeForm {
    /// Empty form with one blank skill entry.
    pub fn new(mode: FormMode, email_domain: &str) -> Self {
        let root = GroupControl::new()
            .with_field(
                FULL_NAME,
                FieldControl::new(
                    "",
                    vec![
                        Validator::Required,
                        Validator::MinLength(FULL_NAME_MIN),
                        Validator::MaxLength(FULL_NAME_MAX),
                    ],
                ),
            )
            .with_field(
                CONTACT_PREFERENCE,
                FieldControl::new(ContactPreference::Email.as_str(), Vec::new()),
            )
            .with_control(
                EMAIL_GROUP,
                Control::Group(
                    GroupControl::new()
                        .with_field(
                            EMAIL,
                            FieldControl::new(
                                "",
                                vec![
                                    Validator::RequiredFor(ContactPreference::Email),
                                    Validator::EmailDomain(email_domain.to_string()),
                                ],
                            ),
                        )
                        .with_field(
                            CONFIRM_EMAIL,
                            FieldControl::new(
                                "",
                                vec![Validator::RequiredFor(ContactPreference::Email)],
                            ),
                        )
                        .with_validator(GroupValidator::FieldsMatch {
                            field: EMAIL.into(),
                            confirmation: CONFIRM_EMAIL.into(),
                        }),
                ),
            )
            .with_field(
                PHONE,
                FieldControl::new("", vec![Validator::RequiredFor(ContactPreference::Phone)]),
            )
            .with_control(SKILLS, Control::List(ListControl::new(vec![skill_group(None)])));

        let form = Form::new(
            root,
            ValidationContext {
                contact_preference: ContactPreference::Email,
            },
        );
        let mut employee_form = Self {
            form,
            catalog: message_catalog(email_domain),
            mode,
            errors: FormErrors::default(),
        };
        employee_form.refresh();
        employee_form
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key)
    }

    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    pub fn value(&self, path: &ControlPath) -> Option<&str> {
        self.form.value(path)
    }

    pub fn contact_preference(&self) -> ContactPreference {
        self.form.context().contact_preference
    }

    pub fn skill_count(&self) -> usize {
        self.form.list_len(&skills_path()).unwrap_or_default()
    }

    /// Generic edit entry point. Routes the contact-preference field through
    /// [`Self::set_contact_preference`] so the coupling always applies.
    pub fn set_value(&mut self, path: &ControlPath, value: impl Into<String>) -> bool {
        let value = value.into();
        if *path == ControlPath::root().key(CONTACT_PREFERENCE) {
            self.set_contact_preference(ContactPreference::from_selection(&value));
            return true;
        }
        let changed = self.form.set_value(path, value);
        if changed {
            self.refresh();
        }
        changed
    }

    pub fn set_full_name(&mut self, value: impl Into<String>) {
        self.set_value(&ControlPath::root().key(FULL_NAME), value);
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.set_value(&email_path(), value);
    }

    pub fn set_confirm_email(&mut self, value: impl Into<String>) {
        self.set_value(&confirm_email_path(), value);
    }

    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.set_value(&ControlPath::root().key(PHONE), value);
    }

    pub fn set_skill_field(&mut self, index: usize, field: SkillField, value: impl Into<String>) -> bool {
        self.set_value(&skill_path(index, field), value)
    }

    pub fn touch(&mut self, path: &ControlPath) -> bool {
        let touched = self.form.touch(path);
        if touched {
            self.refresh();
        }
        touched
    }

    pub fn mark_all_touched(&mut self) {
        self.form.mark_all_touched();
        self.refresh();
    }

    /// Switches the authoritative channel and revalidates the three contact
    /// fields against it.
    pub fn set_contact_preference(&mut self, preference: ContactPreference) {
        let path = ControlPath::root().key(CONTACT_PREFERENCE);
        self.form.set_value(&path, preference.as_str());
        self.form.set_context(ValidationContext {
            contact_preference: preference,
        });
        self.form.revalidate(&contact_fields());
        debug!(preference = %preference, "contact preference changed");
        self.refresh();
    }

    pub fn add_skill(&mut self) -> usize {
        let index = self
            .form
            .push_item(&skills_path(), skill_group(None))
            .unwrap_or_default();
        self.refresh();
        index
    }

    /// Removes the skill at `index`. Returns `false` (and changes nothing)
    /// when there is no such entry.
    pub fn remove_skill(&mut self, index: usize) -> bool {
        if self.form.remove_item(&skills_path(), index).is_none() {
            warn!(index, skills = self.skill_count(), "ignored removal of missing skill");
            return false;
        }
        self.refresh();
        true
    }

    /// Loads a stored record: scalars are patched without marking anything
    /// dirty, the confirmation mirrors the stored email, and the skills list
    /// is replaced wholesale.
    pub fn populate(&mut self, employee: &Employee) {
        let preference = employee.contact_preference;
        self.form
            .patch_value(&ControlPath::root().key(FULL_NAME), employee.full_name.clone());
        self.form.patch_value(
            &ControlPath::root().key(CONTACT_PREFERENCE),
            preference.as_str(),
        );
        self.form.patch_value(&email_path(), employee.email.clone());
        self.form
            .patch_value(&confirm_email_path(), employee.email.clone());
        self.form.patch_value(
            &ControlPath::root().key(PHONE),
            employee.phone.clone().unwrap_or_default(),
        );
        self.form.set_context(ValidationContext {
            contact_preference: preference,
        });

        let skills = employee
            .skills
            .iter()
            .map(|skill| skill_group(Some(skill)))
            .collect();
        self.form
            .replace(&skills_path(), Control::List(ListControl::new(skills)));
        self.form.revalidate_all();
        self.refresh();
    }

    /// Maps the form onto the flat employee shape with every value trimmed.
    /// An invalid form is refused with every current message, interaction
    /// or not.
    pub fn to_employee(&self, id: Option<EmployeeId>) -> Result<Employee, FormErrors> {
        if !self.form.is_valid() {
            return Err(self.form.project_errors(&self.catalog, ProjectionMode::Always));
        }

        let text = |path: &ControlPath| self.form.value(path).unwrap_or_default().trim().to_string();

        let mut skills = Vec::with_capacity(self.skill_count());
        for index in 0..self.skill_count() {
            let years = text(&skill_path(index, SkillField::Experience));
            let Some(experience_in_years) = parse_non_negative(&years) else {
                return Err(self.form.project_errors(&self.catalog, ProjectionMode::Always));
            };
            skills.push(Skill {
                skill_name: text(&skill_path(index, SkillField::Name)),
                experience_in_years,
                proficiency: text(&skill_path(index, SkillField::Proficiency)),
            });
        }

        let phone = text(&ControlPath::root().key(PHONE));
        Ok(Employee {
            id,
            full_name: text(&ControlPath::root().key(FULL_NAME)),
            contact_preference: self.contact_preference(),
            email: text(&email_path()),
            phone: (!phone.is_empty()).then_some(phone),
            skills,
        })
    }

    fn refresh(&mut self) {
        self.errors = self
            .form
            .project_errors(&self.catalog, self.mode.projection());
    }
}

fn skills_path() -> ControlPath {
    ControlPath::root().key(SKILLS)
}

fn contact_fields() -> [ControlPath; 3] {
    [
        email_path(),
        confirm_email_path(),
        ControlPath::root().key(PHONE),
    ]
}

fn skill_group(skill: Option<&Skill>) -> Control {
    let (name, years, proficiency) = match skill {
        Some(skill) => (
            skill.skill_name.clone(),
            skill.experience_in_years.to_string(),
            skill.proficiency.clone(),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    Control::Group(
        GroupControl::new()
            .with_field(
                SkillField::Name.key(),
                FieldControl::new(name, vec![Validator::Required]),
            )
            .with_field(
                SkillField::Experience.key(),
                FieldControl::new(years, vec![Validator::Required, Validator::NonNegativeNumber]),
            )
            .with_field(
                SkillField::Proficiency.key(),
                FieldControl::new(proficiency, vec![Validator::Required]),
            ),
    )
}

fn message_catalog(email_domain: &str) -> MessageCatalog {
    MessageCatalog::new()
        .with(FULL_NAME, ErrorKey::Required, "Full Name is required.")
        .with(
            FULL_NAME,
            ErrorKey::MinLength,
            format!("Full Name must be greater than {FULL_NAME_MIN} characters."),
        )
        .with(
            FULL_NAME,
            ErrorKey::MaxLength,
            format!("Full Name must be less than {FULL_NAME_MAX} characters."),
        )
        .with(EMAIL, ErrorKey::Required, "Email is required.")
        .with(
            EMAIL,
            ErrorKey::EmailDomain,
            format!("Email domain should be {email_domain}"),
        )
        .with(CONFIRM_EMAIL, ErrorKey::Required, "Confirm Email is required.")
        .with(
            EMAIL_GROUP,
            ErrorKey::Mismatch,
            "Email and Confirm Email do not match.",
        )
        .with(PHONE, ErrorKey::Required, "Phone is required.")
        .with(
            SkillField::Name.key(),
            ErrorKey::Required,
            "Skill Name is required.",
        )
        .with(
            SkillField::Experience.key(),
            ErrorKey::Required,
            "Experience is required.",
        )
        .with(
            SkillField::Experience.key(),
            ErrorKey::Number,
            "Experience must be a number of years, zero or more.",
        )
        .with(
            SkillField::Proficiency.key(),
            ErrorKey::Required,
            "Proficiency is required.",
        )
}

#[cfg(test)]
#[path = "tests/employee_form_tests.rs"]
mod tests;
