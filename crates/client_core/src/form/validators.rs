//! Field and group validators.
//!
//! Every check is a pure function of the control's current value, its
//! interaction flags and the [`ValidationContext`]. Conditional
//! required-ness is expressed as [`Validator::RequiredFor`] rather than by
//! swapping validator sets at runtime.

use std::collections::BTreeSet;

use shared::domain::ContactPreference;

use super::GroupControl;

/// Names the rule a control currently violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Required,
    MinLength,
    MaxLength,
    EmailDomain,
    Number,
    Mismatch,
}

impl ErrorKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
            Self::EmailDomain => "emailDomain",
            Self::Number => "number",
            Self::Mismatch => "mismatch",
        }
    }
}

pub type ErrorSet = BTreeSet<ErrorKey>;

/// Form-wide inputs that validators may depend on besides their own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationContext {
    pub contact_preference: ContactPreference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    Required,
    /// Required only while the given contact channel is the active one.
    RequiredFor(ContactPreference),
    MinLength(usize),
    MaxLength(usize),
    EmailDomain(String),
    NonNegativeNumber,
}

impl Validator {
    /// Surrounding whitespace is ignored by every check.
    pub fn check(&self, value: &str, ctx: &ValidationContext) -> Option<ErrorKey> {
        let value = value.trim();
        match self {
            Self::Required => is_blank(value).then_some(ErrorKey::Required),
            Self::RequiredFor(channel) => {
                (ctx.contact_preference == *channel && is_blank(value)).then_some(ErrorKey::Required)
            }
            Self::MinLength(min) => {
                let len = value.chars().count();
                (len > 0 && len < *min).then_some(ErrorKey::MinLength)
            }
            Self::MaxLength(max) => (value.chars().count() > *max).then_some(ErrorKey::MaxLength),
            Self::EmailDomain(domain) => {
                (!email_domain_matches(value, domain)).then_some(ErrorKey::EmailDomain)
            }
            Self::NonNegativeNumber => {
                (!value.is_empty() && parse_non_negative(value).is_none()).then_some(ErrorKey::Number)
            }
        }
    }
}

pub fn run_validators(validators: &[Validator], value: &str, ctx: &ValidationContext) -> ErrorSet {
    validators
        .iter()
        .filter_map(|validator| validator.check(value, ctx))
        .collect()
}

/// Compares the part after the last `@` with `domain`, ignoring ASCII case.
/// An empty email passes so that only the required check reports it.
pub fn email_domain_matches(email: &str, domain: &str) -> bool {
    if email.is_empty() {
        return true;
    }
    let host = email.rsplit_once('@').map_or(email, |(_, host)| host);
    host.eq_ignore_ascii_case(domain)
}

/// A confirmation that is still pristine and empty never mismatches.
pub fn confirmation_matches(value: &str, confirmation: &str, confirmation_pristine: bool) -> bool {
    let (value, confirmation) = (value.trim(), confirmation.trim());
    value == confirmation || (confirmation_pristine && confirmation.is_empty())
}

/// Parses a finite number that is zero or greater.
pub fn parse_non_negative(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite() && *number >= 0.0)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidator {
    /// Two sibling fields must hold the same value.
    FieldsMatch { field: String, confirmation: String },
}

impl GroupValidator {
    pub fn check(&self, group: &GroupControl) -> Option<ErrorKey> {
        match self {
            Self::FieldsMatch {
                field,
                confirmation,
            } => {
                let (Some(field), Some(confirmation)) =
                    (group.field(field), group.field(confirmation))
                else {
                    return None;
                };
                let pristine = !confirmation.interaction().dirty;
                (!confirmation_matches(field.value(), confirmation.value(), pristine))
                    .then_some(ErrorKey::Mismatch)
            }
        }
    }
}
