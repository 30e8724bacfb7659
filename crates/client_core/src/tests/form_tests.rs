use super::*;
use shared::domain::ContactPreference;

fn contact_form() -> Form {
    let root = GroupControl::new()
        .with_field(
            "name",
            FieldControl::new("", vec![Validator::Required, Validator::MinLength(2)]),
        )
        .with_control(
            "emails",
            Control::Group(
                GroupControl::new()
                    .with_field(
                        "email",
                        FieldControl::new("", vec![Validator::RequiredFor(ContactPreference::Email)]),
                    )
                    .with_field("confirm", FieldControl::new("", Vec::new()))
                    .with_validator(GroupValidator::FieldsMatch {
                        field: "email".into(),
                        confirmation: "confirm".into(),
                    }),
            ),
        )
        .with_control(
            "tags",
            Control::List(ListControl::new(vec![tag("")])),
        );
    Form::new(root, ValidationContext::default())
}

fn tag(value: &str) -> Control {
    Control::Group(
        GroupControl::new().with_field("label", FieldControl::new(value, vec![Validator::Required])),
    )
}

fn catalog() -> MessageCatalog {
    MessageCatalog::new()
        .with("name", ErrorKey::Required, "Name is required.")
        .with("name", ErrorKey::MinLength, "Name is too short.")
        .with("emails", ErrorKey::Mismatch, "Emails differ.")
        .with("label", ErrorKey::Required, "Label is required.")
}

#[test]
fn control_paths_parse_and_render() {
    let path = ControlPath::parse("tags.3.label");
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("tags".into()),
            PathSegment::Index(3),
            PathSegment::Key("label".into()),
        ]
    );
    assert_eq!(path.to_string(), "tags.3.label");
    assert_eq!(path.name(), Some("label"));
    assert_eq!(path.parent().map(|p| p.to_string()), Some("tags.3".to_string()));
    assert!(ControlPath::parse("").is_root());
}

#[test]
fn new_form_is_invalid_but_shows_nothing_until_interaction() {
    let form = contact_form();
    assert!(!form.is_valid());
    assert!(form.project_errors(&catalog(), ProjectionMode::Interacted).is_empty());

    let always = form.project_errors(&catalog(), ProjectionMode::Always);
    assert_eq!(always.get("name"), Some("Name is required."));
    assert_eq!(always.get("tags.0.label"), Some("Label is required."));
}

#[test]
fn edits_mark_dirty_and_surface_messages() {
    let mut form = contact_form();
    assert!(form.set_value(&"name".into(), "A"));

    let errors = form.project_errors(&catalog(), ProjectionMode::Interacted);
    assert_eq!(errors.get("name"), Some("Name is too short."));
    assert!(form.get(&"name".into()).expect("name").is_dirty());
    assert!(!form.set_value(&"emails".into(), "not a field"));
}

#[test]
fn touch_alone_reveals_required_message() {
    let mut form = contact_form();
    form.touch(&"name".into());
    let errors = form.project_errors(&catalog(), ProjectionMode::Interacted);
    assert_eq!(errors.get("name"), Some("Name is required."));
}

#[test]
fn filled_mode_reveals_prefilled_invalid_values() {
    let mut form = contact_form();
    form.patch_value(&"name".into(), "A");
    form.revalidate_all();

    assert!(form
        .project_errors(&catalog(), ProjectionMode::Interacted)
        .get("name")
        .is_none());
    assert_eq!(
        form.project_errors(&catalog(), ProjectionMode::InteractedOrFilled)
            .get("name"),
        Some("Name is too short.")
    );
}

#[test]
fn group_validator_reruns_when_either_field_changes() {
    let mut form = contact_form();
    form.set_value(&"emails.email".into(), "a@x.io");
    assert!(form.get(&"emails".into()).expect("group").own_errors().is_empty());

    form.set_value(&"emails.confirm".into(), "b@x.io");
    assert!(form
        .get(&"emails".into())
        .expect("group")
        .own_errors()
        .contains(&ErrorKey::Mismatch));

    form.set_value(&"emails.email".into(), "b@x.io");
    assert!(form.get(&"emails".into()).expect("group").own_errors().is_empty());
}

#[test]
fn context_change_takes_effect_on_revalidation() {
    let mut form = contact_form();
    let email = ControlPath::parse("emails.email");
    assert!(!form.get(&email).expect("email").is_valid());

    form.set_context(ValidationContext {
        contact_preference: ContactPreference::Phone,
    });
    form.revalidate(std::slice::from_ref(&email));
    assert!(form.get(&email).expect("email").is_valid());
}

#[test]
fn list_push_and_remove() {
    let mut form = contact_form();
    let tags = ControlPath::parse("tags");

    assert_eq!(form.push_item(&tags, tag("rust")), Some(1));
    assert_eq!(form.list_len(&tags), Some(2));
    assert!(form.get(&"tags.1".into()).expect("item").is_valid());
    assert!(!form.get(&tags).expect("list").is_dirty());

    assert!(form.remove_item(&tags, 5).is_none());
    assert!(form.remove_item(&tags, 0).is_some());
    assert_eq!(form.list_len(&tags), Some(1));
    assert_eq!(form.value(&"tags.0.label".into()), Some("rust"));

    let list = form.get(&tags).expect("list");
    assert!(list.is_dirty());
    assert!(list.is_touched());
}

#[test]
fn mark_all_touched_reaches_list_items() {
    let mut form = contact_form();
    form.mark_all_touched();
    let errors = form.project_errors(&catalog(), ProjectionMode::Interacted);
    assert_eq!(errors.get("tags.0.label"), Some("Label is required."));
    assert_eq!(errors.get("name"), Some("Name is required."));
}

#[test]
fn missing_catalog_entry_falls_back_to_key_name() {
    let mut form = contact_form();
    form.touch(&"emails.email".into());
    let errors = form.project_errors(&catalog(), ProjectionMode::Interacted);
    assert_eq!(errors.get("email"), Some("email is invalid (required)."));
}
