//! Form model: a tree of scalar fields, named groups and ordered lists.
//!
//! The tree keeps per-control interaction flags (`dirty` after a user edit,
//! `touched` after focus loss) and the error keys produced by the most
//! recent validation pass. Validation never fails; invalid input is just
//! data that [`Form::project_errors`] turns into display strings.

pub mod validators;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use tracing::debug;

pub use validators::{ErrorKey, ErrorSet, GroupValidator, ValidationContext, Validator};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Dotted address of a control, e.g. `emailGroup.email` or
/// `skills.0.skillName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ControlPath(Vec<PathSegment>);

impl ControlPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| match segment.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(segment.to_string()),
                })
                .collect(),
        )
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Name of the addressed control; `None` for list items and the root.
    pub fn name(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(key)) => Some(key.as_str()),
            _ => None,
        }
    }

    fn crosses_list(&self) -> bool {
        self.0
            .iter()
            .any(|segment| matches!(segment, PathSegment::Index(_)))
    }
}

impl fmt::Display for ControlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for ControlPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interaction {
    pub dirty: bool,
    pub touched: bool,
}

#[derive(Debug, Clone)]
pub struct FieldControl {
    value: String,
    validators: Vec<Validator>,
    interaction: Interaction,
    errors: ErrorSet,
}

impl FieldControl {
    pub fn new(value: impl Into<String>, validators: Vec<Validator>) -> Self {
        Self {
            value: value.into(),
            validators,
            interaction: Interaction::default(),
            errors: ErrorSet::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    fn validate(&mut self, ctx: &ValidationContext) {
        self.errors = validators::run_validators(&self.validators, &self.value, ctx);
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupControl {
    children: Vec<(String, Control)>,
    validators: Vec<GroupValidator>,
    errors: ErrorSet,
}

impl GroupControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(self, name: impl Into<String>, field: FieldControl) -> Self {
        self.with_control(name, Control::Field(field))
    }

    pub fn with_control(mut self, name: impl Into<String>, control: Control) -> Self {
        self.children.push((name.into(), control));
        self
    }

    pub fn with_validator(mut self, validator: GroupValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, control)| control)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.children
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, control)| control)
    }

    pub fn field(&self, name: &str) -> Option<&FieldControl> {
        match self.get(name)? {
            Control::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.children
            .iter()
            .map(|(name, control)| (name.as_str(), control))
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    fn validate_own(&mut self) {
        let errors: ErrorSet = self
            .validators
            .iter()
            .filter_map(|validator| validator.check(self))
            .collect();
        self.errors = errors;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListControl {
    items: Vec<Control>,
    interaction: Interaction,
}

impl ListControl {
    pub fn new(items: Vec<Control>) -> Self {
        Self {
            items,
            interaction: Interaction::default(),
        }
    }

    pub fn items(&self) -> &[Control] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }
}

#[derive(Debug, Clone)]
pub enum Control {
    Field(FieldControl),
    Group(GroupControl),
    List(ListControl),
}

static NO_ERRORS: ErrorSet = ErrorSet::new();

impl Control {
    pub fn get(&self, path: &ControlPath) -> Option<&Control> {
        path.segments()
            .iter()
            .try_fold(self, |control, segment| match (control, segment) {
                (Control::Group(group), PathSegment::Key(key)) => group.get(key),
                (Control::List(list), PathSegment::Index(index)) => list.items.get(*index),
                _ => None,
            })
    }

    pub fn get_mut(&mut self, path: &ControlPath) -> Option<&mut Control> {
        let mut control = self;
        for segment in path.segments() {
            control = match (control, segment) {
                (Control::Group(group), PathSegment::Key(key)) => group.get_mut(key)?,
                (Control::List(list), PathSegment::Index(index)) => list.items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(control)
    }

    /// Errors attached to this control itself, excluding descendants.
    pub fn own_errors(&self) -> &ErrorSet {
        match self {
            Control::Field(field) => &field.errors,
            Control::Group(group) => &group.errors,
            Control::List(_) => &NO_ERRORS,
        }
    }

    pub fn is_valid(&self) -> bool {
        if !self.own_errors().is_empty() {
            return false;
        }
        match self {
            Control::Field(_) => true,
            Control::Group(group) => group.children.iter().all(|(_, child)| child.is_valid()),
            Control::List(list) => list.items.iter().all(Control::is_valid),
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            Control::Field(field) => field.interaction.dirty,
            Control::Group(group) => group.children.iter().any(|(_, child)| child.is_dirty()),
            Control::List(list) => {
                list.interaction.dirty || list.items.iter().any(Control::is_dirty)
            }
        }
    }

    pub fn is_touched(&self) -> bool {
        match self {
            Control::Field(field) => field.interaction.touched,
            Control::Group(group) => group.children.iter().any(|(_, child)| child.is_touched()),
            Control::List(list) => {
                list.interaction.touched || list.items.iter().any(Control::is_touched)
            }
        }
    }

    /// Only an empty or whitespace-only scalar counts as blank; groups and
    /// lists never do.
    pub fn is_blank(&self) -> bool {
        matches!(self, Control::Field(field) if field.value.trim().is_empty())
    }

    fn validate_all(&mut self, ctx: &ValidationContext) {
        match self {
            Control::Field(field) => field.validate(ctx),
            Control::Group(group) => {
                for (_, child) in &mut group.children {
                    child.validate_all(ctx);
                }
                group.validate_own();
            }
            Control::List(list) => {
                for item in &mut list.items {
                    item.validate_all(ctx);
                }
            }
        }
    }

    fn mark_all_touched(&mut self) {
        match self {
            Control::Field(field) => field.interaction.touched = true,
            Control::Group(group) => {
                for (_, child) in &mut group.children {
                    child.mark_all_touched();
                }
            }
            Control::List(list) => {
                list.interaction.touched = true;
                for item in &mut list.items {
                    item.mark_all_touched();
                }
            }
        }
    }
}

/// When a control's messages become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// After the user touched or edited the control.
    Interacted,
    /// As above, or whenever the control already holds a value.
    InteractedOrFilled,
    /// Regardless of interaction.
    Always,
}

impl ProjectionMode {
    fn reveals(self, control: &Control) -> bool {
        match self {
            Self::Interacted => control.is_touched() || control.is_dirty(),
            Self::InteractedOrFilled => {
                control.is_touched() || control.is_dirty() || !control.is_blank()
            }
            Self::Always => true,
        }
    }
}

/// Display strings keyed by control name, or by dotted path inside lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, message)| (key.as_str(), message.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
        }
        Ok(())
    }
}

/// Human-readable text per (control name, error key).
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<(String, ErrorKey), String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, key: ErrorKey, message: impl Into<String>) -> Self {
        self.messages.insert((name.to_string(), key), message.into());
        self
    }

    pub fn lookup(&self, name: &str, key: ErrorKey) -> Option<&str> {
        self.messages
            .get(&(name.to_string(), key))
            .map(String::as_str)
    }

    fn render(&self, name: &str, errors: &ErrorSet) -> String {
        errors
            .iter()
            .map(|key| match self.lookup(name, *key) {
                Some(message) => message.to_string(),
                None => format!("{name} is invalid ({}).", key.as_str()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A control tree rooted at a group, plus the context its validators read.
#[derive(Debug, Clone)]
pub struct Form {
    root: Control,
    context: ValidationContext,
}

impl Form {
    pub fn new(root: GroupControl, context: ValidationContext) -> Self {
        let mut form = Self {
            root: Control::Group(root),
            context,
        };
        form.revalidate_all();
        form
    }

    pub fn root(&self) -> &Control {
        &self.root
    }

    pub fn context(&self) -> ValidationContext {
        self.context
    }

    pub fn set_context(&mut self, context: ValidationContext) {
        self.context = context;
    }

    pub fn get(&self, path: &ControlPath) -> Option<&Control> {
        self.root.get(path)
    }

    pub fn value(&self, path: &ControlPath) -> Option<&str> {
        match self.get(path)? {
            Control::Field(field) => Some(field.value()),
            _ => None,
        }
    }

    pub fn list_len(&self, path: &ControlPath) -> Option<usize> {
        match self.get(path)? {
            Control::List(list) => Some(list.len()),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.root.is_valid()
    }

    /// User edit: stores the value, marks the field dirty and revalidates.
    /// Returns `false` when `path` does not address a field.
    pub fn set_value(&mut self, path: &ControlPath, value: impl Into<String>) -> bool {
        let Some(Control::Field(field)) = self.root.get_mut(path) else {
            return false;
        };
        field.value = value.into();
        field.interaction.dirty = true;
        self.revalidate(std::slice::from_ref(path));
        true
    }

    /// Programmatic fill: stores the value without touching interaction
    /// flags. Callers revalidate once they finished patching.
    pub fn patch_value(&mut self, path: &ControlPath, value: impl Into<String>) -> bool {
        let Some(Control::Field(field)) = self.root.get_mut(path) else {
            return false;
        };
        field.value = value.into();
        true
    }

    /// Focus loss.
    pub fn touch(&mut self, path: &ControlPath) -> bool {
        match self.root.get_mut(path) {
            Some(Control::Field(field)) => field.interaction.touched = true,
            Some(Control::List(list)) => list.interaction.touched = true,
            _ => return false,
        }
        true
    }

    pub fn mark_all_touched(&mut self) {
        self.root.mark_all_touched();
    }

    pub fn push_item(&mut self, list_path: &ControlPath, item: Control) -> Option<usize> {
        let Some(Control::List(list)) = self.root.get_mut(list_path) else {
            return None;
        };
        list.items.push(item);
        let index = list.items.len() - 1;
        self.revalidate(&[list_path.index(index)]);
        Some(index)
    }

    /// Removes an item and marks the list dirty and touched.
    pub fn remove_item(&mut self, list_path: &ControlPath, index: usize) -> Option<Control> {
        let Some(Control::List(list)) = self.root.get_mut(list_path) else {
            return None;
        };
        if index >= list.items.len() {
            return None;
        }
        let removed = list.items.remove(index);
        list.interaction.dirty = true;
        list.interaction.touched = true;
        self.revalidate(std::slice::from_ref(list_path));
        Some(removed)
    }

    /// Swaps the control at `path` for a new one and validates it.
    pub fn replace(&mut self, path: &ControlPath, control: Control) -> bool {
        let Some(slot) = self.root.get_mut(path) else {
            return false;
        };
        *slot = control;
        self.revalidate(std::slice::from_ref(path));
        true
    }

    /// Re-runs validators on each path's subtree and the group validators
    /// of every ancestor.
    pub fn revalidate(&mut self, paths: &[ControlPath]) {
        let ctx = self.context;
        let mut ancestors: Vec<ControlPath> = Vec::new();
        for path in paths {
            if let Some(control) = self.root.get_mut(path) {
                control.validate_all(&ctx);
            }
            let mut cursor = path.parent();
            while let Some(parent) = cursor {
                cursor = parent.parent();
                if !ancestors.contains(&parent) {
                    ancestors.push(parent);
                }
            }
        }
        // Deepest groups first so outer validators see settled children.
        ancestors.sort_by_key(|path| std::cmp::Reverse(path.segments().len()));
        for path in &ancestors {
            if let Some(Control::Group(group)) = self.root.get_mut(path) {
                group.validate_own();
            }
        }
        let changed: Vec<String> = paths.iter().map(ToString::to_string).collect();
        debug!(paths = %changed.join(","), valid = self.root.is_valid(), "revalidated form");
    }

    pub fn revalidate_all(&mut self) {
        let ctx = self.context;
        self.root.validate_all(&ctx);
    }

    /// Walks the tree and renders messages for every invalid control that
    /// `mode` reveals.
    pub fn project_errors(&self, catalog: &MessageCatalog, mode: ProjectionMode) -> FormErrors {
        let mut out = BTreeMap::new();
        if let Control::Group(group) = &self.root {
            project_group(group, &ControlPath::root(), catalog, mode, &mut out);
        }
        FormErrors(out)
    }
}

fn project_group(
    group: &GroupControl,
    path: &ControlPath,
    catalog: &MessageCatalog,
    mode: ProjectionMode,
    out: &mut BTreeMap<String, String>,
) {
    for (name, child) in group.children() {
        project_control(child, &path.key(name), catalog, mode, out);
    }
}

fn project_control(
    control: &Control,
    path: &ControlPath,
    catalog: &MessageCatalog,
    mode: ProjectionMode,
    out: &mut BTreeMap<String, String>,
) {
    if let Some(name) = path.name() {
        let errors = control.own_errors();
        if !errors.is_empty() && !control.is_valid() && mode.reveals(control) {
            let key = if path.crosses_list() {
                path.to_string()
            } else {
                name.to_string()
            };
            out.insert(key, catalog.render(name, errors));
        }
    }
    match control {
        Control::Field(_) => {}
        Control::Group(group) => project_group(group, path, catalog, mode, out),
        Control::List(list) => {
            for (index, item) in list.items().iter().enumerate() {
                project_control(item, &path.index(index), catalog, mode, out);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/form_tests.rs"]
mod tests;
