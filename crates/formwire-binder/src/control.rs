//! In-memory model of a form: groups of attributes wrapping named controls.

use formwire_protocol::Problem;
use std::collections::BTreeMap;

/// Attribute marking a control's value type (`boolean`).
pub(crate) const TYPE_ATTRIBUTE: &str = "data-type";
/// Attribute overriding inclusion (`never` or `always`).
pub(crate) const INCLUDE_ATTRIBUTE: &str = "data-include";
/// Attribute naming a registered extractor.
pub(crate) const EXTRACTOR_ATTRIBUTE: &str = "data-extractor";
/// Attribute naming a registered mutator.
pub(crate) const MUTATOR_ATTRIBUTE: &str = "data-mutator";

/// Element attributes keyed by name.
pub type Attributes = BTreeMap<String, String>;

/// Kind of bindable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Single-line text-like input (text, email, number, date, hidden, ...).
    Text,
    /// Multi-line text.
    TextArea,
    /// Single-choice select.
    Select,
    /// Radio button; one of a group sharing a name.
    Radio,
    /// Checkbox.
    Checkbox,
}

impl ControlKind {
    /// Map an HTML input `type` attribute to a control kind.
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type.trim().to_ascii_lowercase().as_str() {
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            _ => Self::Text,
        }
    }
}

/// Declared value type of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Boolean,
}

/// Explicit inclusion override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Included unless an ancestor is ignored.
    Auto,
    /// Never extracted.
    Never,
    /// Always extracted, even under ignored ancestors.
    Always,
}

/// A bindable form control.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// Dotted/bracket path naming the bound field.
    pub name: Option<String>,
    pub kind: ControlKind,
    /// Current value as entered by the user.
    pub value: String,
    /// Checked state for radios and checkboxes.
    pub checked: bool,
    pub attributes: Attributes,
    /// Field problems placed on this control.
    pub problems: Vec<Problem>,
}

impl Control {
    /// Create a named control of the given kind with an empty value.
    pub fn new(kind: ControlKind, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind,
            value: String::new(),
            checked: false,
            attributes: Attributes::new(),
            problems: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ControlKind::Text, name).with_value(value)
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self::new(ControlKind::Checkbox, name).with_checked(checked)
    }

    pub fn radio(name: impl Into<String>, value: impl Into<String>, checked: bool) -> Self {
        Self::new(ControlKind::Radio, name)
            .with_value(value)
            .with_checked(checked)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark the control as boolean-typed.
    pub fn boolean(self) -> Self {
        self.with_attribute(TYPE_ATTRIBUTE, "boolean")
    }

    pub fn with_inclusion(self, inclusion: Inclusion) -> Self {
        match inclusion {
            Inclusion::Auto => self,
            Inclusion::Never => self.with_attribute(INCLUDE_ATTRIBUTE, "never"),
            Inclusion::Always => self.with_attribute(INCLUDE_ATTRIBUTE, "always"),
        }
    }

    pub fn with_extractor(self, name: impl Into<String>) -> Self {
        self.with_attribute(EXTRACTOR_ATTRIBUTE, name)
    }

    pub fn with_mutator(self, name: impl Into<String>) -> Self {
        self.with_attribute(MUTATOR_ATTRIBUTE, name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn value_type(&self) -> ValueType {
        match self.attribute(TYPE_ATTRIBUTE) {
            Some(kind) if kind.eq_ignore_ascii_case("boolean") => ValueType::Boolean,
            _ => ValueType::String,
        }
    }

    pub fn inclusion(&self) -> Inclusion {
        match self.attribute(INCLUDE_ATTRIBUTE).map(str::trim) {
            Some("never") => Inclusion::Never,
            Some("always") => Inclusion::Always,
            _ => Inclusion::Auto,
        }
    }

    pub fn extractor_name(&self) -> Option<&str> {
        self.attribute(EXTRACTOR_ATTRIBUTE)
    }

    pub fn mutator_name(&self) -> Option<&str> {
        self.attribute(MUTATOR_ATTRIBUTE)
    }
}

/// A container element whose attributes may hide its descendants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub attributes: Attributes,
    pub children: Vec<FormNode>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group carrying the `hidden` attribute.
    pub fn hidden() -> Self {
        Self::new().with_attribute("hidden", "")
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, node: impl Into<FormNode>) -> Self {
        self.children.push(node.into());
        self
    }
}

/// Node of a form tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FormNode {
    Group(Group),
    Control(Control),
}

impl From<Group> for FormNode {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

impl From<Control> for FormNode {
    fn from(control: Control) -> Self {
        Self::Control(control)
    }
}

/// Root of a form tree. The form element itself is never ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    pub children: Vec<FormNode>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, node: impl Into<FormNode>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Visit every control with whether any ancestor group matched `ignored`.
    pub fn visit_controls<'a, P>(&'a self, ignored: &P, visit: &mut dyn FnMut(&'a Control, bool))
    where
        P: Fn(&Attributes) -> bool + ?Sized,
    {
        fn walk<'a, P: Fn(&Attributes) -> bool + ?Sized>(
            nodes: &'a [FormNode],
            ignored: &P,
            hidden: bool,
            visit: &mut dyn FnMut(&'a Control, bool),
        ) {
            for node in nodes {
                match node {
                    FormNode::Control(control) => visit(control, hidden),
                    FormNode::Group(group) => {
                        let hidden = hidden || ignored(&group.attributes);
                        walk(&group.children, ignored, hidden, visit);
                    }
                }
            }
        }
        walk(&self.children, ignored, false, visit);
    }

    /// Visit every control mutably, in document order.
    pub fn controls_mut(&mut self) -> Vec<&mut Control> {
        fn walk<'a>(nodes: &'a mut [FormNode], out: &mut Vec<&'a mut Control>) {
            for node in nodes {
                match node {
                    FormNode::Control(control) => out.push(control),
                    FormNode::Group(group) => walk(&mut group.children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&mut self.children, &mut out);
        out
    }

    /// Find the first control with the given (normalized) name.
    pub fn control(&self, name: &str) -> Option<&Control> {
        fn walk<'a>(nodes: &'a [FormNode], name: &str) -> Option<&'a Control> {
            nodes.iter().find_map(|node| match node {
                FormNode::Control(control) => control
                    .name
                    .as_deref()
                    .filter(|candidate| formwire_protocol::normalize_path(candidate) == name)
                    .map(|_| control),
                FormNode::Group(group) => walk(&group.children, name),
            })
        }
        walk(&self.children, &formwire_protocol::normalize_path(name))
    }
}
