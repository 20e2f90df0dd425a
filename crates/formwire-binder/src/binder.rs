//! Form extraction, population, and problem placement.

use crate::control::{Attributes, Control, ControlKind, Form, Inclusion, ValueType};
use crate::error::BindError;
use crate::registry::ExtractorRegistry;
use crate::tree::{get_path, set_path};
use formwire_protocol::{Problem, normalize_path};
use log::debug;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Predicate deciding whether a group hides its descendants from extraction.
pub type IgnorePredicate = dyn Fn(&Attributes) -> bool + Send + Sync;

/// Default ignore predicate: `hidden` attribute or inline `display: none`.
pub fn is_hidden(attributes: &Attributes) -> bool {
    if attributes.contains_key("hidden") {
        return true;
    }
    attributes.get("style").is_some_and(|style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .any(|(property, value)| {
                property.trim().eq_ignore_ascii_case("display")
                    && value.trim().eq_ignore_ascii_case("none")
            })
    })
}

/// Built-in extraction policy for a control.
///
/// `None` means the control contributes nothing (an unchecked radio).
pub fn default_extract(control: &Control) -> Option<Value> {
    let boolean = control.value_type() == ValueType::Boolean;
    match control.kind {
        ControlKind::Radio if !control.checked => None,
        ControlKind::Radio if boolean => Some(Value::Bool(control.value == "true")),
        ControlKind::Radio => Some(Value::String(control.value.clone())),
        ControlKind::Checkbox => Some(Value::Bool(control.checked)),
        _ if control.value.is_empty() => Some(Value::Null),
        _ if boolean => Some(Value::Bool(control.value == "true")),
        _ => Some(Value::String(control.value.clone())),
    }
}

/// Built-in population policy for a control.
pub fn default_mutate(control: &mut Control, value: &Value) {
    match control.kind {
        ControlKind::Checkbox => control.checked = is_truthy(value),
        ControlKind::Radio => control.checked = control.value == display_value(value),
        _ => control.value = display_value(value),
    }
}

/// Binds forms to value trees using a registry and an ignore predicate.
#[derive(Clone)]
pub struct FormBinder {
    registry: ExtractorRegistry,
    ignored: Arc<IgnorePredicate>,
}

impl Default for FormBinder {
    fn default() -> Self {
        Self::new(ExtractorRegistry::new())
    }
}

impl FormBinder {
    /// Create a binder using the default hidden-ancestor predicate.
    pub fn new(registry: ExtractorRegistry) -> Self {
        Self {
            registry,
            ignored: Arc::new(is_hidden),
        }
    }

    /// Replace the ignore predicate.
    pub fn with_ignore_predicate(mut self, ignored: Arc<IgnorePredicate>) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Whether a control takes part in extraction.
    pub fn is_included(&self, control: &Control, hidden_ancestor: bool) -> bool {
        if control.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return false;
        }
        match control.inclusion() {
            Inclusion::Never => false,
            Inclusion::Always => true,
            Inclusion::Auto => !hidden_ancestor,
        }
    }

    /// Extract a single control, honoring a named extractor when present.
    pub fn extract_control(&self, control: &Control) -> Result<Option<Value>, BindError> {
        match control.extractor_name() {
            Some(name) => {
                let extractor = self
                    .registry
                    .extractor(name)
                    .ok_or_else(|| BindError::UnknownExtractor(name.to_string()))?;
                Ok(extractor.extract(control))
            }
            None => Ok(default_extract(control)),
        }
    }

    /// Build a value tree from every included control of the form.
    pub fn extract(&self, form: &Form) -> Result<Value, BindError> {
        let mut included = Vec::new();
        form.visit_controls(self.ignored.as_ref(), &mut |control, hidden| {
            if self.is_included(control, hidden) {
                included.push(control);
            }
        });

        let mut tree = Value::Object(Map::new());
        for control in &included {
            let Some(name) = control.name.as_deref() else {
                continue;
            };
            let value = self.extract_control(control)?;
            tree = set_path(tree, name, value)?;
        }
        debug!("extracted form (controls={})", included.len());
        Ok(tree)
    }

    /// Apply values from `data` to every named control whose path is present.
    pub fn populate(&self, form: &mut Form, data: &Value) -> Result<usize, BindError> {
        let mut applied = 0;
        for control in form.controls_mut() {
            let Some(name) = control.name.clone() else {
                continue;
            };
            let Some(value) = get_path(data, &name) else {
                continue;
            };
            match control.mutator_name() {
                Some(mutator) => {
                    let mutator = self
                        .registry
                        .mutator(mutator)
                        .ok_or_else(|| BindError::UnknownMutator(mutator.to_string()))?;
                    mutator.apply(control, value);
                }
                None => default_mutate(control, value),
            }
            applied += 1;
        }
        debug!("populated form (controls={})", applied);
        Ok(applied)
    }

    /// Attach field problems to matching controls and return the rest.
    ///
    /// Previously placed problems are cleared. A field problem whose context
    /// names no control is returned with the global problems.
    pub fn place_problems(&self, form: &mut Form, problems: &[Problem]) -> Vec<Problem> {
        let mut controls = form.controls_mut();
        for control in controls.iter_mut() {
            control.problems.clear();
        }

        let mut global = Vec::new();
        for problem in problems {
            let target = problem
                .is_field_error()
                .then(|| problem.field_path())
                .flatten()
                .and_then(|path| {
                    controls.iter_mut().find(|control| {
                        control
                            .name
                            .as_deref()
                            .is_some_and(|name| normalize_path(name) == path)
                    })
                });
            match target {
                Some(control) => control.problems.push(problem.clone()),
                None => global.push(problem.clone()),
            }
        }
        debug!(
            "placed problems (total={}, global={})",
            problems.len(),
            global.len()
        );
        global
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "true",
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn extraction_policy_per_kind() {
        assert_eq!(default_extract(&Control::radio("r", "a", false)), None);
        assert_eq!(
            default_extract(&Control::radio("r", "a", true)),
            Some(json!("a"))
        );
        assert_eq!(
            default_extract(&Control::radio("r", "true", true).boolean()),
            Some(json!(true))
        );
        assert_eq!(
            default_extract(&Control::checkbox("c", false)),
            Some(json!(false))
        );
        assert_eq!(
            default_extract(&Control::text("t", "").boolean()),
            Some(Value::Null)
        );
        assert_eq!(
            default_extract(&Control::text("t", "yes").boolean()),
            Some(json!(false))
        );
        assert_eq!(default_extract(&Control::text("t", "")), Some(Value::Null));
        assert_eq!(
            default_extract(&Control::text("t", "hello")),
            Some(json!("hello"))
        );
    }

    #[test]
    fn hidden_detection_reads_style_declarations() {
        let mut attrs = Attributes::new();
        attrs.insert("style".to_string(), "color: red; DISPLAY : none".to_string());
        assert!(is_hidden(&attrs));

        attrs.insert("style".to_string(), "display: block".to_string());
        assert!(!is_hidden(&attrs));

        attrs.insert("hidden".to_string(), String::new());
        assert!(is_hidden(&attrs));
    }

    #[test]
    fn mutation_policy_per_kind() {
        let mut checkbox = Control::checkbox("c", false);
        default_mutate(&mut checkbox, &json!("true"));
        assert!(checkbox.checked);

        let mut radio = Control::radio("r", "2", false);
        default_mutate(&mut radio, &json!(2));
        assert!(radio.checked);

        let mut text = Control::text("t", "old");
        default_mutate(&mut text, &Value::Null);
        assert_eq!(text.value, "");
    }
}
