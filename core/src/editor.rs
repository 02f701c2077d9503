//! # Settings Editor
//!
//! Form state for editing a [`DynamicSettings`] interactively. Each setting
//! becomes one [`Field`] whose widget depends on the setting kind. The model
//! holds no terminal state; a frontend maps key presses onto the operations
//! below and renders [`SettingsEditor::fields`].
//!
//! Checkboxes, choices, spinners and parseable numeric text apply to the
//! settings as soon as they change. Plain text and char fields are applied
//! by [`SettingsEditor::save`].

use subconf_common::{DynamicSettings, NumberKind, SettingKind, SettingValue};
use tracing::{debug, warn};

const INT_STEP: i32 = 1;
const DOUBLE_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Checkbox(bool),
    NumberText { kind: NumberKind, text: String },
    IntSpinner { value: i32, min: i32, max: i32 },
    DoubleSpinner { value: f64, min: f64, max: f64 },
    Text(String),
    CharText(String),
    Choice { variants: Vec<String>, selected: usize },
    /// Lists and maps are shown but cannot be edited.
    ReadOnly(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    widget: Widget,
}

impl Field {
    fn for_setting(name: &str, kind: &SettingKind, value: &SettingValue) -> Self {
        let widget = match (kind, value) {
            (SettingKind::Boolean, SettingValue::Bool(v)) => Widget::Checkbox(*v),
            (SettingKind::Number(kind), value) => Widget::NumberText {
                kind: *kind,
                text: value.to_string(),
            },
            (SettingKind::BoundedInt { min, max }, SettingValue::Int(v)) => Widget::IntSpinner {
                value: *v,
                min: *min,
                max: *max,
            },
            (SettingKind::BoundedDouble { min, max }, SettingValue::Double(v)) => Widget::DoubleSpinner {
                value: *v,
                min: *min,
                max: *max,
            },
            (SettingKind::String, value) => Widget::Text(value.to_string()),
            (SettingKind::Char, value) => Widget::CharText(value.to_string()),
            (SettingKind::Enum { variants }, value) => {
                let current = value.to_string();
                Widget::Choice {
                    selected: variants.iter().position(|v| *v == current).unwrap_or(0),
                    variants: variants.clone(),
                }
            }
            (kind, value) => {
                warn!("Unsupported setting type: {} is a {}, shown read-only", name, kind);
                Widget::ReadOnly(value.to_string())
            }
        };
        Self {
            name: name.to_string(),
            widget,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self.widget, Widget::ReadOnly(_))
    }

    /// `false` when the field's text cannot become a value of its kind.
    pub fn is_valid(&self) -> bool {
        match &self.widget {
            Widget::NumberText { kind, text } => kind.parse(text).is_some(),
            Widget::CharText(text) => text.chars().count() == 1,
            _ => true,
        }
    }

    /// Text shown for the field's current state.
    pub fn display(&self) -> String {
        match &self.widget {
            Widget::Checkbox(checked) => String::from(if *checked { "[x]" } else { "[ ]" }),
            Widget::NumberText { text, .. } | Widget::Text(text) | Widget::CharText(text) => text.clone(),
            Widget::IntSpinner { value, min, max } => format!("< {value} >  ({min}..={max})"),
            Widget::DoubleSpinner { value, min, max } => format!("< {value} >  ({min}..={max})"),
            Widget::Choice { variants, selected } => {
                format!("< {} >", variants.get(*selected).map(String::as_str).unwrap_or(""))
            }
            Widget::ReadOnly(text) => text.clone(),
        }
    }

    fn value(&self) -> Option<SettingValue> {
        match &self.widget {
            Widget::Checkbox(v) => Some(SettingValue::Bool(*v)),
            Widget::NumberText { kind, text } => kind.parse(text),
            Widget::IntSpinner { value, .. } => Some(SettingValue::Int(*value)),
            Widget::DoubleSpinner { value, .. } => Some(SettingValue::Double(*value)),
            Widget::Text(text) => Some(SettingValue::String(text.clone())),
            Widget::CharText(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(SettingValue::Char(c)),
                    _ => None,
                }
            }
            Widget::Choice { variants, selected } => variants.get(*selected).cloned().map(SettingValue::Enum),
            Widget::ReadOnly(_) => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match &mut self.widget {
            Widget::NumberText { text, .. } | Widget::Text(text) | Widget::CharText(text) => Some(text),
            _ => None,
        }
    }

    /// Whether edits to this field are pushed to the settings immediately.
    fn applies_live(&self) -> bool {
        matches!(
            self.widget,
            Widget::Checkbox(_)
                | Widget::NumberText { .. }
                | Widget::IntSpinner { .. }
                | Widget::DoubleSpinner { .. }
                | Widget::Choice { .. }
        )
    }

    fn step(&mut self, up: bool) -> bool {
        match &mut self.widget {
            Widget::IntSpinner { value, min, max } => {
                let next = if up {
                    value.saturating_add(INT_STEP)
                } else {
                    value.saturating_sub(INT_STEP)
                };
                *value = next.clamp(*min, *max);
                true
            }
            Widget::DoubleSpinner { value, min, max } => {
                let next = if up { *value + DOUBLE_STEP } else { *value - DOUBLE_STEP };
                // trims float noise such as 0.30000000000000004
                *value = ((next * 1e9).round() / 1e9).clamp(*min, *max);
                true
            }
            Widget::Choice { variants, selected } if !variants.is_empty() => {
                let len = variants.len();
                *selected = if up { (*selected + 1) % len } else { (*selected + len - 1) % len };
                true
            }
            _ => false,
        }
    }
}

/// Result of [`SettingsEditor::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub applied: usize,
    /// Fields whose input was rejected and left the setting unchanged.
    pub invalid: Vec<String>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

pub struct SettingsEditor {
    settings: DynamicSettings,
    fields: Vec<Field>,
    focus: usize,
}

impl SettingsEditor {
    pub fn new(settings: DynamicSettings) -> Self {
        let fields = settings
            .settings()
            .map(|setting| Field::for_setting(setting.name(), setting.kind(), setting.value()))
            .collect();
        Self {
            settings,
            fields,
            focus: 0,
        }
    }

    pub fn settings(&self) -> &DynamicSettings {
        &self.settings
    }

    pub fn into_settings(self) -> DynamicSettings {
        self.settings
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let Some(text) = self.fields.get_mut(self.focus).and_then(Field::text_mut) else {
            return;
        };
        text.push(c);
        self.apply_focused_live();
    }

    pub fn backspace(&mut self) {
        let Some(text) = self.fields.get_mut(self.focus).and_then(Field::text_mut) else {
            return;
        };
        text.pop();
        self.apply_focused_live();
    }

    /// Flips a focused checkbox. Other widgets ignore it.
    pub fn toggle(&mut self) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        if let Widget::Checkbox(checked) = &mut field.widget {
            *checked = !*checked;
            self.apply_focused_live();
        }
    }

    pub fn increment(&mut self) {
        self.step_focused(true);
    }

    pub fn decrement(&mut self) {
        self.step_focused(false);
    }

    fn step_focused(&mut self, up: bool) {
        let stepped = self
            .fields
            .get_mut(self.focus)
            .is_some_and(|field| field.step(up));
        if stepped {
            self.apply_focused_live();
        }
    }

    fn apply_focused_live(&mut self) {
        let Some(field) = self.fields.get(self.focus) else {
            return;
        };
        if !field.applies_live() {
            return;
        }
        // unparseable numeric text is flagged through is_valid instead
        if let Some(value) = field.value() {
            if let Err(err) = self.settings.set(&field.name, value) {
                debug!("Live update of `{}` rejected: {}", field.name, err);
            }
        }
    }

    /// Writes every editable field back into the settings.
    ///
    /// Invalid fields are skipped and reported; the rest are still applied.
    pub fn save(&mut self) -> SaveReport {
        let mut report = SaveReport::default();
        for field in self.fields.iter().filter(|field| field.is_editable()) {
            let applied = field
                .value()
                .map(|value| self.settings.set(&field.name, value));
            match applied {
                Some(Ok(())) => report.applied += 1,
                Some(Err(err)) => {
                    // shown in the form's status line; the screen is live here
                    debug!("Could not save `{}`: {}", field.name, err);
                    report.invalid.push(field.name.clone());
                }
                None => report.invalid.push(field.name.clone()),
            }
        }
        report
    }
}
