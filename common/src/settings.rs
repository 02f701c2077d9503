//! # Dynamic Settings
//!
//! An insertion-ordered registry of named, typed settings.
//!
//! Every setting carries a [`SettingKind`] that constrains its value. Values are
//! validated whenever they enter the registry: at registration, through typed
//! setters, and when a JSON document is applied. The JSON encoding is a flat
//! object keyed by setting name, emitted in registration order.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::error::{Result, SettingsError};

/// Width of a plain numeric setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl NumberKind {
    pub fn is_integral(self) -> bool {
        !matches!(self, NumberKind::Float | NumberKind::Double)
    }

    /// Parses user-entered text into a value of this width.
    pub fn parse(self, text: &str) -> Option<SettingValue> {
        let text = text.trim();
        match self {
            NumberKind::Byte => text.parse().ok().map(SettingValue::Byte),
            NumberKind::Short => text.parse().ok().map(SettingValue::Short),
            NumberKind::Int => text.parse().ok().map(SettingValue::Int),
            NumberKind::Long => text.parse().ok().map(SettingValue::Long),
            // "NaN" and "inf" parse as floats but have no JSON encoding
            NumberKind::Float => text.parse().ok().filter(|v: &f32| v.is_finite()).map(SettingValue::Float),
            NumberKind::Double => text.parse().ok().filter(|v: &f64| v.is_finite()).map(SettingValue::Double),
        }
    }

    fn matches(self, value: &SettingValue) -> bool {
        matches!(
            (self, value),
            (NumberKind::Byte, SettingValue::Byte(_))
                | (NumberKind::Short, SettingValue::Short(_))
                | (NumberKind::Int, SettingValue::Int(_))
                | (NumberKind::Long, SettingValue::Long(_))
                | (NumberKind::Float, SettingValue::Float(_))
                | (NumberKind::Double, SettingValue::Double(_))
        )
    }

    fn decode(self, name: &str, json: &Value) -> Result<SettingValue> {
        if !self.is_integral() {
            let float = json.as_f64().ok_or_else(|| mismatch(name, self, json))?;
            return Ok(match self {
                NumberKind::Float => {
                    if float.abs() > f64::from(f32::MAX) {
                        return Err(SettingsError::InvalidValue {
                            name: name.to_string(),
                            reason: format!("{float} does not fit in a {self}"),
                        });
                    }
                    SettingValue::Float(float as f32)
                }
                _ => SettingValue::Double(float),
            });
        }

        let integer = integral(json).ok_or_else(|| mismatch(name, self, json))?;
        let does_not_fit = || SettingsError::InvalidValue {
            name: name.to_string(),
            reason: format!("{integer} does not fit in a {self}"),
        };
        Ok(match self {
            NumberKind::Byte => SettingValue::Byte(i8::try_from(integer).map_err(|_| does_not_fit())?),
            NumberKind::Short => SettingValue::Short(i16::try_from(integer).map_err(|_| does_not_fit())?),
            NumberKind::Int => SettingValue::Int(i32::try_from(integer).map_err(|_| does_not_fit())?),
            _ => SettingValue::Long(integer),
        })
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumberKind::Byte => "byte",
            NumberKind::Short => "short",
            NumberKind::Int => "int",
            NumberKind::Long => "long",
            NumberKind::Float => "float",
            NumberKind::Double => "double",
        };
        f.write_str(name)
    }
}

/// Accepts JSON integers and integral floats such as `3.0`.
fn integral(json: &Value) -> Option<i64> {
    if let Some(integer) = json.as_i64() {
        return Some(integer);
    }
    let float = json.as_f64()?;
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

fn mismatch(name: &str, expected: impl fmt::Display, json: &Value) -> SettingsError {
    SettingsError::TypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        found: json_type_name(json).to_string(),
    }
}

fn json_type_name(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The shape a setting's value must have.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Boolean,
    Number(NumberKind),
    BoundedInt { min: i32, max: i32 },
    BoundedDouble { min: f64, max: f64 },
    String,
    Char,
    Enum { variants: Vec<String> },
    List(Box<SettingKind>),
    Map(Box<SettingKind>),
}

impl SettingKind {
    /// Checks that `value` conforms to this kind, bounds and variants included.
    pub fn validate(&self, name: &str, value: &SettingValue) -> Result<()> {
        match (self, value) {
            (SettingKind::Boolean, SettingValue::Bool(_))
            | (SettingKind::String, SettingValue::String(_))
            | (SettingKind::Char, SettingValue::Char(_)) => Ok(()),
            (SettingKind::Number(NumberKind::Float), SettingValue::Float(v)) if !v.is_finite() => Err(not_finite(name, v)),
            (SettingKind::Number(NumberKind::Double), SettingValue::Double(v)) if !v.is_finite() => Err(not_finite(name, v)),
            (SettingKind::Number(kind), value) if kind.matches(value) => Ok(()),
            (SettingKind::BoundedInt { min, max }, SettingValue::Int(v)) => {
                if v < min || v > max {
                    return Err(out_of_bounds(name, v, min, max));
                }
                Ok(())
            }
            (SettingKind::BoundedDouble { min, max }, SettingValue::Double(v)) => {
                // written so that NaN is rejected too
                if !(*min <= *v && *v <= *max) {
                    return Err(out_of_bounds(name, v, min, max));
                }
                Ok(())
            }
            (SettingKind::Enum { variants }, SettingValue::Enum(variant)) => {
                if !variants.iter().any(|known| known == variant) {
                    return Err(SettingsError::InvalidValue {
                        name: name.to_string(),
                        reason: format!("`{variant}` is not one of [{}]", variants.join(", ")),
                    });
                }
                Ok(())
            }
            (SettingKind::List(element), SettingValue::List(items)) => {
                items.iter().try_for_each(|item| element.validate(name, item))
            }
            (SettingKind::Map(element), SettingValue::Map(entries)) => {
                entries.values().try_for_each(|item| element.validate(name, item))
            }
            _ => Err(SettingsError::TypeMismatch {
                name: name.to_string(),
                expected: self.to_string(),
                found: value.type_name().to_string(),
            }),
        }
    }

    /// Adapts loosely-typed input to this kind: strings become enum variants,
    /// and enum variants become strings.
    pub fn coerce(&self, value: SettingValue) -> SettingValue {
        match (self, value) {
            (SettingKind::Enum { .. }, SettingValue::String(s)) => SettingValue::Enum(s),
            (SettingKind::String, SettingValue::Enum(s)) => SettingValue::String(s),
            (SettingKind::List(element), SettingValue::List(items)) => {
                SettingValue::List(items.into_iter().map(|item| element.coerce(item)).collect())
            }
            (SettingKind::Map(element), SettingValue::Map(entries)) => SettingValue::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, element.coerce(item)))
                    .collect(),
            ),
            (_, value) => value,
        }
    }

    /// Decodes and validates a JSON value for the setting `name`.
    pub fn decode(&self, name: &str, json: &Value) -> Result<SettingValue> {
        let value = match self {
            SettingKind::Boolean => SettingValue::Bool(json.as_bool().ok_or_else(|| mismatch(name, self, json))?),
            SettingKind::Number(kind) => kind.decode(name, json)?,
            SettingKind::BoundedInt { .. } => NumberKind::Int.decode(name, json)?,
            SettingKind::BoundedDouble { .. } => NumberKind::Double.decode(name, json)?,
            SettingKind::String => SettingValue::String(
                json.as_str().ok_or_else(|| mismatch(name, self, json))?.to_string(),
            ),
            SettingKind::Char => {
                let text = json.as_str().ok_or_else(|| mismatch(name, self, json))?;
                let first = text.chars().next().ok_or_else(|| SettingsError::InvalidValue {
                    name: name.to_string(),
                    reason: "expected a character, got an empty string".to_string(),
                })?;
                SettingValue::Char(first)
            }
            SettingKind::Enum { .. } => SettingValue::Enum(
                json.as_str().ok_or_else(|| mismatch(name, self, json))?.to_string(),
            ),
            SettingKind::List(element) => {
                let items = json.as_array().ok_or_else(|| mismatch(name, self, json))?;
                SettingValue::List(
                    items
                        .iter()
                        .map(|item| element.decode(name, item))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            SettingKind::Map(element) => {
                let entries = json.as_object().ok_or_else(|| mismatch(name, self, json))?;
                SettingValue::Map(
                    entries
                        .iter()
                        .map(|(key, item)| Ok((key.clone(), element.decode(name, item)?)))
                        .collect::<Result<BTreeMap<_, _>>>()?,
                )
            }
        };
        self.validate(name, &value)?;
        Ok(value)
    }
}

fn not_finite(name: &str, value: impl fmt::Display) -> SettingsError {
    SettingsError::InvalidValue {
        name: name.to_string(),
        reason: format!("{value} is not a finite number"),
    }
}

fn out_of_bounds<T: fmt::Display>(name: &str, value: &T, min: &T, max: &T) -> SettingsError {
    SettingsError::OutOfBounds {
        name: name.to_string(),
        value: value.to_string(),
        min: min.to_string(),
        max: max.to_string(),
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingKind::Boolean => f.write_str("boolean"),
            SettingKind::Number(kind) => write!(f, "{kind}"),
            SettingKind::BoundedInt { min, max } => write!(f, "int in {min}..={max}"),
            SettingKind::BoundedDouble { min, max } => write!(f, "double in {min}..={max}"),
            SettingKind::String => f.write_str("string"),
            SettingKind::Char => f.write_str("char"),
            SettingKind::Enum { variants } => write!(f, "one of [{}]", variants.join(", ")),
            SettingKind::List(element) => write!(f, "list of {element}"),
            SettingKind::Map(element) => write!(f, "map of {element}"),
        }
    }
}

/// A concrete setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Char(char),
    Enum(String),
    List(Vec<SettingValue>),
    Map(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Byte(_) => "byte",
            SettingValue::Short(_) => "short",
            SettingValue::Int(_) => "int",
            SettingValue::Long(_) => "long",
            SettingValue::Float(_) => "float",
            SettingValue::Double(_) => "double",
            SettingValue::String(_) => "string",
            SettingValue::Char(_) => "char",
            SettingValue::Enum(_) => "enum variant",
            SettingValue::List(_) => "list",
            SettingValue::Map(_) => "map",
        }
    }

    /// JSON encoding of this value.
    pub fn to_json(&self) -> Value {
        match self {
            SettingValue::Bool(v) => Value::Bool(*v),
            SettingValue::Byte(v) => Value::from(*v),
            SettingValue::Short(v) => Value::from(*v),
            SettingValue::Int(v) => Value::from(*v),
            SettingValue::Long(v) => Value::from(*v),
            // Going through the shortest f32 text keeps `0.1` from widening
            // into `0.10000000149011612`.
            SettingValue::Float(v) => v
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number),
            SettingValue::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            SettingValue::String(v) | SettingValue::Enum(v) => Value::String(v.clone()),
            SettingValue::Char(v) => Value::String(v.to_string()),
            SettingValue::List(items) => Value::Array(items.iter().map(SettingValue::to_json).collect()),
            SettingValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), item.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Byte(v) => write!(f, "{v}"),
            SettingValue::Short(v) => write!(f, "{v}"),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Long(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v}"),
            SettingValue::Double(v) => write!(f, "{v}"),
            SettingValue::String(v) | SettingValue::Enum(v) => f.write_str(v),
            SettingValue::Char(v) => write!(f, "{v}"),
            SettingValue::List(_) | SettingValue::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

/// Rust scalars that can be read from and written to a setting.
pub trait SettingType: Sized {
    fn from_value(value: &SettingValue) -> Option<Self>;
    fn into_value(self) -> SettingValue;
}

/// Numeric scalars with a matching [`NumberKind`].
pub trait NumberType: SettingType {
    const KIND: NumberKind;
}

macro_rules! scalar_setting_type {
    ($ty:ty, $variant:ident) => {
        impl SettingType for $ty {
            fn from_value(value: &SettingValue) -> Option<Self> {
                match value {
                    SettingValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }

            fn into_value(self) -> SettingValue {
                SettingValue::$variant(self)
            }
        }

        impl From<$ty> for SettingValue {
            fn from(value: $ty) -> Self {
                SettingValue::$variant(value)
            }
        }
    };
    ($ty:ty, $variant:ident, $kind:ident) => {
        scalar_setting_type!($ty, $variant);

        impl NumberType for $ty {
            const KIND: NumberKind = NumberKind::$kind;
        }
    };
}

scalar_setting_type!(bool, Bool);
scalar_setting_type!(i8, Byte, Byte);
scalar_setting_type!(i16, Short, Short);
scalar_setting_type!(i32, Int, Int);
scalar_setting_type!(i64, Long, Long);
scalar_setting_type!(f32, Float, Float);
scalar_setting_type!(f64, Double, Double);
scalar_setting_type!(char, Char);

impl SettingType for String {
    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::String(v) | SettingValue::Enum(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> SettingValue {
        SettingValue::String(self)
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

/// A named setting and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    kind: SettingKind,
    value: SettingValue,
}

impl Setting {
    pub fn new(name: impl Into<String>, kind: SettingKind, default: SettingValue) -> Result<Self> {
        let name = name.into();
        let value = kind.coerce(default);
        kind.validate(&name, &value)?;
        Ok(Self { name, kind, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    /// Replaces the value. The setting is left untouched when validation fails.
    pub fn set(&mut self, value: SettingValue) -> Result<()> {
        let value = self.kind.coerce(value);
        self.kind.validate(&self.name, &value)?;
        self.value = value;
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        self.value.to_json()
    }

    pub fn apply_json(&mut self, json: &Value) -> Result<()> {
        self.value = self.kind.decode(&self.name, json)?;
        Ok(())
    }

    fn element_kind(&self) -> Option<&SettingKind> {
        match &self.kind {
            SettingKind::List(element) | SettingKind::Map(element) => Some(element),
            _ => None,
        }
    }

    fn list_mut(&mut self) -> Result<(&SettingKind, &mut Vec<SettingValue>)> {
        match (&self.kind, &mut self.value) {
            (SettingKind::List(element), SettingValue::List(items)) => Ok((element, items)),
            _ => Err(not_a(&self.name, &self.kind, "list")),
        }
    }

    fn map_mut(&mut self) -> Result<(&SettingKind, &mut BTreeMap<String, SettingValue>)> {
        match (&self.kind, &mut self.value) {
            (SettingKind::Map(element), SettingValue::Map(entries)) => Ok((element, entries)),
            _ => Err(not_a(&self.name, &self.kind, "map")),
        }
    }

    fn not_a(&self, expected: &str) -> SettingsError {
        not_a(&self.name, &self.kind, expected)
    }
}

fn not_a(name: &str, kind: &SettingKind, expected: &str) -> SettingsError {
    SettingsError::TypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        found: kind.to_string(),
    }
}

/// An ordered collection of settings belonging to one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSettings {
    schema: String,
    settings: Vec<Setting>,
}

impl DynamicSettings {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            settings: Vec::new(),
        }
    }

    /// Name of the schema these settings were built from.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Settings in registration order.
    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|setting| setting.name == name)
    }

    pub fn setting_mut(&mut self, name: &str) -> Option<&mut Setting> {
        self.settings.iter_mut().find(|setting| setting.name == name)
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut Setting> {
        self.setting_mut(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    fn require(&self, name: &str) -> Result<&Setting> {
        self.setting(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    /// Appends a setting. Names must be unique within one registry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: SettingKind,
        default: impl Into<SettingValue>,
    ) -> Result<&mut Self> {
        let setting = Setting::new(name, kind, default.into())?;
        if self.setting(&setting.name).is_some() {
            return Err(SettingsError::DuplicateSetting(setting.name));
        }
        self.settings.push(setting);
        Ok(self)
    }

    pub fn register_bool(&mut self, name: &str, default: bool) -> Result<&mut Self> {
        self.register(name, SettingKind::Boolean, default)
    }

    pub fn register_number<T: NumberType>(&mut self, name: &str, default: T) -> Result<&mut Self> {
        self.register(name, SettingKind::Number(T::KIND), default.into_value())
    }

    pub fn register_bounded_int(&mut self, name: &str, default: i32, min: i32, max: i32) -> Result<&mut Self> {
        self.register(name, SettingKind::BoundedInt { min, max }, default)
    }

    pub fn register_bounded_double(&mut self, name: &str, default: f64, min: f64, max: f64) -> Result<&mut Self> {
        self.register(name, SettingKind::BoundedDouble { min, max }, default)
    }

    pub fn register_string(&mut self, name: &str, default: &str) -> Result<&mut Self> {
        self.register(name, SettingKind::String, default)
    }

    pub fn register_char(&mut self, name: &str, default: char) -> Result<&mut Self> {
        self.register(name, SettingKind::Char, default)
    }

    pub fn register_enum(&mut self, name: &str, variants: &[&str], default: &str) -> Result<&mut Self> {
        let variants = variants.iter().map(|v| v.to_string()).collect();
        self.register(name, SettingKind::Enum { variants }, SettingValue::Enum(default.to_string()))
    }

    pub fn register_list<T: SettingType>(
        &mut self,
        name: &str,
        element: SettingKind,
        defaults: Vec<T>,
    ) -> Result<&mut Self> {
        let items = defaults.into_iter().map(SettingType::into_value).collect();
        self.register(name, SettingKind::List(Box::new(element)), SettingValue::List(items))
    }

    pub fn register_map<T: SettingType>(
        &mut self,
        name: &str,
        element: SettingKind,
        defaults: Vec<(&str, T)>,
    ) -> Result<&mut Self> {
        let entries = defaults
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.into_value()))
            .collect();
        self.register(name, SettingKind::Map(Box::new(element)), SettingValue::Map(entries))
    }

    /// Typed read. Fails when the setting is missing or holds another type.
    pub fn get<T: SettingType>(&self, name: &str) -> Result<T> {
        let setting = self.require(name)?;
        T::from_value(&setting.value).ok_or_else(|| SettingsError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: setting.value.type_name().to_string(),
        })
    }

    pub fn set(&mut self, name: &str, value: impl Into<SettingValue>) -> Result<()> {
        self.require_mut(name)?.set(value.into())
    }

    pub fn list_len(&self, name: &str) -> Result<usize> {
        match &self.require(name)?.value {
            SettingValue::List(items) => Ok(items.len()),
            _ => Err(self.require(name)?.not_a("list")),
        }
    }

    pub fn list_get<T: SettingType>(&self, name: &str, index: usize) -> Result<T> {
        let setting = self.require(name)?;
        let SettingValue::List(items) = &setting.value else {
            return Err(setting.not_a("list"));
        };
        let item = items.get(index).ok_or_else(|| SettingsError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len: items.len(),
        })?;
        T::from_value(item).ok_or_else(|| SettingsError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: item.type_name().to_string(),
        })
    }

    pub fn list_push(&mut self, name: &str, value: impl Into<SettingValue>) -> Result<()> {
        let len = self.list_len(name)?;
        self.list_insert(name, len, value)
    }

    pub fn list_insert(&mut self, name: &str, index: usize, value: impl Into<SettingValue>) -> Result<()> {
        let setting = self.require_mut(name)?;
        let setting_name = setting.name.clone();
        let (element, items) = setting.list_mut()?;
        if index > items.len() {
            return Err(SettingsError::IndexOutOfRange {
                name: setting_name,
                index,
                len: items.len(),
            });
        }
        let value = element.coerce(value.into());
        element.validate(&setting_name, &value)?;
        items.insert(index, value);
        Ok(())
    }

    pub fn list_remove(&mut self, name: &str, index: usize) -> Result<SettingValue> {
        let setting = self.require_mut(name)?;
        let setting_name = setting.name.clone();
        let (_, items) = setting.list_mut()?;
        if index >= items.len() {
            return Err(SettingsError::IndexOutOfRange {
                name: setting_name,
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    pub fn map_get<T: SettingType>(&self, name: &str, key: &str) -> Result<Option<T>> {
        let setting = self.require(name)?;
        let SettingValue::Map(entries) = &setting.value else {
            return Err(setting.not_a("map"));
        };
        Ok(entries.get(key).and_then(T::from_value))
    }

    pub fn map_put(&mut self, name: &str, key: &str, value: impl Into<SettingValue>) -> Result<()> {
        let setting = self.require_mut(name)?;
        let setting_name = setting.name.clone();
        let (element, entries) = setting.map_mut()?;
        let value = element.coerce(value.into());
        element.validate(&setting_name, &value)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    pub fn map_remove(&mut self, name: &str, key: &str) -> Result<Option<SettingValue>> {
        let (_, entries) = self.require_mut(name)?.map_mut()?;
        Ok(entries.remove(key))
    }

    pub fn map_keys(&self, name: &str) -> Result<Vec<String>> {
        let setting = self.require(name)?;
        match &setting.value {
            SettingValue::Map(entries) => Ok(entries.keys().cloned().collect()),
            _ => Err(setting.not_a("map")),
        }
    }

    /// Copies every value whose name also exists in `other`.
    ///
    /// Values the target kind rejects are skipped.
    pub fn copy_to(&self, other: &mut DynamicSettings) {
        for setting in &self.settings {
            let Some(target) = other.setting_mut(&setting.name) else {
                continue;
            };
            if let Err(err) = target.set(setting.value.clone()) {
                warn!("Skipping `{}` while copying settings: {}", setting.name, err);
            }
        }
    }

    pub fn copy_from(&mut self, other: &DynamicSettings) -> &mut Self {
        other.copy_to(self);
        self
    }

    /// Encodes all settings as one JSON object in registration order.
    pub fn serialize(&self) -> Value {
        let object: Map<String, Value> = self
            .settings
            .iter()
            .map(|setting| (setting.name.clone(), setting.to_json()))
            .collect();
        Value::Object(object)
    }

    /// Compact single-line encoding.
    pub fn to_json_line(&self) -> String {
        self.serialize().to_string()
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Applies a JSON object on top of the current values.
    ///
    /// Unknown keys are skipped with a warning. Decoding stops at the first
    /// invalid value; settings applied before it keep their new values.
    pub fn deserialize(&mut self, document: &Value) -> Result<()> {
        let Value::Object(entries) = document else {
            return Err(SettingsError::NotAnObject(json_type_name(document)));
        };

        for (key, json) in entries {
            match self.setting_mut(key) {
                Some(setting) => setting.apply_json(json)?,
                None => warn!("Unknown setting: {}", key),
            }
        }
        Ok(())
    }

    pub fn apply_json_str(&mut self, text: &str) -> Result<()> {
        let document: Value = serde_json::from_str(text)?;
        self.deserialize(&document)
    }

    /// Loads values from a JSON file. A missing file is not an error and
    /// returns `false`.
    pub fn load(&mut self, path: &Path) -> Result<bool> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}, keeping defaults", path.display());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        self.apply_json_str(&text)?;
        Ok(true)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut text = self.to_pretty_json()?;
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    /// Element kind of a list or map setting.
    pub fn element_kind(&self, name: &str) -> Option<&SettingKind> {
        self.setting(name).and_then(Setting::element_kind)
    }
}
