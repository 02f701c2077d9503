use crate::terminal::colors;
use colored::*;
use subconf_common::{DynamicSettings, SettingValue};

pub type Detail = (String, ColoredString);

pub fn value_to_colored(value: &SettingValue) -> ColoredString {
    match value {
        SettingValue::Bool(true) => "true".color(colors::BOOL_TRUE),
        SettingValue::Bool(false) => "false".color(colors::BOOL_FALSE),
        SettingValue::Byte(_)
        | SettingValue::Short(_)
        | SettingValue::Int(_)
        | SettingValue::Long(_)
        | SettingValue::Float(_)
        | SettingValue::Double(_) => value.to_string().color(colors::NUMBER),
        SettingValue::String(text) => format!("{text:?}").color(colors::TEXT),
        SettingValue::Char(c) => format!("{c:?}").color(colors::TEXT),
        SettingValue::Enum(variant) => variant.as_str().color(colors::CHOICE),
        SettingValue::List(_) | SettingValue::Map(_) => value.to_string().color(colors::COLLECTION),
    }
}

/// One `name: value` detail per setting, in registration order.
pub fn settings_to_detail(settings: &DynamicSettings) -> Vec<Detail> {
    settings
        .settings()
        .map(|setting| (setting.name().to_string(), value_to_colored(setting.value())))
        .collect()
}

/// One `name: kind = default` detail per setting.
pub fn kinds_to_detail(settings: &DynamicSettings) -> Vec<Detail> {
    settings
        .settings()
        .map(|setting| {
            let kind: ColoredString = setting.kind().to_string().color(colors::ACCENT);
            let value: ColoredString = value_to_colored(setting.value());
            (setting.name().to_string(), format!("{kind} = {value}").normal())
        })
        .collect()
}
