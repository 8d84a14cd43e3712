// src/model/properties.rs
//! Page property values and database property schemas.
//!
//! Both are internally tagged by `type` with the payload under a key of the
//! same name, e.g. `{"id": "x", "type": "number", "number": 4}`. Types this
//! client does not model decode as `Unsupported` instead of failing the page.

use super::common::{FileObject, PartialUser};
use super::rich_text::{plain_text, RichText};
use crate::types::{Color, PageId, PropertyMap};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A property value as it appears on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub value: PropertyTypeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyTypeValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Number { number: Option<f64> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Status { status: Option<SelectOption> },
    Date { date: Option<DateValue> },
    People { people: Vec<PartialUser> },
    Files { files: Vec<NamedFile> },
    Checkbox { checkbox: bool },
    Url { url: Option<String> },
    Email { email: Option<String> },
    PhoneNumber { phone_number: Option<String> },
    Formula { formula: FormulaValue },
    Relation { relation: Vec<RelationRef> },
    Rollup { rollup: RollupValue },
    CreatedTime { created_time: DateTime<Utc> },
    CreatedBy { created_by: PartialUser },
    LastEditedTime { last_edited_time: DateTime<Utc> },
    LastEditedBy { last_edited_by: PartialUser },
    UniqueId { unique_id: UniqueId },
    #[serde(other)]
    Unsupported,
}

impl PropertyTypeValue {
    /// Best-effort plain-text rendering, `None` for empty values.
    pub fn plain_text(&self) -> Option<String> {
        let text = match self {
            PropertyTypeValue::Title { title } => plain_text(title),
            PropertyTypeValue::RichText { rich_text } => plain_text(rich_text),
            PropertyTypeValue::Number { number } => number.as_ref()?.to_string(),
            PropertyTypeValue::Select { select } | PropertyTypeValue::Status { status: select } => {
                select.as_ref()?.name.clone()
            }
            PropertyTypeValue::MultiSelect { multi_select } => multi_select
                .iter()
                .map(|option| option.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            PropertyTypeValue::Date { date } => date.as_ref()?.start.clone(),
            PropertyTypeValue::Checkbox { checkbox } => checkbox.to_string(),
            PropertyTypeValue::Url { url: value }
            | PropertyTypeValue::Email { email: value }
            | PropertyTypeValue::PhoneNumber {
                phone_number: value,
            } => value.clone()?,
            PropertyTypeValue::CreatedTime { created_time: at }
            | PropertyTypeValue::LastEditedTime {
                last_edited_time: at,
            } => at.to_rfc3339(),
            PropertyTypeValue::UniqueId { unique_id } => unique_id.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Color,
}

/// A date or date range; `start` and `end` are ISO 8601 dates or datetimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl DateValue {
    /// The calendar date of `start`, whether it carries a time or not.
    pub fn start_date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.start)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDate::parse_from_str(&self.start, "%Y-%m-%d"))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFile {
    pub name: String,
    #[serde(flatten)]
    pub file: FileObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: PageId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueId {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
}

impl std::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.prefix, self.number) {
            (Some(prefix), Some(number)) => write!(f, "{}-{}", prefix, number),
            (None, Some(number)) => write!(f, "{}", number),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateValue> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollupValue {
    Number {
        number: Option<f64>,
        #[serde(default)]
        function: String,
    },
    Date {
        date: Option<DateValue>,
        #[serde(default)]
        function: String,
    },
    Array {
        array: Vec<Value>,
        #[serde(default)]
        function: String,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyMap<PropertyValue> {
    /// The plain text of the page's title property.
    pub fn title(&self) -> Option<String> {
        self.values().find_map(|property| match &property.value {
            PropertyTypeValue::Title { title } => Some(plain_text(title)),
            _ => None,
        })
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.get(name).map(|property| &property.value) {
            Some(PropertyTypeValue::Number { number }) => *number,
            _ => None,
        }
    }

    pub fn get_checkbox(&self, name: &str) -> Option<bool> {
        match self.get(name).map(|property| &property.value) {
            Some(PropertyTypeValue::Checkbox { checkbox }) => Some(*checkbox),
            _ => None,
        }
    }

    pub fn get_select(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|property| &property.value) {
            Some(PropertyTypeValue::Select { select: Some(option) })
            | Some(PropertyTypeValue::Status { status: Some(option) }) => Some(&option.name),
            _ => None,
        }
    }

    pub fn get_date(&self, name: &str) -> Option<&DateValue> {
        match self.get(name).map(|property| &property.value) {
            Some(PropertyTypeValue::Date { date }) => date.as_ref(),
            _ => None,
        }
    }

    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|property| property.value.plain_text())
    }
}

/// A column definition in a database schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub config: PropertyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyConfig {
    Title { title: super::EmptyObject },
    RichText { rich_text: super::EmptyObject },
    Number { number: NumberConfig },
    Select { select: OptionsConfig },
    MultiSelect { multi_select: OptionsConfig },
    Status { status: OptionsConfig },
    Date { date: super::EmptyObject },
    People { people: super::EmptyObject },
    Files { files: super::EmptyObject },
    Checkbox { checkbox: super::EmptyObject },
    Url { url: super::EmptyObject },
    Email { email: super::EmptyObject },
    PhoneNumber { phone_number: super::EmptyObject },
    Formula { formula: FormulaConfig },
    Relation { relation: Value },
    Rollup { rollup: Value },
    CreatedTime { created_time: super::EmptyObject },
    CreatedBy { created_by: super::EmptyObject },
    LastEditedTime { last_edited_time: super::EmptyObject },
    LastEditedBy { last_edited_by: super::EmptyObject },
    UniqueId { unique_id: Value },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberConfig {
    #[serde(default = "default_number_format")]
    pub format: String,
}

fn default_number_format() -> String {
    "number".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaConfig {
    #[serde(default)]
    pub expression: String,
}
