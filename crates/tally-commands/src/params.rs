//! Parameter declarations and submitted data
//!
//! A [`ParamSpec`] maps parameter names to [`ParamOptions`]; the data a
//! command receives on submit is a [`ParamData`] with the same keys.
//! Required parameters are always present in submitted data, optional ones
//! may be missing.

use crate::error::{CommandError, ValidationError};
use chrono::{DateTime, FixedOffset, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free text
    String,
    /// Point in time
    Time,
}

impl Display for ParamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Time => f.write_str("time"),
        }
    }
}

/// A typed parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Text value
    String(String),
    /// Time value
    Time(DateTime<FixedOffset>),
}

impl ParamValue {
    /// Type of this value
    #[inline]
    #[must_use]
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::String(_) => ParamType::String,
            Self::Time(_) => ParamType::Time,
        }
    }

    /// Text value, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Time(_) => None,
        }
    }

    /// Time value, if this is a time
    #[inline]
    #[must_use]
    pub fn as_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Time(value) => Some(*value),
            Self::String(_) => None,
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Time(value) => f.write_str(&value.to_rfc3339()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<FixedOffset>> for ParamValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Time(value)
    }
}

/// Options for a single parameter
///
/// The default value always matches the declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamOptions {
    /// Text parameter
    String {
        /// Submission is blocked while missing
        #[serde(default)]
        required: bool,
        /// Value the input is seeded with
        #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    /// Time parameter
    Time {
        /// Submission is blocked while missing
        #[serde(default)]
        required: bool,
        /// Value the input is seeded with
        #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
        default_value: Option<DateTime<FixedOffset>>,
    },
}

impl ParamOptions {
    /// Optional text parameter without default
    #[inline]
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            required: false,
            default_value: None,
        }
    }

    /// Optional time parameter without default
    #[inline]
    #[must_use]
    pub fn time() -> Self {
        Self::Time {
            required: false,
            default_value: None,
        }
    }

    /// Text parameter seeded with `value`
    #[inline]
    #[must_use]
    pub fn string_with_default(value: impl Into<String>) -> Self {
        Self::String {
            required: false,
            default_value: Some(value.into()),
        }
    }

    /// Time parameter seeded with `value`
    #[inline]
    #[must_use]
    pub fn time_with_default(value: DateTime<FixedOffset>) -> Self {
        Self::Time {
            required: false,
            default_value: Some(value),
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        match &mut self {
            Self::String { required, .. } | Self::Time { required, .. } => *required = true,
        }
        self
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::String { .. } => ParamType::String,
            Self::Time { .. } => ParamType::Time,
        }
    }

    /// Whether a value must be supplied
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. } | Self::Time { required, .. } => *required,
        }
    }

    /// Default value, if declared
    #[must_use]
    pub fn default_value(&self) -> Option<ParamValue> {
        match self {
            Self::String { default_value, .. } => default_value.clone().map(ParamValue::String),
            Self::Time { default_value, .. } => default_value.map(ParamValue::Time),
        }
    }

    /// Parse raw user input for this parameter
    ///
    /// Blank input means "no value". Time input accepts RFC 3339 or a
    /// wall-clock `HH:MM[:SS]` placed on the date of `reference`.
    ///
    /// # Errors
    /// - `ValidationError::InvalidTime` if time input cannot be parsed
    pub fn parse_input(
        &self,
        name: &str,
        raw: &str,
        reference: DateTime<FixedOffset>,
    ) -> Result<Option<ParamValue>, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match self {
            Self::String { .. } => Ok(Some(ParamValue::String(raw.to_string()))),
            Self::Time { .. } => parse_time(trimmed, reference)
                .map(|time| Some(ParamValue::Time(time)))
                .ok_or_else(|| ValidationError::InvalidTime {
                    param: name.to_string(),
                    input: trimmed.to_string(),
                }),
        }
    }
}

fn parse_time(raw: &str, reference: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time);
    }
    let wall_clock = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;
    reference
        .date_naive()
        .and_time(wall_clock)
        .and_local_timezone(*reference.offset())
        .single()
}

/// Ordered parameter declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSpec {
    params: IndexMap<String, ParamOptions>,
}

impl ParamSpec {
    /// Create spec without parameters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With parameter
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, options: ParamOptions) -> Self {
        self.insert(name, options);
        self
    }

    /// Declare or replace a parameter
    pub fn insert(&mut self, name: impl Into<String>, options: ParamOptions) {
        self.params.insert(name.into(), options);
    }

    /// Options for `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamOptions> {
        self.params.get(name)
    }

    /// Iterate over declarations in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamOptions)> {
        self.params.iter().map(|(name, options)| (name.as_str(), options))
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there are no parameters
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Data submitted to a command handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParamData {
    values: IndexMap<String, ParamValue>,
}

impl ParamData {
    /// Create empty data
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Raw value for `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Text value for `name`
    #[inline]
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(ParamValue::as_str)
    }

    /// Time value for `name`
    #[inline]
    #[must_use]
    pub fn time(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        self.values.get(name).and_then(ParamValue::as_time)
    }

    /// Text value that must be present
    ///
    /// # Errors
    /// - `CommandError::MissingValue` if absent
    /// - `CommandError::WrongType` if the value is not text
    pub fn require_string(&self, name: &str) -> Result<&str, CommandError> {
        match self.values.get(name) {
            Some(ParamValue::String(value)) => Ok(value),
            Some(_) => Err(CommandError::WrongType {
                param: name.to_string(),
                expected: ParamType::String,
            }),
            None => Err(CommandError::MissingValue(name.to_string())),
        }
    }

    /// Time value that must be present
    ///
    /// # Errors
    /// - `CommandError::MissingValue` if absent
    /// - `CommandError::WrongType` if the value is not a time
    pub fn require_time(&self, name: &str) -> Result<DateTime<FixedOffset>, CommandError> {
        match self.values.get(name) {
            Some(ParamValue::Time(value)) => Ok(*value),
            Some(_) => Err(CommandError::WrongType {
                param: name.to_string(),
                expected: ParamType::Time,
            }),
            None => Err(CommandError::MissingValue(name.to_string())),
        }
    }

    /// Whether `name` has a value
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParamData
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 14, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn options_builders() {
        let opts = ParamOptions::string().required();
        assert!(opts.is_required());
        assert_eq!(opts.param_type(), ParamType::String);
        assert_eq!(opts.default_value(), None);

        let opts = ParamOptions::time_with_default(reference());
        assert!(!opts.is_required());
        assert_eq!(opts.default_value(), Some(ParamValue::Time(reference())));
    }

    #[test]
    fn options_deserialize_from_declaration() {
        let spec: ParamSpec = serde_json::from_str(
            r#"{
                "description": {"type": "string", "required": true},
                "note": {"type": "string", "defaultValue": "n/a"},
                "start": {"type": "time"}
            }"#,
        )
        .unwrap();

        assert_eq!(spec.len(), 3);
        assert_eq!(spec.get("description"), Some(&ParamOptions::string().required()));
        assert_eq!(spec.get("note"), Some(&ParamOptions::string_with_default("n/a")));
        assert_eq!(spec.get("start"), Some(&ParamOptions::time()));
        let names: Vec<&str> = spec.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["description", "note", "start"]);
    }

    #[test]
    fn parse_blank_input_is_no_value() {
        let opts = ParamOptions::string().required();
        assert_eq!(opts.parse_input("description", "   ", reference()).unwrap(), None);
    }

    #[test]
    fn parse_string_keeps_raw_text() {
        let opts = ParamOptions::string();
        assert_eq!(
            opts.parse_input("description", " fix typo", reference()).unwrap(),
            Some(ParamValue::from(" fix typo"))
        );
    }

    #[test]
    fn parse_time_formats() {
        let opts = ParamOptions::time();
        let rfc = opts
            .parse_input("start", "2024-03-01T08:00:00+01:00", reference())
            .unwrap()
            .unwrap();
        assert_eq!(rfc.as_time().unwrap().to_rfc3339(), "2024-03-01T08:00:00+01:00");

        let wall = opts.parse_input("start", "14:05", reference()).unwrap().unwrap();
        assert_eq!(wall.as_time().unwrap().to_rfc3339(), "2024-03-14T14:05:00+02:00");

        let err = opts.parse_input("start", "teatime", reference()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTime {
                param: "start".to_string(),
                input: "teatime".to_string(),
            }
        );
    }

    #[test]
    fn data_typed_access() {
        let mut data: ParamData = [("description", "fix typo")].into_iter().collect();
        data.insert("start", reference());

        assert_eq!(data.string("description"), Some("fix typo"));
        assert_eq!(data.require_time("start").unwrap(), reference());
        assert!(matches!(
            data.require_time("description"),
            Err(CommandError::WrongType { .. })
        ));
        assert!(matches!(
            data.require_string("missing"),
            Err(CommandError::MissingValue(_))
        ));
    }

    #[test]
    fn data_serializes_as_plain_map() {
        let data: ParamData = [("description", "fix typo")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"{"description":"fix typo"}"#
        );
    }
}
