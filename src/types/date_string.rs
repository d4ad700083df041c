use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

const FORM_FORMAT: &str = "%Y-%m-%d";
const API_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateError {
    #[error("failed to format non-date {0:?}")]
    NotADate(String),
    #[error("failed to unmarshal non-date, unrecognised format {0:?}")]
    UnrecognisedFormat(String),
}

/// A date as entered in forms (`YYYY-MM-DD`).
///
/// The case-management API speaks `DD/MM/YYYY` and sometimes full RFC 3339
/// timestamps; both deserialise into this type and it always serialises back
/// as `DD/MM/YYYY`. An empty value stands for "no date" and is sent as `null`.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateString(String);

impl DateString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_naive_date(&self) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(&self.0, FORM_FORMAT)
            .map_err(|_| DateError::NotADate(self.0.clone()))
    }

    /// The date in the API's `DD/MM/YYYY` format.
    pub fn to_api(&self) -> Result<String, DateError> {
        Ok(self.as_naive_date()?.format(API_FORMAT).to_string())
    }

    fn from_api(raw: &str) -> Result<Self, DateError> {
        // the API escapes forward slashes, e.g. "03\/04\/2022"
        let raw = raw.replace('\\', "");

        let date = NaiveDate::parse_from_str(&raw, API_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&raw).ok().map(|t| t.date_naive()))
            .ok_or_else(|| DateError::UnrecognisedFormat(raw.clone()))?;

        Ok(Self(date.format(FORM_FORMAT).to_string()))
    }
}

impl Display for DateString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for DateString {
    fn from(date: NaiveDate) -> Self {
        Self(date.format(FORM_FORMAT).to_string())
    }
}

impl Serialize for DateString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_empty() {
            return serializer.serialize_none();
        }

        let date = self.to_api().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&date)
    }
}

impl<'de> Deserialize<'de> for DateString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self::default()),
            Some(raw) if raw.is_empty() => Ok(Self::default()),
            Some(raw) => Self::from_api(&raw).map_err(serde::de::Error::custom),
        }
    }
}
