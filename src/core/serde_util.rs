//! Field adapters for records written by the browser front end, which stores
//! unset form fields as empty strings rather than omitting them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

pub mod optional_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

pub mod optional_text {
    use super::*;

    pub fn serialize<S: Serializer>(text: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        match text {
            Some(t) => s.serialize_str(t),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, with = "super::optional_date")]
        due: Option<chrono::NaiveDate>,
        #[serde(default, with = "super::optional_text")]
        start: Option<String>,
    }

    #[test]
    fn empty_strings_read_as_absent() {
        let form: Form = serde_json::from_str(r#"{"due": "", "start": ""}"#).unwrap();
        assert!(form.due.is_none());
        assert!(form.start.is_none());
    }

    #[test]
    fn missing_fields_read_as_absent() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert!(form.due.is_none());
        assert!(form.start.is_none());
    }

    #[test]
    fn iso_date_parses() {
        let form: Form =
            serde_json::from_str(r#"{"due": "2024-03-10", "start": "09:30"}"#).unwrap();
        assert_eq!(form.due, chrono::NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(form.start.as_deref(), Some("09:30"));
    }
}
