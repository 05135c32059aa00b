//! JSON record parser
//!
//! Handles the common cursor-paginated API shape: either a bare top-level
//! array of records, or an object holding the record array under one key and
//! the continuation cursor under another.

use crate::config::PaginationConfig;
use crate::parse::{Cursor, Record, ResponseParser};
use crate::ParseError;
use serde_json::Value;

/// Parses JSON response bodies into records
#[derive(Debug, Clone)]
pub struct JsonRecordParser {
    records_key: String,
    cursor_key: String,
}

impl JsonRecordParser {
    pub fn new(records_key: impl Into<String>, cursor_key: impl Into<String>) -> Self {
        Self {
            records_key: records_key.into(),
            cursor_key: cursor_key.into(),
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.records_key.clone(), config.cursor_key.clone())
    }

    fn parse_value(&self, body: &str) -> Result<Value, ParseError> {
        serde_json::from_str(body).map_err(|e| ParseError::Malformed(e.to_string()))
    }
}

impl ResponseParser for JsonRecordParser {
    /// Extracts the record array
    ///
    /// A top-level array is the record set itself. A top-level object must
    /// hold an array under the configured records key; anything else is
    /// malformed. Either the whole array converts or the call fails.
    fn parse(&self, body: &str) -> Result<Vec<Record>, ParseError> {
        let value = self.parse_value(body)?;

        let records = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove(&self.records_key) {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(ParseError::Malformed(format!(
                        "'{}' is not an array",
                        self.records_key
                    )))
                }
                None => {
                    return Err(ParseError::Malformed(format!(
                        "missing records key '{}'",
                        self.records_key
                    )))
                }
            },
            _ => {
                return Err(ParseError::Malformed(
                    "expected a JSON array or object".to_string(),
                ))
            }
        };

        Ok(records.into_iter().map(Record::Json).collect())
    }

    /// Extracts the continuation cursor
    ///
    /// Only a top-level object can carry a cursor; a missing key, a JSON
    /// null, or an empty string all mean the sequence has ended. A cursor of
    /// any other non-string type is malformed.
    fn next_cursor(&self, body: &str) -> Result<Option<Cursor>, ParseError> {
        let value = self.parse_value(body)?;

        let map = match value {
            Value::Object(map) => map,
            _ => return Ok(None),
        };

        match map.get(&self.cursor_key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(cursor)) if cursor.is_empty() => Ok(None),
            Some(Value::String(cursor)) => Ok(Some(Cursor::new(cursor.clone()))),
            Some(_) => Err(ParseError::Malformed(format!(
                "cursor key '{}' is not a string",
                self.cursor_key
            ))),
        }
    }
}
