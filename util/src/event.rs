use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub type Row = Map<String, Value>;

/// A batch of row changes of one table, as delivered by the change-data-capture stream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dml {
    #[serde(default)]
    pub destination: Option<String>,
    pub database: String,
    pub table: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub data: Vec<Row>,
    /// previous values of changed columns, only set for updates
    #[serde(default)]
    pub old: Option<Vec<Row>>,
    /// commit time at the source in millis
    #[serde(default)]
    pub es: Option<i64>,
}

impl Dml {
    pub fn new<D: AsRef<str>, T: AsRef<str>>(database: D, table: T, event_type: EventType) -> Self {
        Dml {
            destination: None,
            database: database.as_ref().to_string(),
            table: table.as_ref().to_string(),
            event_type,
            data: vec![],
            old: None,
            es: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Insert,
    Update,
    Delete,
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Insert => f.write_str("INSERT"),
            EventType::Update => f.write_str("UPDATE"),
            EventType::Delete => f.write_str("DELETE"),
        }
    }
}
