//! Typed report rows
//!
//! Each report's [`Table`](crate::table::Table) can be deserialized into the
//! matching struct here with [`Table::deserialize`](crate::table::Table::deserialize).
//! SQLite hands back booleans as `0/1`, timestamps as text and JSON columns as
//! strings, so the fields use the lenient helpers in [`de`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A customer-authored message with its contact and conversation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMessage {
    /// Message id
    pub id: i64,
    /// Message text
    pub content: Option<String>,
    /// When the message was sent
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Word count
    pub word_count: Option<i64>,
    /// Sentiment label
    pub sentiment: Option<Value>,
    /// Contact name
    pub customer_name: Option<String>,
    /// Contact phone number
    pub phone_number: Option<String>,
    /// External patient identifier
    pub cliniko_id: Option<String>,
    /// Status of the owning conversation
    pub conversation_status: Option<String>,
    /// Owning conversation
    pub conversation_id: i64,
}

/// A customer message in a single contact's thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Message text
    pub content: Option<String>,
    /// When the message was sent
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Word count
    pub word_count: Option<i64>,
    /// Owning conversation
    pub conversation_id: i64,
    /// Conversation status
    pub status: Option<String>,
    /// Sentiment label
    pub sentiment: Option<Value>,
}

/// Aggregate metrics for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPerformance {
    /// Agent display name
    pub agent_name: Option<String>,
    /// Messages sent
    pub total_messages: i64,
    /// Mean response latency in minutes
    pub avg_response_time: Option<f64>,
    /// Distinct conversations the agent wrote in
    pub conversations_handled: i64,
    /// Mean word count
    pub avg_message_length: Option<f64>,
}

/// A single agent reply latency sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTime {
    /// Agent display name
    pub agent_name: Option<String>,
    /// Latency in minutes
    pub response_time_minutes: f64,
    /// When the reply was sent
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Owning conversation
    pub conversation_id: i64,
}

/// One conversation with its counters and contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: i64,
    /// Status (open, resolved, ...)
    pub status: Option<String>,
    /// When the conversation started
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Total message count
    pub total_messages: Option<i64>,
    /// Customer message count
    pub customer_messages: Option<i64>,
    /// Agent message count
    pub agent_messages: Option<i64>,
    /// Mean response latency in minutes
    pub avg_response_time_minutes: Option<f64>,
    /// Contact name, absent when the conversation has no contact
    pub customer_name: Option<String>,
    /// Contact phone number
    pub phone_number: Option<String>,
    /// External patient identifier
    pub cliniko_id: Option<String>,
    /// Sender of the earliest agent message
    pub assigned_agent: Option<String>,
    /// Every distinct agent sender
    #[serde(default, with = "de::names")]
    pub agents: Vec<String>,
    /// Timestamp of the latest message
    #[serde(default, with = "de::optional_timestamp")]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl ConversationSummary {
    /// Agent candidates as a list
    #[must_use]
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(String::as_str).collect()
    }
}

/// A message within one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Message id
    pub id: i64,
    /// Message text
    pub content: Option<String>,
    /// Upstream message type code
    pub message_type: Option<i64>,
    /// Sender display name
    pub sender_name: Option<String>,
    /// When the message was sent
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Authored by the customer
    #[serde(with = "de::flag")]
    pub is_customer_message: bool,
    /// Authored by an agent
    #[serde(with = "de::flag")]
    pub is_agent_message: bool,
    /// Word count
    pub word_count: Option<i64>,
    /// Response latency in minutes
    pub response_time_minutes: Option<f64>,
    /// Owning conversation
    pub conversation_id: i64,
    /// Sentiment label
    pub sentiment: Option<Value>,
}

/// A contact record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Contact id
    pub id: i64,
    /// Display name
    pub name: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// External patient identifier
    pub cliniko_id: Option<String>,
    /// Free-form attributes
    #[serde(default, with = "de::attributes")]
    pub custom_attributes: Map<String, Value>,
    /// When the contact was created
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One conversation in a contact's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactConversation {
    /// Conversation id
    pub id: i64,
    /// Status
    pub status: Option<String>,
    /// When the conversation started
    #[serde(with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Total message count
    pub total_messages: Option<i64>,
    /// Mean response latency in minutes
    pub avg_response_time_minutes: Option<f64>,
    /// Contact name
    pub customer_name: Option<String>,
}

/// Message counts for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolume {
    /// Calendar date (UTC)
    pub date: NaiveDate,
    /// All messages
    pub total_messages: i64,
    /// Customer-authored messages
    pub customer_messages: i64,
    /// Agent-authored messages
    pub agent_messages: i64,
}

/// Share of conversations in one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    /// Status
    pub status: Option<String>,
    /// Conversations in this status
    pub count: i64,
    /// Percentage of all conversations, rounded to 2 places
    pub percentage: f64,
}

/// Whole-dataset totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    /// Conversations
    pub total_conversations: i64,
    /// Messages
    pub total_messages: i64,
    /// Earliest message, if any
    #[serde(default, with = "de::optional_timestamp")]
    pub earliest_message: Option<DateTime<Utc>>,
    /// Latest message, if any
    #[serde(default, with = "de::optional_timestamp")]
    pub latest_message: Option<DateTime<Utc>>,
}

/// Message count per author class (`customer`, `agent`, `system`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTypeCount {
    /// Author class
    pub message_type: String,
    /// Messages
    pub count: i64,
}

/// Overview, author breakdown and status distribution together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    /// Whole-dataset totals
    pub overview: StatsOverview,
    /// Message counts per author class
    pub message_types: Vec<MessageTypeCount>,
    /// Conversation status distribution
    pub status_distribution: Vec<StatusShare>,
}

/// Lenient serde adapters for values as SQLite returns them
pub mod de {
    use chrono::{DateTime, NaiveDateTime, Utc};

    const SQL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    /// Parse a timestamp in SQL or RFC 3339 form. Zone-less values are UTC.
    #[must_use]
    pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        SQL_FORMATS
            .iter()
            .find_map(|f| DateTime::parse_from_str(text, f).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                    .map(|naive| naive.and_utc())
            })
    }

    /// Required timestamp
    pub mod timestamp {
        use chrono::{DateTime, Utc};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        /// Serialize as RFC 3339
        pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&value.to_rfc3339())
        }

        /// Deserialize from SQL or RFC 3339 text
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
            let text = String::deserialize(deserializer)?;
            super::parse_timestamp(&text).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {text}")))
        }
    }

    /// Nullable timestamp
    pub mod optional_timestamp {
        use chrono::{DateTime, Utc};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        /// Serialize as RFC 3339 or null
        pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize from SQL or RFC 3339 text, or null
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => super::parse_timestamp(&text)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {text}"))),
                None => Ok(None),
            }
        }
    }

    /// Boolean stored as `true/false` or `0/1`
    pub mod flag {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        /// Serialize as a JSON boolean
        pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bool(*value)
        }

        /// Deserialize from a boolean or an integer
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
            match Value::deserialize(deserializer)? {
                Value::Bool(b) => Ok(b),
                Value::Number(n) => Ok(n.as_i64().is_some_and(|i| i != 0)),
                Value::Null => Ok(false),
                other => Err(D::Error::custom(format!("invalid flag: {other}"))),
            }
        }
    }

    /// Attribute map stored as a JSON object or a JSON-encoded string
    pub mod attributes {
        use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
        use serde_json::{Map, Value};

        /// Serialize as a JSON object
        pub fn serialize<S: Serializer>(value: &Map<String, Value>, serializer: S) -> Result<S::Ok, S::Error> {
            value.serialize(serializer)
        }

        /// Deserialize from an object, encoded object, or null
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String, Value>, D::Error> {
            match Value::deserialize(deserializer)? {
                Value::Object(map) => Ok(map),
                Value::Null => Ok(Map::new()),
                Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
                Value::String(text) => match serde_json::from_str::<Value>(&text).map_err(D::Error::custom)? {
                    Value::Object(map) => Ok(map),
                    Value::Null => Ok(Map::new()),
                    other => Err(D::Error::custom(format!("attributes are not an object: {other}"))),
                },
                other => Err(D::Error::custom(format!("attributes are not an object: {other}"))),
            }
        }
    }

    /// Name list stored as a JSON array or a JSON-encoded array
    pub mod names {
        use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
        use serde_json::Value;

        /// Serialize as a JSON array
        pub fn serialize<S: Serializer>(value: &[String], serializer: S) -> Result<S::Ok, S::Error> {
            value.serialize(serializer)
        }

        /// Deserialize from an array, encoded array, or null. Null entries are skipped.
        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
            let items = match Value::deserialize(deserializer)? {
                Value::Array(items) => items,
                Value::Null => return Ok(Vec::new()),
                Value::String(text) if text.trim().is_empty() => return Ok(Vec::new()),
                Value::String(text) => match serde_json::from_str::<Value>(&text).map_err(D::Error::custom)? {
                    Value::Array(items) => items,
                    Value::Null => return Ok(Vec::new()),
                    other => return Err(D::Error::custom(format!("names are not an array: {other}"))),
                },
                other => return Err(D::Error::custom(format!("names are not an array: {other}"))),
            };

            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(D::Error::custom(format!("name is not a string: {other}"))),
                })
                .collect()
        }
    }
}
