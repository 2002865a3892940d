//! Database schema definitions
//!
//! Constants for the table and column names of the Chatwoot reporting schema.
//! The schema is owned upstream; nothing here creates or migrates it.

/// Contacts table schema
pub mod contacts {
    /// Table name
    pub const TABLE: &str = "chatwoot_contacts";
    /// Primary key column
    pub const ID: &str = "id";
    /// Display name column
    pub const NAME: &str = "name";
    /// Phone number column
    pub const PHONE_NUMBER: &str = "phone_number";
    /// Email address column
    pub const EMAIL: &str = "email";
    /// External (Cliniko) patient identifier column
    pub const CLINIKO_ID: &str = "cliniko_id";
    /// Free-form attribute map column (JSON)
    pub const CUSTOM_ATTRIBUTES: &str = "custom_attributes";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
}

/// Conversations table schema
pub mod conversations {
    /// Table name
    pub const TABLE: &str = "chatwoot_conversations";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to contacts table
    pub const CONTACT_ID: &str = "contact_id";
    /// Status column (open, resolved, ...)
    pub const STATUS: &str = "status";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Total message count column
    pub const TOTAL_MESSAGES: &str = "total_messages";
    /// Customer message count column
    pub const CUSTOMER_MESSAGES: &str = "customer_messages";
    /// Agent message count column
    pub const AGENT_MESSAGES: &str = "agent_messages";
    /// Average response latency column (minutes)
    pub const AVG_RESPONSE_TIME_MINUTES: &str = "avg_response_time_minutes";
}

/// Messages table schema
pub mod messages {
    /// Table name
    pub const TABLE: &str = "chatwoot_messages";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to conversations table
    pub const CONVERSATION_ID: &str = "conversation_id";
    /// Message text column
    pub const CONTENT: &str = "content";
    /// Upstream message type column
    pub const MESSAGE_TYPE: &str = "message_type";
    /// Sender display name column
    pub const SENDER_NAME: &str = "sender_name";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Flag set when the customer authored the message
    pub const IS_CUSTOMER_MESSAGE: &str = "is_customer_message";
    /// Flag set when an agent authored the message
    pub const IS_AGENT_MESSAGE: &str = "is_agent_message";
    /// Word count column
    pub const WORD_COUNT: &str = "word_count";
    /// Response latency column (minutes, nullable)
    pub const RESPONSE_TIME_MINUTES: &str = "response_time_minutes";
    /// Sentiment label column
    pub const SENTIMENT: &str = "sentiment";
}

/// Qualify a column with a table alias, e.g. `qualified("m", "id")` is `m.id`.
#[must_use]
pub fn qualified(alias: &str, column: &str) -> String {
    format!("{alias}.{column}")
}
