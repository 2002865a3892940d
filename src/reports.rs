//! Statement construction for every supported report.
//!
//! Each function validates its arguments, applies its filters in a fixed
//! order and returns a [`Statement`] ready for the accessor. Recency windows
//! are measured back from `now` and compared with a strict `>`.

use chrono::{DateTime, Duration, Utc};

use crate::error::{ReportError, Result};
use crate::query::{Filter, QueryBuilder, SortOrder, Statement};
use crate::schema::{contacts, conversations, messages, qualified};
use crate::validation::InputValidator;

const CUSTOMER_MESSAGES: &str = "
    SELECT
        m.id,
        m.content,
        m.created_at,
        m.word_count,
        m.sentiment,
        c.name AS customer_name,
        c.phone_number,
        c.cliniko_id,
        conv.status AS conversation_status,
        m.conversation_id
    FROM chatwoot_messages m
    JOIN chatwoot_conversations conv ON m.conversation_id = conv.id
    JOIN chatwoot_contacts c ON conv.contact_id = c.id";

const CUSTOMER_MESSAGES_BY_CONTACT: &str = "
    SELECT
        m.content,
        m.created_at,
        m.word_count,
        conv.id AS conversation_id,
        conv.status,
        m.sentiment
    FROM chatwoot_messages m
    JOIN chatwoot_conversations conv ON m.conversation_id = conv.id
    JOIN chatwoot_contacts c ON conv.contact_id = c.id";

const AGENT_PERFORMANCE: &str = "
    SELECT
        m.sender_name AS agent_name,
        COUNT(*) AS total_messages,
        AVG(m.response_time_minutes) AS avg_response_time,
        COUNT(DISTINCT m.conversation_id) AS conversations_handled,
        AVG(m.word_count) AS avg_message_length
    FROM chatwoot_messages m";

const RESPONSE_TIMES: &str = "
    SELECT
        m.sender_name AS agent_name,
        m.response_time_minutes,
        m.created_at,
        conv.id AS conversation_id
    FROM chatwoot_messages m
    JOIN chatwoot_conversations conv ON m.conversation_id = conv.id";

// assigned_agent is the earliest agent sender; agents is a JSON array of every candidate.
const CONVERSATION_SUMMARY: &str = "
    SELECT
        conv.id,
        conv.status,
        conv.created_at,
        conv.total_messages,
        conv.customer_messages,
        conv.agent_messages,
        conv.avg_response_time_minutes,
        c.name AS customer_name,
        c.phone_number,
        c.cliniko_id,
        (SELECT am.sender_name FROM chatwoot_messages am
         WHERE am.conversation_id = conv.id AND am.is_agent_message = TRUE
         ORDER BY am.created_at ASC, am.id ASC
         LIMIT 1) AS assigned_agent,
        (SELECT json_group_array(DISTINCT am.sender_name) FROM chatwoot_messages am
         WHERE am.conversation_id = conv.id AND am.is_agent_message = TRUE
           AND am.sender_name IS NOT NULL) AS agents,
        (SELECT MAX(lm.created_at) FROM chatwoot_messages lm
         WHERE lm.conversation_id = conv.id) AS last_message_at
    FROM chatwoot_conversations conv
    LEFT JOIN chatwoot_contacts c ON conv.contact_id = c.id";

const CONVERSATION_MESSAGES: &str = "
    SELECT
        m.id,
        m.content,
        m.message_type,
        m.sender_name,
        m.created_at,
        m.is_customer_message,
        m.is_agent_message,
        m.word_count,
        m.response_time_minutes,
        m.conversation_id,
        m.sentiment
    FROM chatwoot_messages m";

const CONTACTS: &str = "
    SELECT
        id,
        name,
        phone_number,
        email,
        cliniko_id,
        custom_attributes,
        created_at
    FROM chatwoot_contacts";

const CONTACT_CONVERSATION_HISTORY: &str = "
    SELECT
        conv.id,
        conv.status,
        conv.created_at,
        conv.total_messages,
        conv.avg_response_time_minutes,
        c.name AS customer_name
    FROM chatwoot_conversations conv
    JOIN chatwoot_contacts c ON conv.contact_id = c.id";

const DAILY_MESSAGE_VOLUME: &str = "
    SELECT
        DATE(created_at) AS date,
        COUNT(*) AS total_messages,
        COUNT(CASE WHEN is_customer_message THEN 1 END) AS customer_messages,
        COUNT(CASE WHEN is_agent_message THEN 1 END) AS agent_messages
    FROM chatwoot_messages";

const STATUS_DISTRIBUTION: &str = "
    SELECT
        status,
        COUNT(*) AS count,
        ROUND(COUNT(*) * 100.0 / SUM(COUNT(*)) OVER (), 2) AS percentage
    FROM chatwoot_conversations";

const STATS_OVERVIEW: &str = "
    SELECT
        COUNT(DISTINCT conv.id) AS total_conversations,
        COUNT(m.id) AS total_messages,
        MIN(m.created_at) AS earliest_message,
        MAX(m.created_at) AS latest_message
    FROM chatwoot_conversations conv
    LEFT JOIN chatwoot_messages m ON conv.id = m.conversation_id";

const AUTHOR_CLASS: &str =
    "CASE WHEN is_customer_message THEN 'customer' WHEN is_agent_message THEN 'agent' ELSE 'system' END";

/// How a contact-scoped report finds its contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactLookup {
    /// By external (Cliniko) patient identifier
    ExternalId(String),
    /// By phone number
    Phone(String),
}

impl ContactLookup {
    /// Choose a lookup from optional identifiers.
    ///
    /// Blank values count as missing. When both are given the external
    /// identifier wins. Neither is an [`ReportError::InvalidArgument`], and so
    /// is a value carrying control characters.
    pub fn from_parts(external_id: Option<&str>, phone_number: Option<&str>) -> Result<Self> {
        if let Some(external_id) = non_blank(external_id) {
            InputValidator::validate_external_id(external_id)?;
            if non_blank(phone_number).is_some() {
                tracing::debug!("Both identifiers supplied; using external identifier");
            }
            return Ok(Self::ExternalId(external_id.trim().to_string()));
        }

        if let Some(phone) = non_blank(phone_number) {
            InputValidator::validate_phone(phone)?;
            return Ok(Self::Phone(phone.trim().to_string()));
        }

        Err(ReportError::InvalidArgument(
            "Must provide either an external contact identifier or a phone number".to_string(),
        ))
    }

    fn filter(&self) -> Filter {
        match self {
            Self::ExternalId(id) => Filter::eq(qualified("c", contacts::CLINIKO_ID), id.as_str()),
            Self::Phone(phone) => Filter::eq(qualified("c", contacts::PHONE_NUMBER), phone.as_str()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(InputValidator::sanitize_text)
        .filter(|v| !v.is_empty())
}

/// Optional windows and limits treat zero as "not set"
fn optional_window(days_back: Option<u32>) -> Result<Option<u32>> {
    match days_back.filter(|d| *d > 0) {
        Some(days) => {
            InputValidator::validate_days_back(days)?;
            Ok(Some(days))
        },
        None => Ok(None),
    }
}

fn cutoff(now: DateTime<Utc>, days_back: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days_back))
}

/// Customer-authored messages, newest first, optionally windowed and limited
pub fn customer_messages(limit: Option<u32>, days_back: Option<u32>, now: DateTime<Utc>) -> Result<Statement> {
    let mut query = QueryBuilder::new(CUSTOMER_MESSAGES);
    query.add_filter(Filter::eq(qualified("m", messages::IS_CUSTOMER_MESSAGE), true));

    if let Some(days) = optional_window(days_back)? {
        query.add_filter(Filter::gt(qualified("m", messages::CREATED_AT), cutoff(now, days)));
    }

    query.set_order_by(qualified("m", messages::CREATED_AT), SortOrder::Descending);

    if let Some(limit) = limit.filter(|l| *l > 0) {
        query.set_limit(u64::from(limit));
    }

    Ok(query.build())
}

/// One contact's customer messages, oldest first
pub fn customer_messages_by_contact(lookup: &ContactLookup) -> Statement {
    let mut query = QueryBuilder::new(CUSTOMER_MESSAGES_BY_CONTACT);
    query
        .add_filter(Filter::eq(qualified("m", messages::IS_CUSTOMER_MESSAGE), true))
        .add_filter(lookup.filter())
        .set_order_by(qualified("m", messages::CREATED_AT), SortOrder::Ascending);
    query.build()
}

/// Per-agent aggregates, fastest average response first (agents without
/// latency data last)
#[must_use]
pub fn agent_performance() -> Statement {
    let mut query = QueryBuilder::new(AGENT_PERFORMANCE);
    query
        .add_filter(Filter::eq(qualified("m", messages::IS_AGENT_MESSAGE), true))
        .set_group_by(qualified("m", messages::SENDER_NAME))
        .set_order_by("AVG(m.response_time_minutes) IS NULL, avg_response_time", SortOrder::Ascending);
    query.build()
}

/// Agent reply latencies inside a window, newest first
pub fn response_times(agent_name: Option<&str>, days_back: u32, now: DateTime<Utc>) -> Result<Statement> {
    InputValidator::validate_days_back(days_back)?;

    let mut query = QueryBuilder::new(RESPONSE_TIMES);
    query
        .add_filter(Filter::eq(qualified("m", messages::IS_AGENT_MESSAGE), true))
        .add_filter(Filter::is_not_null(qualified("m", messages::RESPONSE_TIME_MINUTES)))
        .add_filter(Filter::gt(qualified("m", messages::CREATED_AT), cutoff(now, days_back)));

    if let Some(agent) = present(agent_name) {
        InputValidator::validate_name(&agent)?;
        query.add_filter(Filter::eq(qualified("m", messages::SENDER_NAME), agent));
    }

    query.set_order_by(qualified("m", messages::CREATED_AT), SortOrder::Descending);
    Ok(query.build())
}

/// Conversations with counters and contact details, newest first
pub fn conversation_summary(status: Option<&str>, days_back: Option<u32>, now: DateTime<Utc>) -> Result<Statement> {
    let mut query = QueryBuilder::new(CONVERSATION_SUMMARY);

    if let Some(status) = present(status) {
        InputValidator::validate_status(&status)?;
        query.add_filter(Filter::eq(qualified("conv", conversations::STATUS), status));
    }

    if let Some(days) = optional_window(days_back)? {
        query.add_filter(Filter::gt(qualified("conv", conversations::CREATED_AT), cutoff(now, days)));
    }

    query.set_order_by(qualified("conv", conversations::CREATED_AT), SortOrder::Descending);
    Ok(query.build())
}

/// Every message of one conversation, oldest first
#[must_use]
pub fn conversation_messages(conversation_id: i64) -> Statement {
    let mut query = QueryBuilder::new(CONVERSATION_MESSAGES);
    query
        .add_filter(Filter::eq(qualified("m", messages::CONVERSATION_ID), conversation_id))
        .set_order_by(qualified("m", messages::CREATED_AT), SortOrder::Ascending);
    query.build()
}

/// Contacts, newest first, optionally split on external identifier presence
#[must_use]
pub fn contacts(has_external_id: Option<bool>) -> Statement {
    let mut query = QueryBuilder::new(CONTACTS);
    match has_external_id {
        Some(true) => {
            query.add_filter(Filter::is_not_null(contacts::CLINIKO_ID));
        },
        Some(false) => {
            query.add_filter(Filter::is_null(contacts::CLINIKO_ID));
        },
        None => {},
    }
    query.set_order_by(contacts::CREATED_AT, SortOrder::Descending);
    query.build()
}

/// One contact's conversations, newest first
pub fn contact_conversation_history(lookup: &ContactLookup) -> Statement {
    let mut query = QueryBuilder::new(CONTACT_CONVERSATION_HISTORY);
    query
        .add_filter(lookup.filter())
        .set_order_by(qualified("conv", conversations::CREATED_AT), SortOrder::Descending);
    query.build()
}

/// Messages per calendar day inside a window, newest day first
pub fn daily_message_volume(days_back: u32, now: DateTime<Utc>) -> Result<Statement> {
    InputValidator::validate_days_back(days_back)?;

    let mut query = QueryBuilder::new(DAILY_MESSAGE_VOLUME);
    query
        .add_filter(Filter::gt(messages::CREATED_AT, cutoff(now, days_back)))
        .set_group_by(format!("DATE({})", messages::CREATED_AT))
        .set_order_by("date", SortOrder::Descending);
    Ok(query.build())
}

/// Count and percentage share per conversation status, largest first
#[must_use]
pub fn conversation_status_distribution() -> Statement {
    let mut query = QueryBuilder::new(STATUS_DISTRIBUTION);
    query
        .set_group_by(conversations::STATUS)
        .set_order_by("count", SortOrder::Descending);
    query.build()
}

/// Whole-dataset conversation and message totals
#[must_use]
pub fn stats_overview() -> Statement {
    QueryBuilder::new(STATS_OVERVIEW).build()
}

/// Message counts per author class, largest first
#[must_use]
pub fn message_type_breakdown() -> Statement {
    // Grouped by the expression: the table has its own message_type column.
    let mut query = QueryBuilder::new(format!(
        "SELECT {AUTHOR_CLASS} AS message_type, COUNT(*) AS count FROM {}",
        messages::TABLE
    ));
    query
        .set_group_by(AUTHOR_CLASS)
        .set_order_by("count", SortOrder::Descending);
    query.build()
}
