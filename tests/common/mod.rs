//! Shared SQLite fixture for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// Who wrote a seeded message
#[derive(Debug, Clone, Copy)]
pub enum Author {
    Customer,
    Agent,
    System,
}

/// A message row to insert
pub struct MessageRow<'a> {
    pub id: i64,
    pub conversation_id: i64,
    pub content: &'a str,
    pub sender: Option<&'a str>,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub response_time_minutes: Option<f64>,
}

/// In-memory database with the reporting schema and no rows
pub fn empty_schema() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(SCHEMA).expect("create schema");
    conn
}

pub fn insert_contact(
    conn: &Connection,
    id: i64,
    name: &str,
    phone: &str,
    cliniko_id: Option<&str>,
    created_at: DateTime<Utc>,
) {
    conn.execute(
        "INSERT INTO chatwoot_contacts (id, name, phone_number, email, cliniko_id, custom_attributes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            name,
            phone,
            format!("{}@example.com", name.to_lowercase()),
            cliniko_id,
            r#"{"clinic":"north"}"#,
            created_at
        ],
    )
    .expect("insert contact");
}

pub fn insert_conversation(conn: &Connection, id: i64, contact_id: Option<i64>, status: &str, created_at: DateTime<Utc>) {
    conn.execute(
        "INSERT INTO chatwoot_conversations (id, contact_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, contact_id, status, created_at],
    )
    .expect("insert conversation");
}

pub fn insert_message(conn: &Connection, row: &MessageRow<'_>) {
    let (message_type, customer, agent) = match row.author {
        Author::Customer => (0, 1, 0),
        Author::Agent => (1, 0, 1),
        Author::System => (2, 0, 0),
    };
    let word_count = i64::try_from(row.content.split_whitespace().count()).expect("word count");

    conn.execute(
        "INSERT INTO chatwoot_messages
            (id, conversation_id, content, message_type, sender_name, created_at,
             is_customer_message, is_agent_message, word_count, response_time_minutes, sentiment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL)",
        params![
            row.id,
            row.conversation_id,
            row.content,
            message_type,
            row.sender,
            row.created_at,
            customer,
            agent,
            word_count,
            row.response_time_minutes
        ],
    )
    .expect("insert message");
}

/// Refresh the denormalized counters on every conversation
pub fn refresh_counters(conn: &Connection) {
    conn.execute_batch(
        "UPDATE chatwoot_conversations SET
            total_messages = (SELECT COUNT(*) FROM chatwoot_messages m WHERE m.conversation_id = chatwoot_conversations.id),
            customer_messages = (SELECT COUNT(*) FROM chatwoot_messages m
                                 WHERE m.conversation_id = chatwoot_conversations.id AND m.is_customer_message = 1),
            agent_messages = (SELECT COUNT(*) FROM chatwoot_messages m
                              WHERE m.conversation_id = chatwoot_conversations.id AND m.is_agent_message = 1),
            avg_response_time_minutes = (SELECT AVG(response_time_minutes) FROM chatwoot_messages m
                                         WHERE m.conversation_id = chatwoot_conversations.id);",
    )
    .expect("refresh counters");
}

/// Populate the standard dataset relative to `now`.
///
/// Contacts: Ada (PT-1), Ben (no external id), Cy (PT-3).
/// Conversations: 10 resolved (Ada), 11 open (Ben), 12 open (Ada), 13 pending (Cy).
/// Ten messages: four customer, five agent, one system.
pub fn seed(conn: &Connection, now: DateTime<Utc>) {
    let days = |d: i64| now - Duration::days(d);
    let mins = |base: DateTime<Utc>, m: i64| base + Duration::minutes(m);

    insert_contact(conn, 1, "Ada", "+61400000001", Some("PT-1"), days(10));
    insert_contact(conn, 2, "Ben", "+61400000002", None, days(5));
    insert_contact(conn, 3, "Cy", "+61400000003", Some("PT-3"), days(1));

    insert_conversation(conn, 10, Some(1), "resolved", days(9));
    insert_conversation(conn, 11, Some(2), "open", days(4));
    insert_conversation(conn, 12, Some(1), "open", days(2));
    insert_conversation(conn, 13, Some(3), "pending", now - Duration::hours(1));

    let rows = [
        (100, 10, "My knee hurts", Some("Ada"), Author::Customer, days(9), None),
        (101, 10, "Book in Tuesday?", Some("Sam"), Author::Agent, mins(days(9), 30), Some(30.0)),
        (102, 10, "Thanks", Some("Ada"), Author::Customer, mins(days(9), 60), None),
        (103, 11, "Invoice question", Some("Ben"), Author::Customer, days(4), None),
        (104, 11, "Sent it over", Some("Jo"), Author::Agent, mins(days(4), 10), Some(10.0)),
        (105, 11, "Following up", Some("Sam"), Author::Agent, mins(days(4), 20), None),
        (106, 12, "Reschedule please", Some("Ada"), Author::Customer, days(2), None),
        (107, 12, "Done", Some("Jo"), Author::Agent, mins(days(2), 5), Some(5.0)),
        (108, 13, "Conversation opened", None, Author::System, now - Duration::minutes(60), None),
        (109, 13, "We will reply shortly", Some("Bot"), Author::Agent, now - Duration::minutes(50), None),
    ];

    for (id, conversation_id, content, sender, author, created_at, response_time_minutes) in rows {
        insert_message(
            conn,
            &MessageRow {
                id,
                conversation_id,
                content,
                sender,
                author,
                created_at,
                response_time_minutes,
            },
        );
    }

    refresh_counters(conn);
}

/// In-memory database holding the standard dataset
pub fn seeded(now: DateTime<Utc>) -> Connection {
    let conn = empty_schema();
    seed(&conn, now);
    conn
}

/// File-backed database holding the standard dataset; returns its `sqlite:` URL
pub fn seeded_file(dir: &std::path::Path, now: DateTime<Utc>) -> String {
    let path = dir.join("chatwoot.db");
    let conn = Connection::open(&path).expect("create database file");
    conn.execute_batch(SCHEMA).expect("create schema");
    seed(&conn, now);
    drop(conn);
    format!("sqlite:{}", path.display())
}
