//! Chatwoot Reporting - Read-Only Conversation Analytics
//!
//! A Rust library for running canned analytical reports over a Chatwoot
//! conversation store (messages, conversations, contacts) and handing the
//! results back as tabular data.
//!
//! # Features
//!
//! - Lazy, read-only connection handling with fail-soft or strict failures
//! - Parameterized statements built from conjunctive filters
//! - Twelve canned reports (customer messages, agent latency, volumes, ...)
//! - Tabular results with typed deserialization and CSV/JSON rendering
//! - Layered configuration, structured logging and query metrics

/// Configuration management
pub mod config;
/// Connection lifecycle and statement execution
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Typed report rows
pub mod models;
/// Parameterized statement construction
pub mod query;
/// Canned report statements
pub mod reports;
/// Repository pattern for report access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Request dispatch over a repository
pub mod service;
/// Tabular query results
pub mod table;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::{DataAccess, FailurePolicy};
pub use error::{ReportError, Result};
pub use query::{Filter, FilterValue, Operator, QueryBuilder, SortOrder, Statement};
pub use reports::ContactLookup;
pub use repository::ConversationRepository;
pub use service::{ReportRequest, ReportService};
pub use table::{Record, Table};
