//! The data accessor: connection lifecycle and statement execution.

use std::time::Duration;

use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, error, info, warn};

use crate::config::{DatabaseConfig, ReportConfig};
use crate::error::{ReportError, Result};
use crate::logging::OperationTimer;
use crate::metrics::{MetricsCollector, QueryStats};
use crate::query::Statement;
use crate::table::{sql_to_json, Record, Table};

/// What report methods do with connection and execution failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and return an empty table
    #[default]
    FailSoft,
    /// Return the failure to the caller
    Strict,
}

/// Read-only accessor over the Chatwoot reporting schema.
///
/// Holds at most one connection. It is opened on [`connect`](Self::connect),
/// or lazily by the first statement, and released on
/// [`disconnect`](Self::disconnect) or drop. Not meant to be shared between
/// threads.
pub struct DataAccess {
    database_url: String,
    connection: Option<Connection>,
    policy: FailurePolicy,
    busy_timeout: Duration,
    pub(crate) defaults: ReportConfig,
    metrics: MetricsCollector,
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccess")
            .field("database_url", &redact(&self.database_url))
            .field("connected", &self.connection.is_some())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DataAccess {
    /// Create an accessor for a connection string. Does not connect.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            connection: None,
            policy: FailurePolicy::default(),
            busy_timeout: Duration::from_secs(5),
            defaults: ReportConfig::default(),
            metrics: MetricsCollector::default(),
        }
    }

    /// Create an accessor from configuration
    #[must_use]
    pub fn from_config(database: &DatabaseConfig, reports: ReportConfig) -> Self {
        let policy = if database.fail_soft {
            FailurePolicy::FailSoft
        } else {
            FailurePolicy::Strict
        };
        Self::new(database.url.clone())
            .with_policy(policy)
            .with_busy_timeout(Duration::from_secs(database.busy_timeout_secs))
            .with_report_defaults(reports)
    }

    /// Wrap an already open connection
    #[must_use]
    pub fn with_connection(connection: Connection) -> Self {
        let url = connection.path().unwrap_or(":memory:").to_string();
        let mut access = Self::new(url);
        access.connection = Some(connection);
        access
    }

    /// Set the failure policy
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set how long to wait on a locked database
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the default windows for reports that require one
    #[must_use]
    pub const fn with_report_defaults(mut self, defaults: ReportConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// The active failure policy
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Running query and connection totals
    #[must_use]
    pub const fn query_stats(&self) -> QueryStats {
        self.metrics.stats()
    }

    /// True while a connection is held
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the connection, replacing any held one.
    pub fn try_connect(&mut self) -> Result<()> {
        self.disconnect();

        let path = resolve_path(&self.database_url);
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let opened = Connection::open_with_flags(path, flags).and_then(|conn| {
            conn.busy_timeout(self.busy_timeout)?;
            Ok(conn)
        });

        match opened {
            Ok(conn) => {
                self.metrics.record_connection(true);
                info!(database = %redact(&self.database_url), "Connected to database");
                self.connection = Some(conn);
                Ok(())
            },
            Err(e) => {
                self.metrics.record_connection(false);
                Err(ReportError::Connection(e.to_string()))
            },
        }
    }

    /// Open the connection. Failures are logged and reported as `false`.
    pub fn connect(&mut self) -> bool {
        match self.try_connect() {
            Ok(()) => true,
            Err(e) => {
                error!(database = %redact(&self.database_url), error = %e, "Database connection failed");
                false
            },
        }
    }

    /// Release the connection if one is held. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            match conn.close() {
                Ok(()) => info!("Disconnected from database"),
                Err((_, e)) => warn!(error = %e, "Error while closing database connection"),
            }
        }
    }

    fn connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            self.try_connect()?;
        }
        self.connection
            .as_ref()
            .ok_or_else(|| ReportError::Connection("no connection available".to_string()))
    }

    fn fetch(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&statement.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (index, name) in columns.iter().enumerate() {
                record.insert(name.clone(), sql_to_json(row.get_ref(index)?));
            }
            records.push(record);
        }

        Ok(records)
    }

    fn execute_named(&mut self, report: &str, statement: &Statement) -> Result<Vec<Record>> {
        let timer = OperationTimer::new(report);
        let result = self.fetch(statement);
        let elapsed = timer.finish();

        match &result {
            Ok(records) => self.metrics.record_query(report, elapsed, records.len(), true),
            Err(_) => self.metrics.record_query(report, elapsed, 0, false),
        }
        result
    }

    /// Run a statement, connecting first if needed, and return the cause on failure.
    pub fn try_execute_query(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        self.execute_named("query", statement)
    }

    /// Run a statement, connecting first if needed.
    ///
    /// Any failure is logged and yields an empty vector, so an error is
    /// indistinguishable from "no rows" here; check
    /// [`query_stats`](Self::query_stats) or use
    /// [`try_execute_query`](Self::try_execute_query) to tell them apart.
    pub fn execute_query(&mut self, statement: &Statement) -> Vec<Record> {
        self.try_execute_query(statement).unwrap_or_else(|e| {
            error!(error = %e, sql = %abbreviate(&statement.sql), "Query execution failed");
            Vec::new()
        })
    }

    /// Run a statement and materialize the rows as a table.
    pub fn try_get_table(&mut self, statement: &Statement) -> Result<Table> {
        self.try_execute_query(statement).map(Table::from_records)
    }

    /// Run a statement and materialize the rows as a table, empty on failure.
    pub fn get_table(&mut self, statement: &Statement) -> Table {
        Table::from_records(self.execute_query(statement))
    }

    /// Run a named report under the failure policy
    pub(crate) fn run_report(&mut self, report: &str, statement: &Statement) -> Result<Table> {
        match self.execute_named(report, statement) {
            Ok(records) => Ok(Table::from_records(records)),
            Err(e) if self.policy == FailurePolicy::FailSoft && e.is_infrastructure() => {
                error!(report, error = %e, "Report query failed; returning empty table");
                Ok(Table::empty())
            },
            Err(e) => Err(e),
        }
    }
}

impl Drop for DataAccess {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Strip the `sqlite:` scheme from a connection string.
///
/// `file:` URIs and bare paths are passed through unchanged.
#[must_use]
pub fn resolve_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Hide any `user:password@` section of a connection string
fn redact(database_url: &str) -> String {
    match (database_url.find("://"), database_url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &database_url[..scheme_end], &database_url[at..])
        },
        _ => database_url.to_string(),
    }
}

fn abbreviate(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 50 {
        format!("{}...", flat.chars().take(50).collect::<String>())
    } else {
        flat
    }
}
