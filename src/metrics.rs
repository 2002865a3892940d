use metrics::{counter, histogram};
use std::time::Duration;

/// Running totals kept alongside the exported metrics.
///
/// `failures` is the only way to tell a fail-soft empty table from a genuinely
/// empty result without reading logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Statements attempted
    pub queries: u64,
    /// Statements that failed (connect, prepare or execute)
    pub failures: u64,
    /// Rows returned across successful statements
    pub rows: u64,
    /// Connection attempts
    pub connections: u64,
    /// Connection attempts that failed
    pub connection_failures: u64,
}

/// Metrics collection and management
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    pub queries_total: &'static str,
    pub query_errors_total: &'static str,
    pub query_duration: &'static str,
    pub query_rows: &'static str,
    pub connections_total: &'static str,
    stats: QueryStats,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            queries_total: "chatwoot_reports_queries_total",
            query_errors_total: "chatwoot_reports_query_errors_total",
            query_duration: "chatwoot_reports_query_duration_seconds",
            query_rows: "chatwoot_reports_query_rows",
            connections_total: "chatwoot_reports_connections_total",
            stats: QueryStats::default(),
        }
    }
}

impl MetricsCollector {
    /// Record one report statement
    pub fn record_query(&mut self, report: &str, duration: Duration, rows: usize, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(self.queries_total, "report" => report.to_owned(), "status" => status).increment(1);
        histogram!(self.query_duration, "report" => report.to_owned()).record(duration.as_secs_f64());

        self.stats.queries += 1;
        if success {
            #[allow(clippy::cast_precision_loss)]
            histogram!(self.query_rows, "report" => report.to_owned()).record(rows as f64);
            self.stats.rows += rows as u64;
        } else {
            counter!(self.query_errors_total, "report" => report.to_owned()).increment(1);
            self.stats.failures += 1;
        }
    }

    /// Record a connection attempt
    pub fn record_connection(&mut self, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(self.connections_total, "status" => status).increment(1);

        self.stats.connections += 1;
        if !success {
            self.stats.connection_failures += 1;
        }
    }

    /// Snapshot of the running totals
    #[must_use]
    pub const fn stats(&self) -> QueryStats {
        self.stats
    }
}
