//! Structured query construction.
//!
//! A [`QueryBuilder`] starts from a base `SELECT ... FROM ... JOIN ...` and
//! appends conjunctive filters, grouping, ordering and a limit. Every value is
//! bound as a positional parameter (`?1`, `?2`, ...) in the order the filters
//! were added, with the limit bound last.

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value};

/// Value types for filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Timestamp value
    Timestamp(DateTime<Utc>),
    /// NULL value
    Null,
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Text(v) => v.to_sql(),
            Self::Integer(v) => v.to_sql(),
            Self::Float(v) => v.to_sql(),
            Self::Boolean(v) => v.to_sql(),
            Self::Timestamp(v) => v.to_sql(),
            Self::Null => Ok(ToSqlOutput::Owned(Value::Null)),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Comparison operators for filters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    /// Equality (=)
    Equal,
    /// Inequality (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// IS NULL, binds nothing
    IsNull,
    /// IS NOT NULL, binds nothing
    IsNotNull,
}

impl Operator {
    /// SQL spelling of the operator
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes a bound parameter
    #[must_use]
    pub const fn binds_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// A filter condition for database queries
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column expression to filter on
    pub field: String,
    /// Comparison operator
    pub operator: Operator,
    /// Value to compare against
    pub value: FilterValue,
}

impl Filter {
    /// Create a filter from its parts
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Operator::Equal, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, Operator::GreaterThan, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::IsNull,
            value: FilterValue::Null,
        }
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::IsNotNull,
            value: FilterValue::Null,
        }
    }

    fn render(&self, placeholder: Option<usize>) -> String {
        match placeholder {
            Some(index) => format!("{} {} ?{}", self.field, self.operator.symbol(), index),
            None => format!("{} {}", self.field, self.operator.symbol()),
        }
    }
}

/// Sort direction for `ORDER BY`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest / smallest first
    Ascending,
    /// Newest / largest first
    Descending,
}

impl SortOrder {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// A fully rendered SQL statement with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with positional placeholders
    pub sql: String,
    /// Parameters, in placeholder order
    pub params: Vec<FilterValue>,
}

impl Statement {
    /// Wrap hand-written SQL and its parameters
    pub fn raw(sql: impl Into<String>, params: Vec<FilterValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Query builder for constructing database queries
///
/// The base SQL must not contain a top-level `WHERE`; filters supply it.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// `SELECT ... FROM ...` prefix
    pub base: String,
    /// List of filters to apply, joined with AND
    pub filters: Vec<Filter>,
    /// Expression to group by
    pub group_by: Option<String>,
    /// Expression and direction to order by
    pub order_by: Option<(String, SortOrder)>,
    /// Maximum number of results to return
    pub limit: Option<u64>,
}

impl QueryBuilder {
    /// Create a builder over a base `SELECT ... FROM ...` clause
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    /// Add a filter condition to the query
    pub fn add_filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Set the expression to group by
    pub fn set_group_by(&mut self, expr: impl Into<String>) -> &mut Self {
        self.group_by = Some(expr.into());
        self
    }

    /// Set the expression to order results by
    pub fn set_order_by(&mut self, expr: impl Into<String>, order: SortOrder) -> &mut Self {
        self.order_by = Some((expr.into(), order));
        self
    }

    /// Set the maximum number of results to return
    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Render the SQL text and collect parameters
    #[must_use]
    pub fn build(&self) -> Statement {
        let mut sql = self.base.trim_end().to_string();
        let mut params = Vec::new();

        for (i, filter) in self.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            if filter.operator.binds_value() {
                params.push(filter.value.clone());
                sql.push_str(&filter.render(Some(params.len())));
            } else {
                sql.push_str(&filter.render(None));
            }
        }

        if let Some(group_by) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }

        if let Some((expr, order)) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {expr} {}", order.keyword()));
        }

        // Ordering is applied before truncation.
        if let Some(limit) = self.limit {
            params.push(FilterValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        Statement { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_has_no_where() {
        let stmt = QueryBuilder::new("SELECT id FROM t").build();
        assert_eq!(stmt.sql, "SELECT id FROM t");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_filters_are_conjunctive_and_numbered() {
        let mut query = QueryBuilder::new("SELECT id FROM t\n   ");
        query
            .add_filter(Filter::eq("a", true))
            .add_filter(Filter::is_not_null("b"))
            .add_filter(Filter::gt("c", 5_i64));
        let stmt = query.build();
        assert_eq!(stmt.sql, "SELECT id FROM t WHERE a = ?1 AND b IS NOT NULL AND c > ?2");
        assert_eq!(stmt.params, vec![FilterValue::Boolean(true), FilterValue::Integer(5)]);
    }

    #[test]
    fn test_order_then_limit() {
        let mut query = QueryBuilder::new("SELECT id FROM t");
        query
            .add_filter(Filter::eq("kind", "x"))
            .set_order_by("created_at", SortOrder::Descending)
            .set_limit(10);
        let stmt = query.build();
        assert_eq!(stmt.sql, "SELECT id FROM t WHERE kind = ?1 ORDER BY created_at DESC LIMIT ?2");
        assert_eq!(stmt.params.last(), Some(&FilterValue::Integer(10)));
    }

    #[test]
    fn test_group_by_precedes_order_by() {
        let mut query = QueryBuilder::new("SELECT status, COUNT(*) AS count FROM t");
        query.set_group_by("status").set_order_by("count", SortOrder::Descending);
        assert_eq!(
            query.build().sql,
            "SELECT status, COUNT(*) AS count FROM t GROUP BY status ORDER BY count DESC"
        );
    }
}
