//! PostgREST query construction.
//!
//! Every filter value is percent-encoded, so timestamps carrying `+` offsets and
//! free-text search terms survive the trip to the backend unchanged.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Canonical wire format for timestamps in filters and payloads.
pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Strips characters that would break PostgREST's `or=(...)`/`ilike` grammar.
pub fn sanitize_search(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '%' | '\\'))
        .collect::<String>()
        .trim()
        .to_string()
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.split_whitespace().collect::<Vec<_>>().join("");
        self
    }

    fn filter(mut self, column: &str, operator: &str, value: impl Display) -> Self {
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        self.filters
            .push((column.to_string(), format!("{}.{}", operator, encoded)));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    /// Case-insensitive substring match.
    pub fn ilike(mut self, column: &str, term: &str) -> Self {
        let term = urlencoding::encode(&sanitize_search(term)).into_owned();
        self.filters
            .push((column.to_string(), format!("ilike.*{}*", term)));
        self
    }

    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.filters
            .push((column.to_string(), format!("in.({})", encode_list(values))));
        self
    }

    pub fn not_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.filters
            .push((column.to_string(), format!("not.in.({})", encode_list(values))));
        self
    }

    /// Case-insensitive substring match on any of `columns`.
    pub fn any_ilike(mut self, columns: &[&str], term: &str) -> Self {
        let term = urlencoding::encode(&sanitize_search(term)).into_owned();
        let clauses = columns
            .iter()
            .map(|column| format!("{}.ilike.*{}*", column, term))
            .collect::<Vec<_>>()
            .join(",");
        self.filters.push(("or".to_string(), format!("({})", clauses)));
        self
    }

    /// Rows whose half-open `[start_column, end_column)` interval intersects
    /// `[start, end)`. Touching intervals do not match.
    pub fn overlapping(
        self,
        start_column: &str,
        end_column: &str,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Self {
        self.lt(start_column, timestamp(end))
            .gt(end_column, timestamp(start))
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order.push(format!("{}.{}", column, order.as_str()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn range(self, offset: u32, limit: u32) -> Self {
        self.offset(offset).limit(limit)
    }

    /// Query string without the select clause, as used by PATCH and DELETE.
    pub fn filter_string(&self) -> String {
        self.filters
            .iter()
            .map(|(column, expr)| format!("{}={}", column, expr))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn path(&self) -> String {
        let mut parts = vec![format!("select={}", self.select)];
        parts.extend(
            self.filters
                .iter()
                .map(|(column, expr)| format!("{}={}", column, expr)),
        );
        if !self.order.is_empty() {
            parts.push(format!("order={}", self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset={}", offset));
        }

        format!("/rest/v1/{}?{}", self.table, parts.join("&"))
    }

    pub fn mutation_path(&self) -> String {
        format!("/rest/v1/{}?{}", self.table, self.filter_string())
    }
}

fn encode_list<I, V>(values: I) -> String
where
    I: IntoIterator<Item = V>,
    V: Display,
{
    values
        .into_iter()
        .map(|v| urlencoding::encode(&v.to_string()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
