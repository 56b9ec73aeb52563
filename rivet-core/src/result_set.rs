use crate::{AsValue, Consistency, Context, Error, Result, Value};
use std::{collections::VecDeque, sync::Arc};
use uuid::Uuid;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .and_then(|i| self.values.get(i))
    }
    /// Convert the value of column `name`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::msg(format!("The row has no column `{}`", name)))?;
        T::try_from_value(value.clone()).with_context(|| format!("While reading column `{}`", name))
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// What the session did with a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionInfo {
    pub consistency: Option<Consistency>,
    pub fetch_size: Option<u32>,
    pub idempotent: Option<bool>,
    /// Set when the statement had tracing enabled.
    pub tracing_id: Option<Uuid>,
}

/// Raw outcome of an execution: labelled rows in the order the session produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    labels: RowNames,
    rows: VecDeque<Row>,
    info: ExecutionInfo,
}

impl ResultSet {
    pub fn new(labels: RowNames, rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            labels,
            rows: rows.into_iter().collect(),
            info: Default::default(),
        }
    }
    /// A result without columns, what modifying statements produce.
    pub fn empty() -> Self {
        Default::default()
    }
    pub fn with_info(mut self, info: ExecutionInfo) -> Self {
        self.info = info;
        self
    }
    pub fn info(&self) -> &ExecutionInfo {
        &self.info
    }
    pub fn labels(&self) -> &RowNames {
        &self.labels
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Remove and return the next row.
    pub fn one(&mut self) -> Option<RowLabeled> {
        self.rows
            .pop_front()
            .map(|v| RowLabeled::new(self.labels.clone(), v))
    }
    pub fn rows(&self) -> impl ExactSizeIterator<Item = RowLabeled> + '_ {
        self.rows
            .iter()
            .map(|v| RowLabeled::new(self.labels.clone(), v.clone()))
    }
}

impl IntoIterator for ResultSet {
    type Item = RowLabeled;
    type IntoIter = ResultSetIter;
    fn into_iter(self) -> Self::IntoIter {
        ResultSetIter {
            labels: self.labels,
            rows: self.rows.into_iter(),
        }
    }
}

pub struct ResultSetIter {
    labels: RowNames,
    rows: std::collections::vec_deque::IntoIter<Row>,
}

impl Iterator for ResultSetIter {
    type Item = RowLabeled;
    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|v| RowLabeled::new(self.labels.clone(), v))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for ResultSetIter {}
