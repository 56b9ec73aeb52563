use crate::{Assignment, Command, Operand, parse_command, scan_variables};
use futures::{FutureExt, future::BoxFuture};
use rivet_core::{
    AsValue, BoundStatement, Context, Error, ExecutionInfo, PreparedStatement, Result, ResultSet, Row,
    RowNames, Session, Value, truncate_long,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use uuid::Uuid;

/// Answers the executions of one query in place of the built-in tables.
pub type Handler = Arc<dyn Fn(&BoundStatement) -> Result<ResultSet> + Send + Sync>;

#[derive(Default)]
struct Table {
    columns: RowNames,
    rows: Vec<Row>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Table>,
    commands: HashMap<String, Command>,
    handlers: HashMap<String, Handler>,
    executed: Vec<BoundStatement>,
    prepared: usize,
}

/// Session keeping its tables in memory.
///
/// Understands `INSERT INTO t (..) VALUES (..)`, `SELECT * | columns FROM t [WHERE ..] [LIMIT ..]`,
/// `UPDATE t SET .. [WHERE ..]` and `DELETE FROM t [WHERE ..]`, with conditions made of
/// `column = value` joined by `AND`. Any other query needs a handler registered with
/// [`MemorySession::on`]. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Default::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| Error::msg(format!("The memory session state is poisoned: {}", e)))
    }

    /// Answer the executions of `query` with `handler`.
    pub fn on(
        &self,
        query: impl Into<String>,
        handler: impl Fn(&BoundStatement) -> Result<ResultSet> + Send + Sync + 'static,
    ) -> Result<&Self> {
        self.state()?.handlers.insert(query.into(), Arc::new(handler));
        Ok(self)
    }

    /// Every statement executed so far, in execution order.
    pub fn executed(&self) -> Result<Vec<BoundStatement>> {
        Ok(self.state()?.executed.clone())
    }

    /// Number of queries prepared so far.
    pub fn prepared_count(&self) -> Result<usize> {
        Ok(self.state()?.prepared)
    }

    /// Current rows of `table`.
    pub fn rows(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self
            .state()?
            .tables
            .get(table)
            .map(|v| v.rows.clone())
            .unwrap_or_default())
    }

    fn run(&self, statement: &BoundStatement) -> Result<ResultSet> {
        let handler = {
            let mut state = self.state()?;
            state.executed.push(statement.clone());
            state.handlers.get(statement.query()).cloned()
        };
        if let Some(handler) = handler {
            return handler(statement);
        }
        let mut state = self.state()?;
        let command = match state.commands.get(statement.query()) {
            Some(command) => command.clone(),
            None => parse_command(statement.query())
                .map(|(command, _)| command)
                .with_context(|| {
                    format!(
                        "The memory session cannot execute `{}` and no handler is registered for it",
                        truncate_long!(statement.query())
                    )
                })?,
        };
        match command {
            Command::Insert { table, values } => {
                let table = state.tables.entry(table).or_insert_with(|| Table {
                    columns: values.iter().map(|v| v.column.clone()).collect(),
                    rows: Vec::new(),
                });
                let mut row: Row = vec![Value::Null; table.columns.len()].into();
                for Assignment { column, operand } in &values {
                    let index = column_index(&table.columns, column)?;
                    row[index] = resolve(statement, operand)?;
                }
                table.rows.push(row);
                Ok(ResultSet::empty())
            }
            Command::Select {
                table,
                columns,
                filter,
                limit,
            } => {
                let table = existing(&state, &table)?;
                let filter = conditions(statement, &table.columns, &filter)?;
                let projection = match &columns {
                    Some(columns) => columns
                        .iter()
                        .map(|v| column_index(&table.columns, v))
                        .collect::<Result<Vec<_>>>()?,
                    None => (0..table.columns.len()).collect(),
                };
                let limit = match &limit {
                    Some(limit) => {
                        let limit = i64::try_from_value(resolve(statement, limit)?)
                            .context("While reading LIMIT")?;
                        usize::try_from(limit)
                            .map_err(|_| Error::msg(format!("Invalid LIMIT {}", limit)))?
                    }
                    None => usize::MAX,
                };
                let labels: RowNames = projection
                    .iter()
                    .map(|i| table.columns[*i].clone())
                    .collect();
                let rows = table
                    .rows
                    .iter()
                    .filter(|row| matches(row, &filter))
                    .take(limit)
                    .map(|row| projection.iter().map(|i| row[*i].clone()).collect::<Row>())
                    .collect::<Vec<_>>();
                Ok(ResultSet::new(labels, rows))
            }
            Command::Update {
                table,
                values,
                filter,
            } => {
                let table = state
                    .tables
                    .get_mut(&table)
                    .ok_or_else(|| Error::msg(format!("Unknown table `{}`", table)))?;
                let filter = conditions(statement, &table.columns, &filter)?;
                let values = conditions(statement, &table.columns, &values)?;
                for row in table.rows.iter_mut().filter(|row| matches(row, &filter)) {
                    for (index, value) in &values {
                        row[*index] = value.clone();
                    }
                }
                Ok(ResultSet::empty())
            }
            Command::Delete { table, filter } => {
                let Some(table) = state.tables.get_mut(&table) else {
                    return Ok(ResultSet::empty());
                };
                let filter = conditions(statement, &table.columns, &filter)?;
                table.rows.retain(|row| !matches(row, &filter));
                Ok(ResultSet::empty())
            }
        }
    }
}

fn existing<'s>(state: &'s MemoryState, table: &str) -> Result<&'s Table> {
    state
        .tables
        .get(table)
        .ok_or_else(|| Error::msg(format!("Unknown table `{}`", table)))
}

fn column_index(columns: &[String], column: &str) -> Result<usize> {
    columns
        .iter()
        .position(|v| v == column)
        .ok_or_else(|| Error::msg(format!("Unknown column `{}`", column)))
}

fn resolve(statement: &BoundStatement, operand: &Operand) -> Result<Value> {
    match operand {
        Operand::Literal(v) => Ok(v.clone()),
        Operand::Slot(slot) => statement.value(*slot).cloned().ok_or_else(|| {
            let name = statement
                .variables()
                .get(*slot)
                .map(|v| v.name.as_str())
                .unwrap_or_default();
            Error::msg(format!("The bind variable `{}` ({}) is not set", name, slot))
        }),
    }
}

/// Resolved `(column index, value)` pairs.
fn conditions(
    statement: &BoundStatement,
    columns: &[String],
    assignments: &[Assignment],
) -> Result<Vec<(usize, Value)>> {
    assignments
        .iter()
        .map(|v| Ok((column_index(columns, &v.column)?, resolve(statement, &v.operand)?)))
        .collect()
}

fn matches(row: &Row, filter: &[(usize, Value)]) -> bool {
    filter.iter().all(|(index, value)| {
        let stored = &row[*index];
        !stored.is_null()
            && value
                .clone()
                .cast_to(&stored.as_null())
                .is_ok_and(|v| v == *stored)
    })
}

impl Session for MemorySession {
    fn prepare<'s>(&'s self, query: &'s str) -> BoxFuture<'s, Result<PreparedStatement>> {
        async move {
            let variables = match parse_command(query) {
                Ok((command, variables)) => {
                    self.state()?.commands.insert(query.to_owned(), command);
                    variables
                }
                Err(e) => {
                    log::debug!(
                        "The memory session only scans the placeholders of `{}`: {:#}",
                        truncate_long!(query),
                        e
                    );
                    scan_variables(query)?
                }
            };
            self.state()?.prepared += 1;
            Ok(PreparedStatement::new(query, variables))
        }
        .boxed()
    }

    fn execute(&self, statement: BoundStatement) -> Result<ResultSet> {
        let info = ExecutionInfo {
            consistency: statement.consistency(),
            fetch_size: statement.fetch_size(),
            idempotent: statement.idempotent(),
            tracing_id: statement.is_tracing().then(Uuid::new_v4),
        };
        let result = self.run(&statement).map_err(|e| {
            let error = e.context(format!("While executing `{}`", statement));
            log::error!("{:#}", error);
            error
        })?;
        Ok(result.with_info(info))
    }

    fn execute_async(&self, statement: BoundStatement) -> BoxFuture<'static, Result<ResultSet>> {
        let session = self.clone();
        async move {
            tokio::task::yield_now().await;
            session.execute(statement)
        }
        .boxed()
    }
}
