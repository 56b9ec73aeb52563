use crate::{BoundStatement, PreparedStatement, Result, ResultSet};
use futures::future::BoxFuture;

/// Query preparation and execution, implemented by drivers.
///
/// A session is shared by every compiled binding created from it, so it is object safe and
/// usable from many threads at once.
pub trait Session: Send + Sync {
    /// Prepare a query template, exposing its bind variables.
    fn prepare<'s>(&'s self, query: &'s str) -> BoxFuture<'s, Result<PreparedStatement>>;

    /// Execute the statement, blocking the caller until the result is available.
    fn execute(&self, statement: BoundStatement) -> Result<ResultSet>;

    /// Start executing the statement and return a handle to its pending result.
    ///
    /// The returned future must not borrow the session.
    fn execute_async(&self, statement: BoundStatement) -> BoxFuture<'static, Result<ResultSet>>;
}
