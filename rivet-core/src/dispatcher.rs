use crate::{
    AnyEntity, BoundStatement, CompiledBinding, Entity, Error, MappedResult, Mode, Result,
    ResultSet, Value, compiler::Completion, map_all_fn, map_one_fn, mapper::downcast,
    truncate_long,
};
use futures::{
    FutureExt, TryFutureExt,
    future::{self, BoxFuture},
};
use std::{
    fmt::{self, Debug, Formatter},
    pin::Pin,
    task::{Context, Poll},
};

/// Handle to the result of an asynchronous invocation.
///
/// Resolves to [`Outcome::ResultSet`], [`Outcome::One`] or [`Outcome::All`]. Cancellation is
/// dropping the handle.
pub struct Pending(BoxFuture<'static, Result<Outcome>>);

impl Pending {
    pub fn new(future: impl Future<Output = Result<Outcome>> + Send + 'static) -> Self {
        Self(future.boxed())
    }
    /// A handle that already failed.
    pub fn failed(error: Error) -> Self {
        Self::new(future::ready(Err(error)))
    }
}

impl Future for Pending {
    type Output = Result<Outcome>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.poll_unpin(cx)
    }
}

impl Debug for Pending {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Pending")
    }
}

/// What an invocation returns, one variant per result shape family.
pub enum Outcome {
    Unit,
    Statement(BoundStatement),
    ResultSet(ResultSet),
    One(AnyEntity),
    All(MappedResult),
    Pending(Pending),
}

impl Outcome {
    fn kind(&self) -> &'static str {
        match self {
            Outcome::Unit => "unit",
            Outcome::Statement(..) => "statement",
            Outcome::ResultSet(..) => "result set",
            Outcome::One(..) => "single entity",
            Outcome::All(..) => "entity collection",
            Outcome::Pending(..) => "pending result",
        }
    }
    fn unexpected(&self, expected: &str) -> Error {
        Error::msg(format!(
            "Expected the invocation to return a {} but it returned a {}",
            expected,
            self.kind()
        ))
    }
    pub fn into_unit(self) -> Result<()> {
        match self {
            Outcome::Unit => Ok(()),
            v => Err(v.unexpected("unit")),
        }
    }
    pub fn into_statement(self) -> Result<BoundStatement> {
        match self {
            Outcome::Statement(v) => Ok(v),
            v => Err(v.unexpected("statement")),
        }
    }
    pub fn into_result_set(self) -> Result<ResultSet> {
        match self {
            Outcome::ResultSet(v) => Ok(v),
            v => Err(v.unexpected("result set")),
        }
    }
    pub fn into_one<E: Entity>(self) -> Result<E> {
        match self {
            Outcome::One(v) => downcast::<E>(v, E::entity_name()),
            v => Err(v.unexpected("single entity")),
        }
    }
    pub fn into_mapped(self) -> Result<MappedResult> {
        match self {
            Outcome::All(v) => Ok(v),
            v => Err(v.unexpected("entity collection")),
        }
    }
    pub fn into_all<E: Entity>(self) -> Result<Vec<E>> {
        self.into_mapped()?.into_vec()
    }
    pub fn into_pending(self) -> Result<Pending> {
        match self {
            Outcome::Pending(v) => Ok(v),
            v => Err(v.unexpected("pending result")),
        }
    }
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(..))
    }
}

impl Debug for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unit => f.write_str("Unit"),
            Outcome::Statement(v) => f.debug_tuple("Statement").field(v).finish(),
            Outcome::ResultSet(v) => f.debug_tuple("ResultSet").field(v).finish(),
            Outcome::One(..) => f.write_str("One(..)"),
            Outcome::All(v) => f.debug_tuple("All").field(v).finish(),
            Outcome::Pending(v) => v.fmt(f),
        }
    }
}

impl CompiledBinding {
    /// Bind the arguments to a fresh statement and apply the execution options.
    pub fn bind(&self, arguments: Vec<Value>) -> Result<BoundStatement> {
        if arguments.len() != self.binders.len() {
            return Err(Error::msg(format!(
                "Method {} takes {} arguments but {} were given",
                self.method,
                self.binders.len(),
                arguments.len()
            )));
        }
        let mut statement = self.prepared.bind();
        for (i, (binder, argument)) in self.binders.iter().zip(arguments).enumerate() {
            binder.bind(&mut statement, argument).map_err(|e| {
                e.context(format!(
                    "While binding argument {} of method {}",
                    i, self.method
                ))
            })?;
        }
        self.options.apply(&mut statement);
        Ok(statement)
    }

    /// Execute the method with the given arguments and shape the result as declared.
    ///
    /// Asynchronous shapes return immediately with [`Outcome::Pending`], their failures
    /// (binding included) are delivered through the handle.
    pub fn invoke(&self, arguments: Vec<Value>) -> Result<Outcome> {
        let statement = match self.bind(arguments) {
            Ok(v) => v,
            Err(e) if self.shape().is_async() => return Ok(Outcome::Pending(Pending::failed(e))),
            Err(e) => return Err(e),
        };
        if log::log_enabled!(log::Level::Trace) {
            let text = statement.to_string();
            log::trace!(
                "Invoking method `{}` as {:?}: {}",
                self.method,
                self.shape(),
                truncate_long!(text)
            );
        }
        let session = &self.session;
        Ok(match &self.completion {
            Completion::Void => {
                session.execute(statement)?;
                Outcome::Unit
            }
            Completion::RawStatement => Outcome::Statement(statement),
            Completion::RawResultSync => Outcome::ResultSet(session.execute(statement)?),
            Completion::RawResultAsync => Outcome::Pending(Pending::new(
                session.execute_async(statement).map_ok(Outcome::ResultSet),
            )),
            Completion::MappedOne(Mode::Sync, mapper) => {
                Outcome::One(mapper.map(session.execute(statement)?)?.one()?)
            }
            Completion::MappedAll(Mode::Sync, mapper) => {
                Outcome::All(mapper.map(session.execute(statement)?)?)
            }
            Completion::MappedOne(Mode::Async, mapper) => {
                let transform = map_one_fn(mapper.clone());
                Outcome::Pending(Pending::new(
                    session
                        .execute_async(statement)
                        .map(transform)
                        .map_ok(Outcome::One),
                ))
            }
            Completion::MappedAll(Mode::Async, mapper) => {
                let transform = map_all_fn(mapper.clone());
                Outcome::Pending(Pending::new(
                    session
                        .execute_async(statement)
                        .map(transform)
                        .map_ok(Outcome::All),
                ))
            }
        })
    }
}

/// Free function form of [`CompiledBinding::invoke`].
pub fn invoke(binding: &CompiledBinding, arguments: Vec<Value>) -> Result<Outcome> {
    binding.invoke(arguments)
}
