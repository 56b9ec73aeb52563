use crate::{Codec, Consistency, Context, Error, QuerySchema, Result, Value, truncate_long};
use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// A query template prepared by a session.
///
/// Cheap to clone, every clone shares the query text and the bind variable schema.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    query: Arc<str>,
    variables: Arc<QuerySchema>,
}

impl PreparedStatement {
    pub fn new(query: impl Into<Arc<str>>, variables: QuerySchema) -> Self {
        Self {
            query: query.into(),
            variables: variables.into(),
        }
    }
    pub fn query(&self) -> &str {
        &self.query
    }
    pub fn variables(&self) -> &QuerySchema {
        &self.variables
    }
    /// A fresh statement with every slot unset.
    pub fn bind(&self) -> BoundStatement {
        BoundStatement {
            prepared: self.clone(),
            values: vec![None; self.variables.len()].into(),
            consistency: None,
            fetch_size: None,
            tracing: false,
            idempotent: None,
        }
    }
}

impl Display for PreparedStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.query))
    }
}

/// A prepared statement carrying the values of its bind variables and its execution options.
///
/// Binding methods return `&mut Self` for fluent chaining:
/// ```rust,ignore
/// statement.bind_index(0, 42.into(), &Value::Int32(None))?.bind_name("status", "active".into(), &Value::Varchar(None))?;
/// ```
#[derive(Debug, Clone)]
pub struct BoundStatement {
    prepared: PreparedStatement,
    values: Box<[Option<Value>]>,
    consistency: Option<Consistency>,
    fetch_size: Option<u32>,
    tracing: bool,
    idempotent: Option<bool>,
}

impl BoundStatement {
    pub fn prepared(&self) -> &PreparedStatement {
        &self.prepared
    }
    pub fn query(&self) -> &str {
        self.prepared.query()
    }
    pub fn variables(&self) -> &QuerySchema {
        self.prepared.variables()
    }

    /// Bind the value at slot `index` (from 0), converting it to the semantic type `ty`.
    pub fn bind_index(&mut self, index: usize, value: Value, ty: &Value) -> Result<&mut Self> {
        let value = value
            .cast_to(ty)
            .with_context(|| format!("While binding the variable at index {}", index))?;
        self.set(index, value)
    }

    /// Bind the value at slot `index` encoding it with `codec`.
    pub fn bind_index_with(
        &mut self,
        index: usize,
        value: Value,
        codec: &dyn Codec,
    ) -> Result<&mut Self> {
        let value = codec.encode(value).with_context(|| {
            format!(
                "While encoding the variable at index {} with codec `{}`",
                index,
                codec.name()
            )
        })?;
        self.set(index, value)
    }

    /// Bind the value to every slot called `name`.
    pub fn bind_name(&mut self, name: &str, value: Value, ty: &Value) -> Result<&mut Self> {
        let value = value
            .cast_to(ty)
            .with_context(|| format!("While binding the variable `{}`", name))?;
        self.set_all(name, value)
    }

    /// Bind the value to every slot called `name` encoding it with `codec`.
    pub fn bind_name_with(
        &mut self,
        name: &str,
        value: Value,
        codec: &dyn Codec,
    ) -> Result<&mut Self> {
        let value = codec.encode(value).with_context(|| {
            format!(
                "While encoding the variable `{}` with codec `{}`",
                name,
                codec.name()
            )
        })?;
        self.set_all(name, value)
    }

    fn set_all(&mut self, name: &str, value: Value) -> Result<&mut Self> {
        let indices = self.variables().indices_of(name).collect::<Vec<_>>();
        if indices.is_empty() {
            return Err(Error::msg(format!(
                "The statement `{}` has no bind variable named `{}`",
                self.prepared, name
            )));
        }
        for index in indices {
            self.set(index, value.clone())?;
        }
        Ok(self)
    }

    fn set(&mut self, index: usize, value: Value) -> Result<&mut Self> {
        let Some(variable) = self.prepared.variables().get(index) else {
            return Err(Error::msg(format!(
                "Index {} is out of range, the statement `{}` has {} bind variables",
                index,
                self.prepared,
                self.values.len()
            )));
        };
        let value = value.cast_to(&variable.ty).with_context(|| {
            format!(
                "The bind variable `{}` expects {}",
                variable.name,
                variable.ty.type_name()
            )
        })?;
        self.values[index] = Some(value);
        Ok(self)
    }

    /// Bound values by slot, `None` for the slots not bound yet.
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }
    /// Value of the first slot called `name`.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.variables()
            .indices_of(name)
            .next()
            .and_then(|i| self.value(i))
    }
    pub fn is_fully_bound(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn set_consistency(&mut self, consistency: Consistency) -> &mut Self {
        self.consistency = Some(consistency);
        self
    }
    pub fn consistency(&self) -> Option<Consistency> {
        self.consistency
    }
    pub fn set_fetch_size(&mut self, fetch_size: u32) -> &mut Self {
        self.fetch_size = Some(fetch_size);
        self
    }
    pub fn fetch_size(&self) -> Option<u32> {
        self.fetch_size
    }
    pub fn enable_tracing(&mut self) -> &mut Self {
        self.tracing = true;
        self
    }
    pub fn is_tracing(&self) -> bool {
        self.tracing
    }
    pub fn set_idempotent(&mut self, idempotent: bool) -> &mut Self {
        self.idempotent = Some(idempotent);
        self
    }
    pub fn idempotent(&self) -> Option<bool> {
        self.idempotent
    }
}

impl Display for BoundStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.prepared.fmt(f)?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_str(" [")?;
        for (i, (variable, value)) in self
            .variables()
            .variables()
            .iter()
            .zip(self.values.iter())
            .enumerate()
        {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{}: {}", variable.name, value)?,
                None => write!(f, "{}: <unset>", variable.name)?,
            }
        }
        f.write_str("]")
    }
}
