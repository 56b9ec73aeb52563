use crate::{
    BindTarget, CodecRegistry, ConfigurationError, EntityMapper, Error, ExecutionOptions,
    MappingManager, MethodDescriptor, ParameterBinder, ParameterSpec, PreparedStatement,
    QuerySchema, Result, Session, TypeDescriptor, truncate_long,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Whether the caller blocks on the execution or receives a pending handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Sync,
    Async,
}

/// How a method's declared return type maps to an execution and return strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// Execute synchronously, return nothing.
    Void,
    /// Return the bound statement without executing it.
    RawStatement,
    /// Execute synchronously, return the raw result set.
    RawResultSync,
    /// Execute asynchronously, return the pending raw result set.
    RawResultAsync,
    /// Map the rows and return exactly one entity.
    MappedOne(Mode),
    /// Map the rows and return all of them.
    MappedAll(Mode),
}

impl ResultShape {
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            ResultShape::RawResultAsync
                | ResultShape::MappedOne(Mode::Async)
                | ResultShape::MappedAll(Mode::Async)
        )
    }
}

/// Result of classifying a declared return type: the shape and, for the mapped shapes,
/// the name of the entity to map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Classification {
    pub shape: ResultShape,
    pub entity: Option<String>,
}

impl Classification {
    fn raw(shape: ResultShape) -> Self {
        Self {
            shape,
            entity: None,
        }
    }
}

/// Collection wrappers whose single type argument is the mapped entity.
const COLLECTIONS: &[&str] = &["Vec", "MappedResult"];

/// Classify a declared return type. Depends on nothing but `ty`.
///
/// ```rust
/// use rivet_core::{Mode, ResultShape, TypeDescriptor, classify};
/// let ty = TypeDescriptor::parse("Pending<Vec<User>>").unwrap();
/// let classification = classify(&ty).unwrap();
/// assert_eq!(classification.shape, ResultShape::MappedAll(Mode::Async));
/// assert_eq!(classification.entity.as_deref(), Some("User"));
/// ```
pub fn classify(ty: &TypeDescriptor) -> Result<Classification> {
    match ty {
        TypeDescriptor::Unit => Ok(Classification::raw(ResultShape::Void)),
        TypeDescriptor::ResultSet => Ok(Classification::raw(ResultShape::RawResultSync)),
        TypeDescriptor::Statement => Ok(Classification::raw(ResultShape::RawStatement)),
        TypeDescriptor::ResultSetFuture => Ok(Classification::raw(ResultShape::RawResultAsync)),
        TypeDescriptor::Future(inner) => {
            if **inner == TypeDescriptor::ResultSet {
                return Ok(Classification::raw(ResultShape::RawResultAsync));
            }
            classify_mapped(inner, Mode::Async)
        }
        _ => classify_mapped(ty, Mode::Sync),
    }
}

fn classify_mapped(ty: &TypeDescriptor, mode: Mode) -> Result<Classification> {
    let (shape, entity) = match ty {
        TypeDescriptor::Generic { name, arguments }
            if COLLECTIONS.contains(&name.as_str()) && arguments.len() == 1 =>
        {
            (ResultShape::MappedAll(mode), &arguments[0])
        }
        _ => (ResultShape::MappedOne(mode), ty),
    };
    let Some(entity) = entity.concrete_name() else {
        return Err(Error::msg(format!(
            "Cannot map the return type `{}`, `{}` is not a concrete entity type",
            ty, entity
        )));
    };
    Ok(Classification {
        shape,
        entity: Some(entity.to_owned()),
    })
}

#[derive(Clone)]
pub(crate) enum Completion {
    Void,
    RawStatement,
    RawResultSync,
    RawResultAsync,
    MappedOne(Mode, Arc<dyn EntityMapper>),
    MappedAll(Mode, Arc<dyn EntityMapper>),
}

impl Completion {
    fn shape(&self) -> ResultShape {
        match self {
            Completion::Void => ResultShape::Void,
            Completion::RawStatement => ResultShape::RawStatement,
            Completion::RawResultSync => ResultShape::RawResultSync,
            Completion::RawResultAsync => ResultShape::RawResultAsync,
            Completion::MappedOne(mode, ..) => ResultShape::MappedOne(*mode),
            Completion::MappedAll(mode, ..) => ResultShape::MappedAll(*mode),
        }
    }
}

/// Everything an invocation needs, fixed at compile time and never mutated afterwards.
///
/// Shareable between threads, concurrent invocations allocate their own statements.
#[derive(Clone)]
pub struct CompiledBinding {
    pub(crate) method: Arc<str>,
    pub(crate) prepared: PreparedStatement,
    pub(crate) binders: Arc<[ParameterBinder]>,
    pub(crate) options: ExecutionOptions,
    pub(crate) completion: Completion,
    pub(crate) session: Arc<dyn Session>,
}

impl CompiledBinding {
    pub fn method(&self) -> &str {
        &self.method
    }
    pub fn prepared(&self) -> &PreparedStatement {
        &self.prepared
    }
    pub fn binders(&self) -> &[ParameterBinder] {
        &self.binders
    }
    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }
    pub fn shape(&self) -> ResultShape {
        self.completion.shape()
    }
    /// Name of the entity the rows are mapped to, for the mapped shapes.
    pub fn entity_name(&self) -> Option<&'static str> {
        match &self.completion {
            Completion::MappedOne(_, mapper) | Completion::MappedAll(_, mapper) => {
                Some(mapper.entity_name())
            }
            _ => None,
        }
    }
}

impl Debug for CompiledBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("method", &self.method)
            .field("query", &self.prepared.query())
            .field("binders", &self.binders)
            .field("options", &self.options)
            .field("shape", &self.shape())
            .field("entity", &self.entity_name())
            .finish()
    }
}

/// Turns method declarations and prepared queries into [`CompiledBinding`]s.
#[derive(Clone)]
pub struct BindingCompiler {
    session: Arc<dyn Session>,
    mapping: Arc<MappingManager>,
    codecs: Arc<CodecRegistry>,
}

impl BindingCompiler {
    pub fn new(session: Arc<dyn Session>, mapping: Arc<MappingManager>) -> Self {
        Self {
            session,
            mapping,
            codecs: Default::default(),
        }
    }
    pub fn with_codecs(mut self, codecs: Arc<CodecRegistry>) -> Self {
        self.codecs = codecs;
        self
    }
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Validate the method against the prepared query and fix its dispatch.
    ///
    /// Every failure is a [`ConfigurationError`] naming the method.
    pub fn compile(
        &self,
        method: &MethodDescriptor,
        prepared: PreparedStatement,
        parameters: &[ParameterSpec],
        options: ExecutionOptions,
    ) -> Result<CompiledBinding> {
        let fail = |message: String| {
            let error = ConfigurationError::new(method.name(), message);
            log::error!("{}", error);
            Error::new(error)
        };
        validate_parameters(method, prepared.variables()).map_err(fail)?;
        let binders = self
            .binders(method, prepared.variables(), parameters)
            .map_err(fail)?;
        let classification = classify(method.return_type()).map_err(|e| {
            fail(format!(
                "Cannot map return of method {}: {:#}",
                method.name(),
                e
            ))
        })?;
        let mapper = classification
            .entity
            .as_deref()
            .map(|entity| self.mapping.mapper_for(entity))
            .transpose()
            .map_err(|e| {
                fail(format!(
                    "Cannot map return of method {} to `{}`: {:#}",
                    method.name(),
                    method.return_type(),
                    e
                ))
            })?;
        let completion = match (classification.shape, mapper) {
            (ResultShape::Void, _) => Completion::Void,
            (ResultShape::RawStatement, _) => Completion::RawStatement,
            (ResultShape::RawResultSync, _) => Completion::RawResultSync,
            (ResultShape::RawResultAsync, _) => Completion::RawResultAsync,
            (ResultShape::MappedOne(mode), Some(mapper)) => Completion::MappedOne(mode, mapper),
            (ResultShape::MappedAll(mode), Some(mapper)) => Completion::MappedAll(mode, mapper),
            (shape, None) => {
                return Err(fail(format!(
                    "Method {} has the shape {:?} but no entity to map",
                    method.name(),
                    shape
                )));
            }
        };
        log::debug!(
            "Compiled method `{}` as {:?} for `{}`",
            method.name(),
            completion.shape(),
            truncate_long!(prepared.query())
        );
        Ok(CompiledBinding {
            method: method.name().into(),
            prepared,
            binders: binders.into(),
            options,
            completion,
            session: self.session.clone(),
        })
    }

    fn binders(
        &self,
        method: &MethodDescriptor,
        variables: &QuerySchema,
        parameters: &[ParameterSpec],
    ) -> std::result::Result<Vec<ParameterBinder>, String> {
        if parameters.len() > method.parameters().len() {
            return Err(format!(
                "Method {} declares {} parameters but {} parameter specifications were given",
                method.name(),
                method.parameters().len(),
                parameters.len()
            ));
        }
        let default = ParameterSpec::default();
        method
            .parameters()
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                let spec = parameters.get(i).unwrap_or(&default);
                let target = match &spec.name {
                    Some(name) => {
                        if !variables.contains(name) {
                            return Err(format!(
                                "Parameter `{}` of method {} binds to `{}`, which is not a bind variable of the query",
                                parameter.name,
                                method.name(),
                                name
                            ));
                        }
                        BindTarget::Name(name.clone())
                    }
                    None => BindTarget::Index(i),
                };
                let codec = spec
                    .codec
                    .as_deref()
                    .map(|name| self.codecs.codec(name))
                    .transpose()
                    .map_err(|e| {
                        format!(
                            "Parameter `{}` of method {}: {:#}",
                            parameter.name,
                            method.name(),
                            e
                        )
                    })?;
                Ok(ParameterBinder::new(target, parameter.ty.clone(), codec))
            })
            .collect()
    }
}

/// Checks the method parameters against the query's bind variables.
fn validate_parameters(
    method: &MethodDescriptor,
    variables: &QuerySchema,
) -> std::result::Result<(), String> {
    if method.is_variadic() {
        return Err(format!(
            "Invalid variadic method {} in accessor",
            method.name()
        ));
    }
    let unique = variables.unique_names().len();
    let count = method.parameters().len();
    if count < unique {
        return Err(format!(
            "Not enough arguments for method {}, found {} but it should be at least the number of unique bind parameter names in the query ({})",
            method.name(),
            count,
            unique
        ));
    }
    if count > variables.len() {
        return Err(format!(
            "Too many arguments for method {}, found {} but it should be at most the number of bind parameters in the query ({})",
            method.name(),
            count,
            variables.len()
        ));
    }
    Ok(())
}
