use crate::{
    BindingCompiler, CodecRegistry, CompiledBinding, Context, Error, ExecutionOptions,
    MappingManager, MethodDescriptor, Outcome, ParameterSpec, Result, Session, Value,
};
use std::{collections::HashMap, sync::Arc};

/// One method of an accessor: its signature, its query and how to bind and run it.
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub descriptor: MethodDescriptor,
    pub query: String,
    pub parameters: Vec<ParameterSpec>,
    pub options: ExecutionOptions,
}

impl MethodDeclaration {
    pub fn new(descriptor: MethodDescriptor, query: impl Into<String>) -> Self {
        Self {
            descriptor,
            query: query.into(),
            parameters: Vec::new(),
            options: Default::default(),
        }
    }
    /// Parse the signature, see [`MethodDescriptor::parse`].
    pub fn parse(signature: &str, query: impl Into<String>) -> Result<Self> {
        Ok(Self::new(MethodDescriptor::parse(signature)?, query))
    }
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = ParameterSpec>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }
    pub fn options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }
}

/// Collects the declarations of an accessor, see [`Accessor::builder`].
pub struct AccessorBuilder {
    session: Arc<dyn Session>,
    mapping: Arc<MappingManager>,
    codecs: Arc<CodecRegistry>,
    defaults: ExecutionOptions,
    methods: Vec<MethodDeclaration>,
}

impl AccessorBuilder {
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs.into();
        self
    }
    /// Options used by every method for the fields it leaves unset.
    pub fn default_options(mut self, options: ExecutionOptions) -> Self {
        self.defaults = options;
        self
    }
    pub fn method(mut self, method: MethodDeclaration) -> Self {
        self.methods.push(method);
        self
    }

    /// Prepare every query and compile every method, stopping at the first failure.
    pub async fn build(self) -> Result<Accessor> {
        let compiler = BindingCompiler::new(self.session.clone(), self.mapping)
            .with_codecs(self.codecs);
        let mut bindings = HashMap::with_capacity(self.methods.len());
        for method in self.methods {
            let name = method.descriptor.name().to_owned();
            if bindings.contains_key(&name) {
                let error = Error::msg(format!("The method `{}` is declared twice", name));
                log::error!("{:#}", error);
                return Err(error);
            }
            let prepared = self
                .session
                .prepare(&method.query)
                .await
                .with_context(|| format!("While preparing the query of method `{}`", name))?;
            let binding = compiler.compile(
                &method.descriptor,
                prepared,
                &method.parameters,
                method.options.or(self.defaults),
            )?;
            bindings.insert(name, binding);
        }
        Ok(Accessor { bindings })
    }
}

/// A set of compiled methods sharing a session, invoked by name.
#[derive(Debug, Clone)]
pub struct Accessor {
    bindings: HashMap<String, CompiledBinding>,
}

impl Accessor {
    pub fn builder(session: Arc<dyn Session>, mapping: MappingManager) -> AccessorBuilder {
        AccessorBuilder {
            session,
            mapping: mapping.into(),
            codecs: Default::default(),
            defaults: Default::default(),
            methods: Vec::new(),
        }
    }
    pub fn binding(&self, method: &str) -> Option<&CompiledBinding> {
        self.bindings.get(method)
    }
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
    pub fn invoke(&self, method: &str, arguments: Vec<Value>) -> Result<Outcome> {
        let Some(binding) = self.bindings.get(method) else {
            let error = Error::msg(format!("The accessor has no method `{}`", method));
            log::error!("{:#}", error);
            return Err(error);
        };
        binding.invoke(arguments)
    }
}
