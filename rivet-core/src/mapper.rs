use crate::{Context, Entity, Error, Result, ResultSet};
use std::{
    any::Any,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::Arc,
};

/// A mapped entity whose concrete type is known only to the caller.
pub type AnyEntity = Box<dyn Any + Send>;

/// Converts raw result sets into entities of one type.
pub trait EntityMapper: Send + Sync {
    fn entity_name(&self) -> &'static str;
    fn map(&self, result: ResultSet) -> Result<MappedResult>;
}

/// [`EntityMapper`] of an [`Entity`] type.
pub struct TypedMapper<E: Entity>(PhantomData<fn() -> E>);

impl<E: Entity> TypedMapper<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Entity> Default for TypedMapper<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityMapper for TypedMapper<E> {
    fn entity_name(&self) -> &'static str {
        E::entity_name()
    }
    fn map(&self, result: ResultSet) -> Result<MappedResult> {
        let entity = E::entity_name();
        let entities = result
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                E::from_row(row)
                    .map(|v| Box::new(v) as AnyEntity)
                    .with_context(|| format!("While mapping row {} to `{}`", i, entity))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MappedResult { entity, entities })
    }
}

/// Entities mapped from a result set, in row order.
pub struct MappedResult {
    entity: &'static str,
    entities: Vec<AnyEntity>,
}

impl MappedResult {
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }
    pub fn len(&self) -> usize {
        self.entities.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
    /// The only entity, failing when there are none or more than one.
    pub fn one(self) -> Result<AnyEntity> {
        let len = self.entities.len();
        if len != 1 {
            return Err(Error::msg(format!(
                "Expected exactly one `{}` but the query returned {} rows",
                self.entity, len
            )));
        }
        let mut entities = self.entities;
        entities
            .pop()
            .ok_or_else(|| Error::msg(format!("Expected exactly one `{}`", self.entity)))
    }
    pub fn all(self) -> Vec<AnyEntity> {
        self.entities
    }
    pub fn into_vec<E: Entity>(self) -> Result<Vec<E>> {
        let entity = self.entity;
        self.entities
            .into_iter()
            .map(|v| downcast::<E>(v, entity))
            .collect()
    }
}

impl Debug for MappedResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedResult")
            .field("entity", &self.entity)
            .field("len", &self.entities.len())
            .finish()
    }
}

pub(crate) fn downcast<E: Entity>(value: AnyEntity, entity: &str) -> Result<E> {
    value.downcast::<E>().map(|v| *v).map_err(|_| {
        Error::msg(format!(
            "Cannot read a mapped `{}` as `{}`",
            entity,
            E::entity_name()
        ))
    })
}

/// Transformation for a pending result: map the rows and extract exactly one entity.
pub fn map_one_fn(
    mapper: Arc<dyn EntityMapper>,
) -> impl FnOnce(Result<ResultSet>) -> Result<AnyEntity> + Send + 'static {
    move |result| mapper.map(result?)?.one()
}

/// Transformation for a pending result: map every row.
pub fn map_all_fn(
    mapper: Arc<dyn EntityMapper>,
) -> impl FnOnce(Result<ResultSet>) -> Result<MappedResult> + Send + 'static {
    move |result| mapper.map(result?)
}

/// Registry of the entity mappers, by entity name.
#[derive(Clone, Default)]
pub struct MappingManager {
    mappers: HashMap<&'static str, Arc<dyn EntityMapper>>,
}

impl MappingManager {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.register_mapper(TypedMapper::<E>::new())
    }
    pub fn register_mapper(&mut self, mapper: impl EntityMapper + 'static) -> &mut Self {
        let name = mapper.entity_name();
        if self.mappers.insert(name, Arc::new(mapper)).is_some() {
            log::warn!("The mapper for entity `{}` was registered twice", name);
        }
        self
    }
    pub fn mapper_for(&self, entity: &str) -> Result<Arc<dyn EntityMapper>> {
        self.mappers
            .get(entity)
            .cloned()
            .ok_or_else(|| Error::msg(format!("No mapper registered for entity `{}`", entity)))
    }
}
