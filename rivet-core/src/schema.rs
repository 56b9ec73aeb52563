use crate::Value;
use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
};

/// One bind variable slot of a prepared query.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    /// Declared type, `Value::Null` when the driver does not know it.
    pub ty: Value,
}

impl VariableDef {
    pub fn new(name: impl Into<String>, ty: Value) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered bind variables exposed by a prepared query. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySchema {
    variables: Box<[VariableDef]>,
}

impl QuerySchema {
    pub fn new(variables: impl IntoIterator<Item = VariableDef>) -> Self {
        Self {
            variables: variables.into_iter().collect(),
        }
    }
    /// Total number of slots, duplicated names included.
    pub fn len(&self) -> usize {
        self.variables.len()
    }
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }
    pub fn get(&self, index: usize) -> Option<&VariableDef> {
        self.variables.get(index)
    }
    pub fn unique_names(&self) -> HashSet<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }
    /// Indices of every slot called `name`, in slot order.
    pub fn indices_of<'s>(&'s self, name: &'s str) -> impl Iterator<Item = usize> + 's {
        self.variables
            .iter()
            .enumerate()
            .filter(move |(_, v)| v.name == name)
            .map(|(i, _)| i)
    }
}

impl FromIterator<VariableDef> for QuerySchema {
    fn from_iter<T: IntoIterator<Item = VariableDef>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Display for QuerySchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.variables.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", v.name, v.ty.type_name())?;
        }
        f.write_str(")")
    }
}
