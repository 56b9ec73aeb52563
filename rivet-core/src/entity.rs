use crate::{Result, RowLabeled};
use std::any;

/// A type built from result rows.
pub trait Entity: Send + 'static {
    /// Name the entity is looked up with, the one a declared return type uses.
    ///
    /// Defaults to the unqualified type name.
    fn entity_name() -> &'static str
    where
        Self: Sized,
    {
        let name = any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }

    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;
}
