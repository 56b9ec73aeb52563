mod accessor;
mod as_value;
mod binder;
mod codec;
mod compiler;
mod decode_type;
mod dispatcher;
mod entity;
mod error;
mod mapper;
mod method;
mod options;
mod result_set;
mod schema;
mod session;
mod statement;
mod type_descriptor;
mod util;
mod value;

pub use ::anyhow::Context;
pub use accessor::*;
pub use as_value::*;
pub use binder::*;
pub use codec::*;
pub use compiler::*;
pub use decode_type::*;
pub use dispatcher::*;
pub use entity::*;
pub use error::*;
pub use mapper::*;
pub use method::*;
pub use options::*;
pub use result_set::*;
pub use schema::*;
pub use session::*;
pub use statement::*;
pub use type_descriptor::*;
pub use util::*;
pub use value::*;
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
