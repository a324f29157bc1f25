mod extract;
mod schema;
mod tree;

pub use extract::{extract, TagBag};
pub use schema::resolve;
pub use tree::{local_name, parse, Element, ElementTree};
