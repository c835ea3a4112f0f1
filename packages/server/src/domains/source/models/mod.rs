pub mod source_name;

pub use source_name::{SourceName, UnknownSource};
