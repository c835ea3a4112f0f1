pub mod content;
pub mod vendor_fields;

pub use content::*;
pub use vendor_fields::*;
