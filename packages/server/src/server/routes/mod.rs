// HTTP routes
pub mod health;
pub mod jobs;
pub mod schedules;
pub mod sync;

pub use health::*;
pub use jobs::*;
pub use schedules::*;
pub use sync::*;
