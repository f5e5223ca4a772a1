pub mod events;
pub mod features;
pub mod stats;
pub mod transcript;

pub use events::*;
pub use features::*;
pub use stats::*;
pub use transcript::*;
