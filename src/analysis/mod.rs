pub mod arousal;
pub mod interruptions;
pub mod merge;
pub mod rate;
pub mod reconcile;
pub mod turns;

pub use arousal::*;
pub use interruptions::*;
pub use merge::*;
pub use rate::*;
pub use reconcile::*;
pub use turns::*;
