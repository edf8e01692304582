mod class;
mod room;
mod slot;

pub use class::*;
pub use room::*;
pub use slot::*;
