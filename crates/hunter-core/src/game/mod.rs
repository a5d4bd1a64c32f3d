mod classifier;
mod kill;
pub mod markers;
mod proximity;
mod session;
mod timestamp;

pub use classifier::*;
pub use kill::*;
pub use proximity::*;
pub use session::*;
pub use timestamp::*;
