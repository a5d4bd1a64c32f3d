mod client;
mod history;
pub mod mock;
mod publisher;

pub use client::*;
pub use history::*;
pub use publisher::*;
