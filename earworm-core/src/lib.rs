mod config;
mod proxy;
mod resolving;
mod track;
mod util;

#[cfg(any(test, feature = "fakes"))]
pub mod fakes;

pub use config::*;
pub use proxy::*;
pub use resolving::*;
pub use track::*;
pub use util::*;
