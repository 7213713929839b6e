mod tools;
mod upstreams;

pub use tools::*;
pub use upstreams::*;
