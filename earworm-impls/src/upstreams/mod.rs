mod reqwest_upstream;

pub use reqwest_upstream::*;
