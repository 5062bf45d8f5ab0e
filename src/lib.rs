/// Implemented RL algorithms
pub mod algo;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use algo::tabular::{ExpectedSarsaAgent, ExpectedSarsaConfig};
