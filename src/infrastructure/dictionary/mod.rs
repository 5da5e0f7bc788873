//! Dictionary file loading

mod loader;

pub use loader::{load_dictionary, parse_dictionary};
