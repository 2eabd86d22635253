//! # halflife-io
//! File boundaries of a simulation run.
//!
//! - [`events`]: line-oriented event stream codec (`<base>.events`)
//! - [`snapshot`]: JSON configuration snapshot (`<base>.sim`) and whole-result I/O
//! - [`analysis`]: per-isotope population and released-energy series

pub mod analysis;
pub mod error;
pub mod events;
pub mod snapshot;

pub use error::CodecError;
pub use events::{read_events, write_events};
pub use snapshot::{read_results, write_results};
