//! Wire and domain model shared by the relaylink client, its capability
//! implementations and the command line tool.

pub mod model;

pub use model::*;
