#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod error;
pub mod feed_forward;
pub mod layer;
pub mod schedule;
pub mod state;
pub mod trainer;
pub mod unit;

mod utils;

pub use crate::error::{Error, Result};
