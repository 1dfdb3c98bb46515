pub mod cache;
pub mod cli;
pub mod config;
pub mod git;
pub mod ignore;
pub mod link;
pub mod model;
pub mod update;

mod api;

pub use api::{Llml, LlmlBuilder};
