#![deny(unsafe_code)]

pub mod builder;
pub mod config;
pub mod node;
pub mod output;
pub mod template;
pub mod transform;

pub use builder::DocumentBuilder;
pub use config::{CaseProperties, Configuration, MergeSelectors};
pub use node::{AtBlock, Declaration, Document, Node, RuleBlock};
pub use output::Output;
pub use template::Template;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Template(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
