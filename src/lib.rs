#![doc = include_str!("../README.md")]

pub mod ai;
#[cfg(feature = "cli")]
pub mod cli;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod knowledge;
pub mod pipeline;
pub mod utils;
pub mod variant;

#[doc(inline)]
#[cfg(feature = "cli")]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::knowledge::KnowledgeBase;
#[doc(inline)]
pub use crate::pipeline::{Analysis, AnalyzeArgs, Orchestrator};
#[doc(inline)]
pub use varlens_parse as parse;
