//! Command-line interface for ragrank.
//!
//! The `ragrank` binary loads a JSON-lines corpus into a [`ragrank::Retriever`]
//! and ranks it against a query. Configuration comes from a TOML file layered
//! under `RAGRANK_*` environment variables.
//!
//! # Key Abstractions
//!
//! - [`CliArgs`]: clap argument tree
//! - [`AppConfig`]: file + environment configuration
//! - [`run`]: command dispatch

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod corpus;

pub use app::{init_logging, run};
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::{AppConfig, CorpusConfig};
pub use corpus::{load_corpus, parse_corpus};
