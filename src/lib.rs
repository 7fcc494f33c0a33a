//! blogsync - sync a Markdown directory into a blog's article database
//!
//! This crate provides the core functionality for the `blogsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`loader`] - Recursive suffix-filtered file listing and line loading
//! - [`sync`] - Refresh orchestration (target filter, delete-by-tag, insert)
//! - [`model`] - Data types (Article, NewArticle)
//! - [`storage`] - SQLite database layer
//! - [`config`] - Path resolution and `.properties` parsing
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
