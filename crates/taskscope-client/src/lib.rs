//! Client library for the task service's queue, index and artifact APIs.
//!
//! Provides single-shot lookups, cursor-following task-group listings and
//! artifact downloads that retry transient failures and validate the
//! downloaded archive.

pub mod client;
pub mod config;
pub mod delay;
pub mod download;
pub mod error;
pub mod http;
pub mod pages;

#[cfg(test)]
mod testing;

pub use client::TaskClient;
pub use config::{ClientConfig, ROOT_URL_ENV};
pub use delay::{Delay, TokioDelay};
pub use download::verify_archive;
pub use error::{ClientError, RESOURCE_NOT_FOUND};
pub use http::HttpClient;
pub use pages::TaskGroupPages;
