//! `fetchgate` fetches files and URLs as byte streams while keeping the
//! number of connections held open per host within a budget.
//!
//! "Hello world" example:
//! ```no_run
//! use fetchgate::Result;
//! use tokio::io::AsyncReadExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let mut stream = fetchgate::fetch("https://example.com/catalog.xml").await?;
//!   let mut content = String::new();
//!   stream.read_to_string(&mut content).await?;
//!   println!("{content}");
//!   Ok(())
//! }
//! ```
//!
//! Remote responses come back as one of two kinds of stream. While a host
//! has connections to spare, the body becomes a *dedicated* stream that
//! holds its connection until it is closed and is counted in the
//! [`host::HostRegistry`]. Once a host is one connection short of its limit,
//! the body becomes a *pooled* stream that carries its resolved URL for a
//! caching layer instead. Local `file` URIs are opened directly.
//!
//! For anything but one-off fetches build a [`Fetcher`] once and share it,
//! so that connection accounting spans all requests:
//!
//! ```no_run
//! use fetchgate::{FetcherBuilder, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let fetcher = FetcherBuilder::builder()
//!       .max_connections(4usize)
//!       .build()
//!       .fetcher()?;
//!   let mut stream = fetcher.fetch("https://example.com/catalog.xml").await?;
//!   println!("dedicated: {}", stream.is_dedicated());
//!   stream.close();
//!   Ok(())
//! }
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]

#[cfg(test)]
#[macro_use]
pub mod test_utils;

mod fetcher;
mod types;

pub mod config;
pub mod host;
pub mod stream;
pub mod transport;

pub use crate::{
    config::{FetchConfig, HostConfig, HostConfigs},
    fetcher::{Fetcher, FetcherBuilder, fetch},
    stream::FetchStream,
    types::*,
};
