//! Per-host connection accounting.
//!
//! - [`HostKey`]: Normalized hostname a connection budget is tracked for
//! - [`HostRegistry`]: Shared count of open dedicated streams per host, and
//!   the policy choosing between dedicated and pooled streams
//! - [`ConnectionLease`]: One connection slot held by a dedicated stream

mod key;
mod registry;

pub use key::HostKey;
pub use registry::{ConnectionLease, HostEntry, HostRegistry, admits_dedicated};
