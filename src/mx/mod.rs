//! MX resolution for the sweep.
//!
//! [`MxChecker::check`] takes one address, looks up its domain through a
//! [`LookupMx`] implementation and classifies the result as an [`Outcome`].

mod checker;
mod error;
mod resolver;
mod types;

pub use checker::MxChecker;
pub use error::MxError as Error;
pub use resolver::{LookupMx, classify, resolve_with, system_resolver};
pub use types::{Liveness, MxRecord, MxStatus, Outcome};

#[cfg(test)]
pub(crate) use error::MxError;
