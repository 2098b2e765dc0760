#![forbid(unsafe_code)]
//! mxsweep : tri massif d'adresses e-mail par présence d'enregistrements MX.
//!
//! Addresses are read from a line-oriented source, checked concurrently, and
//! the ones whose domain advertises at least one MX record are appended to a
//! result file. See [`check_addresses`] for the whole pipeline.

pub mod address;
pub mod aggregate;
pub mod dispatch;
pub mod mx;
pub mod options;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod source;
pub mod throttle;

pub use address::{AddressError, extract_domain};
pub use aggregate::{Aggregated, Aggregator, RunCounters};
pub use dispatch::{Dispatch, DispatchReport, Dispatcher};
pub use mx::{
    Error as MxError, Liveness, LookupMx, MxChecker, MxRecord, MxStatus, Outcome, system_resolver,
};
pub use options::CheckOptions;
pub use pipeline::{RunSummary, Sweep, check_addresses};
pub use progress::{NoProgress, ProgressObserver, ProgressSnapshot};
pub use sink::{FileSink, ResultSink, SinkError};
pub use source::{SourceError, read_addresses, read_addresses_from_path};
