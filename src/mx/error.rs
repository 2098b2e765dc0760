use std::io;
use std::time::Duration;

use thiserror::Error;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::error::ProtoErrorKind;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: ResolveError,
    },
    #[error("MX lookup failed: {source}")]
    Lookup {
        #[source]
        source: ResolveError,
    },
    #[error("MX lookup timed out after {after:?}")]
    Timeout { after: Duration },
}

impl MxError {
    pub(crate) fn resolver_init(source: ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub fn lookup(source: ResolveError) -> Self {
        Self::Lookup { source }
    }

    pub(crate) fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    /// True when the lookup failed because this process hit its descriptor
    /// limit while opening a socket, as opposed to anything about the domain.
    pub fn is_resource_exhausted(&self) -> bool {
        let Self::Lookup { source } = self else {
            return false;
        };
        match source.kind() {
            ResolveErrorKind::Io(err) => is_descriptor_exhaustion(err),
            ResolveErrorKind::Proto(proto) => match proto.kind() {
                ProtoErrorKind::Io(err) => is_descriptor_exhaustion(err),
                _ => false,
            },
            _ => false,
        }
    }
}

fn is_descriptor_exhaustion(err: &io::Error) -> bool {
    err.raw_os_error().is_some_and(is_descriptor_limit_code)
}

#[cfg(unix)]
fn is_descriptor_limit_code(code: i32) -> bool {
    code == libc::EMFILE || code == libc::ENFILE
}

#[cfg(windows)]
fn is_descriptor_limit_code(code: i32) -> bool {
    // WSAEMFILE
    code == 10024
}

#[cfg(not(any(unix, windows)))]
fn is_descriptor_limit_code(_code: i32) -> bool {
    false
}
