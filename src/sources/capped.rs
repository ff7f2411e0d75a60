//! Caps how many requests a source may emit.

use super::RequestSource;

/// Wraps a source and stops it after `max_requests` emissions, or earlier if
/// the inner source runs dry.
#[derive(Debug, Clone)]
pub struct MaxRequests<S> {
    inner: S,
    max_requests: usize,
}

impl<S: RequestSource> MaxRequests<S> {
    pub fn new(inner: S, max_requests: usize) -> Self {
        Self {
            inner,
            max_requests,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RequestSource> RequestSource for MaxRequests<S> {
    type Request = S::Request;

    fn working(&self) -> bool {
        self.inner.total_requests() < self.max_requests && self.inner.working()
    }

    fn next(&mut self) -> Option<S::Request> {
        if !self.working() {
            return None;
        }
        self.inner.next()
    }

    fn total_requests(&self) -> usize {
        self.inner.total_requests()
    }
}
