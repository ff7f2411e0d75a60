//! A source that emits one fixed request.

use super::RequestSource;
use crate::models::ScrapeRequest;

/// Hands out its template request exactly once.
#[derive(Debug, Clone)]
pub struct SingleRequest {
    request: ScrapeRequest,
    generated: bool,
}

impl SingleRequest {
    pub fn new(request: ScrapeRequest) -> Self {
        Self {
            request,
            generated: false,
        }
    }
}

impl RequestSource for SingleRequest {
    type Request = ScrapeRequest;

    fn working(&self) -> bool {
        !self.generated
    }

    fn next(&mut self) -> Option<ScrapeRequest> {
        if !self.working() {
            return None;
        }
        self.generated = true;
        Some(self.request.clone())
    }

    fn total_requests(&self) -> usize {
        usize::from(self.generated)
    }
}
