//! Mock PDF backend for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, ParsedDocument, PdfBackend};

/// A hand-rolled mock implementing [`PdfBackend`] that returns a fixed
/// outcome and records how it was called.
pub struct MockBackend {
    outcome: Result<ParsedDocument, BackendError>,
    call_count: AtomicUsize,
    last_max_text_pages: Mutex<Option<usize>>,
}

impl MockBackend {
    pub fn new(outcome: Result<ParsedDocument, BackendError>) -> Self {
        Self {
            outcome,
            call_count: AtomicUsize::new(0),
            last_max_text_pages: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_max_text_pages(&self) -> Option<usize> {
        *self.last_max_text_pages.lock().unwrap()
    }
}

impl PdfBackend for MockBackend {
    fn parse(&self, _bytes: &[u8], max_text_pages: usize) -> Result<ParsedDocument, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_max_text_pages.lock().unwrap() = Some(max_text_pages);
        self.outcome.clone()
    }
}
