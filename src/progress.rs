//! Progress-callback trait for build events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the build walks through methods and pdflatex passes.
//!
//! # Example
//!
//! ```rust
//! use resume_pdf::{ConversionConfig, ConversionProgressCallback, Method};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_method_start(&self, method: Method, index: usize, total: usize) {
//!         eprintln!("[{}/{}] trying {}", index, total, method);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Method;
use std::path::Path;
use std::sync::Arc;

/// Called by the build as it runs each method.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive sequentially from one task, but the
/// trait is `Send + Sync` so an implementation can live in an `Arc` shared
/// with other threads (e.g. a spinner ticker).
pub trait ConversionProgressCallback: Send + Sync {
    /// Called before a method runs.
    ///
    /// # Arguments
    /// * `method` — the method about to run
    /// * `index`  — 1-indexed position in the strategy
    /// * `total`  — number of methods in the strategy
    fn on_method_start(&self, method: Method, index: usize, total: usize) {
        let _ = (method, index, total);
    }

    /// Called before each pdflatex pass (local, staged and docker only).
    fn on_pass_start(&self, method: Method, pass: u32, passes: u32) {
        let _ = (method, pass, passes);
    }

    /// Called when a method produced the PDF.
    ///
    /// # Arguments
    /// * `pdf_path` — where the PDF was written
    /// * `bytes`    — size of the PDF
    fn on_method_complete(&self, method: Method, pdf_path: &Path, bytes: u64) {
        let _ = (method, pdf_path, bytes);
    }

    /// Called when a method failed. `has_next` is true when the fallback
    /// will try another method.
    fn on_method_error(&self, method: Method, error: &str, has_next: bool) {
        let _ = (method, error, has_next);
    }

    /// Called for every auxiliary file removed after a build.
    fn on_cleanup(&self, removed: &Path) {
        let _ = removed;
    }

    /// Called once at the end.
    ///
    /// # Arguments
    /// * `succeeded` — the method that produced the PDF, if any
    /// * `attempts`  — number of methods that were run
    fn on_conversion_complete(&self, succeeded: Option<Method>, attempts: usize) {
        let _ = (succeeded, attempts);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        passes: AtomicUsize,
        errors: AtomicUsize,
        cleaned: Mutex<Vec<String>>,
        winner: Mutex<Option<Method>>,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_method_start(&self, _method: Method, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_pass_start(&self, _method: Method, _pass: u32, _passes: u32) {
            self.passes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_method_error(&self, _method: Method, _error: &str, _has_next: bool) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_cleanup(&self, removed: &Path) {
            self.cleaned
                .lock()
                .unwrap()
                .push(removed.display().to_string());
        }

        fn on_conversion_complete(&self, succeeded: Option<Method>, _attempts: usize) {
            *self.winner.lock().unwrap() = succeeded;
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_method_start(Method::Local, 1, 1);
        cb.on_pass_start(Method::Local, 1, 2);
        cb.on_method_complete(Method::Local, Path::new("a.pdf"), 10);
        cb.on_method_error(Method::Online, "boom", true);
        cb.on_cleanup(Path::new("a.aux"));
        cb.on_conversion_complete(Some(Method::Local), 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_method_start(Method::Online, 1, 2);
        tracker.on_method_error(Method::Online, "network", true);
        tracker.on_method_start(Method::Local, 2, 2);
        tracker.on_pass_start(Method::Local, 1, 2);
        tracker.on_pass_start(Method::Local, 2, 2);
        tracker.on_cleanup(Path::new("resume.aux"));
        tracker.on_conversion_complete(Some(Method::Local), 2);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.passes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.cleaned.lock().unwrap().as_slice(), ["resume.aux"]);
        assert_eq!(*tracker.winner.lock().unwrap(), Some(Method::Local));
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_method_start(Method::Docker, 1, 1);
    }
}
