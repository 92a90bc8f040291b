use super::snapshot::{RestoreReport, VisibilitySnapshot};
use crate::host::DocumentHost;
use crate::traversal::FlatLeaf;

/// Scoped ownership of a document's visibility state
///
/// Acquiring the guard captures the visibility of every leaf. The captured
/// state is written back exactly once: by [`release`](Self::release) on the
/// normal path, or by `Drop` on any other exit (an error returned with `?`,
/// an early return, or a panic unwinding through the export body).
///
/// While the guard is alive it holds the only mutable borrow of the host,
/// so all mutation during the export goes through [`host_mut`](Self::host_mut).
pub struct VisibilityGuard<'h, H>
where
    H: DocumentHost + ?Sized,
{
    host: &'h mut H,
    snapshot: VisibilitySnapshot,
    released: bool,
}

impl<'h, H> VisibilityGuard<'h, H>
where
    H: DocumentHost + ?Sized,
{
    /// Capture the visibility of `leaves` and take over the host
    pub fn acquire(host: &'h mut H, leaves: &[FlatLeaf]) -> Self {
        let snapshot = VisibilitySnapshot::capture(&*host, leaves);
        Self {
            host,
            snapshot,
            released: false,
        }
    }

    pub fn snapshot(&self) -> &VisibilitySnapshot {
        &self.snapshot
    }

    pub fn host(&self) -> &H {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Restore the captured visibility and give the host back
    pub fn release(mut self) -> RestoreReport {
        self.released = true;
        self.snapshot.restore(&mut *self.host)
    }
}

impl<H> Drop for VisibilityGuard<'_, H>
where
    H: DocumentHost + ?Sized,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let report = self.snapshot.restore(&mut *self.host);
        tracing::warn!(
            restored = report.restored,
            failed = report.failed.len(),
            skipped = report.skipped,
            panicking = std::thread::panicking(),
            "export aborted, visibility restored by guard"
        );
    }
}
