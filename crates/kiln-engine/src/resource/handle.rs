use crate::backend::{RawId, RenderBackend};

/// Lifecycle of a native object owned by a wrapper.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lifecycle {
    /// Allocated; not usable for drawing yet (e.g. texture without pixels).
    Created,
    /// Fully initialized.
    Ready,
    /// Handed back to the backend.
    Deleted,
}

/// Types owning native objects that must be handed back to the backend.
pub trait Release {
    fn release(self, backend: &mut dyn RenderBackend);
}

/// Owns one raw id and tracks its lifecycle.
#[derive(Debug)]
pub(crate) struct NativeHandle {
    id: RawId,
    kind: &'static str,
    state: Lifecycle,
}

impl NativeHandle {
    pub(crate) fn new(id: RawId, kind: &'static str, state: Lifecycle) -> Self {
        Self { id, kind, state }
    }

    #[inline]
    pub(crate) fn id(&self) -> RawId {
        self.id
    }

    #[inline]
    pub(crate) fn state(&self) -> Lifecycle {
        self.state
    }

    pub(crate) fn mark_ready(&mut self) {
        self.state = Lifecycle::Ready;
    }

    /// Gives up ownership; the caller deletes the returned id.
    pub(crate) fn into_released(mut self) -> RawId {
        self.state = Lifecycle::Deleted;
        log::debug!("releasing {} {}", self.kind, self.id);
        self.id
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        if self.state != Lifecycle::Deleted {
            log::warn!(
                "{} {} dropped without release; native object leaked",
                self.kind,
                self.id
            );
        }
    }
}
