use csg_kernel::{Kernel, KernelSolidHandle};

/// The solid a part is being built into.
///
/// A body owns exactly one live kernel solid. It is not `Clone`: every step
/// of the fold consumes the previous body and hands back its successor, and
/// the superseded solid is released on the way.
#[derive(Debug, PartialEq, Eq)]
pub struct Body {
    handle: KernelSolidHandle,
}

impl Body {
    pub(crate) fn new(handle: KernelSolidHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &KernelSolidHandle {
        &self.handle
    }

    /// Swap in `next` and release the solid this body held.
    pub(crate) fn replace<K: Kernel + ?Sized>(self, kernel: &mut K, next: KernelSolidHandle) -> Self {
        kernel.release(&self.handle);
        Self { handle: next }
    }

    /// Give the solid back to the kernel.
    pub fn release<K: Kernel + ?Sized>(self, kernel: &mut K) {
        kernel.release(&self.handle);
    }
}
