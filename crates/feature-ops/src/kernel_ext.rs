use csg_kernel::{Kernel, KernelIntrospect, KernelSolidHandle};

/// A kernel session that can both build solids and measure them.
///
/// Feature execution mutates the kernel and then inspects the result
/// through the same object; `as_introspect` hands out the read-only view
/// without a second borrow of the session.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;

    /// Volume and connected solid count of `solid`.
    fn measure(&self, solid: &KernelSolidHandle) -> (f64, usize) {
        let ki = self.as_introspect();
        (ki.volume(solid), ki.solid_count(solid))
    }
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_kernel::MockKernel;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn measure_through_the_bundle() {
        let mut kernel = MockKernel::new();
        let b = kernel
            .make_box(Point3::origin(), Vector3::new(2.0, 3.0, 4.0))
            .unwrap();
        let kb: &mut dyn KernelBundle = &mut kernel;
        assert_eq!(kb.measure(&b), (24.0, 1));
    }
}
