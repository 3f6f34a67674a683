use csg_kernel::KernelSolidHandle;
use part_types::ToolShape;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Create the kernel solid for a tool shape.
pub fn build_tool(kb: &mut dyn KernelBundle, tool: &ToolShape) -> Result<KernelSolidHandle, OpError> {
    let handle = match tool {
        ToolShape::Block { origin, size } => kb.make_box(*origin, *size)?,
        ToolShape::Cylinder {
            base,
            axis,
            radius,
            height,
        } => kb.make_cylinder(*base, *axis, *radius, *height)?,
        ToolShape::Extrusion { profile, vector } => kb.extrude_profile(profile, *vector)?,
        ToolShape::Loft { lower, upper } => {
            if lower.vertices().len() != upper.vertices().len() {
                return Err(part_types::GeometryError::LoftMismatch {
                    lower: lower.vertices().len(),
                    upper: upper.vertices().len(),
                }
                .into());
            }
            kb.loft_profiles(lower, upper)?
        }
    };
    Ok(handle)
}
