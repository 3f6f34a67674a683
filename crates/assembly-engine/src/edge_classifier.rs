//! Picks the inside corners of the gusset bracket that get rounded.
//!
//! Edges are matched by where they sit, not by which feature made them:
//! an edge qualifies for a role when its midpoint lies within the reference
//! tolerance of that role's planes and it is longer than the role minimum.

use csg_kernel::{EdgeCurve, EdgeInfo, KernelId};
use design_params::FilletReferences;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeRole {
    /// Where the leg meets the underside of the flange.
    LJunction,
    GussetToLeg,
    GussetToFlange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMatch {
    pub id: KernelId,
    pub role: EdgeRole,
    pub length: f64,
}

/// Edges to round in one operation, in kernel edge order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletSelection {
    pub matches: Vec<EdgeMatch>,
    pub radius: f64,
}

impl FilletSelection {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn edge_ids(&self) -> Vec<KernelId> {
        self.matches.iter().map(|m| m.id).collect()
    }

    pub fn count(&self, role: EdgeRole) -> usize {
        self.matches.iter().filter(|m| m.role == role).count()
    }
}

/// Classify every edge against the references and keep the ones that match.
pub fn select_fillet_edges(edges: &[EdgeInfo], refs: &FilletReferences) -> FilletSelection {
    let matches: Vec<EdgeMatch> = edges
        .iter()
        .filter_map(|edge| {
            classify(edge, refs).map(|role| EdgeMatch {
                id: edge.id,
                role,
                length: edge.length,
            })
        })
        .collect();
    debug!(candidates = edges.len(), matched = matches.len(), "fillet edges selected");
    FilletSelection {
        matches,
        radius: refs.radius,
    }
}

/// First matching role, tested in a fixed order.
pub fn classify(edge: &EdgeInfo, refs: &FilletReferences) -> Option<EdgeRole> {
    if edge.curve != EdgeCurve::Line {
        return None;
    }
    let near = |value: f64, target: f64| (value - target).abs() <= refs.tolerance;
    let mid = edge.midpoint;
    let on_rib = refs.rib_planes_z.iter().any(|&z| near(mid.z, z));

    if near(mid.x, refs.junction_x)
        && near(mid.y, refs.junction_y)
        && edge.length > refs.min_length_l_junction
    {
        Some(EdgeRole::LJunction)
    } else if near(mid.x, refs.junction_x) && on_rib && edge.length > refs.min_length_gusset_leg {
        Some(EdgeRole::GussetToLeg)
    } else if near(mid.y, refs.junction_y) && on_rib && edge.length > refs.min_length_gusset_flange
    {
        Some(EdgeRole::GussetToFlange)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_params::SplineBracketParams;
    use nalgebra::Point3;

    fn refs() -> FilletReferences {
        SplineBracketParams::revision_1().resolve().fillet
    }

    fn edge(index: u64, start: [f64; 3], end: [f64; 3], curve: EdgeCurve) -> EdgeInfo {
        let (start, end) = (Point3::from(start), Point3::from(end));
        EdgeInfo {
            id: KernelId(index),
            curve,
            start,
            end,
            midpoint: nalgebra::center(&start, &end),
            length: (end - start).norm(),
        }
    }

    #[test]
    fn default_bracket_corners() {
        let edges = vec![
            edge(0, [10.0, -10.0, 5.0], [10.0, -10.0, 55.0], EdgeCurve::Line),
            edge(1, [10.0, -120.0, 5.0], [10.0, -10.0, 5.0], EdgeCurve::Line),
            edge(2, [10.0, -120.0, 55.0], [10.0, -10.0, 55.0], EdgeCurve::Line),
            edge(3, [10.0, -10.0, 5.0], [60.0, -10.0, 5.0], EdgeCurve::Line),
            edge(4, [10.0, -10.0, 55.0], [60.0, -10.0, 55.0], EdgeCurve::Line),
            // outer corner of the flange
            edge(5, [60.0, -10.0, 5.0], [60.0, -10.0, 55.0], EdgeCurve::Line),
            // bottom of the leg
            edge(6, [10.0, -120.0, 5.0], [10.0, -120.0, 55.0], EdgeCurve::Line),
        ];
        let selection = select_fillet_edges(&edges, &refs());
        assert_eq!(selection.len(), 5);
        assert_eq!(selection.count(EdgeRole::LJunction), 1);
        assert_eq!(selection.count(EdgeRole::GussetToLeg), 2);
        assert_eq!(selection.count(EdgeRole::GussetToFlange), 2);
        assert_eq!(selection.radius, 3.0);
        assert_eq!(
            selection.edge_ids(),
            (0..5).map(KernelId).collect::<Vec<_>>()
        );
    }

    #[test]
    fn curved_and_short_edges_are_ignored() {
        let edges = vec![
            edge(0, [10.0, -10.0, 25.0], [10.0, -10.0, 35.0], EdgeCurve::Curve),
            // a 10 long junction segment is not longer than the minimum
            edge(1, [10.0, -10.0, 25.0], [10.0, -10.0, 35.0], EdgeCurve::Line),
            // gusset-to-leg must exceed 50
            edge(2, [10.0, -50.0, 5.0], [10.0, -10.0, 5.0], EdgeCurve::Line),
        ];
        assert!(select_fillet_edges(&edges, &refs()).is_empty());
    }

    #[test]
    fn junction_wins_over_rib_roles() {
        // Sits on both the junction line and a rib plane.
        let e = edge(0, [10.0, -10.0, 4.5], [10.0, -10.0, 5.5], EdgeCurve::Line);
        let mut r = refs();
        r.min_length_l_junction = 0.5;
        assert_eq!(classify(&e, &r), Some(EdgeRole::LJunction));
    }

    #[test]
    fn tolerance_is_absolute() {
        let r = refs();
        let inside = edge(0, [10.9, -10.0, 5.0], [10.9, -10.0, 55.0], EdgeCurve::Line);
        let outside = edge(1, [11.1, -10.0, 5.0], [11.1, -10.0, 55.0], EdgeCurve::Line);
        assert_eq!(classify(&inside, &r), Some(EdgeRole::LJunction));
        assert_eq!(classify(&outside, &r), None);
    }
}
