//! Recovering faces, edges and connected solids from a polygon soup.
//!
//! csgrs booleans leave coincident vertices that differ in the last bits and
//! T-junctions where one polygon's vertex sits on a neighbour's edge. Both are
//! repaired first so that neighbouring polygons share exact vertex ids, after
//! which adjacency is a lookup on undirected vertex pairs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use nalgebra::{Point3, Vector3};

use crate::polygon::{Plane, Polygon, SurfaceTag};
use crate::types::{EdgeCurve, SurfaceKind};

/// Vertices closer than this are the same vertex.
pub const WELD_TOLERANCE: f64 = 1e-6;

/// Cell size of the grid used to find vertices lying on long edges.
const EDGE_GRID_CELL: f64 = 2.0;

/// Upper bound on coplanar merge sweeps per refine.
const MAX_MERGE_PASSES: usize = 32;

/// A polygon expressed as indices into a shared vertex table.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub vertices: Vec<usize>,
    pub plane: Plane,
    pub tag: SurfaceTag,
}

/// Welded, T-junction free polygon mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Point3<f64>>,
    pub loops: Vec<Loop>,
}

impl Mesh {
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut welder = Welder::new(WELD_TOLERANCE);
        let mut loops = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            let vertices: Vec<usize> = polygon.vertices.iter().map(|p| welder.insert(*p)).collect();
            loops.push(Loop {
                vertices,
                plane: polygon.plane,
                tag: polygon.tag,
            });
        }
        let positions = welder.positions;

        split_t_junctions(&positions, &mut loops, WELD_TOLERANCE);
        loops.retain_mut(|l| clean_loop(&positions, l));

        Mesh { positions, loops }
    }

    pub fn loop_points(&self, l: &Loop) -> Vec<Point3<f64>> {
        l.vertices.iter().map(|&i| self.positions[i]).collect()
    }

    pub fn loop_area(&self, l: &Loop) -> f64 {
        part_types::newell_normal(&self.loop_points(l)).norm() * 0.5
    }

    pub fn loop_centroid(&self, l: &Loop) -> Point3<f64> {
        let sum = l
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + self.positions[i].coords);
        Point3::from(sum / l.vertices.len() as f64)
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        let Mesh { positions, loops } = self;
        loops
            .into_iter()
            .map(|l| Polygon {
                vertices: l.vertices.iter().map(|&i| positions[i]).collect(),
                plane: l.plane,
                tag: l.tag,
            })
            .collect()
    }

    /// Undirected vertex pair → loops using it, in a stable order.
    pub fn edge_map(&self) -> BTreeMap<(usize, usize), Vec<usize>> {
        let mut map: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        for (li, l) in self.loops.iter().enumerate() {
            let n = l.vertices.len();
            for k in 0..n {
                let (a, b) = (l.vertices[k], l.vertices[(k + 1) % n]);
                map.entry((a.min(b), a.max(b))).or_default().push(li);
            }
        }
        map
    }
}

struct Welder {
    tol: f64,
    cells: HashMap<[i64; 3], Vec<usize>>,
    positions: Vec<Point3<f64>>,
}

impl Welder {
    fn new(tol: f64) -> Self {
        Self {
            tol,
            cells: HashMap::new(),
            positions: Vec::new(),
        }
    }

    fn insert(&mut self, p: Point3<f64>) -> usize {
        let key = grid_key(&p, self.tol);
        let mut best: Option<(usize, f64)> = None;
        for offset in neighbourhood() {
            let cell = [key[0] + offset[0], key[1] + offset[1], key[2] + offset[2]];
            let Some(ids) = self.cells.get(&cell) else {
                continue;
            };
            for &id in ids {
                let d = (self.positions[id] - p).norm();
                let better = match best {
                    None => true,
                    Some((bid, bd)) => d < bd || (d == bd && id < bid),
                };
                if d <= self.tol && better {
                    best = Some((id, d));
                }
            }
        }
        if let Some((id, _)) = best {
            return id;
        }
        let id = self.positions.len();
        self.positions.push(p);
        self.cells.entry(key).or_default().push(id);
        id
    }
}

fn grid_key(p: &Point3<f64>, cell: f64) -> [i64; 3] {
    [
        (p.x / cell).floor() as i64,
        (p.y / cell).floor() as i64,
        (p.z / cell).floor() as i64,
    ]
}

fn neighbourhood() -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(|x| (-1..=1).flat_map(move |y| (-1..=1).map(move |z| [x, y, z])))
}

/// Insert every vertex lying strictly inside an edge into that edge.
fn split_t_junctions(positions: &[Point3<f64>], loops: &mut [Loop], tol: f64) {
    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for (id, p) in positions.iter().enumerate() {
        grid.entry(grid_key(p, EDGE_GRID_CELL)).or_default().push(id);
    }

    let step = EDGE_GRID_CELL / 2.0;
    for l in loops.iter_mut() {
        let n = l.vertices.len();
        let mut repaired = Vec::with_capacity(n);
        for k in 0..n {
            let (a, b) = (l.vertices[k], l.vertices[(k + 1) % n]);
            repaired.push(a);

            let (pa, pb) = (positions[a], positions[b]);
            let len = (pb - pa).norm();
            if len <= tol {
                continue;
            }
            let dir = (pb - pa) / len;

            let mut candidates = BTreeSet::new();
            let samples = (len / step).ceil() as usize;
            for s in 0..=samples {
                let sample = pa + dir * (s as f64 * step).min(len);
                let key = grid_key(&sample, EDGE_GRID_CELL);
                for offset in neighbourhood() {
                    let cell = [key[0] + offset[0], key[1] + offset[1], key[2] + offset[2]];
                    if let Some(ids) = grid.get(&cell) {
                        candidates.extend(ids.iter().copied());
                    }
                }
            }

            let mut on_edge: Vec<(f64, usize)> = candidates
                .into_iter()
                .filter(|&id| id != a && id != b)
                .filter_map(|id| {
                    let rel = positions[id] - pa;
                    let t = rel.dot(&dir);
                    if t <= tol || t >= len - tol {
                        return None;
                    }
                    ((rel - dir * t).norm() <= tol).then_some((t, id))
                })
                .collect();
            on_edge.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
            repaired.extend(on_edge.into_iter().map(|(_, id)| id));
        }
        l.vertices = repaired;
    }
}

/// Drop repeated vertices; `false` when nothing with area is left.
fn clean_loop(positions: &[Point3<f64>], l: &mut Loop) -> bool {
    l.vertices.dedup();
    while l.vertices.len() > 1 && l.vertices.first() == l.vertices.last() {
        l.vertices.pop();
    }
    if l.vertices.len() < 3 {
        return false;
    }
    let pts: Vec<_> = l.vertices.iter().map(|&i| positions[i]).collect();
    part_types::newell_normal(&pts).norm() > 1e-12
}

/// Weld, repair and greedily merge coplanar neighbours of the same surface
/// into larger convex polygons. The enclosed volume is unchanged.
pub fn refine_polygons(polygons: &[Polygon]) -> Vec<Polygon> {
    let mut mesh = Mesh::from_polygons(polygons);
    let loops = std::mem::take(&mut mesh.loops);
    mesh.loops = merge_coplanar(&mesh.positions, loops);
    mesh.into_polygons()
}

/// Neighbours that may be merged into one polygon.
fn same_plane(a: &Loop, b: &Loop) -> bool {
    a.tag == b.tag && a.plane.coincides(&b.plane, WELD_TOLERANCE * 10.0)
}

/// Neighbours that belong to one face: one plane, or facets of one curved surface.
fn same_face(a: &Loop, b: &Loop) -> bool {
    match (a.tag, b.tag) {
        (SurfaceTag::Curved(x), SurfaceTag::Curved(y)) => x == y,
        _ => same_plane(a, b),
    }
}

fn merge_coplanar(positions: &[Point3<f64>], loops: Vec<Loop>) -> Vec<Loop> {
    let mut loops: Vec<Option<Loop>> = loops.into_iter().map(Some).collect();

    for _ in 0..MAX_MERGE_PASSES {
        let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
        for (li, l) in loops.iter().enumerate() {
            let Some(l) = l else { continue };
            let n = l.vertices.len();
            for k in 0..n {
                directed.insert((l.vertices[k], l.vertices[(k + 1) % n]), li);
            }
        }

        let mut touched = vec![false; loops.len()];
        let mut merged_any = false;
        for i in 0..loops.len() {
            if touched[i] {
                continue;
            }
            let Some(p) = loops[i].as_ref() else { continue };

            let n = p.vertices.len();
            let mut result = None;
            for k in 0..n {
                let (a, b) = (p.vertices[k], p.vertices[(k + 1) % n]);
                let Some(&j) = directed.get(&(b, a)) else {
                    continue;
                };
                if j == i || touched[j] {
                    continue;
                }
                let Some(q) = loops[j].as_ref() else { continue };
                if !same_plane(p, q) {
                    continue;
                }
                if let Some(merged) = try_merge(positions, p, k, q) {
                    result = Some((j, merged));
                    break;
                }
            }

            if let Some((j, merged)) = result {
                loops[i] = Some(merged);
                loops[j] = None;
                touched[i] = true;
                touched[j] = true;
                merged_any = true;
            }
        }
        if !merged_any {
            break;
        }
    }
    loops.into_iter().flatten().collect()
}

/// Join `p` and `q` across the edge `p[k] → p[k+1]` and any collinear
/// continuation of it they share. `None` when the result would not be convex.
fn try_merge(positions: &[Point3<f64>], p: &Loop, k: usize, q: &Loop) -> Option<Loop> {
    let (pv, qv) = (&p.vertices, &q.vertices);
    let (n, m) = (pv.len(), qv.len());
    let (a, b) = (pv[k], pv[(k + 1) % n]);
    let mut j = (0..m).find(|&j| qv[j] == b && qv[(j + 1) % m] == a)?;

    // Shared chain: q[j + 1 - t] == p[s + t] for t in 0..=len.
    let mut s = k;
    let mut len = 1;
    while len + 1 < n.min(m) && pv[(s + len + 1) % n] == qv[(j + m - len) % m] {
        len += 1;
    }
    while len + 1 < n.min(m) && pv[(s + n - 1) % n] == qv[(j + 2) % m] {
        s = (s + n - 1) % n;
        j = (j + 1) % m;
        len += 1;
    }

    let mut vertices = Vec::with_capacity(n + m - 2 * len);
    for t in 0..=(n - len) {
        vertices.push(pv[(s + len + t) % n]);
    }
    for t in 0..(m - len - 1) {
        vertices.push(qv[(j + 2 + t) % m]);
    }

    let mut seen = vertices.clone();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != vertices.len() || vertices.len() < 3 {
        return None;
    }
    if !is_convex_loop(positions, &vertices, &p.plane.normal) {
        return None;
    }
    Some(Loop {
        vertices,
        plane: p.plane,
        tag: p.tag,
    })
}

fn is_convex_loop(positions: &[Point3<f64>], vertices: &[usize], normal: &Vector3<f64>) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let a = positions[vertices[(i + n - 1) % n]];
        let b = positions[vertices[i]];
        let c = positions[vertices[(i + 1) % n]];
        let (e1, e2) = (b - a, c - b);
        let scale = e1.norm() * e2.norm();
        let turn = e1.cross(&e2).dot(normal);
        // A straight continuation is fine; doubling back is not.
        turn >= -1e-9 * scale && !(turn.abs() <= 1e-9 * scale && e1.dot(&e2) < 0.0)
    })
}

/// Disjoint-set forest with path halving.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// The smaller root wins so results do not depend on union order.
    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            self.parent[hi] = lo;
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaceRecord {
    pub loops: Vec<usize>,
    pub tag: SurfaceTag,
    pub plane: Plane,
    pub area: f64,
    pub centroid: Point3<f64>,
}

impl FaceRecord {
    pub fn kind(&self) -> SurfaceKind {
        match self.tag {
            SurfaceTag::Planar => SurfaceKind::Planar,
            SurfaceTag::Curved(_) => SurfaceKind::Curved,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeRecord {
    /// The two faces meeting here, lower index first.
    pub faces: (usize, usize),
    /// Vertex ids along the edge; first == last for closed edges.
    pub chain: Vec<usize>,
    pub curve: EdgeCurve,
    /// The loops on either side of the first segment, ordered like `faces`.
    pub side_loops: (usize, usize),
    pub length: f64,
}

impl EdgeRecord {
    /// Point at half the arc length.
    pub fn midpoint(&self, positions: &[Point3<f64>]) -> Point3<f64> {
        let half = self.length / 2.0;
        let mut walked = 0.0;
        for w in self.chain.windows(2) {
            let (a, b) = (positions[w[0]], positions[w[1]]);
            let seg = (b - a).norm();
            if walked + seg >= half && seg > 0.0 {
                return a + (b - a) * ((half - walked) / seg);
            }
            walked += seg;
        }
        positions[self.chain[0]]
    }
}

/// Faces, edges and solids of one polygon set.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub mesh: Mesh,
    pub loop_face: Vec<usize>,
    pub faces: Vec<FaceRecord>,
    pub edges: Vec<EdgeRecord>,
    pub components: usize,
}

impl Topology {
    pub fn analyze(polygons: &[Polygon]) -> Self {
        let mesh = Mesh::from_polygons(polygons);
        let edge_map = mesh.edge_map();
        let count = mesh.loops.len();

        let mut solids = UnionFind::new(count);
        let mut surfaces = UnionFind::new(count);
        for loops in edge_map.values() {
            for w in loops.windows(2) {
                solids.union(w[0], w[1]);
            }
            if loops.len() == 2 && same_face(&mesh.loops[loops[0]], &mesh.loops[loops[1]]) {
                surfaces.union(loops[0], loops[1]);
            }
        }

        let mut roots = BTreeSet::new();
        for li in 0..count {
            roots.insert(solids.find(li));
        }
        let components = roots.len();

        let mut face_of_root: BTreeMap<usize, usize> = BTreeMap::new();
        let mut loop_face = vec![0; count];
        let mut faces: Vec<FaceRecord> = Vec::new();
        for li in 0..count {
            let root = surfaces.find(li);
            let next = faces.len();
            let fi = *face_of_root.entry(root).or_insert(next);
            if fi == next {
                faces.push(FaceRecord {
                    loops: Vec::new(),
                    tag: mesh.loops[li].tag,
                    plane: mesh.loops[li].plane,
                    area: 0.0,
                    centroid: Point3::origin(),
                });
            }
            loop_face[li] = fi;
            faces[fi].loops.push(li);
        }
        for face in &mut faces {
            let mut weighted = Vector3::zeros();
            let mut area = 0.0;
            for &li in &face.loops {
                let l = &mesh.loops[li];
                let a = mesh.loop_area(l);
                weighted += mesh.loop_centroid(l).coords * a;
                area += a;
            }
            face.area = area;
            if area > 0.0 {
                face.centroid = Point3::from(weighted / area);
            }
        }

        let edges = collect_edges(&mesh, &edge_map, &loop_face, &faces);

        Topology {
            mesh,
            loop_face,
            faces,
            edges,
            components,
        }
    }
}

fn collect_edges(
    mesh: &Mesh,
    edge_map: &BTreeMap<(usize, usize), Vec<usize>>,
    loop_face: &[usize],
    faces: &[FaceRecord],
) -> Vec<EdgeRecord> {
    // Segments grouped by the face pair they separate.
    let mut groups: BTreeMap<(usize, usize), Vec<(usize, usize)>> = BTreeMap::new();
    let mut sides: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    for (&(u, v), loops) in edge_map {
        if loops.len() != 2 {
            continue;
        }
        let (la, lb) = (loops[0], loops[1]);
        let (fa, fb) = (loop_face[la], loop_face[lb]);
        if fa == fb {
            continue;
        }
        let key = (fa.min(fb), fa.max(fb));
        groups.entry(key).or_default().push((u, v));
        let ordered = if fa < fb { (la, lb) } else { (lb, la) };
        sides.insert((u, v), ordered);
    }

    let mut edges = Vec::new();
    for (pair, segments) in groups {
        for chain in chain_segments(&segments) {
            let first = (chain[0].min(chain[1]), chain[0].max(chain[1]));
            let Some(&side_loops) = sides.get(&first) else {
                continue;
            };
            let length: f64 = chain
                .windows(2)
                .map(|w| (mesh.positions[w[1]] - mesh.positions[w[0]]).norm())
                .sum();
            let both_planar = faces[pair.0].tag == SurfaceTag::Planar
                && faces[pair.1].tag == SurfaceTag::Planar;
            let curve = if both_planar && is_straight(&mesh.positions, &chain) {
                EdgeCurve::Line
            } else {
                EdgeCurve::Curve
            };
            edges.push(EdgeRecord {
                faces: pair,
                chain,
                curve,
                side_loops,
                length,
            });
        }
    }
    edges
}

/// Split a set of undirected segments into maximal chains. Chains run
/// through vertices of degree two; closed loops end on their start vertex.
fn chain_segments(segments: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(u, v) in segments {
        adjacency.entry(u).or_default().push(v);
        adjacency.entry(v).or_default().push(u);
    }
    for neighbours in adjacency.values_mut() {
        neighbours.sort_unstable();
    }

    let key = |a: usize, b: usize| (a.min(b), a.max(b));
    let mut used: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut chains = Vec::new();

    let walk = |start: usize,
                next: usize,
                used: &mut BTreeSet<(usize, usize)>|
     -> Vec<usize> {
        let mut chain = vec![start, next];
        used.insert(key(start, next));
        let mut current = next;
        loop {
            let Some(neighbours) = adjacency.get(&current) else {
                break;
            };
            if neighbours.len() != 2 {
                break;
            }
            let Some(&following) = neighbours.iter().find(|&&w| !used.contains(&key(current, w)))
            else {
                break;
            };
            used.insert(key(current, following));
            chain.push(following);
            current = following;
        }
        chain
    };

    // Open chains start at ends and junctions.
    for (&vertex, neighbours) in &adjacency {
        if neighbours.len() == 2 {
            continue;
        }
        for &next in neighbours {
            if !used.contains(&key(vertex, next)) {
                chains.push(walk(vertex, next, &mut used));
            }
        }
    }
    // Whatever is left forms closed loops.
    for (&vertex, neighbours) in &adjacency {
        for &next in neighbours {
            if !used.contains(&key(vertex, next)) {
                chains.push(walk(vertex, next, &mut used));
            }
        }
    }
    chains
}

fn is_straight(positions: &[Point3<f64>], chain: &[usize]) -> bool {
    let (first, last) = (chain[0], chain[chain.len() - 1]);
    if first == last {
        return false;
    }
    let (a, b) = (positions[first], positions[last]);
    let len = (b - a).norm();
    if len <= WELD_TOLERANCE {
        return false;
    }
    let dir = (b - a) / len;
    chain.iter().all(|&i| {
        let rel = positions[i] - a;
        (rel - dir * rel.dot(&dir)).norm() <= WELD_TOLERANCE * 10.0
    })
}
