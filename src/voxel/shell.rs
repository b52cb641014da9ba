use tracing::debug;

use crate::math::{round_to_index, Vector3};
use crate::mesh::Component;

use super::VoxelGrid;

impl VoxelGrid {
    /// Marks every voxel a surface of `component` passes through.
    ///
    /// Over-rasterizes rather than under-rasterizes, so a closed mesh yields a
    /// watertight shell.
    pub fn create_shell(&mut self, component: &Component) {
        let before = self.occupied_count();
        for face in component.faces() {
            let corners = component.face_corners(face).map(|c| self.lattice_coordinate(&c));
            self.rasterize_triangle(corners);
        }
        debug!(
            faces = component.faces().len(),
            marked = self.occupied_count() - before,
            "rasterized shell"
        );
    }

    /// Two-axis DDA over a triangle given in lattice coordinates.
    ///
    /// The two edges leaving the vertex opposite the shortest side are walked
    /// in lockstep; each pair of walked points is joined by an inner DDA line.
    fn rasterize_triangle(&mut self, [mut v1, mut v2, mut v3]: [Vector3; 3]) {
        // Arrange for v2-v3 to be the shortest side.
        let v2v1 = (v2 - v1).norm();
        let v3v2 = (v3 - v2).norm();
        if v3v2 > v2v1 {
            std::mem::swap(&mut v1, &mut v3);
        }
        let v3v1 = (v3 - v1).norm();
        if v3v2 > v3v1 {
            std::mem::swap(&mut v1, &mut v2);
        }

        let mut d2 = v2 - v1;
        let mut d3 = v3 - v1;
        let outer = 2.0 * d2.norm().max(d3.norm());
        if outer > 0.0 {
            d2 /= outer;
            d3 /= outer;
        }

        self.mark_rounded(v1.x, v1.y, v1.z);

        let mut lp1 = v1 + d2;
        let mut lp2 = v1 + d3;
        let mut k = 0.0;
        while k <= outer {
            self.rasterize_segment(&lp1, &lp2);
            lp1 += d2;
            lp2 += d3;
            k += 1.0;
        }
    }

    /// Inner DDA. Each step rounds and marks x, then y, then z in turn, so a
    /// diagonal step leaves a staircase instead of a gap.
    fn rasterize_segment(&mut self, from: &Vector3, to: &Vector3) {
        let mut d = to - from;
        let step = 2.0 * d.norm();
        if step > 0.0 {
            d /= step;
        }

        let mut pos = *from;
        let mut yi = self.clamp_to_interior(round_to_index(pos.y), 1);
        let mut zi = self.clamp_to_interior(round_to_index(pos.z), 2);
        let mut i = 0.0;
        while i <= step {
            let xi = self.clamp_to_interior(round_to_index(pos.x), 0);
            self.mark(xi, yi, zi);
            yi = self.clamp_to_interior(round_to_index(pos.y), 1);
            self.mark(xi, yi, zi);
            zi = self.clamp_to_interior(round_to_index(pos.z), 2);
            self.mark(xi, yi, zi);

            pos += d;
            i += 1.0;
        }
    }

    fn mark_rounded(&mut self, x: f64, y: f64, z: f64) {
        let xi = self.clamp_to_interior(round_to_index(x), 0);
        let yi = self.clamp_to_interior(round_to_index(y), 1);
        let zi = self.clamp_to_interior(round_to_index(z), 2);
        self.mark(xi, yi, zi);
    }
}
