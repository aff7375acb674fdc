/// Column-major 4×4 transform, laid out like immediate-mode device matrices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    /// `cols[c][r]` is the element at row `r`, column `c`.
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Orthographic projection mapping the box
    /// `[left, right] × [bottom, top] × [-near, -far]` to normalized device space.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fnr = far - near;
        Self {
            cols: [
                [2.0 / rl, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tb, 0.0, 0.0],
                [0.0, 0.0, -2.0 / fnr, 0.0],
                [-(right + left) / rl, -(top + bottom) / tb, -(far + near) / fnr, 1.0],
            ],
        }
    }

    /// Projection for a framebuffer of `width × height` pixels with the origin
    /// at the top-left corner (row 0 is the top row).
    #[inline]
    pub fn screen_ortho(width: f32, height: f32) -> Self {
        Self::ortho(0.0, width, height, 0.0, 0.0, 1.0)
    }

    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut cols = [[0.0f32; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, out) in col.iter_mut().enumerate() {
                *out = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols }
    }

    /// Transforms the point `(x, y, 0, 1)` and returns the resulting `x, y`
    /// after the perspective divide.
    pub fn transform_point(&self, x: f32, y: f32) -> [f32; 2] {
        let m = &self.cols;
        let px = m[0][0] * x + m[1][0] * y + m[3][0];
        let py = m[0][1] * x + m[1][1] * y + m[3][1];
        let pw = m[0][3] * x + m[1][3] * y + m[3][3];
        if pw == 0.0 { [px, py] } else { [px / pw, py / pw] }
    }
}
