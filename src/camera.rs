use crate::core::CAMERA_FOVY_DEG;
use glam::Mat4;

/// Perspective projection for the showcase camera (wgpu 0..1 depth).
#[inline]
pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(CAMERA_FOVY_DEG.to_radians(), aspect.max(0.01), 0.1, 100.0)
}
