use super::constants::{DEFAULT_CORES, DEFAULT_DEVICE_MEMORY_GB};

/// Snapshot of the device/viewport/preference primitives the policy reads.
///
/// Every optional field is `None` when the host does not expose the
/// underlying API; the accessors below substitute the conservative value.
#[derive(Clone, Debug, PartialEq)]
pub struct Capabilities {
    pub reduced_motion: bool,
    pub save_data: bool,
    pub device_memory_gb: Option<f64>,
    pub hardware_cores: Option<u32>,
    pub coarse_pointer: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub device_pixel_ratio: f64,
    pub document_visible: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            save_data: false,
            device_memory_gb: None,
            hardware_cores: None,
            coarse_pointer: false,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            device_pixel_ratio: 1.0,
            document_visible: true,
        }
    }
}

impl Capabilities {
    /// Device memory in GB; unreported memory counts as capable.
    #[inline]
    pub fn memory_gb(&self) -> f64 {
        match self.device_memory_gb {
            Some(m) if m.is_finite() && m > 0.0 => m,
            _ => DEFAULT_DEVICE_MEMORY_GB,
        }
    }

    #[inline]
    pub fn cores(&self) -> u32 {
        match self.hardware_cores {
            Some(c) if c > 0 => c,
            _ => DEFAULT_CORES,
        }
    }

    /// Device pixel ratio, falling back to 1 for zero/NaN reports.
    #[inline]
    pub fn dpr(&self) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio as f32
        } else {
            1.0
        }
    }
}
