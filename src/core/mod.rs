pub mod constants;
pub mod lifecycle;
pub mod policy;
pub mod scene;
pub mod showcase;
pub mod signals;
pub mod store;
pub mod timing;

pub use constants::*;
pub use lifecycle::*;
pub use policy::*;
pub use scene::*;
pub use showcase::*;
pub use signals::*;
pub use store::*;
pub use timing::*;

// Shaders bundled as string constants
pub static PLANES_WGSL: &str = include_str!("../../shaders/planes.wgsl");
