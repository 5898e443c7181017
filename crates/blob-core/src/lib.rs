pub mod constants;
pub mod displace;
pub mod mesh;
pub mod presets;
pub mod reaction;
pub static BLOB_WGSL: &str = include_str!("../shaders/blob.wgsl");

pub use constants::*;
pub use displace::*;
pub use mesh::*;
pub use presets::*;
pub use reaction::*;
