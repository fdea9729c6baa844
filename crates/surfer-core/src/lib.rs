pub mod anim;
pub mod assets;
pub mod bloom;
pub mod camera;
pub mod constants;
pub mod particles;
pub mod scroll;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");
pub static BLOOM_COMPOSITE_WGSL: &str = include_str!("../shaders/bloom_composite.wgsl");

pub use anim::*;
pub use assets::*;
pub use bloom::*;
pub use camera::*;
pub use constants::*;
pub use particles::*;
pub use scroll::*;
