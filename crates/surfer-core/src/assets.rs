//! Asset decoding and load-state tracking.
//!
//! Fetching is platform-specific and lives in the web crate; everything here
//! operates on byte slices so it can run (and be tested) on any host. Each
//! asset is tracked as pending/ready/failed and the frame driver polls the
//! state, so a partially loaded scene still renders.

use glam::{Mat3, Mat4, Vec2, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("HDR decode error: {0}")]
    Hdr(#[from] image::ImageError),
    #[error("{0}")]
    Unsupported(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Structured failure signal surfaced to the hosting page.
#[derive(Clone, Debug)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn load_error(title: &str, description: String) -> Self {
        Self {
            severity: Severity::Error,
            title: title.to_string(),
            description,
        }
    }
}

/// Lifecycle of one asynchronously loaded asset.
pub enum LoadState<T> {
    Pending,
    Ready(T),
    Failed,
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    /// Take the payload out, leaving `Failed` behind so installation happens
    /// exactly once.
    pub fn take_ready(&mut self) -> Option<T> {
        if matches!(self, LoadState::Ready(_)) {
            match std::mem::replace(self, LoadState::Failed) {
                LoadState::Ready(v) => Some(v),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl TextureData {
    pub fn white_1x1() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba8: vec![255, 255, 255, 255],
        }
    }
}

/// One drawable primitive with its node transform baked into the vertices.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material_name: String,
    pub base_color_factor: [f32; 4],
    pub emissive_factor: [f32; 3],
    /// Indices into [`SceneModel::images`].
    pub base_color_image: Option<usize>,
    pub emissive_image: Option<usize>,
}

impl MeshData {
    pub fn has_emissive_map(&self) -> bool {
        self.emissive_image.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct SceneModel {
    pub meshes: Vec<MeshData>,
    pub images: Vec<TextureData>,
}

/// Decoded equirectangular HDR environment, RGBA f32 texels (alpha 1).
#[derive(Clone, Debug)]
pub struct EquirectImage {
    pub width: u32,
    pub height: u32,
    pub rgba_f32: Vec<f32>,
}

/// Parse a binary glTF (.glb) blob into CPU-side mesh/texture data.
pub fn parse_glb(bytes: &[u8]) -> Result<SceneModel, AssetError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;

    let images = images.iter().map(image_to_rgba8).collect::<Vec<_>>();

    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Unsupported("glb contains no scene".into()))?;
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
    }
    if meshes.is_empty() {
        return Err(AssetError::Unsupported("glb contains no mesh data".into()));
    }

    Ok(SceneModel { meshes, images })
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), AssetError> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&*buffers[buffer.index()]));
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(iter) => iter
                    .map(|p| world.transform_point3(Vec3::from_array(p)).to_array())
                    .collect(),
                None => continue, // positionless primitive, nothing to draw
            };
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter
                    .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero().to_array())
                    .collect(),
                None => vec![[0.0, 1.0, 0.0]; positions.len()],
            };
            let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(tc) => tc.into_f32().map(|uv| Vec2::from_array(uv).to_array()).collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };
            let indices: Vec<u32> = match reader.read_indices() {
                Some(idx) => idx.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let material = primitive.material();
            let pbr = material.pbr_metallic_roughness();
            out.push(MeshData {
                positions,
                normals,
                uvs,
                indices,
                material_name: material.name().unwrap_or_default().to_string(),
                base_color_factor: pbr.base_color_factor(),
                emissive_factor: material.emissive_factor(),
                base_color_image: pbr
                    .base_color_texture()
                    .map(|info| info.texture().source().index()),
                emissive_image: material
                    .emissive_texture()
                    .map(|info| info.texture().source().index()),
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn image_to_rgba8(data: &gltf::image::Data) -> TextureData {
    use gltf::image::Format;
    let n = (data.width * data.height) as usize;
    let rgba8 = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => {
            let mut out = Vec::with_capacity(n * 4);
            for px in data.pixels.chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
            out
        }
        Format::R8 => {
            let mut out = Vec::with_capacity(n * 4);
            for &v in &data.pixels {
                out.extend_from_slice(&[v, v, v, 255]);
            }
            out
        }
        Format::R8G8 => {
            let mut out = Vec::with_capacity(n * 4);
            for px in data.pixels.chunks_exact(2) {
                out.extend_from_slice(&[px[0], px[1], 0, 255]);
            }
            out
        }
        other => {
            log::warn!("unsupported glb texture format {:?}; substituting white", other);
            return TextureData::white_1x1();
        }
    };
    TextureData {
        width: data.width,
        height: data.height,
        rgba8,
    }
}

/// Decode a Radiance .hdr blob into linear RGBA f32 texels.
pub fn decode_hdr(bytes: &[u8]) -> Result<EquirectImage, AssetError> {
    let decoded = image::load_from_memory(bytes)?.to_rgb32f();
    let (width, height) = decoded.dimensions();
    let mut rgba_f32 = Vec::with_capacity((width * height * 4) as usize);
    for px in decoded.pixels() {
        rgba_f32.extend_from_slice(&[px.0[0], px.0[1], px.0[2], 1.0]);
    }
    Ok(EquirectImage {
        width,
        height,
        rgba_f32,
    })
}
