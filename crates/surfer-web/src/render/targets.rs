use surfer_core::BLOOM_MIP_COUNT;

use super::helpers;

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub struct Target {
    pub tex: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    fn color(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let (tex, view) = helpers::create_color_texture(
            device,
            label,
            width,
            height,
            HDR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        Self { tex, view }
    }
}

/// All offscreen attachments, recreated together on resize.
///
/// `bright` doubles as the bloom-composite scratch target: by the time the
/// composite runs, every blur stage has already consumed it.
pub struct RenderTargets {
    pub hdr: Target,
    pub depth: Target,
    pub bright: Target,
    /// Shared horizontal-blur intermediate.
    pub ping: Target,
    /// Per-stage vertical-blur results, inputs to the composite.
    pub blur: Vec<Target>,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (depth_tex, depth_view) =
            helpers::create_depth_texture(device, "scene_depth", width, height);
        Self {
            hdr: Target::color(device, "hdr_tex", width, height),
            depth: Target {
                tex: depth_tex,
                view: depth_view,
            },
            bright: Target::color(device, "bright_tex", width, height),
            ping: Target::color(device, "blur_ping", width, height),
            blur: (0..BLOOM_MIP_COUNT)
                .map(|i| Target::color(device, &format!("blur_v{i}"), width, height))
                .collect(),
        }
    }
}
