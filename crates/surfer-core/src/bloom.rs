//! CPU-side bloom math, mirrored by `shaders/post.wgsl` and
//! `shaders/bloom_composite.wgsl`. Kept here so the kernel and compositing
//! behavior can be asserted in host tests.

use crate::constants::{BLOOM_KERNEL_RADII, BLOOM_MIP_COUNT};

/// Rec. 601 luma, matching the bright-pass shader.
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Bright-pass gate: 0 below the threshold, 1 past the soft transition band.
#[inline]
pub fn bright_response(lum: f32, threshold: f32, smooth_width: f32) -> f32 {
    smoothstep(threshold, threshold + smooth_width, lum)
}

/// Unnormalized Gaussian weight at offset `x`.
#[inline]
pub fn gaussian_pdf(x: f32, sigma: f32) -> f32 {
    0.39894 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
}

/// Normalized separable blur weights for one mip stage. Index 0 is the
/// center tap; indices 1..radius apply to both sides, so
/// `w[0] + 2 * sum(w[1..])` is 1.
pub fn blur_weights(kernel_radius: u32) -> Vec<f32> {
    let sigma = kernel_radius as f32;
    let mut weights = Vec::with_capacity(kernel_radius as usize);
    let mut sum = gaussian_pdf(0.0, sigma);
    weights.push(sum);
    for i in 1..kernel_radius {
        let w = gaussian_pdf(i as f32, sigma);
        weights.push(w);
        sum += 2.0 * w;
    }
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Radius remap used by the compositor: blends each configured factor with
/// its reflection about 0.6, so a single radius knob shifts weight between
/// fine and coarse mips.
#[inline]
pub fn lerp_bloom_factor(factor: f32, bloom_radius: f32) -> f32 {
    let mirror = 1.2 - factor;
    factor + (mirror - factor) * bloom_radius
}

/// Per-stage kernel radii; fixed for the lifetime of the pass.
pub fn kernel_radius_for_mip(mip: usize) -> u32 {
    debug_assert!(mip < BLOOM_MIP_COUNT);
    BLOOM_KERNEL_RADII[mip]
}
