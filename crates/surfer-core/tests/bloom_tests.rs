// Host-side tests for the bloom math mirrored by the WGSL passes.

use surfer_core::bloom::*;
use surfer_core::constants::*;

#[test]
fn luminance_uses_rec601_weights() {
    assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    assert!((luminance([1.0, 0.0, 0.0]) - 0.299).abs() < 1e-6);
    assert!((luminance([0.0, 1.0, 0.0]) - 0.587).abs() < 1e-6);
    assert!((luminance([0.0, 0.0, 1.0]) - 0.114).abs() < 1e-6);
}

#[test]
fn bright_response_is_zero_below_threshold() {
    assert_eq!(bright_response(0.0, BLOOM_THRESHOLD, BLOOM_SMOOTH_WIDTH), 0.0);
    assert_eq!(
        bright_response(BLOOM_THRESHOLD, BLOOM_THRESHOLD, BLOOM_SMOOTH_WIDTH),
        0.0
    );
}

#[test]
fn bright_response_saturates_past_the_band() {
    let r = bright_response(
        BLOOM_THRESHOLD + BLOOM_SMOOTH_WIDTH,
        BLOOM_THRESHOLD,
        BLOOM_SMOOTH_WIDTH,
    );
    assert!((r - 1.0).abs() < 1e-6);
    let r = bright_response(10.0, BLOOM_THRESHOLD, BLOOM_SMOOTH_WIDTH);
    assert!((r - 1.0).abs() < 1e-6);
}

#[test]
fn bright_response_is_monotonic_across_the_band() {
    let mut prev = -1.0f32;
    for i in 0..=100 {
        let lum = BLOOM_THRESHOLD - 0.05 + 0.002 * i as f32;
        let r = bright_response(lum, BLOOM_THRESHOLD, BLOOM_SMOOTH_WIDTH);
        assert!(r >= prev, "response decreased at luminance {lum}");
        prev = r;
    }
}

#[test]
fn blur_weights_normalize_to_one() {
    for &radius in &BLOOM_KERNEL_RADII {
        let w = blur_weights(radius);
        assert_eq!(w.len(), radius as usize);
        let total: f32 = w[0] + 2.0 * w[1..].iter().sum::<f32>();
        assert!(
            (total - 1.0).abs() < 1e-5,
            "kernel radius {radius} sums to {total}"
        );
    }
}

#[test]
fn blur_weights_decay_from_center() {
    let w = blur_weights(11);
    for pair in w.windows(2) {
        assert!(pair[0] > pair[1]);
    }
}

#[test]
fn gaussian_pdf_peaks_at_zero() {
    for sigma in [3.0f32, 5.0, 7.0, 9.0, 11.0] {
        let center = gaussian_pdf(0.0, sigma);
        assert!(gaussian_pdf(1.0, sigma) < center);
        assert!(gaussian_pdf(sigma, sigma) < gaussian_pdf(1.0, sigma));
    }
}

#[test]
fn lerp_bloom_factor_endpoints() {
    // radius 0 keeps the per-stage factor, radius 1 mirrors it around 0.6
    for &f in &BLOOM_FACTORS {
        assert!((lerp_bloom_factor(f, 0.0) - f).abs() < 1e-6);
        assert!((lerp_bloom_factor(f, 1.0) - (1.2 - f)).abs() < 1e-6);
    }
}

#[test]
fn lerp_bloom_factor_flattens_the_stage_profile() {
    // At the shipped radius the outer stages gain weight relative to their
    // 0-radius factors while the innermost one loses some.
    let inner = lerp_bloom_factor(BLOOM_FACTORS[0], BLOOM_RADIUS);
    let outer = lerp_bloom_factor(BLOOM_FACTORS[4], BLOOM_RADIUS);
    assert!(inner < BLOOM_FACTORS[0]);
    assert!(outer > BLOOM_FACTORS[4]);
}

#[test]
fn kernel_radius_matches_stage_table() {
    for mip in 0..BLOOM_MIP_COUNT {
        assert_eq!(kernel_radius_for_mip(mip), BLOOM_KERNEL_RADII[mip]);
    }
}
