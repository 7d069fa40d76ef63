//! Unit tests for swapchain_plan.rs

use crate::error::Error;
use crate::renderer::swapchain_plan::*;

fn caps(min: u32, max: u32) -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_image_count: min,
        max_image_count: max,
        current_extent: Extent2D::new(800, 600),
        min_image_extent: Extent2D::new(1, 1),
        max_image_extent: Extent2D::new(4096, 4096),
    }
}

fn format(format: ColorFormat, color_space: ColorSpace) -> SurfaceFormat {
    SurfaceFormat { format, color_space }
}

// ============================================================================
// IMAGE COUNT
// ============================================================================

#[test]
fn test_image_count_unbounded_is_min_plus_one() {
    for min in 1..6 {
        assert_eq!(choose_image_count(&caps(min, 0)), min + 1);
    }
}

#[test]
fn test_image_count_capped_by_max() {
    assert_eq!(choose_image_count(&caps(2, 8)), 3);
    assert_eq!(choose_image_count(&caps(2, 3)), 3);
    assert_eq!(choose_image_count(&caps(2, 2)), 2);
    assert_eq!(choose_image_count(&caps(3, 3)), 3);
}

#[test]
fn test_image_count_matches_formula_for_all_small_surfaces() {
    for min in 1..8 {
        for max in 0..10 {
            if max != 0 && max < min {
                continue;
            }
            let expected = if max == 0 { min + 1 } else { (min + 1).min(max) };
            assert_eq!(choose_image_count(&caps(min, max)), expected, "min {} max {}", min, max);
        }
    }
}

// ============================================================================
// SURFACE FORMAT
// ============================================================================

#[test]
fn test_surface_format_exact_match() {
    let formats = [
        format(ColorFormat::R8G8B8A8_SRGB, ColorSpace::SrgbNonlinear),
        format(ColorFormat::B8G8R8A8_UNORM, ColorSpace::SrgbNonlinear),
    ];
    assert_eq!(choose_surface_format(&formats).unwrap(), PREFERRED_SURFACE_FORMAT);
}

#[test]
fn test_surface_format_undefined_means_anything() {
    let formats = [format(ColorFormat::UNDEFINED, ColorSpace::SrgbNonlinear)];
    assert_eq!(choose_surface_format(&formats).unwrap(), PREFERRED_SURFACE_FORMAT);
}

#[test]
fn test_surface_format_wrong_color_space_rejected() {
    let formats = [
        format(ColorFormat::B8G8R8A8_UNORM, ColorSpace::Other),
        format(ColorFormat::B8G8R8A8_SRGB, ColorSpace::SrgbNonlinear),
    ];
    assert!(matches!(choose_surface_format(&formats), Err(Error::NotFound(_))));
}

// ============================================================================
// PRESENT MODE AND EXTENT
// ============================================================================

#[test]
fn test_present_mode_is_fifo() {
    let modes = [PresentMode::Mailbox, PresentMode::Fifo, PresentMode::Immediate];
    assert_eq!(choose_present_mode(&modes).unwrap(), PresentMode::Fifo);
    assert!(choose_present_mode(&[PresentMode::Mailbox]).is_err());
}

#[test]
fn test_extent_uses_current_extent() {
    let extent = choose_extent(&caps(2, 0), Extent2D::new(1920, 1080));
    assert_eq!(extent, Extent2D::new(800, 600));
}

#[test]
fn test_extent_special_value_clamps_window() {
    let mut c = caps(2, 0);
    c.current_extent = Extent2D::new(u32::MAX, u32::MAX);
    c.max_image_extent = Extent2D::new(1024, 512);
    assert_eq!(choose_extent(&c, Extent2D::new(800, 600)), Extent2D::new(800, 512));
}

#[test]
fn test_aspect_ratio() {
    assert!((Extent2D::new(800, 600).aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
}

// ============================================================================
// FULL PLAN
// ============================================================================

#[test]
fn test_plan_combines_all_choices() {
    let plan = SwapchainPlan::new(
        &caps(2, 3),
        &[format(ColorFormat::B8G8R8A8_UNORM, ColorSpace::SrgbNonlinear)],
        &[PresentMode::Fifo],
        Extent2D::new(800, 600),
    ).unwrap();

    assert_eq!(plan.surface_format, PREFERRED_SURFACE_FORMAT);
    assert_eq!(plan.present_mode, PresentMode::Fifo);
    assert_eq!(plan.extent, Extent2D::new(800, 600));
    assert_eq!(plan.image_count, 3);
}

#[test]
fn test_plan_rejects_empty_queries() {
    let result = SwapchainPlan::new(&caps(2, 0), &[], &[PresentMode::Fifo], Extent2D::new(800, 600));
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}
