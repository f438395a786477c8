#![allow(clippy::float_cmp)]

use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// =============================================================
// Point
// =============================================================

#[test]
fn rotate_about_zero_is_identity() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.rotate_about(Point::new(1.0, 1.0), 0.0), p);
}

#[test]
fn rotate_about_ninety_is_clockwise_on_y_down() {
    let p = Point::new(10.0, 0.0).rotate_about(Point::new(0.0, 0.0), 90.0);
    assert!(approx(p.x, 0.0));
    assert!(approx(p.y, 10.0));
}

#[test]
fn rotate_then_inverse_round_trips() {
    let c = Point::new(50.0, 40.0);
    let p = Point::new(12.0, 77.0);
    let back = p.rotate_about(c, 33.0).rotate_about(c, -33.0);
    assert!(approx(back.x, p.x));
    assert!(approx(back.y, p.y));
}

#[test]
fn angle_from_axes() {
    let c = Point::new(0.0, 0.0);
    assert!(approx(Point::new(1.0, 0.0).angle_from(c), 0.0));
    assert!(approx(Point::new(0.0, 1.0).angle_from(c), 90.0));
    assert!(approx(Point::new(-1.0, 0.0).angle_from(c), 180.0));
}

// =============================================================
// Rect
// =============================================================

#[test]
fn from_corners_normalizes_negative_extent() {
    let r = Rect::from_corners(Point::new(100.0, 80.0), Point::new(20.0, 10.0));
    assert_eq!(r, Rect::new(20.0, 10.0, 80.0, 70.0));
}

#[test]
fn intersects_overlapping_and_disjoint() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    assert!(a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    assert!(!a.intersects(&Rect::new(11.0, 0.0, 5.0, 5.0)));
    assert!(!a.intersects(&Rect::new(0.0, 20.0, 5.0, 5.0)));
}

#[test]
fn contains_and_inflate() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(r.contains(Point::new(10.0, 30.0)));
    assert!(!r.contains(Point::new(5.0, 15.0)));
    assert!(r.inflate(6.0).contains(Point::new(5.0, 15.0)));
}

// =============================================================
// Degrees
// =============================================================

#[test]
fn normalize_degrees_wraps_into_range() {
    assert_eq!(normalize_degrees(0.0), 0.0);
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(370.0), 10.0);
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert_eq!(normalize_degrees(-720.0), 0.0);
    let tiny = normalize_degrees(-1e-15);
    assert!((0.0..360.0).contains(&tiny));
}

// =============================================================
// Viewport
// =============================================================

#[test]
fn css_to_canvas_scales_by_display_ratio() {
    let mut vp = Viewport::new(Size::new(1000.0, 500.0));
    vp.display = Size::new(500.0, 250.0);
    let p = vp.css_to_canvas(Point::new(100.0, 50.0));
    assert_eq!(p, Point::new(200.0, 100.0));
}

#[test]
fn css_to_canvas_with_zero_display_is_identity() {
    let mut vp = Viewport::new(Size::new(1000.0, 500.0));
    vp.display = Size::default();
    assert_eq!(vp.css_to_canvas(Point::new(7.0, 9.0)), Point::new(7.0, 9.0));
}

#[test]
fn shown_size_overrides_computed_display() {
    // Fitted to 800 wide, but host CSS caps the element at 400.
    let mut vp = Viewport::new(Size::new(800.0, 600.0));
    vp.display = Size::new(800.0, 600.0);
    let p = vp.css_to_canvas_shown(Point::new(200.0, 150.0), Size::new(400.0, 300.0));
    assert_eq!(p, Point::new(400.0, 300.0));
}

#[test]
fn zero_shown_size_falls_back_to_display() {
    let mut vp = Viewport::new(Size::new(1000.0, 500.0));
    vp.display = Size::new(500.0, 250.0);
    let p = vp.css_to_canvas_shown(Point::new(100.0, 50.0), Size::default());
    assert_eq!(p, Point::new(200.0, 100.0));
}

#[test]
fn fit_display_shrinks_preserving_aspect() {
    let policy = DisplayConfig { margin_x: 0.0, margin_y: 0.0, min_width: 0.0 };
    let s = fit_display(Size::new(2000.0, 1000.0), Size::new(1000.0, 1000.0), &policy);
    assert_eq!(s, Size::new(1000.0, 500.0));
}

#[test]
fn fit_display_never_upscales() {
    let policy = DisplayConfig { margin_x: 0.0, margin_y: 0.0, min_width: 0.0 };
    let s = fit_display(Size::new(300.0, 200.0), Size::new(1920.0, 1080.0), &policy);
    assert_eq!(s, Size::new(300.0, 200.0));
}

#[test]
fn fit_display_respects_margins() {
    let policy = DisplayConfig { margin_x: 50.0, margin_y: 0.0, min_width: 0.0 };
    let s = fit_display(Size::new(1000.0, 100.0), Size::new(600.0, 1000.0), &policy);
    assert_eq!(s.width, 500.0);
    assert_eq!(s.height, 50.0);
}

#[test]
fn fit_display_applies_min_width_floor() {
    let policy = DisplayConfig { margin_x: 0.0, margin_y: 0.0, min_width: 280.0 };
    let s = fit_display(Size::new(1000.0, 1000.0), Size::new(200.0, 200.0), &policy);
    assert_eq!(s, Size::new(280.0, 280.0));
}

#[test]
fn fit_display_floor_never_exceeds_natural() {
    let policy = DisplayConfig { margin_x: 0.0, margin_y: 0.0, min_width: 280.0 };
    let s = fit_display(Size::new(150.0, 100.0), Size::new(100.0, 100.0), &policy);
    assert_eq!(s, Size::new(150.0, 100.0));
}

#[test]
fn refit_updates_display() {
    let mut vp = Viewport::new(Size::new(2000.0, 1000.0));
    vp.window = Size::new(1000.0, 2000.0);
    vp.refit(&DisplayConfig { margin_x: 0.0, margin_y: 0.0, min_width: 0.0 });
    assert_eq!(vp.display, Size::new(1000.0, 500.0));
}
