use price_chart_tools::domain::geometry::{
    Point, Rect, clip_line_to_rect, compute_arrow_head, distance_point_to_segment, point_in_circle, point_in_rect,
    point_in_triangle, smooth_polyline,
};
use quickcheck_macros::quickcheck;

fn pt(x: i16, y: i16) -> Point {
    Point::new(x as f64, y as f64)
}

#[quickcheck]
fn segment_distance_never_exceeds_endpoint_distance(p: (i16, i16), a: (i16, i16), b: (i16, i16)) -> bool {
    let (p, a, b) = (pt(p.0, p.1), pt(a.0, a.1), pt(b.0, b.1));
    let d = distance_point_to_segment(p, a, b);
    d >= 0.0 && d <= p.distance_to(a) + 1e-9 && d <= p.distance_to(b) + 1e-9
}

#[quickcheck]
fn points_on_the_segment_have_zero_distance(a: (i16, i16), b: (i16, i16), t: u8) -> bool {
    let (a, b) = (pt(a.0, a.1), pt(b.0, b.1));
    let t = t as f64 / 255.0;
    let on = a + (b - a).scaled(t);
    distance_point_to_segment(on, a, b) < 1e-6
}

#[test]
fn perpendicular_distance_to_horizontal_segment() {
    let d = distance_point_to_segment(Point::new(50.0, 7.0), Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    assert!((d - 7.0).abs() < 1e-9);
    let past_end = distance_point_to_segment(Point::new(103.0, 4.0), Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    assert!((past_end - 5.0).abs() < 1e-9);
}

#[test]
fn containment_tests() {
    let rect = Rect::from_corners(Point::new(10.0, 40.0), Point::new(30.0, 20.0));
    assert!(point_in_rect(Point::new(20.0, 30.0), &rect));
    assert!(point_in_rect(Point::new(10.0, 20.0), &rect));
    assert!(!point_in_rect(Point::new(31.0, 30.0), &rect));

    assert!(point_in_circle(Point::new(3.0, 4.0), Point::default(), 5.0));
    assert!(!point_in_circle(Point::new(3.0, 4.1), Point::default(), 5.0));

    let (a, b, c) = (Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0));
    assert!(point_in_triangle(Point::new(2.0, 2.0), a, b, c));
    assert!(!point_in_triangle(Point::new(8.0, 8.0), a, b, c));
    assert!(!point_in_triangle(Point::new(1.0, 0.0), a, b, Point::new(20.0, 0.0)));
}

#[test]
fn unextended_lines_are_returned_as_is() {
    let p1 = Point::new(-50.0, 10.0);
    let p2 = Point::new(500.0, 10.0);
    let seg = clip_line_to_rect(p1, p2, 100.0, 50.0, false, false).expect("segment");
    assert_eq!((seg.a, seg.b), (p1, p2));
}

#[test]
fn extended_line_spans_the_pane() {
    let seg = clip_line_to_rect(Point::new(10.0, 10.0), Point::new(20.0, 10.0), 100.0, 50.0, true, true)
        .expect("visible chord");
    let mut xs = [seg.a.x, seg.b.x];
    xs.sort_by(f64::total_cmp);
    assert!(xs[0].abs() < 1e-6 && (xs[1] - 100.0).abs() < 1e-6);
    assert!((seg.a.y - 10.0).abs() < 1e-6 && (seg.b.y - 10.0).abs() < 1e-6);
}

#[test]
fn left_extension_starts_at_second_anchor() {
    let p2 = Point::new(60.0, 25.0);
    let seg = clip_line_to_rect(Point::new(40.0, 25.0), p2, 100.0, 50.0, true, false).expect("ray");
    assert_eq!(seg.a, p2);
    assert!(seg.b.x.abs() < 1e-6);
}

#[test]
fn coincident_anchors_cannot_be_extended() {
    let p = Point::new(5.0, 5.0);
    assert!(clip_line_to_rect(p, p, 100.0, 50.0, true, true).is_none());
    assert!(clip_line_to_rect(Point::new(200.0, 0.0), Point::new(200.0, 10.0), 100.0, 50.0, true, true).is_none());
}

#[test]
fn arrow_barbs_trail_the_tip() {
    let tip = Point::new(100.0, 0.0);
    let head = compute_arrow_head(Point::new(0.0, 0.0), tip, 2.0);
    assert_eq!(head.len(), 4);
    assert!(head.iter().all(|s| s.a.x <= tip.x + 1e-9 && s.b.x <= tip.x + 1e-9));
    assert!(compute_arrow_head(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 2.0).is_empty());
}

#[test]
fn smoothing_ends_on_last_vertex() {
    let points = [Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0), Point::new(30.0, 10.0)];
    let curves = smooth_polyline(&points);
    assert_eq!(curves.last().map(|c| c.1), Some(Point::new(30.0, 10.0)));
    assert_eq!(curves[0], (Point::new(10.0, 10.0), Point::new(15.0, 5.0)));

    let short = smooth_polyline(&points[..2]);
    assert_eq!(short, vec![(Point::new(10.0, 10.0), Point::new(10.0, 10.0))]);
}

#[test]
fn ray_from_off_screen_origin_crosses_the_pane() {
    let seg = clip_line_to_rect(Point::new(-50.0, 50.0), Point::new(-40.0, 50.0), 100.0, 100.0, false, true)
        .expect("visible ray");
    assert_eq!((seg.a, seg.b), (Point::new(0.0, 50.0), Point::new(100.0, 50.0)));

    let diagonal = clip_line_to_rect(Point::new(-10.0, -10.0), Point::new(0.0, 0.0), 100.0, 50.0, false, true)
        .expect("visible ray");
    assert!(diagonal.a.approx_eq(Point::new(0.0, 0.0)));
    assert!(diagonal.b.approx_eq(Point::new(50.0, 50.0)));
}

#[test]
fn ray_pointing_away_from_the_pane_is_hidden() {
    assert!(clip_line_to_rect(Point::new(-40.0, 50.0), Point::new(-50.0, 50.0), 100.0, 100.0, false, true).is_none());
    assert!(clip_line_to_rect(Point::new(-10.0, 50.0), Point::new(-20.0, 50.0), 100.0, 100.0, true, false).is_some());
}
