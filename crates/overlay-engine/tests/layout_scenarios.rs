//! Placement and sizing through the full engine.

mod common;

use common::{Content, FakeOpener, Harness};
use overlay_engine::{Bias, OpenOutcome, PopupId, PopupOptions, Rect};

const EPS: f32 = 1e-2;

fn assert_box(actual: Rect, expected: Rect) {
    let close = |a: f32, b: f32| (a - b).abs() < EPS;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "got {actual:?}, expected {expected:?}"
    );
}

fn opened(outcome: OpenOutcome) -> PopupId {
    match outcome {
        OpenOutcome::Opened(id) => id,
        other => panic!("expected a new popup, got {other:?}"),
    }
}

#[test]
fn test_middle_opener_overlaps() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::bare(300.0, 200.0));
    let opener = FakeOpener::at(500.0, 10.0, 50.0, 20.0);

    let id = opened(
        h.popups
            .open(opener, PopupOptions::new("cardLabels").show_header(false).margin(10.0))
            .unwrap(),
    );

    let left = 525.0 - 300.0 * (525.0 / 980.0);
    assert_box(h.popups.dims(id).unwrap(), Rect::new(left, 20.0, 300.0, 200.0));
    assert!(!h.popups.is_fullscreen(id).unwrap());
}

#[test]
fn test_before_bias_ends_at_opener_center() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::bare(300.0, 200.0));
    let opener = FakeOpener::at(500.0, 10.0, 50.0, 20.0);

    let options = PopupOptions::new("cardLabels")
        .show_header(false)
        .margin(10.0)
        .bias(vec![Bias::Before, Bias::Overlap], Vec::new());
    let id = opened(h.popups.open(opener, options).unwrap());

    assert_box(h.popups.dims(id).unwrap(), Rect::new(225.0, 20.0, 300.0, 200.0));
    assert_box(h.last_surface().borrow().last_box().unwrap(), Rect::new(225.0, 20.0, 300.0, 200.0));
}

#[test]
fn test_no_fit_goes_fullscreen() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("boardSettings", Content::sized(1200.0, 900.0));
    let opener = FakeOpener::at(40.0, 30.0, 60.0, 20.0);

    let id = opened(h.popups.open(opener, PopupOptions::new("boardSettings")).unwrap());

    assert_eq!(h.popups.dims(id).unwrap(), Rect::new(0.0, 0.0, 1000.0, 800.0));
    assert!(h.popups.is_fullscreen(id).unwrap());
    assert!(h.popups.info(id).unwrap().fullscreen);
}

#[test]
fn test_sticky_popup_keeps_open_time_frame() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("datePicker", Content::bare(150.0, 100.0));
    let opener = FakeOpener::at(900.0, 100.0, 20.0, 20.0);

    let id = opened(
        h.popups
            .open(opener, PopupOptions::new("datePicker").show_header(false).margin(10.0))
            .unwrap(),
    );
    assert!(h.popups.info(id).unwrap().sticky);
    assert_box(h.popups.dims(id).unwrap(), Rect::new(760.0, 110.0, 150.0, 100.0));

    h.resize_window(600.0, 500.0);
    assert_box(h.popups.dims(id).unwrap(), Rect::new(760.0, 110.0, 150.0, 100.0));
}

#[test]
fn test_relative_popup_follows_live_viewport() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("datePicker", Content::bare(150.0, 100.0));
    let opener = FakeOpener::at(900.0, 100.0, 20.0, 20.0);

    let options = PopupOptions::new("datePicker")
        .show_header(false)
        .margin(10.0)
        .sticky(false);
    let id = opened(h.popups.open(opener, options).unwrap());
    assert!(!h.popups.info(id).unwrap().sticky);

    h.resize_window(600.0, 500.0);
    assert_box(h.popups.dims(id).unwrap(), Rect::new(0.0, 110.0, 90.0, 62.5));
}

#[test]
fn test_relative_popup_grows_back_to_natural_size() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardDetails", Content::sized(400.0, 300.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);
    let id = opened(h.popups.open(opener, PopupOptions::new("cardDetails")).unwrap());
    assert_box(h.popups.dims(id).unwrap(), Rect::new(120.0, 110.0, 400.0, 330.0));

    h.resize_window(500.0, 400.0);
    let shrunk = h.popups.dims(id).unwrap();
    assert!((shrunk.width - 200.0).abs() < EPS);
    assert!((shrunk.height - 165.0).abs() < EPS);

    h.resize_window(2000.0, 1600.0);
    let grown = h.popups.dims(id).unwrap();
    assert!((grown.width - 400.0).abs() < EPS);
    assert!((grown.height - 330.0).abs() < EPS);
}

#[test]
fn test_draw_is_idempotent() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::sized(300.0, 200.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);
    let id = opened(h.popups.open(opener, PopupOptions::new("cardLabels")).unwrap());

    let first = h.popups.draw(id).unwrap();
    let second = h.popups.draw(id).unwrap();
    assert_eq!(first, second);
    assert_eq!(h.popups.dims(id).unwrap(), second);
}

#[test]
fn test_opener_move_relayouts() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::sized(300.0, 200.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);
    let id = opened(h.popups.open(opener.clone(), PopupOptions::new("cardLabels")).unwrap());
    let before = h.popups.dims(id).unwrap();

    opener.rect.set(Rect::new(200.0, 150.0, 40.0, 20.0));
    h.popups.opener_resized(id).unwrap();
    let after = h.popups.dims(id).unwrap();
    assert!((after.x - before.x - 100.0).abs() < EPS);
    assert!((after.y - before.y - 50.0).abs() < EPS);
}

#[test]
fn test_placeholder_opener_uses_parent() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::bare(200.0, 100.0));
    let parent = FakeOpener::at(40.0, 30.0, 60.0, 20.0);
    let placeholder = FakeOpener::placeholder_in(parent);

    let options = PopupOptions::new("cardLabels").show_header(false).margin(10.0);
    let id = opened(h.popups.open(placeholder, options).unwrap());
    assert_box(h.popups.dims(id).unwrap(), Rect::new(70.0, 40.0, 200.0, 100.0));
}

#[test]
fn test_compact_screen_large_popup_is_fullscreen() {
    let mut h = Harness::new(1000.0, 800.0);
    h.env.compact.set(true);
    h.register("cardDetails", Content::sized(900.0, 700.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);

    let id = opened(h.popups.open(opener, PopupOptions::new("cardDetails")).unwrap());
    assert!(h.popups.is_fullscreen(id).unwrap());
    assert_eq!(h.popups.dims(id).unwrap(), Rect::new(0.0, 0.0, 1000.0, 800.0));
}

#[test]
fn test_maximize_and_minimize() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::sized(300.0, 200.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);
    let id = opened(h.popups.open(opener, PopupOptions::new("cardLabels")).unwrap());
    let placed = h.popups.dims(id).unwrap();

    h.popups.maximize(id).unwrap();
    assert!(h.popups.is_fullscreen(id).unwrap());
    assert_eq!(h.popups.dims(id).unwrap(), Rect::new(0.0, 0.0, 1000.0, 800.0));
    assert!(h.last_surface().borrow().content_size_cleared);

    h.popups.minimize(id).unwrap();
    assert!(!h.popups.is_fullscreen(id).unwrap());
    assert_eq!(h.popups.dims(id).unwrap(), placed);
}

#[test]
fn test_fullscreen_option() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::sized(300.0, 200.0));
    let opener = FakeOpener::at(100.0, 100.0, 40.0, 20.0);
    let id = opened(
        h.popups
            .open(opener, PopupOptions::new("cardLabels").fullscreen(true))
            .unwrap(),
    );
    assert_eq!(h.popups.dims(id).unwrap(), Rect::new(0.0, 0.0, 1000.0, 800.0));
}

#[test]
fn test_within_limits_popup_is_shrunk() {
    let mut h = Harness::new(1000.0, 800.0);
    h.register("cardLabels", Content::sized(300.0, 900.0));
    let opener = FakeOpener::at(100.0, 500.0, 40.0, 20.0);

    // 930px tall: no vertical fit, so it starts at the top and is cut to
    // the viewport minus both margins.
    let options = PopupOptions::new("cardLabels").off_limits(false).margin(10.0);
    let id = opened(h.popups.open(opener, options).unwrap());
    let dims = h.popups.dims(id).unwrap();
    assert_eq!(dims.y, 0.0);
    assert!((dims.height - 780.0).abs() < EPS, "{dims:?}");
}
