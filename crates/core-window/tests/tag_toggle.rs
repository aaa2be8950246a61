//! The shared tag overlay: one window, toggled onto the top third of an
//! owner's strip, always painted after the owner so it stays on top.

use core_buffer::{BufferId, BufferStore};
use core_gui::{DrawOp, HeadlessDriver, HeadlessProbe, Rect};
use core_window::{TagState, WindowId, WindowManager};

fn manager() -> (WindowManager, HeadlessProbe, BufferStore, BufferId) {
    let mut store = BufferStore::new();
    let tag_buf = store.create();
    let buf = store.create_from_str("some window text\n");
    let (driver, probe) = HeadlessDriver::new();
    let wm = WindowManager::new(Box::new(driver), tag_buf, 8);
    (wm, probe, store, buf)
}

fn clip_of(op: &DrawOp) -> Rect {
    match op {
        DrawOp::Text { clip, .. } | DrawOp::Fill { clip, .. } => *clip,
    }
}

#[test]
fn toggle_shows_on_the_top_third_and_toggle_again_hides() {
    let (mut wm, _probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    assert_eq!(wm.tag_state(), TagState::Hidden);

    wm.toggle_tag(&store, a);
    assert_eq!(wm.tag_state(), TagState::VisibleFor(a));
    assert_eq!(wm.rect(WindowId::Tag), Rect::new(0, 0, 600, 160));

    wm.toggle_tag(&store, a);
    assert_eq!(wm.tag_state(), TagState::Hidden);
}

#[test]
fn toggling_for_another_window_moves_the_overlay() {
    let (mut wm, _probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    let b = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    wm.toggle_tag(&store, a);
    wm.toggle_tag(&store, b);
    assert_eq!(wm.tag_state(), TagState::VisibleFor(b));
    assert_eq!(wm.rect(WindowId::Tag), Rect::new(300, 0, 300, 160));
}

#[test]
fn toggle_addressed_to_the_tag_only_ever_hides() {
    let (mut wm, _probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);

    // Hidden: addressing the tag is a no-op.
    wm.toggle_tag(&store, WindowId::Tag);
    assert_eq!(wm.tag_state(), TagState::Hidden);

    wm.toggle_tag(&store, a);
    wm.toggle_tag(&store, WindowId::Tag);
    assert_eq!(wm.tag_state(), TagState::Hidden);
}

#[test]
fn the_tag_views_its_own_buffer() {
    let (mut wm, _probe, mut store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    let tag_buf = wm.buffer_of(WindowId::Tag);
    assert_ne!(tag_buf, wm.buffer_of(a));
    store
        .get_mut(tag_buf)
        .insert(0, "Newcol Kill Putall Dump Exit\n");
    wm.toggle_tag(&store, a);
    assert_eq!(wm.visible_range(WindowId::Tag).start, 0);
    // Cursors are per window, tag included.
    wm.set_cursor(WindowId::Tag, 7);
    assert_eq!(wm.cursor(WindowId::Tag), 7);
    assert_eq!(wm.cursor(a), 0);
}

#[test]
fn owner_repaints_put_the_overlay_back_on_top() {
    let (mut wm, probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    wm.toggle_tag(&store, a);
    let tag_rect = wm.rect(WindowId::Tag);
    let owner_rect = wm.rect(a);

    probe.clear_ops();
    wm.scroll(&store, a, 1);
    let ops = probe.ops();
    let first_tag = ops
        .iter()
        .position(|op| clip_of(op) == tag_rect)
        .expect("overlay was repainted");
    assert!(first_tag > 0);
    for op in &ops[..first_tag] {
        assert_eq!(clip_of(op), owner_rect, "owner paints before the overlay");
    }
    assert!(ops[first_tag..].iter().all(|op| clip_of(op) == tag_rect));
}

#[test]
fn hiding_repaints_the_owner_without_the_overlay() {
    let (mut wm, probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    wm.toggle_tag(&store, a);
    let tag_rect = wm.rect(WindowId::Tag);

    probe.clear_ops();
    wm.toggle_tag(&store, a);
    let ops = probe.ops();
    assert!(!ops.is_empty());
    assert_ne!(tag_rect, wm.rect(a));
    assert!(ops.iter().all(|op| clip_of(op) == wm.rect(a)));
}

#[test]
fn operations_on_a_hidden_tag_paint_nothing() {
    let (mut wm, probe, store, buf) = manager();
    let a = wm.create(buf).unwrap();
    wm.resize_frame(&store, 600, 480);
    wm.toggle_tag(&store, a);
    wm.toggle_tag(&store, WindowId::Tag);
    assert_eq!(wm.tag_state(), TagState::Hidden);

    // The viewport still moves; only the painting is suppressed.
    probe.clear_ops();
    wm.scroll(&store, WindowId::Tag, 1);
    assert_eq!(wm.visible_range(WindowId::Tag).start, 1);
    assert!(probe.ops().is_empty(), "hidden overlay must not paint");
    wm.redraw(&store, WindowId::Tag);
    assert!(probe.ops().is_empty());
}
