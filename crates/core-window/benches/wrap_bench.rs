//! Layout and repaint costs on a heavily wrapped document. The recording
//! driver prices rune measurement like the real backends (one call per rune
//! in the scan), so these numbers track the wrap scan itself rather than
//! terminal IO.

use core_buffer::BufferStore;
use core_gui::HeadlessDriver;
use core_window::{CursorLoc, WindowId, WindowManager};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn setup() -> (WindowManager, core_gui::HeadlessProbe, BufferStore, WindowId) {
    let mut text = String::new();
    for i in 0..400 {
        text.push_str("fn frame_");
        text.push_str(&i.to_string());
        text.push_str("() { let x = alloc(WIDTH * HEIGHT); draw(x); }\n");
    }
    // One paragraph long enough to wrap dozens of times.
    text.push_str(&"wrap ".repeat(1000));
    text.push('\n');

    let mut store = BufferStore::new();
    let tag_buf = store.create();
    let buf = store.create_from_str(&text);
    let (driver, probe) = HeadlessDriver::new();
    let mut wm = WindowManager::new(Box::new(driver), tag_buf, 8);
    let id = wm.create(buf).expect("registry has room");
    // 80 runes wide, 40 lines tall.
    wm.resize_frame(&store, 16 + 8 * 80, 2 + 12 * 40);
    (wm, probe, store, id)
}

fn wrap_benches(c: &mut Criterion) {
    c.bench_function("redraw_80x40", |b| {
        let (mut wm, probe, store, id) = setup();
        b.iter(|| {
            wm.redraw(&store, black_box(id));
            probe.clear_ops();
        });
    });

    c.bench_function("scroll_down_up_80x40", |b| {
        let (mut wm, probe, store, id) = setup();
        b.iter(|| {
            wm.scroll(&store, id, black_box(1));
            wm.scroll(&store, id, black_box(-1));
            probe.clear_ops();
        });
    });

    c.bench_function("scroll_back_through_wrapped_paragraph", |b| {
        let (mut wm, probe, store, id) = setup();
        b.iter(|| {
            wm.scroll(&store, id, black_box(200));
            wm.scroll(&store, id, black_box(-200));
            probe.clear_ops();
        });
    });

    c.bench_function("reveal_deep_offset", |b| {
        let (mut wm, probe, store, id) = setup();
        wm.set_cursor(id, 20_000);
        b.iter(|| {
            wm.show_cursor(&store, id, black_box(CursorLoc::Middle));
            probe.clear_ops();
        });
    });
}

criterion_group!(benches, wrap_benches);
criterion_main!(benches);
