//! Edwin entrypoint: startup, logging, and the modal demo loop driving the
//! windowing core over the terminal driver.

use anyhow::Result;
use clap::Parser;
use core_buffer::{BufferId, BufferSource, BufferStore};
use core_config::Config;
use core_gui::{Button, Driver, Event, Key, Mouse, MouseKind, Pointer, Rect, TermDriver};
use core_window::{CursorLoc, TagState, WindowId, WindowManager};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Seed text for the tag's dedicated buffer.
const TAG_MENU: &str = "q quit  i insert  j/k scroll  t tag  n new  x close\n";

/// Weight bounds the `+`/`-` keys move inside.
const MIN_WEIGHT: u32 = 10;
const MAX_WEIGHT: u32 = 25_000;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "edwin", version, about = "Edwin tiled-window editor")] // minimal metadata
struct Args {
    /// Optional path to open at startup (UTF-8 text). If omitted an empty
    /// buffer is used.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `edwin.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Log filter override (otherwise `EDWIN_LOG`, otherwise `info`).
    #[arg(long = "log")]
    pub log: Option<String>,
}

fn configure_logging(filter_override: Option<&str>) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("edwin.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter = match filter_override {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_env("EDWIN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let file_appender = tracing_appender::rolling::never(log_dir, "edwin.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => {
            // Global tracing subscriber already installed; drop guard so writer shuts down.
            None
        }
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Insert,
}

/// The demo application: buffers, the window manager, and modal input state.
struct App {
    store: BufferStore,
    wm: WindowManager,
    wheel_lines: i32,
    mode: Mode,
    focus: WindowId,
    quit: bool,
}

impl App {
    fn new(driver: Box<dyn Driver>, cfg: &Config, content: &str) -> Result<Self> {
        let mut store = BufferStore::new();
        let tag_buf = store.create_from_str(TAG_MENU);
        let buf = store.create_from_str(content);
        let mut wm = WindowManager::new(driver, tag_buf, cfg.text.tab_stop);
        let Some(focus) = wm.create(buf) else {
            anyhow::bail!("window registry refused the first window");
        };
        Ok(Self {
            store,
            wm,
            wheel_lines: cfg.scroll.wheel_lines as i32,
            mode: Mode::Normal,
            focus,
            quit: false,
        })
    }

    fn run(&mut self) -> Result<()> {
        while !self.quit {
            let Some(ev) = self.wm.driver_mut().next_event()? else {
                continue;
            };
            trace!(target: "input", ?ev, "event");
            self.handle(ev);
            self.wm.driver_mut().flush()?;
        }
        Ok(())
    }

    fn handle(&mut self, ev: Event) {
        match ev {
            Event::Resize { width, height } => self.wm.resize_frame(&self.store, width, height),
            Event::Key(key) => match self.mode {
                Mode::Normal => self.normal_key(key),
                Mode::Insert => self.insert_key(key),
            },
            Event::Mouse(m) => self.mouse(m),
        }
    }

    fn normal_key(&mut self, key: Key) {
        match key {
            Key::Char('q') => self.quit = true,
            Key::Char('i') => self.mode = Mode::Insert,
            Key::Char('h') | Key::Left => self.move_cursor(-1),
            Key::Char('l') | Key::Right => self.move_cursor(1),
            Key::Char('j') | Key::Down | Key::Ctrl('e') => {
                self.wm.scroll(&self.store, self.focus, 1);
            }
            Key::Char('k') | Key::Up | Key::Ctrl('y') => {
                self.wm.scroll(&self.store, self.focus, -1);
            }
            Key::PageDown => self.page(1),
            Key::PageUp => self.page(-1),
            Key::Ctrl('l') => self.wm.show_cursor(&self.store, self.focus, CursorLoc::Middle),
            Key::Char('+') => self.adjust_weight(true),
            Key::Char('-') => self.adjust_weight(false),
            Key::Char('t') => self.toggle_tag_for(self.focus),
            Key::Char('n') => self.new_window(),
            Key::Char('x') => self.close_window(),
            Key::Char('\t') => self.cycle_focus(),
            Key::Char(c @ '1'..='6') => self.toggle_slot_tag(c as usize - '1' as usize),
            _ => {}
        }
    }

    fn insert_key(&mut self, key: Key) {
        match key {
            Key::Escape => self.mode = Mode::Normal,
            Key::Backspace => self.backspace(),
            Key::Char(c) => self.insert_rune(c),
            _ => {}
        }
    }

    fn mouse(&mut self, m: Mouse) {
        match (m.kind, m.button) {
            (MouseKind::Down, Button::WheelUp) => self.wheel(m.x, m.y, -1),
            (MouseKind::Down, Button::WheelDown) => self.wheel(m.x, m.y, 1),
            (MouseKind::Down, Button::Left) => {
                if let Some(id) = self.wm.window_at(m.x, m.y) {
                    self.focus = id;
                    debug!(target: "input", ?id, "focus_follows_click");
                }
            }
            (MouseKind::Move, _) => self.update_pointer(m.x, m.y),
            _ => {}
        }
    }

    fn wheel(&mut self, x: i32, y: i32, dir: i32) {
        if let Some(id) = self.wm.window_at(x, y) {
            self.wm.scroll(&self.store, id, dir * self.wheel_lines);
        }
    }

    /// The pointer turns into the resize shape over a window's action
    /// corner and back to normal everywhere else.
    fn update_pointer(&mut self, x: i32, y: i32) {
        let shape = match self.wm.window_at(x, y) {
            Some(id) => {
                let r = self.wm.rect(id);
                let a = self.wm.driver_mut().action_rect();
                let hot = Rect::new(r.x + a.x, r.y + a.y, a.w, a.h);
                if hot.contains(x, y) {
                    Pointer::Resize
                } else {
                    Pointer::Normal
                }
            }
            None => Pointer::Normal,
        };
        self.wm.driver_mut().set_pointer(shape);
    }

    /// Move the focused cursor one rune, revealing it when it leaves the
    /// viewport (minimally: backward motion surfaces at the top, forward at
    /// the bottom).
    fn move_cursor(&mut self, d: i32) {
        let len = self.store.text(self.wm.buffer_of(self.focus)).len();
        let cu = self.wm.cursor(self.focus);
        let cu = if d < 0 { cu.saturating_sub(1) } else { (cu + 1).min(len) };
        self.wm.set_cursor(self.focus, cu);
        if self.wm.visible_range(self.focus).contains(&cu) {
            self.wm.redraw(&self.store, self.focus);
        } else {
            let loc = if d < 0 { CursorLoc::Top } else { CursorLoc::Bottom };
            self.wm.show_cursor(&self.store, self.focus, loc);
        }
    }

    fn page(&mut self, dir: i32) {
        let nl = self.wm.visible_lines(self.focus) as i32;
        if nl > 1 {
            self.wm.scroll(&self.store, self.focus, dir * (nl - 1));
        }
    }

    fn adjust_weight(&mut self, up: bool) {
        let w = self.wm.weight(self.focus);
        let step = 1 + w / 10;
        let w = if up {
            (w + step).min(MAX_WEIGHT)
        } else {
            w.saturating_sub(step).max(MIN_WEIGHT)
        };
        self.wm.set_weight(self.focus, w);
        self.wm.redraw_frame(&self.store);
    }

    fn new_window(&mut self) {
        let buf = self.wm.buffer_of(self.focus);
        match self.wm.create(buf) {
            Some(id) => {
                self.focus = id;
                self.wm.redraw_frame(&self.store);
            }
            None => warn!(target: "window", "window_registry_full"),
        }
    }

    fn close_window(&mut self) {
        if self.focus == WindowId::Tag || self.wm.windows().count() <= 1 {
            debug!(target: "window", "close_refused");
            return;
        }
        self.wm.destroy(self.focus);
        let next = self.wm.windows().next();
        if let Some(id) = next {
            self.focus = id;
        }
        self.wm.redraw_frame(&self.store);
    }

    fn cycle_focus(&mut self) {
        let ids: Vec<WindowId> = self.wm.windows().collect();
        if ids.is_empty() {
            return;
        }
        self.focus = match ids.iter().position(|&id| id == self.focus) {
            Some(i) => ids[(i + 1) % ids.len()],
            None => ids[0],
        };
    }

    fn toggle_slot_tag(&mut self, slot: usize) {
        let id = WindowId::Slot(slot);
        if self.wm.windows().any(|w| w == id) {
            self.toggle_tag_for(id);
        } else {
            debug!(target: "window", slot, "tag_toggle_on_empty_slot");
        }
    }

    /// Toggle the tag and keep focus on something visible: a toggle that
    /// hides the focused overlay hands focus back to the strip it covered.
    fn toggle_tag_for(&mut self, id: WindowId) {
        let owner = self.wm.tag_owner();
        self.wm.toggle_tag(&self.store, id);
        if self.focus == WindowId::Tag && self.wm.tag_state() == TagState::Hidden {
            if let Some(owner) = owner {
                self.focus = owner;
            }
        }
    }

    fn insert_rune(&mut self, c: char) {
        let buf = self.wm.buffer_of(self.focus);
        let cu = self.wm.cursor(self.focus).min(self.store.text(buf).len());
        self.store.get_mut(buf).insert_rune(cu, c);
        self.wm.set_cursor(self.focus, cu + 1);
        self.repaint_buffer(buf);
    }

    fn backspace(&mut self) {
        let buf = self.wm.buffer_of(self.focus);
        let cu = self.wm.cursor(self.focus).min(self.store.text(buf).len());
        if cu == 0 {
            return;
        }
        self.store.get_mut(buf).remove(cu - 1..cu);
        self.wm.set_cursor(self.focus, cu - 1);
        self.repaint_buffer(buf);
    }

    /// After an edit every window viewing the buffer repaints; the focused
    /// one goes last so a caret pushed off screen gets revealed.
    fn repaint_buffer(&mut self, buf: BufferId) {
        let ids: Vec<WindowId> = self
            .wm
            .windows()
            .filter(|&id| self.wm.buffer_of(id) == buf)
            .collect();
        for id in ids {
            if id != self.focus {
                self.wm.redraw(&self.store, id);
            }
        }
        if self.focus != WindowId::Tag
            && self.wm.tag_owner().is_some()
            && self.wm.buffer_of(WindowId::Tag) == buf
        {
            self.wm.redraw(&self.store, WindowId::Tag);
        }
        let cu = self.wm.cursor(self.focus);
        if self.wm.visible_range(self.focus).contains(&cu) {
            self.wm.redraw(&self.store, self.focus);
        } else {
            self.wm.show_cursor(&self.store, self.focus, CursorLoc::Bottom);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log.as_deref());
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = core_config::load_from(args.config.clone())?;
    let (content, open_failed) = match args.path.as_ref() {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(
                    target: "io",
                    file = %path.display(),
                    size_bytes = content.len(),
                    "file_read_ok"
                );
                (content, false)
            }
            Err(e) => {
                error!(target: "io", ?e, "file_open_error");
                (String::new(), true)
            }
        },
        None => (String::new(), false),
    };

    let driver = TermDriver::new()?;
    let mut app = App::new(Box::new(driver), &config, &content)?;
    let path_str = args.path.as_ref().map(|p| p.to_string_lossy().to_string());
    info!(
        target: "runtime.startup",
        path = path_str.as_deref(),
        open_failed,
        config_override = args.config.is_some(),
        tab_stop = config.text.tab_stop,
        wheel_lines = config.scroll.wheel_lines,
        "bootstrap_complete"
    );

    app.run()?;
    info!(target: "runtime.shutdown", "shutdown_complete");
    Ok(())
}
