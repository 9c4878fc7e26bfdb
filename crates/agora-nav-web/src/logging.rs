#![forbid(unsafe_code)]

//! `tracing` output to the browser console.
//!
//! Each formatted event is buffered and handed to the console method that
//! matches its level when the writer is dropped, so one event is one console
//! entry.

use std::io;
use std::sync::Once;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

pub(crate) struct ConsoleMakeWriter;

pub(crate) struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(text.trim_end());
        match self.level {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            _ => console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Install the console subscriber once per page.
///
/// A subscriber installed earlier by the embedding page wins; ours is then
/// silently skipped.
pub(crate) fn init(level: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let max_level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
        let installed = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .with_ansi(false)
            .without_time()
            .with_max_level(max_level)
            .try_init()
            .is_ok();
        if !installed {
            console::debug_1(&JsValue::from_str(
                "agora-nav: tracing subscriber already set, console logging skipped",
            ));
        }
    });
}

/// Route panic messages to `console.error`.
pub(crate) fn install_panic_hook() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console::error_1(&JsValue::from_str(&msg));
        }));
    });
}
