#![no_main]

use arbitrary::Arbitrary;
use core::time::Duration;
use libfuzzer_sys::fuzz_target;

use agora_nav::{HeadlessPage, NavClass, NavSurface, TrackerConfig, ViewportSectionTracker};

#[derive(Debug, Arbitrary)]
enum HostOp {
    Scroll { to: i16 },
    Resize { height: u16 },
    Frame,
    Advance { ms: u16 },
    Click { entry: u8 },
    Recompute,
}

#[derive(Debug, Arbitrary)]
struct Input {
    directional: bool,
    viewport: u16,
    heights: Vec<u16>,
    unbound: Vec<u8>,
    ops: Vec<HostOp>,
}

fuzz_target!(|input: Input| {
    let heights: Vec<f64> = input
        .heights
        .iter()
        .take(12)
        .map(|&h| f64::from(h % 4000))
        .collect();
    let ids: Vec<String> = (0..heights.len()).map(|i| format!("s{i}")).collect();
    let spec: Vec<(&str, f64)> = ids.iter().map(String::as_str).zip(heights).collect();
    let mut page = HeadlessPage::stacked(f64::from(input.viewport.max(1)), &spec);
    for &entry in input.unbound.iter().take(4) {
        page.unbind_nav_entry(usize::from(entry) % 13);
    }

    let config = TrackerConfig {
        directional: input.directional,
        ..TrackerConfig::default()
    };
    let mut tracker = ViewportSectionTracker::new(page, config);
    let mut now = Duration::ZERO;
    tracker.init();

    for op in input.ops.into_iter().take(512) {
        match op {
            HostOp::Scroll { to } => {
                tracker.surface_mut().set_scroll_y(f64::from(to) * 4.0);
                tracker.on_scroll();
            }
            HostOp::Resize { height } => {
                tracker.surface_mut().set_viewport_height(f64::from(height));
                tracker.on_resize(now);
            }
            HostOp::Frame => {
                now += Duration::from_millis(16);
                tracker.on_animation_frame(now);
            }
            HostOp::Advance { ms } => {
                now += Duration::from_millis(u64::from(ms));
                tracker.poll_timers(now);
            }
            HostOp::Click { entry } => {
                tracker.on_nav_entry_click(usize::from(entry));
            }
            HostOp::Recompute => {
                tracker.recompute_active_section();
            }
        }

        // Post-conditions that must always hold:
        let page = tracker.surface();
        let active = page.active_entries();
        assert!(active.len() <= 1, "more than one active entry: {active:?}");
        if let Some(&entry) = active.first() {
            assert!(!page.has_class(entry, NavClass::BeforeActive));
            assert!(!page.has_class(entry, NavClass::AfterActive));
        }
        assert_eq!(tracker.stats().class_writes, page.class_writes());
    }
});
