#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: install, drive and tear down a tracker.
//!
//! The tracker lives in one `Rc<RefCell<Runtime>>` owned by the returned
//! [`NavTrackerHandle`]. Every browser callback holds only a `Weak` to it, so
//! freeing the handle ends the tracker; callbacks that race with disposal
//! find nothing to upgrade and return.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use agora_nav::{TrackerConfig, ViewportSectionTracker};
use core::time::Duration;
use js_sys::{Object, Reflect};
use tracing::{debug, info, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Event, EventTarget, Window};
use web_time::Instant;

use crate::dom::{DomSurface, js_error_message};
use crate::error::InstallError;
use crate::host::{ArmedTimer, FramePlan, HostHandles, TimerPlan, timeout_delay_ms};
use crate::logging;

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        kind: &'static str,
        passive: bool,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, InstallError> {
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| InstallError::Dom(js_error_message(&err)))?;
        Ok(Self {
            target,
            kind,
            callback,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

struct Runtime {
    window: Window,
    document: Document,
    config: TrackerConfig,
    origin: Instant,
    tracker: Option<ViewportSectionTracker<DomSurface>>,
    handles: Rc<HostHandles>,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
    timer_callback: Option<Closure<dyn FnMut()>>,
    listeners: Vec<Listener>,
    disposed: bool,
}

impl Runtime {
    fn now(&self) -> Duration {
        Instant::now().duration_since(self.origin)
    }

    /// Bring the browser's frame and timer registrations in line with what
    /// the tracker currently wants.
    fn sync_host_schedule(&mut self) {
        let Some(tracker) = self.tracker.as_ref() else {
            return;
        };
        let wants_frame = tracker.wants_animation_frame();
        let deadline = tracker.next_deadline();

        match self.handles.plan_frame(wants_frame) {
            FramePlan::Keep => {}
            FramePlan::Request => {
                if let Some(callback) = self.frame_callback.as_ref() {
                    match self
                        .window
                        .request_animation_frame(callback.as_ref().unchecked_ref())
                    {
                        Ok(handle) => self.handles.set_frame(Some(handle)),
                        Err(err) => {
                            warn!(error = %js_error_message(&err), "requestAnimationFrame failed");
                        }
                    }
                }
            }
            FramePlan::Cancel(handle) => {
                let _ = self.window.cancel_animation_frame(handle);
                self.handles.set_frame(None);
            }
        }

        if let TimerPlan::Replace { clear, arm } = self.handles.plan_timer(deadline) {
            if let Some(handle) = clear {
                self.window.clear_timeout_with_handle(handle);
                self.handles.set_timer(None);
            }
            if let (Some(deadline), Some(callback)) = (arm, self.timer_callback.as_ref()) {
                let delay = timeout_delay_ms(self.now(), deadline);
                match self
                    .window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.as_ref().unchecked_ref(),
                        delay,
                    ) {
                    Ok(handle) => self.handles.set_timer(Some(ArmedTimer { handle, deadline })),
                    Err(err) => warn!(error = %js_error_message(&err), "setTimeout failed"),
                }
            }
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Some(handle) = self.handles.take_frame() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        if let Some(timer) = self.handles.take_timer() {
            self.window.clear_timeout_with_handle(timer.handle);
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.cancel_pending();
        }
        self.frame_callback = None;
        self.timer_callback = None;
        debug!("nav tracker disposed");
    }
}

/// Run `f` against the live runtime, then resync browser scheduling.
///
/// Skips silently if the runtime is gone, disposed, not started, or already
/// borrowed further up the stack.
fn with_tracker(
    weak: &Weak<RefCell<Runtime>>,
    f: impl FnOnce(&mut ViewportSectionTracker<DomSurface>, Duration),
) {
    let Some(runtime) = weak.upgrade() else {
        return;
    };
    let Ok(mut runtime) = runtime.try_borrow_mut() else {
        trace!("nav tracker busy, event dropped");
        return;
    };
    if runtime.disposed {
        return;
    }
    let now = runtime.now();
    let Some(tracker) = runtime.tracker.as_mut() else {
        return;
    };
    f(tracker, now);
    runtime.sync_host_schedule();
}

/// Collect the page, wire listeners and run the initial recompute.
fn start(runtime: &Rc<RefCell<Runtime>>) -> Result<(), InstallError> {
    let weak = Rc::downgrade(runtime);
    let (window, document, config, handles) = {
        let rt = runtime.borrow();
        if rt.disposed || rt.tracker.is_some() {
            return Ok(());
        }
        (
            rt.window.clone(),
            rt.document.clone(),
            rt.config.clone(),
            Rc::clone(&rt.handles),
        )
    };

    let surface = DomSurface::query(window.clone(), document, &config)?;
    let nav_targets: Vec<EventTarget> = surface
        .nav_elements()
        .iter()
        .map(|el| el.clone().unchecked_into())
        .collect();

    let frame_callback = {
        let weak = weak.clone();
        let handles = Rc::clone(&handles);
        Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            handles.frame_fired();
            with_tracker(&weak, |tracker, now| tracker.on_animation_frame(now));
        })
    };
    let timer_callback = {
        let weak = weak.clone();
        Closure::<dyn FnMut()>::new(move || {
            handles.timer_fired();
            with_tracker(&weak, |tracker, now| tracker.poll_timers(now));
        })
    };

    let window_target: EventTarget = window.unchecked_into();
    let mut listeners = Vec::with_capacity(nav_targets.len() + 2);
    {
        let weak = weak.clone();
        listeners.push(Listener::attach(
            window_target.clone(),
            "scroll",
            true,
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                with_tracker(&weak, |tracker, _| tracker.on_scroll());
            }),
        )?);
    }
    {
        let weak = weak.clone();
        listeners.push(Listener::attach(
            window_target,
            "resize",
            true,
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                with_tracker(&weak, |tracker, now| tracker.on_resize(now));
            }),
        )?);
    }
    for (entry, target) in nav_targets.into_iter().enumerate() {
        let weak = weak.clone();
        listeners.push(Listener::attach(
            target,
            "click",
            false,
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                event.prevent_default();
                with_tracker(&weak, |tracker, _| {
                    tracker.on_nav_entry_click(entry);
                });
            }),
        )?);
    }

    let mut tracker = ViewportSectionTracker::new(surface, config);
    tracker.init();

    let mut rt = runtime.borrow_mut();
    rt.frame_callback = Some(frame_callback);
    rt.timer_callback = Some(timer_callback);
    rt.listeners.extend(listeners);
    rt.tracker = Some(tracker);
    rt.sync_host_schedule();
    info!(
        active = ?rt.tracker.as_ref().and_then(|t| t.active_section().map(str::to_owned)),
        "nav tracker started"
    );
    Ok(())
}

/// Handle to an installed navigation tracker.
///
/// Keep it alive for as long as the page should be tracked. Freeing it (or
/// calling [`NavTrackerHandle::dispose`]) removes every listener and pending
/// callback.
#[wasm_bindgen]
pub struct NavTrackerHandle {
    runtime: Rc<RefCell<Runtime>>,
}

#[wasm_bindgen]
impl NavTrackerHandle {
    /// Id of the section currently marked active, if any.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> Option<String> {
        let rt = self.runtime.try_borrow().ok()?;
        rt.tracker.as_ref()?.active_section().map(str::to_owned)
    }

    /// Run one recompute immediately, outside the scroll/resize schedule.
    pub fn recompute(&self) {
        with_tracker(&Rc::downgrade(&self.runtime), |tracker, _| {
            tracker.recompute_active_section();
        });
    }

    /// Whether the tracker has collected the page and run its first pass.
    #[wasm_bindgen(getter)]
    pub fn started(&self) -> bool {
        self.runtime
            .try_borrow()
            .is_ok_and(|rt| rt.tracker.is_some())
    }

    /// Counter snapshot as a plain JS object.
    pub fn stats(&self) -> JsValue {
        let obj = Object::new();
        let Ok(rt) = self.runtime.try_borrow() else {
            return obj.into();
        };
        let Some(tracker) = rt.tracker.as_ref() else {
            return obj.into();
        };
        let stats = tracker.stats();
        set_js(&obj, "recomputes", JsValue::from_f64(stats.recomputes as f64));
        set_js(&obj, "changes", JsValue::from_f64(stats.changes as f64));
        set_js(&obj, "activations", JsValue::from_f64(stats.activations as f64));
        set_js(
            &obj,
            "coalescedScrolls",
            JsValue::from_f64(stats.coalesced_scrolls as f64),
        );
        set_js(
            &obj,
            "resizeEvents",
            JsValue::from_f64(stats.resize_events as f64),
        );
        set_js(&obj, "clicks", JsValue::from_f64(stats.clicks as f64));
        set_js(
            &obj,
            "ignoredClicks",
            JsValue::from_f64(stats.ignored_clicks as f64),
        );
        set_js(
            &obj,
            "classWrites",
            JsValue::from_f64(stats.class_writes as f64),
        );
        set_js(&obj, "disposed", JsValue::from_bool(rt.disposed));
        obj.into()
    }

    /// Detach every listener and cancel pending work. Idempotent.
    pub fn dispose(&self) {
        match self.runtime.try_borrow_mut() {
            Ok(mut rt) => rt.dispose(),
            Err(_) => warn!("dispose called re-entrantly; ignored"),
        }
    }
}

impl Drop for NavTrackerHandle {
    fn drop(&mut self) {
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.dispose();
        }
    }
}

fn install(config_json: Option<String>) -> Result<NavTrackerHandle, InstallError> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => TrackerConfig::from_json_str(json)?,
        _ => TrackerConfig::default(),
    };
    logging::init(&config.log_level);

    let window = web_sys::window().ok_or(InstallError::NoWindow)?;
    let document = window.document().ok_or(InstallError::NoDocument)?;
    let loading = document.ready_state() == "loading";

    let runtime = Rc::new(RefCell::new(Runtime {
        window,
        document: document.clone(),
        config,
        origin: Instant::now(),
        tracker: None,
        handles: Rc::new(HostHandles::new()),
        frame_callback: None,
        timer_callback: None,
        listeners: Vec::new(),
        disposed: false,
    }));

    if loading {
        let weak = Rc::downgrade(&runtime);
        let ready = Listener::attach(
            document.unchecked_into(),
            "DOMContentLoaded",
            false,
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                let Some(runtime) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = start(&runtime) {
                    warn!(error = %err, "nav tracker failed to start");
                }
            }),
        )?;
        runtime.borrow_mut().listeners.push(ready);
        debug!("document still loading, nav tracker start deferred");
    } else {
        start(&runtime)?;
    }

    Ok(NavTrackerHandle { runtime })
}

/// Install a navigation tracker on the current page.
///
/// `config_json` is an optional JSON object of tracker options (for example
/// `{"directional": false}`); omitted fields keep their defaults. Throws a
/// string describing the problem if the config is invalid or the page has no
/// window/document.
#[wasm_bindgen(js_name = installNavTracker)]
pub fn install_nav_tracker(config_json: Option<String>) -> Result<NavTrackerHandle, JsValue> {
    logging::install_panic_hook();
    install(config_json).map_err(|err| JsValue::from_str(&err.to_string()))
}
