#![forbid(unsafe_code)]

//! Browser binding for `agora-nav`.
//!
//! ```js
//! import init, { installNavTracker } from "./pkg/agora_nav_web.js";
//!
//! await init();
//! const nav = installNavTracker(JSON.stringify({ directional: true }));
//! // ...later, e.g. before swapping the page body:
//! nav.dispose();
//! ```
//!
//! The tracker reads `main section[id]` and `.nav-link[data-section]` (both
//! configurable), listens for `scroll`, `resize` and nav `click` events, and
//! writes `active` / `before-active` / `after-active` / `nav-transitioning`
//! classes. The browser wiring is compiled on `wasm32` only; the rest of this
//! crate builds and tests natively.

mod error;
pub mod host;

pub use error::InstallError;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{NavTrackerHandle, install_nav_tracker};
