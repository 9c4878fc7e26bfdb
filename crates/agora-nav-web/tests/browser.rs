#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

//! Browser checks for the DOM binding.
//!
//! Run:
//!   wasm-pack test --headless --firefox crates/agora-nav-web

use agora_nav_web::install_nav_tracker;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r##"
<nav>
  <a class="nav-link" data-section="hero" href="#hero">Hero</a>
  <a class="nav-link" data-section="how" href="#how">How it works</a>
  <a class="nav-link" data-section="pricing" href="#pricing">Pricing</a>
  <a class="nav-link" href="#nowhere">Unbound</a>
</nav>
<main style="position:absolute;top:0;left:0;width:100%">
  <section id="hero" style="height:4000px">hero</section>
  <section id="how" style="height:4000px">how</section>
  <section id="pricing" style="height:4000px">pricing</section>
</main>
"##;

fn document() -> Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("test page has a document")
}

fn mount() -> Vec<Element> {
    let document = document();
    let body: HtmlElement = document.body().expect("test page has a body");
    body.set_inner_html(PAGE);
    web_sys::window().expect("window").scroll_to_with_x_and_y(0.0, 0.0);
    let links = document
        .query_selector_all(".nav-link")
        .expect("valid selector");
    (0..links.length())
        .filter_map(|i| links.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn has(el: &Element, class: &str) -> bool {
    el.class_list().contains(class)
}

#[wasm_bindgen_test]
fn first_section_wins_on_install() {
    let links = mount();
    let handle = install_nav_tracker(None).expect("install succeeds");
    assert!(handle.started());
    assert_eq!(handle.active_section().as_deref(), Some("hero"));

    // Directional classes are synchronous; `active` waits for two frames.
    assert!(!has(&links[0], "before-active"));
    assert!(has(&links[1], "after-active"));
    assert!(has(&links[2], "after-active"));
    assert!(has(&links[0], "nav-transitioning"));
    handle.dispose();
}

#[wasm_bindgen_test]
fn simple_policy_skips_directional_classes() {
    let links = mount();
    let handle =
        install_nav_tracker(Some(r#"{"directional":false}"#.to_owned())).expect("install succeeds");
    assert_eq!(handle.active_section().as_deref(), Some("hero"));
    for link in &links {
        assert!(!has(link, "after-active"));
        assert!(!has(link, "nav-transitioning"));
    }
    handle.dispose();
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    mount();
    let err = install_nav_tracker(Some(r#"{"activationFrames":0}"#.to_owned()))
        .err()
        .expect("config rejected");
    let text = err.as_string().expect("string error");
    assert!(text.contains("activationFrames"), "{text}");
}

#[wasm_bindgen_test]
fn click_updates_fragment_and_unbound_click_is_ignored() {
    let links = mount();
    let handle = install_nav_tracker(None).expect("install succeeds");

    let pricing: HtmlElement = links[2].clone().dyn_into().expect("anchor is an HtmlElement");
    pricing.click();
    let hash = web_sys::window()
        .expect("window")
        .location()
        .hash()
        .expect("hash readable");
    assert_eq!(hash, "#pricing");

    let unbound: HtmlElement = links[3].clone().dyn_into().expect("anchor is an HtmlElement");
    unbound.click();
    let stats = handle.stats();
    let ignored = js_sys::Reflect::get(&stats, &"ignoredClicks".into())
        .ok()
        .and_then(|v| v.as_f64());
    assert_eq!(ignored, Some(1.0));
    handle.dispose();
}

#[wasm_bindgen_test]
fn dispose_detaches_click_handlers() {
    let links = mount();
    let handle = install_nav_tracker(None).expect("install succeeds");
    handle.dispose();
    handle.dispose();

    let how: HtmlElement = links[1].clone().dyn_into().expect("anchor is an HtmlElement");
    how.click();
    let stats = handle.stats();
    let clicks = js_sys::Reflect::get(&stats, &"clicks".into())
        .ok()
        .and_then(|v| v.as_f64());
    assert_eq!(clicks, Some(0.0));
}
