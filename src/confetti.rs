use serde::Serialize;

pub const CELEBRATION_MS: f64 = 2000.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

/// Options object handed to the global `confetti` function.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Burst {
    pub particle_count: u32,
    pub angle: u32,
    pub spread: u32,
    pub origin: Origin,
}

/// One burst from each side of the viewport, aimed inward.
pub fn mirrored_bursts() -> [Burst; 2] {
    [
        Burst {
            particle_count: 3,
            angle: 60,
            spread: 55,
            origin: Origin { x: 0.0, y: 0.6 },
        },
        Burst {
            particle_count: 3,
            angle: 120,
            spread: 55,
            origin: Origin { x: 1.0, y: 0.6 },
        },
    ]
}

pub fn celebration_running(started_ms: f64, now_ms: f64) -> bool {
    now_ms - started_ms < CELEBRATION_MS
}

/// Fires the celebration, loading the confetti script on first use. A script
/// that never loads means no confetti and nothing else.
#[cfg(target_arch = "wasm32")]
pub fn celebrate(script_url: &str) {
    if let Err(message) = ensure_script_then_burst(script_url) {
        tracing::warn!("confetti: {message}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn celebrate(script_url: &str) {
    tracing::debug!("confetti: no browser, skipping {script_url}");
}

#[cfg(target_arch = "wasm32")]
fn ensure_script_then_burst(script_url: &str) -> Result<(), String> {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or("window unavailable")?;
    let document = window.document().ok_or("document unavailable")?;

    if confetti_function().is_some() {
        run_bursts();
        return Ok(());
    }

    let selector = format!("script[src=\"{script_url}\"]");
    if let Ok(Some(_)) = document.query_selector(&selector) {
        return Ok(());
    }

    let script = document
        .create_element("script")
        .map_err(|_| "script create failed")?
        .dyn_into::<web_sys::HtmlScriptElement>()
        .map_err(|_| "script cast failed")?;
    script.set_src(script_url);
    script.set_async(true);

    let onload = Closure::wrap(Box::new(run_bursts) as Box<dyn FnMut()>);
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    let onerror = Closure::wrap(Box::new(|| {
        tracing::warn!("confetti: script failed to load");
    }) as Box<dyn FnMut()>);
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    document
        .head()
        .ok_or("document head missing")?
        .append_child(&script)
        .map_err(|_| "script append failed")?;
    tracing::debug!("confetti: script injected");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn confetti_function() -> Option<js_sys::Function> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window()?;
    js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str("confetti"))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

#[cfg(target_arch = "wasm32")]
fn run_bursts() {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    let Some(confetti) = confetti_function() else {
        tracing::warn!("confetti: global missing after load");
        return;
    };
    let options: Vec<JsValue> = mirrored_bursts()
        .iter()
        .filter_map(|burst| serde_json::to_string(burst).ok())
        .filter_map(|json| js_sys::JSON::parse(&json).ok())
        .collect();
    let started = js_sys::Date::now();

    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();
    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        for option in &options {
            let _ = confetti.call1(&JsValue::NULL, option);
        }
        if !celebration_running(started, js_sys::Date::now()) {
            let _ = next.borrow_mut().take();
            return;
        }
        if let (Some(window), Some(callback)) = (web_sys::window(), next.borrow().as_ref()) {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));

    if let (Some(window), Some(callback)) = (web_sys::window(), frame.borrow().as_ref()) {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}
