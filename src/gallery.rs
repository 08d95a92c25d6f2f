use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

use crate::config::RuntimeConfig;
use crate::markdown::render_writeup;
#[cfg(target_arch = "wasm32")]
use crate::markdown::{COPIED_LABEL, COPY_LABEL, COPY_RESET_MS};
use crate::terminal::{TerminalHeader, TerminalWindow};
use crate::writeups::{
    fetch_document, fetch_index, settle_fetch, Event as WriteupEvent, Gallery, ModalBody, ModalState, OpenStep,
    RenderCache, WriteupTarget,
};

struct CategoryView {
    key: String,
    name: String,
    entries: Vec<EntryView>,
}

struct EntryView {
    key: String,
    title: String,
    target: WriteupTarget,
}

/// Panel rows for one event. Names may repeat inside an index, so keys lead
/// with the position.
fn category_views(event: &WriteupEvent) -> Vec<CategoryView> {
    event
        .categories
        .iter()
        .enumerate()
        .map(|(position, category)| CategoryView {
            key: format!("{position}-{}", category.name),
            name: category.name.clone(),
            entries: category
                .challenges
                .iter()
                .enumerate()
                .map(|(row, challenge)| EntryView {
                    key: format!("{position}-{row}-{}", challenge.title),
                    title: challenge.title.clone(),
                    target: WriteupTarget::new(event, challenge),
                })
                .collect(),
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
struct EscapeListener {
    keydown: Rc<Closure<dyn FnMut(web_sys::KeyboardEvent)>>,
}

#[component]
pub fn WriteupGallery() -> Element {
    let config = use_context::<RuntimeConfig>();
    let index_url = config.writeups_index_url.clone();
    let index = use_resource(move || {
        let url = index_url.clone();
        async move { fetch_index(&url).await }
    });

    let mut selected = use_signal(|| 0usize);
    let cache = use_signal(RenderCache::default);
    let modal = use_signal(|| None::<ModalState>);

    #[cfg(target_arch = "wasm32")]
    let mut escape = use_signal(|| None::<EscapeListener>);
    #[cfg(not(target_arch = "wasm32"))]
    let _escape = ();

    #[cfg(target_arch = "wasm32")]
    use_effect(move || {
        if escape.peek().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut modal_for_key = modal;
        let keydown = Rc::new(Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Escape" && modal_for_key.peek().is_some() {
                modal_for_key.set(None);
            }
        }) as Box<dyn FnMut(_)>));
        let _ = window.add_event_listener_with_callback("keydown", keydown.as_ref().as_ref().unchecked_ref());
        escape.set(Some(EscapeListener { keydown }));
    });

    #[cfg(target_arch = "wasm32")]
    {
        let escape = escape;
        use_drop(move || {
            let binding = escape.peek();
            let Some(listener) = binding.as_ref() else {
                return;
            };
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    listener.keydown.as_ref().as_ref().unchecked_ref(),
                );
            }
        });
    }

    let body = match index() {
        None => rsx! {
            p { class: "terminal-muted", "fetching writeups index..." }
        },
        Some(Err(err)) => {
            tracing::warn!("writeups: {err}");
            rsx! {
                p { class: "text-terminal-red", "Unable to load writeups right now." }
            }
        }
        Some(Ok(loaded)) => match Gallery::new(loaded) {
            None => rsx! {},
            Some(mut gallery) => {
                gallery.select(selected());
                let categories = category_views(gallery.active_event());
                rsx! {
                    div { class: "event-pills", role: "tablist",
                        for pill in gallery.pills() {
                            button {
                                key: "{pill.index}",
                                r#type: "button",
                                role: "tab",
                                class: if pill.active { "event-pill active" } else { "event-pill" },
                                aria_selected: if pill.active { "true" } else { "false" },
                                onclick: move |_| selected.set(pill.index),
                                "{pill.label}"
                            }
                        }
                    }
                    div { class: "event-panel",
                        for category in categories {
                            div { key: "{category.key}", class: "writeup-category",
                                h3 { class: "text-terminal-yellow", "{category.name}/" }
                                ul { class: "writeup-list",
                                    for entry in category.entries {
                                        li { key: "{entry.key}", class: "writeup-item",
                                            span { class: "writeup-title", "{entry.title}" }
                                            button {
                                                r#type: "button",
                                                class: "terminal-button writeup-open",
                                                onclick: move |_| open_writeup(entry.target.clone(), cache, modal),
                                                "view"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    };

    rsx! {
        section { id: "writeups", class: "page-section",
            h2 { class: "section-title text-terminal-cyan", "$ ls ~/writeups" }
            {body}
        }
        WriteupModal { state: modal }
    }
}

/// Shows the metadata right away, then the cached or freshly rendered body.
fn open_writeup(target: WriteupTarget, mut cache: Signal<RenderCache>, mut modal: Signal<Option<ModalState>>) {
    let step = cache.peek().begin_open(&target.raw_url);
    match step {
        OpenStep::Cached(html) => {
            tracing::debug!("writeups: cache hit for {}", target.raw_url);
            modal.set(Some(ModalState {
                target,
                body: ModalBody::Ready(html),
            }));
        }
        OpenStep::Fetch => {
            modal.set(Some(ModalState {
                target: target.clone(),
                body: ModalBody::Loading,
            }));
            spawn(async move {
                let rendered = fetch_document(&target.raw_url)
                    .await
                    .map(|markdown| render_writeup(&markdown, &target.asset_base));
                if let Err(err) = &rendered {
                    tracing::warn!("writeups: {} failed: {err}", target.raw_url);
                }
                modal.with_mut(|current| {
                    cache.with_mut(|cache| settle_fetch(current, cache, &target, rendered));
                });
            });
        }
    }
}

#[component]
fn WriteupModal(mut state: Signal<Option<ModalState>>) -> Element {
    let Some(current) = state() else {
        return rsx! {};
    };
    let target = current.target;

    rsx! {
        div { class: "writeup-modal", role: "dialog", aria_modal: "true", aria_label: "{target.title}",
            TerminalWindow { class: Some("writeup-modal-card".to_string()),
                TerminalHeader { title: format!("less {}", target.title),
                    button {
                        r#type: "button",
                        class: "modal-close",
                        aria_label: "Close writeup",
                        onclick: move |_| state.set(None),
                        "×"
                    }
                }
                div { class: "writeup-meta",
                    h3 { class: "text-terminal-green", "{target.title}" }
                    p { class: "terminal-muted", "{target.event_name}" }
                    a {
                        class: "writeup-raw-link",
                        href: "{target.raw_url}",
                        target: "_blank",
                        rel: "noopener noreferrer",
                        "raw markdown"
                    }
                }
                {
                    match current.body {
                        ModalBody::Loading => rsx! {
                            p { class: "terminal-muted writeup-loading", "Loading writeup..." }
                        },
                        ModalBody::Failed => rsx! {
                            p { class: "text-terminal-red", "Unable to load this writeup." }
                        },
                        ModalBody::Ready(html) => rsx! {
                            div {
                                class: "writeup-body",
                                dangerous_inner_html: "{html}",
                                onclick: move |_event| {
                                    #[cfg(target_arch = "wasm32")]
                                    copy_code_block(&_event);
                                },
                            }
                        },
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn copy_code_block(event: &Event<MouseData>) {
    use dioxus::web::WebEventExt;
    use gloo_timers::future::TimeoutFuture;

    let native = event.data.as_ref().as_web_event();
    let Some(clicked) = native.target().and_then(|target| target.dyn_into::<web_sys::Element>().ok()) else {
        return;
    };
    let Ok(Some(button)) = clicked.closest(".copy-btn") else {
        return;
    };
    let code = button
        .closest(".code-block")
        .ok()
        .flatten()
        .and_then(|block| block.query_selector("code").ok().flatten())
        .and_then(|code| code.text_content())
        .unwrap_or_default();
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().write_text(&code);
    spawn(async move {
        match wasm_bindgen_futures::JsFuture::from(promise).await {
            Ok(_) => {
                button.set_text_content(Some(COPIED_LABEL));
                TimeoutFuture::new(COPY_RESET_MS).await;
                button.set_text_content(Some(COPY_LABEL));
            }
            Err(_) => tracing::warn!("writeups: clipboard write rejected"),
        }
    });
}
