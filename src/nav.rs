use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

/// Section id and nav label, in page order.
pub const SECTIONS: &[(&str, &str)] = &[
    ("about", "about"),
    ("team", "team"),
    ("writeups", "writeups"),
    ("lab", "lab"),
    ("console", "console"),
];

/// Band between 40% from the top and 50% from the bottom of the viewport.
pub const OBSERVER_ROOT_MARGIN: &str = "-40% 0px -50% 0px";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavState {
    active: Option<&'static str>,
    menu_open: bool,
}

impl NavState {
    /// Applies a batch of visibility changes. The last section that entered
    /// the band wins; leaving the band never clears the highlight.
    pub fn observe<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, bool)>) -> bool {
        let mut changed = false;
        for (id, intersecting) in entries {
            if !intersecting {
                continue;
            }
            let Some((known, _)) = SECTIONS.iter().find(|(section, _)| *section == id) else {
                continue;
            };
            if self.active != Some(*known) {
                self.active = Some(*known);
                changed = true;
            }
        }
        changed
    }

    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active == Some(id)
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn link_clicked(&mut self) {
        self.menu_open = false;
    }
}

#[cfg(target_arch = "wasm32")]
struct ObserverHandle {
    observer: web_sys::IntersectionObserver,
    _closure: Rc<wasm_bindgen::closure::Closure<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>>,
}

#[component]
pub fn SiteNav() -> Element {
    let mut nav = use_signal(NavState::default);
    #[cfg(target_arch = "wasm32")]
    let mut observer_handle = use_signal(|| None::<ObserverHandle>);
    #[cfg(not(target_arch = "wasm32"))]
    let _observer_handle = ();

    #[cfg(target_arch = "wasm32")]
    use_effect(move || {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        if observer_handle.peek().is_some() {
            return;
        }
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        tracing::debug!("nav: observing sections");
        let mut nav_state = nav;
        let closure = Rc::new(Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: web_sys::IntersectionObserver| {
                let batch: Vec<(String, bool)> = entries
                    .iter()
                    .map(|entry| entry.unchecked_into::<web_sys::IntersectionObserverEntry>())
                    .map(|entry| (entry.target().id(), entry.is_intersecting()))
                    .collect();
                nav_state.with_mut(|state| {
                    state.observe(batch.iter().map(|(id, hit)| (id.as_str(), *hit)));
                });
            },
        ) as Box<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>));

        let options = web_sys::IntersectionObserverInit::new();
        options.set_root_margin(OBSERVER_ROOT_MARGIN);
        let Ok(observer) = web_sys::IntersectionObserver::new_with_options(
            closure.as_ref().as_ref().unchecked_ref(),
            &options,
        ) else {
            tracing::warn!("nav: intersection observer unavailable");
            return;
        };
        for (id, _) in SECTIONS {
            if let Some(section) = document.get_element_by_id(id) {
                observer.observe(&section);
            }
        }
        observer_handle.set(Some(ObserverHandle {
            observer,
            _closure: closure,
        }));
    });

    #[cfg(target_arch = "wasm32")]
    use_drop(move || {
        if let Some(handle) = observer_handle.peek().as_ref() {
            handle.observer.disconnect();
        }
    });

    let state = nav();
    let menu_class = if state.menu_open() { "site-nav is-open" } else { "site-nav" };

    rsx! {
        header { class: "site-header",
            a { class: "site-brand text-terminal-green", href: "#about", "blitzhack" }
            button {
                r#type: "button",
                class: "nav-toggle",
                "data-nav-toggle": "true",
                aria_expanded: "{state.menu_open()}",
                aria_label: "Toggle navigation",
                onclick: move |_| {
                    nav.with_mut(|state| {
                        state.toggle_menu();
                    });
                },
                "☰"
            }
            nav { class: "{menu_class}", aria_label: "Sections",
                for (id, label) in SECTIONS.iter().copied() {
                    a {
                        key: "{id}",
                        href: "#{id}",
                        class: if state.is_active(id) { "active" } else { "" },
                        onclick: move |_| nav.with_mut(|state| state.link_clicked()),
                        "{label}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_entered_section_wins() {
        let mut nav = NavState::default();
        assert!(nav.observe([("about", true)]));
        assert_eq!(nav.active(), Some("about"));

        assert!(nav.observe([("team", true), ("lab", true)]));
        assert_eq!(nav.active(), Some("lab"));
        assert!(nav.is_active("lab"));
        assert!(!nav.is_active("team"));
    }

    #[test]
    fn leaving_and_unknown_sections_are_ignored() {
        let mut nav = NavState::default();
        nav.observe([("writeups", true)]);
        assert!(!nav.observe([("writeups", false), ("footer", true)]));
        assert_eq!(nav.active(), Some("writeups"));
        assert!(!nav.observe([("writeups", true)]));
    }

    #[test]
    fn link_click_closes_menu() {
        let mut nav = NavState::default();
        assert!(nav.toggle_menu());
        assert!(nav.menu_open());
        nav.link_clicked();
        assert!(!nav.menu_open());
        nav.link_clicked();
        assert!(!nav.menu_open());
        assert!(nav.toggle_menu());
        assert!(!nav.toggle_menu());
    }
}
