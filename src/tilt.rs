use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use dioxus::web::WebEventExt;

pub const MAX_TILT_DEG: f64 = 10.0;
const PERSPECTIVE_PX: u32 = 900;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x_deg: f64,
    pub y_deg: f64,
}

impl Rotation {
    pub const NEUTRAL: Rotation = Rotation { x_deg: 0.0, y_deg: 0.0 };

    pub fn transform(self) -> String {
        format!(
            "perspective({PERSPECTIVE_PX}px) rotateX({:.2}deg) rotateY({:.2}deg)",
            self.x_deg, self.y_deg
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pointer above center tips the card back, pointer right of center turns it
/// right. Each axis is clamped to `max_deg`.
pub fn tilt_for(pointer_x: f64, pointer_y: f64, rect: CardRect, max_deg: f64) -> Rotation {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Rotation::NEUTRAL;
    }
    let half_width = rect.width / 2.0;
    let half_height = rect.height / 2.0;
    let dx = (pointer_x - (rect.left + half_width)) / half_width;
    let dy = (pointer_y - (rect.top + half_height)) / half_height;
    Rotation {
        x_deg: (-dy * max_deg).clamp(-max_deg, max_deg) + 0.0,
        y_deg: (dx * max_deg).clamp(-max_deg, max_deg) + 0.0,
    }
}

#[cfg(target_arch = "wasm32")]
fn motion_allowed() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .map(|query| !query.matches())
        .unwrap_or(true)
}

#[cfg(not(target_arch = "wasm32"))]
fn motion_allowed() -> bool {
    true
}

#[component]
pub fn TiltCard(children: Element, class: Option<String>) -> Element {
    let enabled = use_hook(motion_allowed);
    let mut rotation = use_signal(|| Rotation::NEUTRAL);
    #[cfg(target_arch = "wasm32")]
    let mut card = use_signal(|| None::<web_sys::Element>);
    #[cfg(not(target_arch = "wasm32"))]
    let _card = ();
    let class = class.unwrap_or_default();

    if !enabled {
        return rsx! {
            div { class: "tilt-card {class}", {children} }
        };
    }

    let transform = rotation().transform();
    rsx! {
        div {
            class: "tilt-card {class}",
            style: "transform: {transform}",
            onmounted: move |_event| {
                #[cfg(target_arch = "wasm32")]
                card.set(Some(_event.data.as_ref().as_web_event()));
            },
            onmousemove: move |_event| {
                #[cfg(target_arch = "wasm32")]
                {
                    let Some(element) = card.peek().as_ref().cloned() else {
                        return;
                    };
                    let bounds = element.get_bounding_client_rect();
                    let pointer = _event.client_coordinates();
                    rotation.set(tilt_for(
                        pointer.x,
                        pointer.y,
                        CardRect {
                            left: bounds.left(),
                            top: bounds.top(),
                            width: bounds.width(),
                            height: bounds.height(),
                        },
                        MAX_TILT_DEG,
                    ));
                }
            },
            onmouseleave: move |_| rotation.set(Rotation::NEUTRAL),
            {children}
        }
    }
}
