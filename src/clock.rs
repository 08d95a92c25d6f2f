use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const CLOCK_TICK_MS: i32 = 1000;

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [day] [month repr:short] [year]");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockZone {
    #[default]
    Local,
    Utc,
    Ist,
}

impl ClockZone {
    pub const ALL: [ClockZone; 3] = [ClockZone::Local, ClockZone::Utc, ClockZone::Ist];

    pub fn label(self) -> &'static str {
        match self {
            ClockZone::Local => "LOCAL",
            ClockZone::Utc => "UTC",
            ClockZone::Ist => "IST",
        }
    }

    fn offset_seconds(self, local_offset_seconds: i32) -> i32 {
        match self {
            ClockZone::Local => local_offset_seconds,
            ClockZone::Utc => 0,
            ClockZone::Ist => IST_OFFSET_SECONDS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClockReading {
    pub time: String,
    pub date: String,
    pub zone: &'static str,
}

/// `local_offset_minutes` is east of UTC, the inverse of what
/// `Date.getTimezoneOffset` reports.
pub fn read_clock(epoch_ms: f64, local_offset_minutes: i32, zone: ClockZone) -> Result<ClockReading, String> {
    let nanos = (epoch_ms as i128) * 1_000_000;
    let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|err| format!("clock out of range: {err}"))?;
    let offset = UtcOffset::from_whole_seconds(zone.offset_seconds(local_offset_minutes * 60))
        .map_err(|err| format!("bad zone offset: {err}"))?;
    let shifted = utc.to_offset(offset);

    Ok(ClockReading {
        time: shifted
            .format(TIME_FORMAT)
            .map_err(|err| format!("time format failed: {err}"))?,
        date: shifted
            .format(DATE_FORMAT)
            .map_err(|err| format!("date format failed: {err}"))?,
        zone: zone.label(),
    })
}

#[cfg(target_arch = "wasm32")]
fn read_clock_now(zone: ClockZone) -> Option<ClockReading> {
    let date = js_sys::Date::new_0();
    let local_offset = -(date.get_timezone_offset() as i32);
    match read_clock(date.get_time(), local_offset, zone) {
        Ok(reading) => Some(reading),
        Err(message) => {
            tracing::warn!("clock: {message}");
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_clock_now(zone: ClockZone) -> Option<ClockReading> {
    read_clock(0.0, 0, zone).ok()
}

#[cfg(target_arch = "wasm32")]
struct IntervalHandle {
    id: i32,
    _closure: Rc<wasm_bindgen::closure::Closure<dyn FnMut()>>,
}

#[component]
pub fn ClockWidget() -> Element {
    let mut zone = use_signal(ClockZone::default);
    let mut reading = use_signal(|| read_clock_now(ClockZone::default()));
    let mut minimized = use_signal(|| false);
    #[cfg(target_arch = "wasm32")]
    let mut interval_handle = use_signal(|| None::<IntervalHandle>);
    #[cfg(not(target_arch = "wasm32"))]
    let _interval_handle = ();

    #[cfg(target_arch = "wasm32")]
    {
        use_effect(move || {
            use wasm_bindgen::closure::Closure;
            use wasm_bindgen::JsCast;

            if interval_handle.peek().is_some() {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };
            tracing::debug!("clock: start ticking");
            let mut tick_reading = reading;
            let tick_zone = zone;
            let closure = Rc::new(Closure::wrap(Box::new(move || {
                tick_reading.set(read_clock_now(*tick_zone.peek()));
            }) as Box<dyn FnMut()>));
            if let Ok(id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().as_ref().unchecked_ref(),
                CLOCK_TICK_MS,
            ) {
                interval_handle.set(Some(IntervalHandle { id, _closure: closure }));
            }
        });

        use_drop(move || {
            if let Some(handle) = interval_handle.peek().as_ref() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(handle.id);
                }
            }
        });
    }

    let current = reading();
    let collapsed = if minimized() { " is-minimized" } else { "" };

    rsx! {
        aside { class: "clock-widget{collapsed}", aria_label: "Clock",
            div { class: "clock-header",
                span { class: "text-terminal-cyan", "clock" }
                button {
                    r#type: "button",
                    class: "clock-toggle",
                    aria_expanded: "{!minimized()}",
                    onclick: move |_| minimized.set(!minimized()),
                    if minimized() { "+" } else { "−" }
                }
            }
            div { class: "clock-body",
                if let Some(current) = current {
                    p { class: "clock-time text-terminal-green", "{current.time}" }
                    p { class: "clock-date text-terminal-white", "{current.date}" }
                    p { class: "clock-zone terminal-muted", "{current.zone}" }
                } else {
                    p { class: "clock-time terminal-muted", "--:--:--" }
                }
                div { class: "clock-zones",
                    for option in ClockZone::ALL {
                        button {
                            key: "{option.label()}",
                            r#type: "button",
                            class: if zone() == option { "clock-zone-button active" } else { "clock-zone-button" },
                            onclick: move |_| {
                                zone.set(option);
                                reading.set(read_clock_now(option));
                            },
                            "{option.label()}"
                        }
                    }
                }
            }
        }
    }
}
