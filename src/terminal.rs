use dioxus::prelude::*;

#[component]
pub fn TerminalWindow(children: Element, aria_label: Option<String>, class: Option<String>) -> Element {
    let label = aria_label.unwrap_or_else(|| "Terminal".to_string());
    let extra = class.unwrap_or_default();
    rsx! {
        div { class: "terminal-window {extra}", role: "region", aria_label: "{label}",
            {children}
        }
    }
}

#[component]
pub fn TerminalHeader(title: String, children: Element) -> Element {
    rsx! {
        div { class: "terminal-header",
            span { class: "text-terminal-red", "●" }
            span { class: "text-terminal-yellow", "●" }
            span { class: "text-terminal-green", "●" }
            span { class: "terminal-header-label text-terminal-cyan", "{title}" }
            {children}
        }
    }
}

#[component]
pub fn TerminalPrompt(user: Option<String>, host: Option<String>, path: Option<String>) -> Element {
    let user = user.unwrap_or_else(|| "operator".to_string());
    let host = host.unwrap_or_else(|| "blitzhack".to_string());
    let path = path.unwrap_or_else(|| "~".to_string());
    rsx! {
        span { class: "terminal-prompt-inline",
            span { class: "text-terminal-green", "{user}@{host}" }
            span { class: "text-terminal-white", ":" }
            span { class: "text-terminal-cyan", "{path}" }
            span { class: "text-terminal-white", "$" }
        }
    }
}

#[component]
pub fn TerminalCursor() -> Element {
    rsx! {
        span { class: "terminal-cursor text-terminal-white", "█" }
    }
}
