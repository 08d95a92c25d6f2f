use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;

use crate::console::{ConsoleState, Issue, LineKind};
#[cfg(target_arch = "wasm32")]
use crate::console::TYPE_TICK_MS;
use crate::terminal::{TerminalHeader, TerminalWindow};

#[component]
pub fn ConsolePanel() -> Element {
    let state = use_signal(ConsoleState::default);
    let mut input = use_signal(String::new);

    let console = state.read().clone();
    let typing_index = console.typing_index();

    rsx! {
        section { id: "console", class: "page-section",
            h2 { class: "section-title text-terminal-cyan", "$ nc blitzhack.xyz 1337" }
            TerminalWindow { aria_label: Some("BlitzHack console".to_string()), class: Some("console-terminal".to_string()),
                TerminalHeader { title: "guest@blitzhack".to_string() }
                div { class: "terminal-output terminal-stack console-output",
                    if console.lines().is_empty() {
                        p { class: "terminal-muted", "connected. try `help`." }
                    }
                    for (index, line) in console.lines().iter().enumerate() {
                        p {
                            key: "{index}",
                            class: match line.kind {
                                LineKind::Input => "console-input text-terminal-yellow",
                                LineKind::Output => "console-reply text-terminal-green",
                            },
                            "{line.text}"
                            if typing_index == Some(index) {
                                span { class: "terminal-cursor", "█" }
                            }
                        }
                    }
                }
                input {
                    r#type: "text",
                    class: "terminal-input console-input-field",
                    value: "{input}",
                    placeholder: "scan",
                    autocomplete: "off",
                    spellcheck: "false",
                    aria_label: "Console command",
                    oninput: move |event| input.set(event.value()),
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            let command = input();
                            input.set(String::new());
                            issue_command(command, state);
                        }
                    },
                }
            }
        }
    }
}

fn issue_command(command: String, mut state: Signal<ConsoleState>) {
    let Issue::Animating(animation) = state.with_mut(|console| console.issue(&command)) else {
        return;
    };
    tracing::debug!("console: typing reply {animation} for {command}");

    #[cfg(target_arch = "wasm32")]
    spawn(async move {
        loop {
            TimeoutFuture::new(TYPE_TICK_MS).await;
            if !state.with_mut(|console| console.tick(animation)) {
                break;
            }
        }
    });

    #[cfg(not(target_arch = "wasm32"))]
    state.with_mut(|console| while console.tick(animation) {});
}
