use dioxus::prelude::*;
use dioxus_router::{Link, Routable, Router};

use crate::clock::ClockWidget;
use crate::config::use_runtime_config;
use crate::console_panel::ConsolePanel;
use crate::gallery::WriteupGallery;
use crate::lab_panel::LabPanel;
use crate::nav::SiteNav;
use crate::team::TeamSection;
use crate::terminal::{TerminalCursor, TerminalHeader, TerminalPrompt, TerminalWindow};
use crate::tilt::TiltCard;

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[component]
pub fn App() -> Element {
    let config_resource = use_runtime_config();
    let Some(config) = config_resource() else {
        return rsx! {
            document::Title { "BlitzHack" }
            div { class: "page loading",
                h1 { "Loading config..." }
            }
        };
    };

    use_context_provider(|| config);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Meta { name: "theme-color", content: "#0bff96" }
        Router::<Route> {}
    }
}

#[derive(Clone, PartialEq, Routable)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

#[component]
fn Home() -> Element {
    rsx! {
        document::Title { "BlitzHack | CTF team" }
        SiteNav {}
        main { class: "home",
            AboutSection {}
            TeamSection {}
            WriteupGallery {}
            LabPanel {}
            ConsolePanel {}
        }
        ClockWidget {}
    }
}

#[component]
fn AboutSection() -> Element {
    rsx! {
        section { id: "about", class: "page-section hero",
            TerminalWindow { aria_label: Some("BlitzHack intro".to_string()),
                TerminalHeader { title: "operator@blitzhack:~".to_string() }
                div { class: "terminal-body terminal-stack",
                    pre { class: "logo-desktop", aria_label: "BlitzHack logo",
                        r#"
 ____  _ _ _        _   _            _
| __ )| (_) |_ ___ | | | | __ _  ___| | __
|  _ \| | | __|_  /| |_| |/ _` |/ __| |/ /
| |_) | | | |_ / / |  _  | (_| | (__|   <
|____/|_|_|\__/___||_| |_|\__,_|\___|_|\_\
                        "#
                    }
                    p { class: "text-terminal-white",
                        "We are a small CTF team that plays weekends, writes everything down, and breaks things on purpose."
                    }
                    div { class: "hero-cards",
                        TiltCard { class: Some("hero-card".to_string()),
                            p { class: "text-terminal-green", "pwn · web · crypto · rev" }
                            p { class: "terminal-muted", "four handles, one scoreboard" }
                        }
                        TiltCard { class: Some("hero-card".to_string()),
                            p { class: "text-terminal-yellow", "writeups or it didn't happen" }
                            p { class: "terminal-muted", "every solve ends up in ~/writeups" }
                        }
                    }
                    TerminalPrompt { path: Some("~".to_string()) }
                    TerminalCursor {}
                }
            }
        }
    }
}

#[component]
fn NotFound(route: Vec<String>) -> Element {
    let path = route.join("/");
    rsx! {
        document::Title { "Not Found | BlitzHack" }
        div { class: "terminal-screen",
            TerminalWindow { aria_label: Some("Not found".to_string()),
                TerminalHeader { title: "operator@blitzhack:~/404".to_string() }
                div { class: "terminal-body terminal-stack",
                    p { class: "terminal-muted", "cat: /{path}: No such file or directory" }
                    Link { to: Route::Home {}, class: "terminal-link text-terminal-yellow", "cd ~" }
                    TerminalCursor {}
                }
            }
        }
    }
}
