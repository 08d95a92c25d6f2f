use dioxus::prelude::*;

use crate::tilt::TiltCard;

#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub handle: &'static str,
    pub role: &'static str,
    pub focus: &'static [&'static str],
    pub motto: &'static str,
}

const MEMBERS: &[Member] = &[
    Member {
        handle: "nullbyte",
        role: "captain / pwn",
        focus: &["heap", "kernel", "rop"],
        motto: "if it segfaults, it talks.",
    },
    Member {
        handle: "k3ystr0ke",
        role: "web",
        focus: &["ssrf", "deserialization", "auth"],
        motto: "every form is an API if you squint.",
    },
    Member {
        handle: "parity",
        role: "crypto",
        focus: &["rsa", "lattices", "padding oracles"],
        motto: "small exponents, big mistakes.",
    },
    Member {
        handle: "0xglitch",
        role: "rev / forensics",
        focus: &["ghidra", "pcap", "memory dumps"],
        motto: "strings first, questions later.",
    },
];

pub fn members() -> &'static [Member] {
    MEMBERS
}

#[component]
pub fn TeamSection() -> Element {
    rsx! {
        section { id: "team", class: "page-section",
            h2 { class: "section-title text-terminal-cyan", "$ ls ~/team" }
            div { class: "team-grid",
                for member in members().iter() {
                    TiltCard { key: "{member.handle}", class: Some("member-card".to_string()),
                        p { class: "member-handle text-terminal-green", "@{member.handle}" }
                        p { class: "member-role text-terminal-yellow", "{member.role}" }
                        p { class: "member-focus terminal-muted", "{member.focus.join(\" · \")}" }
                        p { class: "member-motto", "# {member.motto}" }
                    }
                }
            }
        }
    }
}
