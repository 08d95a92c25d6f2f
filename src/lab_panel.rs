use dioxus::prelude::*;

use crate::config::RuntimeConfig;
use crate::confetti::celebrate;
use crate::lab::{FlagPuzzle, FlagVerdict, LabShell};
use crate::terminal::{TerminalCursor, TerminalHeader, TerminalPrompt, TerminalWindow};

#[component]
pub fn LabPanel() -> Element {
    let config = use_context::<RuntimeConfig>();
    let confetti_url = config.confetti_script_url.clone();

    let mut shell = use_signal(LabShell::default);
    let mut command = use_signal(String::new);
    let mut puzzle = use_signal(FlagPuzzle::default);
    let mut flag_input = use_signal(String::new);
    let mut verdict = use_signal(|| None::<FlagVerdict>);

    let lines: Vec<String> = shell
        .read()
        .transcript()
        .lines()
        .map(str::to_string)
        .collect();
    let solved = puzzle().is_solved();
    let verdict_style = verdict().map(verdict_class).unwrap_or("flag-verdict");

    rsx! {
        section { id: "lab", class: "page-section",
            h2 { class: "section-title text-terminal-cyan", "$ ./lab --box 3" }
            p { class: "terminal-muted",
                "A relay on our training box leaked something. Poke around the shell, recover the flag, submit it below."
            }
            TerminalWindow { aria_label: Some("Hacking lab terminal".to_string()), class: Some("lab-terminal".to_string()),
                TerminalHeader { title: "operator@blitzhack:~/lab".to_string() }
                div { class: "terminal-output terminal-stack lab-output",
                    if lines.is_empty() {
                        p { class: "terminal-muted", "type `help` to get started." }
                    }
                    for (index, line) in lines.iter().enumerate() {
                        p {
                            key: "{index}-{line}",
                            class: if line.starts_with("$ ") { "lab-command text-terminal-yellow" } else { "lab-line text-terminal-white" },
                            "{line}"
                        }
                    }
                }
                form {
                    class: "terminal-input-bar",
                    onsubmit: move |event| {
                        event.prevent_default();
                        let line = command();
                        command.set(String::new());
                        shell.with_mut(|shell| {
                            shell.execute(&line);
                        });
                    },
                    TerminalPrompt { path: Some("~/lab".to_string()) }
                    input {
                        r#type: "text",
                        class: "terminal-input",
                        value: "{command}",
                        placeholder: "ls",
                        autocomplete: "off",
                        spellcheck: "false",
                        aria_label: "Lab shell input",
                        oninput: move |event| command.set(event.value()),
                    }
                    TerminalCursor {}
                }
            }
            form {
                class: "flag-form",
                onsubmit: move |event| {
                    event.prevent_default();
                    let candidate = flag_input();
                    let (outcome, celebrate_now) = puzzle.with_mut(|puzzle| submit_flag(puzzle, &candidate));
                    verdict.set(Some(outcome));
                    if celebrate_now {
                        tracing::info!("lab: flag accepted");
                        celebrate(&confetti_url);
                    }
                },
                label { class: "flag-label text-terminal-cyan", r#for: "flag-input", "flag>" }
                input {
                    id: "flag-input",
                    r#type: "text",
                    class: "flag-input",
                    value: "{flag_input}",
                    placeholder: "blitz{{...}}",
                    autocomplete: "off",
                    spellcheck: "false",
                    disabled: solved,
                    oninput: move |event| flag_input.set(event.value()),
                }
                button { r#type: "submit", class: "terminal-button", disabled: solved, "submit" }
                if let Some(outcome) = verdict() {
                    p { class: "{verdict_style}", role: "status", "{outcome.message()}" }
                }
            }
        }
    }
}

/// Verdict for one submit, and whether this submit is the one that solved
/// the box. Anything typed after that is ignored.
fn submit_flag(puzzle: &mut FlagPuzzle, candidate: &str) -> (FlagVerdict, bool) {
    let outcome = puzzle.submit(candidate);
    (outcome, outcome == FlagVerdict::Accepted)
}

fn verdict_class(verdict: FlagVerdict) -> &'static str {
    match verdict {
        FlagVerdict::Accepted | FlagVerdict::AlreadySolved => "flag-verdict text-terminal-green",
        FlagVerdict::Empty => "flag-verdict text-terminal-yellow",
        FlagVerdict::Incorrect => "flag-verdict text-terminal-red",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::ACCEPTED_FLAGS;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_the_solving_submit_celebrates() {
        let mut puzzle = FlagPuzzle::default();
        assert_eq!(submit_flag(&mut puzzle, "flag{nope}"), (FlagVerdict::Incorrect, false));
        assert_eq!(submit_flag(&mut puzzle, ACCEPTED_FLAGS[0]), (FlagVerdict::Accepted, true));
        assert_eq!(submit_flag(&mut puzzle, ACCEPTED_FLAGS[1]), (FlagVerdict::AlreadySolved, false));
        assert_eq!(submit_flag(&mut puzzle, "   "), (FlagVerdict::AlreadySolved, false));
        assert!(puzzle.is_solved());
    }

    #[test]
    fn verdict_colors() {
        assert_eq!(verdict_class(FlagVerdict::Incorrect), "flag-verdict text-terminal-red");
        assert_eq!(verdict_class(FlagVerdict::Empty), "flag-verdict text-terminal-yellow");
        assert_eq!(
            verdict_class(FlagVerdict::AlreadySolved),
            verdict_class(FlagVerdict::Accepted)
        );
    }
}
