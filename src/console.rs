pub const TYPE_CHARS_PER_TICK: usize = 2;
pub const TYPE_TICK_MS: u32 = 28;

const PING_MIN_MS: u32 = 30;
const PING_SPREAD_MS: u32 = 40;

/// Reply bound to a console command. Most are fixed text; a few are produced
/// fresh on every call.
#[derive(Clone, Copy, Debug)]
pub enum ConsoleReply {
    Literal(&'static str),
    Computed(fn() -> String),
}

impl ConsoleReply {
    pub fn render(&self) -> String {
        match self {
            ConsoleReply::Literal(text) => text.to_string(),
            ConsoleReply::Computed(produce) => produce(),
        }
    }
}

const COMMANDS: &[(&str, ConsoleReply)] = &[
    (
        "help",
        ConsoleReply::Literal("commands: help, whoami, team, ctf, scan, ping, sudo, clear"),
    ),
    (
        "whoami",
        ConsoleReply::Literal("guest@blitzhack :: clearance level 0. the lab below grants more."),
    ),
    (
        "team",
        ConsoleReply::Literal("BlitzHack :: a CTF crew breaking things on purpose since 2022."),
    ),
    (
        "ctf",
        ConsoleReply::Literal("recent ops are archived under writeups. pick an event and dig in."),
    ),
    (
        "scan",
        ConsoleReply::Literal("Enumerating signal... 3 open ports, 1 suspicious relay. go poke the lab."),
    ),
    ("ping", ConsoleReply::Computed(ping_reply)),
    (
        "sudo",
        ConsoleReply::Literal("nice try. this incident will be reported."),
    ),
];

pub fn lookup(command: &str) -> Option<ConsoleReply> {
    let needle = command.trim().to_lowercase();
    COMMANDS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, reply)| *reply)
}

pub fn reply_for(command: &str) -> String {
    match lookup(command) {
        Some(reply) => reply.render(),
        None => format!("unknown command '{}'. type 'help' for the list.", command.trim()),
    }
}

fn ping_reply() -> String {
    format!(
        "ping blitzhack.xyz ... {}ms :: tunnel alive.",
        latency_ms(random_unit())
    )
}

fn latency_ms(unit: f64) -> u32 {
    let unit = unit.clamp(0.0, 0.999_999);
    PING_MIN_MS + (unit * PING_SPREAD_MS as f64).floor() as u32
}

#[cfg(target_arch = "wasm32")]
fn random_unit() -> f64 {
    js_sys::Math::random()
}

#[cfg(not(target_arch = "wasm32"))]
fn random_unit() -> f64 {
    0.5
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Input,
    Output,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleLine {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
struct Typing {
    id: u64,
    index: usize,
    target: String,
    revealed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Issue {
    Ignored,
    Cleared,
    /// A new animation started; its id drives `tick`.
    Animating(u64),
    Appended,
}

/// Console transcript plus the single in-flight typing animation. While
/// `typing` is set no other line animates; later replies land complete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsoleState {
    lines: Vec<ConsoleLine>,
    typing: Option<Typing>,
    next_animation: u64,
}

impl ConsoleState {
    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    pub fn typing_index(&self) -> Option<usize> {
        self.typing.as_ref().map(|typing| typing.index)
    }

    pub fn issue(&mut self, input: &str) -> Issue {
        let command = input.trim();
        if command.is_empty() {
            return Issue::Ignored;
        }
        if command.eq_ignore_ascii_case("clear") {
            self.lines.clear();
            self.typing = None;
            return Issue::Cleared;
        }

        self.lines.push(ConsoleLine {
            kind: LineKind::Input,
            text: format!("> {command}"),
        });
        let reply = reply_for(command);
        if self.typing.is_some() {
            self.lines.push(ConsoleLine {
                kind: LineKind::Output,
                text: reply,
            });
            return Issue::Appended;
        }

        self.lines.push(ConsoleLine {
            kind: LineKind::Output,
            text: String::new(),
        });
        let id = self.next_animation;
        self.next_animation += 1;
        self.typing = Some(Typing {
            id,
            index: self.lines.len() - 1,
            target: reply,
            revealed: 0,
        });
        Issue::Animating(id)
    }

    /// Reveals the next characters of animation `id`. Returns `true` while
    /// more ticks are needed; a loop driving a cleared or replaced animation
    /// gets `false` and must stop.
    pub fn tick(&mut self, id: u64) -> bool {
        let Some(typing) = self.typing.as_mut().filter(|typing| typing.id == id) else {
            return false;
        };
        let total = typing.target.chars().count();
        typing.revealed = (typing.revealed + TYPE_CHARS_PER_TICK).min(total);
        let partial: String = typing.target.chars().take(typing.revealed).collect();
        let done = typing.revealed >= total;
        if let Some(line) = self.lines.get_mut(typing.index) {
            line.text = partial;
        }
        if done {
            self.typing = None;
        }
        !done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn animating(issue: Issue) -> u64 {
        match issue {
            Issue::Animating(id) => id,
            other => panic!("expected an animation, got {other:?}"),
        }
    }

    fn finish(state: &mut ConsoleState, id: u64) -> usize {
        let mut ticks = 0;
        while state.tick(id) {
            ticks += 1;
        }
        ticks + 1
    }

    #[test]
    fn scan_reply() {
        assert!(reply_for("scan").starts_with("Enumerating signal..."));
        assert!(reply_for("  SCAN ").starts_with("Enumerating signal..."));
    }

    #[test]
    fn ping_reply_shape() {
        let reply = reply_for("ping");
        let latency = reply
            .strip_prefix("ping blitzhack.xyz ... ")
            .and_then(|rest| rest.strip_suffix("ms :: tunnel alive."))
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap();
        assert!((30..=69).contains(&latency));
    }

    #[test]
    fn latency_range_edges() {
        assert_eq!(latency_ms(0.0), 30);
        assert_eq!(latency_ms(0.999), 69);
        assert_eq!(latency_ms(1.0), 69);
        assert_eq!(latency_ms(-3.0), 30);
    }

    #[test]
    fn unknown_command_hint() {
        assert!(lookup("hack-the-planet").is_none());
        assert_eq!(
            reply_for("hack-the-planet"),
            "unknown command 'hack-the-planet'. type 'help' for the list."
        );
    }

    #[test]
    fn typing_reveals_two_chars_per_tick() {
        let mut state = ConsoleState::default();
        let id = animating(state.issue("sudo"));
        assert_eq!(state.lines()[1].text, "");
        assert!(state.tick(id));
        assert_eq!(state.lines()[1].text, "ni");
        assert!(state.tick(id));
        assert_eq!(state.lines()[1].text, "nice");
        let target = reply_for("sudo");
        let ticks = finish(&mut state, id);
        assert_eq!(ticks, (target.chars().count() - 4).div_ceil(2));
        assert_eq!(state.lines()[1].text, target);
        assert!(!state.is_typing());
    }

    #[test]
    fn commands_during_typing_land_complete_and_in_order() {
        let mut state = ConsoleState::default();
        let id = animating(state.issue("scan"));
        state.tick(id);
        assert_eq!(state.issue("team"), Issue::Appended);
        assert_eq!(state.issue("whoami"), Issue::Appended);
        assert_eq!(state.typing_index(), Some(1));
        assert_eq!(state.lines()[3].text, reply_for("team"));
        finish(&mut state, id);

        let texts: Vec<&str> = state.lines().iter().map(|line| line.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "> scan",
                reply_for("scan").as_str(),
                "> team",
                reply_for("team").as_str(),
                "> whoami",
                reply_for("whoami").as_str(),
            ]
        );
        assert_eq!(state.issue("help"), Issue::Animating(id + 1));
    }

    #[test]
    fn clear_drops_lines_and_lock() {
        let mut state = ConsoleState::default();
        let id = animating(state.issue("ctf"));
        assert_eq!(state.issue("CLEAR"), Issue::Cleared);
        assert!(state.lines().is_empty());
        assert!(!state.tick(id));
        assert_eq!(state.issue("   "), Issue::Ignored);
    }

    #[test]
    fn loop_from_before_clear_cannot_drive_the_next_reply() {
        let mut state = ConsoleState::default();
        let old = animating(state.issue("scan"));
        assert!(state.tick(old));
        assert_eq!(state.issue("clear"), Issue::Cleared);

        let current = animating(state.issue("sudo"));
        assert_ne!(old, current);
        assert!(!state.tick(old));
        assert_eq!(state.lines()[1].text, "");

        assert!(state.tick(current));
        assert!(!state.tick(old));
        assert_eq!(state.lines()[1].text, "ni");
        finish(&mut state, current);
        assert_eq!(state.lines()[1].text, reply_for("sudo"));
    }
}
