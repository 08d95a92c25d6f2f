use std::collections::{BTreeMap, VecDeque};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const TRANSCRIPT_LIMIT: usize = 12;
pub const SHELL_VERSION: &str = "blitzlab shell 1.3.0 (wasm32)";

pub const ACCEPTED_FLAGS: [&str; 2] = [
    "blitz{b4s3_64_1s_n0t_encrypt10n}",
    "blitzhack{b4s3_64_1s_n0t_encrypt10n}",
];

const SIGNAL_ENC: &str = "signal.enc";
const SIGNAL_DEC: &str = "signal.dec";
const DECODER_SCRIPT: &str = "decode.py";

const SEED_SIGNAL: &str = "VFJBTlNNSVNTSU9OIDB4N0YgLy8gcmVsYXkgbm9kZSAzCmZsYWc6IGJsaXR6e2I0czNfNjRfMXNfbjB0X2VuY3J5cHQxMG59CnN1Ym1pdCBpdCBiZWxvdy4gc3RheSBzaGFycC4=";

const README: &str = "BlitzHack training box #3\n\
We intercepted something on the relay. It is sitting in signal.enc.\n\
Somebody left a decoder script behind. Figure out what it says.";

const DECODER_SOURCE: &str = "#!/usr/bin/env python3
import base64, sys

def main(path):
    with open(path) as handle:
        raw = handle.read().strip()
    out = path.replace('.enc', '.dec')
    with open(out, 'w') as handle:
        handle.write(base64.b64decode(raw).decode())

if __name__ == '__main__':
    main(sys.argv[1])";

/// Lines printed by the lab shell, oldest evicted first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    lines: VecDeque<String>,
}

impl Transcript {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > TRANSCRIPT_LIMIT {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Scripted shell behind the lab puzzle. Owns the pretend filesystem and the
/// transcript; nothing here touches the DOM.
#[derive(Clone, Debug, PartialEq)]
pub struct LabShell {
    files: BTreeMap<String, String>,
    transcript: Transcript,
}

impl Default for LabShell {
    fn default() -> Self {
        let mut files = BTreeMap::new();
        files.insert("README.txt".to_string(), README.to_string());
        files.insert(DECODER_SCRIPT.to_string(), DECODER_SOURCE.to_string());
        files.insert(SIGNAL_ENC.to_string(), SEED_SIGNAL.to_string());
        Self {
            files,
            transcript: Transcript::default(),
        }
    }
}

impl LabShell {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// Runs one input line, records it in the transcript and returns the
    /// output lines it produced.
    pub fn execute(&mut self, raw: &str) -> Vec<String> {
        let line = raw.trim();
        if line.is_empty() {
            return Vec::new();
        }
        if line == "clear" {
            self.transcript.clear();
            return Vec::new();
        }

        let output = self.dispatch(line);
        self.transcript.push(format!("$ {line}"));
        for entry in &output {
            for line in entry.split('\n') {
                self.transcript.push(line);
            }
        }
        output
    }

    fn dispatch(&mut self, line: &str) -> Vec<String> {
        if let Some(file) = parse_base64_pipeline(line) {
            return self.decode_pipeline(file);
        }
        if line.contains('|') {
            return owned(&["pipes are limited to `cat <file> | base64 -d` on this box"]);
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        match command {
            "help" => help_lines(),
            "ls" => vec![self.files.keys().cloned().collect::<Vec<_>>().join("  ")],
            "cat" => self.cat(&args),
            "python3" => self.python(&args),
            "version" => vec![SHELL_VERSION.to_string()],
            _ => vec![
                format!("command not found: {command}"),
                "type `help` for available commands".to_string(),
            ],
        }
    }

    fn cat(&self, args: &[&str]) -> Vec<String> {
        if args.is_empty() {
            return owned(&["usage: cat <file>"]);
        }
        args.iter()
            .map(|name| match self.files.get(*name) {
                Some(content) => content.clone(),
                None => missing_file("cat", name),
            })
            .collect()
    }

    fn decode_pipeline(&self, file: &str) -> Vec<String> {
        match self.files.get(file) {
            Some(content) => match decode_text(content) {
                Ok(plain) => vec![plain],
                Err(message) => vec![message],
            },
            None => vec![missing_file("cat", file)],
        }
    }

    fn python(&mut self, args: &[&str]) -> Vec<String> {
        match args {
            [] => owned(&[
                "Python 3.11.4 (main, Jun  7 2023, 10:13:09) [GCC 12.2.0] on linux",
                "interactive mode is disabled on this box. run a script instead.",
            ]),
            [script, rest @ ..] if *script == DECODER_SCRIPT => match rest.first() {
                Some(&SIGNAL_ENC) => self.run_decoder(),
                Some(other) => vec![format!("decode.py: error: no transmission found in '{other}'")],
                None => owned(&["usage: python3 decode.py <file.enc>"]),
            },
            [script, ..] => vec![format!(
                "python3: can't open file '{script}': [Errno 2] No such file or directory"
            )],
        }
    }

    fn run_decoder(&mut self) -> Vec<String> {
        if self.files.contains_key(SIGNAL_DEC) {
            return vec![format!("[!] {SIGNAL_DEC} already exists, skipping decode.")];
        }

        let mut output = owned(&[
            "[*] opening signal.enc",
            "[*] payload looks like base64, stripping whitespace",
            "[*] decoding payload...",
        ]);
        let decoded = self.files.get(SIGNAL_ENC).map(|content| decode_text(content));
        match decoded {
            Some(Ok(plain)) => {
                output.push(format!("[+] wrote {SIGNAL_DEC} ({} bytes)", plain.len()));
                output.push(format!("[+] done. try `cat {SIGNAL_DEC}`"));
                self.files.insert(SIGNAL_DEC.to_string(), plain);
            }
            Some(Err(message)) => output.push(format!("[-] {message}")),
            None => output.push(missing_file("decode.py", SIGNAL_ENC)),
        }
        output
    }
}

fn parse_base64_pipeline(line: &str) -> Option<&str> {
    let (left, right) = line.split_once('|')?;
    let mut left = left.split_whitespace();
    let (Some("cat"), Some(file), None) = (left.next(), left.next(), left.next()) else {
        return None;
    };
    let right: Vec<&str> = right.split_whitespace().collect();
    matches!(right.as_slice(), ["base64", "-d"] | ["base64", "--decode"]).then_some(file)
}

fn decode_text(content: &str) -> Result<String, String> {
    let compact: String = content.chars().filter(|ch| !ch.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|_| "base64: invalid input, decoding failed".to_string())?;
    String::from_utf8(bytes).map_err(|_| "base64: decoded data is not text, decoding failed".to_string())
}

fn missing_file(program: &str, name: &str) -> String {
    format!("{program}: {name}: No such file or directory")
}

fn help_lines() -> Vec<String> {
    owned(&[
        "available commands:",
        "  ls                      list files",
        "  cat <file>              print a file",
        "  cat <file> | base64 -d  decode a file",
        "  python3 [script] [args] run a script",
        "  version                 shell version",
        "  clear                   wipe the screen",
    ])
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlagPuzzle {
    #[default]
    Unsolved,
    Solved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagVerdict {
    Empty,
    Incorrect,
    Accepted,
    AlreadySolved,
}

impl FlagVerdict {
    pub fn message(self) -> &'static str {
        match self {
            FlagVerdict::Empty => "Enter a flag first.",
            FlagVerdict::Incorrect => "Not quite. Dig through the box again and retry.",
            FlagVerdict::Accepted | FlagVerdict::AlreadySolved => "Flag accepted. Welcome to BlitzHack.",
        }
    }
}

impl FlagPuzzle {
    /// Solved is terminal: later submissions never change state.
    pub fn submit(&mut self, input: &str) -> FlagVerdict {
        if self.is_solved() {
            return FlagVerdict::AlreadySolved;
        }
        let candidate = input.trim().to_lowercase();
        if candidate.is_empty() {
            return FlagVerdict::Empty;
        }
        if ACCEPTED_FLAGS.contains(&candidate.as_str()) {
            *self = FlagPuzzle::Solved;
            FlagVerdict::Accepted
        } else {
            FlagVerdict::Incorrect
        }
    }

    pub fn is_solved(self) -> bool {
        self == FlagPuzzle::Solved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ls_lists_sorted_files() {
        let mut shell = LabShell::default();
        assert_eq!(shell.execute("ls"), vec!["README.txt  decode.py  signal.enc".to_string()]);
    }

    #[test]
    fn cat_returns_exact_content() {
        let mut shell = LabShell::default();
        assert_eq!(shell.execute("cat signal.enc"), vec![SEED_SIGNAL.to_string()]);
        assert_eq!(shell.execute("cat README.txt"), vec![README.to_string()]);
    }

    #[test]
    fn cat_missing_file_names_it() {
        let mut shell = LabShell::default();
        let output = shell.execute("cat nope.txt");
        assert_eq!(output, vec!["cat: nope.txt: No such file or directory".to_string()]);
    }

    #[test]
    fn pipeline_matches_manual_decode() {
        let mut shell = LabShell::default();
        let expected = String::from_utf8(STANDARD.decode(SEED_SIGNAL).unwrap()).unwrap();
        assert_eq!(shell.execute("cat signal.enc | base64 -d"), vec![expected.clone()]);
        assert_eq!(shell.execute("cat   signal.enc|base64 --decode"), vec![expected]);
    }

    #[test]
    fn pipeline_reports_bad_base64() {
        let mut shell = LabShell::default();
        let output = shell.execute("cat README.txt | base64 -d");
        assert_eq!(output.len(), 1);
        assert!(output[0].contains("decoding failed"));
    }

    #[test]
    fn pipeline_reports_missing_file() {
        let mut shell = LabShell::default();
        assert_eq!(
            shell.execute("cat ghost | base64 -d"),
            vec!["cat: ghost: No such file or directory".to_string()]
        );
    }

    #[test]
    fn unsupported_pipe_is_rejected() {
        let mut shell = LabShell::default();
        let output = shell.execute("cat signal.enc | grep flag");
        assert!(output[0].starts_with("pipes are limited"));
    }

    #[test]
    fn decoder_runs_once() {
        let mut shell = LabShell::default();
        let first = shell.execute("python3 decode.py signal.enc");
        assert!(first.last().unwrap().contains("cat signal.dec"));
        let stored = shell.file(SIGNAL_DEC).unwrap().to_string();
        assert!(stored.contains("blitz{b4s3_64_1s_n0t_encrypt10n}"));

        let second = shell.execute("python3 decode.py signal.enc");
        assert_eq!(second, vec!["[!] signal.dec already exists, skipping decode.".to_string()]);
        assert_eq!(shell.file(SIGNAL_DEC), Some(stored.as_str()));
        assert_eq!(shell.execute("ls"), vec!["README.txt  decode.py  signal.dec  signal.enc".to_string()]);
    }

    #[test]
    fn python_variants() {
        let mut shell = LabShell::default();
        assert!(shell.execute("python3")[0].starts_with("Python 3"));
        assert_eq!(
            shell.execute("python3 exploit.py"),
            vec!["python3: can't open file 'exploit.py': [Errno 2] No such file or directory".to_string()]
        );
        assert_eq!(
            shell.execute("python3 decode.py"),
            vec!["usage: python3 decode.py <file.enc>".to_string()]
        );
        assert!(shell.file(SIGNAL_DEC).is_none());
    }

    #[test]
    fn unknown_command_hint() {
        let mut shell = LabShell::default();
        let output = shell.execute("rm -rf /");
        assert_eq!(output[0], "command not found: rm");
    }

    #[test]
    fn transcript_stays_bounded() {
        let mut shell = LabShell::default();
        for command in ["help", "ls", "version", "cat decode.py", "python3 decode.py signal.enc", "help"] {
            shell.execute(command);
            assert!(shell.transcript().len() <= TRANSCRIPT_LIMIT);
        }
        assert_eq!(shell.transcript().len(), TRANSCRIPT_LIMIT);
        assert_eq!(shell.transcript().lines().last(), Some("  clear                   wipe the screen"));
    }

    #[test]
    fn multiline_output_counts_each_line() {
        let mut shell = LabShell::default();
        shell.execute("cat decode.py");
        shell.execute("cat README.txt");
        assert_eq!(shell.transcript().len(), TRANSCRIPT_LIMIT);
        assert!(shell.transcript().lines().all(|line| !line.contains('\n')));
        let tail: Vec<&str> = shell.transcript().lines().skip(TRANSCRIPT_LIMIT - 4).collect();
        let mut expected = vec!["$ cat README.txt"];
        expected.extend(README.lines());
        assert_eq!(tail, expected);
    }

    #[test]
    fn clear_and_blank_lines() {
        let mut shell = LabShell::default();
        shell.execute("version");
        assert_eq!(shell.transcript().len(), 2);
        assert!(shell.execute("   ").is_empty());
        assert_eq!(shell.transcript().len(), 2);
        shell.execute("clear");
        assert!(shell.transcript().is_empty());
    }

    #[test]
    fn accepted_flags_solve_once() {
        for flag in ACCEPTED_FLAGS {
            let mut puzzle = FlagPuzzle::default();
            assert_eq!(puzzle.submit(&format!("  {}  ", flag.to_uppercase())), FlagVerdict::Accepted);
            assert!(puzzle.is_solved());
            assert_eq!(puzzle.submit(flag), FlagVerdict::AlreadySolved);
            assert_eq!(puzzle.submit("wrong"), FlagVerdict::AlreadySolved);
            assert!(puzzle.is_solved());
        }
    }

    #[test]
    fn wrong_and_empty_flags_stay_unsolved() {
        let mut puzzle = FlagPuzzle::default();
        assert_eq!(puzzle.submit("   "), FlagVerdict::Empty);
        assert_eq!(puzzle.submit("blitz{nope}"), FlagVerdict::Incorrect);
        assert_eq!(puzzle.submit("flag: blitz{b4s3_64_1s_n0t_encrypt10n}"), FlagVerdict::Incorrect);
        assert_eq!(puzzle, FlagPuzzle::Unsolved);
        assert_ne!(FlagVerdict::Empty.message(), FlagVerdict::Incorrect.message());
    }
}
