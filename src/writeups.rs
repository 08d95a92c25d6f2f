use std::collections::HashMap;
use std::fmt;

use gloo_net::http::Request;
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WriteupIndex {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(rename = "assetBase", default)]
    pub asset_base: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Event {
    pub fn challenge_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.challenges.len())
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Challenge {
    pub title: String,
    #[serde(rename = "rawUrl")]
    pub raw_url: String,
    #[serde(rename = "assetBase", default)]
    pub asset_base: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchError {
    Network(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(message) => write!(f, "request failed: {message}"),
            FetchError::Status(status) => write!(f, "request failed: status {status}"),
            FetchError::Decode(message) => write!(f, "decode failed: {message}"),
        }
    }
}

pub async fn fetch_index(url: &str) -> Result<WriteupIndex, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|err| FetchError::Network(err.to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }
    response
        .json::<WriteupIndex>()
        .await
        .map_err(|err| FetchError::Decode(err.to_string()))
}

pub async fn fetch_document(url: &str) -> Result<String, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|err| FetchError::Network(err.to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }
    response
        .text()
        .await
        .map_err(|err| FetchError::Decode(err.to_string()))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pill {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

/// Loaded index plus the currently selected event.
#[derive(Clone, Debug, PartialEq)]
pub struct Gallery {
    index: WriteupIndex,
    active: usize,
}

impl Gallery {
    /// `None` for an index without events; nothing gets rendered then.
    pub fn new(index: WriteupIndex) -> Option<Self> {
        if index.events.is_empty() {
            return None;
        }
        Some(Self { index, active: 0 })
    }

    pub fn select(&mut self, event: usize) -> bool {
        if event >= self.index.events.len() {
            return false;
        }
        self.active = event;
        true
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_event(&self) -> &Event {
        &self.index.events[self.active]
    }

    pub fn pills(&self) -> Vec<Pill> {
        self.index
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| Pill {
                index,
                label: format!("{} ({})", event.name, event.challenge_count()),
                active: index == self.active,
            })
            .collect()
    }
}

/// What the modal needs to show a single writeup.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteupTarget {
    pub title: String,
    pub event_name: String,
    pub raw_url: String,
    pub asset_base: String,
}

impl WriteupTarget {
    pub fn new(event: &Event, challenge: &Challenge) -> Self {
        let asset_base = challenge
            .asset_base
            .clone()
            .or_else(|| event.asset_base.clone())
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| document_directory(&challenge.raw_url));
        Self {
            title: challenge.title.clone(),
            event_name: event.name.clone(),
            raw_url: challenge.raw_url.clone(),
            asset_base,
        }
    }
}

fn document_directory(raw_url: &str) -> String {
    match raw_url.rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/"),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpenStep {
    Cached(String),
    Fetch,
}

/// Rendered writeups keyed by document URL, kept for the page session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderCache {
    entries: HashMap<String, String>,
}

impl RenderCache {
    pub fn begin_open(&self, url: &str) -> OpenStep {
        match self.entries.get(url) {
            Some(html) => OpenStep::Cached(html.clone()),
            None => OpenStep::Fetch,
        }
    }

    pub fn store(&mut self, url: &str, html: String) {
        self.entries.insert(url.to_string(), html);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalBody {
    Loading,
    Ready(String),
    Failed,
}

/// The writeup currently shown in the modal.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalState {
    pub target: WriteupTarget,
    pub body: ModalBody,
}

/// Applies a finished fetch for `target`. Successful renders are cached even
/// when the modal has moved on; the visible body only changes while the modal
/// still shows `target`. Failures are never cached.
pub fn settle_fetch(
    modal: &mut Option<ModalState>,
    cache: &mut RenderCache,
    target: &WriteupTarget,
    rendered: Result<String, FetchError>,
) {
    let body = match rendered {
        Ok(html) => {
            cache.store(&target.raw_url, html.clone());
            ModalBody::Ready(html)
        }
        Err(_) => ModalBody::Failed,
    };
    if let Some(state) = modal.as_mut() {
        if state.target.raw_url == target.raw_url {
            state.body = body;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render_writeup;
    use pretty_assertions::assert_eq;

    const INDEX: &str = r#"{
        "events": [
            {
                "name": "HTB Cyber Apocalypse",
                "categories": [
                    { "name": "web", "challenges": [
                        { "title": "Flag Command", "rawUrl": "https://raw.example.com/ca/web/flag/README.md" },
                        { "title": "TimeKORP", "rawUrl": "https://raw.example.com/ca/web/timekorp/README.md", "assetBase": "https://cdn.example.com/timekorp/" }
                    ] },
                    { "name": "pwn", "challenges": [
                        { "title": "Tutorial", "rawUrl": "https://raw.example.com/ca/pwn/tutorial.md" }
                    ] }
                ]
            },
            {
                "name": "picoCTF",
                "assetBase": "https://raw.example.com/pico/assets/",
                "categories": [
                    { "name": "crypto", "challenges": [
                        { "title": "interencdec", "rawUrl": "https://raw.example.com/pico/interencdec.md" }
                    ] },
                    { "name": "misc" }
                ]
            }
        ]
    }"#;

    fn gallery() -> Gallery {
        let index: WriteupIndex = serde_json::from_str(INDEX).unwrap();
        Gallery::new(index).unwrap()
    }

    #[test]
    fn pills_carry_counts_and_first_is_active() {
        let gallery = gallery();
        let pills = gallery.pills();
        assert_eq!(pills[0].label, "HTB Cyber Apocalypse (3)");
        assert_eq!(pills[1].label, "picoCTF (1)");
        assert!(pills[0].active);
        assert!(!pills[1].active);
    }

    #[test]
    fn selecting_an_event_switches_panel_and_pill() {
        let mut gallery = gallery();
        assert!(gallery.select(1));
        assert_eq!(gallery.active_event().name, "picoCTF");
        assert_eq!(gallery.active_event().categories.len(), 2);
        let active: Vec<bool> = gallery.pills().iter().map(|pill| pill.active).collect();
        assert_eq!(active, vec![false, true]);

        assert!(!gallery.select(7));
        assert_eq!(gallery.active(), 1);
    }

    #[test]
    fn empty_index_renders_nothing() {
        let index: WriteupIndex = serde_json::from_str("{}").unwrap();
        assert!(Gallery::new(index).is_none());
        assert!(serde_json::from_str::<WriteupIndex>("not json").is_err());
    }

    #[test]
    fn asset_base_precedence() {
        let gallery = gallery();
        let htb = &gallery.index.events[0];
        let pico = &gallery.index.events[1];

        let own = WriteupTarget::new(htb, &htb.categories[0].challenges[1]);
        assert_eq!(own.asset_base, "https://cdn.example.com/timekorp/");

        let from_event = WriteupTarget::new(pico, &pico.categories[0].challenges[0]);
        assert_eq!(from_event.asset_base, "https://raw.example.com/pico/assets/");

        let from_url = WriteupTarget::new(htb, &htb.categories[1].challenges[0]);
        assert_eq!(from_url.asset_base, "https://raw.example.com/ca/pwn/");
        assert_eq!(from_url.event_name, "HTB Cyber Apocalypse");
        assert_eq!(from_url.title, "Tutorial");
    }

    fn loading(target: &WriteupTarget) -> Option<ModalState> {
        Some(ModalState {
            target: target.clone(),
            body: ModalBody::Loading,
        })
    }

    #[test]
    fn late_fetch_fills_cache_but_not_the_other_writeup() {
        let gallery = gallery();
        let web = &gallery.index.events[0];
        let first = WriteupTarget::new(web, &web.categories[0].challenges[0]);
        let second = WriteupTarget::new(web, &web.categories[0].challenges[1]);

        let mut cache = RenderCache::default();
        let mut modal = loading(&second);
        settle_fetch(&mut modal, &mut cache, &first, Ok("<h1>Flag Command</h1>".to_string()));

        assert_eq!(modal, loading(&second));
        assert_eq!(
            cache.begin_open(&first.raw_url),
            OpenStep::Cached("<h1>Flag Command</h1>".to_string())
        );

        settle_fetch(&mut modal, &mut cache, &second, Ok("<h1>TimeKORP</h1>".to_string()));
        assert_eq!(modal.map(|state| state.body), Some(ModalBody::Ready("<h1>TimeKORP</h1>".to_string())));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_fetch_is_shown_but_not_cached() {
        let gallery = gallery();
        let pico = &gallery.index.events[1];
        let target = WriteupTarget::new(pico, &pico.categories[0].challenges[0]);

        let mut cache = RenderCache::default();
        let mut modal = loading(&target);
        settle_fetch(&mut modal, &mut cache, &target, Err(FetchError::Status(404)));

        assert_eq!(modal.map(|state| state.body), Some(ModalBody::Failed));
        assert_eq!(cache.begin_open(&target.raw_url), OpenStep::Fetch);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn closed_modal_stays_closed() {
        let gallery = gallery();
        let pico = &gallery.index.events[1];
        let target = WriteupTarget::new(pico, &pico.categories[0].challenges[0]);

        let mut cache = RenderCache::default();
        let mut modal = None;
        settle_fetch(&mut modal, &mut cache, &target, Ok("<p>late</p>".to_string()));
        assert_eq!(modal, None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn second_open_hits_cache() {
        let mut cache = RenderCache::default();
        let url = "https://raw.example.com/ca/pwn/tutorial.md";
        assert_eq!(cache.begin_open(url), OpenStep::Fetch);

        let html = render_writeup("# Tutorial\n\n![stack](img/stack.png)", "https://raw.example.com/ca/pwn/");
        cache.store(url, html.clone());

        assert_eq!(cache.begin_open(url), OpenStep::Cached(html.clone()));
        assert_eq!(cache.begin_open(url), OpenStep::Cached(html));
        assert_eq!(cache.len(), 1);
    }
}
