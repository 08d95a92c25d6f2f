#[cfg(feature = "markdown")]
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use url::Url;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_RESET_MS: u32 = 1500;

#[cfg(feature = "markdown")]
const CODE_BLOCK_OPEN: &str =
    "<div class=\"code-block\"><button type=\"button\" class=\"copy-btn\">Copy</button>\n";

/// Markdown to HTML with image references pinned to `asset_base` and a copy
/// button in front of every code block.
#[cfg(feature = "markdown")]
pub fn render_writeup(markdown: &str, asset_base: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events = Vec::new();
    let mut raw_run = RawHtml::default();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Html(raw) => raw_run.push(false, &raw, &mut events, asset_base),
            Event::InlineHtml(raw) => raw_run.push(true, &raw, &mut events, asset_base),
            other => {
                raw_run.flush(&mut events, asset_base);
                push_rewritten(other, &mut events, asset_base);
            }
        }
    }
    raw_run.flush(&mut events, asset_base);

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

/// Consecutive raw HTML events of one kind. A tag can be split across
/// several events, so image sources are rewritten once the run ends.
#[cfg(feature = "markdown")]
#[derive(Default)]
struct RawHtml {
    inline: bool,
    text: String,
}

#[cfg(feature = "markdown")]
impl RawHtml {
    fn push<'a>(&mut self, inline: bool, raw: &str, events: &mut Vec<Event<'a>>, asset_base: &str) {
        if inline != self.inline {
            self.flush(events, asset_base);
            self.inline = inline;
        }
        self.text.push_str(raw);
    }

    fn flush<'a>(&mut self, events: &mut Vec<Event<'a>>, asset_base: &str) {
        if self.text.is_empty() {
            return;
        }
        let rewritten = CowStr::from(rewrite_img_tags(&std::mem::take(&mut self.text), asset_base));
        events.push(if self.inline {
            Event::InlineHtml(rewritten)
        } else {
            Event::Html(rewritten)
        });
    }
}

#[cfg(feature = "markdown")]
fn push_rewritten<'a>(event: Event<'a>, events: &mut Vec<Event<'a>>, asset_base: &str) {
    match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => events.push(Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::from(resolve_asset(&dest_url, asset_base)),
            title,
            id,
        })),
        Event::Start(Tag::CodeBlock(kind)) => {
            events.push(Event::Html(CowStr::Borrowed(CODE_BLOCK_OPEN)));
            events.push(Event::Start(Tag::CodeBlock(kind)));
        }
        Event::End(TagEnd::CodeBlock) => {
            events.push(Event::End(TagEnd::CodeBlock));
            events.push(Event::Html(CowStr::Borrowed("</div>\n")));
        }
        other => events.push(other),
    }
}

/// Without a renderer the document is shown as-is.
#[cfg(not(feature = "markdown"))]
pub fn render_writeup(markdown: &str, _asset_base: &str) -> String {
    format!("<pre class=\"writeup-raw\">{}</pre>", escape_html(markdown))
}

#[cfg(not(feature = "markdown"))]
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn resolve_asset(src: &str, base: &str) -> String {
    let src = src.trim();
    if base.trim().is_empty() || !is_relative_reference(src) {
        return src.to_string();
    }
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    match Url::parse(&base).and_then(|base| base.join(src)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => join_path(&base, src),
    }
}

fn join_path(base: &str, src: &str) -> String {
    let mut src = src;
    while let Some(stripped) = src.strip_prefix("./") {
        src = stripped;
    }
    format!("{}/{}", base.trim_end_matches('/'), src)
}

fn is_relative_reference(src: &str) -> bool {
    if src.is_empty() || src.starts_with('/') || src.starts_with('#') {
        return false;
    }
    !has_scheme(src)
}

fn has_scheme(src: &str) -> bool {
    let Some((scheme, _)) = src.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn rewrite_img_tags(html: &str, base: &str) -> String {
    let mut output = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = find_img_tag(rest) {
        let (before, tail) = rest.split_at(start);
        output.push_str(before);
        let end = tail.find('>').map(|index| index + 1).unwrap_or(tail.len());
        let (tag, after) = tail.split_at(end);
        output.push_str(&rewrite_src_attribute(tag, base));
        rest = after;
    }
    output.push_str(rest);
    output
}

/// Byte offset of the next `<img` that opens an image tag, skipping names
/// that merely start with `img`.
fn find_img_tag(html: &str) -> Option<usize> {
    let lowered = html.to_ascii_lowercase();
    let bytes = lowered.as_bytes();
    let mut search_from = 0;
    while let Some(found) = lowered[search_from..].find("<img") {
        let start = search_from + found;
        match bytes.get(start + 4) {
            Some(next) if next.is_ascii_whitespace() || matches!(next, b'>' | b'/') => return Some(start),
            _ => search_from = start + 4,
        }
    }
    None
}

fn rewrite_src_attribute(tag: &str, base: &str) -> String {
    let lowered = tag.to_ascii_lowercase();
    let bytes = lowered.as_bytes();
    let mut search_from = 0;
    let attr = loop {
        let Some(found) = lowered[search_from..].find("src=") else {
            return tag.to_string();
        };
        let position = search_from + found;
        if position > 0 && bytes[position - 1].is_ascii_whitespace() {
            break position;
        }
        search_from = position + 4;
    };

    let value_start = attr + 4;
    let quote = match tag[value_start..].chars().next() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => return tag.to_string(),
    };
    let inner_start = value_start + 1;
    let Some(length) = tag[inner_start..].find(quote) else {
        return tag.to_string();
    };
    let src = &tag[inner_start..inner_start + length];
    format!(
        "{}{}{}",
        &tag[..inner_start],
        resolve_asset(src, base),
        &tag[inner_start + length..]
    )
}
