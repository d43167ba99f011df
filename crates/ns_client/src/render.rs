use chrono::{DateTime, Utc};
use ns_core::Article;

use crate::format::{absolute_date, relative_date};

const VOID_TAGS: [&str; 1] = ["img"];

/// Minimal DOM-like tree. Text and attribute values are stored raw and only
/// escaped by [`Node::to_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    pub fn element(tag: &'static str) -> Self {
        Node::Element {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push((name, value.into()));
        }
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str()),
            Node::Text(_) => None,
        }
    }

    /// Depth-first search for the first element carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Node> {
        let Node::Element { children, .. } = self else {
            return None;
        };
        let has_class = self
            .get_attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false);
        if has_class {
            return Some(self);
        }
        children.iter().find_map(|child| child.find_class(class))
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element { children, .. } => children.iter().map(Node::text_content).collect(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Element { tag, attrs, children } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                if VOID_TAGS.contains(tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// The only escaping routine; every text node and attribute value goes through it.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Only http(s) links are rendered as-is.
pub fn safe_href(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => url.to_string(),
        _ => "#".to_string(),
    }
}

fn external_link(url: &str) -> Node {
    Node::element("a")
        .attr("href", safe_href(url))
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
}

fn card_image(article: &Article) -> Node {
    if article.image_url.is_empty() {
        Node::element("div")
            .attr("class", "article-card-image")
            .attr("aria-hidden", "true")
    } else {
        Node::element("img")
            .attr("class", "article-card-image")
            .attr("src", safe_href(&article.image_url))
            .attr("alt", "")
            .attr("loading", "lazy")
    }
}

fn source_label(article: &Article) -> &str {
    if article.source_name.is_empty() {
        "Unknown"
    } else {
        &article.source_name
    }
}

fn title_label(article: &Article) -> &str {
    if article.title.trim().is_empty() {
        "Untitled"
    } else {
        &article.title
    }
}

fn card_body(article: &Article, date: String) -> Node {
    let mut body = Node::element("div").attr("class", "article-card-body").child(
        Node::element("h3")
            .attr("class", "article-card-title")
            .child(external_link(&article.url).child(Node::text(title_label(article)))),
    );
    if !article.description.is_empty() {
        body = body.child(
            Node::element("p")
                .attr("class", "article-card-desc")
                .child(Node::text(article.description.as_str())),
        );
    }
    body.child(
        Node::element("div")
            .attr("class", "article-card-meta")
            .child(
                Node::element("span")
                    .attr("class", "article-card-source")
                    .child(Node::text(source_label(article))),
            )
            .child(Node::element("span").child(Node::text(date))),
    )
}

fn read_more(article: &Article) -> Node {
    external_link(&article.url)
        .attr("class", "btn-read-more")
        .child(Node::text("Read more"))
}

/// Grid card with a save button that reflects `saved`.
pub fn render_card(article: &Article, saved: bool, now: DateTime<Utc>) -> Node {
    let date = relative_date(article.published_time(), now);
    let (class, label, text) = if saved {
        ("btn-save saved", "Unsave", "✓ Saved")
    } else {
        ("btn-save", "Save", "♡ Save")
    };
    let actions = Node::element("div")
        .attr("class", "article-card-actions")
        .child(read_more(article))
        .child(
            Node::element("button")
                .attr("type", "button")
                .attr("class", class)
                .attr("data-url", article.url.as_str())
                .attr("aria-label", label)
                .child(Node::text(text)),
        );

    Node::element("article")
        .attr("class", "article-card")
        .attr("data-url", article.url.as_str())
        .child(card_image(article))
        .child(card_body(article, date).child(actions))
}

/// Card on the saved-articles page: absolute date and a remove button.
pub fn render_saved_card(article: &Article) -> Node {
    let date = article.published_time().map(absolute_date).unwrap_or_default();
    let actions = Node::element("div")
        .attr("class", "article-card-actions")
        .child(read_more(article))
        .child(
            Node::element("button")
                .attr("type", "button")
                .attr("class", "btn-save saved btn-remove")
                .attr("data-url", article.url.as_str())
                .attr("aria-label", "Remove from saved")
                .child(Node::text("Remove")),
        );

    Node::element("article")
        .attr("class", "article-card")
        .attr("data-url", article.url.as_str())
        .child(card_image(article))
        .child(card_body(article, date).child(actions))
}

pub fn render_trending_item(article: &Article, now: DateTime<Utc>) -> Node {
    let meta = format!(
        "{} · {}",
        article.source_name,
        relative_date(article.published_time(), now)
    );
    external_link(&article.url).attr("class", "trending-item").child(
        Node::element("div")
            .child(
                Node::element("span")
                    .attr("class", "trending-item-title")
                    .child(Node::text(article.title.as_str())),
            )
            .child(
                Node::element("span")
                    .attr("class", "trending-item-meta")
                    .child(Node::text(meta)),
            ),
    )
}
