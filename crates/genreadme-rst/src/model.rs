//! Document tree produced by the parser and consumed by the HTML writer.

use std::collections::HashMap;

/// Inline markup inside paragraphs, titles, list items and captions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// `*emphasis*`
    Emphasis(String),
    /// `**strong**`
    Strong(String),
    /// ``` ``literal`` ```
    Literal(String),
    /// `` `interpreted text` `` with the default (title reference) role.
    Cite(String),
    /// A link with a known URI: `` `text <uri>`_ `` or a standalone URI.
    ExternalRef {
        /// Link text.
        text: String,
        /// Destination.
        uri: String,
    },
    /// `name_` or `` `some name`_ ``, resolved against targets when written.
    NamedRef {
        /// Link text as written.
        text: String,
        /// Normalised reference name.
        name: String,
    },
    /// `|name|`
    SubstitutionRef(String),
}

/// An image, from an `image` directive, a `figure`, or a substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// Image location.
    pub uri: String,
    /// `:alt:` option.
    pub alt: Option<String>,
    /// `:target:` option; wraps the image in a link.
    pub target: Option<String>,
    /// `:width:` option.
    pub width: Option<String>,
    /// `:height:` option.
    pub height: Option<String>,
    /// `:align:` option.
    pub align: Option<String>,
}

/// Body elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A section title. Sections are kept flat; the writer nests them by level.
    Section {
        /// 1-based level, assigned by first appearance of the adornment style.
        level: usize,
        /// Title markup.
        title: Vec<Inline>,
        /// Unique HTML id.
        id: String,
    },
    /// A paragraph.
    Paragraph(Vec<Inline>),
    /// Preformatted text from `::` or a code directive.
    LiteralBlock {
        /// Text with common indentation removed.
        text: String,
        /// Language from `code-block`, if any.
        language: Option<String>,
    },
    /// `*`, `-` or `+` list; each item is a block sequence.
    BulletList(Vec<Vec<Block>>),
    /// `1.` or `#.` list.
    EnumeratedList(Vec<Vec<Block>>),
    /// Term / definition pairs.
    DefinitionList(Vec<(Vec<Inline>, Vec<Block>)>),
    /// Indented text.
    BlockQuote(Vec<Block>),
    /// `.. anything that is not a directive`; rendered as an HTML comment.
    Comment(String),
    /// `.. image::`
    Image(Image),
    /// `.. figure::`
    Figure {
        /// The figure image.
        image: Image,
        /// First paragraph of the directive content.
        caption: Option<Vec<Inline>>,
        /// Remaining content.
        legend: Vec<Block>,
    },
    /// `.. note::`, `.. important::`, ...
    Admonition {
        /// Directive name, e.g. `important`.
        kind: String,
        /// Body elements.
        body: Vec<Block>,
    },
    /// `.. contents::`
    Contents {
        /// Topic title.
        title: String,
        /// HTML id of the topic.
        id: String,
        /// Only list subsections of the enclosing section.
        local: bool,
        /// Maximum nesting depth.
        depth: Option<usize>,
    },
    /// `.. math::`
    Math(String),
    /// `.. raw:: html` content, only produced when raw passthrough is enabled.
    Raw(String),
    /// A horizontal rule.
    Transition,
}

/// Value of a substitution definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// `.. |name| image:: uri`
    Image(Image),
    /// `.. |name| replace:: text`
    Text(Vec<Inline>),
}

/// A parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level body elements in source order.
    pub blocks: Vec<Block>,
    /// Substitution definitions by name.
    pub substitutions: HashMap<String, Substitution>,
    /// Explicit hyperlink targets by normalised name.
    pub targets: HashMap<String, String>,
    /// Section ids by normalised title, usable as implicit targets.
    pub section_ids: HashMap<String, String>,
}

impl Inline {
    /// Text content without markup.
    pub fn plain(inlines: &[Self]) -> String {
        inlines
            .iter()
            .map(|inline| match inline {
                Self::Text(s)
                | Self::Emphasis(s)
                | Self::Strong(s)
                | Self::Literal(s)
                | Self::Cite(s)
                | Self::SubstitutionRef(s) => s.as_str(),
                Self::ExternalRef { text, .. } | Self::NamedRef { text, .. } => text.as_str(),
            })
            .collect()
    }
}

/// Normalise a reference name: lower-case with whitespace collapsed.
pub(crate) fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Turn a title into an HTML id the way docutils does: lower-case ASCII
/// alphanumerics separated by single hyphens.
pub(crate) fn make_id(text: &str) -> String {
    let mut id = String::new();
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(c);
        } else {
            pending_dash = true;
        }
    }
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, 'n');
    }
    if id.is_empty() {
        id.push_str("section");
    }
    id
}
