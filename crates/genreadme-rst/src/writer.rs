//! XHTML writer, modelled on the docutils `html4css1` output.

use crate::diagnostic::{Level, Reporter};
use crate::model::{Block, Document, Image, Inline, Substitution, normalize_name};
use crate::{GENERATOR_NAME, Result, Settings};
use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLESHEET: &str = r"body { font-family: sans-serif; margin: 0 auto; max-width: 60em; padding: 0 1em; }
a.toc-backref { color: inherit; text-decoration: none; }
div.admonition, div.attention, div.caution, div.danger, div.error,
div.hint, div.important, div.note, div.tip, div.warning { margin: 2em; border: medium outset; padding: 1em; }
div.important p.admonition-title, div.warning p.admonition-title { color: red; font-weight: bold; }
p.admonition-title { font-weight: bold; }
div.figure { margin-left: 2em; margin-right: 2em; }
div.topic { margin: 2em; }
p.topic-title { font-weight: bold; }
h1.title { text-align: center; }
img.align-left { clear: left; float: left; margin-right: 1em; }
img.align-right { clear: right; float: right; margin-left: 1em; }
img.align-center { clear: both; display: block; margin-left: auto; margin-right: auto; }
pre.literal-block, pre.math { margin-left: 2em; margin-right: 2em; }
tt.docutils { background-color: #eeeeee; }
ul.simple li p, ol.simple li p { margin: 0; }
";

/// Write `document` as a standalone XHTML page.
pub(crate) fn write(document: &Document, settings: &Settings, reporter: &mut Reporter) -> Result<String> {
    let title_index = document_title(&document.blocks);
    let mut writer = Writer {
        document,
        reporter,
        body: String::new(),
        heading_offset: usize::from(title_index.is_some()),
    };

    let title = match title_index.map(|index| &document.blocks[index]) {
        Some(Block::Section { title, id, .. }) => Some((writer.inlines(title)?, Inline::plain(title), id)),
        _ => None,
    };

    writer.sections(title_index)?;

    let mut html = String::new();
    html.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    html.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n",
    );
    html.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n<head>\n");
    html.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n");
    html.push_str(&format!(
        "<meta name=\"generator\" content=\"{}\" />\n",
        generator(&settings.generator_version)
    ));
    if let Some((_, plain, _)) = &title {
        html.push_str(&format!("<title>{}</title>\n", encode_text(plain)));
    }
    html.push_str("<style type=\"text/css\">\n\n");
    html.push_str(STYLESHEET);
    html.push_str("\n</style>\n</head>\n<body>\n");
    match &title {
        Some((markup, _, id)) => {
            html.push_str(&format!(
                "<div class=\"document\" id=\"{}\">\n<h1 class=\"title\">{markup}</h1>\n",
                encode_double_quoted_attribute(id)
            ));
        },
        None => html.push_str("<div class=\"document\">\n"),
    }
    html.push_str(&writer.body);
    html.push_str("</div>\n</body>\n</html>\n");
    Ok(html)
}

fn generator(version: &str) -> String {
    if version.is_empty() {
        GENERATOR_NAME.to_string()
    } else {
        format!("{GENERATOR_NAME} {version}")
    }
}

/// Index of the section promoted to document title: the first body element,
/// ignoring comments and definitions, when it is the only top-level section.
fn document_title(blocks: &[Block]) -> Option<usize> {
    let first = blocks.iter().position(|block| !matches!(block, Block::Comment(_)))?;
    let Block::Section { level: 1, .. } = blocks[first] else {
        return None;
    };
    let top_level = blocks
        .iter()
        .filter(|block| matches!(block, Block::Section { level: 1, .. }))
        .count();
    (top_level == 1).then_some(first)
}

struct TocEntry<'a> {
    level: usize,
    id: &'a str,
    title: &'a [Inline],
}

struct Writer<'a> {
    document: &'a Document,
    reporter: &'a mut Reporter,
    body: String,
    heading_offset: usize,
}

impl<'a> Writer<'a> {
    /// Write the top-level blocks, nesting flat section titles into `div`s.
    fn sections(&mut self, title_index: Option<usize>) -> Result<()> {
        let document: &'a Document = self.document;
        let mut open: Vec<usize> = Vec::new();
        for (index, block) in document.blocks.iter().enumerate() {
            if Some(index) == title_index {
                continue;
            }
            match block {
                Block::Section { level, title, id } => {
                    while open.last().is_some_and(|l| l >= level) {
                        open.pop();
                        self.body.push_str("</div>\n");
                    }
                    open.push(*level);
                    let heading = level.saturating_sub(self.heading_offset).clamp(1, 6);
                    let title = self.inlines(title)?;
                    self.body.push_str(&format!(
                        "<div class=\"section\" id=\"{}\">\n<h{heading}>{title}</h{heading}>\n",
                        encode_double_quoted_attribute(id)
                    ));
                },
                Block::Contents {
                    title,
                    id,
                    local,
                    depth,
                } => {
                    let entries = self.toc_entries(index, *local, title_index);
                    self.contents(title, id, *local, *depth, &entries)?;
                },
                other => self.block(other)?,
            }
        }
        for _ in open {
            self.body.push_str("</div>\n");
        }
        Ok(())
    }

    /// Sections listed by a `contents` directive found at `index`.
    fn toc_entries(&self, index: usize, local: bool, title_index: Option<usize>) -> Vec<TocEntry<'a>> {
        let document: &'a Document = self.document;
        let blocks = document.blocks.as_slice();
        let enclosing = if local {
            blocks[..index]
                .iter()
                .enumerate()
                .rev()
                .find_map(|(i, block)| match block {
                    Block::Section { level, .. } if Some(i) != title_index => Some(*level),
                    _ => None,
                })
                .unwrap_or(self.heading_offset)
        } else {
            self.heading_offset
        };
        let start = if local { index + 1 } else { 0 };

        let mut entries = Vec::new();
        for (i, block) in blocks.iter().enumerate().skip(start) {
            let Block::Section { level, title, id } = block else {
                continue;
            };
            if Some(i) == title_index {
                continue;
            }
            if *level <= enclosing {
                if local {
                    break;
                }
                continue;
            }
            entries.push(TocEntry {
                level: level - enclosing,
                id,
                title,
            });
        }
        entries
    }

    fn contents(
        &mut self,
        title: &str,
        id: &str,
        local: bool,
        depth: Option<usize>,
        entries: &[TocEntry<'_>],
    ) -> Result<()> {
        let class = if local { "contents local topic" } else { "contents topic" };
        self.body.push_str(&format!(
            "<div class=\"{class}\" id=\"{}\">\n",
            encode_double_quoted_attribute(id)
        ));
        if !local {
            self.body
                .push_str(&format!("<p class=\"topic-title\">{}</p>\n", encode_text(title)));
        }

        let limit = depth.unwrap_or(usize::MAX);
        let mut open = 0;
        for entry in entries.iter().filter(|entry| entry.level <= limit) {
            if entry.level > open {
                while open < entry.level {
                    self.body.push_str(if open == 0 {
                        "<ul class=\"simple\">\n"
                    } else {
                        "\n<ul>\n"
                    });
                    open += 1;
                }
            } else {
                self.body.push_str("</li>\n");
                while open > entry.level {
                    self.body.push_str("</ul>\n</li>\n");
                    open -= 1;
                }
            }
            let title = self.inlines_without_links(entry.title)?;
            self.body.push_str(&format!(
                "<li><a class=\"reference internal\" href=\"#{}\">{title}</a>",
                encode_double_quoted_attribute(entry.id)
            ));
        }
        if open > 0 {
            self.body.push_str("</li>\n");
            while open > 1 {
                self.body.push_str("</ul>\n</li>\n");
                open -= 1;
            }
            self.body.push_str("</ul>\n");
        }
        self.body.push_str("</div>\n");
        Ok(())
    }

    fn blocks(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            self.block(block)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::Section { title, .. } => {
                // Nested sections never reach the writer; keep the text.
                let title = self.inlines(title)?;
                self.body.push_str(&format!("<p><strong>{title}</strong></p>\n"));
            },
            Block::Paragraph(inlines) => {
                let text = self.inlines(inlines)?;
                self.body.push_str(&format!("<p>{text}</p>\n"));
            },
            Block::LiteralBlock { text, language } => {
                let class = language
                    .as_deref()
                    .map_or_else(|| "literal-block".to_string(), |lang| format!("code {lang} literal-block"));
                self.body.push_str(&format!(
                    "<pre class=\"{}\">\n{}\n</pre>\n",
                    encode_double_quoted_attribute(&class),
                    encode_text(text)
                ));
            },
            Block::BulletList(items) => self.list("ul", "", items)?,
            Block::EnumeratedList(items) => self.list("ol", "arabic", items)?,
            Block::DefinitionList(items) => {
                self.body.push_str("<dl class=\"docutils\">\n");
                for (term, definition) in items {
                    let term = self.inlines(term)?;
                    self.body.push_str(&format!("<dt>{term}</dt>\n<dd>"));
                    self.blocks(definition)?;
                    self.body.push_str("</dd>\n");
                }
                self.body.push_str("</dl>\n");
            },
            Block::BlockQuote(body) => {
                self.body.push_str("<blockquote>\n");
                self.blocks(body)?;
                self.body.push_str("</blockquote>\n");
            },
            Block::Comment(text) => {
                self.body
                    .push_str(&format!("<!-- {} -->\n", encode_text(&text.replace("--", "- -"))));
            },
            Block::Image(image) => {
                let html = self.image(image, true);
                self.body.push_str(&html);
                self.body.push('\n');
            },
            Block::Figure {
                image,
                caption,
                legend,
            } => {
                let html = self.image(image, false);
                self.body.push_str(&format!("<div class=\"figure\">\n{html}\n"));
                if let Some(caption) = caption {
                    let caption = self.inlines(caption)?;
                    self.body.push_str(&format!("<p class=\"caption\">{caption}</p>\n"));
                }
                if !legend.is_empty() {
                    self.body.push_str("<div class=\"legend\">\n");
                    self.blocks(legend)?;
                    self.body.push_str("</div>\n");
                }
                self.body.push_str("</div>\n");
            },
            Block::Admonition { kind, body } => {
                self.body.push_str(&format!(
                    "<div class=\"{kind}\">\n<p class=\"first admonition-title\">{}</p>\n",
                    capitalize(kind)
                ));
                self.blocks(body)?;
                self.body.push_str("</div>\n");
            },
            Block::Contents { title, id, .. } => {
                // Only reachable inside nested bodies, where there is nothing to list.
                self.contents(title, id, true, None, &[])?;
            },
            Block::Math(text) => {
                self.body
                    .push_str(&format!("<pre class=\"math\">\n{}\n</pre>\n", encode_text(text)));
            },
            Block::Raw(html) => {
                self.body.push_str(html);
                self.body.push('\n');
            },
            Block::Transition => self.body.push_str("<hr class=\"docutils\" />\n"),
        }
        Ok(())
    }

    /// Lists whose items are all single paragraphs are written compactly.
    fn list(&mut self, tag: &str, class: &str, items: &[Vec<Block>]) -> Result<()> {
        let simple = items
            .iter()
            .all(|item| matches!(item.as_slice(), [Block::Paragraph(_)] | []));
        let classes: Vec<&str> = [class, if simple { "simple" } else { "" }]
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();
        if classes.is_empty() {
            self.body.push_str(&format!("<{tag}>\n"));
        } else {
            self.body
                .push_str(&format!("<{tag} class=\"{}\">\n", classes.join(" ")));
        }
        for item in items {
            self.body.push_str("<li>");
            match item.as_slice() {
                [Block::Paragraph(inlines)] if simple => {
                    let text = self.inlines(inlines)?;
                    self.body.push_str(&text);
                },
                blocks => self.blocks(blocks)?,
            }
            self.body.push_str("</li>\n");
        }
        self.body.push_str(&format!("</{tag}>\n"));
        Ok(())
    }

    fn image(&self, image: &Image, block: bool) -> String {
        let alt = image.alt.as_deref().unwrap_or(&image.uri);
        let mut img = format!(
            "<img alt=\"{}\" src=\"{}\"",
            encode_double_quoted_attribute(alt),
            encode_double_quoted_attribute(&image.uri)
        );
        if let Some(align) = image.align.as_deref().filter(|_| block) {
            img.push_str(&format!(" class=\"align-{}\"", encode_double_quoted_attribute(align)));
        }
        let style: Vec<String> = [("width", &image.width), ("height", &image.height)]
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| format!("{name}: {v};")))
            .collect();
        if !style.is_empty() {
            img.push_str(&format!(
                " style=\"{}\"",
                encode_double_quoted_attribute(&style.join(" "))
            ));
        }
        img.push_str(" />");

        match image.target.as_deref() {
            Some(target) => format!(
                "<a class=\"reference external image-reference\" href=\"{}\">{img}</a>",
                encode_double_quoted_attribute(&self.image_target(target))
            ),
            None => img,
        }
    }

    /// `:target:` is a URI, or a reference name when it ends with `_`.
    fn image_target(&self, target: &str) -> String {
        match target.strip_suffix('_') {
            Some(name) if !target.contains("://") => self
                .document
                .targets
                .get(&normalize_name(name.trim_matches('`')))
                .cloned()
                .unwrap_or_else(|| target.to_string()),
            _ => target.to_string(),
        }
    }

    fn inlines(&mut self, inlines: &[Inline]) -> Result<String> {
        let mut html = String::new();
        for inline in inlines {
            self.inline(inline, &mut html, true)?;
        }
        Ok(html)
    }

    fn inlines_without_links(&mut self, inlines: &[Inline]) -> Result<String> {
        let mut html = String::new();
        for inline in inlines {
            self.inline(inline, &mut html, false)?;
        }
        Ok(html)
    }

    fn inline(&mut self, inline: &Inline, html: &mut String, links: bool) -> Result<()> {
        match inline {
            Inline::Text(text) => html.push_str(&encode_text(text)),
            Inline::Emphasis(text) => html.push_str(&format!("<em>{}</em>", encode_text(text))),
            Inline::Strong(text) => html.push_str(&format!("<strong>{}</strong>", encode_text(text))),
            Inline::Literal(text) => html.push_str(&format!(
                "<tt class=\"docutils literal\">{}</tt>",
                encode_text(text)
            )),
            Inline::Cite(text) => html.push_str(&format!("<cite>{}</cite>", encode_text(text))),
            Inline::ExternalRef { text, uri } if links => html.push_str(&format!(
                "<a class=\"reference external\" href=\"{}\">{}</a>",
                encode_double_quoted_attribute(uri),
                encode_text(text)
            )),
            Inline::NamedRef { text, name } if links => match self.resolve(name) {
                Some(href) => {
                    let class = if href.starts_with('#') { "internal" } else { "external" };
                    html.push_str(&format!(
                        "<a class=\"reference {class}\" href=\"{}\">{}</a>",
                        encode_double_quoted_attribute(&href),
                        encode_text(text)
                    ));
                },
                None => {
                    self.reporter
                        .report(Level::Error, 0, format!("Unknown target name: \"{name}\"."))?;
                    html.push_str(&encode_text(text));
                },
            },
            Inline::ExternalRef { text, .. } | Inline::NamedRef { text, .. } => {
                html.push_str(&encode_text(text));
            },
            Inline::SubstitutionRef(name) => {
                let document = self.document;
                let value = document.substitutions.get(name).or_else(|| {
                    let wanted = normalize_name(name);
                    document
                        .substitutions
                        .iter()
                        .find(|(key, _)| normalize_name(key) == wanted)
                        .map(|(_, value)| value)
                });
                match value {
                    Some(Substitution::Image(image)) => html.push_str(&self.image(image, false)),
                    Some(Substitution::Text(inlines)) => {
                        for inline in inlines {
                            self.inline(inline, html, links)?;
                        }
                    },
                    None => {
                        self.reporter.report(
                            Level::Error,
                            0,
                            format!("Undefined substitution referenced: \"{name}\"."),
                        )?;
                        html.push_str(&encode_text(&format!("|{name}|")));
                    },
                }
            },
        }
        Ok(())
    }

    /// Explicit targets first, then section titles; `alias_` targets are followed once.
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(uri) = self.document.targets.get(name) {
            if let Some(alias) = uri.strip_suffix('_').filter(|_| !uri.contains("://")) {
                return self.resolve_plain(&normalize_name(alias.trim_matches('`')));
            }
            return Some(uri.clone());
        }
        self.resolve_plain(name)
    }

    fn resolve_plain(&self, name: &str) -> Option<String> {
        self.document
            .targets
            .get(name)
            .cloned()
            .or_else(|| self.document.section_ids.get(name).map(|id| format!("#{id}")))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::{Error, Level, Settings, render, render_html};

    fn html(source: &str) -> String {
        render_html(source, &Settings::default()).unwrap()
    }

    #[test]
    fn lone_top_section_becomes_the_title() {
        let out = html("=====\nAddon\n=====\n\nIntro.\n\nUsage\n=====\n\nRun it.\n");
        assert!(out.contains("<title>Addon</title>"));
        assert!(out.contains("<div class=\"document\" id=\"addon\">\n<h1 class=\"title\">Addon</h1>"));
        assert!(out.contains("<div class=\"section\" id=\"usage\">\n<h1>Usage</h1>"));
    }

    #[test]
    fn several_top_sections_are_not_promoted() {
        let out = html("One\n===\n\nA.\n\nTwo\n===\n\nB.\n");
        assert!(!out.contains("class=\"title\""));
        assert!(out.contains("<h1>One</h1>"));
        assert!(out.contains("<h1>Two</h1>"));
    }

    #[test]
    fn generator_tag_carries_the_version() {
        let settings = Settings {
            generator_version: "9.9.9".into(),
            ..Settings::default()
        };
        let out = render_html("Text.\n", &settings).unwrap();
        assert!(out.contains("<meta name=\"generator\" content=\"genreadme-rst 9.9.9\" />"));
    }

    #[test]
    fn comments_become_html_comments() {
        let out = html(".. !! This file is generated by gen-readme !!\n\nText.\n");
        assert!(out.contains("<!-- !! This file is generated by gen-readme !! -->"));
    }

    #[test]
    fn badges_from_substitutions() {
        let source = "|badge1|\n\n.. |badge1| image:: https://img.shields.io/badge/a.png\n    :target: https://example.com/status\n    :alt: Beta\n";
        let out = html(source);
        assert!(out.contains(
            "<a class=\"reference external image-reference\" href=\"https://example.com/status\"><img alt=\"Beta\" src=\"https://img.shields.io/badge/a.png\" /></a>"
        ));
    }

    #[test]
    fn named_reference_to_target() {
        let out = html("Ask Odoo_.\n\n.. _Odoo: https://www.odoo.com\n");
        assert!(out.contains("<a class=\"reference external\" href=\"https://www.odoo.com\">Odoo</a>"));
    }

    #[test]
    fn named_reference_to_section() {
        let out = html("Intro\n=====\n\nSee `Usage`_.\n\nUsage\n-----\n\nText.\n");
        assert!(out.contains("<a class=\"reference internal\" href=\"#usage\">Usage</a>"));
    }

    #[test]
    fn unknown_target_halts_at_error_level() {
        let err = render_html("See nowhere_.\n", &Settings::default()).unwrap_err();
        let Error::Halted(diagnostic) = err else {
            panic!("expected a halt");
        };
        assert_eq!(diagnostic.level, Level::Error);
        assert!(diagnostic.message.contains("Unknown target name"));
    }

    #[test]
    fn undefined_substitution_is_reported() {
        let settings = Settings {
            halt_level: Level::Severe,
            ..Settings::default()
        };
        let rendered = render("|missing|\n", &settings).unwrap();
        assert_eq!(rendered.diagnostics.len(), 1);
        assert!(rendered.html.contains("|missing|"));
    }

    #[test]
    fn local_contents_lists_following_sections() {
        let source = "=====\nAddon\n=====\n\n.. contents::\n   :local:\n\nUsage\n=====\n\nA.\n\nDetails\n~~~~~~~\n\nB.\n\nBugs\n====\n\nC.\n";
        let out = html(source);
        assert!(out.contains("<div class=\"contents local topic\" id=\"contents\">"));
        assert!(out.contains(
            "<ul class=\"simple\">\n<li><a class=\"reference internal\" href=\"#usage\">Usage</a>\n<ul>\n<li><a class=\"reference internal\" href=\"#details\">Details</a></li>\n</ul>\n</li>\n<li><a class=\"reference internal\" href=\"#bugs\">Bugs</a></li>\n</ul>"
        ));
    }

    #[test]
    fn simple_lists_skip_paragraph_tags() {
        let out = html("* one\n* two\n");
        assert!(out.contains("<ul class=\"simple\">\n<li>one</li>\n<li>two</li>\n</ul>"));
    }

    #[test]
    fn text_is_escaped() {
        let out = html("a < b & ``<tag>``\n");
        assert!(out.contains("<p>a &lt; b &amp; <tt class=\"docutils literal\">&lt;tag&gt;</tt></p>"));
    }

    #[test]
    fn admonition_title_is_capitalized() {
        let out = html(".. important::\n\n   Careful.\n");
        assert!(out.contains("<div class=\"important\">\n<p class=\"first admonition-title\">Important</p>\n<p>Careful.</p>\n</div>"));
    }

    #[test]
    fn raw_is_passed_through_when_enabled() {
        let settings = Settings {
            raw_enabled: true,
            ..Settings::default()
        };
        let out = render_html(".. raw:: html\n\n   <b>x</b>\n", &settings).unwrap();
        assert!(out.contains("<b>x</b>\n"));
    }
}
