//! Block-level parser.
//!
//! Works on whole lines. Indented regions are cut out, dedented and parsed
//! recursively, so every nested body sees its own text at column zero.

use crate::diagnostic::{Level, Reporter};
use crate::inline::parse_inline;
use crate::model::{Block, Document, Image, Inline, Substitution, make_id, normalize_name};
use crate::{Error, Result, Settings};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const BULLETS: &str = "-*+\u{2022}";
const ADMONITIONS: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];
const IMAGE_OPTIONS: &[&str] = &["alt", "target", "width", "height", "align", "scale", "class", "name"];
const FIGURE_OPTIONS: &[&str] = &["figwidth", "figclass"];
const MAX_INCLUDE_DEPTH: usize = 8;
const TAB_WIDTH: usize = 8;

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_(`[^`]+`|[^:`\\]+):(?:\s+(.*))?$").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SUBSTITUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|([^|\s](?:[^|]*[^|\s])?)\|\s+([A-Za-z][\w-]*)::(?:\s+(.*))?$").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][\w:+.-]*)::(?:\s+(.*))?$").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:([\w-]+):(?:\s+(.*))?$").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ENUMERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+|#)[.)]( +)(\S.*)$").unwrap());

#[derive(Debug, Clone)]
struct Line {
    no: usize,
    text: String,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }
}

struct Parser<'a> {
    settings: &'a Settings,
    reporter: &'a mut Reporter,
    styles: Vec<(char, bool)>,
    current_level: usize,
    ids: HashSet<String>,
    document: Document,
    include_depth: usize,
}

/// Parse a complete document.
pub(crate) fn parse(source: &str, settings: &Settings, reporter: &mut Reporter) -> Result<Document> {
    let lines = split_lines(source);
    let mut parser = Parser {
        settings,
        reporter,
        styles: Vec::new(),
        current_level: 0,
        ids: HashSet::new(),
        document: Document::default(),
        include_depth: 0,
    };
    let blocks = parser.parse_blocks(&lines, true)?;
    let mut document = parser.document;
    document.blocks = blocks;
    Ok(document)
}

fn split_lines(source: &str) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .map(|(index, raw)| Line {
            no: index + 1,
            text: expand_tabs(raw).trim_end().to_string(),
        })
        .collect()
}

fn expand_tabs(raw: &str) -> String {
    if !raw.contains('\t') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + TAB_WIDTH);
    let mut column = 0;
    for c in raw.chars() {
        if c == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn is_adornment(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ADORNMENT_CHARS.contains(first) && chars.all(|c| c == first) && text.chars().count() > 1
}

/// Index one past the indented region starting at `start`, trailing blank lines excluded.
fn take_indented(lines: &[Line], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && (lines[end].is_blank() || lines[end].indent() > 0) {
        end += 1;
    }
    while end > start && lines[end - 1].is_blank() {
        end -= 1;
    }
    end
}

fn strip_indent(lines: &[Line], width: usize) -> Vec<Line> {
    lines
        .iter()
        .map(|line| Line {
            no: line.no,
            text: if line.is_blank() {
                String::new()
            } else {
                line.text[width.min(line.indent())..].to_string()
            },
        })
        .collect()
}

fn dedent(lines: &[Line]) -> Vec<Line> {
    let width = lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(Line::indent)
        .min()
        .unwrap_or(0);
    strip_indent(lines, width)
}

fn join_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn skip_blank(lines: &[Line], mut index: usize) -> usize {
    while index < lines.len() && lines[index].is_blank() {
        index += 1;
    }
    index
}

/// `(marker, content column, first line text)` for a bullet list item.
fn bullet_item(text: &str) -> Option<(char, usize, String)> {
    let marker = text.chars().next()?;
    if !BULLETS.contains(marker) {
        return None;
    }
    let rest = &text[marker.len_utf8()..];
    if rest.is_empty() {
        return Some((marker, 2, String::new()));
    }
    let spaces = rest.len() - rest.trim_start_matches(' ').len();
    if spaces == 0 {
        return None;
    }
    Some((marker, 1 + spaces, rest[spaces..].to_string()))
}

/// `(content column, first line text)` for an enumerated list item.
fn enumerated_item(text: &str) -> Option<(usize, String)> {
    let captures = ENUMERATOR_RE.captures(text)?;
    let marker = captures.get(1)?.as_str().len() + 1;
    let spaces = captures.get(2)?.as_str().len();
    Some((marker + spaces, captures.get(3)?.as_str().to_string()))
}

/// Directive options (`:name: value`) followed by the content lines.
struct DirectiveBody {
    options: Vec<(String, String)>,
    content: Vec<Line>,
}

impl DirectiveBody {
    fn split(body: &[Line]) -> Self {
        let mut options = Vec::new();
        let mut index = 0;
        while index < body.len() && !body[index].is_blank() {
            let Some(captures) = OPTION_RE.captures(&body[index].text) else {
                break;
            };
            let name = captures.get(1).map_or("", |m| m.as_str()).to_string();
            let value = captures.get(2).map_or("", |m| m.as_str()).trim().to_string();
            options.push((name, value));
            index += 1;
        }
        let start = skip_blank(body, index);
        Self {
            options,
            content: body[start..].to_vec(),
        }
    }

    fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|(key, _)| key == name)
    }
}

impl Parser<'_> {
    fn parse_blocks(&mut self, lines: &[Line], top: bool) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if line.is_blank() {
                i += 1;
                continue;
            }
            if line.indent() > 0 {
                let end = take_indented(lines, i);
                let body = self.parse_blocks(&dedent(&lines[i..end]), false)?;
                blocks.push(Block::BlockQuote(body));
                i = end;
                continue;
            }
            if line.text == ".." || line.text.starts_with(".. ") {
                i = self.explicit_markup(lines, i, &mut blocks)?;
                continue;
            }
            if let Some(next) = self.section_title(lines, i, top, &mut blocks)? {
                i = next;
                continue;
            }
            if is_adornment(&line.text)
                && line.text.chars().count() >= 4
                && lines.get(i + 1).is_none_or(Line::is_blank)
            {
                blocks.push(Block::Transition);
                i += 1;
                continue;
            }
            if bullet_item(&line.text).is_some() {
                i = self.bullet_list(lines, i, &mut blocks)?;
                continue;
            }
            if let Some(next) = self.enumerated_list(lines, i, &mut blocks)? {
                i = next;
                continue;
            }
            if lines.get(i + 1).is_some_and(|next| !next.is_blank() && next.indent() > 0) {
                i = self.definition_list(lines, i, &mut blocks)?;
                continue;
            }
            i = self.paragraph(lines, i, &mut blocks)?;
        }
        Ok(blocks)
    }

    fn section_title(
        &mut self,
        lines: &[Line],
        i: usize,
        top: bool,
        blocks: &mut Vec<Block>,
    ) -> Result<Option<usize>> {
        let line = &lines[i];
        let first = line.text.chars().next().unwrap_or(' ');

        let (title_line, style, next) = if is_adornment(&line.text) {
            let (Some(title_line), Some(under)) = (lines.get(i + 1), lines.get(i + 2)) else {
                return Ok(None);
            };
            if title_line.is_blank() || !is_adornment(&under.text) || !under.text.starts_with(first) {
                return Ok(None);
            }
            let width = title_line.text.trim().chars().count();
            if line.text.chars().count() < width {
                self.reporter
                    .report(Level::Warning, line.no, "Title overline too short.")?;
            }
            if under.text != line.text {
                self.reporter
                    .report(Level::Severe, line.no, "Title overline & underline mismatch.")?;
            }
            (title_line, (first, true), i + 3)
        } else {
            let Some(under) = lines.get(i + 1) else {
                return Ok(None);
            };
            if !is_adornment(&under.text) {
                return Ok(None);
            }
            let width = line.text.trim().chars().count();
            let rule = under.text.chars().count();
            if rule < width {
                if rule < 4 {
                    return Ok(None);
                }
                self.reporter
                    .report(Level::Warning, under.no, "Title underline too short.")?;
            }
            let marker = under.text.chars().next().unwrap_or('=');
            (line, (marker, false), i + 2)
        };

        if !top {
            self.reporter
                .report(Level::Severe, title_line.no, "Unexpected section title.")?;
            return Ok(None);
        }

        let level = if let Some(position) = self.styles.iter().position(|s| *s == style) {
            position + 1
        } else {
            self.styles.push(style);
            self.styles.len()
        };
        if level > self.current_level + 1 {
            self.reporter.report(
                Level::Severe,
                title_line.no,
                format!("Title level inconsistent: {}", title_line.text.trim()),
            )?;
        }
        self.current_level = level;

        let title = parse_inline(title_line.text.trim(), title_line.no, self.reporter)?;
        let plain = Inline::plain(&title);
        let id = self.unique_id(&make_id(&plain));
        self.document
            .section_ids
            .entry(normalize_name(&plain))
            .or_insert_with(|| id.clone());
        blocks.push(Block::Section { level, title, id });
        Ok(Some(next))
    }

    fn bullet_list(&mut self, lines: &[Line], i: usize, blocks: &mut Vec<Block>) -> Result<usize> {
        let mut items = Vec::new();
        let mut j = i;
        let mut marker = None;
        loop {
            let Some((item_marker, column, first)) = bullet_item(&lines[j].text) else {
                break;
            };
            if *marker.get_or_insert(item_marker) != item_marker {
                break;
            }
            let end = take_indented(lines, j + 1);
            let mut body = vec![Line {
                no: lines[j].no,
                text: first,
            }];
            body.extend(strip_indent(&lines[j + 1..end], column));
            items.push(self.parse_blocks(&body, false)?);
            j = end;

            let k = skip_blank(lines, j);
            let continues = k < lines.len()
                && lines[k].indent() == 0
                && bullet_item(&lines[k].text).is_some_and(|(m, _, _)| Some(m) == marker);
            if continues {
                j = k;
                continue;
            }
            if k == j && k < lines.len() {
                self.reporter.report(
                    Level::Warning,
                    lines[k].no,
                    "Bullet list ends without a blank line; unexpected unindent.",
                )?;
            }
            break;
        }
        blocks.push(Block::BulletList(items));
        Ok(j.max(i + 1))
    }

    fn enumerated_list(
        &mut self,
        lines: &[Line],
        i: usize,
        blocks: &mut Vec<Block>,
    ) -> Result<Option<usize>> {
        if enumerated_item(&lines[i].text).is_none() {
            return Ok(None);
        }
        // A lone "1987. was a year" line is a paragraph, not a list.
        let looks_like_list = lines.get(i + 1).is_none_or(|next| {
            next.is_blank() || next.indent() > 0 || enumerated_item(&next.text).is_some()
        });
        if !looks_like_list {
            return Ok(None);
        }

        let mut items = Vec::new();
        let mut j = i;
        while let Some((column, first)) = enumerated_item(&lines[j].text) {
            let end = take_indented(lines, j + 1);
            let mut body = vec![Line {
                no: lines[j].no,
                text: first,
            }];
            body.extend(strip_indent(&lines[j + 1..end], column));
            items.push(self.parse_blocks(&body, false)?);
            j = end;

            let k = skip_blank(lines, j);
            if k < lines.len() && lines[k].indent() == 0 && enumerated_item(&lines[k].text).is_some() {
                j = k;
                continue;
            }
            if k == j && k < lines.len() {
                self.reporter.report(
                    Level::Warning,
                    lines[k].no,
                    "Enumerated list ends without a blank line; unexpected unindent.",
                )?;
            }
            break;
        }
        blocks.push(Block::EnumeratedList(items));
        Ok(Some(j.max(i + 1)))
    }

    fn definition_list(&mut self, lines: &[Line], i: usize, blocks: &mut Vec<Block>) -> Result<usize> {
        let mut items = Vec::new();
        let mut j = i;
        loop {
            let term = parse_inline(lines[j].text.trim(), lines[j].no, self.reporter)?;
            let end = take_indented(lines, j + 1);
            let definition = self.parse_blocks(&dedent(&lines[j + 1..end]), false)?;
            items.push((term, definition));
            j = end;

            let k = skip_blank(lines, j);
            let continues = k + 1 < lines.len()
                && lines[k].indent() == 0
                && !lines[k].text.starts_with("..")
                && bullet_item(&lines[k].text).is_none()
                && !lines[k + 1].is_blank()
                && lines[k + 1].indent() > 0;
            if !continues {
                break;
            }
            j = k;
        }
        blocks.push(Block::DefinitionList(items));
        Ok(j)
    }

    fn paragraph(&mut self, lines: &[Line], i: usize, blocks: &mut Vec<Block>) -> Result<usize> {
        let mut j = i;
        while j < lines.len() && !lines[j].is_blank() && lines[j].indent() == 0 {
            j += 1;
        }
        if j < lines.len() && !lines[j].is_blank() {
            self.reporter
                .report(Level::Error, lines[j].no, "Unexpected indentation.")?;
        }

        let text = join_text(&lines[i..j]);
        let no = lines[i].no;
        let Some(stem) = text.strip_suffix("::") else {
            blocks.push(Block::Paragraph(parse_inline(&text, no, self.reporter)?));
            return Ok(j);
        };

        let paragraph = if stem.trim().is_empty() {
            None
        } else if stem.ends_with(char::is_whitespace) {
            Some(stem.trim_end().to_string())
        } else {
            Some(format!("{stem}:"))
        };
        if let Some(paragraph) = paragraph {
            blocks.push(Block::Paragraph(parse_inline(&paragraph, no, self.reporter)?));
        }

        let k = skip_blank(lines, j);
        if k < lines.len() && lines[k].indent() > 0 {
            let end = take_indented(lines, k);
            blocks.push(Block::LiteralBlock {
                text: join_text(&dedent(&lines[k..end])),
                language: None,
            });
            return Ok(end);
        }
        self.reporter.report(
            Level::Warning,
            lines[j - 1].no,
            "Literal block expected; none found.",
        )?;
        Ok(j)
    }

    fn explicit_markup(&mut self, lines: &[Line], i: usize, blocks: &mut Vec<Block>) -> Result<usize> {
        let no = lines[i].no;
        let first = lines[i].text.get(2..).unwrap_or_default().trim();
        let end = take_indented(lines, i + 1);
        let body = dedent(&lines[i + 1..end]);

        if let Some(captures) = TARGET_RE.captures(first) {
            let name = captures.get(1).map_or("", |m| m.as_str()).trim_matches('`');
            let mut uri: String = captures.get(2).map_or("", |m| m.as_str()).split_whitespace().collect();
            for line in &body {
                uri.extend(line.text.split_whitespace());
            }
            if uri.is_empty() {
                uri = format!("#{}", make_id(name));
            }
            self.document.targets.insert(normalize_name(name), uri);
        } else if let Some(captures) = SUBSTITUTION_RE.captures(first) {
            let name = captures.get(1).map_or("", |m| m.as_str()).to_string();
            let directive = captures.get(2).map_or("", |m| m.as_str());
            let args = captures.get(3).map_or("", |m| m.as_str());
            self.substitution_definition(name, directive, args, &body, no)?;
        } else if let Some(captures) = DIRECTIVE_RE.captures(first) {
            let name = captures.get(1).map_or("", |m| m.as_str()).to_lowercase();
            let args = captures.get(2).map_or("", |m| m.as_str()).trim();
            let produced = self.directive(&name, args, &body, no)?;
            blocks.extend(produced);
        } else {
            let mut text = first.to_string();
            for line in &body {
                text.push('\n');
                text.push_str(&line.text);
            }
            blocks.push(Block::Comment(text.trim_end().to_string()));
        }

        if end < lines.len() && !lines[end].is_blank() && !lines[end].text.starts_with("..") {
            self.reporter.report(
                Level::Warning,
                lines[end].no,
                "Explicit markup ends without a blank line; unexpected unindent.",
            )?;
        }
        Ok(end)
    }

    fn substitution_definition(
        &mut self,
        name: String,
        directive: &str,
        args: &str,
        body: &[Line],
        no: usize,
    ) -> Result<()> {
        let value = match directive {
            "image" => {
                let parts = DirectiveBody::split(body);
                self.image("image", args, &parts, IMAGE_OPTIONS, no)?
                    .map(Substitution::Image)
            },
            "replace" => {
                let mut text = args.to_string();
                for line in body {
                    text.push(' ');
                    text.push_str(line.text.trim());
                }
                Some(Substitution::Text(parse_inline(text.trim(), no, self.reporter)?))
            },
            other => {
                self.reporter.report(
                    Level::Error,
                    no,
                    format!("Unknown directive type \"{other}\"."),
                )?;
                None
            },
        };
        let Some(value) = value else {
            return Ok(());
        };
        if self.document.substitutions.contains_key(&name) {
            self.reporter.report(
                Level::Error,
                no,
                format!("Duplicate substitution definition name: \"{name}\"."),
            )?;
        }
        self.document.substitutions.insert(name, value);
        Ok(())
    }

    fn directive(&mut self, name: &str, args: &str, body: &[Line], no: usize) -> Result<Vec<Block>> {
        let parts = DirectiveBody::split(body);
        let blocks = match name {
            "image" => self
                .image(name, args, &parts, IMAGE_OPTIONS, no)?
                .map(Block::Image)
                .into_iter()
                .collect(),
            "figure" => {
                let allowed: Vec<&str> = IMAGE_OPTIONS.iter().chain(FIGURE_OPTIONS).copied().collect();
                let Some(image) = self.image(name, args, &parts, &allowed, no)? else {
                    return Ok(Vec::new());
                };
                let mut legend = self.parse_blocks(&parts.content, false)?;
                let caption = match legend.first() {
                    Some(Block::Paragraph(_)) => match legend.remove(0) {
                        Block::Paragraph(inlines) => Some(inlines),
                        _ => None,
                    },
                    _ => None,
                };
                vec![Block::Figure {
                    image,
                    caption,
                    legend,
                }]
            },
            "contents" => {
                let title = if args.is_empty() { "Contents" } else { args };
                let id = self.unique_id(&make_id(title));
                let depth = parts.option("depth").and_then(|d| d.parse().ok());
                vec![Block::Contents {
                    title: title.to_string(),
                    id,
                    local: parts.has_option("local"),
                    depth,
                }]
            },
            kind if ADMONITIONS.contains(&kind) => {
                let mut text_lines = Vec::new();
                if !args.is_empty() {
                    text_lines.push(Line {
                        no,
                        text: args.to_string(),
                    });
                }
                text_lines.extend(parts.content.iter().cloned());
                if text_lines.is_empty() {
                    self.reporter.report(
                        Level::Error,
                        no,
                        format!("The \"{kind}\" admonition is empty; content required."),
                    )?;
                }
                vec![Block::Admonition {
                    kind: kind.to_string(),
                    body: self.parse_blocks(&text_lines, false)?,
                }]
            },
            "code" | "code-block" | "sourcecode" => vec![Block::LiteralBlock {
                text: join_text(&parts.content),
                language: (!args.is_empty()).then(|| args.to_string()),
            }],
            "math" => {
                let text = if args.is_empty() {
                    join_text(&parts.content)
                } else {
                    args.to_string()
                };
                vec![Block::Math(text)]
            },
            "include" => self.include(args, no)?,
            "raw" => {
                if !self.settings.raw_enabled {
                    self.reporter
                        .report(Level::Warning, no, "\"raw\" directive disabled.")?;
                    Vec::new()
                } else if args.split_whitespace().any(|format| format == "html") {
                    vec![Block::Raw(join_text(&parts.content))]
                } else {
                    Vec::new()
                }
            },
            other => {
                self.reporter.report(
                    Level::Error,
                    no,
                    format!("Unknown directive type \"{other}\"."),
                )?;
                Vec::new()
            },
        };
        Ok(blocks)
    }

    fn image(
        &mut self,
        directive: &str,
        args: &str,
        parts: &DirectiveBody,
        allowed: &[&str],
        no: usize,
    ) -> Result<Option<Image>> {
        let uri: String = args.split_whitespace().collect();
        if uri.is_empty() {
            self.reporter.report(
                Level::Error,
                no,
                format!("Error in \"{directive}\" directive: 1 argument(s) required, 0 supplied."),
            )?;
            return Ok(None);
        }
        if let Some((unknown, _)) = parts.options.iter().find(|(key, _)| !allowed.contains(&key.as_str())) {
            self.reporter.report(
                Level::Error,
                no,
                format!("Error in \"{directive}\" directive: unknown option: \"{unknown}\"."),
            )?;
            return Ok(None);
        }
        let owned = |key: &str| parts.option(key).map(str::to_string);
        Ok(Some(Image {
            uri,
            alt: owned("alt"),
            target: owned("target"),
            width: owned("width"),
            height: owned("height"),
            align: owned("align"),
        }))
    }

    fn include(&mut self, args: &str, no: usize) -> Result<Vec<Block>> {
        if !self.settings.file_insertion_enabled {
            self.reporter
                .report(Level::Warning, no, "\"include\" directive disabled.")?;
            return Ok(Vec::new());
        }
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            self.reporter
                .report(Level::Severe, no, "Maximum include depth exceeded.")?;
            return Ok(Vec::new());
        }
        let path = self
            .settings
            .base_dir
            .as_deref()
            .map_or_else(|| args.into(), |base| base.join(args));
        let source = std::fs::read_to_string(&path).map_err(|source| Error::Include {
            path: path.clone(),
            source,
        })?;
        self.include_depth += 1;
        let blocks = self.parse_blocks(&split_lines(&source), true);
        self.include_depth -= 1;
        blocks
    }

    fn unique_id(&mut self, base: &str) -> String {
        let mut id = base.to_string();
        let mut counter = 0;
        while self.ids.contains(&id) {
            counter += 1;
            id = format!("{base}-{counter}");
        }
        self.ids.insert(id.clone());
        id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Document {
        let mut reporter = Reporter::new(Level::Warning);
        parse(source, &Settings::default(), &mut reporter).unwrap()
    }

    fn parse_err(source: &str) -> Error {
        let mut reporter = Reporter::new(Level::Warning);
        parse(source, &Settings::default(), &mut reporter).unwrap_err()
    }

    #[test]
    fn sections_get_levels_by_style() {
        let doc = parse_ok("=====\nTitle\n=====\n\nIntro.\n\nUsage\n=====\n\nSub\n~~~\n\nText.\n");
        let levels: Vec<usize> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(doc.section_ids.get("usage").map(String::as_str), Some("usage"));
    }

    #[test]
    fn short_underline_warns() {
        let err = parse_err("Configuration\n=====\n");
        assert!(err.to_string().contains("Title underline too short."));
    }

    #[test]
    fn very_short_underline_is_a_paragraph() {
        let doc = parse_ok("Some text\n--\n");
        assert!(matches!(doc.blocks.as_slice(), [Block::Paragraph(_)]));
    }

    #[test]
    fn bullet_list_items() {
        let doc = parse_ok("* one\n* two\n  continued\n\n* three\n");
        let Block::BulletList(items) = &doc.blocks[0] else {
            panic!("expected a list, got {:?}", doc.blocks);
        };
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1],
            vec![Block::Paragraph(vec![Inline::Text("two\ncontinued".into())])]
        );
    }

    #[test]
    fn literal_block_after_double_colon() {
        let doc = parse_ok("Example::\n\n    pip install x\n      --upgrade\n\nAfter.\n");
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![Inline::Text("Example:".into())])
        );
        assert_eq!(
            doc.blocks[1],
            Block::LiteralBlock {
                text: "pip install x\n  --upgrade".into(),
                language: None,
            }
        );
    }

    #[test]
    fn comments_and_targets() {
        let doc = parse_ok(".. a comment\n\n.. _Odoo: https://www.odoo.com\n\nSee Odoo_.\n");
        assert_eq!(doc.blocks[0], Block::Comment("a comment".into()));
        assert_eq!(
            doc.targets.get("odoo").map(String::as_str),
            Some("https://www.odoo.com")
        );
    }

    #[test]
    fn substitution_image_definition() {
        let doc = parse_ok(
            ".. |badge1| image:: https://img.shields.io/badge/x.png\n    :target: https://example.com\n    :alt: Beta\n",
        );
        let Some(Substitution::Image(image)) = doc.substitutions.get("badge1") else {
            panic!("missing substitution");
        };
        assert_eq!(image.uri, "https://img.shields.io/badge/x.png");
        assert_eq!(image.target.as_deref(), Some("https://example.com"));
        assert_eq!(image.alt.as_deref(), Some("Beta"));
    }

    #[test]
    fn figure_with_caption() {
        let doc = parse_ok(".. figure:: https://example.com/a.png\n   :alt: A\n\n   The caption.\n");
        let Block::Figure { image, caption, .. } = &doc.blocks[0] else {
            panic!("expected a figure");
        };
        assert_eq!(image.alt.as_deref(), Some("A"));
        assert_eq!(caption.as_deref(), Some(&[Inline::Text("The caption.".into())][..]));
    }

    #[test]
    fn admonition_body() {
        let doc = parse_ok(".. important::\n   Read this.\n");
        assert_eq!(
            doc.blocks[0],
            Block::Admonition {
                kind: "important".into(),
                body: vec![Block::Paragraph(vec![Inline::Text("Read this.".into())])],
            }
        );
    }

    #[test]
    fn include_is_disabled_by_default() {
        let err = parse_err(".. include:: /etc/passwd\n");
        assert!(err.to_string().contains("\"include\" directive disabled."));
    }

    #[test]
    fn include_reads_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.rst"), "Included *text*.\n").unwrap();
        let settings = Settings {
            file_insertion_enabled: true,
            base_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let mut reporter = Reporter::new(Level::Warning);
        let doc = parse(".. include:: part.rst\n", &settings, &mut reporter).unwrap();
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![
                Inline::Text("Included ".into()),
                Inline::Emphasis("text".into()),
                Inline::Text(".".into()),
            ])
        );
    }

    #[test]
    fn unknown_directive_is_an_error() {
        let err = parse_err(".. automodule:: foo\n");
        let Error::Halted(diagnostic) = err else {
            panic!("expected a halt");
        };
        assert_eq!(diagnostic.level, Level::Error);
    }

    #[test]
    fn enumerated_list() {
        let doc = parse_ok("1. first\n2. second\n");
        assert!(matches!(&doc.blocks[0], Block::EnumeratedList(items) if items.len() == 2));
    }

    #[test]
    fn year_sentence_is_not_a_list() {
        let doc = parse_ok("2019. Was a year\nof changes.\n");
        assert!(matches!(doc.blocks.as_slice(), [Block::Paragraph(_)]));
    }

    #[test]
    fn definition_list() {
        let doc = parse_ok("term\n    definition\n");
        assert!(matches!(&doc.blocks[0], Block::DefinitionList(items) if items.len() == 1));
    }

    #[test]
    fn duplicate_ids_are_numbered() {
        let doc = parse_ok("Usage\n=====\n\nUsage\n=====\n");
        let ids: Vec<&str> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["usage", "usage-1"]);
    }

    #[test]
    fn tabs_expand_to_eight_columns() {
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("ab\tx"), "ab      x");
    }
}
