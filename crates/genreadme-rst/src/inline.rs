//! Inline markup recognition.
//!
//! Start-strings must be preceded by whitespace, the start of the text or one
//! of a few opening punctuation characters, and followed by non-whitespace.
//! End-strings must be preceded by non-whitespace and followed by whitespace,
//! the end of the text or closing punctuation. A start-string with no
//! matching end-string raises a warning.

use crate::Result;
use crate::diagnostic::{Level, Reporter};
use crate::model::{Inline, normalize_name};

const START_PREFIX: &[char] = &['\'', '"', '(', '[', '{', '<', '-', '/', ':', '\u{2018}', '\u{201c}'];
const END_SUFFIX: &[char] = &[
    '\'', '"', ')', ']', '}', '>', '-', '/', ':', '.', ',', ';', '!', '?', '\\', '\u{2019}',
    '\u{201d}',
];
const URI_SCHEMES: &[&str] = &["https://", "http://", "ftp://", "mailto:"];
const URI_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"', ']'];

/// Parse the inline markup of one text run. `line` is used for diagnostics.
pub(crate) fn parse_inline(text: &str, line: usize, reporter: &mut Reporter) -> Result<Vec<Inline>> {
    let chars: Vec<char> = text.chars().collect();
    Scanner {
        chars: &chars,
        pos: 0,
        buf: String::new(),
        out: Vec::new(),
        line,
    }
    .run(reporter)
}

struct Scanner<'a> {
    chars: &'a [char],
    pos: usize,
    buf: String,
    out: Vec<Inline>,
    line: usize,
}

impl Scanner<'_> {
    fn run(mut self, reporter: &mut Reporter) -> Result<Vec<Inline>> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];

            if c == '\\' {
                if let Some(&next) = self.chars.get(self.pos + 1) {
                    if !next.is_whitespace() {
                        self.buf.push(next);
                    }
                    self.pos += 2;
                } else {
                    self.pos += 1;
                }
                continue;
            }

            if self.starts_with(self.pos, "``") && self.can_start(self.pos, 2) {
                self.delimited("``", reporter, "Inline literal", Inline::Literal)?;
                continue;
            }
            if self.starts_with(self.pos, "**") && self.can_start(self.pos, 2) {
                self.delimited("**", reporter, "Inline strong", Inline::Strong)?;
                continue;
            }
            if c == '*' && self.can_start(self.pos, 1) {
                self.delimited("*", reporter, "Inline emphasis", Inline::Emphasis)?;
                continue;
            }
            if c == '`' && self.can_start(self.pos, 1) {
                self.interpreted(reporter)?;
                continue;
            }
            if c == '|' && self.can_start(self.pos, 1) {
                self.substitution(reporter)?;
                continue;
            }
            if let Some(end) = self.uri_end(self.pos) {
                let uri = self.collect(self.pos, end);
                self.emit(Inline::ExternalRef {
                    text: uri.clone(),
                    uri,
                });
                self.pos = end;
                continue;
            }
            if c == '_' && self.is_reference_suffix(self.pos) {
                if let Some(word) = self.take_trailing_word() {
                    let name = normalize_name(&word);
                    self.emit(Inline::NamedRef { text: word, name });
                    self.pos += 1;
                    continue;
                }
            }

            self.buf.push(c);
            self.pos += 1;
        }
        self.flush();
        Ok(self.out)
    }

    /// Handle `**strong**`, `*emphasis*` and ``` ``literal`` ```.
    fn delimited(
        &mut self,
        delimiter: &str,
        reporter: &mut Reporter,
        what: &str,
        make: fn(String) -> Inline,
    ) -> Result<()> {
        let len = delimiter.chars().count();
        let start = self.pos + len;
        if let Some(end) = self.find_end(start, delimiter, false) {
            let content = self.collect(start, end);
            self.emit(make(content));
            self.pos = end + len;
        } else {
            reporter.report(
                Level::Warning,
                self.line,
                format!("{what} start-string without end-string."),
            )?;
            self.buf.push_str(delimiter);
            self.pos = start;
        }
        Ok(())
    }

    /// Handle `` `text` ``, `` `name`_ ``, `` `text <uri>`_ `` and roles.
    fn interpreted(&mut self, reporter: &mut Reporter) -> Result<()> {
        let start = self.pos + 1;
        let Some(end) = self.find_end(start, "`", true) else {
            reporter.report(
                Level::Warning,
                self.line,
                "Inline interpreted text or phrase reference start-string without end-string.",
            )?;
            self.buf.push('`');
            self.pos = start;
            return Ok(());
        };
        let content = self.collect(start, end);
        let mut next = end + 1;
        let is_reference = self.chars.get(next) == Some(&'_');
        if is_reference {
            next += 1;
            if self.chars.get(next) == Some(&'_') {
                next += 1;
            }
        }
        self.pos = next;

        if is_reference {
            let inline = phrase_reference(&content);
            self.emit(inline);
            return Ok(());
        }

        let inline = match self.take_role().as_deref() {
            None | Some("title-reference" | "title" | "t") => Inline::Cite(content),
            Some("code" | "literal") => Inline::Literal(content),
            Some("emphasis") => Inline::Emphasis(content),
            Some("strong") => Inline::Strong(content),
            Some(role) => {
                let message = format!("Unknown interpreted text role \"{role}\".");
                reporter.report(Level::Error, self.line, message)?;
                Inline::Text(content)
            },
        };
        self.emit(inline);
        Ok(())
    }

    fn substitution(&mut self, reporter: &mut Reporter) -> Result<()> {
        let start = self.pos + 1;
        let Some(end) = self.find_end(start, "|", true) else {
            reporter.report(
                Level::Warning,
                self.line,
                "Inline substitution_reference start-string without end-string.",
            )?;
            self.buf.push('|');
            self.pos = start;
            return Ok(());
        };
        let name = self.collect(start, end);
        let mut next = end + 1;
        while self.chars.get(next) == Some(&'_') && next < end + 3 {
            next += 1;
        }
        self.emit(Inline::SubstitutionRef(name));
        self.pos = next;
        Ok(())
    }

    /// Strip a `:role:` prefix written just before the backquote.
    fn take_role(&mut self) -> Option<String> {
        let trimmed = self.buf.strip_suffix(':')?;
        let colon = trimmed.rfind(':')?;
        let role = &trimmed[colon + 1..];
        if role.is_empty() || !role.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return None;
        }
        let role = role.to_string();
        self.buf.truncate(colon);
        Some(role)
    }

    fn starts_with(&self, at: usize, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(k, c)| self.chars.get(at + k) == Some(&c))
    }

    fn can_start(&self, at: usize, len: usize) -> bool {
        let before_ok = at == 0 || {
            let prev = self.chars[at - 1];
            prev.is_whitespace() || START_PREFIX.contains(&prev)
        };
        let after_ok = self.chars.get(at + len).is_some_and(|c| !c.is_whitespace());
        before_ok && after_ok
    }

    fn find_end(&self, from: usize, pattern: &str, allow_reference: bool) -> Option<usize> {
        let len = pattern.chars().count();
        let mut j = from + 1;
        while j + len <= self.chars.len() {
            if self.starts_with(j, pattern) {
                let prev = self.chars[j - 1];
                let escaped = prev == '\\' && pattern != "``";
                let follow = self.chars.get(j + len);
                let follow_ok = follow.is_none_or(|c| {
                    c.is_whitespace() || END_SUFFIX.contains(c) || (allow_reference && *c == '_')
                });
                if !prev.is_whitespace() && !escaped && follow_ok {
                    return Some(j);
                }
            }
            j += 1;
        }
        None
    }

    fn uri_end(&self, at: usize) -> Option<usize> {
        if at > 0 {
            let prev = self.chars[at - 1];
            if !(prev.is_whitespace() || START_PREFIX.contains(&prev)) {
                return None;
            }
        }
        let scheme = URI_SCHEMES.iter().find(|s| self.starts_with(at, s))?;
        let mut end = at;
        while end < self.chars.len() {
            let c = self.chars[end];
            if c.is_whitespace() || matches!(c, '<' | '>' | '"' | '`') {
                break;
            }
            end += 1;
        }
        while end > at && URI_TRAILING.contains(&self.chars[end - 1]) {
            end -= 1;
        }
        (end - at > scheme.len()).then_some(end)
    }

    fn is_reference_suffix(&self, at: usize) -> bool {
        if at == 0 || !self.chars[at - 1].is_alphanumeric() {
            return false;
        }
        self.chars
            .get(at + 1)
            .is_none_or(|c| c.is_whitespace() || (END_SUFFIX.contains(c) && *c != '\\'))
    }

    /// Pop the simple reference name that ends the pending text, if any.
    fn take_trailing_word(&mut self) -> Option<String> {
        let chars: Vec<char> = self.buf.chars().collect();
        let mut start = chars.len();
        while start > 0 {
            let c = chars[start - 1];
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '+') {
                start -= 1;
            } else {
                break;
            }
        }
        while start < chars.len() && !chars[start].is_alphanumeric() {
            start += 1;
        }
        if start == chars.len() {
            return None;
        }
        let word: String = chars[start..].iter().collect();
        self.buf = chars[..start].iter().collect();
        Some(word)
    }

    fn collect(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }

    fn emit(&mut self, inline: Inline) {
        self.flush();
        self.out.push(inline);
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            self.out.push(Inline::Text(std::mem::take(&mut self.buf)));
        }
    }
}

fn phrase_reference(content: &str) -> Inline {
    if let Some(stripped) = content.strip_suffix('>') {
        if let Some(open) = stripped.rfind('<') {
            let text = stripped[..open].trim();
            let target: String = stripped[open + 1..].split_whitespace().collect();
            if let Some(alias) = target.strip_suffix('_') {
                let text = if text.is_empty() { alias } else { text };
                return Inline::NamedRef {
                    text: text.to_string(),
                    name: normalize_name(alias),
                };
            }
            let text = if text.is_empty() { target.as_str() } else { text };
            return Inline::ExternalRef {
                text: text.to_string(),
                uri: target.clone(),
            };
        }
    }
    Inline::NamedRef {
        text: content.to_string(),
        name: normalize_name(content),
    }
}
