//! Addon manifests.
//!
//! A manifest (`__manifest__.py`, or the legacy `__openerp__.py`) is a single
//! Python dict literal. It is parsed here without evaluating anything: only
//! literals are accepted (strings, numbers, `True`/`False`/`None`, lists,
//! tuples and nested dicts), together with comments, trailing commas and
//! implicit string concatenation.

use crate::{Error, Result};
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;

/// Parsed manifest: string keys mapped to heterogeneous values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    values: Map<String, Value>,
}

impl Manifest {
    /// Parse manifest source text.
    ///
    /// ```rust
    /// use genreadme_core::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"{
    ///     ## comment
    ///     "name": "Sale Extras",
    ///     "author": "ADHOC SA, " "Odoo Community Association (OCA)",
    ///     "depends": ["sale"],
    ///     "installable": True,
    /// }"#)?;
    /// assert_eq!(manifest.name(), Some("Sale Extras"));
    /// assert_eq!(manifest.author(), Some("ADHOC SA, Odoo Community Association (OCA)"));
    /// assert!(manifest.installable());
    /// # Ok::<(), genreadme_core::Error>(())
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = LiteralParser::new(source);
        parser.skip_blank();
        let value = parser.value()?;
        parser.skip_blank();
        if parser.peek().is_some() {
            return Err(parser.error("unexpected content after the manifest dict"));
        }
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(Error::Parse("manifest is not a dict literal".into())),
        }
    }

    /// Read and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source).map_err(|err| Error::Manifest {
            path: path.to_path_buf(),
            message: match err {
                Error::Parse(message) => message,
                other => other.to_string(),
            },
        })
    }

    /// Raw access to any key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Human readable addon name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Comma separated author list.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.str_field("author")
    }

    /// License identifier, e.g. `AGPL-3`.
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.str_field("license")
    }

    /// Development status, e.g. `Beta` or `Production/Stable`.
    #[must_use]
    pub fn development_status(&self) -> Option<&str> {
        self.str_field("development_status")
    }

    /// Project website.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.str_field("website").filter(|w| !w.trim().is_empty())
    }

    /// Whether the addon can be installed. Defaults to `true`.
    #[must_use]
    pub fn installable(&self) -> bool {
        self.values.get("installable").is_none_or(truthy)
    }

    /// Whether the addon can be preloaded. Defaults to `true`.
    #[must_use]
    pub fn preloadable(&self) -> bool {
        self.values.get("preloadable").is_none_or(truthy)
    }

    /// GitHub logins of the maintainers.
    #[must_use]
    pub fn maintainers(&self) -> Vec<String> {
        match self.values.get("maintainers") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Python truthiness.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl LiteralParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Parse(format!("line {}: {message}", self.line))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skip whitespace, comments and backslash line continuations.
    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                },
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                },
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                },
                _ => break,
            }
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        self.skip_blank();
        if self.peek() == Some(wanted) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{wanted}'")))
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_blank();
        match self.peek() {
            Some('{') => self.dict(),
            Some('[') => {
                self.bump();
                Ok(Value::Array(self.sequence(']')?.0))
            },
            Some('(') => {
                self.bump();
                let (mut items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    return Ok(items.remove(0));
                }
                Ok(Value::Array(items))
            },
            Some(c) if self.at_string_start() || c == '"' || c == '\'' => self.strings(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.constant(),
            Some(c) => Err(self.error(&format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn dict(&mut self) -> Result<Value> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_blank();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let Value::String(key) = self.value()? else {
                return Err(self.error("manifest keys must be strings"));
            };
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_blank();
            match self.bump() {
                Some(',') => {},
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    /// Items up to `close`, and whether the last item had a trailing comma.
    fn sequence(&mut self, close: char) -> Result<(Vec<Value>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_blank();
            if self.peek() == Some(close) {
                self.bump();
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_blank();
            match self.bump() {
                Some(',') => trailing_comma = true,
                Some(c) if c == close => return Ok((items, false)),
                _ => return Err(self.error(&format!("expected ',' or '{close}'"))),
            }
        }
    }

    /// A string prefix such as `r`, `u` or `b` directly followed by a quote.
    fn at_string_start(&self) -> bool {
        let mut offset = 0;
        while offset < 2 && self.peek_at(offset).is_some_and(|c| "rRuUbB".contains(c)) {
            offset += 1;
        }
        offset > 0 && matches!(self.peek_at(offset), Some('"' | '\''))
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Value> {
        let mut text = self.string()?;
        loop {
            self.skip_blank();
            if !(self.at_string_start() || matches!(self.peek(), Some('"' | '\''))) {
                break;
            }
            text.push_str(&self.string()?);
        }
        Ok(Value::String(text))
    }

    fn string(&mut self) -> Result<String> {
        let mut raw = false;
        while let Some(c) = self.peek().filter(|c| "rRuUbB".contains(*c)) {
            raw |= c == 'r' || c == 'R';
            self.bump();
        }
        let Some(quote) = self.bump() else {
            return Err(self.error("unexpected end of input"));
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut text = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if c == quote {
                if !triple {
                    return Ok(text);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.bump();
                    self.bump();
                    return Ok(text);
                }
                text.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.error("unterminated string"));
            }
            if c == '\\' && !raw {
                self.escape(&mut text)?;
                continue;
            }
            text.push(c);
        }
    }

    fn escape(&mut self, text: &mut String) -> Result<()> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated string"));
        };
        match c {
            '\n' => {},
            'n' => text.push('\n'),
            't' => text.push('\t'),
            'r' => text.push('\r'),
            '0' => text.push('\0'),
            '\\' | '\'' | '"' => text.push(c),
            'x' => text.push(self.hex_escape(2)?),
            'u' => text.push(self.hex_escape(4)?),
            'U' => text.push(self.hex_escape(8)?),
            other => {
                text.push('\\');
                text.push(other);
            },
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid escape sequence"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid escape sequence"))
    }

    fn number(&mut self) -> Result<Value> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            let sign_after_exponent = matches!(c, '+' | '-')
                && (literal.is_empty() || (literal.ends_with(['e', 'E']) && !literal.starts_with("0x")));
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || sign_after_exponent {
                literal.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let cleaned = literal.replace('_', "");
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.trim_start_matches('+')),
        };
        let number = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok().map(Number::from)
        } else if digits.contains(['.', 'e', 'E']) {
            digits.parse::<f64>().ok().and_then(Number::from_f64)
        } else {
            digits.parse::<i64>().ok().map(Number::from)
        };
        let number = number.ok_or_else(|| self.error(&format!("invalid number '{literal}'")))?;
        if !negative {
            return Ok(Value::Number(number));
        }
        let negated = number
            .as_i64()
            .map(|n| Number::from(-n))
            .or_else(|| number.as_f64().and_then(|f| Number::from_f64(-f)));
        negated
            .map(Value::Number)
            .ok_or_else(|| self.error(&format!("invalid number '{literal}'")))
    }

    fn constant(&mut self) -> Result<Value> {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            word.push(c);
            self.bump();
        }
        match word.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            other => Err(self.error(&format!("unsupported expression '{other}'"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_typical_manifest() {
        let source = r#"# Copyright 2024 ADHOC SA
# License AGPL-3.0 or later (http://www.gnu.org/licenses/agpl).
{
    'name': 'Account Payment Extras',
    'version': "16.0.1.2.0",
    'category': 'Accounting',
    'sequence': 14,
    'summary': '',
    'author': 'ADHOC SA',
    'website': 'www.adhoc.com.ar',
    'license': 'AGPL-3',
    'images': [
    ],
    'depends': [
        'account',
    ],
    'data': ['views/account_payment_views.xml'],
    'demo': [],
    'installable': True,
    'auto_install': False,
    'application': False,
}
"#;
        let manifest = Manifest::parse(source).unwrap();
        assert_eq!(manifest.name(), Some("Account Payment Extras"));
        assert_eq!(manifest.license(), Some("AGPL-3"));
        assert_eq!(manifest.website(), Some("www.adhoc.com.ar"));
        assert_eq!(manifest.get("sequence"), Some(&json!(14)));
        assert_eq!(manifest.get("depends"), Some(&json!(["account"])));
        assert!(manifest.installable());
        assert!(manifest.preloadable());
        assert!(manifest.development_status().is_none());
    }

    #[test]
    fn false_and_none_flags() {
        let manifest = Manifest::parse("{'installable': False, 'preloadable': None}").unwrap();
        assert!(!manifest.installable());
        assert!(!manifest.preloadable());
    }

    #[test]
    fn strings_escapes_and_concatenation() {
        let manifest = Manifest::parse(
            r#"{"a": 'it\'s', "b": "x" 'y'
                "z", "c": r"\d+", "d": """multi
line""", "e": u'é'}"#,
        )
        .unwrap();
        assert_eq!(manifest.get("a"), Some(&json!("it's")));
        assert_eq!(manifest.get("b"), Some(&json!("xyz")));
        assert_eq!(manifest.get("c"), Some(&json!("\\d+")));
        assert_eq!(manifest.get("d"), Some(&json!("multi\nline")));
        assert_eq!(manifest.get("e"), Some(&json!("\u{e9}")));
    }

    #[test]
    fn tuples_numbers_and_nesting() {
        let manifest = Manifest::parse(
            "{'external_dependencies': {'python': ('lxml',)}, 'x': (1), 'f': -1.5, 'h': 0x10}",
        )
        .unwrap();
        assert_eq!(
            manifest.get("external_dependencies"),
            Some(&json!({"python": ["lxml"]}))
        );
        assert_eq!(manifest.get("x"), Some(&json!(1)));
        assert_eq!(manifest.get("f"), Some(&json!(-1.5)));
        assert_eq!(manifest.get("h"), Some(&json!(16)));
    }

    #[test]
    fn maintainers_list() {
        let manifest = Manifest::parse("{'maintainers': ['jjscarafia', 42, 'zaoral']}").unwrap();
        assert_eq!(manifest.maintainers(), vec!["jjscarafia", "zaoral"]);
        assert!(Manifest::default().maintainers().is_empty());
    }

    #[test]
    fn rejects_code() {
        let err = Manifest::parse("{'name': get_name()}").unwrap_err();
        assert!(err.to_string().contains("unsupported expression 'get_name'"));
    }

    #[test]
    fn rejects_non_dict() {
        assert!(Manifest::parse("['a']").is_err());
        assert!(Manifest::parse("{'a': 1} extra").is_err());
    }

    #[test]
    fn reports_line_numbers() {
        let err = Manifest::parse("{\n  'a': 1\n  'b': 2\n}").unwrap_err();
        assert_eq!(err.to_string(), "Parse error: line 3: expected ',' or '}'");
    }

    #[test]
    fn from_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("__manifest__.py");
        std::fs::write(&path, "{'name': }").unwrap();
        let err = Manifest::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
        assert!(err.to_string().contains("__manifest__.py"));
    }
}
