//! Go import declaration scanner
//!
//! Reads the package clause and the import declarations that follow it,
//! recording the byte span of every import path literal. Scanning stops
//! at the first declaration that is not an import, so string literals in
//! the file body are never touched.

/// An import path literal found in a Go source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Unquoted import path
    pub path: String,
    /// Byte offset of the opening quote
    pub start: usize,
    /// Byte offset just past the closing quote
    pub end: usize,
    /// Line number, 1-indexed
    pub line: usize,
    /// Column number, 1-indexed
    pub column: usize,
    /// Raw (backquoted) literal
    pub raw: bool,
}

impl ImportSpec {
    /// Renders `path` as a literal in the same quoting style
    pub fn quote(&self, path: &str) -> String {
        if self.raw {
            format!("`{}`", path)
        } else {
            format!("\"{}\"", path.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}

/// A single text replacement with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Returns the import path literals of a Go source file
///
/// Malformed input ends the scan early; everything found up to that
/// point is returned.
pub fn scan_imports(source: &str) -> Vec<ImportSpec> {
    let mut scanner = Scanner::new(source);
    let mut imports = Vec::new();

    scanner.skip_trivia();
    if scanner.identifier() != Some("package") {
        return imports;
    }
    scanner.skip_trivia();
    if scanner.identifier().is_none() {
        return imports;
    }

    loop {
        scanner.skip_trivia_and_semicolons();
        if scanner.identifier() != Some("import") {
            break;
        }
        scanner.skip_trivia();
        if scanner.eat(b'(') {
            loop {
                scanner.skip_trivia_and_semicolons();
                if scanner.eat(b')') {
                    break;
                }
                match scanner.import_spec() {
                    Some(spec) => imports.push(spec),
                    None => return imports,
                }
            }
        } else {
            match scanner.import_spec() {
                Some(spec) => imports.push(spec),
                None => return imports,
            }
        }
    }

    imports
}

/// Applies edits to source content, returning the modified string
///
/// Edits are applied from the end of the content backwards so earlier
/// offsets stay valid. Out-of-range edits are ignored.
pub fn apply_edits(content: &str, edits: &[Edit]) -> String {
    let mut edits: Vec<&Edit> = edits.iter().collect();
    edits.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for edit in edits {
        if edit.start <= edit.end && edit.end <= result.len() {
            result.replace_range(edit.start..edit.end, &edit.new_text);
        }
    }
    result
}

/// Converts a byte offset into a 1-indexed line and column
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        // a leading byte order mark is not part of the source
        let pos = if source.starts_with('\u{feff}') { 3 } else { 0 };
        Self { source, pos }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                match body.find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => self.pos = self.source.len(),
                }
            } else {
                return;
            }
        }
    }

    fn skip_trivia_and_semicolons(&mut self) {
        loop {
            self.skip_trivia();
            if !self.eat(b';') {
                return;
            }
        }
    }

    /// Reads an identifier, leaving the position untouched if there is none
    fn identifier(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len: usize = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        if len == 0 || rest.starts_with(|c: char| c.is_numeric()) {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Reads `[name] "path"`
    fn import_spec(&mut self) -> Option<ImportSpec> {
        // optional package name, `_` or `.`
        if !self.eat(b'.') {
            self.identifier();
        }
        self.skip_trivia();
        self.string_literal()
    }

    fn string_literal(&mut self) -> Option<ImportSpec> {
        let start = self.pos;
        let quote = self.peek()?;
        let rest = &self.rest()[1..];

        let (path, len) = match quote {
            b'`' => {
                let end = rest.find('`')?;
                (rest[..end].to_string(), end + 2)
            }
            b'"' => {
                let mut path = String::new();
                let mut chars = rest.char_indices();
                let mut close = None;
                while let Some((i, c)) = chars.next() {
                    match c {
                        '"' => {
                            close = Some(i);
                            break;
                        }
                        '\\' => path.push(chars.next()?.1),
                        '\n' => return None,
                        c => path.push(c),
                    }
                }
                (path, close? + 2)
            }
            _ => return None,
        };

        self.pos += len;
        let (line, column) = offset_to_line_col(self.source, start);
        Some(ImportSpec {
            path,
            start,
            end: self.pos,
            line,
            column,
            raw: quote == b'`',
        })
    }
}
