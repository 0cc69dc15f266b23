use crate::style::ast::{Expr, ImportKeyword, ImportNode, Node, Position, Stylesheet};
use crate::style::error::ParseError;
use std::path::Path;

/// Parse one file.
///
/// Statements are line oriented. A line may hold several `@import` /
/// `@require` statements separated by `;`, a single `name = expr`
/// assignment, or rule text that is kept verbatim. Braces in rule text must
/// balance across the file.
pub fn parse(source: &str, file: &Path) -> Result<Stylesheet, ParseError> {
    let mut nodes = Vec::new();
    let mut depth: usize = 0;
    let mut last_line = 0;

    for (idx, text) in source.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let mut cursor = Cursor {
            chars: text.chars().collect(),
            pos: 0,
            line: line_no,
            file,
        };

        loop {
            cursor.skip_ws();
            if cursor.at_end() || cursor.starts_with("//") {
                break;
            }

            if let Some(keyword) = cursor.import_keyword() {
                nodes.push(Node::Import(cursor.import(keyword)?));
                continue;
            }

            if let Some((name, name_pos)) = cursor.assignment_target() {
                let value = cursor.expr()?;
                cursor.skip_ws();
                cursor.eat(';');
                cursor.expect_line_end()?;
                nodes.push(Node::Assign {
                    name,
                    value,
                    pos: name_pos,
                });
                break;
            }

            let pos = cursor.position();
            let rule: String = cursor.chars[cursor.pos..].iter().collect();
            let rule = rule.trim_end().to_string();
            depth = track_braces(&rule, depth).ok_or_else(|| ParseError {
                file: file.to_path_buf(),
                line: line_no,
                column: pos.column,
                message: "unmatched `}`".to_string(),
            })?;
            nodes.push(Node::Rule { text: rule, pos });
            break;
        }
    }

    if depth > 0 {
        return Err(ParseError {
            file: file.to_path_buf(),
            line: last_line.max(1),
            column: 1,
            message: "unclosed block at end of file".to_string(),
        });
    }

    Ok(Stylesheet {
        file: file.to_path_buf(),
        nodes,
    })
}

/// Apply the braces of one rule line to the running depth, skipping quoted
/// text. Returns `None` on an unmatched closing brace.
fn track_braces(text: &str, mut depth: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    Some(depth)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    file: &'a Path,
}

impl Cursor<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.pos + 1)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file.to_path_buf(),
            line: self.line,
            column: self.pos + 1,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn starts_with_ignore_case(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            match self.chars.get(i) {
                Some(have) if have.eq_ignore_ascii_case(&c) => i += 1,
                _ => return false,
            }
        }
        true
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        if self.at_end() || self.starts_with("//") {
            Ok(())
        } else {
            Err(self.error(format!("unexpected `{}`", self.chars[self.pos])))
        }
    }

    fn import_keyword(&self) -> Option<ImportKeyword> {
        for keyword in [ImportKeyword::Import, ImportKeyword::Require] {
            let kw = keyword.as_str();
            if self.starts_with(kw) {
                let next = self.chars.get(self.pos + kw.chars().count()).copied();
                if next.is_none_or(|c| c.is_whitespace() || c == '"' || c == '\'') {
                    return Some(keyword);
                }
            }
        }
        None
    }

    fn import(&mut self, keyword: ImportKeyword) -> Result<ImportNode, ParseError> {
        let start = self.pos;
        let pos = self.position();
        self.pos += keyword.as_str().chars().count();
        self.skip_ws();
        if self.at_end() || self.peek() == Some(';') {
            return Err(self.error("expected import path"));
        }
        let path = self.expr()?;
        let raw: String = self.chars[start..self.pos].iter().collect();
        self.skip_ws();
        if !self.eat(';') && !self.at_end() && !self.starts_with("//") {
            return Err(self.error(format!(
                "unexpected `{}` after import path",
                self.chars[self.pos]
            )));
        }
        Ok(ImportNode {
            keyword,
            path,
            pos,
            raw: raw.trim_end().to_string(),
        })
    }

    /// Consume `name =` when the line is an assignment.
    fn assignment_target(&mut self) -> Option<(String, Position)> {
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        let start = self.pos;
        let mut i = self.pos;
        while self.chars.get(i).copied().is_some_and(is_ident_char) {
            i += 1;
        }
        let mut j = i;
        while self.chars.get(j).copied().is_some_and(char::is_whitespace) {
            j += 1;
        }
        if self.chars.get(j) != Some(&'=') || self.chars.get(j + 1) == Some(&'=') {
            return None;
        }
        let name: String = self.chars[start..i].iter().collect();
        let pos = self.position();
        self.pos = j + 1;
        self.skip_ws();
        Some((name, pos))
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut parts = vec![self.term()?];
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.eat('+') {
                self.skip_ws();
                parts.push(self.term()?);
            } else {
                self.pos = save;
                break;
            }
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Expr::Concat(parts)
        })
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let pos = self.position();
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.peek() {
                        None => {
                            return Err(ParseError {
                                file: self.file.to_path_buf(),
                                line: pos.line,
                                column: pos.column,
                                message: "unterminated string".to_string(),
                            })
                        }
                        Some('\\') => {
                            self.pos += 1;
                            if let Some(c) = self.peek() {
                                value.push(c);
                                self.pos += 1;
                            }
                        }
                        Some(c) if c == q => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                    }
                }
                Ok(Expr::Str { value, pos })
            }
            _ if self.starts_with_ignore_case("url(") => {
                self.pos += 4;
                let start = self.pos;
                let mut quote: Option<char> = None;
                loop {
                    match self.peek() {
                        None => {
                            return Err(ParseError {
                                file: self.file.to_path_buf(),
                                line: pos.line,
                                column: pos.column,
                                message: "unclosed url(".to_string(),
                            })
                        }
                        Some(c) if quote == Some(c) => quote = None,
                        Some(c @ ('"' | '\'')) if quote.is_none() => quote = Some(c),
                        Some(')') if quote.is_none() => break,
                        Some(_) => {}
                    }
                    self.pos += 1;
                }
                let raw: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(Expr::Url {
                    raw: raw.trim().to_string(),
                    pos,
                })
            }
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                while self.peek().is_some_and(is_ident_char) {
                    self.pos += 1;
                }
                Ok(Expr::Ident {
                    name: self.chars[start..self.pos].iter().collect(),
                    pos,
                })
            }
            _ => Err(self.error("expected expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Stylesheet {
        parse(source, Path::new("a.styl")).unwrap()
    }

    #[test]
    fn parses_import_with_position() {
        let sheet = parse_ok(".a\n  color red\n@import \"b\"\n");
        let imports: Vec<_> = sheet.imports().collect();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].keyword, ImportKeyword::Import);
        assert_eq!(
            imports[0].path,
            Expr::Str {
                value: "b".into(),
                pos: Position::new(3, 9)
            }
        );
        assert_eq!(imports[0].pos, Position::new(3, 1));
        assert_eq!(imports[0].raw, "@import \"b\"");
    }

    #[test]
    fn several_imports_on_one_line_get_distinct_columns() {
        let sheet = parse_ok("@import \"a\"; @import 'b';@require c");
        let cols: Vec<_> = sheet.imports().map(|i| i.path.pos()).collect();
        assert_eq!(
            cols,
            vec![
                Position::new(1, 9),
                Position::new(1, 22),
                Position::new(1, 35)
            ]
        );
    }

    #[test]
    fn parses_assignment_and_concat() {
        let sheet = parse_ok("base = \"theme\"\n@import base + \"/vars\"\n");
        match &sheet.nodes[0] {
            Node::Assign { name, value, .. } => {
                assert_eq!(name, "base");
                assert!(matches!(value, Expr::Str { value, .. } if value == "theme"));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        let import = sheet.imports().next().unwrap();
        assert!(matches!(&import.path, Expr::Concat(parts) if parts.len() == 2));
    }

    #[test]
    fn parses_url_import() {
        let sheet = parse_ok("@import url(\"http://x.test/a.css\")");
        let import = sheet.imports().next().unwrap();
        assert_eq!(
            import.path,
            Expr::Url {
                raw: "\"http://x.test/a.css\"".into(),
                pos: Position::new(1, 9)
            }
        );
    }

    #[test]
    fn keeps_rules_and_skips_comments() {
        let sheet = parse_ok("// header\n.a { color: red; }\n\n");
        assert_eq!(sheet.nodes.len(), 1);
        assert!(matches!(&sheet.nodes[0], Node::Rule { text, .. } if text == ".a { color: red; }"));
    }

    #[test]
    fn equality_in_rule_is_not_assignment() {
        let sheet = parse_ok("a[href==x] { }");
        assert!(matches!(&sheet.nodes[0], Node::Rule { .. }));
    }

    #[test]
    fn unterminated_string_is_error() {
        let err = parse("@import \"b", Path::new("a.styl")).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 9);
        assert_eq!(err.message, "unterminated string");
    }

    #[test]
    fn missing_import_path_is_error() {
        let err = parse("@import ;", Path::new("a.styl")).unwrap_err();
        assert_eq!(err.message, "expected import path");
    }

    #[test]
    fn unbalanced_braces_are_errors() {
        assert!(parse(".a {\n", Path::new("a.styl")).is_err());
        assert!(parse("}\n", Path::new("a.styl")).is_err());
        assert!(parse(".a { content: \"}\" }", Path::new("a.styl")).is_ok());
    }
}
