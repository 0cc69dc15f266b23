use serde::Serialize;
use std::path::PathBuf;

/// Position of a token within one parse of one file. Lines and columns are
/// 1-indexed; columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Expression forms accepted as an import target or assignment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Quoted string literal, quotes stripped.
    Str { value: String, pos: Position },
    /// Bare identifier; a variable reference or, if undefined, its own name.
    Ident { name: String, pos: Position },
    /// `url(...)` with the inner text kept verbatim.
    Url { raw: String, pos: Position },
    /// `a + b + ...`
    Concat(Vec<Expr>),
}

impl Expr {
    /// Position of the first token of the expression.
    pub fn pos(&self) -> Position {
        match self {
            Expr::Str { pos, .. } | Expr::Ident { pos, .. } | Expr::Url { pos, .. } => *pos,
            Expr::Concat(parts) => parts
                .first()
                .map(Expr::pos)
                .unwrap_or_else(|| Position::new(0, 0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKeyword {
    Import,
    Require,
}

impl ImportKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKeyword::Import => "@import",
            ImportKeyword::Require => "@require",
        }
    }
}

/// One `@import` / `@require` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNode {
    pub keyword: ImportKeyword,
    pub path: Expr,
    /// Position of the keyword.
    pub pos: Position,
    /// Statement text as written, used when the import is passed through.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Import(ImportNode),
    Assign {
        name: String,
        value: Expr,
        pos: Position,
    },
    /// Opaque rule text, emitted verbatim.
    Rule { text: String, pos: Position },
}

/// A parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub file: PathBuf,
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    /// Import statements in document order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Import(import) => Some(import),
            _ => None,
        })
    }
}
