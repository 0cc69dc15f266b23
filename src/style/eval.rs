use crate::source::SourceAccessor;
use crate::style::ast::{Expr, ImportKeyword, ImportNode, Node, Position, Stylesheet};
use crate::style::error::CompileError;
use crate::style::lookup;
use crate::style::parser::parse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Compiler settings that shape evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Extra native search paths.
    pub paths: Vec<PathBuf>,
    /// Inline `.css` imports instead of passing them through.
    pub include_css: bool,
    /// Variables visible before the first statement.
    pub define: BTreeMap<String, String>,
}

/// Variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, String>,
}

impl Scope {
    pub fn with_defines(define: &BTreeMap<String, String>) -> Self {
        Self {
            vars: define.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

/// Literal value of an import target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: String,
    /// The target was written as `url(...)`.
    pub is_url_function: bool,
    pub pos: Position,
}

impl Target {
    /// Same target pointing somewhere else.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }
}

/// Evaluate an expression to its string value. Undefined identifiers stand
/// for their own name.
pub fn eval_expr(expr: &Expr, scope: &Scope) -> String {
    match expr {
        Expr::Str { value, .. } => value.clone(),
        Expr::Ident { name, .. } => scope.get(name).unwrap_or(name).to_string(),
        Expr::Url { raw, .. } => raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
        Expr::Concat(parts) => parts.iter().map(|p| eval_expr(p, scope)).collect(),
    }
}

/// Evaluate an import's target expression against `scope` without touching
/// any other evaluation state.
pub fn eval_target(expr: &Expr, scope: &Scope) -> Target {
    Target {
        path: eval_expr(expr, scope),
        is_url_function: matches!(expr, Expr::Url { .. }),
        pos: expr.pos(),
    }
}

/// Compiled output of a file or of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub nodes: Vec<String>,
}

impl Block {
    pub fn from_line(line: impl Into<String>) -> Self {
        Self {
            nodes: vec![line.into()],
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.nodes.push(line.into());
    }

    pub fn extend(&mut self, other: Block) {
        self.nodes.extend(other.nodes);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_css(&self) -> String {
        let mut css = self.nodes.join("\n");
        if !css.is_empty() {
            css.push('\n');
        }
        css
    }
}

/// Handling of import statements during evaluation.
///
/// The evaluator calls this once per import node it reaches; implementations
/// decide what the import expands to and may fall back on
/// [`Evaluator::import_default`].
pub trait ImportHandler {
    fn visit_import(
        &self,
        evaluator: &mut Evaluator<'_>,
        node: &ImportNode,
    ) -> Result<Block, CompileError>;
}

/// The compiler's own import handling, with nothing intercepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeImports;

impl ImportHandler for NativeImports {
    fn visit_import(
        &self,
        evaluator: &mut Evaluator<'_>,
        node: &ImportNode,
    ) -> Result<Block, CompileError> {
        let target = evaluator.eval_target(&node.path);
        evaluator.import_default(node, &target)
    }
}

/// Evaluation pass over a parsed stylesheet and everything it imports.
pub struct Evaluator<'a> {
    options: &'a CompileOptions,
    source: &'a dyn SourceAccessor,
    handler: &'a dyn ImportHandler,
    scope: Scope,
    file: PathBuf,
    import_stack: Vec<PathBuf>,
    imported: HashSet<PathBuf>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        options: &'a CompileOptions,
        source: &'a dyn SourceAccessor,
        handler: &'a dyn ImportHandler,
        file: &Path,
    ) -> Self {
        Self {
            options,
            source,
            handler,
            scope: Scope::with_defines(&options.define),
            file: file.to_path_buf(),
            import_stack: vec![file.to_path_buf()],
            imported: HashSet::new(),
        }
    }

    /// File whose statements are being evaluated.
    pub fn current_file(&self) -> &Path {
        &self.file
    }

    pub fn eval_target(&self, expr: &Expr) -> Target {
        eval_target(expr, &self.scope)
    }

    pub fn evaluate(&mut self, sheet: &Stylesheet) -> Result<Block, CompileError> {
        let mut block = Block::default();
        for node in &sheet.nodes {
            match node {
                Node::Assign { name, value, .. } => {
                    let value = eval_expr(value, &self.scope);
                    self.scope.set(name.clone(), value);
                }
                Node::Rule { text, .. } => block.push(text.clone()),
                Node::Import(import) => {
                    let handler = self.handler;
                    block.extend(handler.visit_import(self, import)?);
                }
            }
        }
        Ok(block)
    }

    /// Native import handling for `node`, with `target` as its evaluated path.
    ///
    /// `url(...)` imports are passed through as written. Plain CSS (unless
    /// `include_css`) is passed through as a CSS `@import` of `target.path`.
    /// Anything else is looked up on the search paths, parsed and evaluated
    /// in place, sharing the current scope.
    pub fn import_default(
        &mut self,
        node: &ImportNode,
        target: &Target,
    ) -> Result<Block, CompileError> {
        if target.is_url_function {
            return Ok(Block::from_line(node.raw.clone()));
        }
        let literal_css = lookup::is_literal_css(&target.path);
        if literal_css && !self.options.include_css {
            return Ok(Block::from_line(format!("@import \"{}\"", target.path)));
        }

        let found = self.locate(&target.path, literal_css);
        let found = found.ok_or_else(|| CompileError::ImportNotFound {
            path: requested_name(&target.path, literal_css),
            file: self.file.clone(),
            line: target.pos.line,
            column: target.pos.column,
        })?;

        if self.import_stack.contains(&found) {
            return Err(CompileError::ImportLoop { path: found });
        }
        let first_time = self.imported.insert(found.clone());
        if node.keyword == ImportKeyword::Require && !first_time {
            return Ok(Block::default());
        }

        let code = self
            .source
            .read_to_string(&found)
            .map_err(|source| CompileError::Read {
                path: found.clone(),
                source,
            })?;
        let sheet = parse(&code, &found)?;

        self.import_stack.push(found.clone());
        let previous = std::mem::replace(&mut self.file, found);
        let result = self.evaluate(&sheet);
        self.file = previous;
        self.import_stack.pop();
        result
    }

    fn locate(&self, path: &str, literal_css: bool) -> Option<PathBuf> {
        let paths = lookup::search_paths(&self.file, &self.options.paths);
        let ignore = Some(self.file.as_path());
        if literal_css || lookup::has_style_extension(path) {
            return lookup::find(path, &paths, ignore, self.source);
        }
        lookup::find(&format!("{path}{}", lookup::STYLE_EXTENSION), &paths, ignore, self.source)
            .or_else(|| lookup::lookup_index(path, &paths, ignore, self.source))
    }
}

fn requested_name(path: &str, literal_css: bool) -> String {
    if literal_css || lookup::has_style_extension(path) {
        path.to_string()
    } else {
        format!("{path}{}", lookup::STYLE_EXTENSION)
    }
}

/// Parse and evaluate `code` with native import handling only.
pub fn render(
    code: &str,
    file: &Path,
    options: &CompileOptions,
    source: &dyn SourceAccessor,
) -> Result<String, CompileError> {
    let sheet = parse(code, file)?;
    let mut evaluator = Evaluator::new(options, source, &NativeImports, file);
    Ok(evaluator.evaluate(&sheet)?.to_css())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;

    fn options() -> CompileOptions {
        CompileOptions::default()
    }

    #[test]
    fn evaluates_identifiers_through_scope() {
        let mut scope = Scope::default();
        scope.set("theme", "dark");
        let expr = Expr::Concat(vec![
            Expr::Ident {
                name: "theme".into(),
                pos: Position::new(2, 9),
            },
            Expr::Str {
                value: "/vars".into(),
                pos: Position::new(2, 17),
            },
        ]);
        let target = eval_target(&expr, &scope);
        assert_eq!(target.path, "dark/vars");
        assert_eq!(target.pos, Position::new(2, 9));
        assert!(!target.is_url_function);

        let undefined = Expr::Ident {
            name: "nib".into(),
            pos: Position::new(1, 9),
        };
        assert_eq!(eval_expr(&undefined, &scope), "nib");
    }

    #[test]
    fn inlines_native_imports_in_order() {
        let source = MemorySource::new()
            .with_file("/p/b.styl", ".b\n  color blue")
            .with_file("/p/c/index.styl", ".c\n  color green");
        let css = render(
            ".a\n  color red\n@import \"b\"\n@import \"c\"",
            Path::new("/p/a.styl"),
            &options(),
            &source,
        )
        .unwrap();
        assert_eq!(css, ".a\ncolor red\n.b\ncolor blue\n.c\ncolor green\n");
    }

    #[test]
    fn passes_css_and_url_imports_through() {
        let source = MemorySource::new().with_file("/p/x.css", ".x {}");
        let css = render(
            "@import \"x.css\"\n@import url(\"http://cdn.test/y.css\")",
            Path::new("/p/a.styl"),
            &options(),
            &source,
        )
        .unwrap();
        assert_eq!(css, "@import \"x.css\"\n@import url(\"http://cdn.test/y.css\")\n");
    }

    #[test]
    fn include_css_inlines_css() {
        let source = MemorySource::new().with_file("/p/x.css", ".x {}");
        let opts = CompileOptions {
            include_css: true,
            ..Default::default()
        };
        let css = render("@import \"x.css\"", Path::new("/p/a.styl"), &opts, &source).unwrap();
        assert_eq!(css, ".x {}\n");
    }

    #[test]
    fn missing_import_reports_requested_name() {
        let err = render(
            "@import \"missing\"",
            Path::new("/p/a.styl"),
            &options(),
            &MemorySource::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to locate @import file missing.styl (/p/a.styl:1:9)"
        );
    }

    #[test]
    fn detects_import_loops() {
        let source = MemorySource::new()
            .with_file("/p/a.styl", "@import \"b\"")
            .with_file("/p/b.styl", "@import \"a\"");
        let err = render("@import \"b\"", Path::new("/p/a.styl"), &options(), &source).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ImportLoop { ref path } if path == Path::new("/p/a.styl")
        ));
    }

    #[test]
    fn require_imports_once() {
        let source = MemorySource::new().with_file("/p/b.styl", ".b");
        let css = render(
            "@require \"b\"\n@require \"b\"\n@import \"b\"",
            Path::new("/p/a.styl"),
            &options(),
            &source,
        )
        .unwrap();
        assert_eq!(css, ".b\n.b\n");
    }

    #[test]
    fn imported_variables_are_shared() {
        let source = MemorySource::new().with_file("/p/vars.styl", "theme = \"dark\"");
        let source = source.with_file("/p/dark.styl", ".dark");
        let css = render(
            "@import \"vars\"\n@import theme",
            Path::new("/p/a.styl"),
            &options(),
            &source,
        )
        .unwrap();
        assert_eq!(css, ".dark\n");
    }
}
