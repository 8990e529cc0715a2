//! AST traversal that classifies a file's use of `__future__`-relevant
//! constructs.
//!
//! One walk over the module records every `from __future__ import ...`
//! statement found, plus a handful of usage flags (print calls, division,
//! imports, string literals, `with` blocks, yield expressions) that the
//! checker's require-used mode keys on.

use crate::utils::LineIndex;
use ruff_python_ast::{Expr, ExceptHandler, Operator, Parameters, Pattern, Stmt};

/// One name imported from `__future__`, with the line of its import
/// statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredImport {
    /// The imported feature name, known to the registry or not.
    pub name: String,
    /// 1-indexed line of the `from __future__ import` statement.
    pub line: usize,
}

/// Accumulator for one traversal. Build with [`FutureImportVisitor::new`],
/// feed it the module body, then read the findings.
pub struct FutureImportVisitor<'a> {
    line_index: &'a LineIndex,
    /// Every `from __future__ import` entry, in document order. Duplicate
    /// names are kept here; the checker collapses them.
    pub future_imports: Vec<DeclaredImport>,
    uses_code: bool,
    uses_print: bool,
    uses_division: bool,
    uses_import: bool,
    uses_str_literals: bool,
    uses_generators: bool,
    uses_with: bool,
}

impl<'a> FutureImportVisitor<'a> {
    /// Creates a visitor with all flags cleared.
    #[must_use]
    pub fn new(line_index: &'a LineIndex) -> Self {
        Self {
            line_index,
            future_imports: Vec::new(),
            uses_code: false,
            uses_print: false,
            uses_division: false,
            uses_import: false,
            uses_str_literals: false,
            uses_generators: false,
            uses_with: false,
        }
    }

    /// Walks every top-level statement of a module.
    pub fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    /// Whether the file contains anything at all: any node besides the
    /// module root counts, including a lone docstring. `__future__` imports
    /// do not flip the code flag themselves but still count as content.
    #[must_use]
    pub fn uses_code(&self) -> bool {
        self.uses_code || !self.future_imports.is_empty()
    }

    /// Whether the language feature backing `name` is exercised in the
    /// file. Features with no corresponding usage flag always count as
    /// used, so require-used mode never filters them.
    #[must_use]
    pub fn feature_used(&self, name: &str) -> bool {
        match name {
            "print_function" => self.uses_print,
            "division" => self.uses_division,
            "absolute_import" => self.uses_import,
            "unicode_literals" => self.uses_str_literals,
            "generators" => self.uses_generators,
            "with_statement" => self.uses_with,
            _ => true,
        }
    }

    /// Visits a statement and everything below it.
    pub fn visit_stmt(&mut self, stmt: &Stmt) {
        // `from __future__ import ...` is a compiler directive, not code:
        // record the names and leave every flag untouched.
        if let Stmt::ImportFrom(node) = stmt {
            if node.level == 0 && node.module.as_deref() == Some("__future__") {
                let line = self.line_index.line_index(node.range.start());
                for alias in &node.names {
                    self.future_imports.push(DeclaredImport {
                        name: alias.name.to_string(),
                        line,
                    });
                }
                return;
            }
        }

        self.uses_code = true;

        match stmt {
            Stmt::Import(_) | Stmt::ImportFrom(_) => {
                self.uses_import = true;
            }
            Stmt::FunctionDef(node) => {
                for decorator in &node.decorator_list {
                    self.visit_expr(&decorator.expression);
                }
                self.visit_parameters(&node.parameters);
                if let Some(returns) = &node.returns {
                    self.visit_expr(returns);
                }
                self.visit_body(&node.body);
            }
            Stmt::ClassDef(node) => {
                for decorator in &node.decorator_list {
                    self.visit_expr(&decorator.expression);
                }
                if let Some(arguments) = &node.arguments {
                    for base in &arguments.args {
                        self.visit_expr(base);
                    }
                    for keyword in &arguments.keywords {
                        self.visit_expr(&keyword.value);
                    }
                }
                self.visit_body(&node.body);
            }
            Stmt::If(node) => {
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                for clause in &node.elif_else_clauses {
                    if let Some(test) = &clause.test {
                        self.visit_expr(test);
                    }
                    self.visit_body(&clause.body);
                }
            }
            Stmt::For(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.iter);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            Stmt::While(node) => {
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            Stmt::With(node) => {
                self.uses_with = true;
                for item in &node.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&node.body);
            }
            Stmt::Match(node) => {
                self.visit_expr(&node.subject);
                for case in &node.cases {
                    self.visit_pattern(&case.pattern);
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_body(&case.body);
                }
            }
            Stmt::Try(node) => {
                self.visit_body(&node.body);
                for ExceptHandler::ExceptHandler(handler) in &node.handlers {
                    if let Some(type_) = &handler.type_ {
                        self.visit_expr(type_);
                    }
                    self.visit_body(&handler.body);
                }
                self.visit_body(&node.orelse);
                self.visit_body(&node.finalbody);
            }
            Stmt::Assign(node) => {
                for target in &node.targets {
                    self.visit_expr(target);
                }
                self.visit_expr(&node.value);
            }
            Stmt::AugAssign(node) => {
                // `x /= y` carries the same division operator as `x / y`.
                if matches!(node.op, Operator::Div) {
                    self.uses_division = true;
                }
                self.visit_expr(&node.target);
                self.visit_expr(&node.value);
            }
            Stmt::AnnAssign(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.annotation);
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            Stmt::TypeAlias(node) => {
                self.visit_expr(&node.value);
            }
            Stmt::Return(node) => {
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Delete(node) => {
                for target in &node.targets {
                    self.visit_expr(target);
                }
            }
            Stmt::Raise(node) => {
                if let Some(exc) = &node.exc {
                    self.visit_expr(exc);
                }
                if let Some(cause) = &node.cause {
                    self.visit_expr(cause);
                }
            }
            Stmt::Assert(node) => {
                self.visit_expr(&node.test);
                if let Some(msg) = &node.msg {
                    self.visit_expr(msg);
                }
            }
            Stmt::Expr(node) => {
                self.visit_expr(&node.value);
            }
            // Pass, Break, Continue, Global, Nonlocal and other leaf kinds
            // only contribute to the code flag.
            _ => {}
        }
    }

    /// Visits an expression and everything below it.
    pub fn visit_expr(&mut self, expr: &Expr) {
        self.uses_code = true;

        match expr {
            Expr::StringLiteral(_) => {
                self.uses_str_literals = true;
            }
            Expr::Call(node) => {
                if let Expr::Name(func) = &*node.func {
                    if func.id.as_str() == "print" {
                        self.uses_print = true;
                    }
                }
                self.visit_expr(&node.func);
                for arg in &node.arguments.args {
                    self.visit_expr(arg);
                }
                for keyword in &node.arguments.keywords {
                    self.visit_expr(&keyword.value);
                }
            }
            Expr::BinOp(node) => {
                if matches!(node.op, Operator::Div) {
                    self.uses_division = true;
                }
                self.visit_expr(&node.left);
                self.visit_expr(&node.right);
            }
            Expr::Yield(node) => {
                self.uses_generators = true;
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            Expr::YieldFrom(node) => {
                self.uses_generators = true;
                self.visit_expr(&node.value);
            }
            Expr::UnaryOp(node) => self.visit_expr(&node.operand),
            Expr::BoolOp(node) => {
                for value in &node.values {
                    self.visit_expr(value);
                }
            }
            Expr::Named(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.value);
            }
            Expr::Compare(node) => {
                self.visit_expr(&node.left);
                for comparator in &node.comparators {
                    self.visit_expr(comparator);
                }
            }
            Expr::If(node) => {
                self.visit_expr(&node.test);
                self.visit_expr(&node.body);
                self.visit_expr(&node.orelse);
            }
            Expr::Lambda(node) => {
                if let Some(parameters) = &node.parameters {
                    self.visit_parameters(parameters);
                }
                self.visit_expr(&node.body);
            }
            Expr::List(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Tuple(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Set(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Dict(node) => {
                for item in &node.items {
                    if let Some(key) = &item.key {
                        self.visit_expr(key);
                    }
                    self.visit_expr(&item.value);
                }
            }
            Expr::ListComp(node) => {
                self.visit_comprehensions(&node.generators);
                self.visit_expr(&node.elt);
            }
            Expr::SetComp(node) => {
                self.visit_comprehensions(&node.generators);
                self.visit_expr(&node.elt);
            }
            Expr::DictComp(node) => {
                self.visit_comprehensions(&node.generators);
                if let Some(key) = &node.key {
                    self.visit_expr(key);
                }
                self.visit_expr(&node.value);
            }
            Expr::Generator(node) => {
                self.visit_comprehensions(&node.generators);
                self.visit_expr(&node.elt);
            }
            Expr::Await(node) => self.visit_expr(&node.value),
            Expr::Attribute(node) => self.visit_expr(&node.value),
            Expr::Subscript(node) => {
                self.visit_expr(&node.value);
                self.visit_expr(&node.slice);
            }
            Expr::Starred(node) => self.visit_expr(&node.value),
            Expr::Slice(node) => {
                if let Some(lower) = &node.lower {
                    self.visit_expr(lower);
                }
                if let Some(upper) = &node.upper {
                    self.visit_expr(upper);
                }
                if let Some(step) = &node.step {
                    self.visit_expr(step);
                }
            }
            Expr::FString(node) => {
                for part in &node.value {
                    if let ruff_python_ast::FStringPart::FString(f) = part {
                        for element in &f.elements {
                            if let ruff_python_ast::InterpolatedStringElement::Interpolation(
                                interp,
                            ) = element
                            {
                                self.visit_expr(&interp.expression);
                            }
                        }
                    }
                }
            }
            // Name and the remaining literal kinds are leaves.
            _ => {}
        }
    }

    fn visit_comprehensions(&mut self, generators: &[ruff_python_ast::Comprehension]) {
        for generator in generators {
            self.visit_expr(&generator.target);
            self.visit_expr(&generator.iter);
            for condition in &generator.ifs {
                self.visit_expr(condition);
            }
        }
    }

    fn visit_parameters(&mut self, parameters: &Parameters) {
        for parameter in parameters
            .posonlyargs
            .iter()
            .chain(&parameters.args)
            .chain(&parameters.kwonlyargs)
        {
            if let Some(annotation) = &parameter.parameter.annotation {
                self.visit_expr(annotation);
            }
            if let Some(default) = &parameter.default {
                self.visit_expr(default);
            }
        }
        if let Some(vararg) = &parameters.vararg {
            if let Some(annotation) = &vararg.annotation {
                self.visit_expr(annotation);
            }
        }
        if let Some(kwarg) = &parameters.kwarg {
            if let Some(annotation) = &kwarg.annotation {
                self.visit_expr(annotation);
            }
        }
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::MatchValue(node) => self.visit_expr(&node.value),
            Pattern::MatchSequence(node) => {
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
            Pattern::MatchMapping(node) => {
                for key in &node.keys {
                    self.visit_expr(key);
                }
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
            Pattern::MatchClass(node) => {
                self.visit_expr(&node.cls);
                for p in &node.arguments.patterns {
                    self.visit_pattern(p);
                }
                for keyword in &node.arguments.keywords {
                    self.visit_pattern(&keyword.pattern);
                }
            }
            Pattern::MatchAs(node) => {
                if let Some(p) = &node.pattern {
                    self.visit_pattern(p);
                }
            }
            Pattern::MatchOr(node) => {
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
            Pattern::MatchSingleton(_) | Pattern::MatchStar(_) => {}
        }
    }
}
