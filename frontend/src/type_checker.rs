use log::{debug, trace, warn};

use crate::ast::*;
use crate::symbol_table::{ScopeChain, Symbol, SymbolTable};
use crate::type_decl::TypeDecl;
use crate::visitor::{Acceptable, AstVisitor};

pub mod builtin;
pub mod context;
pub mod error;
pub mod expression;
pub mod generics;
pub mod method;
pub mod statement;
#[cfg(test)]
mod tests;

pub use context::{AnalysisContext, ContextKind, ContextMark, MethodContext};
pub use error::{AssignTarget, ConditionKind, SemanticError, SemanticErrorKind};

/// Scoping, typing and control-flow validation over a parsed [`Program`].
///
/// By default every statement is checked in isolation: an error is recorded,
/// the scope and context stacks are unwound to where the statement began, and
/// analysis moves on to the next statement. With `fail_fast` the first error
/// ends the run.
pub struct SemanticAnalyzer {
    pub(crate) scopes: ScopeChain,
    pub(crate) context: AnalysisContext,
    errors: Vec<SemanticError>,
    fail_fast: bool,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            scopes: ScopeChain::new(builtin::builtin_global_scope()),
            context: AnalysisContext::new(),
            errors: Vec::new(),
            fail_fast: false,
        }
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Checks the whole program, returning every error found in discovery
    /// order (at most one with `fail_fast`).
    pub fn analyze(&mut self, program: &Program) -> Result<(), Vec<SemanticError>> {
        self.scopes = ScopeChain::new(builtin::builtin_global_scope());
        self.context = AnalysisContext::new();
        self.errors.clear();
        debug!("analyzing {} class(es), fail_fast={}", program.classes.len(), self.fail_fast);

        let outcome = self.check_program(program);
        let mut errors = std::mem::take(&mut self.errors);
        if let Err(err) = outcome {
            errors.push(err);
        }

        if errors.is_empty() {
            debug!("analysis succeeded");
            Ok(())
        } else {
            debug!("analysis found {} error(s)", errors.len());
            Err(errors)
        }
    }

    /// The global scope as left by the last [`analyze`](Self::analyze) run.
    pub fn global_scope(&self) -> &SymbolTable {
        self.scopes.global()
    }

    fn check_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        let classes = self.declare_classes(program)?;
        let mut plans = Vec::with_capacity(classes.len());
        for class in classes {
            plans.push((class, self.declare_members(class)?));
        }
        for (class, members) in &plans {
            self.check_class_bodies(class, members)?;
        }
        Ok(())
    }

    /// Keeps `err` for the final report, or hands it back when failing fast.
    pub(crate) fn record(&mut self, err: SemanticError) -> Result<(), SemanticError> {
        if self.fail_fast {
            return Err(err);
        }
        warn!("{}", err);
        self.errors.push(err);
        Ok(())
    }

    pub(crate) fn mark(&self) -> ContextMark {
        self.context.mark(self.scopes.depth())
    }

    /// Unwinds to `mark` after a failed construct and records the error.
    pub(crate) fn recover(&mut self, mark: ContextMark, err: SemanticError) -> Result<(), SemanticError> {
        self.scopes.truncate(mark.scope_depth);
        self.context.restore(mark);
        self.record(err)
    }

    /// Maps a written type to a [`TypeDecl`]. Names resolve in the global
    /// scope only; generic classes become instances over their resolved
    /// arguments (none for raw or diamond uses).
    pub(crate) fn resolve_type(&self, ty: &TypeRef, line: Line) -> Result<TypeDecl, SemanticError> {
        if ty.dimensions > 0 {
            let element = TypeRef {
                dimensions: 0,
                ..ty.clone()
            };
            return Ok(TypeDecl::array(self.resolve_type(&element, line)?, ty.dimensions));
        }
        if let Some(primitive) = builtin::primitive_type(&ty.name) {
            return Ok(primitive);
        }

        let class = self
            .scopes
            .global()
            .resolve_locally(&ty.name)
            .and_then(Symbol::as_class)
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::UnknownType { name: ty.name.clone() }, line))?;

        if class.is_generic() {
            let args = ty
                .args
                .iter()
                .map(|arg| self.resolve_type(arg, line))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TypeDecl::generic(TypeDecl::class(&ty.name), args));
        }
        Ok(TypeDecl::class(&ty.name))
    }

    /// Checks an expression whose value lands in a slot of type `expected`;
    /// `new C<>()` takes its type arguments from that slot.
    pub(crate) fn check_expr_expecting(&mut self, expr: &Expr, expected: &TypeDecl) -> Result<TypeDecl, SemanticError> {
        if let ExprKind::New {
            ty,
            size: None,
            diamond: true,
        } = &expr.kind
        {
            let created = self.check_new(ty, None, expr.line)?;
            if expected.is_generic_instance() && created.generic_base() == expected.generic_base() {
                return Ok(expected.clone());
            }
            return Ok(created);
        }
        self.visit_expr(expr)
    }

    /// Initializer of a variable or field. Brace initializers of array
    /// slots are checked element by element against the element type.
    pub(crate) fn check_initializer(
        &mut self,
        declared: &TypeDecl,
        init: &Expr,
        target: AssignTarget,
    ) -> Result<(), SemanticError> {
        if let (true, ExprKind::ArrayInit(elements)) = (declared.is_array(), &init.kind) {
            let expected = declared.element_type();
            for element in elements {
                let found = self.check_expr_expecting(element, &expected)?;
                if !is_compatible(&found, &expected) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ArrayElementMismatch {
                            expected: expected.clone(),
                            found,
                        },
                        element.line,
                    ));
                }
            }
            return Ok(());
        }

        let found = self.check_expr_expecting(init, declared)?;
        if !is_compatible(&found, declared) {
            return Err(SemanticError::new(
                SemanticErrorKind::CannotAssign {
                    from: found,
                    to: declared.clone(),
                    target,
                },
                init.line,
            ));
        }
        Ok(())
    }
}

/// Assignability as the analyzer applies it: the type rules plus the empty
/// array initializer fitting any array and `null` fitting any reference.
pub fn is_compatible(from: &TypeDecl, to: &TypeDecl) -> bool {
    if from.is_array() && to.is_array() && from.element_type().is_void() {
        return true;
    }
    if *from == TypeDecl::null() && (to.is_class() || to.is_array()) {
        return true;
    }
    from.is_assignable_to(to)
}

impl AstVisitor for SemanticAnalyzer {
    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<TypeDecl, SemanticError> {
        trace!("{} at line {}", stmt.kind.node_kind(), stmt.line);
        stmt.accept(self)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<TypeDecl, SemanticError> {
        expr.accept(self)
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) -> Result<TypeDecl, SemanticError> {
        self.check_var_decl(decl)
    }

    fn visit_block(&mut self, block: &Block) -> Result<TypeDecl, SemanticError> {
        self.check_block(block)
    }

    fn visit_if(&mut self, condition: &Expr, then_branch: &Block, else_branch: Option<&Block>) -> Result<TypeDecl, SemanticError> {
        self.check_if(condition, then_branch, else_branch)
    }

    fn visit_while(&mut self, condition: &Expr, body: &Block) -> Result<TypeDecl, SemanticError> {
        self.check_while(condition, body)
    }

    fn visit_do_while(&mut self, body: &Block, condition: &Expr) -> Result<TypeDecl, SemanticError> {
        self.check_do_while(body, condition)
    }

    fn visit_for(&mut self, init: Option<&Stmt>, condition: Option<&Expr>, update: Option<&Expr>, body: &Block) -> Result<TypeDecl, SemanticError> {
        self.check_for(init, condition, update, body)
    }

    fn visit_switch(&mut self, condition: &Expr, arms: &[SwitchArm], line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_switch(condition, arms, line)
    }

    fn visit_return(&mut self, value: Option<&Expr>, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_return(value, line)
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) -> Result<TypeDecl, SemanticError> {
        self.visit_expr(expr)?;
        Ok(TypeDecl::Void)
    }

    fn visit_break(&mut self, line: Line) -> Result<TypeDecl, SemanticError> {
        if !self.context.can_break() {
            return Err(SemanticError::new(SemanticErrorKind::BreakOutsideLoop, line));
        }
        Ok(TypeDecl::Void)
    }

    fn visit_continue(&mut self, line: Line) -> Result<TypeDecl, SemanticError> {
        if !self.context.can_continue() {
            return Err(SemanticError::new(SemanticErrorKind::ContinueOutsideLoop, line));
        }
        Ok(TypeDecl::Void)
    }

    fn visit_literal(&mut self, literal: &Literal) -> Result<TypeDecl, SemanticError> {
        Ok(self.check_literal(literal))
    }

    fn visit_variable(&mut self, name: &str, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_variable(name, line)
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_binary(op, left, right, line)
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_unary(op, operand, line)
    }

    fn visit_method_call(&mut self, receiver: Option<&Expr>, name: &str, args: &[Expr], line: Line) -> Result<TypeDecl, SemanticError> {
        match receiver {
            Some(receiver) => self.check_receiver_call(receiver, name, args, line),
            None => self.check_direct_call(name, args, line),
        }
    }

    fn visit_array_access(&mut self, array: &Expr, index: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_array_access(array, index, line)
    }

    fn visit_field_access(&mut self, object: &Expr, field: &str, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_field_access(object, field, line)
    }

    fn visit_new(&mut self, ty: &TypeRef, size: Option<&Expr>, _diamond: bool, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_new(ty, size, line)
    }

    fn visit_assignment(&mut self, target: &Expr, value: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_assignment(target, value, line)
    }

    fn visit_array_init(&mut self, elements: &[Expr], line: Line) -> Result<TypeDecl, SemanticError> {
        self.check_array_init(elements, line)
    }
}
