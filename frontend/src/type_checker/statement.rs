use std::collections::HashSet;

use crate::ast::*;
use crate::symbol_table::Symbol;
use crate::type_checker::{is_compatible, AssignTarget, ConditionKind, ContextKind, SemanticAnalyzer, SemanticError, SemanticErrorKind};
use crate::type_decl::TypeDecl;
use crate::visitor::AstVisitor;

/// Statement checking
impl SemanticAnalyzer {
    /// Checks statements one by one, recovering after each failed one.
    pub(crate) fn check_statements(&mut self, stmts: &[Stmt]) -> Result<(), SemanticError> {
        for stmt in stmts {
            let mark = self.mark();
            if let Err(err) = self.visit_stmt(stmt) {
                self.recover(mark, err)?;
            }
        }
        Ok(())
    }

    pub(crate) fn check_block(&mut self, block: &Block) -> Result<TypeDecl, SemanticError> {
        self.scopes.push_scope();
        self.check_statements(&block.stmts)?;
        self.scopes.pop_scope();
        Ok(TypeDecl::Void)
    }

    /// The variable is bound before its initializer is checked.
    pub(crate) fn check_var_decl(&mut self, decl: &VarDecl) -> Result<TypeDecl, SemanticError> {
        let ty = self.resolve_type(&decl.ty, decl.line)?;
        if self.scopes.resolve_locally(&decl.name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::VariableRedefined { name: decl.name.clone() },
                decl.line,
            ));
        }
        self.scopes.define(Symbol::variable(&decl.name, ty.clone()));

        if let Some(init) = &decl.init {
            self.check_initializer(&ty, init, AssignTarget::Variable)?;
        }
        Ok(TypeDecl::Void)
    }

    fn check_condition(&mut self, condition: &Expr, construct: ConditionKind) -> Result<(), SemanticError> {
        let found = self.visit_expr(condition)?;
        if !found.is_boolean() {
            return Err(SemanticError::new(
                SemanticErrorKind::NonBooleanCondition { construct, found },
                condition.line,
            ));
        }
        Ok(())
    }

    pub(crate) fn check_if(
        &mut self,
        condition: &Expr,
        then_branch: &Block,
        else_branch: Option<&Block>,
    ) -> Result<TypeDecl, SemanticError> {
        self.check_condition(condition, ConditionKind::If)?;
        self.check_block(then_branch)?;
        if let Some(else_branch) = else_branch {
            self.check_block(else_branch)?;
        }
        Ok(TypeDecl::Void)
    }

    pub(crate) fn check_while(&mut self, condition: &Expr, body: &Block) -> Result<TypeDecl, SemanticError> {
        self.check_condition(condition, ConditionKind::While)?;
        self.check_loop_body(body)
    }

    /// Same condition rule and wording as `while`.
    pub(crate) fn check_do_while(&mut self, body: &Block, condition: &Expr) -> Result<TypeDecl, SemanticError> {
        self.check_condition(condition, ConditionKind::While)?;
        self.check_loop_body(body)
    }

    fn check_loop_body(&mut self, body: &Block) -> Result<TypeDecl, SemanticError> {
        self.context.push(ContextKind::Loop);
        self.check_block(body)?;
        self.context.pop();
        Ok(TypeDecl::Void)
    }

    /// Clauses share one scope wrapping the loop; only the body runs in loop
    /// context.
    pub(crate) fn check_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Block,
    ) -> Result<TypeDecl, SemanticError> {
        self.scopes.push_scope();
        if let Some(init) = init {
            self.visit_stmt(init)?;
        }
        if let Some(condition) = condition {
            self.check_condition(condition, ConditionKind::For)?;
        }
        if let Some(update) = update {
            self.visit_expr(update)?;
        }
        self.check_loop_body(body)?;
        self.scopes.pop_scope();
        Ok(TypeDecl::Void)
    }

    pub(crate) fn check_switch(&mut self, condition: &Expr, arms: &[SwitchArm], line: Line) -> Result<TypeDecl, SemanticError> {
        let switch_type = self.visit_expr(condition)?;
        if !switch_type.is_int() && !switch_type.is_char() {
            return Err(SemanticError::new(SemanticErrorKind::InvalidSwitchType, line));
        }

        self.context.push_switch(switch_type.clone());
        let mut seen = HashSet::new();
        let mut has_default = false;
        for arm in arms {
            let mark = self.mark();
            if let Err(err) = self.check_switch_arm(arm, &switch_type, &mut seen, &mut has_default) {
                self.recover(mark, err)?;
            }
        }
        self.context.pop_switch();
        Ok(TypeDecl::Void)
    }

    /// Case values are compared by their literal text.
    fn check_switch_arm(
        &mut self,
        arm: &SwitchArm,
        switch_type: &TypeDecl,
        seen: &mut HashSet<String>,
        has_default: &mut bool,
    ) -> Result<(), SemanticError> {
        match arm {
            SwitchArm::Case { value, body, line } => {
                let case_type = self.visit_expr(value)?;
                if !is_compatible(&case_type, switch_type) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::IncompatibleCase {
                            case: case_type,
                            switch: switch_type.clone(),
                        },
                        *line,
                    ));
                }
                self.check_block(body)?;

                if let ExprKind::Literal(literal) = &value.kind {
                    if !seen.insert(literal.text.clone()) {
                        return Err(SemanticError::new(
                            SemanticErrorKind::DuplicateCase {
                                value: literal.text.clone(),
                            },
                            *line,
                        ));
                    }
                }
            }
            SwitchArm::Default { body, line } => {
                if *has_default {
                    return Err(SemanticError::new(SemanticErrorKind::MultipleDefaults, *line));
                }
                *has_default = true;
                self.check_block(body)?;
            }
        }
        Ok(())
    }

    pub(crate) fn check_return(&mut self, value: Option<&Expr>, line: Line) -> Result<TypeDecl, SemanticError> {
        let expected = self
            .context
            .method
            .as_ref()
            .map_or(TypeDecl::Void, |m| m.return_type.clone());

        match value {
            Some(expr) => {
                let found = self.check_expr_expecting(expr, &expected)?;
                if expected.is_void() {
                    return Err(SemanticError::new(SemanticErrorKind::ReturnValueFromVoid, expr.line));
                }
                if !is_compatible(&found, &expected) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ReturnTypeMismatch { found, expected },
                        expr.line,
                    ));
                }
            }
            None if !expected.is_void() => {
                return Err(SemanticError::new(SemanticErrorKind::MissingReturnValue { expected }, line));
            }
            None => {}
        }
        Ok(TypeDecl::Void)
    }
}
