use crate::ast::*;
use crate::type_checker::SemanticError;
use crate::type_decl::TypeDecl;

/// Per-node-kind callbacks for a single typed walk over method bodies.
/// Statements yield `TypeDecl::Void`; expressions yield their static type.
pub trait AstVisitor {
    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<TypeDecl, SemanticError>;
    fn visit_expr(&mut self, expr: &Expr) -> Result<TypeDecl, SemanticError>;

    // Stmt variants
    fn visit_var_decl(&mut self, decl: &VarDecl) -> Result<TypeDecl, SemanticError>;
    fn visit_block(&mut self, block: &Block) -> Result<TypeDecl, SemanticError>;
    fn visit_if(&mut self, condition: &Expr, then_branch: &Block, else_branch: Option<&Block>) -> Result<TypeDecl, SemanticError>;
    fn visit_while(&mut self, condition: &Expr, body: &Block) -> Result<TypeDecl, SemanticError>;
    fn visit_do_while(&mut self, body: &Block, condition: &Expr) -> Result<TypeDecl, SemanticError>;
    fn visit_for(&mut self, init: Option<&Stmt>, condition: Option<&Expr>, update: Option<&Expr>, body: &Block) -> Result<TypeDecl, SemanticError>;
    fn visit_switch(&mut self, condition: &Expr, arms: &[SwitchArm], line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_return(&mut self, value: Option<&Expr>, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_expression_stmt(&mut self, expr: &Expr) -> Result<TypeDecl, SemanticError>;
    fn visit_break(&mut self, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_continue(&mut self, line: Line) -> Result<TypeDecl, SemanticError>;

    // Expr variants
    fn visit_literal(&mut self, literal: &Literal) -> Result<TypeDecl, SemanticError>;
    fn visit_variable(&mut self, name: &str, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_method_call(&mut self, receiver: Option<&Expr>, name: &str, args: &[Expr], line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_array_access(&mut self, array: &Expr, index: &Expr, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_field_access(&mut self, object: &Expr, field: &str, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_new(&mut self, ty: &TypeRef, size: Option<&Expr>, diamond: bool, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_assignment(&mut self, target: &Expr, value: &Expr, line: Line) -> Result<TypeDecl, SemanticError>;
    fn visit_array_init(&mut self, elements: &[Expr], line: Line) -> Result<TypeDecl, SemanticError>;
}

/// Double dispatch from a node to the matching [`AstVisitor`] callback.
pub trait Acceptable {
    fn accept(&self, visitor: &mut dyn AstVisitor) -> Result<TypeDecl, SemanticError>;
}

impl Acceptable for Stmt {
    fn accept(&self, visitor: &mut dyn AstVisitor) -> Result<TypeDecl, SemanticError> {
        match &self.kind {
            StmtKind::VarDecl(decl) => visitor.visit_var_decl(decl),
            StmtKind::Block(block) => visitor.visit_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_if(condition, then_branch, else_branch.as_ref()),
            StmtKind::While { condition, body } => visitor.visit_while(condition, body),
            StmtKind::DoWhile { body, condition } => visitor.visit_do_while(body, condition),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => visitor.visit_for(init.as_deref(), condition.as_ref(), update.as_ref(), body),
            StmtKind::Switch { condition, arms } => visitor.visit_switch(condition, arms, self.line),
            StmtKind::Return(value) => visitor.visit_return(value.as_ref(), self.line),
            StmtKind::Expression(expr) => visitor.visit_expression_stmt(expr),
            StmtKind::Break => visitor.visit_break(self.line),
            StmtKind::Continue => visitor.visit_continue(self.line),
        }
    }
}

impl Acceptable for Expr {
    fn accept(&self, visitor: &mut dyn AstVisitor) -> Result<TypeDecl, SemanticError> {
        let line = self.line;
        match &self.kind {
            ExprKind::Literal(literal) => visitor.visit_literal(literal),
            ExprKind::Variable(name) => visitor.visit_variable(name, line),
            ExprKind::Binary { op, left, right } => visitor.visit_binary(*op, left, right, line),
            ExprKind::Unary { op, operand } => visitor.visit_unary(*op, operand, line),
            ExprKind::MethodCall { receiver, name, args } => {
                visitor.visit_method_call(receiver.as_deref(), name, args, line)
            }
            ExprKind::ArrayAccess { array, index } => visitor.visit_array_access(array, index, line),
            ExprKind::FieldAccess { object, field } => visitor.visit_field_access(object, field, line),
            ExprKind::New { ty, size, diamond } => visitor.visit_new(ty, size.as_deref(), *diamond, line),
            ExprKind::Assignment { target, value } => visitor.visit_assignment(target, value, line),
            ExprKind::ArrayInit(elements) => visitor.visit_array_init(elements, line),
        }
    }
}
