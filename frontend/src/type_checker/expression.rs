use crate::ast::*;
use crate::type_checker::{is_compatible, AssignTarget, SemanticAnalyzer, SemanticError, SemanticErrorKind};
use crate::type_decl::TypeDecl;
use crate::visitor::AstVisitor;

/// Widest of two numeric types: double over float over int.
fn numeric_result(left: &TypeDecl, right: &TypeDecl) -> TypeDecl {
    if left.is_assignable_to(right) {
        right.clone()
    } else {
        left.clone()
    }
}

/// Expression type checking implementation
impl SemanticAnalyzer {
    pub(crate) fn check_literal(&self, literal: &Literal) -> TypeDecl {
        match literal.value {
            LiteralValue::Int(_) => TypeDecl::INT,
            LiteralValue::Float(_) => TypeDecl::FLOAT,
            LiteralValue::Double(_) => TypeDecl::DOUBLE,
            LiteralValue::Boolean(_) => TypeDecl::BOOLEAN,
            LiteralValue::Char(_) => TypeDecl::CHAR,
            LiteralValue::Str(_) => TypeDecl::STRING,
            LiteralValue::Null => TypeDecl::null(),
        }
    }

    /// Class names are accepted as values so `System.out` and static
    /// member references type-check through their class.
    pub(crate) fn check_variable(&self, name: &str, line: Line) -> Result<TypeDecl, SemanticError> {
        match self.scopes.resolve(name) {
            None => Err(SemanticError::new(
                SemanticErrorKind::UndefinedVariable { name: name.to_string() },
                line,
            )),
            Some(symbol) if symbol.is_variable() || symbol.as_class().is_some() => Ok(symbol.ty.clone()),
            Some(_) => Err(SemanticError::new(
                SemanticErrorKind::NotAVariable { name: name.to_string() },
                line,
            )),
        }
    }

    pub(crate) fn check_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        let left_ty = self.visit_expr(left)?;
        let right_ty = self.visit_expr(right)?;
        let mismatch = |left_ty: TypeDecl, right_ty: TypeDecl| {
            SemanticError::new(
                SemanticErrorKind::BinaryOperandMismatch {
                    op: op.to_string(),
                    left: left_ty,
                    right: right_ty,
                },
                line,
            )
        };

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if op == BinaryOp::Add && (left_ty.is_string() || right_ty.is_string()) {
                    return Ok(TypeDecl::STRING);
                }
                if left_ty.is_numeric() && right_ty.is_numeric() {
                    return Ok(numeric_result(&left_ty, &right_ty));
                }
                Err(mismatch(left_ty, right_ty))
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if is_compatible(&left_ty, &right_ty) || is_compatible(&right_ty, &left_ty) {
                    return Ok(TypeDecl::BOOLEAN);
                }
                if left_ty.is_numeric() && right_ty.is_numeric() {
                    return Ok(TypeDecl::BOOLEAN);
                }
                Err(mismatch(left_ty, right_ty))
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                if left_ty.is_numeric() && right_ty.is_numeric() {
                    return Ok(TypeDecl::BOOLEAN);
                }
                Err(mismatch(left_ty, right_ty))
            }
            BinaryOp::And | BinaryOp::Or => {
                if left_ty.is_boolean() && right_ty.is_boolean() {
                    return Ok(TypeDecl::BOOLEAN);
                }
                Err(mismatch(left_ty, right_ty))
            }
            BinaryOp::AddAssign | BinaryOp::SubAssign | BinaryOp::MulAssign | BinaryOp::DivAssign | BinaryOp::ModAssign => {
                if !left.is_lvalue() {
                    return Err(SemanticError::new(SemanticErrorKind::NotAssignable, line));
                }
                let result = Self::compound_result(op, &left_ty, &right_ty, line)?;
                if !result.is_assignable_to(&left_ty) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::CompoundMismatch {
                            op: op.to_string(),
                            left: left_ty,
                            right: right_ty,
                        },
                        line,
                    ));
                }
                Ok(left_ty)
            }
        }
    }

    /// Type of `left op right` for the arithmetic half of a compound assignment.
    fn compound_result(op: BinaryOp, left: &TypeDecl, right: &TypeDecl, line: Line) -> Result<TypeDecl, SemanticError> {
        if op == BinaryOp::AddAssign && (left.is_string() || right.is_string()) {
            return Ok(TypeDecl::STRING);
        }
        if left.is_numeric() && right.is_numeric() {
            return Ok(numeric_result(left, right));
        }
        Err(SemanticError::new(SemanticErrorKind::InvalidOperation, line))
    }

    pub(crate) fn check_unary(&mut self, op: UnaryOp, operand: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        let operand_ty = self.visit_expr(operand)?;
        let accepted = match op {
            UnaryOp::Not => operand_ty.is_boolean(),
            UnaryOp::Neg | UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                operand_ty.is_numeric()
            }
        };
        if !accepted {
            return Err(SemanticError::new(
                SemanticErrorKind::UnaryOperandMismatch {
                    op: op.symbol().to_string(),
                    operand: operand_ty,
                },
                line,
            ));
        }
        Ok(operand_ty)
    }

    pub(crate) fn check_array_access(&mut self, array: &Expr, index: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        let array_ty = self.visit_expr(array)?;
        if !array_ty.is_array() {
            return Err(SemanticError::new(SemanticErrorKind::NonArrayAccess { found: None }, line));
        }
        let index_ty = self.visit_expr(index)?;
        if !index_ty.is_int() {
            return Err(SemanticError::new(SemanticErrorKind::NonNumericIndex { found: None }, index.line));
        }
        Ok(array_ty.element_type())
    }

    /// `.length` on arrays, otherwise a member of the object's class.
    pub(crate) fn check_field_access(&mut self, object: &Expr, field: &str, line: Line) -> Result<TypeDecl, SemanticError> {
        let object_ty = self.visit_expr(object)?;
        if object_ty.is_array() && field == "length" {
            return Ok(TypeDecl::INT);
        }
        self.lookup_field(&object_ty, object.line, field, line)
    }

    fn lookup_field(&self, object_ty: &TypeDecl, object_line: Line, field: &str, line: Line) -> Result<TypeDecl, SemanticError> {
        let class_name = match object_ty.class_name() {
            Some(name) if object_ty.is_class() => name,
            _ => {
                return Err(SemanticError::new(
                    SemanticErrorKind::FieldOnNonClass {
                        found: object_ty.clone(),
                    },
                    object_line,
                ));
            }
        };
        let class = self.scopes.class(class_name).ok_or_else(|| {
            SemanticError::new(
                SemanticErrorKind::ClassNotFound {
                    name: class_name.to_string(),
                },
                line,
            )
        })?;
        class
            .members
            .resolve_locally(field)
            .map(|symbol| symbol.ty.clone())
            .ok_or_else(|| {
                SemanticError::new(
                    SemanticErrorKind::FieldNotFound {
                        field: field.to_string(),
                        class: object_ty.to_string(),
                    },
                    line,
                )
            })
    }

    pub(crate) fn check_assignment(&mut self, target: &Expr, value: &Expr, line: Line) -> Result<TypeDecl, SemanticError> {
        let target_ty = self.check_assignment_target(target)?;
        let value_ty = self.check_expr_expecting(value, &target_ty)?;
        if !is_compatible(&value_ty, &target_ty) {
            return Err(SemanticError::new(
                SemanticErrorKind::CannotAssign {
                    from: value_ty,
                    to: target_ty,
                    target: AssignTarget::Variable,
                },
                line,
            ));
        }
        Ok(target_ty)
    }

    /// Type of the slot written by an assignment. Messages on this path name
    /// the offending types.
    fn check_assignment_target(&mut self, target: &Expr) -> Result<TypeDecl, SemanticError> {
        match &target.kind {
            ExprKind::Variable(name) => match self.scopes.resolve(name) {
                None => Err(SemanticError::new(
                    SemanticErrorKind::UndefinedVariable { name: name.clone() },
                    target.line,
                )),
                Some(symbol) if symbol.is_variable() => Ok(symbol.ty.clone()),
                Some(_) => Err(SemanticError::new(
                    SemanticErrorKind::NotAVariable { name: name.clone() },
                    target.line,
                )),
            },
            ExprKind::ArrayAccess { array, index } => {
                let array_ty = self.visit_expr(array)?;
                let index_ty = self.visit_expr(index)?;
                if !array_ty.is_array() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::NonArrayAccess { found: Some(array_ty) },
                        array.line,
                    ));
                }
                if !index_ty.is_numeric() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::NonNumericIndex { found: Some(index_ty) },
                        index.line,
                    ));
                }
                Ok(array_ty.element_type())
            }
            ExprKind::FieldAccess { object, field } => {
                let object_ty = self.visit_expr(object)?;
                self.lookup_field(&object_ty, object.line, field, target.line)
            }
            _ => Err(SemanticError::new(SemanticErrorKind::InvalidAssignmentTarget, target.line)),
        }
    }

    /// `new T[size]` yields the array type written in `ty`; otherwise `ty`
    /// must name a class.
    pub(crate) fn check_new(&mut self, ty: &TypeRef, size: Option<&Expr>, line: Line) -> Result<TypeDecl, SemanticError> {
        if let Some(size) = size {
            let size_ty = self.visit_expr(size)?;
            if !size_ty.is_int() {
                return Err(SemanticError::new(
                    SemanticErrorKind::ArraySizeNotInt { found: size_ty },
                    size.line,
                ));
            }
            return self.resolve_type(ty, line);
        }

        let created = self.resolve_type(ty, line)?;
        let Some(class_name) = created.class_name().filter(|_| created.is_class()) else {
            return Err(SemanticError::new(
                SemanticErrorKind::NewNonClass { name: ty.to_string() },
                line,
            ));
        };
        if self.scopes.class(class_name).is_none() {
            return Err(SemanticError::new(
                SemanticErrorKind::ClassNotFound { name: ty.name.clone() },
                line,
            ));
        }
        Ok(created)
    }

    /// The first element fixes the element type; `{}` has element type void.
    pub(crate) fn check_array_init(&mut self, elements: &[Expr], line: Line) -> Result<TypeDecl, SemanticError> {
        let Some((first, rest)) = elements.split_first() else {
            return Ok(TypeDecl::array(TypeDecl::Void, 1));
        };
        let element_ty = self.visit_expr(first)?;
        for element in rest {
            let found = self.visit_expr(element)?;
            if !is_compatible(&found, &element_ty) {
                return Err(SemanticError::new(SemanticErrorKind::InconsistentArrayElements, line));
            }
        }
        Ok(TypeDecl::array(element_ty, 1))
    }
}
