use log::trace;

use crate::ast::*;
use crate::symbol_table::{ClassSymbol, Symbol};
use crate::type_checker::generics::{bindings_for, substitute};
use crate::type_checker::{is_compatible, AssignTarget, MethodContext, SemanticAnalyzer, SemanticError, SemanticErrorKind};
use crate::type_decl::TypeDecl;
use crate::visitor::AstVisitor;

/// A class member whose declaration resolved, queued for body checking.
#[derive(Debug)]
pub enum MemberPlan<'p> {
    Field {
        decl: &'p FieldDecl,
        ty: TypeDecl,
    },
    Method {
        decl: &'p MethodDecl,
        return_type: TypeDecl,
        params: Vec<(String, TypeDecl)>,
    },
}

/// Conservative structural check: a return statement, a nested block that
/// has one, or an `if` whose branches both have one. Loops and switches
/// never count.
pub fn has_return_statement(block: &Block) -> bool {
    block.stmts.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Block(inner) => has_return_statement(inner),
        StmtKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => has_return_statement(then_branch) && has_return_statement(else_branch),
        _ => false,
    })
}

/// Class and method level processing: the declaration passes, method
/// bodies and call checking.
impl SemanticAnalyzer {
    /// First pass: binds every class name so members may refer to classes
    /// declared later in the file.
    pub(crate) fn declare_classes<'p>(&mut self, program: &'p Program) -> Result<Vec<&'p ClassDecl>, SemanticError> {
        let mut declared = Vec::new();
        for class in &program.classes {
            if self.scopes.global().resolve_locally(&class.name).is_some() {
                self.record(SemanticError::new(
                    SemanticErrorKind::ClassRedefined { name: class.name.clone() },
                    class.line,
                ))?;
                continue;
            }
            self.scopes.global_mut().define(Symbol::class(&class.name, ClassSymbol::new()));
            declared.push(class);
        }
        Ok(declared)
    }

    /// Second pass: field types and method signatures, so bodies may use
    /// members declared after them.
    pub(crate) fn declare_members<'p>(&mut self, class: &'p ClassDecl) -> Result<Vec<MemberPlan<'p>>, SemanticError> {
        let mut plans = Vec::new();
        for member in &class.members {
            let declared = match member {
                Member::Field(field) => self
                    .declare_field(&class.name, field)
                    .map(|ty| MemberPlan::Field { decl: field, ty }),
                Member::Method(method) => self
                    .declare_method(&class.name, method)
                    .map(|(return_type, params)| MemberPlan::Method {
                        decl: method,
                        return_type,
                        params,
                    }),
            };
            match declared {
                Ok(plan) => plans.push(plan),
                Err(err) => self.record(err)?,
            }
        }
        Ok(plans)
    }

    fn member_exists(&self, class: &str, name: &str) -> bool {
        self.scopes
            .class(class)
            .is_some_and(|c| c.members.resolve_locally(name).is_some())
    }

    fn define_member(&mut self, class: &str, symbol: Symbol, line: Line) -> Result<(), SemanticError> {
        match self.scopes.define_member(class, symbol) {
            Some(_) => Ok(()),
            None => Err(SemanticError::new(
                SemanticErrorKind::ClassNotFound { name: class.to_string() },
                line,
            )),
        }
    }

    fn declare_field(&mut self, class: &str, field: &FieldDecl) -> Result<TypeDecl, SemanticError> {
        let ty = self.resolve_type(&field.ty, field.line)?;
        if self.member_exists(class, &field.name) {
            return Err(SemanticError::new(
                SemanticErrorKind::FieldRedefined { name: field.name.clone() },
                field.line,
            ));
        }
        self.define_member(class, Symbol::variable(&field.name, ty.clone()), field.line)?;
        Ok(ty)
    }

    fn declare_method(&mut self, class: &str, method: &MethodDecl) -> Result<(TypeDecl, Vec<(String, TypeDecl)>), SemanticError> {
        let return_type = self.resolve_type(&method.return_type, method.line)?;
        let params = method
            .params
            .iter()
            .map(|p| Ok((p.name.clone(), self.resolve_type(&p.ty, p.line)?)))
            .collect::<Result<Vec<_>, SemanticError>>()?;

        if self.member_exists(class, &method.name) {
            return Err(SemanticError::new(
                SemanticErrorKind::MethodRedefined {
                    method: method.name.clone(),
                    class: class.to_string(),
                },
                method.line,
            ));
        }

        let symbol = if method.is_static {
            Symbol::function(&method.name, return_type.clone(), params.clone())
        } else {
            Symbol::method(&method.name, return_type.clone(), params.clone())
        };
        self.define_member(class, symbol, method.line)?;
        Ok((return_type, params))
    }

    /// Third pass: field initializers and method bodies in source order.
    pub(crate) fn check_class_bodies(&mut self, class: &ClassDecl, members: &[MemberPlan]) -> Result<(), SemanticError> {
        trace!("checking class {}", class.name);
        self.scopes.enter_class(&class.name);
        for member in members {
            let mark = self.mark();
            let checked = match member {
                MemberPlan::Field { decl, ty } => match &decl.init {
                    Some(init) => self.check_initializer(ty, init, AssignTarget::Field),
                    None => Ok(()),
                },
                MemberPlan::Method {
                    decl,
                    return_type,
                    params,
                } => self.check_method_body(decl, return_type, params),
            };
            if let Err(err) = checked {
                self.context.method = None;
                self.recover(mark, err)?;
            }
        }
        self.scopes.leave_class();
        Ok(())
    }

    /// Parameters live in a scope of their own around the body block.
    fn check_method_body(
        &mut self,
        method: &MethodDecl,
        return_type: &TypeDecl,
        params: &[(String, TypeDecl)],
    ) -> Result<(), SemanticError> {
        trace!("checking method {} at line {}", method.name, method.line);
        self.context.method = Some(MethodContext {
            name: method.name.clone(),
            return_type: return_type.clone(),
        });

        self.scopes.push_scope();
        for (param, (name, ty)) in method.params.iter().zip(params) {
            if self.scopes.resolve_locally(name).is_some() {
                return Err(SemanticError::new(
                    SemanticErrorKind::VariableRedefined { name: name.clone() },
                    param.line,
                ));
            }
            self.scopes.define(Symbol::variable(name, ty.clone()));
        }
        self.visit_block(&method.body)?;
        self.scopes.pop_scope();
        self.context.method = None;

        if !return_type.is_void() && !has_return_statement(&method.body) {
            return Err(SemanticError::new(
                SemanticErrorKind::MissingReturn {
                    method: method.name.clone(),
                },
                method.line,
            ));
        }
        Ok(())
    }

    /// `receiver.name(args)`. The receiver's class supplies the method and,
    /// for generic instances, the bindings applied to its signature.
    pub(crate) fn check_receiver_call(&mut self, receiver: &Expr, name: &str, args: &[Expr], line: Line) -> Result<TypeDecl, SemanticError> {
        let receiver_ty = self.visit_expr(receiver)?;

        if receiver_ty == TypeDecl::class("PrintStream") && (name == "println" || name == "print") {
            if args.len() > 1 {
                return Err(SemanticError::new(SemanticErrorKind::PrintArity, line));
            }
            for arg in args {
                self.visit_expr(arg)?;
            }
            return Ok(TypeDecl::Void);
        }

        let class_not_found = || {
            SemanticError::new(
                SemanticErrorKind::ReceiverClassNotFound {
                    name: receiver_ty.to_string(),
                },
                line,
            )
        };
        let class = receiver_ty
            .class_name()
            .and_then(|n| self.scopes.class(n))
            .ok_or_else(class_not_found)?;
        let bindings = bindings_for(class, &receiver_ty);
        let (return_type, params) = class
            .members
            .resolve_locally(name)
            .and_then(|symbol| symbol.as_function().map(|f| (symbol.ty.clone(), f.params.clone())))
            .ok_or_else(|| {
                SemanticError::new(
                    SemanticErrorKind::ReceiverMethodNotFound {
                        method: name.to_string(),
                        class: receiver_ty.to_string(),
                    },
                    line,
                )
            })?;

        if params.len() != args.len() {
            return Err(SemanticError::new(
                SemanticErrorKind::ReceiverArity {
                    expected: params.len(),
                    found: args.len(),
                },
                line,
            ));
        }
        for ((_, param_ty), arg) in params.iter().zip(args) {
            let expected = substitute(param_ty, &bindings);
            let found = self.visit_expr(arg)?;
            if !is_compatible(&found, &expected) {
                return Err(SemanticError::new(
                    SemanticErrorKind::ParameterMismatch { expected, found },
                    arg.line,
                ));
            }
        }
        Ok(substitute(&return_type, &bindings))
    }

    /// `name(args)` against methods visible from the current class.
    pub(crate) fn check_direct_call(&mut self, name: &str, args: &[Expr], line: Line) -> Result<TypeDecl, SemanticError> {
        let arg_types = args
            .iter()
            .map(|arg| self.visit_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let symbol = self.scopes.resolve_member(name).cloned().ok_or_else(|| {
            SemanticError::new(SemanticErrorKind::UndefinedMethod { name: name.to_string() }, line)
        })?;
        let function = symbol
            .as_function()
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::NotAMethod { name: name.to_string() }, line))?;

        if function.params.len() != arg_types.len() {
            return Err(SemanticError::new(
                SemanticErrorKind::CallArity {
                    method: name.to_string(),
                    expected: function.params.len(),
                    found: arg_types.len(),
                },
                line,
            ));
        }
        for (i, (param_ty, (found, arg))) in function.param_types().zip(arg_types.iter().zip(args)).enumerate() {
            if !is_compatible(found, param_ty) {
                return Err(SemanticError::new(
                    SemanticErrorKind::ArgumentMismatch {
                        index: i + 1,
                        method: name.to_string(),
                    },
                    arg.line,
                ));
            }
        }
        Ok(symbol.ty.clone())
    }
}
