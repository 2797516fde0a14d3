use std::fmt;

use crate::ast::Line;
use crate::type_decl::TypeDecl;

/// Where an assignment or initializer check was made; only changes the
/// wording of the mismatch message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTarget {
    Variable,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    If,
    While,
    For,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticErrorKind {
    UnknownType { name: String },
    ClassRedefined { name: String },
    MethodRedefined { method: String, class: String },
    FieldRedefined { name: String },
    VariableRedefined { name: String },
    MissingReturn { method: String },
    CannotAssign { from: TypeDecl, to: TypeDecl, target: AssignTarget },
    ArrayElementMismatch { expected: TypeDecl, found: TypeDecl },
    InconsistentArrayElements,
    NonBooleanCondition { construct: ConditionKind, found: TypeDecl },
    InvalidSwitchType,
    DuplicateCase { value: String },
    MultipleDefaults,
    IncompatibleCase { case: TypeDecl, switch: TypeDecl },
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnValueFromVoid,
    ReturnTypeMismatch { found: TypeDecl, expected: TypeDecl },
    MissingReturnValue { expected: TypeDecl },
    UndefinedVariable { name: String },
    NotAVariable { name: String },
    InvalidAssignmentTarget,
    /// `found` is only reported on the assignment-target path.
    NonArrayAccess { found: Option<TypeDecl> },
    NonNumericIndex { found: Option<TypeDecl> },
    FieldOnNonClass { found: TypeDecl },
    ClassNotFound { name: String },
    FieldNotFound { field: String, class: String },
    BinaryOperandMismatch { op: String, left: TypeDecl, right: TypeDecl },
    NotAssignable,
    CompoundMismatch { op: String, left: TypeDecl, right: TypeDecl },
    InvalidOperation,
    UnaryOperandMismatch { op: String, operand: TypeDecl },
    ReceiverClassNotFound { name: String },
    ReceiverMethodNotFound { method: String, class: String },
    ReceiverArity { expected: usize, found: usize },
    ParameterMismatch { expected: TypeDecl, found: TypeDecl },
    PrintArity,
    UndefinedMethod { name: String },
    NotAMethod { name: String },
    CallArity { method: String, expected: usize, found: usize },
    ArgumentMismatch { index: usize, method: String },
    ArraySizeNotInt { found: TypeDecl },
    NewNonClass { name: String },
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SemanticErrorKind::*;
        match self {
            UnknownType { name } => write!(f, "Unknown type: {}", name),
            ClassRedefined { name } => write!(f, "Class {} is already defined", name),
            MethodRedefined { method, class } => write!(f, "Method {} is already defined in class {}", method, class),
            FieldRedefined { name } => write!(f, "Field {} is already defined in this class", name),
            VariableRedefined { name } => write!(f, "Variable {} is already defined in this scope", name),
            MissingReturn { method } => write!(f, "Missing return statement in method {}", method),
            CannotAssign { from, to, target } => match target {
                AssignTarget::Variable => write!(f, "Cannot assign {} to variable of type {}", from, to),
                AssignTarget::Field => write!(f, "Cannot assign {} to field of type {}", from, to),
            },
            ArrayElementMismatch { expected, found } => {
                write!(f, "Array element type mismatch. Expected {}, got {}", expected, found)
            }
            InconsistentArrayElements => write!(f, "Inconsistent array element types"),
            NonBooleanCondition { construct, found } => {
                let name = match construct {
                    ConditionKind::If => "If",
                    ConditionKind::While => "While",
                    ConditionKind::For => "For",
                };
                write!(f, "{} condition must be boolean, found {}", name, found)
            }
            InvalidSwitchType => write!(f, "Switch condition must be integer or char"),
            DuplicateCase { value } => write!(f, "Duplicate case value: {}", value),
            MultipleDefaults => write!(f, "Multiple default cases"),
            IncompatibleCase { case, switch } => {
                write!(f, "Case type {} is incompatible with switch type {}", case, switch)
            }
            BreakOutsideLoop => write!(f, "Break outside loop or switch"),
            ContinueOutsideLoop => write!(f, "Continue outside loop"),
            ReturnValueFromVoid => write!(f, "Cannot return a value from a void method"),
            ReturnTypeMismatch { found, expected } => {
                write!(f, "Cannot return {} from method with return type {}", found, expected)
            }
            MissingReturnValue { expected } => {
                write!(f, "Missing return value in method with return type {}", expected)
            }
            UndefinedVariable { name } => write!(f, "Undefined variable: {}", name),
            NotAVariable { name } => write!(f, "{} is not a variable", name),
            InvalidAssignmentTarget => write!(f, "Invalid assignment target"),
            NonArrayAccess { found: Some(ty) } => write!(f, "Array access on non-array type: {}", ty),
            NonArrayAccess { found: None } => write!(f, "Array access on non-array type"),
            NonNumericIndex { found: Some(ty) } => write!(f, "Array index must be numeric, found: {}", ty),
            NonNumericIndex { found: None } => write!(f, "Array index must be numeric"),
            FieldOnNonClass { found } => write!(f, "Cannot access field on non-class type: {}", found),
            ClassNotFound { name } => write!(f, "Class not found: {}", name),
            FieldNotFound { field, class } => write!(f, "Field {} not found in class {}", field, class),
            BinaryOperandMismatch { op, left, right } => {
                write!(f, "Operator {} cannot be applied to types {} and {}", op, left, right)
            }
            NotAssignable => write!(f, "Left operand must be assignable"),
            CompoundMismatch { op, left, right } => write!(f, "Cannot apply '{}' to {} and {}", op, left, right),
            InvalidOperation => write!(f, "Invalid operation for types"),
            UnaryOperandMismatch { op, operand } => {
                write!(f, "Operator {} cannot be applied to type {}", op, operand)
            }
            ReceiverClassNotFound { name } => write!(f, "Class '{}' not found", name),
            ReceiverMethodNotFound { method, class } => write!(f, "Method '{}' not found in class {}", method, class),
            ReceiverArity { expected, found } => write!(f, "Method expects {} parameters, got {}", expected, found),
            ParameterMismatch { expected, found } => {
                write!(f, "Parameter type mismatch: expected {}, got {}", expected, found)
            }
            PrintArity => write!(f, "System.out.println requires exactly less than two arguments"),
            UndefinedMethod { name } => write!(f, "Undefined method: {}", name),
            NotAMethod { name } => write!(f, "{} is not a method", name),
            CallArity { method, expected, found } => {
                write!(f, "Method {} expects {} arguments, but got {}", method, expected, found)
            }
            ArgumentMismatch { index, method } => {
                write!(f, "Argument type mismatch for parameter {} of method {}", index, method)
            }
            ArraySizeNotInt { found } => write!(f, "Array size must be int, found: {}", found),
            NewNonClass { name } => write!(f, "Cannot create an instance of non-class type: {}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub line: Line,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, line: Line) -> Self {
        SemanticError { kind, line }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// `<message> at line <n>`
impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)
    }
}

impl std::error::Error for SemanticError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_line() {
        let err = SemanticError::new(
            SemanticErrorKind::CannotAssign {
                from: TypeDecl::INT,
                to: TypeDecl::BOOLEAN,
                target: AssignTarget::Variable,
            },
            7,
        );
        assert_eq!(err.to_string(), "Cannot assign int to variable of type boolean at line 7");
    }

    #[test]
    fn array_access_messages_differ_by_path() {
        let typed = SemanticErrorKind::NonArrayAccess { found: Some(TypeDecl::INT) };
        let bare = SemanticErrorKind::NonArrayAccess { found: None };
        assert_eq!(typed.to_string(), "Array access on non-array type: int");
        assert_eq!(bare.to_string(), "Array access on non-array type");
    }
}
