use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Int,
    Float,
    Double,
    String,
}

impl PrimitiveKind {
    /// Position in the widening order `int -> float -> double`.
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            PrimitiveKind::Int => Some(0),
            PrimitiveKind::Float => Some(1),
            PrimitiveKind::Double => Some(2),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "String",
        }
    }
}

/// Static type of an expression or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDecl {
    Void,
    Primitive(PrimitiveKind),
    /// `element` is never itself an array; nesting is counted in `dimension`.
    Array {
        element: Box<TypeDecl>,
        dimension: u32,
    },
    Class(String),
    GenericParam(String),
    GenericInstance {
        base: Box<TypeDecl>,
        args: Vec<TypeDecl>,
    },
}

impl TypeDecl {
    pub const BOOLEAN: TypeDecl = TypeDecl::Primitive(PrimitiveKind::Boolean);
    pub const CHAR: TypeDecl = TypeDecl::Primitive(PrimitiveKind::Char);
    pub const INT: TypeDecl = TypeDecl::Primitive(PrimitiveKind::Int);
    pub const FLOAT: TypeDecl = TypeDecl::Primitive(PrimitiveKind::Float);
    pub const DOUBLE: TypeDecl = TypeDecl::Primitive(PrimitiveKind::Double);
    pub const STRING: TypeDecl = TypeDecl::Primitive(PrimitiveKind::String);

    pub fn class(name: impl Into<String>) -> Self {
        TypeDecl::Class(name.into())
    }

    pub fn generic_param(name: impl Into<String>) -> Self {
        TypeDecl::GenericParam(name.into())
    }

    pub fn generic(base: TypeDecl, args: Vec<TypeDecl>) -> Self {
        TypeDecl::GenericInstance {
            base: Box::new(base),
            args,
        }
    }

    /// Wraps `element` in `dimension` array levels, flattening nested arrays.
    pub fn array(element: TypeDecl, dimension: u32) -> Self {
        if dimension == 0 {
            return element;
        }
        match element {
            TypeDecl::Array { element, dimension: inner } => TypeDecl::Array {
                element,
                dimension: inner + dimension,
            },
            element => TypeDecl::Array {
                element: Box::new(element),
                dimension,
            },
        }
    }

    /// Type of the literal `null`.
    pub fn null() -> Self {
        TypeDecl::Class("null".to_string())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDecl::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDecl::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDecl::Array { .. })
    }

    /// Plain classes and instantiated generics both count as class types.
    pub fn is_class(&self) -> bool {
        matches!(self, TypeDecl::Class(_) | TypeDecl::GenericInstance { .. })
    }

    pub fn is_boolean(&self) -> bool {
        *self == TypeDecl::BOOLEAN
    }

    /// `char` is deliberately not numeric.
    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_int(&self) -> bool {
        *self == TypeDecl::INT
    }

    pub fn is_char(&self) -> bool {
        *self == TypeDecl::CHAR
    }

    pub fn is_string(&self) -> bool {
        *self == TypeDecl::STRING
    }

    pub fn is_generic_param(&self) -> bool {
        matches!(self, TypeDecl::GenericParam(_))
    }

    pub fn is_generic_instance(&self) -> bool {
        matches!(self, TypeDecl::GenericInstance { .. })
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            TypeDecl::Primitive(kind) => kind.numeric_rank(),
            _ => None,
        }
    }

    /// Drops one array level; non-array types are returned unchanged.
    pub fn element_type(&self) -> TypeDecl {
        match self {
            TypeDecl::Array { element, dimension } if *dimension > 1 => TypeDecl::Array {
                element: element.clone(),
                dimension: dimension - 1,
            },
            TypeDecl::Array { element, .. } => (**element).clone(),
            other => other.clone(),
        }
    }

    pub fn generic_base(&self) -> Option<&TypeDecl> {
        match self {
            TypeDecl::GenericInstance { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn generic_args(&self) -> &[TypeDecl] {
        match self {
            TypeDecl::GenericInstance { args, .. } => args,
            _ => &[],
        }
    }

    /// Name used to look the type up as a class: the base name for generic
    /// instances, `String` for strings.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeDecl::Class(name) => Some(name),
            TypeDecl::GenericInstance { base, .. } => base.class_name(),
            TypeDecl::Primitive(PrimitiveKind::String) => Some("String"),
            _ => None,
        }
    }

    /// Checks are ordered: identity, numeric widening, generic instances,
    /// arrays, the blanket String target, then class names.
    pub fn is_assignable_to(&self, target: &TypeDecl) -> bool {
        if self == target {
            return true;
        }

        if let (Some(from), Some(to)) = (self.numeric_rank(), target.numeric_rank()) {
            if from <= to {
                return true;
            }
        }

        if let (
            TypeDecl::GenericInstance { base, args },
            TypeDecl::GenericInstance { base: target_base, args: target_args },
        ) = (self, target)
        {
            return base.is_assignable_to(target_base) && args == target_args;
        }

        if self.is_array() && target.is_array() {
            return self.element_type().is_assignable_to(&target.element_type());
        }

        if target.is_string() {
            return true;
        }

        if let (TypeDecl::Class(name), TypeDecl::Class(target_name)) = (self, target) {
            return name == target_name;
        }

        false
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Void => write!(f, "void"),
            TypeDecl::Primitive(kind) => write!(f, "{}", kind.name()),
            TypeDecl::Array { element, dimension } => {
                write!(f, "{}", element)?;
                for _ in 0..*dimension {
                    write!(f, "[]")?;
                }
                Ok(())
            }
            TypeDecl::Class(name) | TypeDecl::GenericParam(name) => write!(f, "{}", name),
            TypeDecl::GenericInstance { base, args } => {
                write!(f, "{}", base)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}
