use std::fmt;

/// Source line a node was anchored to by the parser.
pub type Line = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<Member>,
    pub line: Line,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Field(_) => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            Member::Method(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub init: Option<Expr>,
    pub is_static: bool,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<Parameter>,
    pub body: Block,
    pub is_static: bool,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub line: Line,
}

/// A type as written in source: `int`, `String[]`, `HashMap<String, Integer>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    pub dimensions: u32,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            dimensions: 0,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef {
            name: name.into(),
            args,
            dimensions: 0,
        }
    }

    pub fn array_of(mut self, dimensions: u32) -> Self {
        self.dimensions += dimensions;
        self
    }

    /// Splits glued bracket suffixes: `int[][]` becomes `int` with two dimensions.
    pub fn from_lexeme(lexeme: &str) -> Self {
        let mut name = lexeme;
        let mut dimensions = 0;
        while let Some(stripped) = name.strip_suffix("[]") {
            name = stripped;
            dimensions += 1;
        }
        TypeRef {
            name: name.to_string(),
            args: Vec::new(),
            dimensions,
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.dimensions == 0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeRef,
    pub init: Option<Expr>,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub line: Line,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, line: Line) -> Self {
        Block { stmts, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Line,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Line) -> Self {
        Stmt { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    VarDecl(VarDecl),
    Block(Block),
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    DoWhile {
        body: Block,
        condition: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Block,
    },
    Switch {
        condition: Expr,
        arms: Vec<SwitchArm>,
    },
    Return(Option<Expr>),
    Expression(Expr),
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchArm {
    Case { value: Expr, body: Block, line: Line },
    Default { body: Block, line: Line },
}

impl SwitchArm {
    pub fn body(&self) -> &Block {
        match self {
            SwitchArm::Case { body, .. } | SwitchArm::Default { body, .. } => body,
        }
    }

    pub fn line(&self) -> Line {
        match self {
            SwitchArm::Case { line, .. } | SwitchArm::Default { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
}

impl Expr {
    pub fn new(kind: ExprKind, line: Line) -> Self {
        Expr { kind, line }
    }

    /// Variable, array element and field access may be assigned to.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable(_) | ExprKind::ArrayAccess { .. } | ExprKind::FieldAccess { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `receiver.name(args)`, or a call to a method of the enclosing class when
    /// `receiver` is `None`.
    MethodCall {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
    /// `new T<..>()` or `new T[size]`; `diamond` marks an empty `<>`.
    New {
        ty: TypeRef,
        size: Option<Box<Expr>>,
        diamond: bool,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayInit(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    /// Lexeme as written, quotes and suffixes included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Char(String),
    Str(String),
    Null,
}

impl LiteralValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Double(_) => "double",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Char(_) => "char",
            LiteralValue::Str(_) => "String",
            LiteralValue::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl BinaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        let op = match lexeme {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "+=" => BinaryOp::AddAssign,
            "-=" => BinaryOp::SubAssign,
            "*=" => BinaryOp::MulAssign,
            "/=" => BinaryOp::DivAssign,
            "%=" => BinaryOp::ModAssign,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::ModAssign => "%=",
        }
    }

    pub fn is_compound_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::ModAssign
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The node taxonomy shared by the analyzer, the generator and the tree printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ClassDecl,
    MethodDecl,
    ParameterList,
    Parameter,
    FieldDecl,
    VariableDecl,
    ArrayInit,
    Block,
    IfStmt,
    WhileStmt,
    DoWhileStmt,
    ForStmt,
    SwitchStmt,
    Case,
    Default,
    ReturnStmt,
    ExpressionStmt,
    BinaryExpr,
    UnaryExpr,
    BreakStmt,
    ContinueStmt,
    Literal,
    Variable,
    MethodCall,
    ArrayAccess,
    FieldAccess,
    NewExpr,
    Assignment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl StmtKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            StmtKind::VarDecl(_) => NodeKind::VariableDecl,
            StmtKind::Block(_) => NodeKind::Block,
            StmtKind::If { .. } => NodeKind::IfStmt,
            StmtKind::While { .. } => NodeKind::WhileStmt,
            StmtKind::DoWhile { .. } => NodeKind::DoWhileStmt,
            StmtKind::For { .. } => NodeKind::ForStmt,
            StmtKind::Switch { .. } => NodeKind::SwitchStmt,
            StmtKind::Return(_) => NodeKind::ReturnStmt,
            StmtKind::Expression(_) => NodeKind::ExpressionStmt,
            StmtKind::Break => NodeKind::BreakStmt,
            StmtKind::Continue => NodeKind::ContinueStmt,
        }
    }
}

impl ExprKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            ExprKind::Literal(_) => NodeKind::Literal,
            ExprKind::Variable(_) => NodeKind::Variable,
            ExprKind::Binary { .. } => NodeKind::BinaryExpr,
            ExprKind::Unary { .. } => NodeKind::UnaryExpr,
            ExprKind::MethodCall { .. } => NodeKind::MethodCall,
            ExprKind::ArrayAccess { .. } => NodeKind::ArrayAccess,
            ExprKind::FieldAccess { .. } => NodeKind::FieldAccess,
            ExprKind::New { .. } => NodeKind::NewExpr,
            ExprKind::Assignment { .. } => NodeKind::Assignment,
            ExprKind::ArrayInit(_) => NodeKind::ArrayInit,
        }
    }
}
