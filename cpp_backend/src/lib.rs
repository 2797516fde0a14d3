use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};

use compiler_core::{Backend, CompilerConfig};
use frontend::ast::*;
use log::{debug, trace};

pub mod types;

use types::{cpp_type, is_container, unboxed, IncludeSet, CMATH, IOMANIP, IOSTREAM, SSTREAM, STRING};

/// Floating values print with Java's shortest-looking digits (`1.5`, `2.0`)
/// rather than `std::to_string`'s fixed six decimals.
const FORMAT_NUMBER: &[&str] = &[
    "std::string format_number(double value, int digits)",
    "{",
    "    std::ostringstream out;",
    "    out << std::setprecision(digits) << value;",
    "    std::string text = out.str();",
    "    if (text.find_first_of(\".en\") == std::string::npos) {",
    "        text += \".0\";",
    "    }",
    "    return text;",
    "}",
];

/// Renders a checked [`Program`] as a single C++17 translation unit.
///
/// Classes are flattened: fields become globals and methods free functions,
/// `main` taking the `int main(int argc, char* argv[])` signature. The
/// generator trusts the program already passed semantic analysis; the only
/// typing it does is the light inference needed to pick a C++ idiom
/// (string concatenation, map lookups, `%` on floating operands).
pub struct CppCodeGenerator<'a> {
    program: &'a Program,
    output: String,
    includes: IncludeSet,
    indent_level: usize,
    indent_width: usize,
    emit_prototypes: bool,
    scopes: Vec<HashMap<&'a str, &'a TypeRef>>,
    fields: HashMap<&'a str, &'a TypeRef>,
    methods: HashMap<&'a str, &'a TypeRef>,
    classes: HashSet<&'a str>,
    in_main: bool,
    return_type: Option<&'a TypeRef>,
    uses_format_number: bool,
}

impl<'a> CppCodeGenerator<'a> {
    pub fn new(program: &'a Program) -> Self {
        let defaults = CompilerConfig::default();
        CppCodeGenerator {
            program,
            output: String::new(),
            includes: IncludeSet::new(),
            indent_level: 0,
            indent_width: defaults.indent_width,
            emit_prototypes: defaults.emit_prototypes,
            scopes: Vec::new(),
            fields: HashMap::new(),
            methods: HashMap::new(),
            classes: HashSet::new(),
            in_main: false,
            return_type: None,
            uses_format_number: false,
        }
    }

    pub fn with_config(program: &'a Program, config: &CompilerConfig) -> Self {
        Self::new(program)
            .indent_width(config.indent_width)
            .emit_prototypes(config.emit_prototypes)
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn emit_prototypes(mut self, emit: bool) -> Self {
        self.emit_prototypes = emit;
        self
    }

    pub fn generate(&mut self) -> Result<String, CppGenError> {
        self.output.clear();
        self.includes = [IOSTREAM, STRING].into_iter().collect();
        self.indent_level = 0;
        self.scopes.clear();
        self.in_main = false;
        self.uses_format_number = false;
        self.collect_declarations();

        let program = self.program;
        debug!("generating C++ for {} class(es)", program.classes.len());

        let mut wrote_fields = false;
        for field in program.classes.iter().flat_map(ClassDecl::fields) {
            let decl = self.declaration(&field.ty, &field.name, field.init.as_ref())?;
            writeln!(self.output, "{};", decl)?;
            wrote_fields = true;
        }
        if wrote_fields {
            writeln!(self.output)?;
        }

        if self.emit_prototypes {
            let mut wrote_prototypes = false;
            for method in program.classes.iter().flat_map(ClassDecl::methods) {
                if method.name != "main" {
                    let signature = self.signature(method)?;
                    writeln!(self.output, "{};", signature)?;
                    wrote_prototypes = true;
                }
            }
            if wrote_prototypes {
                writeln!(self.output)?;
            }
        }

        for (i, method) in program.classes.iter().flat_map(ClassDecl::methods).enumerate() {
            if i > 0 {
                writeln!(self.output)?;
            }
            self.generate_method(method)?;
        }

        let mut result = String::with_capacity(self.output.len() + 128);
        for include in &self.includes {
            writeln!(result, "{}", include)?;
        }
        writeln!(result)?;
        if self.uses_format_number {
            let unit = " ".repeat(self.indent_width);
            for line in FORMAT_NUMBER {
                let depth = line.len() - line.trim_start().len();
                writeln!(result, "{}{}", unit.repeat(depth / 4), line.trim_start())?;
            }
            writeln!(result)?;
        }
        result.push_str(&self.output);
        debug!("generated {} byte(s), {} include(s)", result.len(), self.includes.len());
        Ok(result)
    }

    fn collect_declarations(&mut self) {
        self.fields.clear();
        self.methods.clear();
        self.classes.clear();
        let program = self.program;
        for class in &program.classes {
            self.classes.insert(&class.name);
            for field in class.fields() {
                self.fields.insert(&field.name, &field.ty);
            }
            for method in class.methods() {
                self.methods.insert(&method.name, &method.return_type);
            }
        }
    }

    fn signature(&mut self, method: &MethodDecl) -> Result<String, CppGenError> {
        if method.name == "main" {
            return Ok("int main(int argc, char* argv[])".to_string());
        }
        let return_type = cpp_type(&method.return_type, &mut self.includes)?;
        let mut params = Vec::with_capacity(method.params.len());
        for param in &method.params {
            let ty = cpp_type(&param.ty, &mut self.includes)?;
            // arrays and containers are shared with the caller, as in the source language
            if param.ty.dimensions > 0 || is_container(&param.ty) {
                params.push(format!("{}& {}", ty, param.name));
            } else {
                params.push(format!("{} {}", ty, param.name));
            }
        }
        Ok(format!("{} {}({})", return_type, method.name, params.join(", ")))
    }

    fn generate_method(&mut self, method: &'a MethodDecl) -> Result<(), CppGenError> {
        trace!("method {} at line {}", method.name, method.line);
        let signature = self.signature(method)?;
        writeln!(self.output, "{}", signature)?;
        writeln!(self.output, "{{")?;

        self.in_main = method.name == "main";
        self.return_type = Some(&method.return_type);
        let mut params = HashMap::new();
        if !self.in_main {
            for param in &method.params {
                params.insert(param.name.as_str(), &param.ty);
            }
        }
        self.scopes.push(params);
        self.indent_level += 1;
        self.generate_statements(&method.body.stmts)?;
        self.indent_level -= 1;
        self.scopes.pop();

        writeln!(self.output, "}}")?;
        Ok(())
    }

    fn generate_statements(&mut self, stmts: &'a [Stmt]) -> Result<(), CppGenError> {
        for stmt in stmts {
            self.generate_stmt(stmt)?;
        }
        Ok(())
    }

    /// Statements of `block` one level deeper, in a scope of their own.
    fn generate_block_body(&mut self, block: &'a Block) -> Result<(), CppGenError> {
        self.scopes.push(HashMap::new());
        self.indent_level += 1;
        self.generate_statements(&block.stmts)?;
        self.indent_level -= 1;
        self.scopes.pop();
        Ok(())
    }

    fn generate_stmt(&mut self, stmt: &'a Stmt) -> Result<(), CppGenError> {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => {
                let text = self.declaration(&decl.ty, &decl.name, decl.init.as_ref())?;
                self.declare(&decl.name, &decl.ty);
                self.write_line(&format!("{};", text))
            }
            StmtKind::Block(block) => {
                self.write_line("{")?;
                self.generate_block_body(block)?;
                self.write_line("}")
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.generate_if(condition, then_branch, else_branch.as_ref(), ""),
            StmtKind::While { condition, body } => {
                let condition = self.bare(condition)?;
                self.write_line(&format!("while ({}) {{", condition))?;
                self.generate_block_body(body)?;
                self.write_line("}")
            }
            StmtKind::DoWhile { body, condition } => {
                self.write_line("do {")?;
                self.generate_block_body(body)?;
                let condition = self.bare(condition)?;
                self.write_line(&format!("}} while ({});", condition))
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                self.scopes.push(HashMap::new());
                let init = match init.as_deref() {
                    Some(init) => self.for_init(init)?,
                    None => String::new(),
                };
                let condition = match condition {
                    Some(condition) => self.bare(condition)?,
                    None => String::new(),
                };
                let update = match update {
                    Some(update) => self.bare(update)?,
                    None => String::new(),
                };
                self.write_line(&format!("for ({}; {}; {}) {{", init, condition, update))?;
                self.generate_block_body(body)?;
                self.scopes.pop();
                self.write_line("}")
            }
            StmtKind::Switch { condition, arms } => self.generate_switch(condition, arms),
            StmtKind::Return(Some(value)) => {
                let value = self.value_for(value, self.return_type)?;
                self.write_line(&format!("return {};", value))
            }
            StmtKind::Return(None) if self.in_main => self.write_line("return 0;"),
            StmtKind::Return(None) => self.write_line("return;"),
            StmtKind::Expression(expr) => {
                let expr = self.bare(expr)?;
                self.write_line(&format!("{};", expr))
            }
            StmtKind::Break => self.write_line("break;"),
            StmtKind::Continue => self.write_line("continue;"),
        }
    }

    fn generate_if(
        &mut self,
        condition: &'a Expr,
        then_branch: &'a Block,
        else_branch: Option<&'a Block>,
        prefix: &str,
    ) -> Result<(), CppGenError> {
        let condition = self.bare(condition)?;
        self.write_line(&format!("{}if ({}) {{", prefix, condition))?;
        self.generate_block_body(then_branch)?;
        self.write_line("}")?;

        let Some(block) = else_branch else {
            return Ok(());
        };
        match block.stmts.as_slice() {
            [Stmt {
                kind:
                    StmtKind::If {
                        condition,
                        then_branch,
                        else_branch,
                    },
                ..
            }] => self.generate_if(condition, then_branch, else_branch.as_ref(), "else "),
            _ => {
                self.write_line("else {")?;
                self.generate_block_body(block)?;
                self.write_line("}")
            }
        }
    }

    fn generate_switch(&mut self, condition: &'a Expr, arms: &'a [SwitchArm]) -> Result<(), CppGenError> {
        let condition = self.bare(condition)?;
        self.write_line(&format!("switch ({}) {{", condition))?;
        for arm in arms {
            let label = match arm {
                SwitchArm::Case { value, .. } => format!("case {}:", self.bare(value)?),
                SwitchArm::Default { .. } => "default:".to_string(),
            };
            let body = arm.body();
            // a declaration may not be jumped over by a later label
            if body.stmts.iter().any(|s| matches!(s.kind, StmtKind::VarDecl(_))) {
                self.write_line(&format!("{} {{", label))?;
                self.generate_block_body(body)?;
                self.write_line("}")?;
            } else {
                self.write_line(&label)?;
                self.generate_block_body(body)?;
            }
        }
        self.write_line("}")
    }

    fn for_init(&mut self, init: &'a Stmt) -> Result<String, CppGenError> {
        match &init.kind {
            StmtKind::VarDecl(decl) => {
                let text = self.declaration(&decl.ty, &decl.name, decl.init.as_ref())?;
                self.declare(&decl.name, &decl.ty);
                Ok(text)
            }
            StmtKind::Expression(expr) => self.bare(expr),
            other => Err(CppGenError::Unsupported(format!(
                "{} as a for-loop initializer",
                other.node_kind()
            ))),
        }
    }

    /// `T name` or `T name = value`; a `new` container initializer is
    /// dropped since the declaration alone yields an empty container.
    fn declaration(&mut self, ty: &TypeRef, name: &str, init: Option<&'a Expr>) -> Result<String, CppGenError> {
        let cpp = cpp_type(ty, &mut self.includes)?;
        match init {
            None => Ok(format!("{} {}", cpp, name)),
            Some(Expr {
                kind: ExprKind::New { size: None, .. },
                ..
            }) if is_container(ty) => Ok(format!("{} {}", cpp, name)),
            Some(value) => {
                let value = self.value_for(value, Some(ty))?;
                Ok(format!("{} {} = {}", cpp, name, value))
            }
        }
    }

    fn declare(&mut self, name: &'a str, ty: &'a TypeRef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<&'a TypeRef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .or_else(|| self.fields.get(name).copied())
    }

    /// A bare class name used as a qualifier (`Helper.run()`, `Config.limit`).
    fn is_class_name(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Variable(name) => self.lookup(name).is_none() && self.classes.contains(name.as_str()),
            _ => false,
        }
    }

    fn write_line(&mut self, text: &str) -> Result<(), CppGenError> {
        let indent = self.indent_level * self.indent_width;
        writeln!(self.output, "{:indent$}{}", "", text, indent = indent)?;
        Ok(())
    }

    /// Renders `expr` without the outer parentheses binary operators carry.
    fn bare(&mut self, expr: &'a Expr) -> Result<String, CppGenError> {
        let text = self.expr(expr)?;
        if let ExprKind::Binary { op, .. } = &expr.kind {
            if !op.is_compound_assignment() {
                if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
                    return Ok(inner.to_string());
                }
            }
        }
        Ok(text)
    }

    /// Renders `expr` as a value stored into `target`. Strings and containers
    /// are values in C++, so `null` becomes a value-initialized `target`.
    fn value_for(&mut self, expr: &'a Expr, target: Option<&TypeRef>) -> Result<String, CppGenError> {
        match (&expr.kind, target) {
            (
                ExprKind::Literal(Literal {
                    value: LiteralValue::Null,
                    ..
                }),
                Some(ty),
            ) => Ok(format!("{}()", cpp_type(ty, &mut self.includes)?)),
            _ => self.bare(expr),
        }
    }

    fn expr(&mut self, expr: &'a Expr) -> Result<String, CppGenError> {
        match &expr.kind {
            ExprKind::Literal(literal) => render_literal(literal),
            ExprKind::Variable(name) => Ok(name.clone()),
            ExprKind::Binary { op, left, right } => self.binary(expr, *op, left, right),
            ExprKind::Unary { op, operand } => {
                let inner = self.expr(operand)?;
                if op.is_postfix() {
                    Ok(format!("{}{}", inner, op))
                } else if inner.starts_with(['-', '+']) {
                    Ok(format!("{}({})", op, inner))
                } else {
                    Ok(format!("{}{}", op, inner))
                }
            }
            ExprKind::MethodCall { receiver, name, args } => self.call(receiver.as_deref(), name, args),
            ExprKind::ArrayAccess { array, index } => {
                let array = self.expr(array)?;
                let index = self.bare(index)?;
                Ok(format!("{}[{}]", array, index))
            }
            ExprKind::FieldAccess { object, field } => {
                if self.is_class_name(object) {
                    return Ok(field.clone());
                }
                let object = self.receiver(object)?;
                if field == "length" {
                    Ok(format!("{}.size()", object))
                } else {
                    Ok(format!("{}.{}", object, field))
                }
            }
            ExprKind::New { ty, size, diamond } => {
                if let Some(size) = size {
                    let cpp = cpp_type(ty, &mut self.includes)?;
                    let size = self.bare(size)?;
                    Ok(format!("{}({})", cpp, size))
                } else if *diamond {
                    Ok("{}".to_string())
                } else {
                    let cpp = cpp_type(ty, &mut self.includes)?;
                    Ok(format!("{}()", cpp))
                }
            }
            ExprKind::Assignment { target, value } => {
                let target_type = self.static_type(target);
                let target = self.expr(target)?;
                let value = self.value_for(value, target_type.as_ref())?;
                Ok(format!("{} = {}", target, value))
            }
            ExprKind::ArrayInit(items) => Ok(format!("{{{}}}", self.list(items)?)),
        }
    }

    fn list(&mut self, items: &'a [Expr]) -> Result<String, CppGenError> {
        let rendered = items
            .iter()
            .map(|item| self.bare(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(", "))
    }

    fn binary(&mut self, expr: &'a Expr, op: BinaryOp, left: &'a Expr, right: &'a Expr) -> Result<String, CppGenError> {
        if op == BinaryOp::Add && self.is_string(expr) {
            return self.concat(expr);
        }
        let lhs = self.expr(left)?;
        if op.is_compound_assignment() {
            let rhs = if op == BinaryOp::AddAssign && self.is_string(left) {
                self.to_cpp_string(right)?
            } else {
                self.bare(right)?
            };
            return Ok(format!("{} {} {}", lhs, op, rhs));
        }
        let rhs = self.expr(right)?;
        if op == BinaryOp::Mod && (self.is_floating(left) || self.is_floating(right)) {
            self.includes.insert(CMATH);
            return Ok(format!("std::fmod({}, {})", lhs, rhs));
        }
        Ok(format!("({} {} {})", lhs, op, rhs))
    }

    /// Operands of a string `+` chain, left to right. A non-string
    /// subexpression such as `1 + 2` in `1 + 2 + "x"` stays one operand.
    fn concat_operands(&self, expr: &'a Expr, out: &mut Vec<&'a Expr>) {
        match &expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } if self.is_string(expr) => {
                self.concat_operands(left, out);
                self.concat_operands(right, out);
            }
            _ => out.push(expr),
        }
    }

    fn concat(&mut self, expr: &'a Expr) -> Result<String, CppGenError> {
        let mut operands = Vec::new();
        self.concat_operands(expr, &mut operands);
        let mut parts = Vec::with_capacity(operands.len());
        for (i, operand) in operands.into_iter().enumerate() {
            let part = match &operand.kind {
                // two adjacent literals cannot be added as raw C strings
                ExprKind::Literal(Literal {
                    value: LiteralValue::Str(_),
                    text,
                }) if i == 0 => format!("std::string({})", text),
                _ => self.to_cpp_string(operand)?,
            };
            parts.push(part);
        }
        Ok(format!("({})", parts.join(" + ")))
    }

    fn to_cpp_string(&mut self, expr: &'a Expr) -> Result<String, CppGenError> {
        match self.scalar_type(expr).as_deref() {
            Some("String") => self.bare(expr),
            Some("char") => Ok(format!("std::string(1, {})", self.bare(expr)?)),
            Some("boolean") => Ok(format!("std::string({} ? \"true\" : \"false\")", self.expr(expr)?)),
            Some(floating @ ("float" | "double")) => self.format_number(expr, floating == "float"),
            _ => Ok(format!("std::to_string({})", self.bare(expr)?)),
        }
    }

    /// Single precision keeps 7 significant digits, double precision 15.
    fn format_number(&mut self, expr: &'a Expr, single: bool) -> Result<String, CppGenError> {
        self.uses_format_number = true;
        self.includes.insert(IOMANIP);
        self.includes.insert(SSTREAM);
        let digits = if single { 7 } else { 15 };
        Ok(format!("format_number({}, {})", self.bare(expr)?, digits))
    }

    /// Receivers rendered so a member access binds to the whole expression.
    fn receiver(&mut self, expr: &'a Expr) -> Result<String, CppGenError> {
        let text = self.expr(expr)?;
        match &expr.kind {
            ExprKind::Literal(Literal {
                value: LiteralValue::Str(_),
                ..
            }) => Ok(format!("std::string({})", text)),
            _ => Ok(text),
        }
    }

    fn call(&mut self, receiver: Option<&'a Expr>, name: &str, args: &'a [Expr]) -> Result<String, CppGenError> {
        match receiver {
            Some(receiver) if is_print_stream(receiver) => self.print(name, args),
            Some(receiver) if !self.is_class_name(receiver) => self.member_call(receiver, name, args),
            _ => Ok(format!("{}({})", name, self.list(args)?)),
        }
    }

    /// `System.out.println(a + ": " + b)` becomes one `std::cout` insertion chain.
    fn print(&mut self, name: &str, args: &'a [Expr]) -> Result<String, CppGenError> {
        let newline = match name {
            "println" => true,
            "print" => false,
            other => return Err(CppGenError::Unsupported(format!("System.out.{}", other))),
        };
        let mut chain = String::from("std::cout");
        if let Some(arg) = args.first() {
            let mut operands = Vec::new();
            self.concat_operands(arg, &mut operands);
            for operand in operands {
                let part = match self.scalar_type(operand).as_deref() {
                    Some("boolean") => format!("({} ? \"true\" : \"false\")", self.expr(operand)?),
                    Some(floating @ ("float" | "double")) => self.format_number(operand, floating == "float")?,
                    _ => self.expr(operand)?,
                };
                chain.push_str(" << ");
                chain.push_str(&part);
            }
        }
        if newline {
            chain.push_str(" << std::endl");
        }
        Ok(chain)
    }

    fn member_call(&mut self, receiver: &'a Expr, name: &str, args: &'a [Expr]) -> Result<String, CppGenError> {
        let is_map = self
            .static_type(receiver)
            .is_some_and(|ty| ty.dimensions == 0 && ty.name == "HashMap");
        let target = self.receiver(receiver)?;
        let args = args
            .iter()
            .map(|arg| self.bare(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let text = match (name, args.as_slice()) {
            ("add" | "push", [value]) => format!("{}.push_back({})", target, value),
            ("get", [key]) if is_map => format!("{}.at({})", target, key),
            ("get", [index]) => format!("{}[{}]", target, index),
            ("set", [index, value]) => format!("{}[{}] = {}", target, index, value),
            ("put", [key, value]) => format!("{}[{}] = {}", target, key, value),
            ("size" | "length", []) => format!("{}.size()", target),
            ("isEmpty", []) => format!("{}.empty()", target),
            ("containsKey", [key]) => format!("({}.count({}) > 0)", target, key),
            ("equals", [other]) => format!("({} == {})", target, other),
            ("charAt", [index]) => format!("{}.at({})", target, index),
            (_, rendered) => format!("{}.{}({})", target, name, rendered.join(", ")),
        };
        Ok(text)
    }

    fn is_string(&self, expr: &Expr) -> bool {
        self.scalar_type(expr).as_deref() == Some("String")
    }

    fn is_floating(&self, expr: &Expr) -> bool {
        matches!(self.scalar_type(expr).as_deref(), Some("float" | "double"))
    }

    /// Unboxed name of a non-array static type.
    fn scalar_type(&self, expr: &Expr) -> Option<String> {
        self.static_type(expr)
            .filter(|ty| ty.dimensions == 0)
            .map(|ty| unboxed(&ty.name).to_string())
    }

    /// Best-effort static type, enough to choose between C++ renderings.
    fn static_type(&self, expr: &Expr) -> Option<TypeRef> {
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let name = match literal.value {
                    LiteralValue::Null => return None,
                    ref value => value.kind_name(),
                };
                Some(TypeRef::simple(name))
            }
            ExprKind::Variable(name) => self.lookup(name).cloned(),
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or => Some(TypeRef::simple("boolean")),
                op if op.is_compound_assignment() => self.static_type(left),
                _ => {
                    let operands = [self.scalar_type(left), self.scalar_type(right)];
                    if operands.iter().flatten().any(|name| name == "String") {
                        return Some(TypeRef::simple("String"));
                    }
                    // char and int operands promote to int
                    let rank = operands.iter().flatten().filter_map(|name| numeric_rank(name)).max()?;
                    Some(TypeRef::simple(["int", "int", "float", "double"][rank]))
                }
            },
            ExprKind::Unary { op: UnaryOp::Not, .. } => Some(TypeRef::simple("boolean")),
            ExprKind::Unary { operand, .. } => self.static_type(operand),
            ExprKind::MethodCall { receiver, name, .. } => self.call_type(receiver.as_deref(), name),
            ExprKind::ArrayAccess { array, .. } => {
                let mut ty = self.static_type(array)?;
                if ty.dimensions == 0 {
                    return None;
                }
                ty.dimensions -= 1;
                Some(ty)
            }
            ExprKind::FieldAccess { object, field } => {
                if self.is_class_name(object) {
                    self.fields.get(field.as_str()).map(|ty| (*ty).clone())
                } else if field == "length" {
                    Some(TypeRef::simple("int"))
                } else {
                    None
                }
            }
            ExprKind::New { ty, .. } => Some(ty.clone()),
            ExprKind::Assignment { target, .. } => self.static_type(target),
            ExprKind::ArrayInit(_) => None,
        }
    }

    fn call_type(&self, receiver: Option<&Expr>, name: &str) -> Option<TypeRef> {
        let receiver = match receiver {
            Some(receiver) if !self.is_class_name(receiver) => receiver,
            _ => return self.methods.get(name).map(|ty| (*ty).clone()),
        };
        let ty = self.static_type(receiver)?;
        if ty.dimensions > 0 {
            return None;
        }
        match (unboxed(&ty.name), name) {
            ("String", "length") | (_, "size") => Some(TypeRef::simple("int")),
            ("String", "charAt") => Some(TypeRef::simple("char")),
            (_, "equals" | "isEmpty" | "containsKey" | "add") => Some(TypeRef::simple("boolean")),
            ("ArrayList", "get" | "set") => ty.args.first().cloned(),
            ("HashMap", "get") => ty.args.get(1).cloned(),
            _ => None,
        }
    }
}

fn numeric_rank(name: &str) -> Option<usize> {
    match name {
        "char" => Some(0),
        "int" => Some(1),
        "float" => Some(2),
        "double" => Some(3),
        _ => None,
    }
}

fn is_print_stream(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::FieldAccess { object, field } if field == "out" => {
            matches!(&object.kind, ExprKind::Variable(name) if name == "System")
        }
        _ => false,
    }
}

fn render_literal(literal: &Literal) -> Result<String, CppGenError> {
    let text = match &literal.value {
        LiteralValue::Float(_) => format!("{}f", with_decimal_point(literal.text.trim_end_matches(['f', 'F']))),
        LiteralValue::Double(_) => with_decimal_point(literal.text.trim_end_matches(['d', 'D'])),
        LiteralValue::Boolean(value) => value.to_string(),
        // reached only where no declared type gives null a value
        LiteralValue::Null => {
            return Err(CppGenError::Unsupported(
                "null outside a declaration, assignment or return".to_string(),
            ))
        }
        LiteralValue::Int(_) | LiteralValue::Char(_) | LiteralValue::Str(_) => literal.text.clone(),
    };
    Ok(text)
}

/// `2` is an integer in C++; suffix-stripped floating literals keep a point.
fn with_decimal_point(digits: &str) -> String {
    if digits.contains(['.', 'e', 'E']) {
        digits.to_string()
    } else {
        format!("{}.0", digits)
    }
}

/// [`Backend`] handing checked programs to [`CppCodeGenerator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CppBackend;

impl Backend for CppBackend {
    type Error = CppGenError;

    fn generate(&self, program: &Program, config: &CompilerConfig) -> Result<String, CppGenError> {
        CppCodeGenerator::with_config(program, config).generate()
    }
}

#[derive(Debug)]
pub enum CppGenError {
    Fmt(fmt::Error),
    Unsupported(String),
}

impl From<fmt::Error> for CppGenError {
    fn from(err: fmt::Error) -> Self {
        CppGenError::Fmt(err)
    }
}

impl fmt::Display for CppGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppGenError::Fmt(err) => write!(f, "Formatting error: {}", err),
            CppGenError::Unsupported(construct) => write!(f, "Unsupported construct: {}", construct),
        }
    }
}

impl std::error::Error for CppGenError {}

#[cfg(test)]
mod tests {
    use super::*;
    use frontend::{tokenize, Parser};
    use rstest::rstest;

    fn parse(source: &str) -> Program {
        Parser::new(tokenize(source)).parse_program().unwrap()
    }

    fn in_main(body: &str) -> String {
        format!(
            "public class Main {{\npublic static void main(String[] args) {{\n{}\n}}\n}}\n",
            body
        )
    }

    /// The generated body of `main`, without the includes, signature and braces.
    fn main_body(body: &str) -> String {
        let program = parse(&in_main(body));
        let out = CppCodeGenerator::new(&program).generate().unwrap();
        let start = out.find("{\n").unwrap() + 2;
        let end = out.rfind("}\n").unwrap();
        out[start..end]
            .lines()
            .map(|line| line.strip_prefix("    ").unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[rstest]
    #[case("int x = 5;", "int x = 5;")]
    #[case("boolean ok = true;", "bool ok = true;")]
    #[case("String s = \"hi\";", "std::string s = \"hi\";")]
    #[case("double d = 2.5d;", "double d = 2.5;")]
    #[case("double d = 2d;", "double d = 2.0;")]
    #[case("float f = 1.5f;", "float f = 1.5f;")]
    #[case("int x = -5;", "int x = -5;")]
    #[case("int x = 1 + 2 * 3;", "int x = 1 + (2 * 3);")]
    #[case("int[] a = {1, 2, 3};", "std::vector<int> a = {1, 2, 3};")]
    #[case("int[] a = new int[4];", "std::vector<int> a = std::vector<int>(4);")]
    #[case("ArrayList<String> names = new ArrayList<>();", "std::vector<std::string> names;")]
    #[case(
        "HashMap<String, Integer> m = new HashMap<String, Integer>();",
        "std::unordered_map<std::string, int> m;"
    )]
    #[case("String s = null;", "std::string s = std::string();")]
    #[case("String s = \"a\";\ns = null;", "std::string s = \"a\";\ns = std::string();")]
    #[case("ArrayList<Integer> xs = null;", "std::vector<int> xs = std::vector<int>();")]
    #[case("int[] a = null;", "std::vector<int> a = std::vector<int>();")]
    #[case("int x = 1;\nx++;\n--x;", "int x = 1;\nx++;\n--x;")]
    #[case("boolean b = !true;", "bool b = !true;")]
    #[case("int x = 7;\nx %= 2;", "int x = 7;\nx %= 2;")]
    #[case("double d = 7.5;\ndouble r = d % 2;", "double d = 7.5;\ndouble r = std::fmod(d, 2);")]
    fn renders_declarations_and_expressions(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(main_body(body), expected);
    }

    #[rstest]
    #[case("System.out.println(\"hi\");", "std::cout << \"hi\" << std::endl;")]
    #[case("System.out.println();", "std::cout << std::endl;")]
    #[case("System.out.print(1);", "std::cout << 1;")]
    #[case(
        "int n = 2;\nSystem.out.println(\"n = \" + n + \"!\");",
        "int n = 2;\nstd::cout << \"n = \" << n << \"!\" << std::endl;"
    )]
    #[case(
        "int a = 1;\nSystem.out.println(a + 1);",
        "int a = 1;\nstd::cout << (a + 1) << std::endl;"
    )]
    #[case(
        "boolean b = false;\nSystem.out.println(\"b: \" + b);",
        "bool b = false;\nstd::cout << \"b: \" << (b ? \"true\" : \"false\") << std::endl;"
    )]
    fn renders_print_chains(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(main_body(body), expected);
    }

    #[rstest]
    #[case("int n = 3;\nString s = \"n\" + n;", "int n = 3;\nstd::string s = std::string(\"n\") + std::to_string(n);")]
    #[case("char c = 'x';\nString s = c + \"!\";", "char c = 'x';\nstd::string s = std::string(1, c) + \"!\";")]
    #[case("String s = 1 + 2 + \"x\";", "std::string s = std::to_string(1 + 2) + \"x\";")]
    #[case("String s = \"a\";\ns += 1;", "std::string s = \"a\";\ns += std::to_string(1);")]
    #[case("String s = \"a\";\ns += \"b\";", "std::string s = \"a\";\ns += \"b\";")]
    fn renders_string_concatenation(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(main_body(body), expected);
    }

    #[rstest]
    #[case("ArrayList<Integer> l = new ArrayList<>();\nl.add(1);", "l.push_back(1);")]
    #[case("ArrayList<Integer> l = new ArrayList<>();\nint x = l.get(0);", "int x = l[0];")]
    #[case("ArrayList<Integer> l = new ArrayList<>();\nl.set(0, 2);", "l[0] = 2;")]
    #[case("ArrayList<Integer> l = new ArrayList<>();\nint n = l.size();", "int n = l.size();")]
    #[case("ArrayList<Integer> l = new ArrayList<>();\nboolean e = l.isEmpty();", "bool e = l.empty();")]
    #[case("HashMap<String, Integer> m = new HashMap<>();\nm.put(\"k\", 1);", "m[\"k\"] = 1;")]
    #[case("HashMap<String, Integer> m = new HashMap<>();\nint v = m.get(\"k\");", "int v = m.at(\"k\");")]
    #[case(
        "HashMap<String, Integer> m = new HashMap<>();\nboolean has = m.containsKey(\"k\");",
        "bool has = (m.count(\"k\") > 0);"
    )]
    #[case("String s = \"ab\";\nint n = s.length();", "int n = s.size();")]
    #[case("String s = \"ab\";\nchar c = s.charAt(1);", "char c = s.at(1);")]
    #[case("String s = \"ab\";\nboolean same = s.equals(\"ab\");", "bool same = (s == \"ab\");")]
    #[case("int[] a = {1};\nint n = a.length;", "int n = a.size();")]
    fn renders_container_idioms(#[case] body: &str, #[case] expected: &str) {
        let rendered = main_body(body);
        assert_eq!(rendered.lines().last(), Some(expected), "in:\n{}", rendered);
    }

    #[test]
    fn renders_control_flow() {
        let body = "int x = 3;\n\
                    if (x > 1) {\n\
                    x = 1;\n\
                    } else if (x < 0) {\n\
                    x = 0;\n\
                    } else {\n\
                    x = 2;\n\
                    }\n\
                    while (x < 10) {\n\
                    x += 2;\n\
                    }\n\
                    do {\n\
                    x--;\n\
                    } while (x > 0);\n\
                    for (int i = 0; i < 3; i++) {\n\
                    continue;\n\
                    }";
        let expected = "int x = 3;\n\
                        if (x > 1) {\n    x = 1;\n}\n\
                        else if (x < 0) {\n    x = 0;\n}\n\
                        else {\n    x = 2;\n}\n\
                        while (x < 10) {\n    x += 2;\n}\n\
                        do {\n    x--;\n} while (x > 0);\n\
                        for (int i = 0; i < 3; i++) {\n    continue;\n}";
        assert_eq!(main_body(body), expected);
    }

    #[test]
    fn renders_switch_with_scoped_declarations() {
        let body = "char g = 'A';\n\
                    switch (g) {\n\
                    case 'A':\n\
                    int bonus = 1;\n\
                    break;\n\
                    case 'B':\n\
                    break;\n\
                    default:\n\
                    System.out.println(\"none\");\n\
                    }";
        let expected = "char g = 'A';\n\
                        switch (g) {\n\
                        case 'A': {\n    int bonus = 1;\n    break;\n}\n\
                        case 'B':\n    break;\n\
                        default:\n    std::cout << \"none\" << std::endl;\n\
                        }";
        assert_eq!(main_body(body), expected);
    }

    #[test]
    fn flattens_the_class() {
        let source = "public class Shop {\n\
                      static int stock = 3;\n\
                      public static void main(String[] args) {\n\
                      System.out.println(twice(stock));\n\
                      return;\n\
                      }\n\
                      static int twice(int n) {\n\
                      return n * 2;\n\
                      }\n\
                      static void fill(int[] slots, ArrayList<String> names) {\n\
                      slots[0] = Shop.stock;\n\
                      }\n\
                      }\n";
        let program = parse(source);
        let out = CppCodeGenerator::new(&program).generate().unwrap();
        let expected = "#include <iostream>\n\
                        #include <string>\n\
                        #include <vector>\n\
                        \n\
                        int stock = 3;\n\
                        \n\
                        int twice(int n);\n\
                        void fill(std::vector<int>& slots, std::vector<std::string>& names);\n\
                        \n\
                        int main(int argc, char* argv[])\n\
                        {\n\
                        \x20   std::cout << twice(stock) << std::endl;\n\
                        \x20   return 0;\n\
                        }\n\
                        \n\
                        int twice(int n)\n\
                        {\n\
                        \x20   return n * 2;\n\
                        }\n\
                        \n\
                        void fill(std::vector<int>& slots, std::vector<std::string>& names)\n\
                        {\n\
                        \x20   slots[0] = stock;\n\
                        }\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn honours_indent_and_prototype_settings() {
        let source = "public class A {\n\
                      static void f() {\n\
                      if (true) {\n\
                      return;\n\
                      }\n\
                      }\n\
                      }\n";
        let program = parse(source);
        let config = CompilerConfig::new().indent_width(2).emit_prototypes(false);
        let out = CppBackend.generate(&program, &config).unwrap();
        assert_eq!(
            out,
            "#include <iostream>\n#include <string>\n\nvoid f()\n{\n  if (true) {\n    return;\n  }\n}\n"
        );
    }

    #[test]
    fn generation_is_repeatable() {
        let program = parse(&in_main("ArrayList<String> l = new ArrayList<>();"));
        let mut generator = CppCodeGenerator::new(&program);
        let first = generator.generate().unwrap();
        assert_eq!(generator.generate().unwrap(), first);
    }

    #[test]
    fn floating_values_print_through_format_number() {
        let source = in_main("double d = 1.5;\nfloat f = 0.1f;\nString s = \"d=\" + d;\nSystem.out.println(f);");
        let program = parse(&source);
        let out = CppCodeGenerator::new(&program).indent_width(2).generate().unwrap();
        let expected = "#include <iomanip>\n\
                        #include <iostream>\n\
                        #include <sstream>\n\
                        #include <string>\n\
                        \n\
                        std::string format_number(double value, int digits)\n\
                        {\n\
                        \x20 std::ostringstream out;\n\
                        \x20 out << std::setprecision(digits) << value;\n\
                        \x20 std::string text = out.str();\n\
                        \x20 if (text.find_first_of(\".en\") == std::string::npos) {\n\
                        \x20   text += \".0\";\n\
                        \x20 }\n\
                        \x20 return text;\n\
                        }\n\
                        \n\
                        int main(int argc, char* argv[])\n\
                        {\n\
                        \x20 double d = 1.5;\n\
                        \x20 float f = 0.1f;\n\
                        \x20 std::string s = std::string(\"d=\") + format_number(d, 15);\n\
                        \x20 std::cout << format_number(f, 7) << std::endl;\n\
                        }\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn integral_programs_skip_the_number_helper() {
        let program = parse(&in_main("int n = 2;\nSystem.out.println(\"n\" + n);"));
        let out = CppCodeGenerator::new(&program).generate().unwrap();
        assert!(!out.contains("format_number"));
        assert!(!out.contains("<sstream>"));
    }

    #[test]
    fn null_becomes_an_empty_value_of_the_return_type() {
        let source = "public class Main {\n\
                      public static void main(String[] args) {\n\
                      }\n\
                      static String none() {\n\
                      return null;\n\
                      }\n\
                      }\n";
        let program = parse(source);
        let out = CppCodeGenerator::new(&program).generate().unwrap();
        assert!(out.contains("std::string none()\n{\n    return std::string();\n}\n"), "{}", out);
        assert!(!out.contains("nullptr"));
    }

    #[test]
    fn null_without_a_target_type_is_unsupported() {
        let program = parse(&in_main("String s = \"a\";\nboolean b = s == null;"));
        let err = CppCodeGenerator::new(&program).generate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported construct: null outside a declaration, assignment or return"
        );
    }

    #[test]
    fn user_class_values_are_unsupported() {
        let source = "public class Main {\n\
                      public static void main(String[] args) {\n\
                      Main m = new Main();\n\
                      }\n\
                      }\n";
        let program = parse(source);
        let err = CppCodeGenerator::new(&program).generate().unwrap_err();
        assert!(matches!(err, CppGenError::Unsupported(_)));
        assert_eq!(err.to_string(), "Unsupported construct: values of user-defined class Main");
    }
}
