use log::trace;

use super::core::Parser;
use super::error::{ParserError, ParserResult};
use super::{expr, stmt};
use crate::ast::*;
use crate::token::{is_type_keyword, Kind, Token};

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "final", "abstract", "synchronized", "native",
    "transient", "volatile", "strictfp",
];

/// Skips everything before the first `public` (imports, package lines),
/// then parses class declarations until input is exhausted.
pub fn parse_program(parser: &mut Parser) -> ParserResult<Program> {
    while let Some(token) = parser.peek() {
        if token.is_keyword("public") {
            break;
        }
        parser.next();
    }
    if parser.is_at_end() {
        return Err(parser.error_expected("'public' class declaration"));
    }

    let line = parser.current_line();
    let mut classes = Vec::new();
    while !parser.is_at_end() {
        classes.push(parse_class(parser)?);
    }
    if let Some(err) = parser.take_source_error() {
        return Err(err);
    }
    Ok(Program { classes, line })
}

pub fn parse_class(parser: &mut Parser) -> ParserResult<ClassDecl> {
    skip_modifiers(parser);
    parser.expect_keyword("class")?;
    let name = parser.expect_identifier()?;
    trace!("class {} at line {}", name.lexeme, name.line);
    if parser.check_keyword("extends") || parser.check_keyword("implements") {
        return Err(ParserError::unsupported(parser.current_line(), "Class inheritance clauses"));
    }
    parser.expect_operator("{")?;

    let mut members = Vec::new();
    loop {
        if parser.accept_operator("}") {
            break;
        }
        if parser.is_at_end() {
            return Err(parser.error_expected("'}'"));
        }
        members.push(parse_member(parser)?);
    }

    Ok(ClassDecl {
        name: name.lexeme,
        members,
        line: name.line,
    })
}

/// Returns whether `static` was among the skipped modifiers.
fn skip_modifiers(parser: &mut Parser) -> bool {
    let mut is_static = false;
    while let Some(token) = parser.peek() {
        if token.kind != Kind::Keyword || !MODIFIERS.contains(&token.lexeme.as_str()) {
            break;
        }
        is_static |= token.lexeme == "static";
        parser.next();
    }
    is_static
}

/// `modifiers type name (...) block` or `modifiers type name [= init];`
pub fn parse_member(parser: &mut Parser) -> ParserResult<Member> {
    let is_static = skip_modifiers(parser);
    let ty = parse_type(parser)?;
    let name = parser.expect_identifier()?;
    let (name_text, extra_dims) = split_declarator(&name.lexeme);

    if parser.check_operator("(") {
        let params = parse_parameters(parser)?;
        let body = stmt::parse_block(parser)?;
        return Ok(Member::Method(MethodDecl {
            name: name_text,
            return_type: ty.array_of(extra_dims),
            params,
            body,
            is_static,
            line: name.line,
        }));
    }

    let init = parse_optional_initializer(parser)?;
    parser.expect_operator(";")?;
    Ok(Member::Field(FieldDecl {
        name: name_text,
        ty: ty.array_of(extra_dims),
        init,
        is_static,
        line: name.line,
    }))
}

fn parse_parameters(parser: &mut Parser) -> ParserResult<Vec<Parameter>> {
    parser.expect_operator("(")?;
    let mut params = Vec::new();
    if parser.accept_operator(")") {
        return Ok(params);
    }
    loop {
        parser.accept_keyword("final");
        let ty = parse_type(parser)?;
        let name = parser.expect_identifier()?;
        let (name_text, extra_dims) = split_declarator(&name.lexeme);
        params.push(Parameter {
            name: name_text,
            ty: ty.array_of(extra_dims),
            line: name.line,
        });
        if parser.accept_operator(")") {
            return Ok(params);
        }
        parser.expect_operator(",")?;
    }
}

/// `int arr[]` style declarators carry their dimensions on the name.
pub fn split_declarator(lexeme: &str) -> (String, u32) {
    let parsed = TypeRef::from_lexeme(lexeme);
    (parsed.name, parsed.dimensions)
}

/// Whether the upcoming tokens start a local variable declaration.
pub fn at_declaration_start(parser: &mut Parser) -> bool {
    let Some(token) = parser.peek() else {
        return false;
    };
    match token.kind {
        Kind::Keyword if token.lexeme == "final" => true,
        Kind::Keyword if is_type_keyword(&token.lexeme) => !parser.check_operator_at(1, "."),
        Kind::Identifier => parser.check_kind_at(1, Kind::Identifier),
        _ => false,
    }
}

/// `type name [= init]`, without the terminating `;`.
pub fn parse_var_decl(parser: &mut Parser) -> ParserResult<VarDecl> {
    parser.accept_keyword("final");
    let ty = parse_type(parser)?;
    let name = parser.expect_identifier()?;
    let (name_text, extra_dims) = split_declarator(&name.lexeme);
    let init = parse_optional_initializer(parser)?;
    Ok(VarDecl {
        name: name_text,
        ty: ty.array_of(extra_dims),
        init,
        line: name.line,
    })
}

fn parse_optional_initializer(parser: &mut Parser) -> ParserResult<Option<Expr>> {
    if !parser.accept_operator("=") {
        return Ok(None);
    }
    parse_initializer(parser).map(Some)
}

/// Either a brace-delimited array initializer or an ordinary expression.
pub fn parse_initializer(parser: &mut Parser) -> ParserResult<Expr> {
    if parser.check_operator("{") {
        return parse_array_init(parser);
    }
    expr::parse_expr(parser)
}

pub fn parse_array_init(parser: &mut Parser) -> ParserResult<Expr> {
    let open = parser.expect_operator("{")?;
    let mut elements = Vec::new();
    if !parser.accept_operator("}") {
        loop {
            elements.push(parse_initializer(parser)?);
            if parser.accept_operator("}") {
                break;
            }
            parser.expect_operator(",")?;
            // trailing comma
            if parser.accept_operator("}") {
                break;
            }
        }
    }
    Ok(Expr::new(ExprKind::ArrayInit(elements), open.line))
}

/// Type names: primitive keywords (`int`, `int[]`), class identifiers and
/// the container keywords with a hand-parsed `<...>` argument list.
pub fn parse_type(parser: &mut Parser) -> ParserResult<TypeRef> {
    let token = match parser.peek() {
        Some(t) if (t.kind == Kind::Keyword && is_type_keyword(&t.lexeme)) || t.kind == Kind::Identifier => {
            parser.advance_checked()?
        }
        _ => return Err(parser.error_expected("type name")),
    };

    let mut ty = TypeRef::from_lexeme(&token.lexeme);
    if ty.dimensions == 0 && parser.check_operator("<") {
        let (args, _) = parse_type_arguments(parser)?;
        ty.args = args;
    }
    while parser.check_operator("[") && parser.check_operator_at(1, "]") {
        parser.next();
        parser.next();
        ty.dimensions += 1;
    }
    Ok(ty)
}

/// Parses `<A, B<C>>`, returning the arguments and whether the list was the
/// empty diamond `<>`. Closing `>>` and `>>>` tokens are split so nested
/// lists each consume one `>`.
pub fn parse_type_arguments(parser: &mut Parser) -> ParserResult<(Vec<TypeRef>, bool)> {
    parser.expect_operator("<")?;
    if parser.accept_operator(">") {
        return Ok((Vec::new(), true));
    }
    let mut args = Vec::new();
    loop {
        args.push(parse_type(parser)?);
        if parser.accept_operator(",") {
            continue;
        }
        close_angle(parser)?;
        return Ok((args, false));
    }
}

fn close_angle(parser: &mut Parser) -> ParserResult<()> {
    let token = match parser.peek() {
        Some(t) if t.kind == Kind::Operator && matches!(t.lexeme.as_str(), ">" | ">>" | ">>>") => {
            parser.advance_checked()?
        }
        _ => return Err(parser.error_expected("'>'")),
    };
    if token.lexeme.len() > 1 {
        let rest = &token.lexeme[1..];
        parser.push_front(Token::new(Kind::Operator, rest, token.line, token.id));
    }
    Ok(())
}
