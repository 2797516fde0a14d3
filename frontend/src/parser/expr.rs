use super::core::Parser;
use super::decl::{parse_array_init, parse_type_arguments};
use super::error::{ParserError, ParserResult};
use crate::ast::*;
use crate::lexer::tokenize;
use crate::token::{is_type_keyword, Kind, Token};

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> ParserResult<Expr> {
        parse_expr(self)
    }
}

/// Entry point; assignment is the loosest-binding layer.
pub fn parse_expr(parser: &mut Parser) -> ParserResult<Expr> {
    parse_assignment(parser)
}

fn peek_operator_in(parser: &mut Parser, ops: &[&str]) -> Option<Token> {
    match parser.peek() {
        Some(t) if t.kind == Kind::Operator && ops.contains(&t.lexeme.as_str()) => Some(t.clone()),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, line: Line) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
    )
}

/// Right associative: `a = b = c`, `x += y`.
fn parse_assignment(parser: &mut Parser) -> ParserResult<Expr> {
    let left = parse_or(parser)?;
    let Some(op) = peek_operator_in(parser, ASSIGN_OPS) else {
        return Ok(left);
    };
    parser.next();
    let right = if op.lexeme == "=" && parser.check_operator("{") {
        parse_array_init(parser)?
    } else {
        parse_assignment(parser)?
    };
    if op.lexeme == "=" {
        return Ok(Expr::new(
            ExprKind::Assignment {
                target: Box::new(left),
                value: Box::new(right),
            },
            op.line,
        ));
    }
    match BinaryOp::from_lexeme(&op.lexeme) {
        Some(bin) => Ok(binary(bin, left, right, op.line)),
        None => Err(ParserError::unexpected_token(op.line, "assignment operator", op.lexeme)),
    }
}

/// One left-associative binary layer over `next`.
fn parse_binary_layer(
    parser: &mut Parser,
    ops: &[&str],
    next: fn(&mut Parser) -> ParserResult<Expr>,
) -> ParserResult<Expr> {
    let mut left = next(parser)?;
    while let Some(op) = peek_operator_in(parser, ops) {
        parser.next();
        let right = next(parser)?;
        let Some(bin) = BinaryOp::from_lexeme(&op.lexeme) else {
            return Err(ParserError::unexpected_token(op.line, "binary operator", op.lexeme));
        };
        left = binary(bin, left, right, op.line);
    }
    Ok(left)
}

fn parse_or(parser: &mut Parser) -> ParserResult<Expr> {
    parse_binary_layer(parser, &["||"], parse_and)
}

fn parse_and(parser: &mut Parser) -> ParserResult<Expr> {
    parse_binary_layer(parser, &["&&"], parse_equality)
}

fn parse_equality(parser: &mut Parser) -> ParserResult<Expr> {
    parse_binary_layer(parser, &["==", "!="], parse_relational)
}

fn parse_relational(parser: &mut Parser) -> ParserResult<Expr> {
    parse_binary_layer(parser, &["<", ">", "<=", ">="], parse_additive)
}

/// `+` and `-`. The lexer folds a sign into a number that follows
/// whitespace (`i -1`), so a signed number here is split back into an
/// operator and an unsigned operand.
fn parse_additive(parser: &mut Parser) -> ParserResult<Expr> {
    let mut left = parse_term(parser)?;
    loop {
        if let Some(op) = peek_operator_in(parser, &["+", "-"]) {
            parser.next();
            let right = parse_term(parser)?;
            let bin = if op.lexeme == "+" { BinaryOp::Add } else { BinaryOp::Sub };
            left = binary(bin, left, right, op.line);
            continue;
        }
        let signed = match parser.peek() {
            Some(t)
                if matches!(t.kind, Kind::Number | Kind::FloatNumber)
                    && (t.lexeme.starts_with('-') || t.lexeme.starts_with('+')) =>
            {
                t.clone()
            }
            _ => return Ok(left),
        };
        parser.next();
        let unsigned = Token::new(signed.kind, &signed.lexeme[1..], signed.line, signed.id);
        parser.push_front(unsigned);
        let right = parse_term(parser)?;
        let bin = if signed.lexeme.starts_with('+') { BinaryOp::Add } else { BinaryOp::Sub };
        left = binary(bin, left, right, signed.line);
    }
}

fn parse_term(parser: &mut Parser) -> ParserResult<Expr> {
    parse_binary_layer(parser, &["*", "/", "%"], parse_unary)
}

/// Prefix `++ -- ! -` and a redundant `+`.
fn parse_unary(parser: &mut Parser) -> ParserResult<Expr> {
    let Some(token) = peek_operator_in(parser, &["++", "--", "!", "-", "+"]) else {
        return parse_postfix(parser);
    };
    parser.next();
    let operand = parse_unary(parser)?;
    let op = match token.lexeme.as_str() {
        "++" => UnaryOp::PreInc,
        "--" => UnaryOp::PreDec,
        "!" => UnaryOp::Not,
        "-" => UnaryOp::Neg,
        _ => return Ok(operand),
    };
    Ok(Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        token.line,
    ))
}

/// Member access, calls, indexing, then an optional postfix `++`/`--`.
fn parse_postfix(parser: &mut Parser) -> ParserResult<Expr> {
    let mut expr = parse_primary(parser)?;
    loop {
        if parser.accept_operator(".") {
            let name = parser.advance_checked()?;
            if !matches!(name.kind, Kind::Identifier | Kind::Keyword) {
                return Err(ParserError::unexpected_token(name.line, "member name", name.lexeme));
            }
            // `obj.items[0]` glues the index onto the member name
            let (member, indices) = split_glued(parser, &name)?;
            if parser.check_operator("(") && indices.is_empty() {
                let args = parse_arguments(parser)?;
                expr = Expr::new(
                    ExprKind::MethodCall {
                        receiver: Some(Box::new(expr)),
                        name: member,
                        args,
                    },
                    name.line,
                );
            } else {
                expr = Expr::new(
                    ExprKind::FieldAccess {
                        object: Box::new(expr),
                        field: member,
                    },
                    name.line,
                );
                expr = wrap_indices(expr, indices);
            }
        } else if parser.check_operator("[") {
            let open = parser.expect_operator("[")?;
            let index = parse_expr(parser)?;
            parser.expect_operator("]")?;
            expr = Expr::new(
                ExprKind::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                },
                open.line,
            );
        } else if let Some(op) = peek_operator_in(parser, &["++", "--"]) {
            parser.next();
            let op = if op.lexeme == "++" { UnaryOp::PostInc } else { UnaryOp::PostDec };
            let line = expr.line;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(expr),
                },
                line,
            ));
        } else {
            return Ok(expr);
        }
    }
}

fn parse_arguments(parser: &mut Parser) -> ParserResult<Vec<Expr>> {
    parser.expect_operator("(")?;
    let mut args = Vec::new();
    if parser.accept_operator(")") {
        return Ok(args);
    }
    loop {
        args.push(parse_expr(parser)?);
        if parser.accept_operator(")") {
            return Ok(args);
        }
        parser.expect_operator(",")?;
    }
}

fn literal(value: LiteralValue, token: &Token) -> Expr {
    Expr::new(
        ExprKind::Literal(Literal {
            value,
            text: token.lexeme.clone(),
        }),
        token.line,
    )
}

/// Strips the surrounding quote characters of a string or char lexeme.
fn unquote(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

pub fn parse_primary(parser: &mut Parser) -> ParserResult<Expr> {
    let Some(token) = parser.peek().cloned() else {
        return Err(parser.error_expected("expression"));
    };

    match token.kind {
        Kind::Number => {
            parser.next();
            let value = token
                .lexeme
                .parse::<i64>()
                .map_err(|_| ParserError::invalid_literal(token.line, &token.lexeme))?;
            Ok(literal(LiteralValue::Int(value), &token))
        }
        Kind::FloatNumber => {
            parser.next();
            let digits = token.lexeme.trim_end_matches(['f', 'F', 'd', 'D']);
            let value = digits
                .parse::<f64>()
                .map_err(|_| ParserError::invalid_literal(token.line, &token.lexeme))?;
            let value = if token.lexeme.ends_with(['f', 'F']) {
                LiteralValue::Float(value)
            } else {
                LiteralValue::Double(value)
            };
            Ok(literal(value, &token))
        }
        Kind::StringLiteral => {
            parser.next();
            Ok(literal(LiteralValue::Str(unquote(&token.lexeme)), &token))
        }
        Kind::CharLiteral => {
            parser.next();
            Ok(literal(LiteralValue::Char(unquote(&token.lexeme)), &token))
        }
        Kind::Operator if token.lexeme == "(" => {
            parser.next();
            let inner = parse_expr(parser)?;
            parser.expect_operator(")")?;
            Ok(inner)
        }
        Kind::Keyword => match token.lexeme.as_str() {
            "true" | "false" => {
                parser.next();
                Ok(literal(LiteralValue::Boolean(token.lexeme == "true"), &token))
            }
            "null" => {
                parser.next();
                Ok(literal(LiteralValue::Null, &token))
            }
            "new" => parse_new(parser),
            // static references such as `String.valueOf(x)`
            word if is_type_keyword(word) && parser.check_operator_at(1, ".") => {
                parser.next();
                Ok(Expr::new(ExprKind::Variable(token.lexeme.clone()), token.line))
            }
            _ => Err(ParserError::unexpected_token(token.line, "expression", token.lexeme)),
        },
        Kind::Identifier => {
            parser.next();
            let (name, indices) = split_glued(parser, &token)?;
            if indices.is_empty() && parser.check_operator("(") {
                let args = parse_arguments(parser)?;
                return Ok(Expr::new(
                    ExprKind::MethodCall {
                        receiver: None,
                        name,
                        args,
                    },
                    token.line,
                ));
            }
            let variable = Expr::new(ExprKind::Variable(name), token.line);
            Ok(wrap_indices(variable, indices))
        }
        Kind::Error => Err(ParserError::lexical_error(token.line, token.lexeme)),
        _ => Err(ParserError::unexpected_token(token.line, "expression", token.lexeme)),
    }
}

fn wrap_indices(base: Expr, indices: Vec<Expr>) -> Expr {
    indices.into_iter().fold(base, |array, index| {
        let line = array.line;
        Expr::new(
            ExprKind::ArrayAccess {
                array: Box::new(array),
                index: Box::new(index),
            },
            line,
        )
    })
}

/// The lexer glues `[` and `]` onto identifiers, so `arr[i]` and even
/// `arr[i` (from `arr[i + 1]`) arrive as one lexeme. Splits the name from
/// its bracket suffix, pulls in following tokens until the brackets
/// balance, re-lexes the bracket text and parses each `[index]` group.
/// Text left after the last group is pushed back into the stream.
fn split_glued(parser: &mut Parser, token: &Token) -> ParserResult<(String, Vec<Expr>)> {
    let Some(open) = token.lexeme.find('[') else {
        return Ok((token.lexeme.clone(), Vec::new()));
    };
    let name = token.lexeme[..open].to_string();
    let mut suffix = token.lexeme[open..].to_string();

    if suffix.len() % 2 == 0 && suffix.as_bytes().chunks(2).all(|pair| pair == b"[]") {
        // a bare array type name such as `int[][]`
        return Ok((token.lexeme.clone(), Vec::new()));
    }

    while bracket_depth(&suffix) > 0 {
        let next = parser.advance_checked()?;
        suffix.push(' ');
        suffix.push_str(&next.lexeme);
    }

    let (groups, rest) = split_bracket_groups(&suffix);
    // spaced out so the re-lex does not glue `]` onto `i` again
    let mut tokens = tokenize(&groups.replace('[', " [ ").replace(']', " ] "));
    for t in &mut tokens {
        t.line = token.line;
    }

    let mut leftover = tokenize(rest);
    while let Some(mut t) = leftover.pop() {
        t.line = token.line;
        parser.push_front(t);
    }

    let mut sub = Parser::new(tokens);
    let mut indices = Vec::new();
    while !sub.is_at_end() {
        sub.expect_operator("[")?;
        if sub.check_operator("]") {
            return Err(ParserError::unexpected_token(token.line, "index expression", "]"));
        }
        indices.push(parse_expr(&mut sub)?);
        sub.expect_operator("]")?;
    }
    Ok((name, indices))
}

fn bracket_depth(text: &str) -> i32 {
    text.chars().fold(0, |depth, c| match c {
        '[' => depth + 1,
        ']' => depth - 1,
        _ => depth,
    })
}

/// Splits `[i][j]].length` into the balanced groups `[i][j]` and the rest.
fn split_bracket_groups(text: &str) -> (&str, &str) {
    let mut depth = 0;
    let mut end = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    end = i + 1;
                    if !text[end..].trim_start().starts_with('[') {
                        break;
                    }
                }
                if depth < 0 {
                    break;
                }
            }
            _ if depth == 0 && !c.is_whitespace() => break,
            _ => {}
        }
    }
    (&text[..end], &text[end..])
}

/// `new T()`, `new T<..>()`, `new T<>()`, `new T[n]` and `new T[] {..}`.
fn parse_new(parser: &mut Parser) -> ParserResult<Expr> {
    let keyword = parser.expect_keyword("new")?;
    let type_token = match parser.peek() {
        Some(t) if matches!(t.kind, Kind::Identifier | Kind::Keyword) => parser.advance_checked()?,
        _ => return Err(parser.error_expected("type after 'new'")),
    };

    let (name, mut sizes) = split_glued(parser, &type_token)?;
    let mut ty = TypeRef::from_lexeme(&name);
    let mut diamond = false;

    if sizes.is_empty() && ty.dimensions == 0 && parser.check_operator("<") {
        let (args, is_diamond) = parse_type_arguments(parser)?;
        ty.args = args;
        diamond = is_diamond;
    }

    if sizes.is_empty() && ty.dimensions == 0 && parser.check_operator("[") {
        parser.expect_operator("[")?;
        sizes.push(parse_expr(parser)?);
        parser.expect_operator("]")?;
    }

    if !sizes.is_empty() {
        let dims = sizes.len() as u32;
        let mut sizes = sizes.into_iter();
        let size = sizes.next().map(Box::new);
        if sizes.next().is_some() {
            return Err(ParserError::unsupported(keyword.line, "Multi-dimensional array allocations"));
        }
        return Ok(Expr::new(
            ExprKind::New {
                ty: ty.array_of(dims),
                size,
                diamond,
            },
            keyword.line,
        ));
    }

    if ty.dimensions > 0 {
        // `new int[] {1, 2}` is just an array initializer
        return parse_array_init(parser);
    }

    let args = parse_arguments(parser)?;
    if !args.is_empty() {
        return Err(ParserError::unsupported(keyword.line, "Constructor arguments"));
    }
    Ok(Expr::new(ExprKind::New { ty, size: None, diamond }, keyword.line))
}
