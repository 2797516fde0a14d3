use super::core::Parser;
use super::decl::{at_declaration_start, parse_var_decl};
use super::error::{ParserError, ParserResult};
use super::expr::parse_expr;
use crate::ast::*;
use crate::token::Kind;

impl<'a> Parser<'a> {
    pub fn parse_stmt(&mut self) -> ParserResult<Stmt> {
        parse_stmt(self)
    }
}

pub fn parse_block(parser: &mut Parser) -> ParserResult<Block> {
    let open = parser.expect_operator("{")?;
    let mut stmts = Vec::new();
    loop {
        if parser.accept_operator("}") {
            return Ok(Block::new(stmts, open.line));
        }
        if parser.is_at_end() {
            return Err(parser.error_expected("'}'"));
        }
        stmts.push(parse_stmt(parser)?);
    }
}

/// Statement dispatch by lookahead. Keyword-led statements route on the
/// keyword; identifier-led ones look one token further to tell a
/// declaration (`Type name`) from an expression statement, which covers
/// assignments, `System.out.println(...)` and direct calls alike.
pub fn parse_stmt(parser: &mut Parser) -> ParserResult<Stmt> {
    let Some(token) = parser.peek().cloned() else {
        return Err(parser.error_expected("statement"));
    };

    match (token.kind, token.lexeme.as_str()) {
        (Kind::Operator, "{") => {
            let block = parse_block(parser)?;
            let line = block.line;
            Ok(Stmt::new(StmtKind::Block(block), line))
        }
        (Kind::Operator, ";") => {
            parser.next();
            Ok(Stmt::new(StmtKind::Block(Block::new(Vec::new(), token.line)), token.line))
        }
        (Kind::Keyword, "if") => parse_if(parser),
        (Kind::Keyword, "while") => parse_while(parser),
        (Kind::Keyword, "do") => parse_do_while(parser),
        (Kind::Keyword, "for") => parse_for(parser),
        (Kind::Keyword, "switch") => parse_switch(parser),
        (Kind::Keyword, "break") => {
            parser.next();
            parser.expect_operator(";")?;
            Ok(Stmt::new(StmtKind::Break, token.line))
        }
        (Kind::Keyword, "continue") => {
            parser.next();
            parser.expect_operator(";")?;
            Ok(Stmt::new(StmtKind::Continue, token.line))
        }
        (Kind::Keyword, "return") => {
            parser.next();
            let value = if parser.check_operator(";") {
                None
            } else {
                Some(parse_expr(parser)?)
            };
            parser.expect_operator(";")?;
            Ok(Stmt::new(StmtKind::Return(value), token.line))
        }
        (Kind::Keyword, "case") | (Kind::Keyword, "default") => {
            Err(ParserError::unexpected_token(token.line, "statement", token.lexeme))
        }
        _ if at_declaration_start(parser) => {
            let decl = parse_var_decl(parser)?;
            parser.expect_operator(";")?;
            let line = decl.line;
            Ok(Stmt::new(StmtKind::VarDecl(decl), line))
        }
        _ => {
            let expr = parse_expr(parser)?;
            parser.expect_operator(";")?;
            let line = expr.line;
            Ok(Stmt::new(StmtKind::Expression(expr), line))
        }
    }
}

/// A braced block, or a single statement wrapped into one.
fn parse_body(parser: &mut Parser) -> ParserResult<Block> {
    if parser.check_operator("{") {
        return parse_block(parser);
    }
    let stmt = parse_stmt(parser)?;
    let line = stmt.line;
    Ok(Block::new(vec![stmt], line))
}

/// `( expr )`, returning the condition and the line of the closing paren.
fn parse_condition(parser: &mut Parser) -> ParserResult<(Expr, Line)> {
    parser.expect_operator("(")?;
    let condition = parse_expr(parser)?;
    let close = parser.expect_operator(")")?;
    Ok((condition, close.line))
}

fn parse_if(parser: &mut Parser) -> ParserResult<Stmt> {
    parser.expect_keyword("if")?;
    let (condition, line) = parse_condition(parser)?;
    let then_branch = parse_body(parser)?;
    let else_branch = if parser.accept_keyword("else") {
        if parser.check_keyword("if") {
            let nested = parse_if(parser)?;
            let nested_line = nested.line;
            Some(Block::new(vec![nested], nested_line))
        } else {
            Some(parse_body(parser)?)
        }
    } else {
        None
    };
    Ok(Stmt::new(
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        },
        line,
    ))
}

fn parse_while(parser: &mut Parser) -> ParserResult<Stmt> {
    parser.expect_keyword("while")?;
    let (condition, line) = parse_condition(parser)?;
    let body = parse_body(parser)?;
    Ok(Stmt::new(StmtKind::While { condition, body }, line))
}

fn parse_do_while(parser: &mut Parser) -> ParserResult<Stmt> {
    let keyword = parser.expect_keyword("do")?;
    let body = parse_body(parser)?;
    parser.expect_keyword("while")?;
    let (condition, _) = parse_condition(parser)?;
    parser.expect_operator(";")?;
    Ok(Stmt::new(StmtKind::DoWhile { body, condition }, keyword.line))
}

/// Three-clause `for`; every clause is optional.
fn parse_for(parser: &mut Parser) -> ParserResult<Stmt> {
    let keyword = parser.expect_keyword("for")?;
    parser.expect_operator("(")?;
    if parser.check_operator_at(2, ":") {
        return Err(ParserError::unsupported(keyword.line, "Range-based for loops"));
    }

    let init = if parser.accept_operator(";") {
        None
    } else if at_declaration_start(parser) {
        let decl = parse_var_decl(parser)?;
        parser.expect_operator(";")?;
        let line = decl.line;
        Some(Box::new(Stmt::new(StmtKind::VarDecl(decl), line)))
    } else {
        let expr = parse_expr(parser)?;
        parser.expect_operator(";")?;
        let line = expr.line;
        Some(Box::new(Stmt::new(StmtKind::Expression(expr), line)))
    };

    let condition = if parser.check_operator(";") {
        None
    } else {
        Some(parse_expr(parser)?)
    };
    parser.expect_operator(";")?;

    let update = if parser.check_operator(")") {
        None
    } else {
        Some(parse_expr(parser)?)
    };
    let close = parser.expect_operator(")")?;
    let body = parse_body(parser)?;

    Ok(Stmt::new(
        StmtKind::For {
            init,
            condition,
            update,
            body,
        },
        close.line,
    ))
}

fn parse_switch(parser: &mut Parser) -> ParserResult<Stmt> {
    parser.expect_keyword("switch")?;
    let (condition, line) = parse_condition(parser)?;
    parser.expect_operator("{")?;

    let mut arms = Vec::new();
    loop {
        if parser.accept_operator("}") {
            break;
        }
        let Some(token) = parser.peek().cloned() else {
            return Err(parser.error_expected("'}'"));
        };
        if token.is_keyword("case") {
            parser.next();
            let value = parse_case_label(parser)?;
            parser.expect_operator(":")?;
            let body = parse_arm_body(parser, token.line)?;
            arms.push(SwitchArm::Case {
                value,
                body,
                line: token.line,
            });
        } else if token.is_keyword("default") {
            parser.next();
            parser.expect_operator(":")?;
            let body = parse_arm_body(parser, token.line)?;
            arms.push(SwitchArm::Default { body, line: token.line });
        } else {
            return Err(ParserError::unexpected_token(token.line, "'case' or 'default'", token.lexeme));
        }
    }

    Ok(Stmt::new(StmtKind::Switch { condition, arms }, line))
}

/// Case labels are single literal tokens.
fn parse_case_label(parser: &mut Parser) -> ParserResult<Expr> {
    match parser.peek() {
        Some(t) if matches!(
            t.kind,
            Kind::Number | Kind::FloatNumber | Kind::CharLiteral | Kind::StringLiteral
        ) || t.is_keyword("true")
            || t.is_keyword("false") =>
        {
            super::expr::parse_primary(parser)
        }
        _ => Err(parser.error_expected("literal case label")),
    }
}

fn parse_arm_body(parser: &mut Parser, line: Line) -> ParserResult<Block> {
    let mut stmts = Vec::new();
    loop {
        match parser.peek() {
            None => return Err(parser.error_expected("'}'")),
            Some(t) if t.is_keyword("case") || t.is_keyword("default") || t.is_operator("}") => break,
            Some(_) => stmts.push(parse_stmt(parser)?),
        }
    }
    Ok(Block::new(stmts, line))
}
