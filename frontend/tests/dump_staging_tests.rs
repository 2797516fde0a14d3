use std::fs::File;
use std::io::{BufReader, Write};

use frontend::parser::{DumpTokenSource, ParserErrorKind};
use frontend::token::dump_tokens;
use frontend::{tokenize, Parser};

const SOURCE: &str = "public class Main {\n\
                      public static void main(String[] args) {\n\
                      String tag = \"a@b\";\n\
                      int x = -5;\n\
                      System.out.println(tag + x);\n\
                      }\n\
                      }\n";

#[test]
fn staged_tokens_parse_like_in_memory_tokens() {
    let tokens = tokenize(SOURCE);
    let mut staged = tempfile::NamedTempFile::new().unwrap();
    staged.write_all(dump_tokens(&tokens).as_bytes()).unwrap();
    staged.flush().unwrap();

    let reader = BufReader::new(File::open(staged.path()).unwrap());
    let from_dump = Parser::with_source(DumpTokenSource::new(reader))
        .parse_program()
        .unwrap();
    let in_memory = Parser::new(tokens).parse_program().unwrap();
    assert_eq!(from_dump, in_memory);
}

#[test]
fn dump_lines_use_staging_format() {
    let dump = dump_tokens(&tokenize("int x = -5;"));
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Token: KEYWORD Lexem: @int@ Line: 1 Id: 1",
            "Token: IDENTIFIER Lexem: @x@ Line: 1 Id: 2",
            "Token: OPERATOR Lexem: @=@ Line: 1 Id: 3",
            "Token: NUMBER Lexem: @-5@ Line: 1 Id: 5",
            "Token: OPERATOR Lexem: @;@ Line: 1 Id: 6",
        ]
    );
}

#[test]
fn malformed_dump_line_fails_the_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.txt");
    std::fs::write(
        &path,
        "Token: KEYWORD Lexem: @public@ Line: 1 Id: 1\nnot a token line\n",
    )
    .unwrap();

    let reader = BufReader::new(File::open(&path).unwrap());
    let err = Parser::with_source(DumpTokenSource::new(reader))
        .parse_program()
        .unwrap_err();
    assert!(matches!(err.kind, ParserErrorKind::MalformedDump { .. }));
    assert_eq!(err.line, 2);
}

#[test]
fn malformed_line_after_the_last_class_fails_the_parse() {
    let mut dump = dump_tokens(&tokenize("public class A {\nstatic void f() {\n}\n}\n"));
    let valid_lines = dump.lines().count() as u32;
    dump.push_str("garbage line\n");

    let err = Parser::with_source(DumpTokenSource::new(dump.as_bytes()))
        .parse_program()
        .unwrap_err();
    assert!(matches!(err.kind, ParserErrorKind::MalformedDump { .. }));
    assert_eq!(err.line, valid_lines + 1);
}
