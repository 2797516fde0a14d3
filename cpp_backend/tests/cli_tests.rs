use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rstest::rstest;

const GREETER: &str = "public class Greeter {\n\
                       public static void main(String[] args) {\n\
                       int times = 2;\n\
                       for (int i = 0; i < times; i++) {\n\
                       System.out.println(greeting(i));\n\
                       }\n\
                       }\n\
                       static String greeting(int n) {\n\
                       return \"hello \" + n;\n\
                       }\n\
                       }\n";

const BROKEN: &str = "public class Broken {\n\
                      public static void main(String[] args) {\n\
                      int x = 1;\n\
                      boolean b = x;\n\
                      String s = y;\n\
                      }\n\
                      }\n";

fn java2cpp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_java2cpp"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("binary should run")
}

fn write_source(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn compile_writes_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Greeter.java", GREETER);
    let output = dir.path().join("greeter.cpp");

    let out = java2cpp(&["compile", &input, "-o", &output.to_string_lossy()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());

    let cpp = fs::read_to_string(&output).unwrap();
    assert!(cpp.starts_with("#include <iostream>\n#include <string>\n\n"));
    assert!(cpp.contains("std::string greeting(int n);\n"));
    assert!(cpp.contains("    return std::string(\"hello \") + std::to_string(n);\n"));
    assert!(cpp.contains("        std::cout << greeting(i) << std::endl;\n"));
}

#[test]
fn compile_prints_to_stdout_with_settings() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Greeter.java", GREETER);

    let out = java2cpp(&["compile", &input, "--indent", "2", "--no-prototypes"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let cpp = stdout(&out);
    assert!(!cpp.contains("greeting(int n);"));
    assert!(cpp.contains("\n  for (int i = 0; i < times; i++) {\n    std::cout"));
}

#[rstest]
#[case(&[], 2)]
#[case(&["--fail-fast"], 1)]
fn check_reports_every_error_unless_fail_fast(#[case] flags: &[&str], #[case] expected: usize) {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Broken.java", BROKEN);

    let mut args = vec!["check", input.as_str()];
    args.extend_from_slice(flags);
    let out = java2cpp(&args);
    assert_eq!(out.status.code(), Some(1));

    let diagnostics: Vec<String> = stderr(&out).lines().map(str::to_string).collect();
    let all = [
        "Cannot assign int to variable of type boolean at line 4",
        "Undefined variable: y at line 5",
    ];
    assert_eq!(diagnostics, all[..expected].to_vec());
}

#[test]
fn check_accepts_a_valid_program() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Greeter.java", GREETER);
    let out = java2cpp(&["check", &input]);
    assert!(out.status.success());
    assert!(stdout(&out).ends_with("no errors found\n"));
}

#[test]
fn parse_errors_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Bad.java", "public class Bad {\nint x = ;\n}\n");
    let out = java2cpp(&["compile", &input]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert_eq!(stderr(&out).trim_end(), "Expected expression, found ';' at line 2");
}

#[test]
fn missing_input_is_reported() {
    let out = java2cpp(&["compile", "/no/such/Input.java"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("error: failed to read /no/such/Input.java"));
}

#[test]
fn lexed_dump_parses_like_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "Greeter.java", GREETER);
    let dump = dir.path().join("tokens.txt");

    let lexed = java2cpp(&["lex", &input, "-o", &dump.to_string_lossy()]);
    assert!(lexed.status.success(), "{}", stderr(&lexed));
    let first = fs::read_to_string(&dump).unwrap();
    assert_eq!(
        first.lines().next(),
        Some("Token: KEYWORD Lexem: @public@ Line: 1 Id: 1")
    );

    let from_dump = java2cpp(&["parse", "--from-dump", &dump.to_string_lossy()]);
    let from_source = java2cpp(&["parse", &input]);
    assert!(from_dump.status.success(), "{}", stderr(&from_dump));
    assert_eq!(stdout(&from_dump), stdout(&from_source));
    assert!(stdout(&from_source).starts_with("Program"));
}
