use rstest::rstest;

use super::*;
use crate::lexer::tokenize;
use crate::parser::Parser;

fn parse(source: &str) -> Program {
    Parser::new(tokenize(source)).parse_program().expect("source should parse")
}

/// Wraps statements into `main`; the first statement lands on line 3.
fn in_main(body: &str) -> String {
    format!(
        "public class Main {{\n    public static void main(String[] args) {{\n{}\n    }}\n}}\n",
        body
    )
}

fn analyze(source: &str) -> Result<(), Vec<SemanticError>> {
    SemanticAnalyzer::new().analyze(&parse(source))
}

fn messages(source: &str) -> Vec<String> {
    match analyze(source) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}

fn assert_clean(source: &str) {
    let errors = messages(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn int_widens_to_double() {
    assert_clean(&in_main("int age = 25;\ndouble d = age;"));
}

#[test]
fn int_is_not_boolean() {
    let errors = messages(&in_main("int age = 25;\nboolean b = age;"));
    assert_eq!(errors, vec!["Cannot assign int to variable of type boolean at line 4"]);
}

#[test]
fn array_list_substitutes_type_argument() {
    assert_clean(&in_main(
        "ArrayList<String> list = new ArrayList<String>();\n\
         list.add(\"x\");\n\
         int n = list.size();\n\
         String first = list.get(0);",
    ));

    let errors = messages(&in_main(
        "ArrayList<String> list = new ArrayList<String>();\nint bad = list.get(0);",
    ));
    assert_eq!(errors, vec!["Cannot assign String to variable of type int at line 4"]);
}

#[test]
fn diamond_takes_declared_arguments() {
    assert_clean(&in_main(
        "HashMap<String, Integer> counts = new HashMap<>();\n\
         counts.put(\"a\", 1);\n\
         boolean has = counts.containsKey(\"a\");\n\
         int c = counts.get(\"a\");",
    ));
}

#[test]
fn receiver_parameter_mismatch_names_substituted_type() {
    let errors = messages(&in_main(
        "ArrayList<Integer> xs = new ArrayList<>();\nxs.add(true);",
    ));
    assert_eq!(errors, vec!["Parameter type mismatch: expected int, got boolean at line 4"]);
}

#[test]
fn redeclaration_in_same_scope_cites_second_line() {
    let errors = messages(&in_main("int x = 1;\nint x = 2;"));
    assert_eq!(errors, vec!["Variable x is already defined in this scope at line 4"]);
}

#[test]
fn shadowing_in_nested_block_is_allowed() {
    assert_clean(&in_main("int x = 1;\n{\n    int x = 2;\n}"));
}

#[test]
fn continue_in_switch_outside_loop() {
    let source = in_main("int k = 1;\nswitch (k) {\n    case 1:\n        continue;\n}");
    assert_eq!(messages(&source), vec!["Continue outside loop at line 6"]);

    let source = in_main("int k = 1;\nswitch (k) {\n    case 1:\n        break;\n}");
    assert_clean(&source);
}

#[test]
fn continue_inside_loop_inside_switch() {
    assert_clean(&in_main(
        "int k = 1;\nwhile (k < 3) {\n    switch (k) {\n        case 1:\n            k++;\n            continue;\n        default:\n            break;\n    }\n    k++;\n}",
    ));
}

#[rstest]
#[case("if (1) { }", "If condition must be boolean, found int at line 3")]
#[case("while (\"s\") { }", "While condition must be boolean, found String at line 3")]
#[case("do { } while (2.5);", "While condition must be boolean, found double at line 3")]
#[case("for (int i = 0; i; i++) { }", "For condition must be boolean, found int at line 3")]
#[case("break;", "Break outside loop or switch at line 3")]
#[case("int y = z;", "Undefined variable: z at line 3")]
#[case("foo();", "Undefined method: foo at line 3")]
#[case("Foo f;", "Unknown type: Foo at line 3")]
#[case("boolean b = !5;", "Operator ! cannot be applied to type int at line 3")]
#[case("int n = -true;", "Operator - cannot be applied to type boolean at line 3")]
#[case("int n = 1 * \"a\";", "Operator * cannot be applied to types int and String at line 3")]
#[case("boolean b = 1 < true;", "Operator < cannot be applied to types int and boolean at line 3")]
#[case("boolean b = true && 1;", "Operator && cannot be applied to types boolean and int at line 3")]
#[case("System.out.println(1, 2);", "System.out.println requires exactly less than two arguments at line 3")]
#[case("int[] a = new int[true];", "Array size must be int, found: boolean at line 3")]
#[case("int[] a = {1, true};", "Array element type mismatch. Expected int, got boolean at line 3")]
#[case("int v = 5;\nint w = v[0];", "Array access on non-array type at line 4")]
#[case("int[] a = {1};\nint w = a[true];", "Array index must be numeric at line 4")]
#[case("int v = 5;\nv[0] = 1;", "Array access on non-array type: int at line 4")]
#[case("String s = \"x\";\nint n = s.size;", "Cannot access field on non-class type: String at line 4")]
#[case("int x = 1;\nx.length();", "Class 'int' not found at line 4")]
#[case("String s = \"x\";\ns.trim();", "Method 'trim' not found in class String at line 4")]
#[case("String s = \"x\";\nchar c = s.charAt();", "Method expects 1 parameters, got 0 at line 4")]
#[case("int x = 1;\nx += true;", "Invalid operation for types at line 4")]
#[case("int x = 1;\nx += 2.5;", "Cannot apply '+=' to int and double at line 4")]
#[case("double x = 1;\nint y = 2;\ny = x;", "Cannot assign double to variable of type int at line 5")]
#[case("Main m = new int();", "Cannot create an instance of non-class type: int at line 3")]
fn rejects(#[case] body: &str, #[case] expected: &str) {
    assert_eq!(messages(&in_main(body)), vec![expected.to_string()]);
}

#[rstest]
#[case("String s = \"n = \" + 1;")]
#[case("double d = 1 + 2.5f;")]
#[case("float f = 1.5f * 2;")]
#[case("int[] a = {1, 2, 3};\nint n = a.length;\na[0] = a[1] + n;")]
#[case("int[][] grid = {{1, 2}, {3}};\nint[] row = grid[0];")]
#[case("int[] empty = {};")]
#[case("String s = null;")]
#[case("boolean same = 1 == 1.0;")]
#[case("String s = \"abc\";\nint n = s.length();\nboolean e = s.equals(\"b\");\nchar c = s.charAt(0);")]
#[case("int i = 0;\ndo {\n    i++;\n} while (i < 3);")]
#[case("for (int i = 0; i < 3; i++) {\n    if (i == 1) {\n        continue;\n    }\n}")]
#[case("char c = 'a';\nswitch (c) {\n    case 'a':\n        break;\n    case 'b':\n        break;\n}")]
#[case("int total = 0;\ntotal += 5;\ntotal -= 1;\ntotal *= 2;")]
#[case("System.out.println();\nSystem.out.print(\"x\");\nSystem.out.println(42);")]
fn accepts(#[case] body: &str) {
    assert_clean(&in_main(body));
}

#[test]
fn switch_rules() {
    let source = in_main("boolean b = true;\nswitch (b) {\n    default:\n        break;\n}");
    assert_eq!(messages(&source), vec!["Switch condition must be integer or char at line 4"]);

    let source = in_main(
        "int k = 1;\nswitch (k) {\n    case 1:\n        break;\n    case 1:\n        break;\n    default:\n        break;\n    default:\n        break;\n}",
    );
    assert_eq!(
        messages(&source),
        vec!["Duplicate case value: 1 at line 7", "Multiple default cases at line 11"]
    );

    let source = in_main("int k = 1;\nswitch (k) {\n    case \"a\":\n        break;\n}");
    assert_eq!(
        messages(&source),
        vec!["Case type String is incompatible with switch type int at line 5"]
    );
}

#[test]
fn missing_return_check_is_structural() {
    let source = "public class Main {\n\
                  static int loop() {\n\
                  while (true) {\n\
                  return 1;\n\
                  }\n\
                  }\n\
                  static int branches(boolean b) {\n\
                  if (b) {\n\
                  return 1;\n\
                  } else {\n\
                  return 2;\n\
                  }\n\
                  }\n\
                  }\n";
    assert_eq!(messages(source), vec!["Missing return statement in method loop at line 2"]);
}

#[rstest]
#[case("return 1;", "Cannot return a value from a void method at line 3")]
fn void_method_returns(#[case] body: &str, #[case] expected: &str) {
    assert_eq!(messages(&in_main(body)), vec![expected.to_string()]);
}

#[test]
fn return_values_checked_against_signature() {
    let source = "public class Main {\n\
                  static int f() {\n\
                  return \"x\";\n\
                  }\n\
                  static int g() {\n\
                  return;\n\
                  }\n\
                  }\n";
    assert_eq!(
        messages(source),
        vec![
            "Cannot return String from method with return type int at line 3",
            "Missing return value in method with return type int at line 6",
        ]
    );
}

#[test]
fn calls_resolve_forward_and_check_arguments() {
    let source = "public class Main {\n\
                  public static void main(String[] args) {\n\
                  int s = sum(1, 2);\n\
                  sum(1);\n\
                  sum(1, true);\n\
                  int v = count;\n\
                  }\n\
                  static int sum(int a, int b) {\n\
                  return a + b;\n\
                  }\n\
                  static int count = 3;\n\
                  }\n";
    assert_eq!(
        messages(source),
        vec![
            "Method sum expects 2 arguments, but got 1 at line 4",
            "Argument type mismatch for parameter 2 of method sum at line 5",
        ]
    );
}

#[test]
fn member_declaration_errors() {
    let source = "public class Main {\n\
                  int x;\n\
                  double x;\n\
                  void f() { }\n\
                  void f() { }\n\
                  boolean flag = 3;\n\
                  }\n\
                  class Main {\n\
                  }\n";
    assert_eq!(
        messages(source),
        vec![
            "Class Main is already defined at line 8",
            "Field x is already defined in this class at line 3",
            "Method f is already defined in class Main at line 5",
            "Cannot assign int to field of type boolean at line 6",
        ]
    );
}

#[test]
fn fields_of_other_classes() {
    let source = "public class Main {\n\
                  public static void main(String[] args) {\n\
                  Point p = new Point();\n\
                  p.x = 3;\n\
                  int y = p.y;\n\
                  int z = p.z;\n\
                  }\n\
                  }\n\
                  class Point {\n\
                  int x;\n\
                  int y;\n\
                  }\n";
    assert_eq!(messages(source), vec!["Field z not found in class Point at line 6"]);
}

#[test]
fn errors_are_collected_per_statement() {
    let source = in_main("int a = true;\nint a = 2;\nboolean b = 1;\nb = b;");
    assert_eq!(
        messages(&source),
        vec![
            "Cannot assign boolean to variable of type int at line 3",
            "Variable a is already defined in this scope at line 4",
            "Cannot assign int to variable of type boolean at line 5",
        ]
    );
}

#[test]
fn fail_fast_stops_at_first_error() {
    let program = parse(&in_main("int a = true;\nboolean b = 1;"));
    let errors = SemanticAnalyzer::new().fail_fast(true).analyze(&program).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
}

#[test]
fn failed_statement_unwinds_loop_context() {
    // The error inside the loop body must not leave a loop context behind.
    let source = in_main("while (true) {\n    int x = false;\n}\ncontinue;");
    assert_eq!(
        messages(&source),
        vec![
            "Cannot assign boolean to variable of type int at line 4",
            "Continue outside loop at line 6",
        ]
    );
}

#[test]
fn analyzer_can_be_reused() {
    let program = parse(&in_main("int a = 1;"));
    let mut analyzer = SemanticAnalyzer::new();
    assert!(analyzer.analyze(&program).is_ok());
    assert!(analyzer.analyze(&program).is_ok());
    assert!(analyzer.global_scope().resolve_locally("Main").is_some());
}

#[test]
fn local_variable_does_not_hide_a_method() {
    assert_clean(
        "public class Main {\n\
         public static void main(String[] args) {\n\
         int total = 3;\n\
         int sum = total(total);\n\
         }\n\
         static int total(int n) {\n\
         return n * 2;\n\
         }\n\
         }\n",
    );
}
