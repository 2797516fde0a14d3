#[cfg(test)]
mod property_tests {
    use frontend::token::Kind;
    use frontend::type_decl::TypeDecl;
    use frontend::{tokenize, Parser};
    use proptest::prelude::*;

    // Source text without quotes, comment starters or backslashes, so every
    // non-whitespace character ends up in exactly one lexeme.
    fn plain_source() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_+*%=<>!&|.,;:(){}#@ \\[\\]\\n-]{0,64}"
    }

    fn any_type() -> impl Strategy<Value = TypeDecl> {
        let leaf = prop_oneof![
            Just(TypeDecl::Void),
            Just(TypeDecl::BOOLEAN),
            Just(TypeDecl::CHAR),
            Just(TypeDecl::INT),
            Just(TypeDecl::FLOAT),
            Just(TypeDecl::DOUBLE),
            Just(TypeDecl::STRING),
            Just(TypeDecl::class("Main")),
            Just(TypeDecl::class("Point")),
        ];
        leaf.prop_recursive(2, 8, 2, |inner| {
            prop_oneof![
                (inner.clone(), 1u32..3).prop_map(|(t, d)| TypeDecl::array(t, d)),
                inner.prop_map(|t| TypeDecl::generic(TypeDecl::class("ArrayList"), vec![t])),
            ]
        })
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config {
            cases: 256,
            .. proptest::test_runner::Config::default()
        })]

        #[test]
        fn prop_lexer_is_total(source in "\\PC{0,80}") {
            let tokens = tokenize(&source);
            for token in &tokens {
                prop_assert!(!token.lexeme.is_empty(), "empty lexeme in {:?}", tokens);
                prop_assert!(token.id >= 1);
            }
        }

        #[test]
        fn prop_lexemes_reconstruct_source(source in plain_source()) {
            let joined: String = tokenize(&source).into_iter().map(|t| t.lexeme).collect();
            let expected: String = source.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            prop_assert_eq!(joined, expected);
        }

        #[test]
        fn prop_token_lines_are_monotonic(source in plain_source()) {
            let tokens = tokenize(&source);
            let last_line = 1 + source.matches('\n').count() as u32;
            let mut previous = 1;
            for token in &tokens {
                prop_assert!(token.line >= previous);
                prop_assert!(token.line <= last_line);
                previous = token.line;
            }
        }

        #[test]
        fn prop_integers_are_numbers(n in 0u32..u32::MAX) {
            let tokens = tokenize(&n.to_string());
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].kind, Kind::Number);
        }

        #[test]
        fn prop_decimals_are_float_numbers(whole in 0u32..100_000, frac in 0u32..100_000) {
            let tokens = tokenize(&format!("{}.{}", whole, frac));
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].kind, Kind::FloatNumber);
        }

        #[test]
        fn prop_second_decimal_point_errors(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000) {
            let tokens = tokenize(&format!("{}.{}.{}", a, b, c));
            prop_assert_eq!(tokens[0].kind, Kind::Error);
        }

        #[test]
        fn prop_signed_literal_after_assignment(n in 0u32..1_000_000) {
            let tokens = tokenize(&format!("x = -{}", n));
            prop_assert_eq!(tokens.len(), 3);
            prop_assert_eq!(tokens[2].lexeme.clone(), format!("-{}", n));
        }

        #[test]
        fn prop_assignability_is_transitive(a in any_type(), b in any_type(), c in any_type()) {
            if a.is_assignable_to(&b) && b.is_assignable_to(&c) {
                prop_assert!(a.is_assignable_to(&c), "{} -> {} -> {} is not transitive", a, b, c);
            }
        }

        #[test]
        fn prop_assignability_is_reflexive(a in any_type()) {
            prop_assert!(a.is_assignable_to(&a));
        }

        #[test]
        fn prop_parser_never_panics(source in plain_source()) {
            let wrapped = format!("public class Main {{ static void f() {{ {} }} }}", source);
            let _ = Parser::new(tokenize(&wrapped)).parse_program();
        }
    }

    #[test]
    fn int_widens_to_double_through_float() {
        assert!(TypeDecl::INT.is_assignable_to(&TypeDecl::FLOAT));
        assert!(TypeDecl::FLOAT.is_assignable_to(&TypeDecl::DOUBLE));
        assert!(TypeDecl::INT.is_assignable_to(&TypeDecl::DOUBLE));
        assert!(!TypeDecl::DOUBLE.is_assignable_to(&TypeDecl::INT));
    }
}
