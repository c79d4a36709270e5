//! Property tests for the scanner and parser over generated sources.

use proptest::prelude::*;

use sluice_ast::SourceFile;
use sluice_syntax::{parse_expression, parse_file, Mode, Scanner, Token};

/// A strategy producing a single valid token's text.
fn token_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}".prop_map(|s| s),
        "(0|[1-9][0-9]{0,6})".prop_map(|s| s),
        "[0-9]{1,4}\\.[0-9]{1,4}".prop_map(|s| s),
        // Strings without interior whitespace or escapes.
        "[a-z]{0,6}".prop_map(|s| format!("\"{s}\"")),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("null".to_string()),
        prop::sample::select(vec![
            "||", "&&", "!", "=", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "%", "^",
            "{", "}", "(", ")", "[", "]", ",", ".",
        ])
        .prop_map(str::to_string),
    ]
}

fn whitespace() -> impl Strategy<Value = String> {
    prop::sample::select(vec![" ", "  ", "\t", " \t "]).prop_map(str::to_string)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every byte of the input is accounted for: token texts cover the
    /// non-whitespace bytes, in order, and everything in between is
    /// whitespace.
    #[test]
    fn scanner_covers_all_input(parts in prop::collection::vec((token_text(), whitespace()), 0..40)) {
        let mut source = String::new();
        for (text, ws) in &parts {
            source.push_str(text);
            source.push_str(ws);
        }

        // Terminator positions coincide with newline bytes, so the loop
        // below skips them when accounting for coverage.
        let mut scanner = Scanner::new(
            SourceFile::new("prop"),
            source.as_bytes(),
            None,
            Mode::include_comments(),
        );

        let mut cursor = 0usize;
        let mut steps = 0usize;
        loop {
            let (pos, tok, lit) = scanner.scan();
            steps += 1;
            prop_assert!(steps <= source.len() + 2, "scanner failed to terminate");

            if tok == Token::Eof {
                break;
            }
            if tok == Token::Terminator {
                continue;
            }

            let text = if lit.is_empty() {
                tok.as_str().to_string()
            } else {
                lit
            };

            let offset = pos.offset();
            // Bytes between the previous token and this one are whitespace.
            prop_assert!(offset >= cursor, "token moved backwards");
            prop_assert!(
                source[cursor..offset].bytes().all(|b| b" \t\r\n".contains(&b)),
                "unaccounted bytes {:?}",
                &source[cursor..offset],
            );
            prop_assert_eq!(
                &source[offset..offset + text.len()],
                text.as_str(),
                "token text mismatch at offset {}",
                offset,
            );
            cursor = offset + text.len();
        }

        prop_assert!(
            source[cursor..].bytes().all(|b| b" \t\r\n".contains(&b)),
            "trailing bytes unaccounted",
        );
        prop_assert_eq!(scanner.num_errors(), 0);
    }

    /// Scanning arbitrary bytes never loops forever and always ends in EOF.
    #[test]
    fn scanner_terminates_on_arbitrary_input(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut scanner = Scanner::new(SourceFile::new("prop"), &bytes, None, Mode::default());
        let mut steps = 0usize;
        loop {
            let (_, tok, _) = scanner.scan();
            steps += 1;
            prop_assert!(steps <= bytes.len() * 2 + 4, "scanner failed to terminate");
            if tok == Token::Eof {
                break;
            }
        }
    }

    /// Parsing arbitrary bytes returns instead of panicking, and parse errors
    /// always carry valid positions.
    #[test]
    fn parser_is_total(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        match parse_file("prop.slc", &bytes) {
            Ok(_) => {}
            Err(list) => {
                prop_assert!(!list.is_empty());
                for err in list.iter() {
                    prop_assert!(err.position.is_valid(), "invalid position in {err}");
                }
            }
        }
    }

    /// Simple attribute files always parse into the same number of
    /// attributes as lines.
    #[test]
    fn attributes_per_line(count in 1usize..20) {
        let mut source = String::new();
        for i in 0..count {
            source.push_str(&format!("attr_{i} = {i}\n"));
        }
        let file = parse_file("prop.slc", source.as_bytes()).expect("valid file");
        prop_assert_eq!(file.body.len(), count);
    }

    /// Expression parsing round-trips through operator precedence without
    /// errors for well-formed arithmetic.
    #[test]
    fn arithmetic_expressions_parse(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000) {
        let src = format!("{a} + {b} * {c} - ({a} / ({b} + 1)) ^ {c}");
        prop_assert!(parse_expression(&src).is_ok());
    }
}
