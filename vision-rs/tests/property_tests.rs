use std::rc::Rc;

use proptest::prelude::*;
use vision::config::Options;
use vision::host::MemoryHost;
use vision::script::balance::check_balance;
use vision::script::value::format_number;
use vision::script::{tokenize, Interpreter};

/// Source fragments with properly nested delimiters.
fn nested() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_string()),
        Just("12".to_string()),
        Just("\"s\"".to_string()),
        Just("f::g".to_string()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (prop_oneof![Just(('(', ')')), Just(('[', ']')), Just(('{', '}'))], prop::collection::vec(inner, 0..4))
            .prop_map(|((open, close), items)| format!("{open}{}{close}", items.join(" ")))
    })
}

proptest! {
    #[test]
    fn tokenize_never_panics(src in "\\PC*", tab in 1usize..9) {
        let _ = tokenize(&src, tab);
    }

    #[test]
    fn tokenize_never_panics_on_delimiter_soup(src in "[ \t\n(){}\\[\\]<>\"'#;:a-z0-9.\\\\-]{0,64}") {
        let _ = tokenize(&src, 4);
    }

    #[test]
    fn running_arbitrary_source_never_panics(src in "[ \n(){}\\[\\]\"abcx0-9+*/<>.]{0,48}") {
        let mut interp = Interpreter::with_host(Options::default(), Rc::new(MemoryHost::new()));
        let _ = interp.run(&src);
    }

    #[test]
    fn small_integers_print_exactly(n in -999_999_999_999_999i64..=999_999_999_999_999i64) {
        prop_assert_eq!(format_number(n as f64), n.to_string());
    }

    #[test]
    fn formatted_numbers_read_back_closely(x in -1e300f64..1e300f64) {
        let text = format_number(x);
        let back: f64 = text.parse().unwrap();
        let tolerance = x.abs() * 1e-14;
        prop_assert!((back - x).abs() <= tolerance, "{} -> {} -> {}", x, text, back);
    }

    #[test]
    fn fixed_notation_has_no_trailing_zeros(x in -1e6f64..1e6f64) {
        let text = format_number(x);
        if text.contains('.') && !text.contains('e') {
            prop_assert!(!text.ends_with('0'), "{}", text);
            prop_assert!(!text.ends_with('.'), "{}", text);
        }
    }

    #[test]
    fn nested_delimiters_balance(src in nested()) {
        let tokens = tokenize(&src, 4).unwrap();
        prop_assert!(check_balance(&tokens).is_ok(), "{}", src);
    }

    #[test]
    fn extra_closer_is_reported(src in nested()) {
        let tokens = tokenize(&format!("{src})"), 4).unwrap();
        let err = check_balance(&tokens).unwrap_err().to_string();
        prop_assert!(err.contains("has no match"), "{}", err);
    }
}
