//! Randomized tests for client-side escaping and placeholder substitution.
//!
//! Feeds random and hostile strings through the formatter and checks that
//! every value stays confined to its quoted literal.

use mysql_dispatch::models::SqlValue;
use mysql_dispatch::sqlstring::{escape, escape_id, format};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Generate random string of given length
fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random string drawn from characters that need escaping
fn random_hostile_string(len: usize) -> String {
    const POOL: &[char] = &[
        '\'', '"', '\\', '\0', '\n', '\r', '\t', '\u{8}', '\u{1a}', '`', '?', ';', 'a', 'Z', '%',
        '_', 'é', '🚀',
    ];
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| POOL[rng.gen_range(0..POOL.len())])
        .collect()
}

/// Generate various edge-case strings
fn edge_case_strings() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        "\n\r\t".to_string(),
        "\0".to_string(),
        "'OR 1=1--".to_string(),
        "'; DROP TABLE users--".to_string(),
        "\\'; SELECT 1; --".to_string(),
        "1' UNION SELECT NULL, NULL--".to_string(),
        "??".to_string(),
        "a".repeat(10000),
        random_string(100),
        random_hostile_string(64),
    ]
}

/// Reverse MySQL string-literal escaping.
fn unescape(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('Z') => out.push('\u{1a}'),
            Some(other) => out.push(other),
            None => panic!("dangling backslash in {literal:?}"),
        }
    }
    out
}

/// Every quote inside the literal must be preceded by an odd run of backslashes.
fn assert_confined(literal: &str) {
    assert!(literal.starts_with('\'') && literal.ends_with('\''), "{literal:?}");
    let inner: Vec<char> = literal[1..literal.len() - 1].chars().collect();
    for (i, c) in inner.iter().enumerate() {
        if *c == '\'' {
            let backslashes = inner[..i].iter().rev().take_while(|c| **c == '\\').count();
            assert_eq!(backslashes % 2, 1, "unescaped quote in {literal:?}");
        }
    }
}

#[test]
fn fuzz_escape_round_trip() {
    for s in edge_case_strings() {
        let literal = escape(&SqlValue::from(s.as_str()));
        assert_confined(&literal);
        assert_eq!(unescape(&literal), s);
    }

    for _ in 0..500 {
        let len = rand::thread_rng().gen_range(0..80);
        let s = random_hostile_string(len);
        let literal = escape(&SqlValue::from(s.as_str()));
        assert_confined(&literal);
        assert_eq!(unescape(&literal), s);
    }
}

#[test]
fn fuzz_escape_id_never_leaks_backticks() {
    for _ in 0..500 {
        let len = rand::thread_rng().gen_range(0..40);
        let id = random_hostile_string(len).replace('.', "");
        let quoted = escape_id(&id);
        assert!(quoted.starts_with('`') && quoted.ends_with('`'));
        let inner = &quoted[1..quoted.len() - 1];
        assert_eq!(inner.replace("``", "`"), id);
        assert_eq!(inner.matches('`').count() % 2, 0);
    }
}

#[test]
fn fuzz_format_substitutes_in_order() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let count = rng.gen_range(1..8);
        let values: Vec<SqlValue> = (0..count).map(|_| rng.gen_range(-1000i64..1000).into()).collect();
        let sql = vec!["?"; count].join(", ");

        let formatted = format(&sql, &values);

        let expected = values
            .iter()
            .map(escape)
            .collect::<Vec<_>>()
            .join(", ");
        assert_eq!(formatted, expected);
    }
}

#[test]
fn fuzz_format_with_hostile_values_keeps_statement_shape() {
    for _ in 0..200 {
        let value = random_hostile_string(32);
        let formatted = format("SELECT * FROM t WHERE a = ? AND b = 1", &[value.as_str().into()]);

        assert!(formatted.starts_with("SELECT * FROM t WHERE a = '"));
        assert!(formatted.ends_with("' AND b = 1"));
        let literal = formatted
            .strip_prefix("SELECT * FROM t WHERE a = ")
            .and_then(|s| s.strip_suffix(" AND b = 1"))
            .unwrap();
        assert_confined(literal);
        assert_eq!(unescape(literal), value);
    }
}
