//! Input normalisation.
//!
//! Turns what a user types into the text the classifier and expression engine work on.

use once_cell::sync::Lazy;
use regex::Regex;

/// `sin^2(` style power-of-function notation, after the start of the text or any character which
/// cannot continue an identifier.
static FUNC_POWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^a-z_])(sin|cos|tan|sec|csc|cot|asin|acos|atan)\^(\d+)\(")
        .expect("valid regex")
});

/// `y=...` or `f(x)=...` at the start of the text.
static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]\w*=|^[a-z]\w*\([a-z,]+\)=").expect("valid regex"));

/// Whitespace the way users manage to paste it, including zero width and byte order marks.
pub fn is_blank(c: char) -> bool {
    c.is_whitespace()
        || matches!(c,
            '\u{00A0}' | '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202F}'
            | '\u{205F}' | '\u{3000}' | '\u{FEFF}')
}

/// Lower-case and strip all whitespace.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_blank(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalise raw input.
///
/// - lower-cases and strips whitespace,
/// - rewrites `sin^2(x)` to `(sin(x))^2`,
/// - rewrites `e^x` to `exp(x)` and `ln(` to `log(`,
/// - rewrites each bare `=` to `==` unless the text is a simple assignment (`y=...`,
///   `f(x)=...`), so implicit forms read as one residual expression.
///
/// ```rust
/// assert_eq!(eqplot::normalize("Sin^2(X) + 1"), "(sin(x))^2+1");
/// assert_eq!(eqplot::normalize("x^2 + y^2 = 25"), "x^2+y^2==25");
/// assert_eq!(eqplot::normalize("y = 2*x + 1"), "y=2*x+1");
/// ```
pub fn normalize(raw: &str) -> String {
    let s = sanitize(raw);
    let s = rewrite_function_powers(&s);
    let s = rewrite_exponentials(&s);
    let s = s.replace("ln(", "log(");

    if s.contains('=') && !ASSIGNMENT.is_match(&s) {
        rewrite_equalities(&s)
    } else {
        s
    }
}

/// Whether normalised text still carries a single `=` assignment.
pub fn is_assignment(normalized: &str) -> bool {
    ASSIGNMENT.is_match(normalized) && !normalized.contains("==")
}

/// The right-hand side of an assignment (`2*x+1` of `f(x)=2*x+1`), otherwise the whole text.
pub fn assignment_body(normalized: &str) -> &str {
    match ASSIGNMENT.find(normalized) {
        Some(m) if is_assignment(normalized) => &normalized[m.end()..],
        _ => normalized,
    }
}

/// Whether `text` has a `=` which is not part of `==`, `<=`, `>=` or `!=`.
pub fn has_bare_equals(text: &str) -> bool {
    let b = text.as_bytes();
    (0..b.len()).any(|i| is_bare_equals(b, i))
}

fn is_bare_equals(b: &[u8], i: usize) -> bool {
    b[i] == b'='
        && !matches!(i.checked_sub(1).map(|j| b[j]), Some(b'=' | b'<' | b'>' | b'!'))
        && b.get(i + 1) != Some(&b'=')
}

fn rewrite_equalities(s: &str) -> String {
    let b = s.as_bytes();
    let mut out = String::with_capacity(s.len() + 2);
    for (i, c) in s.char_indices() {
        if is_bare_equals(b, i) {
            out.push_str("==");
        } else {
            out.push(c);
        }
    }
    out
}

/// `sin^2(arg)` -> `(sin(arg))^2`, matching the argument's closing parenthesis.
fn rewrite_function_powers(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut rest = s;

    while let Some(caps) = FUNC_POWER.captures(rest) {
        let whole = caps.get(0).expect("group 0 always matches");
        let open = whole.end() - 1;
        let Some(close) = matching_paren(rest, open) else {
            break;
        };

        let prefix = &caps[1];
        out.push_str(&rest[..whole.start()]);
        out.push_str(prefix);
        // `2sin^2(x)` is a coefficient
        if prefix.ends_with(|c: char| c.is_ascii_digit() || c == '.') {
            out.push('*');
        }
        out.push_str(&format!(
            "({}({}))^{}",
            &caps[2],
            &rest[open + 1..close],
            &caps[3]
        ));
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

/// `e^x` -> `exp(x)`, `e^(x+1)` -> `exp(x+1)`, `e^-x^2` -> `exp(-x^2)`.
///
/// Only a standalone `e` is rewritten; `sine^2`-like identifiers are left alone. A leading number
/// is a coefficient: `2e^x` -> `2*exp(x)`.
fn rewrite_exponentials(s: &str) -> String {
    let b = s.as_bytes();
    let mut out = String::with_capacity(s.len() + 4);
    let mut i = 0;

    while i < b.len() {
        let coefficient = follows_number(b, i);
        let standalone = i == 0
            || coefficient
            || !(b[i - 1].is_ascii_alphanumeric() || b[i - 1] == b'_');
        if b[i] == b'e' && standalone && b.get(i + 1) == Some(&b'^') {
            if let Some(end) = power_operand(s, i + 2) {
                if coefficient {
                    out.push('*');
                }
                let operand = &s[i + 2..end];
                let operand = operand
                    .strip_prefix('(')
                    .and_then(|o| o.strip_suffix(')'))
                    .filter(|_| matching_paren(s, i + 2) == Some(end - 1))
                    .unwrap_or(operand);
                out.push_str("exp(");
                out.push_str(operand);
                out.push(')');
                i = end;
                continue;
            }
        }

        let c = s[i..].chars().next().expect("in bounds");
        out.push(c);
        i += c.len_utf8();
    }

    out
}

/// Whether `b[i]` directly follows a numeric literal, rather than the digits of an identifier
/// such as `x2`.
fn follows_number(b: &[u8], i: usize) -> bool {
    let digits = b[..i]
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_digit() || **c == b'.')
        .count();
    let start = i - digits;
    digits > 0 && (start == 0 || !(b[start - 1].is_ascii_alphabetic() || b[start - 1] == b'_'))
}

/// The end of the operand of a `^` starting at `start`: an optionally signed atom, which may be
/// raised again (`^` is right associative).
fn power_operand(s: &str, start: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut i = start;
    if matches!(b.get(i), Some(b'-' | b'+')) {
        i += 1;
    }

    i = match b.get(i)? {
        b'(' => matching_paren(s, i)? + 1,
        c if c.is_ascii_digit() || *c == b'.' => {
            i + b[i..]
                .iter()
                .take_while(|c| c.is_ascii_digit() || **c == b'.')
                .count()
        }
        c if c.is_ascii_alphabetic() || *c == b'_' => {
            let end = i + b[i..]
                .iter()
                .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_')
                .count();
            // a function call
            if b.get(end) == Some(&b'(') {
                matching_paren(s, end)? + 1
            } else {
                end
            }
        }
        _ => return None,
    };

    if b.get(i) == Some(&b'^') {
        power_operand(s, i + 1)
    } else {
        Some(i)
    }
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => (),
        }
    }
    None
}
