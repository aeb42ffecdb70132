//! Strict input checks.
//!
//! Validation is advisory. [`Equation::parse`] normalises whatever it is given; these checks let
//! a caller reject or warn about input which only parses because it was auto-corrected.

use super::*;
use crate::normalize::is_blank;

/// The longest input accepted, in characters.
pub const MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum InputError {
    #[error("please enter an equation")]
    #[diagnostic(code(eqplot::input::empty))]
    Empty,

    #[error("equation too long ({len} characters, max 200)")]
    #[diagnostic(code(eqplot::input::too_long))]
    TooLong { len: usize },

    #[error("uppercase letters not allowed, found: {}", .found.iter().map(char::to_string).collect::<Vec<_>>().join(", "))]
    #[diagnostic(
        code(eqplot::input::uppercase),
        help("use lowercase only (e.g. sin(x), cos(x), log(x))")
    )]
    Uppercase { found: Vec<char>, corrected: String },

    #[error("whitespace not allowed, found {count} space character(s)")]
    #[diagnostic(
        code(eqplot::input::whitespace),
        help("remove all spaces (e.g. x^2+2*x not x^2 + 2*x)")
    )]
    Whitespace { count: usize, corrected: String },

    #[error("invalid character(s): {}", .invalid.iter().collect::<String>())]
    #[diagnostic(
        code(eqplot::input::invalid_characters),
        help("use only a-z, 0-9, +, -, *, /, ^, (, ), ',', ., =")
    )]
    InvalidCharacters { invalid: Vec<char> },

    #[error("equation must contain variable x, y, or z")]
    #[diagnostic(
        code(eqplot::input::missing_variable),
        help("add a variable to your equation (e.g. x^2, sin(x), z=x+y)")
    )]
    MissingVariable,
}

impl InputError {
    /// The auto-corrected input, for the errors which have one.
    pub fn corrected(&self) -> Option<&str> {
        match self {
            InputError::Uppercase { corrected, .. } | InputError::Whitespace { corrected, .. } => {
                Some(corrected)
            }
            _ => None,
        }
    }
}

fn allowed(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || "+-*/^().,=".contains(c)
}

/// Check raw input, reporting the first problem found.
///
/// ```rust
/// use eqplot::{validate, InputError};
///
/// assert!(validate("x^2+1").is_ok());
/// assert_eq!(validate("X^2").unwrap_err().corrected(), Some("x^2"));
/// assert_eq!(validate("2+2"), Err(InputError::MissingVariable));
/// ```
pub fn validate(input: &str) -> std::result::Result<(), InputError> {
    if input.chars().all(is_blank) {
        return Err(InputError::Empty);
    }

    let len = input.chars().count();
    if len > MAX_LEN {
        return Err(InputError::TooLong { len });
    }

    let mut found = Vec::new();
    for c in input.chars().filter(char::is_ascii_uppercase) {
        if !found.contains(&c) {
            found.push(c);
        }
    }
    if !found.is_empty() {
        return Err(InputError::Uppercase {
            found,
            corrected: input.to_lowercase(),
        });
    }

    let count = input.chars().filter(|c| is_blank(*c)).count();
    if count > 0 {
        return Err(InputError::Whitespace {
            count,
            corrected: input.chars().filter(|c| !is_blank(*c)).collect(),
        });
    }

    let mut invalid = Vec::new();
    for c in input.chars().filter(|c| !allowed(*c)) {
        if !invalid.contains(&c) {
            invalid.push(c);
        }
    }
    if !invalid.is_empty() {
        return Err(InputError::InvalidCharacters { invalid });
    }

    if !input.contains(['x', 'y', 'z']) {
        return Err(InputError::MissingVariable);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_inputs() {
        for s in ["x^2+2*x", "sin(x)", "z=x+y", "x^2+y^2=25", "max(x,2)", "0.5*x"] {
            assert_eq!(validate(s), Ok(()), "{s}");
        }
    }

    #[test]
    fn empty() {
        assert_eq!(validate(""), Err(InputError::Empty));
        assert_eq!(validate(" \t\u{00A0}"), Err(InputError::Empty));
    }

    #[test]
    fn too_long() {
        let s = "x+".repeat(100) + "1";
        assert_eq!(validate(&s), Err(InputError::TooLong { len: 201 }));
        assert!(validate(&s[1..]).is_ok());
    }

    #[test]
    fn uppercase_is_reported_once_per_letter() {
        let err = validate("SIN(X)+X").unwrap_err();
        assert_eq!(
            err,
            InputError::Uppercase {
                found: vec!['S', 'I', 'N', 'X'],
                corrected: "sin(x)+x".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "uppercase letters not allowed, found: S, I, N, X"
        );
    }

    #[test]
    fn uppercase_is_checked_before_whitespace() {
        assert!(matches!(
            validate("X + 1"),
            Err(InputError::Uppercase { .. })
        ));
    }

    #[test]
    fn whitespace_including_unicode() {
        let err = validate("x^2 +\u{200B}2*x\u{3000}").unwrap_err();
        assert_eq!(
            err,
            InputError::Whitespace {
                count: 3,
                corrected: "x^2+2*x".into()
            }
        );
    }

    #[test]
    fn invalid_characters() {
        assert_eq!(
            validate("x<2;x"),
            Err(InputError::InvalidCharacters {
                invalid: vec!['<', ';']
            })
        );
        assert!(validate("x_1").is_err());
    }

    #[test]
    fn missing_variable() {
        assert_eq!(validate("2+2"), Err(InputError::MissingVariable));
        assert_eq!(validate("pi"), Err(InputError::MissingVariable));
    }
}
