use super::functions::{self, Function};
use super::*;
use meval::tokenizer::Token;
use once_cell::sync::Lazy;
use regex::Regex;
use simsearch::SimSearch;
use std::{collections::BTreeSet, fmt};

/*** A note on the implementation ***
 *
 * `meval` is the expression engine: it tokenises, converts to RPN and evaluates over the reals.
 * It does not understand assignments, equalities or implicit multiplication, all of which the
 * normalised input may contain. `Expression::compile` therefore rewrites the normalised text into
 * meval's dialect first:
 *
 *   y=2*x+1         ->  2*x+1            (assignment target dropped)
 *   x^2+y^2==25     ->  (x^2+y^2)-(25)   (equality becomes a residual)
 *   2x+3(x-1)       ->  2*x+3*(x-1)      (implicit products made explicit)
 *
 * The compiled token stream is kept around so it can also be walked by the complex evaluator.
 */

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]\w*(?:\([a-z,]+\))?=").expect("valid regex"));

/// A compiled expression.
#[derive(Clone)]
pub struct Expression {
    /// The text as handed to meval.
    source: String,

    /// Parsed expression.
    expr: meval::Expr,

    /// Free symbols, without the constants.
    variables: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("unknown function '{name}'")]
#[diagnostic(code(eqplot::unknown_function))]
pub struct UnknownFunction {
    pub name: String,
    #[help]
    pub help: Option<String>,
}

impl Expression {
    /// Compile normalised text.
    ///
    /// # Example
    /// ```rust
    /// use eqplot::{Evaluate, Expression, Scope};
    ///
    /// let expr = Expression::compile("2x+1").unwrap();
    /// assert_eq!(expr.eval(&Scope::new().with("x", 3.0)), Some(7.0));
    /// ```
    pub fn compile(normalized: &str) -> Result<Self> {
        let source = engine_text(normalized)?;

        let expr = source
            .parse::<meval::Expr>()
            .into_diagnostic()
            .wrap_err_with(|| format!("parsing '{normalized}' failed"))?;

        let mut variables = BTreeSet::new();
        for t in expr.iter() {
            match t {
                Token::Var(n) if !CONSTANTS.contains(&n.as_str()) => {
                    variables.insert(n.to_string());
                }
                Token::Func(n, nargs) => check_function(n, *nargs)
                    .wrap_err_with(|| format!("in '{normalized}'"))?,
                _ => (),
            }
        }

        Ok(Self {
            source,
            expr,
            variables,
        })
    }

    /// The text meval parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The free variables, excluding `e` and `pi`, in sorted order.
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }
}

impl Evaluate for Expression {
    fn eval(&self, scope: &Scope) -> Option<f64> {
        self.expr.eval_with_context(Bindings(scope)).ok()
    }

    fn eval_complex(&self, scope: &Scope) -> Option<Complex64> {
        complex::eval(self.expr.iter(), scope)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("variables", &self.variables)
            .finish()
    }
}

fn check_function(name: &str, nargs: Option<usize>) -> Result<()> {
    let f = Function::lookup(name).ok_or_else(|| UnknownFunction {
        name: name.to_string(),
        help: suggest_function(name).map(|s| format!("did you mean '{s}'?")),
    })?;

    if let Some(n) = nargs {
        f.check_args(n)
            .map_err(|_| miette!("'{}' does not take {} argument(s)", name, n))?;
    }

    Ok(())
}

fn suggest_function(name: &str) -> Option<&'static str> {
    let mut engine = SimSearch::new();
    for (n, _) in functions::NAMES {
        engine.insert(*n, n);
    }
    engine.search(name).into_iter().next()
}

/// Rewrite normalised text into something meval can parse.
fn engine_text(normalized: &str) -> Result<String> {
    let body = match ASSIGNMENT.find(normalized) {
        Some(m) if !normalized[m.end()..].starts_with('=') => &normalized[m.end()..],
        _ => normalized,
    };

    let body = if body.contains("==") {
        let sides = body.split("==").collect::<Vec<_>>();
        match sides.as_slice() {
            [lhs, rhs] => format!("({lhs})-({rhs})"),
            _ => bail!("chained equalities are not supported: '{}'", normalized),
        }
    } else {
        body.to_string()
    };

    Ok(insert_implicit_products(&body))
}

#[derive(Copy, Clone, PartialEq)]
enum Run {
    Other,
    Ident,
    Number,
    Exponent,
    Close,
}

/// Make implicit products explicit: `2x`, `2(x)`, `(x)(y)`, `(x)2`.
///
/// Identifiers with digits (`log10`) and scientific literals (`1e-3`) are left alone.
fn insert_implicit_products(s: &str) -> String {
    let chars = s.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(s.len() + 4);
    let mut run = Run::Other;

    for (i, &c) in chars.iter().enumerate() {
        let starts_operand = c.is_ascii_alphabetic() || c == '_' || c == '(';
        let starts_number = c.is_ascii_digit() || c == '.';

        if run == Run::Number && c == 'e' && is_exponent(&chars[i + 1..]) {
            out.push(c);
            run = Run::Exponent;
            continue;
        }

        match run {
            Run::Number | Run::Exponent if starts_operand => out.push('*'),
            Run::Close if starts_operand || starts_number => out.push('*'),
            _ => (),
        }

        out.push(c);

        run = match c {
            c if c.is_ascii_alphabetic() || c == '_' => Run::Ident,
            _ if starts_number => match run {
                Run::Ident | Run::Exponent => run,
                _ => Run::Number,
            },
            '+' | '-' if run == Run::Exponent && chars[i - 1] == 'e' => Run::Exponent,
            ')' => Run::Close,
            _ => Run::Other,
        };
    }

    out
}

fn is_exponent(rest: &[char]) -> bool {
    match rest {
        [d, ..] if d.is_ascii_digit() => true,
        ['+' | '-', d, ..] => d.is_ascii_digit(),
        _ => false,
    }
}
