//! Complex valued evaluation over meval's RPN token stream.
//!
//! meval only evaluates over the reals, where `sqrt(-1)` is simply `NaN`. Surface sampling needs
//! to tell a genuinely complex result apart from rounding noise, so the parsed token stream is
//! walked again here with `Complex64` operands. Real operands inside the real domain are kept in
//! real arithmetic, so a value is only complex where the real evaluation is undefined.

use super::functions::{is_real, real_of, Function};
use super::Scope;
use meval::tokenizer::{Operation, Token};
use num_complex::Complex64;

pub(super) fn eval<'a, I>(rpn: I, scope: &Scope) -> Option<Complex64>
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut stack: Vec<Complex64> = Vec::with_capacity(16);

    for token in rpn {
        match token {
            Token::Number(n) => stack.push(real_of(*n)),
            Token::Var(name) => stack.push(real_of(scope.get(name)?)),
            Token::Unary(op) => {
                let a = stack.pop()?;
                stack.push(unary(op, a)?);
            }
            Token::Binary(op) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(binary(op, a, b)?);
            }
            Token::Func(name, nargs) => {
                let n = (*nargs)?;
                let f = Function::lookup(name)?;
                f.check_args(n).ok()?;
                if stack.len() < n {
                    return None;
                }
                let args = stack.split_off(stack.len() - n);
                stack.push(f.complex(&args)?);
            }
            // parentheses and commas never survive the conversion to RPN
            _ => return None,
        }
    }

    match stack.as_slice() {
        [z] => Some(*z),
        _ => None,
    }
}

fn unary(op: &Operation, a: Complex64) -> Option<Complex64> {
    match op {
        Operation::Plus => Some(a),
        Operation::Minus => Some(-a),
        _ => None,
    }
}

fn binary(op: &Operation, a: Complex64, b: Complex64) -> Option<Complex64> {
    let real = is_real(a) && is_real(b);
    let v = match op {
        Operation::Plus => a + b,
        Operation::Minus => a - b,
        Operation::Times if real => real_of(a.re * b.re),
        Operation::Times => a * b,
        // real division keeps the signed infinities of a pole
        Operation::Div if real => real_of(a.re / b.re),
        Operation::Div => a / b,
        Operation::Rem if real => real_of(a.re % b.re),
        Operation::Rem => return None,
        Operation::Pow if real && real_power(a.re, b.re) => real_of(a.re.powf(b.re)),
        Operation::Pow => a.powc(b),
        _ => return None,
    };
    Some(v)
}

/// A negative base only has a real power for integral exponents.
fn real_power(base: f64, exp: f64) -> bool {
    base >= 0.0 || !exp.is_finite() || exp.fract() == 0.0 || base.is_nan()
}

fn factorial(a: Complex64) -> Option<Complex64> {
    if !is_real(a) || a.re < 0.0 || a.re.fract() != 0.0 {
        return None;
    }

    // 171! overflows f64
    let n = a.re.min(171.0) as u32;
    let v = (2..=n).fold(1.0_f64, |acc, k| acc * k as f64);
    Some(real_of(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x: f64) -> Option<Complex64> {
        let expr = text.parse::<meval::Expr>().unwrap();
        eval(expr.iter(), &Scope::new().with("x", x))
    }

    #[test]
    fn real_arithmetic_is_exact() {
        assert_eq!(run("x^2", 2.0), Some(real_of(4.0)));
        assert_eq!(run("-x^2 + 3*x - 1", 1.0), Some(real_of(1.0)));
        assert_eq!(run("(-8)^2", 0.0), Some(real_of(64.0)));
    }

    #[test]
    fn negative_base_fractional_power_is_complex() {
        let z = run("x^0.5", -4.0).unwrap();
        assert!((z.im - 2.0).abs() < 1e-9);
    }

    #[test]
    fn functions_apply() {
        let z = run("sqrt(1 - x^2)", 0.0).unwrap();
        assert_eq!(z, real_of(1.0));

        let z = run("sqrt(1 - x^2)", 2.0).unwrap();
        assert!(z.im.abs() > 1.0);

        let z = run("max(x, 3, 1)", 2.0).unwrap();
        assert_eq!(z, real_of(3.0));
    }

    #[test]
    fn unknown_symbols_fail() {
        assert_eq!(run("x + q", 1.0), None);
        assert_eq!(run("nope(x)", 1.0), None);
    }

    #[test]
    fn factorial_of_integers_only() {
        assert_eq!(factorial(real_of(5.0)), Some(real_of(120.0)));
        assert_eq!(factorial(real_of(2.5)), None);
        assert_eq!(factorial(Complex64::new(1.0, 1.0)), None);
    }

    #[test]
    fn division_by_zero_is_not_finite() {
        let z = run("1/x", 0.0).unwrap();
        assert!(z.re.is_infinite());
    }
}
