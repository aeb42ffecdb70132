//! The function table shared by the real and complex evaluators.

use meval::FuncEvalError;
use num_complex::Complex64;
use std::f64::consts::{LN_10, LN_2};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Cbrt,
    Exp,
    Log,
    Log10,
    Log2,
    Abs,
    Sign,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Floor,
    Ceil,
    Round,
    Atan2,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Arity {
    Exact(usize),
    AtLeast(usize),
}

/// Every name the engine resolves, including aliases.
pub const NAMES: &[(&str, Function)] = &[
    ("sqrt", Function::Sqrt),
    ("cbrt", Function::Cbrt),
    ("exp", Function::Exp),
    ("log", Function::Log),
    ("ln", Function::Log),
    ("log10", Function::Log10),
    ("log2", Function::Log2),
    ("abs", Function::Abs),
    ("sign", Function::Sign),
    ("signum", Function::Sign),
    ("sin", Function::Sin),
    ("cos", Function::Cos),
    ("tan", Function::Tan),
    ("sec", Function::Sec),
    ("csc", Function::Csc),
    ("cosec", Function::Csc),
    ("cot", Function::Cot),
    ("asin", Function::Asin),
    ("acos", Function::Acos),
    ("atan", Function::Atan),
    ("sinh", Function::Sinh),
    ("cosh", Function::Cosh),
    ("tanh", Function::Tanh),
    ("asinh", Function::Asinh),
    ("acosh", Function::Acosh),
    ("atanh", Function::Atanh),
    ("floor", Function::Floor),
    ("ceil", Function::Ceil),
    ("round", Function::Round),
    ("atan2", Function::Atan2),
    ("min", Function::Min),
    ("max", Function::Max),
];

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        NAMES.iter().find_map(|(n, f)| (*n == name).then_some(*f))
    }

    fn arity(self) -> Arity {
        use Function::*;
        match self {
            Atan2 => Arity::Exact(2),
            Min | Max => Arity::AtLeast(1),
            _ => Arity::Exact(1),
        }
    }

    /// Check an argument count against the function's arity.
    pub fn check_args(self, n: usize) -> Result<(), FuncEvalError> {
        match self.arity() {
            Arity::Exact(k) if n == k => Ok(()),
            Arity::Exact(k) if n < k => Err(FuncEvalError::TooFewArguments),
            Arity::Exact(_) => Err(FuncEvalError::TooManyArguments),
            Arity::AtLeast(k) if n >= k => Ok(()),
            Arity::AtLeast(_) => Err(FuncEvalError::TooFewArguments),
        }
    }

    /// Apply over the reals. Out of domain inputs give `NaN`, like `f64` does.
    ///
    /// `args` must already satisfy [`Function::check_args`].
    pub fn real(self, args: &[f64]) -> f64 {
        use Function::*;
        let x = args[0];
        match self {
            Sqrt => x.sqrt(),
            Cbrt => x.cbrt(),
            Exp => x.exp(),
            Log => x.ln(),
            Log10 => x.log10(),
            Log2 => x.log2(),
            Abs => x.abs(),
            Sign => sign(x),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Sec => x.cos().recip(),
            Csc => x.sin().recip(),
            Cot => x.tan().recip(),
            Asin => x.asin(),
            Acos => x.acos(),
            Atan => x.atan(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Asinh => x.asinh(),
            Acosh => x.acosh(),
            Atanh => x.atanh(),
            Floor => x.floor(),
            Ceil => x.ceil(),
            Round => x.round(),
            Atan2 => x.atan2(args[1]),
            Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Apply over the complex plane.
    ///
    /// Purely real arguments inside the real domain are computed with real
    /// arithmetic so that defined points carry an exact zero imaginary part.
    /// Returns `None` for functions which have no complex extension here
    /// (ordering and rounding of non-real values).
    pub fn complex(self, args: &[Complex64]) -> Option<Complex64> {
        use Function::*;
        let z = args[0];
        let v = match self {
            Sqrt => lift(z, |x| x >= 0.0, f64::sqrt, Complex64::sqrt),
            Cbrt => lift(z, |_| true, f64::cbrt, |z| z.powf(1.0 / 3.0)),
            Exp => lift(z, |_| true, f64::exp, Complex64::exp),
            Log => lift(z, |x| x >= 0.0, f64::ln, Complex64::ln),
            Log10 => lift(z, |x| x >= 0.0, f64::log10, |z| z.ln() / LN_10),
            Log2 => lift(z, |x| x >= 0.0, f64::log2, |z| z.ln() / LN_2),
            Abs => Complex64::new(z.norm(), 0.0),
            Sign if is_real(z) => real_of(sign(z.re)),
            Sign if z.norm() == 0.0 => Complex64::new(0.0, 0.0),
            Sign => z / z.norm(),
            Sin => lift(z, |_| true, f64::sin, Complex64::sin),
            Cos => lift(z, |_| true, f64::cos, Complex64::cos),
            Tan => lift(z, |_| true, f64::tan, Complex64::tan),
            Sec => lift(z, |_| true, |x| x.cos().recip(), |z| z.cos().inv()),
            Csc => lift(z, |_| true, |x| x.sin().recip(), |z| z.sin().inv()),
            Cot => lift(z, |_| true, |x| x.tan().recip(), |z| z.tan().inv()),
            Asin => lift(z, |x| (-1.0..=1.0).contains(&x), f64::asin, Complex64::asin),
            Acos => lift(z, |x| (-1.0..=1.0).contains(&x), f64::acos, Complex64::acos),
            Atan => lift(z, |_| true, f64::atan, Complex64::atan),
            Sinh => lift(z, |_| true, f64::sinh, Complex64::sinh),
            Cosh => lift(z, |_| true, f64::cosh, Complex64::cosh),
            Tanh => lift(z, |_| true, f64::tanh, Complex64::tanh),
            Asinh => lift(z, |_| true, f64::asinh, Complex64::asinh),
            Acosh => lift(z, |x| x >= 1.0, f64::acosh, Complex64::acosh),
            Atanh => lift(z, |x| (-1.0..=1.0).contains(&x), f64::atanh, Complex64::atanh),
            Floor | Ceil | Round | Atan2 | Min | Max => {
                if !args.iter().copied().all(is_real) {
                    return None;
                }
                let re = args.iter().map(|a| a.re).collect::<Vec<_>>();
                real_of(self.real(&re))
            }
        };
        Some(v)
    }
}

/// `f64::signum` maps zero to one, the engine maps it to zero.
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

pub(crate) fn is_real(z: Complex64) -> bool {
    z.im == 0.0
}

pub(crate) fn real_of(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

fn lift<D, R, C>(z: Complex64, domain: D, real: R, complex: C) -> Complex64
where
    D: Fn(f64) -> bool,
    R: Fn(f64) -> f64,
    C: Fn(Complex64) -> Complex64,
{
    if is_real(z) && domain(z.re) {
        real_of(real(z.re))
    } else {
        complex(z)
    }
}
