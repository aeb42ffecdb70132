//! Mathematical expression parsing and evaluation.

use super::*;
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::f64::consts::{E, PI};

mod complex;
pub mod engine;
pub mod functions;

pub use engine::Expression;

/// Symbol names which always resolve to constants, never to free variables.
pub const CONSTANTS: &[&str] = &["e", "pi"];

/// Evaluate a compiled expression against a [`Scope`].
///
/// Evaluation never panics. A `None` signals that the evaluator could not produce a value at all
/// (unknown symbol, bad arity). Undefined real results come back as non-finite numbers and it is
/// up to the caller to skip them.
pub trait Evaluate {
    /// Evaluate over the reals.
    fn eval(&self, scope: &Scope) -> Option<f64>;

    /// Evaluate over the complex plane.
    fn eval_complex(&self, scope: &Scope) -> Option<Complex64>;
}

impl<T: Evaluate + ?Sized> Evaluate for &T {
    fn eval(&self, scope: &Scope) -> Option<f64> {
        (**self).eval(scope)
    }

    fn eval_complex(&self, scope: &Scope) -> Option<Complex64> {
        (**self).eval_complex(scope)
    }
}

/// Name to number bindings for one evaluation.
///
/// A scope always knows Euler's number and pi.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    vars: BTreeMap<String, f64>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("e".to_string(), E);
        vars.insert("pi".to_string(), PI);
        Self { vars }
    }

    /// Build a scope binding each parameter's current value.
    pub fn from_parameters(params: &[Parameter]) -> Self {
        let mut scope = Self::new();
        for p in params {
            scope.set(&p.name, p.value);
        }
        scope
    }

    /// Bind `name` to `value`, replacing any previous binding.
    ///
    /// The constants cannot be rebound.
    pub fn set(&mut self, name: &str, value: f64) -> &mut Self {
        if CONSTANTS.contains(&name) {
            return self;
        }

        match self.vars.get_mut(name) {
            Some(v) => *v = value,
            None => {
                self.vars.insert(name.to_string(), value);
            }
        }
        self
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Hands a [`Scope`] to meval by value.
pub(crate) struct Bindings<'a>(pub &'a Scope);

impl meval::ContextProvider for Bindings<'_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        self.0.get(name)
    }

    fn eval_func(&self, name: &str, args: &[f64]) -> Result<f64, meval::FuncEvalError> {
        let f = functions::Function::lookup(name).ok_or(meval::FuncEvalError::UnknownFunction)?;
        f.check_args(args.len())?;
        Ok(f.real(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_has_constants() {
        let s = Scope::new();
        assert_eq!(s.get("e"), Some(E));
        assert_eq!(s.get("pi"), Some(PI));
        assert_eq!(s.get("x"), None);
    }

    #[test]
    fn constants_cannot_be_rebound() {
        let s = Scope::new().with("pi", 3.0).with("x", 2.0);
        assert_eq!(s.get("pi"), Some(PI));
        assert_eq!(s.get("x"), Some(2.0));
    }

    #[test]
    fn set_overwrites() {
        let mut s = Scope::new();
        s.set("x", 1.0).set("x", 5.0);
        assert_eq!(s.get("x"), Some(5.0));
        assert_eq!(s.iter().count(), 3);
    }
}
