use super::*;
use std::{collections::BTreeSet, fmt};

/// How the input was written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    /// A bare expression, `2*x+1`.
    Expression,
    /// A single assignment, `y=2*x+1` or `f(x)=x^2`.
    Assignment,
    /// An implicit equation, `x^2+y^2=25`.
    Equality,
}

impl Form {
    /// The tag, as serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Form::Expression => "expression",
            Form::Assignment => "assignment",
            Form::Equality => "equality",
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, classified equation and its parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Equation {
    /// The input as given.
    pub original: String,
    /// The input after normalisation.
    pub normalized: String,
    pub form: Form,
    pub kind: EquationType,
    pub variables: BTreeSet<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip)]
    expression: Expression,
}

impl Equation {
    /// Normalise, compile, classify and extract the parameters of `input`.
    ///
    /// # Example
    /// ```rust
    /// use eqplot::{Equation, EquationType};
    ///
    /// let eq = Equation::parse("X^2 + Y^2 = 25").unwrap();
    /// assert_eq!(eq.kind, EquationType::Circle);
    /// assert_eq!(eq.parameter("r").map(|p| p.value), Some(5.0));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Err(InputError::Empty.into());
        }

        let expression = Expression::compile(&normalized)?;
        let variables = expression.variables().clone();
        let form = if normalized.contains("==") {
            Form::Equality
        } else if normalize::is_assignment(&normalized) {
            Form::Assignment
        } else {
            Form::Expression
        };

        let kind = classify(&normalized, &variables);
        let parameters = extract(&normalized, kind);
        debug!(
            "'{input}' is a {kind} {form} with {} parameter(s)",
            parameters.len()
        );

        Ok(Self {
            original: input.to_string(),
            normalized,
            form,
            kind,
            variables,
            parameters,
            expression,
        })
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn info(&self) -> TypeInfo {
        self.kind.info()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The evaluation scope: the constants and every parameter's current value.
    pub fn scope(&self) -> Scope {
        Scope::from_parameters(&self.parameters)
    }

    /// A copy with parameter `name` set to `value`, clamped to its slider bounds.
    pub fn with_parameter(&self, name: &str, value: f64) -> Result<Self> {
        let mut eq = self.clone();
        let p = eq
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| {
                let known = self
                    .parameters
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>();
                miette!(
                    "{} has no parameter '{}' (parameters: {})",
                    self.kind,
                    name,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            })?;

        p.set(value);
        Ok(eq)
    }

    /// Sample the equation's plot under its current parameters.
    pub fn plot(&self, viewport: Option<Range>, settings: &Settings) -> SampleSet {
        plot(self.kind, &self.expression, &self.scope(), viewport, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline() {
        let eq = Equation::parse("2*x + 1").unwrap();
        assert_eq!(eq.normalized, "2*x+1");
        assert_eq!(eq.form, Form::Expression);
        assert_eq!(eq.kind, EquationType::Linear);
        assert_eq!(eq.variables.iter().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(eq.parameter("m").unwrap().value, 2.0);
        assert_eq!(eq.parameter("b").unwrap().value, 1.0);
    }

    #[test]
    fn forms() {
        assert_eq!(Equation::parse("y=x").unwrap().form, Form::Assignment);
        assert_eq!(Equation::parse("x^2+y^2=4").unwrap().form, Form::Equality);
        assert_eq!(Equation::parse("x").unwrap().form, Form::Expression);

        for form in [Form::Expression, Form::Assignment, Form::Equality] {
            assert_eq!(serde_json::to_value(form).unwrap(), form.as_str());
        }
    }

    #[test]
    fn assignment_parameters_come_from_the_body() {
        let eq = Equation::parse("f(x) = 2*x + 1").unwrap();
        assert_eq!(eq.kind, EquationType::Linear);
        assert_eq!(eq.parameter("m").unwrap().value, 2.0);
        assert_eq!(eq.parameter("b").unwrap().value, 1.0);
    }

    #[test]
    fn parse_failures() {
        assert!(Equation::parse("").is_err());
        assert!(Equation::parse("   ").is_err());
        assert!(Equation::parse("2*(x+").is_err());
        assert!(Equation::parse("x==y==z").is_err());

        let err = Equation::parse("sinn(x)").unwrap_err();
        assert!(format!("{err:?}").contains("sin"), "{err:?}");
    }

    #[test]
    fn scope_binds_parameters() {
        let eq = Equation::parse("3*sin(2*x)").unwrap();
        let s = eq.scope();
        assert_eq!(s.get("a"), Some(3.0));
        assert_eq!(s.get("b"), Some(2.0));
        assert_eq!(s.get("pi"), Some(std::f64::consts::PI));
    }

    #[test]
    fn slider_changes_are_clamped() {
        let eq = Equation::parse("x^2+y^2=25").unwrap();
        let bigger = eq.with_parameter("r", 100.0).unwrap();
        assert_eq!(bigger.parameter("r").unwrap().value, 15.0);
        // the original is untouched
        assert_eq!(eq.parameter("r").unwrap().value, 5.0);

        assert!(eq.with_parameter("q", 1.0).is_err());
    }

    #[test]
    fn slider_changes_move_conic_plots() {
        let eq = Equation::parse("x^2+y^2=25")
            .unwrap()
            .with_parameter("r", 2.0)
            .unwrap();
        match eq.plot(None, &Settings::default()) {
            SampleSet::Curve(c) => assert!((c.x[0] - 2.0).abs() < 1e-12),
            x => panic!("expected a curve, got {x:?}"),
        }
    }

    #[test]
    fn surfaces_have_no_parameters() {
        let eq = Equation::parse("z = sin(x)*cos(y)").unwrap();
        assert_eq!(eq.kind, EquationType::ThreeD);
        assert!(eq.parameters.is_empty());
    }

    #[test]
    fn serialises_without_the_compiled_expression() {
        let eq = Equation::parse("x^2").unwrap();
        let v = serde_json::to_value(&eq).unwrap();
        assert_eq!(v["kind"], "quadratic");
        assert_eq!(v["form"], "expression");
        assert!(v.get("expression").is_none());
    }
}
