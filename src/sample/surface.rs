use super::*;

/// A rectangular grid of `z = f(x, y)`.
///
/// `z[r][c]` is the value at `(x[c], y[r])`; undefined cells are `None` so the grid stays
/// rectangular.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Surface {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl Surface {
    /// The number of defined cells.
    pub fn defined(&self) -> usize {
        self.z.iter().flatten().filter(|z| z.is_some()).count()
    }

    /// The value at column `c`, row `r`.
    pub fn get(&self, c: usize, r: usize) -> Option<f64> {
        self.z.get(r).and_then(|row| row.get(c)).copied().flatten()
    }
}

impl<'a, E: Evaluate, I: Interrupt> Sampler<'a, E, I> {
    /// Sample `z = f(x, y)` on a `(resolution + 1)²` grid.
    ///
    /// A cell is undefined when the real value is not finite and the complex value has an
    /// imaginary part larger than `tolerance` in magnitude. When interrupted, the rows sampled so
    /// far are returned.
    pub fn surface(&self, x_range: Range, y_range: Range, resolution: usize, tolerance: f64) -> Surface {
        let x = x_range.points(resolution).collect::<Vec<_>>();
        let y = y_range.points(resolution).collect::<Vec<_>>();
        let mut z = Vec::with_capacity(y.len());
        let mut scope = self.scope.clone();

        for (r, yv) in y.iter().enumerate() {
            if self.stop.interrupted() {
                debug!("surface interrupted after {r} of {} rows", y.len());
                break;
            }

            scope.set("y", *yv);
            let row = x
                .iter()
                .map(|xv| {
                    scope.set("x", *xv);
                    self.cell(&scope, tolerance)
                })
                .collect();
            z.push(row);
        }

        let s = Surface { x, y, z };
        trace!("surface has {} defined cells", s.defined());
        s
    }

    fn cell(&self, scope: &Scope, tolerance: f64) -> Option<f64> {
        if let Some(v) = self.expr.eval(scope).filter(|v| v.is_finite()) {
            return Some(v);
        }

        self.expr
            .eval_complex(scope)
            .filter(|z| z.im.abs() <= tolerance)
            .map(|z| z.re)
            .filter(|v| v.is_finite())
    }
}
