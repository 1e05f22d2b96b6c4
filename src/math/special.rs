//! Special functions needed for Student's t distribution.
//!
//! We only need the two-sided tail probability of a t statistic, which reduces
//! to the regularized incomplete beta function:
//!
//! ```text
//! P(|T| > t) = I_x(df/2, 1/2),   x = df / (df + t^2)
//! ```
//!
//! `I_x(a, b)` is evaluated with the Lentz continued fraction, using the
//! symmetry `I_x(a, b) = 1 - I_{1-x}(b, a)` to stay in the fast-converging
//! region. `ln Γ` uses the Lanczos approximation (g = 7, n = 9), which is
//! accurate to ~1e-15 for positive arguments.

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const CF_MAX_ITER: usize = 300;
const CF_EPS: f64 = 1e-15;
const CF_TINY: f64 = 1e-300;

/// Natural log of the gamma function for `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEF[0];
    for (i, c) in LANCZOS_COEF.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Regularized incomplete beta `I_x(a, b)` for `a, b > 0`, `x` in `[0, 1]`.
///
/// Returns `NaN` for arguments outside the domain.
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if !(a > 0.0 && b > 0.0) || !(0.0..=1.0).contains(&x) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < CF_TINY {
        d = CF_TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=CF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step.
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < CF_TINY {
            d = CF_TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < CF_TINY {
            c = CF_TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step.
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < CF_TINY {
            d = CF_TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < CF_TINY {
            c = CF_TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < CF_EPS {
            break;
        }
    }

    h
}

/// CDF of Student's t distribution with `df` degrees of freedom.
pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if t == f64::INFINITY {
        return 1.0;
    }
    if t == f64::NEG_INFINITY {
        return 0.0;
    }
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(x, 0.5 * df, 0.5);
    if t > 0.0 { 1.0 - tail } else { tail }
}

/// Two-sided p-value `P(|T| >= |t|)` for Student's t with `df` degrees of freedom.
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(x, 0.5 * df, 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn ln_gamma_matches_factorials() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-12));
        assert!(close(ln_gamma(2.0), 0.0, 1e-12));
        assert!(close(ln_gamma(5.0), 24.0_f64.ln(), 1e-12));
        assert!(close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-12));
    }

    #[test]
    fn incomplete_beta_edges_and_symmetry() {
        assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
        assert!(regularized_incomplete_beta(0.5, -1.0, 1.0).is_nan());

        // I_x(1, 1) = x
        assert!(close(regularized_incomplete_beta(0.3, 1.0, 1.0), 0.3, 1e-12));
        // I_x(a, b) = 1 - I_{1-x}(b, a)
        let lhs = regularized_incomplete_beta(0.2, 2.5, 4.0);
        let rhs = 1.0 - regularized_incomplete_beta(0.8, 4.0, 2.5);
        assert!(close(lhs, rhs, 1e-12));
    }

    #[test]
    fn t_cdf_known_values() {
        assert!(close(student_t_cdf(0.0, 4.0), 0.5, 1e-12));
        // df = 1 is Cauchy: F(1) = 0.75
        assert!(close(student_t_cdf(1.0, 1.0), 0.75, 1e-10));
        // Critical values: t_{0.975, 4} = 2.776445, t_{0.975, 10} = 2.228139
        assert!(close(student_t_cdf(2.776445, 4.0), 0.975, 1e-6));
        assert!(close(student_t_cdf(2.228139, 10.0), 0.975, 1e-6));
        assert!(close(student_t_cdf(-2.228139, 10.0), 0.025, 1e-6));
    }

    #[test]
    fn two_sided_p_known_values() {
        assert!(close(student_t_two_sided_p(0.0, 7.0), 1.0, 1e-12));
        assert!(close(student_t_two_sided_p(2.776445, 4.0), 0.05, 1e-6));
        assert!(close(student_t_two_sided_p(-2.776445, 4.0), 0.05, 1e-6));
        assert_eq!(student_t_two_sided_p(f64::INFINITY, 3.0), 0.0);
        assert!(student_t_two_sided_p(1.0, 0.0).is_nan());
    }
}
