// src/gradient.rs

/// Finite-difference gradient per sample index (unit spacing).
///
/// Central difference in the interior, one-sided first-order difference at the
/// two ends. A single sample has gradient 0.
pub fn gradient(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut g = Vec::with_capacity(n);
            g.push(f[1] - f[0]);
            for i in 1..n - 1 {
                g.push(0.5 * (f[i + 1] - f[i - 1]));
            }
            g.push(f[n - 1] - f[n - 2]);
            g
        }
    }
}
