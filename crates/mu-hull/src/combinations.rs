//! Lexicographic k-subsets of `0..n`.

/// Iterator over all `k`-element subsets of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let k = out.len();

        let mut next = out.clone();
        // Rightmost position that can still be incremented.
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        if let Some(i) = pivot {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }
        Some(out)
    }
}
