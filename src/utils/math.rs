// Tue Jan 13 2026 - Alex

pub struct MathUtils;

impl MathUtils {
    pub fn log2(n: u64) -> u32 {
        if n == 0 {
            return 0;
        }
        63 - n.leading_zeros()
    }

    pub fn gcd(mut a: u64, mut b: u64) -> u64 {
        while b > 0 {
            let temp = b;
            b = a % b;
            a = temp;
        }
        a
    }

    /// GCD of all values, `None` for an empty input.
    pub fn gcd_all<I: IntoIterator<Item = u64>>(values: I) -> Option<u64> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(v),
            Some(g) => Some(Self::gcd(g, v)),
        })
    }
}
