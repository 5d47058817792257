//! Random value generators shared by the workload and the initial
//! population.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Run-time constant `C` of `NURand(255, ...)`.
pub const C_LAST: u32 = 157;

const SYLLABLES: [&str; 10] = [
    "BAR", "OUGHT", "ABLE", "PRI", "PRES", "ESE", "ANTI", "CALLY", "ATION", "EING",
];

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generator of worker `worker` for a run seeded with `seed`.
#[must_use]
pub fn worker_rng(seed: u64, worker: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(worker as u64))
}

/// TPC-C non-uniform random number in `[x, y]`.
pub fn nurand(rng: &mut StdRng, a: u32, c: u32, x: u32, y: u32) -> u32 {
    let left = rng.random_range(0..=a);
    let right = rng.random_range(x..=y);
    ((left | right) + c) % (y - x + 1) + x
}

/// Last name number `num` spelled with three syllables, e.g. 371 is
/// `PRICALLYOUGHT`.
#[must_use]
pub fn last_name(num: u32) -> String {
    let num = num % 1_000;
    [num / 100, (num / 10) % 10, num % 10]
        .iter()
        .map(|&digit| SYLLABLES[digit as usize])
        .collect()
}

/// Non-uniform last name for customer lookups, drawn from the names
/// numbered `0..=max`.
pub fn lookup_last_name(rng: &mut StdRng, max: u32) -> String {
    last_name(nurand(rng, 255, C_LAST, 0, max))
}

/// Letters, length uniform in `[min, max]`.
pub fn alpha_string(rng: &mut StdRng, min: usize, max: usize) -> String {
    let len = rng.random_range(min..=max);
    (0..len)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Digits, exactly `len` of them.
pub fn numeric_string(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10_u8)))
        .collect()
}

/// Four random digits followed by `11111`.
pub fn zip(rng: &mut StdRng) -> String {
    let mut zip = numeric_string(rng, 4);
    zip.push_str("11111");
    zip
}

/// Uniform amount in `[min_cents, max_cents]` cents, as a decimal value.
pub fn money(rng: &mut StdRng, min_cents: u32, max_cents: u32) -> f64 {
    f64::from(rng.random_range(min_cents..=max_cents)) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_names() {
        assert_eq!(last_name(0), "BARBARBAR");
        assert_eq!(last_name(371), "PRICALLYOUGHT");
        assert_eq!(last_name(999), "EINGEINGEING");
    }

    #[test]
    fn test_nurand_in_range() {
        let mut rng = worker_rng(7, 0);
        for _ in 0..1_000 {
            let value = nurand(&mut rng, 255, C_LAST, 0, 29);
            assert!(value <= 29);
            let value = nurand(&mut rng, 1023, 259, 1, 3_000);
            assert!((1..=3_000).contains(&value));
        }
    }

    #[test]
    fn test_worker_streams_differ_but_repeat() {
        let draw = |worker| {
            let mut rng = worker_rng(42, worker);
            (0..8).map(|_| rng.random_range(0..1_000_u32)).collect::<Vec<_>>()
        };
        assert_eq!(draw(0), draw(0));
        assert_ne!(draw(0), draw(1));
    }

    #[test]
    fn test_strings() {
        let mut rng = worker_rng(1, 0);
        for _ in 0..100 {
            let text = alpha_string(&mut rng, 8, 16);
            assert!((8..=16).contains(&text.len()));
            assert!(text.chars().all(|c| c.is_ascii_alphabetic()));
        }
        let zip = zip(&mut rng);
        assert_eq!(zip.len(), 9);
        assert!(zip.ends_with("11111"));
        let amount = money(&mut rng, 100, 500_000);
        assert!((1.0..=5_000.0).contains(&amount));
    }
}
