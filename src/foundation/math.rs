/// Greatest common divisor (Euclid). `gcd(a, 0) == a`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Least common multiple, or `None` when it does not fit in a `u64`.
///
/// `lcm(a, 0) == Some(0)` and `lcm(0, 0) == Some(0)`.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    let g = gcd(a, b);
    if g == 0 {
        return Some(0);
    }
    (a / g).checked_mul(b)
}

/// Left fold of [`lcm`] seeded with the first element.
///
/// An empty sequence yields `Some(0)`, and a `0` anywhere in the sequence yields `Some(0)`.
/// `None` means some intermediate multiple overflowed.
pub fn lcm_all(values: impl IntoIterator<Item = u64>) -> Option<u64> {
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return Some(0);
    };
    iter.try_fold(first, lcm)
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
