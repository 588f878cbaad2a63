//! Property-based tests for the decimal-string arithmetic layer.
//!
//! Chained monetary arithmetic must not drift: subtraction followed by
//! addition of the same operand reproduces the input exactly, and
//! multiplication/division are mutual inverses. These are the
//! guarantees `f64` cannot make.

use proptest::prelude::*;

use coinbridge_core::precise::{
    string_add, string_div, string_eq, string_ge, string_gt, string_le, string_lt, string_max,
    string_min, string_mul, string_sub,
};

/// A decimal string with bounded mantissa and scale, well inside
/// `rust_decimal`'s 28-significant-digit domain even after products.
fn decimal_string(scale: u32) -> impl Strategy<Value = String> {
    (-1_000_000_000_000_i64..1_000_000_000_000_i64).prop_map(move |mantissa| {
        rust_decimal::Decimal::from_i128_with_scale(i128::from(mantissa), scale).to_string()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// stringAdd(stringSub(a, b), b) == a, byte-exact, for same-scale
    /// operands.
    #[test]
    fn prop_add_sub_round_trip_exact((a, b) in (0u32..8).prop_flat_map(|s| {
        (decimal_string(s), decimal_string(s))
    })) {
        let diff = string_sub(&a, &b).unwrap();
        let back = string_add(&diff, &b).unwrap();
        prop_assert_eq!(back, a);
    }

    /// The same round trip is numerically exact for mixed scales.
    #[test]
    fn prop_add_sub_round_trip_numeric(a in decimal_string(2), b in decimal_string(7)) {
        let diff = string_sub(&a, &b).unwrap();
        let back = string_add(&diff, &b).unwrap();
        prop_assert!(string_eq(&back, &a).unwrap());
    }

    /// stringDiv(stringMul(a, b), b) == a numerically for nonzero b.
    #[test]
    fn prop_mul_div_inverse(a in decimal_string(4), b in decimal_string(4)) {
        prop_assume!(!string_eq(&b, "0").unwrap());
        let product = string_mul(&a, &b).unwrap();
        let back = string_div(&product, &b, None).unwrap();
        prop_assert!(string_eq(&back, &a).unwrap());
    }

    /// Comparisons are a total order consistent with min/max.
    #[test]
    fn prop_comparison_consistency(a in decimal_string(3), b in decimal_string(3)) {
        let gt = string_gt(&a, &b).unwrap();
        let lt = string_lt(&a, &b).unwrap();
        let eq = string_eq(&a, &b).unwrap();
        // exactly one of <, ==, > holds
        prop_assert_eq!(u8::from(gt) + u8::from(lt) + u8::from(eq), 1);
        prop_assert_eq!(string_ge(&a, &b).unwrap(), gt || eq);
        prop_assert_eq!(string_le(&a, &b).unwrap(), lt || eq);

        let min = string_min(&a, &b).unwrap();
        let max = string_max(&a, &b).unwrap();
        prop_assert!(string_le(&min, &max).unwrap());
        prop_assert!(string_eq(&min, &a).unwrap() || string_eq(&min, &b).unwrap());
    }

    /// Addition is commutative down to the exact string.
    #[test]
    fn prop_add_commutative(a in decimal_string(5), b in decimal_string(5)) {
        prop_assert_eq!(string_add(&a, &b).unwrap(), string_add(&b, &a).unwrap());
    }
}
