//! Property tests for the numeric model and the conversion lattice.

use proptest::prelude::*;

use sluice_value::{parse_number, Number, NumberClass, NumberType, Value};

const ALL_TYPES: [NumberType; 12] = [
    NumberType::U8,
    NumberType::U16,
    NumberType::Usize,
    NumberType::U32,
    NumberType::U64,
    NumberType::I8,
    NumberType::I16,
    NumberType::Isize,
    NumberType::I32,
    NumberType::I64,
    NumberType::F32,
    NumberType::F64,
];

proptest! {
    /// Conversion is total: any number converts to any type in the lattice
    /// without panicking, and the result carries the requested type.
    #[test]
    fn conversion_is_total(bits in any::<i64>(), from_idx in 0usize..12, to_idx in 0usize..12) {
        let source = Number::from_i64(bits).convert(ALL_TYPES[from_idx]);
        let converted = source.convert(ALL_TYPES[to_idx]);
        prop_assert_eq!(converted.ty(), ALL_TYPES[to_idx]);
    }

    /// Promotion picks the same type regardless of operand order.
    #[test]
    fn promotion_is_commutative(a_idx in 0usize..12, b_idx in 0usize..12) {
        let a = Number::from_i64(1).convert(ALL_TYPES[a_idx]);
        let b = Number::from_i64(1).convert(ALL_TYPES[b_idx]);
        prop_assert_eq!(Number::fit(a, b), Number::fit(b, a));
    }

    /// Widening within a signedness class is lossless.
    #[test]
    fn widening_is_lossless(value in any::<u8>()) {
        let start = Number::from(value);
        for ty in [NumberType::U16, NumberType::U32, NumberType::U64, NumberType::Usize] {
            prop_assert_eq!(start.convert(ty).as_u64(), value as u64);
        }
        for ty in [NumberType::I16, NumberType::I32, NumberType::I64] {
            prop_assert_eq!(start.convert(ty).as_i64(), value as i64);
        }
        prop_assert_eq!(start.convert(NumberType::F64).as_f64(), value as f64);
    }

    /// Float-to-integer conversion truncates toward zero.
    #[test]
    fn float_truncates_toward_zero(value in -1_000_000.0f64..1_000_000.0) {
        let number = Number::from_f64(value);
        prop_assert_eq!(number.convert(NumberType::I64).as_i64(), value.trunc() as i64);
    }

    /// Number-to-string-to-number round-trips through the string lattice.
    #[test]
    fn decimal_string_roundtrip(value in any::<i64>()) {
        let number = Number::from_i64(value);
        let text = number.to_string();
        let parsed = parse_number(&text).expect("decimal strings always parse");
        prop_assert_eq!(parsed.as_i64(), value);
    }

    /// Decoding a number into every integer width in range is lossless.
    #[test]
    fn in_range_decode_is_lossless(value in 0i64..=127) {
        let source = Value::int(value);
        prop_assert_eq!(source.decode::<u8>().unwrap() as i64, value);
        prop_assert_eq!(source.decode::<i8>().unwrap() as i64, value);
        prop_assert_eq!(source.decode::<u64>().unwrap() as i64, value);
        prop_assert_eq!(source.decode::<f64>().unwrap() as i64, value);
    }

    /// String parsing picks the class the lattice prescribes.
    #[test]
    fn string_parse_class(value in 1u64..u64::MAX) {
        prop_assert_eq!(parse_number(&value.to_string()).unwrap().class(), NumberClass::Uint);
        prop_assert_eq!(parse_number(&format!("-{}", value.min(i64::MAX as u64))).unwrap().class(), NumberClass::Int);
        prop_assert_eq!(parse_number(&format!("{value}.5")).unwrap().class(), NumberClass::Float);
    }
}
