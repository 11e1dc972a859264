//! Universal Value 引擎测试

#[cfg(test)]
mod arithmetic_tests {
    use super::super::*;
    use crate::frontend::symbols::types::Primitive;

    fn fold(
        lhs: Value,
        op: &str,
        rhs: Value,
    ) -> Result<Value, FoldError> {
        binary(&lhs, BinaryOp::from_symbol(op).unwrap(), &rhs)
    }

    #[test]
    fn test_basic_integer_arithmetic() {
        assert_eq!(fold(Value::int(2), "+", Value::int(12)).unwrap(), Value::int(14));
        assert_eq!(fold(Value::int(7), "/", Value::int(2)).unwrap(), Value::int(3));
        assert_eq!(fold(Value::int(-7), "%", Value::int(3)).unwrap(), Value::int(-1));
        assert_eq!(fold(Value::int(2), "**", Value::int(10)).unwrap(), Value::int(1024));
    }

    #[test]
    fn test_integer_zero_division() {
        assert_eq!(
            fold(Value::int(5), "/", Value::int(0)).unwrap_err(),
            FoldError::DivisionByIntegerZero
        );
        assert_eq!(
            fold(Value::int(5), "%", Value::int(0)).unwrap_err(),
            FoldError::DivisionByIntegerZero
        );
        assert_eq!(
            FoldError::DivisionByIntegerZero.to_string(),
            "division by integer zero is forbidden"
        );
    }

    #[test]
    fn test_real_division_by_zero() {
        let v = fold(Value::real(5.0), "/", Value::int(0)).unwrap();
        assert_eq!(v.to_string(), "Infinity");
        let v = fold(Value::real(-5.0), "/", Value::int(0)).unwrap();
        assert_eq!(v.to_string(), "-Infinity");
        let v = fold(Value::real(0.0), "/", Value::real(0.0)).unwrap();
        assert_eq!(v.to_string(), "NaN");
    }

    #[test]
    fn test_overflow_widens_when_not_fixed() {
        let v = fold(Value::int(i32::MAX), "+", Value::int(1)).unwrap();
        assert_eq!(v.kind(), Primitive::UInt);
        let v = fold(Value::int(i32::MIN), "-", Value::int(1)).unwrap();
        assert_eq!(v.kind(), Primitive::Long);
        assert_eq!(v.to_i64(), i32::MIN as i64 - 1);
        let v = fold(Value::new(Data::ULong(u64::MAX)), "+", Value::int(1)).unwrap();
        assert_eq!(v.kind(), Primitive::Real);
    }

    #[test]
    fn test_overflow_truncates_when_fixed() {
        let byte = Value::int(200).convert_to(Primitive::Byte).unwrap().pinned();
        let v = fold(byte.clone(), "+", Value::new(Data::Byte(100))).unwrap();
        assert_eq!(v.data, Data::Byte(44));
        assert!(v.fixed);
    }

    #[test]
    fn test_fixed_flag_only_for_pinned_kind() {
        let byte = Value::new(Data::Byte(1)).pinned();
        let v = fold(byte, "+", Value::int(1)).unwrap();
        assert_eq!(v.kind(), Primitive::Int);
        assert!(!v.fixed);
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(
            fold(Value::int(2), "**", Value::int(-1)).unwrap_err(),
            FoldError::NegativeExponent
        );
        let v = fold(Value::real(2.0), "**", Value::int(-1)).unwrap();
        assert_eq!(v, Value::real(0.5));
    }

    #[test]
    fn test_bitwise_and_shift_truncate() {
        assert_eq!(fold(Value::int(6), "&", Value::int(3)).unwrap(), Value::int(2));
        assert_eq!(fold(Value::int(1), "<<", Value::int(4)).unwrap(), Value::int(16));
        assert_eq!(
            fold(Value::int(1), "<<", Value::int(31)).unwrap(),
            Value::int(i32::MIN)
        );
        assert_eq!(fold(Value::bool(true), "^", Value::bool(true)).unwrap(), Value::bool(false));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &Value::int(5)).unwrap(), Value::int(-5));
        assert_eq!(unary(UnaryOp::Not, &Value::bool(false)).unwrap(), Value::bool(true));
        assert_eq!(unary(UnaryOp::BitNot, &Value::int(0)).unwrap(), Value::int(-1));
        assert!(unary(UnaryOp::Not, &Value::int(1)).is_err());
        let v = unary(UnaryOp::Neg, &Value::int(i32::MIN)).unwrap();
        assert_eq!(v.kind(), Primitive::UInt);
    }
}

#[cfg(test)]
mod string_and_container_tests {
    use super::super::*;

    #[test]
    fn test_string_concatenation() {
        let v = binary(&Value::string("n = "), BinaryOp::Add, &Value::int(3)).unwrap();
        assert_eq!(v, Value::string("n = 3"));
        let v = binary(&Value::real(1.5), BinaryOp::Add, &Value::string("x")).unwrap();
        assert_eq!(v, Value::string("1.5x"));
    }

    #[test]
    fn test_string_repetition() {
        let v = binary(&Value::string("ab"), BinaryOp::Mul, &Value::int(3)).unwrap();
        assert_eq!(v, Value::string("ababab"));
        let v = binary(&Value::int(2), BinaryOp::Mul, &Value::string("x")).unwrap();
        assert_eq!(v, Value::string("xx"));
        assert!(binary(&Value::string("a"), BinaryOp::Sub, &Value::int(1)).is_err());
    }

    #[test]
    fn test_string_comparison() {
        let lt = binary(&Value::string("abc"), BinaryOp::Lt, &Value::string("abd")).unwrap();
        assert_eq!(lt, Value::bool(true));
        let eq = binary(&Value::string("a"), BinaryOp::Eq, &Value::string("a")).unwrap();
        assert_eq!(eq, Value::bool(true));
    }

    #[test]
    fn test_mixed_numeric_equality() {
        let eq = binary(&Value::int(2), BinaryOp::Eq, &Value::real(2.0)).unwrap();
        assert_eq!(eq, Value::bool(true));
        let ne = binary(&Value::char('a'), BinaryOp::Ne, &Value::int(97)).unwrap();
        assert_eq!(ne, Value::bool(false));
        let null = binary(&Value::null(), BinaryOp::Eq, &Value::string("x")).unwrap();
        assert_eq!(null, Value::bool(false));
    }

    #[test]
    fn test_list_index_and_length() {
        use crate::frontend::symbols::types::{Primitive, TypeDescriptor};
        let xs = Value::list(
            vec![Value::int(1), Value::int(2), Value::int(3)],
            TypeDescriptor::primitive(Primitive::Int),
        );
        assert_eq!(index(&xs, &Value::int(1)).unwrap(), Value::int(2));
        assert_eq!(
            index(&xs, &Value::int(3)).unwrap_err(),
            FoldError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(length(&xs), Some(Value::int(3)));
        assert_eq!(length(&Value::string("héllo")), Some(Value::int(5)));
        assert_eq!(xs.to_host_literal(), "new List<int> { 1, 2, 3 }");
    }

    #[test]
    fn test_list_concatenation() {
        use crate::frontend::symbols::types::{Primitive, TypeDescriptor};
        let int = TypeDescriptor::primitive(Primitive::Int);
        let a = Value::list(vec![Value::int(1)], int.clone());
        let b = Value::list(vec![Value::int(2)], int);
        let joined = binary(&a, BinaryOp::Add, &b).unwrap();
        assert_eq!(joined.to_string(), "[1, 2]");
    }
}

#[cfg(test)]
mod coercion_tests {
    use super::super::*;
    use crate::frontend::symbols::types::Primitive;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_integer_chain_truncates() {
        let v = Value::int(300).convert_to(Primitive::Byte).unwrap();
        assert_eq!(v.data, Data::Byte(44));
        let v = Value::int(-1).convert_to(Primitive::UShort).unwrap();
        assert_eq!(v.data, Data::UShort(u16::MAX));
    }

    #[test]
    fn test_real_out_of_range_is_zero() {
        let v = Value::real(1e10).convert_to(Primitive::Int).unwrap();
        assert_eq!(v.data, Data::Int(0));
        let v = Value::real(3.9).convert_to(Primitive::Int).unwrap();
        assert_eq!(v.data, Data::Int(3));
        let v = Value::real(f64::NAN).convert_to(Primitive::Long).unwrap();
        assert_eq!(v.data, Data::Long(0));
    }

    #[test]
    fn test_string_sources() {
        assert_eq!(
            Value::string("42").convert_to(Primitive::Int).unwrap().data,
            Data::Int(42)
        );
        assert_eq!(
            Value::string("99999").convert_to(Primitive::SByte).unwrap().data,
            Data::SByte(0)
        );
        assert_eq!(
            Value::string("nope").convert_to(Primitive::Real).unwrap().data,
            Data::Real(0.0)
        );
        assert_eq!(
            Value::string("true").convert_to(Primitive::Bool).unwrap().data,
            Data::Bool(true)
        );
    }

    #[test]
    fn test_host_literals() {
        assert_eq!(Value::long(5).to_host_literal(), "5L");
        assert_eq!(Value::new(Data::ULong(5)).to_host_literal(), "5UL");
        assert_eq!(Value::new(Data::Byte(5)).to_host_literal(), "(byte)5");
        assert_eq!(Value::real(14.0).to_host_literal(), "14.0");
        assert_eq!(Value::string("a\"b").to_host_literal(), "\"a\\\"b\"");
        assert_eq!(Value::char('\'').to_host_literal(), "'\\''");
        assert_eq!(Value::string("a\u{1}b").to_host_literal(), "\"a\\u0001b\"");
        assert_eq!(Value::real(f64::INFINITY).to_host_literal(), "double.PositiveInfinity");
    }

    #[test]
    fn test_integer_literal_kinds() {
        assert_eq!(Value::integer_literal("14", false).unwrap().kind(), Primitive::Int);
        assert_eq!(Value::integer_literal("3000000000", false).unwrap().kind(), Primitive::UInt);
        assert_eq!(Value::integer_literal("14", true).unwrap().kind(), Primitive::Long);
        assert!(Value::integer_literal("99999999999999999999999", false).is_none());
    }

    #[quickcheck]
    fn prop_int_roundtrip_through_long(n: i32) -> bool {
        let long = Value::int(n).convert_to(Primitive::Long).unwrap();
        long.convert_to(Primitive::Int).unwrap() == Value::int(n)
    }

    #[quickcheck]
    fn prop_byte_conversion_matches_native_cast(n: i32) -> bool {
        Value::int(n).convert_to(Primitive::Byte).unwrap().data == Data::Byte(n as u8)
    }
}

#[cfg(test)]
mod builtin_tests {
    use super::super::builtins::call;
    use super::super::*;

    #[test]
    fn test_transcendental_folding() {
        assert_eq!(call("sqrt", &[Value::int(16)]).unwrap(), Value::real(4.0));
        assert_eq!(call("max", &[Value::int(2), Value::real(3.5)]).unwrap(), Value::real(3.5));
        assert_eq!(call("round", &[Value::real(2.5)]).unwrap(), Value::real(2.0));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            call("sqrt", &[Value::int(-1)]).unwrap_err(),
            FoldError::Domain("sqrt".to_string())
        );
        assert!(call("log", &[Value::int(0)]).is_err());
        assert!(call("asin", &[Value::real(2.0)]).is_err());
    }

    #[test]
    fn test_builtin_rejects_non_numeric() {
        assert!(call("sin", &[Value::string("x")]).is_err());
    }
}

#[cfg(test)]
mod soundness_props {
    use super::super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn folded_int_arithmetic_matches_native(a in -10_000i32..10_000, b in -10_000i32..10_000) {
            let sum = binary(&Value::int(a), BinaryOp::Add, &Value::int(b)).unwrap();
            prop_assert_eq!(sum, Value::int(a + b));
            let product = binary(&Value::int(a), BinaryOp::Mul, &Value::int(b)).unwrap();
            prop_assert_eq!(product, Value::int(a * b));
            if b != 0 {
                let quotient = binary(&Value::int(a), BinaryOp::Div, &Value::int(b)).unwrap();
                prop_assert_eq!(quotient, Value::int(a / b));
                let remainder = binary(&Value::int(a), BinaryOp::Rem, &Value::int(b)).unwrap();
                prop_assert_eq!(remainder, Value::int(a % b));
            }
        }

        #[test]
        fn commutative_ops_are_symmetric(a in any::<i16>(), b in any::<i64>()) {
            let lhs = Value::new(Data::Short(a));
            let rhs = Value::long(b);
            for op in [BinaryOp::Add, BinaryOp::Mul, BinaryOp::Eq, BinaryOp::Ne] {
                prop_assert_eq!(binary(&lhs, op, &rhs).unwrap(), binary(&rhs, op, &lhs).unwrap());
            }
        }

        #[test]
        fn comparisons_match_native(a in any::<i32>(), b in any::<i32>()) {
            let lt = binary(&Value::int(a), BinaryOp::Lt, &Value::int(b)).unwrap();
            prop_assert_eq!(lt, Value::bool(a < b));
        }
    }
}
