//! Property-based tests for the tuple encoding.
//!
//! 1. **Roundtrip**: `unpack(pack(t)) == t` for every tuple.
//! 2. **Ordering**: `pack(a) < pack(b)` iff `a < b`.
//! 3. **Prefix stability**: a tuple's packing is a prefix of any extension's packing.

use proptest::prelude::*;

use crate::Element;
use crate::Subspace;
use crate::Tuple;

fn arb_element() -> impl Strategy<Value = Element> {
    prop_oneof![
        Just(Element::Null),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Element::Bytes),
        // Bias toward nulls, which exercise the escaping path.
        prop::collection::vec(prop_oneof![Just(0u8), Just(0xFFu8), any::<u8>()], 0..8).prop_map(Element::Bytes),
        "[a-z0-9_]{0,12}".prop_map(Element::String),
        any::<i64>().prop_map(Element::Int),
        (-300i64..300).prop_map(Element::Int),
    ]
}

fn arb_tuple() -> impl Strategy<Value = Tuple> {
    prop::collection::vec(arb_element(), 0..5).prop_map(Tuple::from)
}

/// Tuples shaped like queue keys: (index, suffix).
fn arb_queue_key() -> impl Strategy<Value = Tuple> {
    (0i64..i64::MAX, prop::collection::vec(any::<u8>(), 20))
        .prop_map(|(index, suffix)| Tuple::new().push(index).push(suffix))
}

proptest! {
    #[test]
    fn prop_roundtrip(t in arb_tuple()) {
        let packed = t.pack();
        prop_assert_eq!(Tuple::unpack(&packed).unwrap(), t);
    }

    #[test]
    fn prop_ordering_preserved(a in arb_tuple(), b in arb_tuple()) {
        prop_assert_eq!(a.cmp(&b), a.pack().cmp(&b.pack()));
    }

    #[test]
    fn prop_integer_ordering(a in any::<i64>(), b in any::<i64>()) {
        let pa = Tuple::new().push(a).pack();
        let pb = Tuple::new().push(b).pack();
        prop_assert_eq!(a.cmp(&b), pa.cmp(&pb));
    }

    #[test]
    fn prop_queue_key_ordering(a in arb_queue_key(), b in arb_queue_key()) {
        let ia = a.get_int(0).unwrap();
        let ib = b.get_int(0).unwrap();
        if ia < ib {
            prop_assert!(a.pack() < b.pack());
        }
    }

    #[test]
    fn prop_prefix_stability(a in arb_tuple(), extra in arb_element()) {
        let extended = a.clone().push(extra);
        prop_assert!(extended.pack().starts_with(&a.pack()));
    }

    #[test]
    fn prop_subspace_roundtrip(prefix in arb_tuple(), t in arb_tuple()) {
        let space = Subspace::new(&prefix);
        let key = space.pack(&t);
        prop_assert!(space.contains(&key));
        prop_assert_eq!(space.unpack(&key).unwrap(), t);
    }
}
