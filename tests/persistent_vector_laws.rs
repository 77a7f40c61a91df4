//! Property-based tests for PersistentVector laws.
//!
//! This module verifies the algebraic laws and invariants of PersistentVector
//! and TransientVector using proptest, with `Vec` as the model.

use pvec::persistent::{PersistentVector, VectorError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Operation {
    Push(i32),
    Pop,
    Set(usize, i32),
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => any::<i32>().prop_map(Operation::Push),
        1 => Just(Operation::Pop),
        1 => (any::<usize>(), any::<i32>()).prop_map(|(index, value)| Operation::Set(index, value)),
    ]
}

// =============================================================================
// Basic Laws
// =============================================================================

proptest! {
    /// Get-Set Law: an element written with set is read back by get
    #[test]
    fn prop_get_set_law(
        elements in prop::collection::vec(any::<i32>(), 1..2000),
        seed: usize,
        value: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = seed % vector.len();

        let updated = vector.set(index, value).unwrap();
        prop_assert_eq!(updated.get(index), Ok(&value));
    }

    /// Set-Other Law: set does not affect any other index
    #[test]
    fn prop_set_does_not_affect_other_indices(
        elements in prop::collection::vec(any::<i32>(), 1..2000),
        seed: usize,
        value: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = seed % vector.len();
        let updated = vector.set(index, value).unwrap();

        for (other, element) in elements.iter().enumerate() {
            if other != index {
                prop_assert_eq!(updated.get(other), Ok(element));
            }
        }
    }

    /// Push-Pop Law: pop_back inverts push_back
    #[test]
    fn prop_push_pop_back_law(
        elements in prop::collection::vec(any::<i32>(), 0..2000),
        new_element: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let with_element = vector.push_back(new_element);

        prop_assert_eq!(with_element.len(), vector.len() + 1);
        prop_assert_eq!(with_element.last(), Some(&new_element));
        prop_assert_eq!(with_element.pop_back().unwrap(), vector);
    }

    /// Persistence: no operation changes its receiver
    #[test]
    fn prop_operations_do_not_mutate_receiver(
        elements in prop::collection::vec(any::<i32>(), 1..1200),
        seed: usize,
        value: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();

        let _ = vector.push_back(value);
        let _ = vector.pop_back();
        let _ = vector.set(seed % elements.len(), value);
        let mut transient = vector.transient();
        transient.push_back(value).unwrap().set(0, value).unwrap();
        let _ = transient.persistent();

        prop_assert!(vector.iter().eq(elements.iter()));
    }

    /// Bounds: any index at or past the length is rejected
    #[test]
    fn prop_out_of_bounds_is_rejected(
        elements in prop::collection::vec(any::<i32>(), 0..200),
        offset: usize
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = vector.len().saturating_add(offset);

        prop_assert!(matches!(vector.get(index), Err(VectorError::IndexOutOfBounds(_))));
        prop_assert!(matches!(vector.set(index, 0), Err(VectorError::IndexOutOfBounds(_))));
    }
}

// =============================================================================
// Model-based Laws
// =============================================================================

proptest! {
    /// Iteration yields exactly what get yields, in order
    #[test]
    fn prop_iter_agrees_with_get(
        elements in prop::collection::vec(any::<i32>(), 0..3000)
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let by_index: Vec<&i32> = (0..vector.len()).map(|i| vector.get(i).unwrap()).collect();
        let by_iter: Vec<&i32> = vector.iter().collect();

        prop_assert_eq!(vector.iter().len(), elements.len());
        prop_assert_eq!(by_index, by_iter);
    }

    /// A persistent vector behaves like Vec under any operation sequence
    #[test]
    fn prop_persistent_matches_vec_model(
        initial in prop::collection::vec(any::<i32>(), 0..1100),
        operations in prop::collection::vec(operation_strategy(), 0..200)
    ) {
        let mut vector: PersistentVector<i32> = initial.iter().copied().collect();
        let mut model = initial;

        for operation in operations {
            match operation {
                Operation::Push(value) => {
                    vector = vector.push_back(value);
                    model.push(value);
                }
                Operation::Pop => match model.pop() {
                    Some(_) => vector = vector.pop_back().unwrap(),
                    None => prop_assert_eq!(vector.pop_back(), Err(VectorError::EmptyCollection)),
                },
                Operation::Set(seed, value) if !model.is_empty() => {
                    let index = seed % model.len();
                    vector = vector.set(index, value).unwrap();
                    model[index] = value;
                }
                Operation::Set(..) => {}
            }
            prop_assert_eq!(vector.len(), model.len());
        }

        prop_assert!(vector.iter().eq(model.iter()));
    }

    /// A transient session produces the same result as persistent operations
    #[test]
    fn prop_transient_matches_persistent(
        initial in prop::collection::vec(any::<i32>(), 0..1100),
        operations in prop::collection::vec(operation_strategy(), 0..200)
    ) {
        let base: PersistentVector<i32> = initial.iter().copied().collect();
        let mut persistent = base.clone();
        let mut transient = base.transient();

        for operation in operations {
            match operation {
                Operation::Push(value) => {
                    persistent = persistent.push_back(value);
                    transient.push_back(value).unwrap();
                }
                Operation::Pop => {
                    let expected = persistent.pop_back();
                    let actual = transient.pop_back().map(|_| ());
                    prop_assert_eq!(actual.is_ok(), expected.is_ok());
                    if let Ok(popped) = expected {
                        persistent = popped;
                    }
                }
                Operation::Set(seed, value) if !persistent.is_empty() => {
                    let index = seed % persistent.len();
                    persistent = persistent.set(index, value).unwrap();
                    transient.set(index, value).unwrap();
                }
                Operation::Set(..) => {}
            }
        }

        prop_assert_eq!(transient.persistent().unwrap(), persistent);
        prop_assert!(base.iter().eq(initial.iter()));
    }

    /// push_back_many equals repeated push_back
    #[test]
    fn prop_push_back_many_matches_push_back(
        initial in prop::collection::vec(any::<i32>(), 0..500),
        extra in prop::collection::vec(any::<i32>(), 0..1500)
    ) {
        let vector: PersistentVector<i32> = initial.iter().copied().collect();
        let folded = extra.iter().fold(vector.clone(), |acc, &value| acc.push_back(value));

        prop_assert_eq!(vector.push_back_many(extra.iter().copied()), folded);
    }
}
