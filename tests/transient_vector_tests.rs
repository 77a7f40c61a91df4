//! Unit tests for TransientVector.

use pvec::persistent::{IndexOutOfBoundsError, PersistentVector, TransientVector, VectorError};
use rstest::rstest;

// =============================================================================
// Cycle 1: Building
// =============================================================================

#[rstest]
fn test_new_transient_is_empty_and_editable() {
    let transient: TransientVector<i32> = TransientVector::new();
    assert!(transient.is_empty());
    assert!(transient.is_editable());
    assert_eq!(transient.len(), 0);
}

#[rstest]
#[case(0)]
#[case(32)]
#[case(33)]
#[case(1057)]
#[case(40_000)]
fn test_build_then_commit(#[case] count: usize) {
    let mut transient = TransientVector::new();
    for index in 0..count {
        transient.push_back(index).unwrap();
    }
    let vector = transient.persistent().unwrap();

    assert_eq!(vector.len(), count);
    assert!(vector.iter().copied().eq(0..count));
}

#[rstest]
fn test_chained_edits() {
    let mut transient = TransientVector::new();
    transient
        .push_back(1)
        .unwrap()
        .push_back(2)
        .unwrap()
        .set(0, 10)
        .unwrap()
        .pop_back()
        .unwrap();

    assert_eq!(transient.persistent().unwrap(), PersistentVector::singleton(10));
}

// =============================================================================
// Cycle 2: Isolation from the source vector
// =============================================================================

#[rstest]
fn test_source_vector_is_unchanged() {
    let vector: PersistentVector<usize> = (0..2000).collect();
    let snapshot: Vec<usize> = vector.iter().copied().collect();

    let mut transient = vector.transient();
    for index in 0..2000 {
        transient.set(index, 0).unwrap();
    }
    for _ in 0..1500 {
        transient.pop_back().unwrap();
    }
    for index in 0..3000 {
        transient.push_back(index).unwrap();
    }
    let edited = transient.persistent().unwrap();

    assert!(vector.iter().copied().eq(snapshot));
    assert_eq!(edited.len(), 3500);
    assert!(edited.iter().take(500).all(|&value| value == 0));
}

#[rstest]
fn test_two_sessions_from_one_vector() {
    let vector: PersistentVector<usize> = (0..100).collect();
    let mut first = vector.transient();
    let mut second = vector.transient();

    first.set(10, 1).unwrap();
    second.set(10, 2).unwrap();

    assert_eq!(first.get(10), Ok(&1));
    assert_eq!(second.get(10), Ok(&2));
    assert_eq!(vector.get(10), Ok(&10));
}

#[rstest]
fn test_committed_result_is_not_affected_by_later_sessions() {
    let mut transient = TransientVector::new();
    for index in 0..500 {
        transient.push_back(index).unwrap();
    }
    let committed = transient.persistent().unwrap();

    let mut again = committed.transient();
    again.set(0, 1000).unwrap().pop_back().unwrap();
    let derived = again.persistent().unwrap();

    assert_eq!(committed.get(0), Ok(&0));
    assert_eq!(committed.len(), 500);
    assert_eq!(derived.get(0), Ok(&1000));
    assert_eq!(derived.len(), 499);
}

#[rstest]
fn test_vector_of_1057_elements_drains_to_empty() {
    let mut transient = TransientVector::new();
    for index in 0..=1056 {
        transient.push_back(index).unwrap();
    }
    assert_eq!(transient.get(1055), Ok(&1055));

    transient.pop_back().unwrap();
    assert_eq!(transient.len(), 1056);
    assert_eq!(transient.get(1055), Ok(&1055));
    assert!(matches!(
        transient.get(1056),
        Err(VectorError::IndexOutOfBounds(_))
    ));

    while !transient.is_empty() {
        let expected_length = transient.len() - 1;
        transient.pop_back().unwrap();
        assert_eq!(transient.len(), expected_length);
        assert!(transient.get(expected_length).is_err());
    }

    assert_eq!(transient.pop_back().unwrap_err(), VectorError::EmptyCollection);
    assert_eq!(transient.persistent().unwrap(), PersistentVector::new());
}

// =============================================================================
// Cycle 3: Errors
// =============================================================================

#[rstest]
fn test_pop_back_on_empty() {
    let mut transient: TransientVector<i32> = TransientVector::new();
    assert_eq!(transient.pop_back().unwrap_err(), VectorError::EmptyCollection);
    assert!(transient.is_editable());
}

#[rstest]
#[case(0, 0)]
#[case(40, 40)]
#[case(40, usize::MAX)]
fn test_set_and_get_out_of_bounds(#[case] count: usize, #[case] index: usize) {
    let mut transient = (0..count).collect::<PersistentVector<usize>>().transient();
    let expected = VectorError::IndexOutOfBounds(IndexOutOfBoundsError {
        index,
        length: count,
    });

    assert_eq!(transient.get(index).unwrap_err(), expected);
    assert_eq!(transient.set(index, 0).unwrap_err(), expected);
    assert_eq!(transient.len(), count);
}

#[rstest]
fn test_every_operation_fails_after_commit() {
    let mut transient = PersistentVector::singleton(1).transient();
    let vector = transient.persistent().unwrap();

    assert!(!transient.is_editable());
    assert_eq!(transient.push_back(2).unwrap_err(), VectorError::EditAfterCommit);
    assert_eq!(transient.pop_back().unwrap_err(), VectorError::EditAfterCommit);
    assert_eq!(transient.set(0, 2).unwrap_err(), VectorError::EditAfterCommit);
    assert_eq!(transient.get(0).unwrap_err(), VectorError::EditAfterCommit);
    assert_eq!(transient.persistent().unwrap_err(), VectorError::EditAfterCommit);

    assert_eq!(vector, PersistentVector::singleton(1));
}

// =============================================================================
// Cycle 4: Iteration
// =============================================================================

#[rstest]
fn test_iter_reflects_current_contents() {
    let mut transient = TransientVector::new();
    for index in 0..70 {
        transient.push_back(index).unwrap();
    }
    transient.set(69, 0).unwrap();

    let collected: Vec<i32> = transient.iter().unwrap().copied().collect();
    assert_eq!(collected.len(), 70);
    assert_eq!(collected[69], 0);
    assert_eq!(collected[68], 68);
}
