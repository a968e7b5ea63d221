use owl_types::Term;

use crate::heap::Heap;
use crate::list;

fn heap() -> Heap {
    Heap::new(64 * 1024 * 1024)
}

fn make_list(heap: &mut Heap, values: impl IntoIterator<Item = u64>) -> Term {
    let mut result = list::init(heap);
    for value in values {
        result = list::push(heap, result, Term::int(value));
    }
    result
}

fn assert_is_range(list: Term, offset: u64, len: u64) {
    assert_eq!(list::count(list), len);
    for i in 0..len {
        assert_eq!(list::nth(list, i), Term::int(offset + i), "index {i}");
    }
}

#[test]
fn empty_list_properties() {
    let mut heap = heap();
    let empty = list::init(&heap);
    assert_eq!(list::count(empty), 0);
    assert!(list::is_empty(&heap, empty));
    assert_eq!(list::nth(empty, 0), Term::NIL);
    assert_eq!(list::peek(empty), Term::NIL);
    assert_eq!(list::pop(&mut heap, empty), empty);
}

#[test]
fn push_appends_and_preserves_prefix() {
    let mut heap = heap();
    let small = make_list(&mut heap, 0..10);
    assert_is_range(small, 0, 10);

    let pushed = list::push(&mut heap, small, Term::int(10));
    assert_is_range(pushed, 0, 11);
    // The input is untouched.
    assert_is_range(small, 0, 10);
}

#[test]
fn push_through_every_tail_boundary() {
    let mut heap = heap();
    // 32 crosses the first push-down, 1024 forces a root split, 33_000
    // exercises three levels.
    for len in [1u64, 31, 32, 33, 63, 64, 65, 1023, 1024, 1025, 33_000] {
        let built = make_list(&mut heap, 0..len);
        assert_is_range(built, 0, len);
    }
}

#[test]
fn ten_thousand_pushes_count() {
    let mut heap = heap();
    let big = make_list(&mut heap, 0..10_000);
    assert_eq!(list::count(big), 10_000);
    assert_eq!(list::nth(big, 9_999), Term::int(9_999));
    assert_eq!(list::nth(big, 10_000), Term::NIL);
}

#[test]
fn concat_of_empties_is_identity() {
    let mut heap = heap();
    let empty = list::init(&heap);
    let abc = make_list(&mut heap, 0..3);
    assert_eq!(list::concat(&mut heap, empty, abc), abc);
    assert_eq!(list::concat(&mut heap, abc, empty), abc);
}

#[test]
fn concat_maps_both_sides() {
    let mut heap = heap();
    for (left_len, right_len) in [
        (3u64, 3u64),
        (1, 31),
        (31, 1),
        (32, 32),
        (40, 27),
        (100, 1000),
        (1000, 100),
        (513, 517),
    ] {
        let left = make_list(&mut heap, 0..left_len);
        let right = make_list(&mut heap, left_len..left_len + right_len);
        let joined = list::concat(&mut heap, left, right);
        assert_is_range(joined, 0, left_len + right_len);
        // Persistence: the inputs survive.
        assert_is_range(left, 0, left_len);
        assert_is_range(right, left_len, right_len);
    }
}

#[test]
fn repeated_concat_stays_balanced() {
    let mut heap = heap();
    // Odd-sized chunks force relaxed nodes and size tables everywhere.
    let mut all = list::init(&heap);
    let mut next = 0u64;
    for chunk in 0..200 {
        let len = (chunk % 7) + 1;
        let piece = make_list(&mut heap, next..next + len);
        all = list::concat(&mut heap, all, piece);
        next += len;
    }
    assert_is_range(all, 0, next);
}

#[test]
fn concat_then_index_matches_scenario() {
    let mut heap = heap();
    let left = make_list(&mut heap, 1..4);
    let right = make_list(&mut heap, 4..7);
    let joined = list::concat(&mut heap, left, right);
    assert_eq!(list::nth(joined, 4), Term::int(5));
}

#[test]
fn slice_is_a_window() {
    let mut heap = heap();
    let base = make_list(&mut heap, 0..500);
    for (from, to) in [(0u64, 500u64), (0, 10), (490, 500), (13, 250), (100, 101)] {
        let sliced = list::slice(&mut heap, base, from, to);
        assert_is_range(sliced, from, to - from);
    }
    assert_is_range(base, 0, 500);
}

#[test]
fn degenerate_slices_are_empty() {
    let mut heap = heap();
    let base = make_list(&mut heap, 0..50);
    for (from, to) in [(10u64, 10u64), (20, 10), (50, 50), (60, 80)] {
        let sliced = list::slice(&mut heap, base, from, to);
        assert_eq!(list::count(sliced), 0, "slice [{from}, {to})");
    }
}

#[test]
fn slice_of_slice() {
    let mut heap = heap();
    let base = make_list(&mut heap, 0..1000);
    let mid = list::slice(&mut heap, base, 100, 900);
    let inner = list::slice(&mut heap, mid, 50, 150);
    assert_is_range(inner, 150, 100);
}

#[test]
fn slice_after_concat() {
    let mut heap = heap();
    let left = make_list(&mut heap, 0..77);
    let right = make_list(&mut heap, 77..200);
    let joined = list::concat(&mut heap, left, right);
    let sliced = list::slice(&mut heap, joined, 60, 120);
    assert_is_range(sliced, 60, 60);
}

#[test]
fn update_replaces_exactly_one_index() {
    let mut heap = heap();
    for len in [5u64, 40, 700] {
        let base = make_list(&mut heap, 0..len);
        let target = len / 2;
        let updated = list::update(&mut heap, base, target, Term::int(9_999)).unwrap();
        assert_eq!(list::count(updated), len);
        for i in 0..len {
            let expected = if i == target { 9_999 } else { i };
            assert_eq!(list::nth(updated, i), Term::int(expected));
        }
        // Path copy leaves the original alone.
        assert_is_range(base, 0, len);
    }
}

#[test]
fn update_out_of_range_is_none() {
    let mut heap = heap();
    let base = make_list(&mut heap, 0..5);
    assert!(list::update(&mut heap, base, 5, Term::int(0)).is_none());
    assert!(list::update(&mut heap, base, 1000, Term::int(0)).is_none());
}

#[test]
fn pop_walks_back_to_empty() {
    let mut heap = heap();
    let mut shrinking = make_list(&mut heap, 0..70);
    for expected_len in (0..70u64).rev() {
        shrinking = list::pop(&mut heap, shrinking);
        assert_is_range(shrinking, 0, expected_len);
    }
    assert!(list::is_empty(&heap, shrinking));
}

#[test]
fn peek_is_the_last_element() {
    let mut heap = heap();
    let base = make_list(&mut heap, 0..33);
    assert_eq!(list::peek(base), Term::int(32));
}

#[test]
fn structural_equality() {
    let mut heap = heap();
    let a = make_list(&mut heap, 0..100);
    let b = make_list(&mut heap, 0..100);
    let c = make_list(&mut heap, 0..99);
    let d = {
        let left = make_list(&mut heap, 0..40);
        let right = make_list(&mut heap, 40..100);
        list::concat(&mut heap, left, right)
    };
    assert!(list::eq(a, b));
    assert!(list::eq(a, d));
    assert!(!list::eq(a, c));
}

mod properties {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn qc_push_then_nth(values: Vec<u16>, extra: u16) -> bool {
        let mut heap = heap();
        let base = make_list(&mut heap, values.iter().map(|&v| u64::from(v)));
        let pushed = list::push(&mut heap, base, Term::int(u64::from(extra)));

        list::nth(pushed, values.len() as u64) == Term::int(u64::from(extra))
            && (0..values.len() as u64)
                .all(|i| list::nth(pushed, i) == list::nth(base, i))
    }

    #[quickcheck]
    fn qc_concat_counts_and_elements(left: Vec<u16>, right: Vec<u16>) -> bool {
        let mut heap = heap();
        let a = make_list(&mut heap, left.iter().map(|&v| u64::from(v)));
        let b = make_list(&mut heap, right.iter().map(|&v| u64::from(v)));
        let joined = list::concat(&mut heap, a, b);

        list::count(joined) == (left.len() + right.len()) as u64
            && (0..left.len() as u64).all(|i| list::nth(joined, i) == list::nth(a, i))
            && (0..right.len() as u64)
                .all(|j| list::nth(joined, left.len() as u64 + j) == list::nth(b, j))
    }

    #[quickcheck]
    fn qc_slice_window(values: Vec<u16>, from: usize, to: usize) -> TestResult {
        if values.is_empty() {
            return TestResult::discard();
        }
        let from = from % values.len();
        let to = to % (values.len() + 1);
        if from > to {
            return TestResult::discard();
        }

        let mut heap = heap();
        let base = make_list(&mut heap, values.iter().map(|&v| u64::from(v)));
        let sliced = list::slice(&mut heap, base, from as u64, to as u64);

        let ok = list::count(sliced) == (to - from) as u64
            && (0..(to - from) as u64)
                .all(|k| list::nth(sliced, k) == list::nth(base, from as u64 + k));
        TestResult::from_bool(ok)
    }

    #[quickcheck]
    fn qc_update_isolation(values: Vec<u16>, index: usize) -> TestResult {
        if values.is_empty() {
            return TestResult::discard();
        }
        let index = (index % values.len()) as u64;

        let mut heap = heap();
        let base = make_list(&mut heap, values.iter().map(|&v| u64::from(v)));
        let updated = list::update(&mut heap, base, index, Term::int(77_777)).unwrap();

        let ok = list::count(updated) == values.len() as u64
            && list::nth(updated, index) == Term::int(77_777)
            && (0..values.len() as u64)
                .filter(|&i| i != index)
                .all(|i| list::nth(updated, i) == list::nth(base, i));
        TestResult::from_bool(ok)
    }
}
