//! Term-level operations: equality, rendering, concatenation, tuples.

use itertools::Itertools;
use owl_types::{Tag, Term};

use crate::error::VmError;
use crate::function;
use crate::heap::Heap;
use crate::list;
use crate::string;

/// Structural equality.
///
/// Identity short-circuits first, which covers sentinels, integers and
/// shared pointers at once. After that the tags must match: tuples compare
/// by length then element-wise, lists element-wise through the tree,
/// strings by bytes. Functions and anything else only compare by identity.
pub fn terms_eq(left: Term, right: Term) -> bool {
    if left == right {
        return true;
    }
    if left.is_sentinel() || right.is_sentinel() {
        return false;
    }
    if left.tag() != right.tag() {
        return false;
    }

    match left.tag() {
        Tag::Tuple => {
            let left_elems = tuple_elems(left);
            let right_elems = tuple_elems(right);
            left_elems.len() == right_elems.len()
                && left_elems
                    .iter()
                    .zip(right_elems)
                    .all(|(&a, &b)| terms_eq(a, b))
        }
        Tag::List => list::eq(left, right),
        Tag::String => string::bytes(left) == string::bytes(right),
        Tag::Int | Tag::Pointer | Tag::Function => false,
    }
}

/// Concatenate two terms of the same tag: strings or lists.
pub fn concat(heap: &mut Heap, left: Term, right: Term) -> Result<Term, VmError> {
    let expected = type_name(left);
    if left.is_sentinel() || right.is_sentinel() || left.tag() != right.tag() {
        return Err(VmError::TypeError {
            expected,
            actual: type_name(right),
        });
    }
    match left.tag() {
        Tag::String => Ok(string::concat(heap, left, right)),
        Tag::List => Ok(list::concat(heap, left, right)),
        _ => Err(VmError::TypeError {
            expected: "String or List",
            actual: expected,
        }),
    }
}

/// The elements of a tuple, after the leading arity word.
pub(crate) fn tuple_elems<'a>(tuple: Term) -> &'a [Term] {
    let words = tuple.payload_ptr() as *const u64;
    // Safety: tuple payloads are `[arity, e1, .., en]` word arrays.
    unsafe {
        let arity = *words as usize;
        core::slice::from_raw_parts(words.add(1) as *const Term, arity)
    }
}

/// Tuple field access; out-of-range indices yield `nil`.
pub fn tuple_nth(tuple: Term, index: u64) -> Term {
    tuple_elems(tuple)
        .get(index as usize)
        .copied()
        .unwrap_or(Term::NIL)
}

/// Human-readable type name of a term.
pub fn type_name(term: Term) -> &'static str {
    if term.is_sentinel() {
        if term == Term::NIL {
            "Nil"
        } else {
            "Bool"
        }
    } else {
        term.tag().name()
    }
}

/// The type of a term, as a string term.
pub fn type_of(heap: &mut Heap, term: Term) -> Term {
    string::from_str(heap, type_name(term))
}

/// Render a term for printing: integers decimally, tuples as
/// comma-separated fields, lists bracketed, strings verbatim, functions by
/// name.
pub fn render(term: Term) -> String {
    match term {
        Term::TRUE => "true".to_owned(),
        Term::FALSE => "false".to_owned(),
        Term::NIL => "nil".to_owned(),
        term => match term.tag() {
            Tag::Int => term.as_int().to_string(),
            Tag::Tuple => tuple_elems(term).iter().map(|&e| render(e)).join(", "),
            Tag::List => {
                let count = list::count(term);
                format!(
                    "[{}]",
                    (0..count).map(|i| render(list::nth(term, i))).join(", ")
                )
            }
            Tag::String => String::from_utf8_lossy(string::bytes(term)).into_owned(),
            Tag::Function => render(function::name(term)),
            Tag::Pointer => "???".to_owned(),
        },
    }
}

/// Convert any term to a string term. Strings convert to themselves, so
/// the conversion is idempotent and identity-preserving on strings.
pub fn to_string(heap: &mut Heap, term: Term) -> Term {
    if !term.is_sentinel() && term.tag() == Tag::String {
        return term;
    }
    let rendered = render(term);
    string::from_str(heap, &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap() -> Heap {
        Heap::new(1024 * 1024)
    }

    fn tuple(heap: &mut Heap, elems: &[Term]) -> Term {
        let words = heap.alloc((elems.len() + 1) * 8) as *mut u64;
        unsafe {
            *words = elems.len() as u64;
            for (i, &elem) in elems.iter().enumerate() {
                *words.add(i + 1) = elem.raw();
            }
        }
        Term::tag_ptr(words as *const u8, Tag::Tuple)
    }

    #[test]
    fn identity_implies_equality() {
        let mut heap = heap();
        let s = string::from_str(&mut heap, "xyz");
        for term in [Term::TRUE, Term::NIL, Term::int(7), s] {
            assert!(terms_eq(term, term));
        }
    }

    #[test]
    fn strings_compare_by_content() {
        let mut heap = heap();
        let a = string::from_str(&mut heap, "same");
        let b = string::from_str(&mut heap, "same");
        let c = string::from_str(&mut heap, "other");
        assert_ne!(a, b);
        assert!(terms_eq(a, b));
        assert!(!terms_eq(a, c));
    }

    #[test]
    fn tuples_compare_recursively() {
        let mut heap = heap();
        let inner_a = tuple(&mut heap, &[Term::int(1), Term::int(2)]);
        let inner_b = tuple(&mut heap, &[Term::int(1), Term::int(2)]);
        let a = tuple(&mut heap, &[inner_a, Term::TRUE]);
        let b = tuple(&mut heap, &[inner_b, Term::TRUE]);
        let c = tuple(&mut heap, &[inner_b, Term::FALSE]);
        let short = tuple(&mut heap, &[inner_b]);
        assert!(terms_eq(a, b));
        assert!(!terms_eq(a, c));
        assert!(!terms_eq(a, short));
    }

    #[test]
    fn mismatched_tags_are_unequal() {
        let mut heap = heap();
        let s = string::from_str(&mut heap, "1");
        assert!(!terms_eq(Term::int(1), s));
        assert!(!terms_eq(Term::TRUE, Term::int(1)));
    }

    #[test]
    fn tuple_nth_returns_nil_past_arity() {
        let mut heap = heap();
        let t = tuple(&mut heap, &[Term::int(5), Term::int(9)]);
        assert_eq!(tuple_nth(t, 0), Term::int(5));
        assert_eq!(tuple_nth(t, 1), Term::int(9));
        assert_eq!(tuple_nth(t, 5), Term::NIL);
    }

    #[test]
    fn rendering() {
        let mut heap = heap();
        assert_eq!(render(Term::int(42)), "42");
        assert_eq!(render(Term::TRUE), "true");
        assert_eq!(render(Term::NIL), "nil");

        let s = string::from_str(&mut heap, "plain");
        assert_eq!(render(s), "plain");

        let t = tuple(&mut heap, &[Term::int(1), s]);
        assert_eq!(render(t), "1, plain");

        let mut l = list::init(&heap);
        for i in 1..4 {
            l = list::push(&mut heap, l, Term::int(i));
        }
        assert_eq!(render(l), "[1, 2, 3]");
    }

    #[test]
    fn to_string_is_identity_on_strings() {
        let mut heap = heap();
        let s = string::from_str(&mut heap, "already");
        assert_eq!(to_string(&mut heap, s), s);

        let n = to_string(&mut heap, Term::int(9));
        assert_eq!(string::bytes(n), b"9");
    }

    #[test]
    fn concat_dispatches_by_tag() {
        let mut heap = heap();
        let a = string::from_str(&mut heap, "ab");
        let b = string::from_str(&mut heap, "cd");
        let joined = concat(&mut heap, a, b).unwrap();
        assert_eq!(string::bytes(joined), b"abcd");

        let err = concat(&mut heap, a, Term::int(1));
        assert!(matches!(err, Err(VmError::TypeError { .. })));

        let err = concat(&mut heap, Term::int(1), Term::int(2));
        assert!(matches!(err, Err(VmError::TypeError { .. })));
    }

    #[test]
    fn type_names() {
        let mut heap = heap();
        let s = string::from_str(&mut heap, "x");
        assert_eq!(type_name(Term::int(1)), "Int");
        assert_eq!(type_name(s), "String");
        assert_eq!(type_name(Term::NIL), "Nil");
        let named = type_of(&mut heap, Term::int(1));
        assert_eq!(string::bytes(named), b"Int");
    }
}
