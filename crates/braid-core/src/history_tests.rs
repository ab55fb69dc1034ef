//! Unit tests for the versioned turn sequence

#[cfg(test)]
mod tests {
    use crate::error::BraidError;
    use crate::history::TurnSequence;
    use crate::turn::{Role, Turn};
    use std::sync::Arc;

    fn seq(turns: Vec<Turn>) -> TurnSequence {
        TurnSequence::from_turns(turns)
    }

    #[test]
    fn test_append_never_forks() {
        let mut s = TurnSequence::new();
        s.append(Turn::system("S1"));
        s.append(Turn::user("U1"));
        s.append(Turn::assistant("A1"));
        s.append(Turn::user("U2"));
        assert!(s.predecessor().is_none());
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_edit_before_assistant_forks_and_preserves_history() {
        let mut s = seq(vec![
            Turn::system("S1"),
            Turn::user("U1"),
            Turn::assistant("A1"),
        ]);

        s.set(1, Turn::user("U2")).unwrap();

        assert_eq!(s.get(0).unwrap().text(), "S1");
        assert_eq!(s.get(1).unwrap().text(), "U2");
        assert_eq!(s.get(2).unwrap().text(), "A1");

        let frozen = s.predecessor().expect("edit must fork");
        assert_eq!(frozen.get(0).unwrap().text(), "S1");
        assert_eq!(frozen.get(1).unwrap().text(), "U1");
        assert_eq!(frozen.get(2).unwrap().text(), "A1");
        assert!(frozen.predecessor().is_none());
    }

    #[test]
    fn test_identical_assistant_write_is_elided() {
        let mut s = seq(vec![
            Turn::system("S1"),
            Turn::user("U1"),
            Turn::assistant("A1"),
        ]);
        s.set(1, Turn::user("U2")).unwrap();
        let depth_before = s.depth();
        let slot_before = s.get_shared(2).unwrap();

        // Same content as the current turn: not merely equal afterwards,
        // the stored turn is still the same shared object.
        s.set(2, Turn::assistant("A1")).unwrap();

        assert_eq!(s.depth(), depth_before);
        let slot_after = s.get_shared(2).unwrap();
        assert!(Arc::ptr_eq(&slot_before, &slot_after));
    }

    #[test]
    fn test_elision_applies_even_with_metadata_differences() {
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);
        let edit = Turn::assistant("A1").with_metadata("temperature", 0.2);
        let slot_before = s.get_shared(1).unwrap();

        s.set(1, edit).unwrap();

        assert!(s.predecessor().is_none());
        assert!(Arc::ptr_eq(&slot_before, &s.get_shared(1).unwrap()));
    }

    #[test]
    fn test_edit_with_no_assistant_after_stays_in_place() {
        let mut s = seq(vec![
            Turn::system("S1"),
            Turn::user("U1"),
            Turn::user("U2"),
            Turn::user("U3"),
            Turn::user("U4"),
        ]);

        s.set(2, Turn::user("edited")).unwrap();

        assert!(s.predecessor().is_none());
        assert_eq!(s.get(2).unwrap().text(), "edited");
    }

    #[test]
    fn test_edit_before_assistant_repeatedly_without_assistant_in_range() {
        // Positions before any assistant turn may be overwritten in place
        // indefinitely; only the range [i, len) matters.
        let mut s = seq(vec![
            Turn::assistant("A1"),
            Turn::user("U1"),
            Turn::user("U2"),
        ]);

        s.set(1, Turn::user("U1'")).unwrap();
        s.set(1, Turn::user("U1''")).unwrap();
        s.set(2, Turn::user("U2'")).unwrap();

        assert!(s.predecessor().is_none());
        assert_eq!(s.get(1).unwrap().text(), "U1''");
    }

    #[test]
    fn test_overwriting_assistant_slot_itself_forks() {
        // Conservative rule: the edited range contains an assistant turn
        // even when that turn is the one being replaced.
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);

        s.set(1, Turn::assistant("A2")).unwrap();

        let frozen = s.predecessor().expect("assistant rewrite must fork");
        assert_eq!(frozen.get(1).unwrap().text(), "A1");
        assert_eq!(s.get(1).unwrap().text(), "A2");
    }

    #[test]
    fn test_non_assistant_write_over_same_content_still_applies() {
        // The elision rule is specific to assistant turns; rewriting a user
        // slot with identical content goes through the normal path.
        let mut s = seq(vec![Turn::user("U1"), Turn::user("U2")]);
        let before = s.get_shared(0).unwrap();

        s.set(0, Turn::user("U1")).unwrap();

        assert!(!Arc::ptr_eq(&before, &s.get_shared(0).unwrap()));
        assert!(s.predecessor().is_none());
    }

    #[test]
    fn test_fork_chain_grows_once_per_triggering_edit() {
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);
        assert_eq!(s.depth(), 0);

        s.set(0, Turn::user("U2")).unwrap();
        assert_eq!(s.depth(), 1);

        s.set(0, Turn::user("U3")).unwrap();
        assert_eq!(s.depth(), 2);

        // No assistant at or after index 1 means no fork.
        s.append(Turn::user("U4"));
        s.set(2, Turn::user("U5")).unwrap();
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn test_frozen_snapshot_keeps_older_predecessor() {
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);
        s.set(0, Turn::user("U2")).unwrap();
        s.set(0, Turn::user("U3")).unwrap();

        assert_eq!(s.get(0).unwrap().text(), "U3");
        let first_frozen = s.predecessor().unwrap();
        assert_eq!(first_frozen.get(0).unwrap().text(), "U2");
        let second_frozen = first_frozen.predecessor().unwrap();
        assert_eq!(second_frozen.get(0).unwrap().text(), "U1");
        assert!(second_frozen.predecessor().is_none());
    }

    #[test]
    fn test_out_of_range_get_and_set() {
        let mut s = seq(vec![
            Turn::user("U1"),
            Turn::user("U2"),
            Turn::assistant("A1"),
        ]);

        let err = s.get(10).unwrap_err();
        assert!(matches!(err, BraidError::OutOfRange { index: 10, len: 3 }));

        let err = s.set(3, Turn::user("X")).unwrap_err();
        assert!(matches!(err, BraidError::OutOfRange { index: 3, len: 3 }));

        // The failed write left the sequence untouched.
        assert_eq!(s.len(), 3);
        assert!(s.predecessor().is_none());
    }

    #[test]
    fn test_content_equality_ignores_metadata_and_chain_shape() {
        let a = seq(vec![
            Turn::system("hi").with_metadata("source", "config"),
            Turn::user("hello"),
        ]);

        let mut b = seq(vec![
            Turn::system("hi"),
            Turn::user("hola").with_metadata("lang", "es"),
        ]);
        // Give b a version chain; equality must not care.
        b.append(Turn::assistant("A1"));
        b.set(1, Turn::user("hello")).unwrap();
        b.set(2, Turn::assistant("gone")).unwrap();

        assert_ne!(a, b); // lengths differ
        let b_prefix = TurnSequence::from_turns(vec![
            Turn::system("hi"),
            Turn::user("hello").with_metadata("edited", true),
        ]);
        assert_eq!(a, b_prefix);
    }

    #[test]
    fn test_turns_are_shared_across_fork() {
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);
        let shared_before = s.get_shared(1).unwrap();

        s.set(0, Turn::user("U2")).unwrap();

        // The untouched assistant turn is the same allocation in both the
        // head and the frozen snapshot.
        let in_head = s.get_shared(1).unwrap();
        let in_frozen = s.predecessor().unwrap().get_shared(1).unwrap();
        assert!(Arc::ptr_eq(&shared_before, &in_head));
        assert!(Arc::ptr_eq(&shared_before, &in_frozen));
    }

    #[test]
    fn test_read_after_write() {
        let mut s = seq(vec![Turn::user("U1"), Turn::assistant("A1")]);
        let edit = Turn::user("U1-edited");
        s.set(0, edit.clone()).unwrap();
        assert!(s.get(0).unwrap().content_eq(&edit));
    }

    #[test]
    fn test_last_and_last_assistant() {
        let mut s = TurnSequence::new();
        assert!(s.last().is_none());
        assert!(s.last_assistant().is_none());

        s.append(Turn::user("U1"));
        s.append(Turn::assistant("A1"));
        s.append(Turn::tool("out", "call-1", None));

        assert_eq!(s.last().unwrap().role, Role::Tool);
        assert_eq!(s.last_assistant().unwrap().text(), "A1");
    }
}
