//! Strong reference cycles are never collected; these tests document the
//! leak and the weak-edge discipline that avoids it.

mod reference_cycles {
    use custody::{Shared, Weak};
    use custody_test_utils::{DropTally, Probe};
    use std::cell::RefCell;

    struct StrongNode {
        _probe: Probe,
        partner: RefCell<Option<Shared<StrongNode>>>,
    }

    #[test]
    fn strong_cycles_leak() {
        let dropped = DropTally::new();
        {
            let a = Shared::new(StrongNode {
                _probe: Probe::new(&dropped),
                partner: RefCell::new(None),
            });
            let b = Shared::new(StrongNode {
                _probe: Probe::new(&dropped),
                partner: RefCell::new(None),
            });

            *a.partner.borrow_mut() = Some(b.clone());
            *b.partner.borrow_mut() = Some(a.clone());

            assert_eq!(Shared::ref_count(&a), 2);
            assert_eq!(Shared::ref_count(&b), 2);
        }

        // each block still holds the other's strong count above zero, so
        // neither value is ever released
        assert_eq!(dropped.count(), 0);
    }

    struct ParentNode {
        _probe: Probe,
        child: RefCell<Option<Shared<ChildNode>>>,
    }

    struct ChildNode {
        _probe: Probe,
        parent: RefCell<Option<Weak<ParentNode>>>,
    }

    #[test]
    fn weakening_one_edge_releases_both() {
        let dropped = DropTally::new();
        {
            let parent = Shared::new(ParentNode {
                _probe: Probe::new(&dropped),
                child: RefCell::new(None),
            });
            let child = Shared::new(ChildNode {
                _probe: Probe::new(&dropped),
                parent: RefCell::new(None),
            });

            *parent.child.borrow_mut() = Some(child.clone());
            *child.parent.borrow_mut() = Some(Shared::downgrade(&parent));

            // the upward edge still reaches the parent while it lives
            let upward = child.parent.borrow().as_ref().unwrap().upgrade();
            assert!(upward.is_some());
            assert_eq!(Shared::ref_count(&parent), 2);
            drop(upward);
        }

        assert_eq!(dropped.count(), 2);
    }
}
