mod shared_owners {
    use custody::Shared;
    use custody_test_utils::{counting_deleter, DropTally, Probe};
    use std::ptr::NonNull;
    use test_case::test_case;

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(8)]
    fn ref_count_tracks_live_owners(extra_owners: usize) {
        let first = Shared::new(0u64);

        let owners: Vec<_> = (0..extra_owners).map(|_| first.clone()).collect();
        assert_eq!(Shared::ref_count(&first), extra_owners + 1);

        drop(owners);
        assert_eq!(Shared::ref_count(&first), 1);
    }

    #[test]
    fn copies_share_one_control_block() {
        let sp1 = Shared::new(0);
        let sp2 = sp1.clone();

        assert_eq!(Shared::ref_count(&sp1), 2);
        assert_eq!(Shared::ref_count(&sp2), 2);
        assert!(Shared::ptr_eq(&sp1, &sp2));
        assert_eq!(Shared::address(&sp1), Shared::address(&sp2));

        drop(sp1);
        assert_eq!(Shared::ref_count(&sp2), 1);
    }

    #[test]
    fn value_destroyed_with_the_last_owner() {
        let dropped = DropTally::new();
        let first = Shared::new(Probe::new(&dropped));
        let second = first.clone();

        drop(first);
        assert_eq!(dropped.count(), 0);

        drop(second);
        assert_eq!(dropped.count(), 1);
    }

    #[test]
    fn clone_from_tolerates_owners_of_the_same_block() {
        let mut owner = Shared::new(5);
        let other = owner.clone();

        owner.clone_from(&other);
        assert_eq!(Shared::ref_count(&owner), 2);
        assert_eq!(*owner, 5);
    }

    #[test]
    fn adopted_handle_uses_its_deleter() {
        let deleted = DropTally::new();
        let handle = NonNull::from(Box::leak(Box::new(123u32)));
        let owner = unsafe { Shared::from_raw_with(handle, counting_deleter(&deleted)) };
        let second = owner.clone();

        assert_eq!(*owner, 123);

        drop(owner);
        assert_eq!(deleted.count(), 0);

        drop(second);
        assert_eq!(deleted.count(), 1);
    }

    #[test]
    fn projection_keeps_the_whole_allocation_alive() {
        struct Record {
            x: i32,
            _probe: Probe,
        }

        let dropped = DropTally::new();
        let sp = Shared::new(Record {
            x: 10,
            _probe: Probe::new(&dropped),
        });

        let alias = Shared::project(sp.clone(), |record| &record.x);
        drop(sp);

        assert_eq!(Shared::ref_count(&alias), 1);
        assert_eq!(*alias, 10);
        assert_eq!(dropped.count(), 0);

        drop(alias);
        assert_eq!(dropped.count(), 1);
    }

    #[test]
    fn try_project_drops_the_owner_when_nothing_is_selected() {
        struct Slot {
            value: Option<i32>,
            _probe: Probe,
        }

        let dropped = DropTally::new();
        let empty = Shared::new(Slot {
            value: None,
            _probe: Probe::new(&dropped),
        });

        assert!(Shared::try_project(empty, |slot| slot.value.as_ref()).is_none());
        assert_eq!(dropped.count(), 1);

        let full = Shared::new(Slot {
            value: Some(9),
            _probe: Probe::new(&dropped),
        });

        let projected = Shared::try_project(full, |slot| slot.value.as_ref()).unwrap();
        assert_eq!(*projected, 9);
        assert_eq!(dropped.count(), 1);
    }

    #[test]
    fn get_mut_requires_a_unique_owner() {
        let mut owner = Shared::new(1);
        *Shared::get_mut(&mut owner).unwrap() = 2;

        let second = owner.clone();
        assert!(Shared::get_mut(&mut owner).is_none());
        drop(second);

        let observer = Shared::downgrade(&owner);
        assert!(Shared::get_mut(&mut owner).is_none());
        drop(observer);

        assert_eq!(*Shared::get_mut(&mut owner).unwrap(), 2);
    }

    #[test]
    fn trait_object_views_share_the_block() {
        use std::fmt::Display;

        let owner = Shared::new(42u32);
        let display: Shared<dyn Display> = Shared::project(owner.clone(), |n| n as &dyn Display);

        assert_eq!(display.to_string(), "42");
        assert_eq!(Shared::ref_count(&owner), 2);
    }

    #[cfg(feature = "atomic")]
    #[test]
    fn concurrent_clones_release_exactly_once() {
        use std::thread;

        let dropped = DropTally::new();
        let owner = Shared::new(Probe::new(&dropped));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let local = owner.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        drop(local.clone());
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        drop(owner);
        assert_eq!(dropped.count(), 1);
    }
}
