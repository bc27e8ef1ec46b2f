//! Property-based tests for block placement.
//!
//! Checks that splitting a byte range over stripe members always covers the
//! requested range exactly, in order, without overlap.

use glustervol_xattr::{pathinfo, BlockLocation, VolumeLayout};
use proptest::prelude::*;

/// Generator for member host lists: 1..6 members, each with 1..3 hosts.
fn any_members() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(
        proptest::collection::vec("[a-z]{1,8}", 1..3),
        1..6,
    )
}

fn assert_exact_cover(locs: &[BlockLocation], start: u64, len: u64) {
    let mut cursor = start;
    for loc in locs {
        assert_eq!(loc.offset, cursor, "entries must be contiguous");
        assert!(loc.length > 0, "entries must not be empty");
        cursor = loc.end();
    }
    assert_eq!(cursor, start + len, "entries must end at the range end");
}

proptest! {
    /// Test: striped placement covers [start, start+len) exactly.
    #[test]
    fn test_striped_cover_is_exact(
        members in any_members(),
        stripe in 1u64..1_000_000u64,
        start in 0u64..10_000_000u64,
        len in 1u64..2_000_000u64,
    ) {
        prop_assume!(len / stripe < 10_000);
        let layout = VolumeLayout::new(Some(stripe), members.clone());
        let locs = layout.locate(start, len).unwrap();
        assert_exact_cover(&locs, start, len);

        if members.len() > 1 {
            for loc in &locs {
                prop_assert!(loc.length <= stripe);
                let unit = loc.offset / stripe;
                prop_assert_eq!(unit, (loc.end() - 1) / stripe, "entry crosses a stripe boundary");
            }
        }
    }

    /// Test: unstriped placement is a single entry naming every host.
    #[test]
    fn test_unstriped_single_entry(
        hosts in proptest::collection::vec("[a-z]{1,8}", 1..8),
        start in 0u64..u32::MAX as u64,
        len in 1u64..u32::MAX as u64,
    ) {
        let layout = VolumeLayout::new(None, vec![hosts.clone()]);
        let locs = layout.locate(start, len).unwrap();
        prop_assert_eq!(locs.len(), 1);
        prop_assert_eq!(&locs[0], &BlockLocation::new(start, len, hosts));
    }

    /// Test: the parser never panics on arbitrary input.
    #[test]
    fn test_parse_never_panics(raw in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = pathinfo::parse(&raw);
    }

    /// Test: generated replicate trees report exactly their hosts.
    #[test]
    fn test_replicate_tree_hosts(hosts in proptest::collection::hash_set("[a-z]{1,8}", 1..6)) {
        let hosts: Vec<String> = hosts.into_iter().collect();
        let bricks: Vec<String> = hosts
            .iter()
            .map(|h| format!("<POSIX(/b):{}:/b/f>", h))
            .collect();
        let raw = format!("(<REPLICATE:r0> {})", bricks.join(" "));
        let tree = pathinfo::parse(raw.as_bytes()).unwrap();
        prop_assert_eq!(tree.hosts(), hosts);
    }
}
