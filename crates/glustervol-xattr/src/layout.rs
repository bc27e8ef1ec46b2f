//! Byte-range placement derived from a translator tree.

use crate::pathinfo::Translator;
use crate::source::BlockLocation;

/// Most entries a striped [`VolumeLayout::locate`] returns.
pub const MAX_LOCATE_ENTRIES: usize = 65536;

/// Where the bytes of one file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeLayout {
    stripe_size: Option<u64>,
    members: Vec<Vec<String>>,
}

impl VolumeLayout {
    /// Builds a layout from explicit parts.
    ///
    /// `members` lists the hosts of each stripe member; an unstriped file
    /// has exactly one member.
    pub fn new(stripe_size: Option<u64>, members: Vec<Vec<String>>) -> Self {
        let stripe_size = stripe_size.filter(|size| *size > 0);
        Self {
            stripe_size,
            members,
        }
    }

    /// Derives the layout of the file described by `tree`.
    ///
    /// The first stripe translator found depth-first decides the stripe
    /// size and the members; without one the whole file lives on every
    /// host of the tree.
    pub fn from_translator(tree: &Translator) -> Self {
        match tree.find_stripe() {
            Some((size, children)) => Self::new(
                Some(size),
                children.iter().map(Translator::hosts).collect(),
            ),
            None => Self::new(None, vec![tree.hosts()]),
        }
    }

    /// Stripe size, or 0 when the file is not striped.
    pub fn block_size(&self) -> u64 {
        self.stripe_size.unwrap_or(0)
    }

    /// Host lists of the stripe members.
    pub fn members(&self) -> &[Vec<String>] {
        &self.members
    }

    /// Splits `[start, start + len)` into host mappings.
    ///
    /// Unstriped files give one entry. Striped files give one entry per stripe
    /// unit, round-robin over the members, up to [`MAX_LOCATE_ENTRIES`]; past
    /// that the last entry covers the rest of the range and names every host.
    ///
    /// Returns `None` when the layout names no host at all.
    pub fn locate(&self, start: u64, len: u64) -> Option<Vec<BlockLocation>> {
        if self.members.iter().all(|hosts| hosts.is_empty()) {
            return None;
        }
        if len == 0 {
            return Some(Vec::new());
        }

        let end = start.saturating_add(len);
        let stripe = match self.stripe_size {
            Some(size) if self.members.len() > 1 => size,
            _ => {
                let hosts = self.members.iter().flatten().cloned().collect();
                return Some(vec![BlockLocation::new(start, end - start, hosts)]);
            }
        };

        let count = self.members.len() as u64;
        let mut locations = Vec::new();
        let mut offset = start;
        while offset < end {
            if locations.len() + 1 == MAX_LOCATE_ENTRIES {
                let hosts = self.members.iter().flatten().cloned().collect();
                locations.push(BlockLocation::new(offset, end - offset, hosts));
                break;
            }
            let unit = offset / stripe;
            let unit_end = unit.saturating_add(1).saturating_mul(stripe).min(end);
            let hosts = self.members[(unit % count) as usize].clone();
            locations.push(BlockLocation::new(offset, unit_end - offset, hosts));
            offset = unit_end;
        }
        Some(locations)
    }
}
