//! Epoch stamps that let a query report each body at most once.

/// One stamp per body, compared against a per-query epoch.
#[derive(Clone, Debug, Default)]
pub struct SeenTracker {
    stamps: Vec<u32>,
    epoch: u32,
}

impl SeenTracker {
    /// Size the stamps for `len` bodies and forget every earlier query.
    pub fn reset(&mut self, len: usize) {
        self.stamps.clear();
        self.stamps.resize(len, 0);
        self.epoch = 0;
    }

    /// Start a new query. Stamps are zeroed only when the epoch wraps, so a
    /// stamp left over from 2^32 queries ago can never match.
    pub fn begin(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.stamps.fill(0);
            self.epoch = 1;
        }
    }

    /// True the first time `seq` is offered during the current query.
    #[inline]
    pub fn first_visit(&mut self, seq: u32) -> bool {
        let i = seq as usize;
        if i >= self.stamps.len() {
            // Only reachable when bodies were added after `finish`
            self.stamps.resize(i + 1, 0);
        }
        let stamp = &mut self.stamps[i];
        if *stamp == self.epoch {
            return false;
        }
        *stamp = self.epoch;
        true
    }
}
