//! Insertion buffer and its counting-sort compaction into a bucket table.

/// One (body, cell) record. A body touching several cells owns several.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    /// Insertion index of the body; doubles as its dedup key.
    pub seq: u32,
    /// Hashed bucket of the cell.
    pub bucket: u32,
    pub x: i32,
    pub y: i32,
}

/// Entries grouped by bucket so that each bucket is one contiguous slice.
#[derive(Clone, Debug)]
pub struct BucketTable {
    added: Vec<Entry>,
    sorted: Vec<Entry>,
    // offsets[b]..offsets[b + 1] is bucket b inside `sorted`.
    offsets: Vec<u32>,
    cursor: Vec<u32>,
}

impl BucketTable {
    pub fn new(bucket_count: usize) -> Self {
        Self {
            added: Vec::new(),
            sorted: Vec::new(),
            offsets: vec![0; bucket_count + 1],
            cursor: Vec::with_capacity(bucket_count),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Forget all entries; every bucket reads as empty until the next `finish`.
    pub fn clear(&mut self) {
        self.added.clear();
        self.sorted.clear();
        self.offsets.fill(0);
    }

    #[inline]
    pub fn push(&mut self, entry: Entry) {
        debug_assert!((entry.bucket as usize) < self.bucket_count());
        self.added.push(entry);
    }

    /// Counting sort of the pushed entries by bucket. Linear in entries plus
    /// buckets; rebuilding from the same input gives the same table.
    pub fn finish(&mut self) {
        // Histogram, shifted by one so the prefix sum lands on bucket starts
        self.offsets.fill(0);
        for e in &self.added {
            self.offsets[e.bucket as usize + 1] += 1;
        }
        for b in 1..self.offsets.len() {
            self.offsets[b] += self.offsets[b - 1];
        }

        // Scatter, keeping insertion order inside each bucket
        let buckets = self.bucket_count();
        self.cursor.clear();
        self.cursor.extend_from_slice(&self.offsets[..buckets]);
        self.sorted.clear();
        self.sorted.resize(self.added.len(), Entry::default());
        for e in &self.added {
            let slot = &mut self.cursor[e.bucket as usize];
            self.sorted[*slot as usize] = *e;
            *slot += 1;
        }
    }

    /// Entries of bucket `b` as of the last `finish`.
    #[inline]
    pub fn bucket(&self, b: u32) -> &[Entry] {
        let b = b as usize;
        &self.sorted[self.offsets[b] as usize..self.offsets[b + 1] as usize]
    }

    /// Every finished entry, ordered by bucket.
    pub fn sorted(&self) -> &[Entry] {
        &self.sorted
    }

    pub fn occupied_buckets(&self) -> usize {
        self.offsets.windows(2).filter(|w| w[1] > w[0]).count()
    }

    pub fn max_bucket_len(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .max()
            .unwrap_or(0)
    }
}
