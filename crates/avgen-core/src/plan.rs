//! Byte-range planning for chunked downloads.

/// A contiguous byte range `[start, end)` fetched by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// curl range spec with inclusive end: `start-(end-1)`.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end.saturating_sub(1))
    }
}

/// How one download is split. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Total size in bytes; 0 means unknown.
    pub total_size: u64,
    pub chunks: Vec<ChunkRange>,
}

impl DownloadPlan {
    /// Plan for `total_size` bytes across `workers` chunks. Unknown size
    /// (0) yields no chunks, i.e. a sequential download.
    pub fn new(total_size: u64, workers: usize) -> Self {
        Self {
            total_size,
            chunks: plan_chunks(total_size, workers),
        }
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_sequential(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Splits `[0, total_size)` into `min(chunk_count, total_size)` contiguous
/// ranges of width `total_size / n`; the last range absorbs the remainder.
/// Returns an empty vec if `total_size` is 0 or `chunk_count` is 0.
pub fn plan_chunks(total_size: u64, chunk_count: usize) -> Vec<ChunkRange> {
    if total_size == 0 || chunk_count == 0 {
        return Vec::new();
    }

    let n = (chunk_count as u64).min(total_size);
    let width = total_size / n;

    (0..n)
        .map(|i| {
            let start = i * width;
            let end = if i == n - 1 { total_size } else { start + width };
            ChunkRange { start, end }
        })
        .collect()
}
