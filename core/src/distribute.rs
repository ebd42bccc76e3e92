use crate::Page;

/// A contiguous run of pages handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub id: usize,
    pub pages: &'a [Page],
}

/// `max(1, total / workers)`. With a remainder this yields more than
/// `workers` batches; callers rely on that exact count.
pub fn batch_size(total: usize, workers: usize) -> usize {
    (total / workers.max(1)).max(1)
}

/// Split `pages` into consecutive batches of [`batch_size`] pages (the last
/// one may be shorter). No pages, no batches.
pub fn distribute(pages: &[Page], workers: usize) -> Vec<Batch<'_>> {
    let size = batch_size(pages.len(), workers);
    pages
        .chunks(size)
        .enumerate()
        .map(|(id, pages)| Batch { id, pages })
        .collect()
}
