use std::collections::VecDeque;

use crate::collection::domain::collection_error::CollectionError;
use crate::collection::domain::face_collection_service::ServiceError;
use crate::collection::domain::face_record::Page;

/// Fetches one page given the cursor from the previous page (`None` for the first).
pub type PageFetcher<'a, T> = Box<dyn FnMut(Option<&str>) -> Result<Page<T>, ServiceError> + 'a>;

/// Lazy sequence over a cursor-paginated listing.
///
/// Nothing is requested until the first `next()`. A new page is fetched only
/// once the buffered items are exhausted and the last page carried a cursor;
/// a page without a cursor ends the sequence. A failed fetch is yielded once,
/// after which the iterator is finished.
pub struct PageIter<'a, T> {
    fetch: PageFetcher<'a, T>,
    buffer: VecDeque<T>,
    next_token: Option<String>,
    pages_fetched: usize,
    max_pages: Option<usize>,
    finished: bool,
}

impl<'a, T> PageIter<'a, T> {
    pub fn new(fetch: PageFetcher<'a, T>) -> Self {
        Self {
            fetch,
            buffer: VecDeque::new(),
            next_token: None,
            pages_fetched: 0,
            max_pages: None,
            finished: false,
        }
    }

    /// Stops with [`CollectionError::PageLimitExceeded`] if the service still
    /// returns a cursor after `limit` pages. Without a cap, a service that
    /// never stops returning cursors is followed indefinitely.
    pub fn with_max_pages(mut self, limit: Option<usize>) -> Self {
        self.max_pages = limit;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_next(&mut self) -> Result<(), CollectionError> {
        if let Some(limit) = self.max_pages {
            if self.pages_fetched >= limit {
                return Err(CollectionError::PageLimitExceeded { limit });
            }
        }
        let token = self.next_token.take();
        let page = (self.fetch)(token.as_deref())?;
        self.pages_fetched += 1;
        log::debug!(
            "Fetched page {} ({} items, more: {})",
            self.pages_fetched,
            page.items.len(),
            page.next_token.is_some()
        );
        self.buffer.extend(page.items);
        self.next_token = page.next_token;
        Ok(())
    }
}

impl<T> Iterator for PageIter<'_, T> {
    type Item = Result<T, CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if self.pages_fetched > 0 && self.next_token.is_none() {
                self.finished = true;
                return None;
            }
            if let Err(e) = self.fetch_next() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
