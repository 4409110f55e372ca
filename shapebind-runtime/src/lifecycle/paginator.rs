//! Lazy token-driven pagination.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::errors::{Result, RuntimeError};

/// One page of results and the token for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Iterator over the items of every page.
///
/// Pages are fetched on demand. Iteration ends after a page without a token,
/// fails when a page repeats the token it was requested with, and yields
/// nothing more after an error.
pub struct Paginator<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    operation: String,
    fetch: F,
    buffered: VecDeque<T>,
    token: Option<String>,
    pages: usize,
    exhausted: bool,
}

impl<T, F> Paginator<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    pub fn new(operation: impl Into<String>, fetch: F) -> Self {
        Self {
            operation: operation.into(),
            fetch,
            buffered: VecDeque::new(),
            token: None,
            pages: 0,
            exhausted: false,
        }
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = (self.fetch)(self.token.as_deref())?;
        self.pages += 1;

        if let (Some(previous), Some(next)) = (&self.token, &page.next_token) {
            if previous == next {
                return Err(RuntimeError::Pagination {
                    operation: self.operation.clone(),
                    token: next.clone(),
                });
            }
        }
        log::trace!(
            "{} page {}: {} items, more: {}",
            self.operation,
            self.pages,
            page.items.len(),
            page.next_token.is_some()
        );

        self.buffered.extend(page.items);
        self.token = page.next_token;
        if self.token.is_none() {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<T, F> Iterator for Paginator<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }
            if let Err(error) = self.fetch_page() {
                self.exhausted = true;
                self.buffered.clear();
                return Some(Err(error));
            }
        }
    }
}

impl<T, F> FusedIterator for Paginator<T, F> where F: FnMut(Option<&str>) -> Result<Page<T>> {}
