//! A buffered cursor over any iterator, with nested rewindable markers.
//!
//! The parser opens a marker before attempting an ambiguous production.
//! Every value consumed while the marker is open is recorded; popping the
//! marker with `reset = true` pushes the recorded values back onto the front
//! of the buffer, so the source appears never to have been read. Popping with
//! `reset = false` commits: the recording is merged into the enclosing marker
//! (so an outer rewind still restores it) or dropped when no marker remains.

use std::collections::VecDeque;

/// One open speculative region.
#[derive(Debug)]
struct Marker<T> {
    consumed: Vec<T>,
    last: Option<T>,
}

/// Buffered cursor with arbitrary look-ahead and nested backtracking.
#[derive(Debug)]
pub struct LookAheadBuffer<I: Iterator> {
    source: I,
    look_ahead: VecDeque<I::Item>,
    markers: Vec<Marker<I::Item>>,
    default: I::Item,
    last: Option<I::Item>,
}

impl<I> LookAheadBuffer<I>
where
    I: Iterator,
    I::Item: Clone,
{
    /// Wrap `source`. `default` is returned by [`look`](Self::look) past the
    /// end of input.
    pub fn new(source: I, default: I::Item) -> Self {
        Self {
            source,
            look_ahead: VecDeque::new(),
            markers: Vec::new(),
            default,
            last: None,
        }
    }

    /// Peek `k` values ahead without consuming anything.
    pub fn look(&mut self, k: usize) -> &I::Item {
        while self.look_ahead.len() <= k {
            match self.source.next() {
                Some(value) => self.look_ahead.push_back(value),
                None => return &self.default,
            }
        }
        &self.look_ahead[k]
    }

    /// The most recently consumed value, if any.
    #[inline]
    pub fn last_consumed(&self) -> Option<&I::Item> {
        self.last.as_ref()
    }

    /// The value reported past the end of input.
    #[inline]
    pub fn default_value(&self) -> &I::Item {
        &self.default
    }

    /// Number of currently open markers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.markers.len()
    }

    /// Begin recording consumed values.
    pub fn push_marker(&mut self) {
        self.markers.push(Marker {
            consumed: Vec::new(),
            last: self.last.clone(),
        });
    }

    /// Close the innermost marker, rewinding when `reset` is true.
    ///
    /// Popping with no open marker is a no-op.
    pub fn pop_marker(&mut self, reset: bool) {
        let Some(marker) = self.markers.pop() else {
            return;
        };
        if reset {
            for value in marker.consumed.into_iter().rev() {
                self.look_ahead.push_front(value);
            }
            self.last = marker.last;
        } else if let Some(outer) = self.markers.last_mut() {
            outer.consumed.extend(marker.consumed);
        }
    }

    /// Run `f` inside a marker: an `Ok` result commits, an `Err` rewinds.
    pub fn speculate<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        self.push_marker();
        let result = f(self);
        self.pop_marker(result.is_err());
        if result.is_err() {
            tracing::trace!(depth = self.markers.len(), "speculation rewound");
        }
        result
    }
}

impl<I> Iterator for LookAheadBuffer<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let value = match self.look_ahead.pop_front() {
            Some(value) => value,
            None => self.source.next()?,
        };
        if let Some(marker) = self.markers.last_mut() {
            marker.consumed.push(value.clone());
        }
        self.last = Some(value.clone());
        Some(value)
    }
}
