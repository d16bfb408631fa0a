//! Trade state containers — app-owned, SDK-provided update logic.

use super::Trade;
use std::collections::VecDeque;

/// Default buffer capacity, matching the feed's snapshot size.
pub const DEFAULT_CAPACITY: usize = 200;

/// Rolling buffer of the most recent trades, newest-first by arrival.
///
/// The app owns instances of this type. The SDK provides update methods.
/// Records are never mutated in place — only prepended (incremental push)
/// or replaced wholesale (snapshot).
#[derive(Debug, Clone)]
pub struct TradeHistory {
    trades: VecDeque<Trade>,
    max_size: usize,
}

impl TradeHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            trades: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Prepend a new trade, evicting the oldest if at capacity.
    pub fn prepend(&mut self, trade: Trade) {
        if self.trades.len() >= self.max_size {
            self.trades.pop_back();
        }
        self.trades.push_front(trade);
    }

    /// Replace all trades (snapshot or REST fetch), truncated to capacity.
    /// The input is newest-first; order is preserved.
    pub fn replace(&mut self, trades: Vec<Trade>) {
        self.trades.clear();
        for trade in trades.into_iter().take(self.max_size) {
            self.trades.push_back(trade);
        }
    }

    pub fn trades(&self) -> &VecDeque<Trade> {
        &self.trades
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.trades.front()
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

impl Default for TradeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
