//! In-order admission of posts to the resolve stage.

use std::collections::BTreeSet;
use std::sync::Mutex;

use tokio::sync::watch;

/// Lets concurrent posts resolve strictly in input order.
///
/// Every post holds a [`Turn`] from the moment it starts. A post may resolve
/// once every earlier turn has been released, so a stop raised while a turn
/// is held is seen by all later posts before they contact any host.
#[derive(Debug)]
pub struct DispatchOrder {
    next: watch::Sender<usize>,
    released: Mutex<BTreeSet<usize>>,
}

impl DispatchOrder {
    pub fn new() -> Self {
        let (next, _) = watch::channel(0);
        Self {
            next,
            released: Mutex::new(BTreeSet::new()),
        }
    }

    /// Claim the turn of the post at 0-based `index`.
    pub fn turn(&self, index: usize) -> Turn<'_> {
        Turn { order: self, index }
    }

    fn release(&self, index: usize) {
        let mut released = self.released.lock().unwrap_or_else(|p| p.into_inner());
        released.insert(index);
        self.next.send_modify(|next| {
            while released.remove(next) {
                *next += 1;
            }
        });
    }
}

impl Default for DispatchOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// A post's place in the dispatch order; released on drop.
#[derive(Debug)]
pub struct Turn<'a> {
    order: &'a DispatchOrder,
    index: usize,
}

impl Turn<'_> {
    /// Wait until every earlier turn has been released.
    pub async fn ready(&self) {
        let mut next = self.order.next.subscribe();
        // The sender lives in `order`, which outlives this turn.
        let _ = next.wait_for(|n| *n >= self.index).await;
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        self.order.release(self.index);
    }
}
