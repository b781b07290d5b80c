//! Per-instance memo for the deployment context document.

use std::{cell::RefCell, future::Future, rc::Rc};

use serde_json::{json, Value};

use crate::error::StackError;

#[derive(Debug, Clone, Default, PartialEq)]
/// Memo contents.
pub enum MemoState {
    /// Nothing fetched yet.
    #[default]
    Empty,
    /// A context document (possibly `{}` when the stack has none).
    Populated(Value),
}

#[derive(Debug, Clone, Default)]
/// Caches the first successful context lookup for the lifetime of a stack instance.
///
/// A 404 populates the memo with an empty object so instances without a context document stop
/// asking. Any other failure leaves the memo empty and the next call retries.
pub struct ContextMemo {
    cell: Rc<RefCell<MemoState>>,
}

impl ContextMemo {
    /// Current memo contents.
    pub fn state(&self) -> MemoState {
        self.cell.borrow().clone()
    }

    /// Memoized document, if any.
    pub fn cached(&self) -> Option<Value> {
        match &*self.cell.borrow() {
            MemoState::Empty => None,
            MemoState::Populated(value) => Some(value.clone()),
        }
    }

    /// Returns the memoized document or runs `fetch` to populate it.
    ///
    /// # Errors
    ///
    /// Propagates every `fetch` error except [`StackError::NotFound`].
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Value, StackError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, StackError>>,
    {
        if let Some(value) = self.cached() {
            return Ok(value);
        }
        let value = match fetch().await {
            Ok(value) => value,
            Err(StackError::NotFound) => json!({}),
            Err(err) => return Err(err),
        };
        *self.cell.borrow_mut() = MemoState::Populated(value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn second_lookup_is_served_from_memo() {
        let memo = ContextMemo::default();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            async { Ok(json!({"attributes": {"manager_url": "https://manager.example"}})) }
        };

        let first = block_on(memo.get_or_fetch(fetch)).expect("first lookup");
        let second = block_on(memo.get_or_fetch(fetch)).expect("second lookup");

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn not_found_memoizes_an_empty_object() {
        let memo = ContextMemo::default();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            async { Err(StackError::NotFound) }
        };

        assert_eq!(block_on(memo.get_or_fetch(fetch)), Ok(json!({})));
        assert_eq!(block_on(memo.get_or_fetch(fetch)), Ok(json!({})));
        assert_eq!(calls.get(), 1);
        assert_eq!(memo.state(), MemoState::Populated(json!({})));
    }

    #[test]
    fn other_failures_leave_the_memo_empty() {
        let memo = ContextMemo::default();
        let err = block_on(memo.get_or_fetch(|| async { Err(StackError::ServerError) }))
            .expect_err("server error");
        assert_eq!(err, StackError::ServerError);
        assert_eq!(memo.state(), MemoState::Empty);

        let value = block_on(memo.get_or_fetch(|| async { Ok(json!({"id": "ctx"})) }))
            .expect("retry");
        assert_eq!(value, json!({"id": "ctx"}));
        assert_eq!(memo.cached(), Some(json!({"id": "ctx"})));
    }

    #[test]
    fn clones_share_the_memo() {
        let memo = ContextMemo::default();
        let clone = memo.clone();
        block_on(memo.get_or_fetch(|| async { Ok(json!(1)) })).expect("populate");
        assert_eq!(clone.cached(), Some(json!(1)));
    }
}
