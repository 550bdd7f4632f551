//! Interceptors wrapping every adapter call.
//!
//! A chain `[f1, f2, f3]` around a terminal call runs as `f1(f2(f3(terminal)))`: the first
//! registered filter sees the invocation first and the result last. Each filter gets the
//! owned [`Invocation`] and a [`Next`] handle for the rest of the chain, so it can pass the
//! call through, rewrite it, short-circuit, post-process the result, or run `next` again.

use crate::error::FileSystemError;
use crate::invocation::{Invocation, Outcome};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Signature shared by filters and the terminal call.
pub type FilterResult = Result<Outcome, FileSystemError>;

type Handler = dyn for<'a> Fn(Invocation, Next<'a>) -> FilterResult + Send + Sync;

/// A named interceptor. Cloning shares the handler.
#[derive(Clone)]
pub struct Filter {
    name: Cow<'static, str>,
    handler: Arc<Handler>,
}

impl Filter {
    /// # Example
    ///
    /// ```rust
    /// use depot::{Filter, Invocation};
    ///
    /// let upper = Filter::new("upper", |mut invocation: Invocation, next| {
    ///     invocation.params.filename = invocation.params.filename.to_uppercase();
    ///     next.run(invocation)
    /// });
    /// assert_eq!(upper.name(), "upper");
    /// ```
    pub fn new<F>(name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: for<'a> Fn(Invocation, Next<'a>) -> FilterResult + Send + Sync + 'static,
    {
        Self { name: name.into(), handler: Arc::new(handler) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for clones of the same filter; two filters built separately never match,
    /// even with the same name.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The remainder of a chain, as seen from inside one filter.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    filters: &'a [Filter],
    terminal: &'a (dyn Fn(Invocation) -> FilterResult + Sync),
}

impl Next<'_> {
    /// Runs the rest of the chain (eventually the terminal call) with `invocation`.
    ///
    /// # Errors
    /// Whatever the remaining filters or the terminal call return.
    pub fn run(self, invocation: Invocation) -> FilterResult {
        match self.filters.split_first() {
            Some((filter, rest)) => {
                (filter.handler)(invocation, Next { filters: rest, terminal: self.terminal })
            },
            None => (self.terminal)(invocation),
        }
    }

    /// Number of filters still ahead of the terminal call.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.filters.len()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.filters.iter().map(Filter::name).collect();
        f.debug_struct("Next").field("filters", &names).finish_non_exhaustive()
    }
}

/// Runs `invocation` through `filters` around `terminal`.
///
/// # Errors
/// Whatever the chain returns.
pub fn execute(
    filters: &[Filter],
    invocation: Invocation,
    terminal: &(dyn Fn(Invocation) -> FilterResult + Sync),
) -> FilterResult {
    Next { filters, terminal }.run(invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::Operation;
    use parking_lot::Mutex;

    fn echo(invocation: Invocation) -> FilterResult {
        Ok(Outcome::Content(invocation.params.filename.into_bytes()))
    }

    fn content(result: FilterResult) -> String {
        match result {
            Ok(Outcome::Content(bytes)) => String::from_utf8(bytes).unwrap(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_chain_calls_terminal() {
        assert_eq!(content(execute(&[], Invocation::read("plain"), &echo)), "plain");
    }

    #[test]
    fn first_filter_is_outermost() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let marker = |tag: &'static str| {
            let trace = Arc::clone(&trace);
            Filter::new(tag, move |mut inv: Invocation, next: Next<'_>| {
                trace.lock().push(format!("{tag}>"));
                inv.params.filename.push_str(tag);
                let result = next.run(inv);
                trace.lock().push(format!("<{tag}"));
                result
            })
        };

        let chain = [marker("A"), marker("B"), marker("C")];
        let out = content(execute(&chain, Invocation::read("f"), &echo));

        assert_eq!(out, "fABC");
        assert_eq!(*trace.lock(), ["A>", "B>", "C>", "<C", "<B", "<A"]);
    }

    #[test]
    fn short_circuit_skips_the_rest() {
        let calls = Arc::new(Mutex::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            move |inv: Invocation| {
                *calls.lock() += 1;
                echo(inv)
            }
        };
        let deny = Filter::new("deny", |_inv: Invocation, _next: Next<'_>| {
            Err(FileSystemError::Rejected { message: "no".into(), context: None })
        });

        let result = execute(&[deny], Invocation::new(Operation::Delete, Default::default()), &counted);

        assert!(matches!(result, Err(FileSystemError::Rejected { .. })));
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn next_can_run_twice() {
        let twice = Filter::new("twice", |inv: Invocation, next: Next<'_>| {
            assert_eq!(next.remaining(), 0);
            let _ = next.run(inv.clone())?;
            next.run(inv)
        });
        let calls = Arc::new(Mutex::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            move |inv: Invocation| {
                *calls.lock() += 1;
                echo(inv)
            }
        };

        execute(&[twice], Invocation::read("x"), &counted).unwrap();
        assert_eq!(*calls.lock(), 2);
    }

    #[test]
    fn equality_is_identity() {
        let a = Filter::new("same", |inv: Invocation, next: Next<'_>| next.run(inv));
        let b = Filter::new("same", |inv: Invocation, next: Next<'_>| next.run(inv));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(format!("{a:?}"), r#"Filter { name: "same", .. }"#);
    }
}
