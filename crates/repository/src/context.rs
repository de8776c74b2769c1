//! Repository context: the nested dynamic scope deciding which repository an
//! operation without an explicit repository resolves against.
//!
//! # Invariants
//! - The stack always holds the base `default` entry; it is never popped.
//! - Scopes nest strictly LIFO. Releasing a scope restores the entry that was
//!   on top when it was entered.
//! - Each thread owns an independent stack. [`ScopeGuard`] is `!Send`, so a
//!   scope is always released on the thread that entered it.
//! - Release happens in `Drop`, so panics and early returns still pop.

use std::cell::RefCell;
use std::marker::PhantomData;

use recordkeep_core::RepositoryName;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    id: u64,
    name: RepositoryName,
}

/// Explicit repository scope stack.
///
/// The thread-local context wraps one of these; it can also be owned and
/// passed around directly when a flow wants its own execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStack {
    entries: Vec<Entry>,
    next_id: u64,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            entries: vec![Entry {
                id: 0,
                name: RepositoryName::default_name(),
            }],
            next_id: 1,
        }
    }

    /// Push a scope. Returns a token identifying exactly this entry.
    pub fn push(&mut self, name: RepositoryName) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry { id, name });
        id
    }

    /// Pop the entry identified by `token`, plus anything still stacked above it.
    ///
    /// Returns `false` if the entry was already released (an outer scope was
    /// released first). The base entry is never popped.
    pub fn release(&mut self, token: u64) -> bool {
        match self.entries.iter().rposition(|e| e.id == token) {
            Some(0) | None => false,
            Some(pos) => {
                if pos + 1 != self.entries.len() {
                    warn!(
                        leaked = self.entries.len() - pos - 1,
                        "repository scope released out of order; dropping inner scopes"
                    );
                }
                self.entries.truncate(pos);
                true
            }
        }
    }

    /// Top of the stack.
    pub fn current(&self) -> &RepositoryName {
        // The base entry is never removed.
        &self.entries[self.entries.len() - 1].name
    }

    pub fn is_at_base(&self) -> bool {
        self.entries.len() == 1
    }

    /// Number of entries, base included.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Repository for an operation with no explicit repository argument.
    ///
    /// At base, the entity kind's own default wins; any entered scope
    /// outranks it.
    pub fn resolve(&self, kind_default: &RepositoryName) -> RepositoryName {
        if self.is_at_base() {
            kind_default.clone()
        } else {
            self.current().clone()
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CONTEXT: RefCell<ScopeStack> = RefCell::new(ScopeStack::new());
}

/// Handle for an entered scope. Dropping it releases the scope.
#[must_use = "the scope is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    token: u64,
    name: RepositoryName,
    _not_send: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub fn name(&self) -> &RepositoryName {
        &self.name
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown.
        let _ = CONTEXT.try_with(|ctx| {
            if ctx.borrow_mut().release(self.token) {
                trace!(repository = %self.name, "repository scope exited");
            }
        });
    }
}

/// Enter a repository scope on the current thread.
pub fn enter(name: impl Into<RepositoryName>) -> ScopeGuard {
    let name = name.into();
    let token = CONTEXT.with(|ctx| ctx.borrow_mut().push(name.clone()));
    trace!(repository = %name, "repository scope entered");
    ScopeGuard {
        token,
        name,
        _not_send: PhantomData,
    }
}

/// Run `body` inside a repository scope.
pub fn scope<T>(name: impl Into<RepositoryName>, body: impl FnOnce() -> T) -> T {
    let _guard = enter(name);
    body()
}

/// Top of the current thread's stack.
pub fn current() -> RepositoryName {
    CONTEXT.with(|ctx| ctx.borrow().current().clone())
}

pub fn is_at_base() -> bool {
    CONTEXT.with(|ctx| ctx.borrow().is_at_base())
}

pub fn depth() -> usize {
    CONTEXT.with(|ctx| ctx.borrow().depth())
}

/// Resolve against the current thread's stack. See [`ScopeStack::resolve`].
pub fn resolve(kind_default: &RepositoryName) -> RepositoryName {
    CONTEXT.with(|ctx| ctx.borrow().resolve(kind_default))
}
