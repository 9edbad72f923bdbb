//! Named-operation dispatch table shared by the controller and every
//! worker.
//!
//! The table is built by the controlling task before the pool exists and
//! is frozen into an `Arc` at pool creation, so all workers hold an
//! identical copy. Nothing address-space-dependent ever crosses the
//! channel: a record carries a dense opcode into this table plus one
//! opaque argument word, and operations capture whatever shared state
//! they need at registration time.

use core::future::Future;
use futures::{FutureExt, future::BoxFuture};

/// Handle returned by [`TaskRegistry::register`], used to submit work.
///
/// Opcodes are dense indices assigned in registration order and are only
/// meaningful against the registry they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpCode(u32);

impl OpCode {
    /// The raw wire value of this opcode.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

type TaskFn = dyn Fn(u64) -> BoxFuture<'static, ()> + Send + Sync;

pub(crate) struct Operation {
    pub(crate) name: &'static str,
    pub(crate) task: Box<TaskFn>,
}

/// Dispatch table mapping opcodes to registered operations.
#[derive(Default)]
pub struct TaskRegistry {
    ops: Vec<Operation>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named operation and returns the opcode that dispatches
    /// to it.
    ///
    /// The operation runs inline on whichever worker consumes the record:
    /// it receives the submitted argument word and returns nothing.
    /// Execution is fire and forget; there is no acknowledgment path back
    /// to the controller.
    pub fn register<F, Fut>(&mut self, name: &'static str, task: F) -> OpCode
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let code = OpCode(self.ops.len() as u32);
        self.ops.push(Operation {
            name,
            task: Box::new(move |arg| task(arg).boxed()),
        });
        code
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no operations have been registered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Looks up an operation by its raw wire opcode.
    pub(crate) fn get(&self, op: u32) -> Option<&Operation> {
        self.ops.get(op as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn opcodes_are_assigned_in_registration_order() {
        let mut registry = TaskRegistry::new();
        let first = registry.register("first", |_| async {});
        let second = registry.register("second", |_| async {});

        assert_eq!(first.raw(), 0);
        assert_eq!(second.raw(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).map(|op| op.name), Some("first"));
        assert_eq!(registry.get(1).map(|op| op.name), Some("second"));
    }

    #[test]
    fn unknown_opcodes_resolve_to_none() {
        let registry = TaskRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(7).is_none());
    }

    #[tokio::test]
    async fn registered_operations_receive_the_argument_word() {
        let seen = Arc::new(AtomicU64::new(0));
        let mut registry = TaskRegistry::new();
        let op = {
            let seen = Arc::clone(&seen);
            registry.register("store", move |arg| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.store(arg, Ordering::SeqCst);
                }
            })
        };

        match registry.get(op.raw()) {
            Some(entry) => (entry.task)(42).await,
            None => panic!("opcode not found"),
        }
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }
}
