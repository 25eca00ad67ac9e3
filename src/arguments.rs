//! Argument views over the shared evaluation stack.
//!
//! A view covers `[this, arg_0, .., arg_{n-1}]`. The scoped form reserves
//! its region from the stack and releases it on drop; reservation and
//! release are strictly nested, so the stack behaves as a LIFO resource.
//! The borrowed form wraps a region the caller already prepared.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, ErrorKind};
use crate::types::JsValue;

pub(crate) const DEFAULT_STACK_LIMIT: usize = 16 * 1024;

#[derive(Clone)]
pub struct EvalStack {
    slots: Rc<RefCell<Vec<JsValue>>>,
    limit: usize,
}

impl EvalStack {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_STACK_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
            limit,
        }
    }

    pub fn depth(&self) -> usize {
        self.slots.borrow().len()
    }

    fn reserve(&self, n: usize) -> Option<usize> {
        let mut slots = self.slots.borrow_mut();
        if slots.len() + n > self.limit {
            return None;
        }
        let base = slots.len();
        slots.resize(base + n, JsValue::Undefined);
        Some(base)
    }

    fn release(&self, base: usize, n: usize) {
        let mut slots = self.slots.borrow_mut();
        // Scoped views drop in reverse acquisition order.
        debug_assert_eq!(slots.len(), base + n);
        slots.truncate(base);
    }
}

impl Default for EvalStack {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Arguments {
    stack: EvalStack,
    base: usize,
    count: usize,
    constructor_call: bool,
    owned: bool,
    alive: bool,
}

impl Arguments {
    /// Reserves `n + 1` stack slots for the view. On stack exhaustion the
    /// sink gets a Range error and the view is inert: it owns no storage
    /// and every read answers undefined.
    pub fn scoped(stack: &EvalStack, n: usize, e: &mut Error) -> Arguments {
        match stack.reserve(n + 1) {
            Some(base) => Arguments {
                stack: stack.clone(),
                base,
                count: n,
                constructor_call: false,
                owned: true,
                alive: true,
            },
            None => {
                e.report(ErrorKind::Range, "maximum call stack size exceeded");
                Arguments {
                    stack: stack.clone(),
                    base: 0,
                    count: 0,
                    constructor_call: false,
                    owned: false,
                    alive: false,
                }
            }
        }
    }

    /// Wraps `count + 1` already-populated slots starting at `base` (the
    /// this binding). No reservation, no release.
    pub fn borrowed(stack: &EvalStack, base: usize, count: usize) -> Arguments {
        debug_assert!(base + count + 1 <= stack.depth());
        Arguments {
            stack: stack.clone(),
            base,
            count,
            constructor_call: false,
            owned: false,
            alive: true,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_inert(&self) -> bool {
        !self.alive
    }

    pub fn this_binding(&self) -> JsValue {
        if !self.alive {
            return JsValue::Undefined;
        }
        self.stack.slots.borrow()[self.base].clone()
    }

    pub fn set_this_binding(&self, value: JsValue) {
        if !self.alive {
            return;
        }
        self.stack.slots.borrow_mut()[self.base] = value;
    }

    pub fn arg(&self, n: usize) -> JsValue {
        assert!(n < self.count);
        self.stack.slots.borrow()[self.base + 1 + n].clone()
    }

    pub fn set_arg(&self, n: usize, value: JsValue) {
        assert!(n < self.count);
        self.stack.slots.borrow_mut()[self.base + 1 + n] = value;
    }

    /// Bounds-tolerant read: out of range yields the undefined sentinel.
    pub fn at(&self, n: usize) -> JsValue {
        if n < self.count {
            self.arg(n)
        } else {
            JsValue::Undefined
        }
    }

    pub fn to_vec(&self) -> Vec<JsValue> {
        (0..self.count).map(|n| self.arg(n)).collect()
    }

    pub fn set_constructor_call(&mut self, value: bool) {
        self.constructor_call = value;
    }

    pub fn is_constructor_call(&self) -> bool {
        self.constructor_call
    }
}

impl Drop for Arguments {
    fn drop(&mut self) {
        if self.owned && self.alive {
            self.stack.release(self.base, self.count + 1);
        }
    }
}
