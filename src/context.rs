// Copyright (C) 2013-2020 Blocstack PBC, a public benefit corporation
// Copyright (C) 2020 Stacks Open Internet Foundation
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::rc::Rc;

use im::HashMap as PersistentMap;

use crate::expr::{Expr, Header};
use crate::function::FunctionDescriptor;

/// `(valueExpr, captured, resolved)` — spec.md §3. `captured` is the
/// environment in force at the point the binding was installed; it is what
/// makes `Ref` resolution a closure rather than dynamic scoping.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value_expr: Expr,
    pub captured: Context,
    pub resolved: bool,
}

/// The environment: an immutable-style triple of lexical bindings, the
/// function registry, and the accumulated cost. Cloning a `Context` is cheap
/// — `lets`/`funcs` are backed by `im::HashMap`, so a clone shares structure
/// with its parent until one side diverges.
#[derive(Debug, Clone)]
pub struct Context {
    lets: PersistentMap<String, Binding>,
    funcs: PersistentMap<Header, Rc<FunctionDescriptor>>,
    cost: u64,
}

impl Context {
    pub fn new() -> Context {
        Context {
            lets: PersistentMap::new(),
            funcs: PersistentMap::new(),
            cost: 0,
        }
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn lookup_let(&self, name: &str) -> Option<&Binding> {
        self.lets.get(name)
    }

    pub fn lookup_function(&self, header: &Header) -> Option<Rc<FunctionDescriptor>> {
        self.funcs.get(header).cloned()
    }

    /// Returns an environment with cost increased by `k`.
    pub fn with_cost(&self, k: u64) -> Context {
        let mut next = self.clone();
        next.cost += k;
        next
    }

    /// Installs or replaces a binding. `captured` is the environment the
    /// caller observed *before* this call — it is the caller's
    /// responsibility to pass the pre-install environment so the binding
    /// does not capture itself (spec.md §9, "no recursion on let").
    pub fn with_let(&self, name: impl Into<String>, value_expr: Expr, captured: Context, resolved: bool) -> Context {
        let mut next = self.clone();
        next.lets.insert(
            name.into(),
            Binding {
                value_expr,
                captured,
                resolved,
            },
        );
        next
    }

    pub fn with_function(&self, header: Header, descriptor: FunctionDescriptor) -> Context {
        let mut next = self.clone();
        next.funcs.insert(header, Rc::new(descriptor));
        next
    }

    /// `this.lets` overridden by `other.lets`, `this.funcs` overridden by
    /// `other.funcs`, `cost = max(this.cost, other.cost)`. Used only when
    /// restoring a closure's captured frame for a `Ref` lookup (spec.md
    /// §4.4): bindings visible at definition time plus whatever the current
    /// function/let context has accumulated since.
    ///
    /// `im::HashMap::union` keeps the *receiver's* entries on key collision,
    /// so to make `other` win we union with `other` as the receiver.
    pub fn combine(&self, other: &Context) -> Context {
        Context {
            lets: other.lets.clone().union(self.lets.clone()),
            funcs: other.funcs.clone().union(self.funcs.clone()),
            cost: self.cost.max(other.cost),
        }
    }

    pub fn exhausted(&self, limit: u64) -> bool {
        self.cost >= limit
    }

    pub fn remaining(&self, limit: u64) -> u64 {
        limit.saturating_sub(self.cost)
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn with_cost_is_additive_and_non_mutating() {
        let ctx = Context::new();
        let next = ctx.with_cost(3).with_cost(4);
        assert_eq!(next.cost(), 7);
        assert_eq!(ctx.cost(), 0);
    }

    #[test]
    fn combine_prefers_other_lets_and_max_cost() {
        let base = Context::new().with_let("x", Expr::int(1), Context::new(), true).with_cost(1);
        let other = Context::new().with_let("x", Expr::int(2), Context::new(), true).with_cost(5);
        let combined = base.combine(&other);
        assert_eq!(combined.lookup_let("x").unwrap().value_expr, Expr::int(2));
        assert_eq!(combined.cost(), 5);
    }

    #[test]
    fn combine_keeps_base_entries_not_overridden() {
        let base = Context::new().with_let("x", Expr::int(1), Context::new(), true);
        let other = Context::new().with_let("y", Expr::int(2), Context::new(), true);
        let combined = base.combine(&other);
        assert_eq!(combined.lookup_let("x").unwrap().value_expr, Expr::int(1));
        assert_eq!(combined.lookup_let("y").unwrap().value_expr, Expr::int(2));
    }

    #[test]
    fn exhausted_is_cost_at_least_limit() {
        let ctx = Context::new().with_cost(5);
        assert!(!ctx.exhausted(6));
        assert!(ctx.exhausted(5));
        assert!(ctx.exhausted(4));
    }
}
