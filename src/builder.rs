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

use crate::context::Context;
use crate::expr::{Expr, Header};
use crate::function::FunctionDescriptor;
use crate::value::Value;

/// The supported way to assemble an initial `Context`: a caller supplies
/// predeclared name -> value bindings (installed already resolved) and
/// function headers -> descriptors (native or user), then calls `build()`.
/// Grounded on the teacher's `OwnedEnvironment`/`ContractContext`
/// construction pattern, simplified to this crate's pure, database-free
/// scope.
pub struct ContextBuilder {
    ctx: Context,
}

impl ContextBuilder {
    pub fn new() -> ContextBuilder {
        ContextBuilder {
            ctx: Context::new(),
        }
    }

    /// Installs a predeclared binding as already resolved — the caller is
    /// handing in a host value, not an expression to lazily force.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> ContextBuilder {
        let name = name.into();
        self.ctx = self
            .ctx
            .with_let(name, Expr::value(value), Context::new(), true);
        self
    }

    pub fn with_function(mut self, header: Header, descriptor: FunctionDescriptor) -> ContextBuilder {
        self.ctx = self.ctx.with_function(header, descriptor);
        self
    }

    pub fn build(self) -> Context {
        self.ctx
    }
}

impl Default for ContextBuilder {
    fn default() -> ContextBuilder {
        ContextBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predeclared_values_are_resolved_on_install() {
        let ctx = ContextBuilder::new()
            .with_value("answer", Value::int(42))
            .build();
        let binding = ctx.lookup_let("answer").unwrap();
        assert!(binding.resolved);
        assert_eq!(binding.value_expr, Expr::int(42));
    }
}
