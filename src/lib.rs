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

//! A cost-bounded, resumable evaluator for a small typed expression
//! language. Given an expression tree and a populated [`Context`], the
//! reducer walks the tree as far as a caller-supplied complexity budget
//! allows. When the budget runs out mid-reduction, [`evaluate`] returns the
//! partially reduced residual alongside the cost consumed so far, rather
//! than failing: callers decide whether a partial result is acceptable.
//!
//! Out of scope, as an external collaborator: the parser/compiler producing
//! the [`Expr`] tree, the concrete catalogue of native functions, and the
//! host blockchain. This crate is pure with respect to all three.

pub mod builder;
pub mod context;
pub mod errors;
pub mod expr;
pub mod function;
pub mod natives;
pub mod reducer;
pub mod value;

pub use builder::ContextBuilder;
pub use context::Context;
pub use errors::{CheckErrors, Error, EvalResult, HostError};
pub use expr::{Decl, Expr, FuncDecl, Header};
pub use function::{FunctionDescriptor, StdlibVersion};
pub use value::Value;

/// The result of driving an expression to a fixpoint or budget exhaustion:
/// the residual expression (a [`Value`]-carrying `Expr::Evaluated` iff
/// reduction completed under budget) and the total cost consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    pub residual: Expr,
    pub cost: u64,
}

impl EvalOutcome {
    /// `Some(value)` iff the residual is a fully reduced value.
    pub fn value(&self) -> Option<&Value> {
        match &self.residual {
            Expr::Evaluated(v) => Some(v),
            _ => None,
        }
    }
}

/// The single public entry point. Constructs the reducer with `limit` and
/// drives `expr` to a fixpoint or budget exhaustion; repeated calls are not
/// required because `reduce` itself recurses to completion.
pub fn evaluate(
    expr: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
) -> EvalResult<EvalOutcome> {
    log::trace!("evaluate: limit={} version={:?}", limit, version);
    let (residual, ctx2) = reducer::reduce(expr, ctx, limit, version)?;
    if !residual.is_evaluated() {
        log::debug!(
            "evaluate: budget exhausted at cost={} (limit={})",
            ctx2.cost(),
            limit
        );
    }
    Ok(EvalOutcome {
        residual,
        cost: ctx2.cost(),
    })
}
