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

//! A hardcoded, no-argument demonstration of the reducer: builds a small
//! expression by hand, drives it through `evaluate` at a deliberately tight
//! budget, and prints the residual and cost. Not a CLI — there is no parser
//! in this crate to feed one.

use budget_eval::{evaluate, ContextBuilder, Expr, Header, StdlibVersion};

fn main() {
    env_logger::init();

    let mut builder = ContextBuilder::new();
    budget_eval::natives::install(&mut builder);
    let ctx = builder.build();

    // let total = 1 + 1 in total + total, with a budget that forces the
    // evaluator to stop short and hand back a residual expression.
    let expr = Expr::let_(
        "total",
        Expr::call(Header::new("+", 2), vec![Expr::int(1), Expr::int(1)]),
        Expr::call(Header::new("+", 2), vec![Expr::ref_("total"), Expr::ref_("total")]),
    );

    for limit in [0, 1, 2, 3, 100] {
        let outcome = evaluate(expr.clone(), ctx.clone(), limit, StdlibVersion::V1)
            .expect("demo expression has no undefined names or host errors");
        match outcome.value() {
            Some(v) => println!("limit={:<4} cost={:<4} value={}", limit, outcome.cost, v),
            None => println!(
                "limit={:<4} cost={:<4} residual={:?}",
                limit, outcome.cost, outcome.residual
            ),
        }
    }
}
