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
use crate::errors::{CheckErrors, EvalResult};
use crate::expr::{Decl, Expr, FuncDecl, Header};
use crate::function::{FunctionDescriptor, StdlibVersion};
use crate::value::Value;

/// Mirrors the teacher's own `MAX_CALL_STACK_DEPTH` — a safety net against a
/// pathologically self-referential `Call` chain, not a change to the
/// documented reduction semantics for well-formed input.
const MAX_CALL_STACK_DEPTH: usize = 64;

/// `reduce(expr, ctx) -> (expr', ctx')`, parameterized by the budget and the
/// standard-library version in force. Dispatch is by the outermost
/// constructor of `expr`.
///
/// Guarantees (spec.md §4.2):
/// 1. `ctx'.cost >= ctx.cost`.
/// 2. Deterministic: equal inputs yield equal outputs.
/// 3. Progress: if `ctx` is not exhausted and `expr` is reducible, at least
///    one reduction step or one unit of cost is charged.
/// 4. Fidelity: if `ctx'.cost < limit`, `expr'` is `Evaluated`.
pub fn reduce(
    expr: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
) -> EvalResult<(Expr, Context)> {
    reduce_at_depth(expr, ctx, limit, version, 0)
}

fn reduce_at_depth(
    expr: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    if ctx.exhausted(limit) {
        return Ok((expr, ctx));
    }

    match expr {
        Expr::Evaluated(v) => Ok((Expr::Evaluated(v), ctx)),
        Expr::Let(name, value, body) => reduce_let(name, *value, *body, ctx, limit, version, depth),
        Expr::Block(decl, body) => match *decl {
            Decl::Let(name, value) => reduce_let(name, *value, *body, ctx, limit, version, depth),
            Decl::Func(fdecl) => reduce_block_func(fdecl, *body, ctx, limit, version, depth),
        },
        Expr::Getter(obj, field) => reduce_getter(*obj, field, ctx, limit, version, depth),
        Expr::If(cond, then_expr, else_expr) => {
            reduce_if(*cond, *then_expr, *else_expr, ctx, limit, version, depth)
        }
        Expr::Call(header, args) => reduce_call(header, args, ctx, limit, version, depth),
        Expr::Ref(name) => reduce_ref(name, ctx, limit, version, depth),
    }
}

fn reduce_let(
    name: String,
    value: Expr,
    body: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    // The captured environment is `ctx` itself — the environment *before*
    // this binding is installed, so a reference to `name` inside `value`
    // does not see `name` (spec.md §9: no recursion on let).
    let ctx1 = ctx.with_let(name.clone(), value, ctx.clone(), false);
    let (body2, ctx2) = reduce_at_depth(body, ctx1, limit, version, depth)?;

    if body2.is_evaluated() {
        return Ok((body2, ctx2));
    }

    // The binding may have been partially forced while reducing `body`;
    // carry that progress forward rather than losing it on resumption.
    let value_expr = ctx2
        .lookup_let(&name)
        .expect("let-bound name must still be present after reducing its own body")
        .value_expr
        .clone();
    let reconstructed = Expr::Block(
        Box::new(Decl::Let(name, Box::new(value_expr))),
        Box::new(body2),
    );
    Ok((reconstructed, ctx2))
}

fn reduce_block_func(
    fdecl: FuncDecl,
    body: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    let header = Header::new(fdecl.name.clone(), fdecl.param_names.len());
    let descriptor = FunctionDescriptor::user(
        header.clone(),
        fdecl.param_names.clone(),
        (*fdecl.body).clone(),
    );
    let ctx1 = ctx.with_function(header, descriptor);
    let (body2, ctx2) = reduce_at_depth(body, ctx1, limit, version, depth)?;

    if body2.is_evaluated() {
        Ok((body2, ctx2))
    } else {
        Ok((
            Expr::Block(Box::new(Decl::Func(fdecl)), Box::new(body2)),
            ctx2,
        ))
    }
}

fn reduce_ref(
    name: String,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    let binding = ctx
        .lookup_let(&name)
        .cloned()
        .ok_or_else(|| CheckErrors::UndefinedVariable(name.clone()))?;

    if binding.resolved {
        return Ok((binding.value_expr, ctx.with_cost(1)));
    }

    // Closure restoration: bindings visible at definition time, overridden
    // by whatever the current function/let context has accumulated since.
    let restore_ctx = binding.captured.combine(&ctx);
    let (forced, ctx_r) = reduce_at_depth(binding.value_expr, restore_ctx, limit, version, depth)?;

    if ctx_r.exhausted(limit) {
        // Record the partial progress back under the same name, still
        // unresolved, and do not charge the lookup.
        let updated = ctx_r.with_let(name.clone(), forced, binding.captured.clone(), false);
        Ok((Expr::ref_(name), updated))
    } else {
        let updated = ctx_r
            .with_let(name, forced.clone(), binding.captured, true)
            .with_cost(1);
        Ok((forced, updated))
    }
}

fn reduce_if(
    cond: Expr,
    then_expr: Expr,
    else_expr: Expr,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    let (cond2, ctx1) = reduce_at_depth(cond, ctx, limit, version, depth)?;

    if ctx1.exhausted(limit) {
        return Ok((Expr::if_(cond2, then_expr, else_expr), ctx1));
    }

    match cond2 {
        Expr::Evaluated(ref v) if v.is_true() => {
            reduce_at_depth(then_expr, ctx1.with_cost(1), limit, version, depth)
        }
        Expr::Evaluated(ref v) if v.is_false() => {
            reduce_at_depth(else_expr, ctx1.with_cost(1), limit, version, depth)
        }
        Expr::Evaluated(other) => Err(CheckErrors::NotABoolean(other).into()),
        residual => unreachable!(
            "reduce's fidelity guarantee was violated: {:?} is not Evaluated but ctx1 is not exhausted",
            residual
        ),
    }
}

fn reduce_getter(
    obj: Expr,
    field: String,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    let (obj2, ctx1) = reduce_at_depth(obj, ctx, limit, version, depth)?;

    if ctx1.exhausted(limit) {
        return Ok((Expr::getter(obj2, field), ctx1));
    }

    match obj2 {
        Expr::Evaluated(Value::CaseObj { type_name, fields }) => match fields.get(&field) {
            Some(v) => Ok((Expr::Evaluated(v.clone()), ctx1.with_cost(1))),
            None => Err(CheckErrors::NoSuchField { type_name, field }.into()),
        },
        Expr::Evaluated(other) => Err(CheckErrors::NotARecord(other).into()),
        residual => unreachable!(
            "reduce's fidelity guarantee was violated: {:?} is not Evaluated but ctx1 is not exhausted",
            residual
        ),
    }
}

fn reduce_call(
    header: Header,
    args: Vec<Expr>,
    ctx: Context,
    limit: u64,
    version: StdlibVersion,
    depth: usize,
) -> EvalResult<(Expr, Context)> {
    if depth >= MAX_CALL_STACK_DEPTH {
        return Err(CheckErrors::MaxStackDepthReached.into());
    }

    let descriptor = ctx
        .lookup_function(&header)
        .ok_or_else(|| CheckErrors::UndefinedFunction(header.clone()))?;

    let mut reduced = Vec::with_capacity(args.len());
    let mut cur_ctx = ctx;
    let mut i = 0;

    while i < args.len() {
        if cur_ctx.exhausted(limit) {
            let mut residual_args = reduced;
            residual_args.extend(args[i..].iter().cloned());
            return Ok((Expr::call(header, residual_args), cur_ctx));
        }

        let (arg2, ctx2) = reduce_at_depth(args[i].clone(), cur_ctx, limit, version, depth)?;

        if !arg2.is_evaluated() {
            let mut residual_args = reduced;
            residual_args.push(arg2);
            residual_args.extend(args[i + 1..].iter().cloned());
            return Ok((Expr::call(header, residual_args), ctx2));
        }

        reduced.push(arg2);
        cur_ctx = ctx2;
        i += 1;
    }

    if cur_ctx.exhausted(limit) {
        return Ok((Expr::call(header, reduced), cur_ctx));
    }

    let arg_values: Vec<Value> = reduced.into_iter().map(Expr::into_value).collect();

    match &*descriptor {
        FunctionDescriptor::Native {
            cost_by_version,
            implementation,
            ..
        } => {
            let step_cost = cost_by_version(version);
            if step_cost > cur_ctx.remaining(limit) {
                // The overflow was detectable before committing — defer the
                // whole call to resumption rather than charging a partial
                // native invocation.
                let residual_args = arg_values.into_iter().map(Expr::value).collect();
                return Ok((Expr::call(header, residual_args), cur_ctx));
            }
            let result = implementation(&arg_values).map_err(|mut e| {
                e.cost_so_far = cur_ctx.cost();
                e
            })?;
            Ok((Expr::Evaluated(result), cur_ctx.with_cost(step_cost)))
        }
        FunctionDescriptor::User {
            param_names, body, ..
        } => {
            let mut chained = body.clone();
            for (pname, pval) in param_names.iter().zip(arg_values.into_iter()).rev() {
                chained = Expr::let_(pname.clone(), Expr::value(pval), chained);
            }
            let (result, inner_ctx) =
                reduce_at_depth(chained, cur_ctx.clone(), limit, version, depth + 1)?;
            // User-function bodies do not leak bindings into the caller's
            // scope: only the accumulated cost is propagated back.
            let delta = inner_ctx.cost() - cur_ctx.cost();
            let restored = cur_ctx.with_cost(delta);
            Ok((result, restored))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContextBuilder;
    use crate::natives;

    fn std_env() -> Context {
        let mut b = ContextBuilder::new();
        natives::install(&mut b);
        b.build()
    }

    #[test]
    fn if_true_short_circuits_else_branch() {
        let looping = Expr::call(Header::new("+", 2), vec![Expr::ref_("undef"), Expr::int(1)]);
        let expr = Expr::if_(Expr::bool(true), Expr::int(1), looping);
        let (residual, ctx) = reduce(expr, std_env(), 1, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::int(1));
        assert_eq!(ctx.cost(), 1);
    }

    #[test]
    fn let_memoizes_second_reference() {
        // Let("x", 2+3, Ref("x") + Ref("x")) => 10, cost 4.
        let value = Expr::call(Header::new("+", 2), vec![Expr::int(2), Expr::int(3)]);
        let body = Expr::call(
            Header::new("+", 2),
            vec![Expr::ref_("x"), Expr::ref_("x")],
        );
        let expr = Expr::let_("x", value, body);
        let (residual, ctx) = reduce(expr, std_env(), 100, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::int(10));
        assert_eq!(ctx.cost(), 4);
    }

    #[test]
    fn partial_call_reduces_both_args_but_defers_outer_native() {
        // Each nested `+` costs 1; both fit under limit 2, but the outer `+`
        // would bring cost to 3, so it is deferred rather than charged.
        let left = Expr::call(Header::new("+", 2), vec![Expr::int(1), Expr::int(1)]);
        let right = Expr::call(Header::new("+", 2), vec![Expr::int(2), Expr::int(2)]);
        let expr = Expr::call(Header::new("+", 2), vec![left, right]);
        let (residual, ctx) = reduce(expr, std_env(), 2, StdlibVersion::V1).unwrap();
        let expected = Expr::call(Header::new("+", 2), vec![Expr::int(2), Expr::int(4)]);
        assert_eq!(residual, expected);
        assert_eq!(ctx.cost(), 2);
    }

    #[test]
    fn partial_call_leaves_later_arg_untouched_when_exhausted_midway() {
        // A native costed at 2 exhausts a limit of 2 on the left arg alone,
        // so the right arg is never even visited — not just left unevaluated.
        let double = FunctionDescriptor::native(Header::new("double+", 2), |_| 2, |args: &[Value]| {
            match (&args[0], &args[1]) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                _ => unreachable!(),
            }
        });
        let ctx = ContextBuilder::new()
            .with_function(Header::new("double+", 2), double)
            .build();
        let left = Expr::call(Header::new("double+", 2), vec![Expr::int(1), Expr::int(1)]);
        let right = Expr::call(Header::new("double+", 2), vec![Expr::int(2), Expr::int(2)]);
        let expr = Expr::call(Header::new("double+", 2), vec![left, right.clone()]);
        let (residual, ctx) = reduce(expr, ctx, 2, StdlibVersion::V1).unwrap();
        let expected = Expr::call(Header::new("double+", 2), vec![Expr::int(2), right]);
        assert_eq!(residual, expected);
        assert_eq!(ctx.cost(), 2);
    }

    #[test]
    fn getter_on_case_obj() {
        let obj = Value::case_obj(
            "P",
            vec![
                ("x".to_string(), Value::int(7)),
                ("y".to_string(), Value::int(9)),
            ],
        );
        let expr = Expr::getter(Expr::value(obj), "y");
        let (residual, ctx) = reduce(expr, std_env(), 10, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::int(9));
        assert_eq!(ctx.cost(), 1);
    }

    #[test]
    fn user_function_does_not_leak_bindings() {
        // Let("f", UserFunc(f, [a], a+a), Call(f, [3])) => 6
        let body = Expr::block_func(
            "f",
            vec!["a".to_string()],
            Expr::call(Header::new("+", 2), vec![Expr::ref_("a"), Expr::ref_("a")]),
            Expr::call(Header::new("f", 1), vec![Expr::int(3)]),
        );
        let (residual, ctx) = reduce(body, std_env(), 100, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::int(6));
        // the inner "a" binding must not have leaked into the outer context
        assert!(ctx.lookup_let("a").is_none());
    }

    #[test]
    fn undefined_variable_is_a_structural_error() {
        let expr = Expr::if_(Expr::ref_("undef"), Expr::int(1), Expr::int(2));
        let err = reduce(expr, std_env(), 10, StdlibVersion::V1).unwrap_err();
        match err {
            crate::errors::Error::Check(CheckErrors::UndefinedVariable(name)) => {
                assert_eq!(name, "undef")
            }
            other => panic!("expected UndefinedVariable, got {:?}", other),
        }
    }

    #[test]
    fn laziness_unused_let_value_is_free() {
        let heavy = Expr::call(Header::new("+", 2), vec![Expr::ref_("nonexistent"), Expr::int(1)]);
        let expr = Expr::let_("x", heavy, Expr::int(42));
        let (residual, ctx) = reduce(expr, std_env(), 1000, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::int(42));
        assert_eq!(ctx.cost(), 0);
    }
}
