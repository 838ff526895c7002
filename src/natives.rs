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

//! A small, clearly-labelled demonstration native library — arithmetic,
//! comparison, and boolean functions over `Value`, each costed at a flat 1
//! unit regardless of `StdlibVersion`. This is not "the" standard library
//! (spec.md treats that catalogue as an external collaborator); it exists so
//! the reducer's tests and the demo binary have something concrete to call.

use crate::builder::ContextBuilder;
use crate::errors::HostError;
use crate::expr::Header;
use crate::function::{FunctionDescriptor, StdlibVersion};
use crate::value::Value;

fn flat_one(_version: StdlibVersion) -> u64 {
    1
}

fn expect_int(header: &Header, v: &Value) -> Result<i128, HostError> {
    match v {
        Value::Int(i) => Ok(*i),
        other => Err(HostError {
            header: header.clone(),
            message: format!("expected an integer argument, found: {}", other),
            cost_so_far: 0,
        }),
    }
}

fn arith(
    name: &'static str,
    op: fn(i128, i128) -> Option<i128>,
    overflow_message: fn(&str) -> String,
) -> FunctionDescriptor {
    let header = Header::new(name, 2);
    FunctionDescriptor::native(header.clone(), flat_one, move |args: &[Value]| {
        let a = expect_int(&header, &args[0])?;
        let b = expect_int(&header, &args[1])?;
        op(a, b).map(Value::Int).ok_or_else(|| HostError {
            header: header.clone(),
            message: overflow_message(name),
            cost_so_far: 0,
        })
    })
}

fn cmp(name: &'static str, op: fn(i128, i128) -> bool) -> FunctionDescriptor {
    let header = Header::new(name, 2);
    FunctionDescriptor::native(header.clone(), flat_one, move |args: &[Value]| {
        let a = expect_int(&header, &args[0])?;
        let b = expect_int(&header, &args[1])?;
        Ok(Value::Bool(op(a, b)))
    })
}

fn not_() -> FunctionDescriptor {
    let header = Header::new("not", 1);
    FunctionDescriptor::native(header.clone(), flat_one, move |args: &[Value]| {
        match &args[0] {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(HostError {
                header: header.clone(),
                message: format!("expected a boolean argument, found: {}", other),
                cost_so_far: 0,
            }),
        }
    })
}

fn eq_() -> FunctionDescriptor {
    let header = Header::new("=", 2);
    FunctionDescriptor::native(header, flat_one, |args: &[Value]| {
        Ok(Value::Bool(args[0] == args[1]))
    })
}

/// Installs the sample library's headers into a `ContextBuilder`.
pub fn install(builder: &mut ContextBuilder) {
    // `ContextBuilder` is consumed by value, so drive it through a temporary
    // to keep this a simple in-place extension point for callers.
    let mut b = std::mem::replace(builder, ContextBuilder::new());
    let overflow = |name: &str| format!("arithmetic overflow in {}", name);
    b = b
        .with_function(
            Header::new("+", 2),
            arith("+", i128::checked_add, overflow),
        )
        .with_function(
            Header::new("-", 2),
            arith("-", i128::checked_sub, overflow),
        )
        .with_function(
            Header::new("*", 2),
            arith("*", i128::checked_mul, overflow),
        )
        .with_function(
            Header::new("/", 2),
            arith(
                "/",
                |a, b| if b == 0 { None } else { a.checked_div(b) },
                |name| format!("division by zero in {}", name),
            ),
        )
        .with_function(Header::new("<", 2), cmp("<", |a, b| a < b))
        .with_function(Header::new("<=", 2), cmp("<=", |a, b| a <= b))
        .with_function(Header::new(">", 2), cmp(">", |a, b| a > b))
        .with_function(Header::new(">=", 2), cmp(">=", |a, b| a >= b))
        .with_function(Header::new("not", 1), not_())
        .with_function(Header::new("=", 2), eq_());
    *builder = b;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::reducer::reduce;

    fn env() -> crate::context::Context {
        let mut b = ContextBuilder::new();
        install(&mut b);
        b.build()
    }

    #[test]
    fn division_by_zero_aborts_with_host_error() {
        let expr = Expr::call(Header::new("/", 2), vec![Expr::int(1), Expr::int(0)]);
        let err = reduce(expr, env(), 100, StdlibVersion::V1).unwrap_err();
        match err {
            crate::errors::Error::Host(h) => {
                assert_eq!(h.header, Header::new("/", 2));
                assert!(h.message.contains("division by zero"), "{}", h.message);
            }
            other => panic!("expected a HostError, got {:?}", other),
        }
    }

    #[test]
    fn equality_is_structural() {
        let expr = Expr::call(Header::new("=", 2), vec![Expr::int(3), Expr::int(3)]);
        let (residual, _) = reduce(expr, env(), 100, StdlibVersion::V1).unwrap();
        assert_eq!(residual, Expr::bool(true));
    }
}
