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

use std::fmt;

use crate::value::Value;

/// Opaque key identifying a function by name and arity. The upstream
/// compiler is responsible for making this unambiguous; we only use it as a
/// lookup key into `Context::funcs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Header {
    pub name: String,
    pub arity: usize,
}

impl Header {
    pub fn new(name: impl Into<String>, arity: usize) -> Header {
        Header {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A declaration introduced by a `Block`. `Let` is semantically identical to
/// the standalone `Expr::Let` variant; `Func` only ever appears here.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Let(String, Box<Expr>),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub param_names: Vec<String>,
    pub body: Box<Expr>,
}

/// The expression tree. `Evaluated` is the only terminal variant; every
/// other variant is a reducible redex.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Let(String, Box<Expr>, Box<Expr>),
    Block(Box<Decl>, Box<Expr>),
    Getter(Box<Expr>, String),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Header, Vec<Expr>),
    Ref(String),
    Evaluated(Value),
}

impl Expr {
    pub fn let_(name: impl Into<String>, value: Expr, body: Expr) -> Expr {
        Expr::Let(name.into(), Box::new(value), Box::new(body))
    }

    pub fn block_let(name: impl Into<String>, value: Expr, body: Expr) -> Expr {
        Expr::Block(
            Box::new(Decl::Let(name.into(), Box::new(value))),
            Box::new(body),
        )
    }

    pub fn block_func(
        name: impl Into<String>,
        param_names: Vec<String>,
        fbody: Expr,
        body: Expr,
    ) -> Expr {
        Expr::Block(
            Box::new(Decl::Func(FuncDecl {
                name: name.into(),
                param_names,
                body: Box::new(fbody),
            })),
            Box::new(body),
        )
    }

    pub fn getter(obj: Expr, field: impl Into<String>) -> Expr {
        Expr::Getter(Box::new(obj), field.into())
    }

    pub fn if_(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        Expr::If(Box::new(cond), Box::new(then_expr), Box::new(else_expr))
    }

    pub fn call(header: Header, args: Vec<Expr>) -> Expr {
        Expr::Call(header, args)
    }

    pub fn ref_(name: impl Into<String>) -> Expr {
        Expr::Ref(name.into())
    }

    pub fn value(v: Value) -> Expr {
        Expr::Evaluated(v)
    }

    pub fn int(i: i128) -> Expr {
        Expr::Evaluated(Value::Int(i))
    }

    pub fn bool(b: bool) -> Expr {
        Expr::Evaluated(Value::Bool(b))
    }

    /// True iff this node is a fully reduced value — the reducer's
    /// terminal case.
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Expr::Evaluated(_))
    }

    /// Consumes a fully reduced `Expr`, returning the `Value` it carries.
    /// Panics if called on a residual — callers must check
    /// `is_evaluated()` first; this mirrors the reducer's own invariant
    /// that `reduce` only returns a non-`Evaluated` node when the budget
    /// ran out.
    pub fn into_value(self) -> Value {
        match self {
            Expr::Evaluated(v) => v,
            other => panic!("into_value called on a residual expression: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_let_is_shaped_like_standalone_let() {
        // spec.md §3: "Block with a Let declaration is semantically
        // identical to Let" — same name/value/body, just wrapped in Decl.
        let block = Expr::block_let("x", Expr::int(1), Expr::ref_("x"));
        let plain = Expr::let_("x", Expr::int(1), Expr::ref_("x"));
        match (block, plain) {
            (
                Expr::Block(decl, body),
                Expr::Let(plain_name, plain_value, plain_body),
            ) => match *decl {
                Decl::Let(name, value) => {
                    assert_eq!(name, plain_name);
                    assert_eq!(*value, *plain_value);
                    assert_eq!(*body, *plain_body);
                }
                other => panic!("expected Decl::Let, got {:?}", other),
            },
            other => panic!("unexpected shapes: {:?}", other),
        }
    }
}
