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
use std::rc::Rc;

use crate::errors::HostError;
use crate::expr::{Expr, Header};
use crate::value::Value;

/// The standard-library version selecting which cost table a native
/// function's invocation is charged against. The evaluator never branches
/// on this beyond passing it to `cost_by_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StdlibVersion {
    V1,
    V2,
    V3,
}

pub type NativeImpl = Rc<dyn Fn(&[Value]) -> Result<Value, HostError>>;

/// A function as seen by the reducer: either a native (atomic, pure, costed
/// by version) or a user function (evaluated by β-reduction into a `Let`
/// chain — spec.md §9).
#[derive(Clone)]
pub enum FunctionDescriptor {
    Native {
        header: Header,
        cost_by_version: fn(StdlibVersion) -> u64,
        implementation: NativeImpl,
    },
    User {
        header: Header,
        param_names: Vec<String>,
        body: Expr,
    },
}

impl FunctionDescriptor {
    pub fn header(&self) -> &Header {
        match self {
            FunctionDescriptor::Native { header, .. } => header,
            FunctionDescriptor::User { header, .. } => header,
        }
    }

    pub fn native(
        header: Header,
        cost_by_version: fn(StdlibVersion) -> u64,
        implementation: impl Fn(&[Value]) -> Result<Value, HostError> + 'static,
    ) -> FunctionDescriptor {
        FunctionDescriptor::Native {
            header,
            cost_by_version,
            implementation: Rc::new(implementation),
        }
    }

    pub fn user(header: Header, param_names: Vec<String>, body: Expr) -> FunctionDescriptor {
        FunctionDescriptor::User {
            header,
            param_names,
            body,
        }
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FunctionDescriptor::Native { header, .. } => {
                f.debug_struct("Native").field("header", header).finish()
            }
            FunctionDescriptor::User {
                header,
                param_names,
                ..
            } => f
                .debug_struct("User")
                .field("header", header)
                .field("param_names", param_names)
                .finish(),
        }
    }
}
