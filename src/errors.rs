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

use std::error;
use std::fmt;

use crate::expr::Header;
use crate::value::Value;

/// Fatal, structural errors: the kind of thing a well-typed program produced
/// by the upstream compiler should never trigger. Indicates a compiler bug
/// or a malformed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckErrors {
    UndefinedVariable(String),
    UndefinedFunction(Header),
    NotARecord(Value),
    NoSuchField { type_name: String, field: String },
    NotABoolean(Value),
    MaxStackDepthReached,
}

impl fmt::Display for CheckErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckErrors::UndefinedVariable(name) => write!(f, "unknown binding: {}", name),
            CheckErrors::UndefinedFunction(header) => {
                write!(f, "unknown function: {}", header)
            }
            CheckErrors::NotARecord(value) => {
                write!(f, "getter target is not a record: {}", value)
            }
            CheckErrors::NoSuchField { type_name, field } => {
                write!(f, "{} has no field named {}", type_name, field)
            }
            CheckErrors::NotABoolean(value) => {
                write!(f, "if-condition did not evaluate to a boolean: {}", value)
            }
            CheckErrors::MaxStackDepthReached => write!(f, "maximum call stack depth reached"),
        }
    }
}

impl error::Error for CheckErrors {}

/// A domain-specific failure reported by a native function (e.g. division by
/// zero, a signature mismatch). Aborts the whole evaluation; the cost
/// charged up to the point of failure is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct HostError {
    pub header: Header,
    pub message: String,
    pub cost_so_far: u64,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "native function {} failed: {} (cost so far: {})",
            self.header, self.message, self.cost_so_far
        )
    }
}

impl error::Error for HostError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Check(CheckErrors),
    Host(HostError),
}

impl From<CheckErrors> for Error {
    fn from(e: CheckErrors) -> Self {
        Error::Check(e)
    }
}

impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Error::Host(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Check(e) => fmt::Display::fmt(e, f),
            Error::Host(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Check(e) => Some(e),
            Error::Host(e) => Some(e),
        }
    }
}

pub type EvalResult<T> = Result<T, Error>;
