// This file is part of dbusgen, a generator of typed D-Bus client proxies from interface specifications.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// dbusgen is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// dbusgen is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Recursive-descent parser for D-Bus type signatures.
//!
//! A signature is a string of single-character type codes and container brackets. It may hold
//! any number of complete types back to back (`"sa{sv}i"` is three types), which is how a
//! method's argument list is described. [`parse`] returns one [`TypeNode`] per complete type.
//!
//! The grammar is LL(1) on the current character:
//!
//! | Input          | Produces                                   |
//! |----------------|--------------------------------------------|
//! | `ybnqiuxtdhsog`| [`TypeNode::Basic`]                        |
//! | `v`            | [`TypeNode::Variant`]                      |
//! | `a` *type*     | [`TypeNode::Array`]                        |
//! | `(` *type*+ `)`| [`TypeNode::Struct`]                       |
//! | `a{` *basic* *type* `}` | [`TypeNode::Array`] of [`TypeNode::DictEntry`] |
//!
//! Protocol limits are enforced as part of the grammar: at most
//! [`MAX_SIGNATURE_LEN`](crate::config::MAX_SIGNATURE_LEN) bytes, and at most
//! [`MAX_ARRAY_DEPTH`](crate::config::MAX_ARRAY_DEPTH) /
//! [`MAX_STRUCT_DEPTH`](crate::config::MAX_STRUCT_DEPTH) levels of nesting.
//!
//! [`TypeNode`] implements `Display`, which writes the canonical signature back out, so
//! `parse(&to_signature(&parse(s)?))` yields the same tree.
//!
//! # Examples
//!
//! ```rust
//! use dbusgen::signature::{BasicType, TypeNode, parse};
//!
//! let types = parse("ia{sv}").unwrap();
//! assert_eq!(types[0], TypeNode::Basic(BasicType::Int32));
//! assert!(types[1].is_dict());
//! assert_eq!(types[1].to_string(), "a{sv}");
//! ```

use crate::config;
use crate::error::{SignatureError, SignatureFault};
use log::trace;
use std::fmt;

/// A fixed-size or string-like type with a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    UnixFd,
    String,
    ObjectPath,
    Signature,
}

impl BasicType {
    /// Maps a type code to its basic type, or `None` if `code` is not a basic type code.
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'y' => BasicType::Byte,
            'b' => BasicType::Boolean,
            'n' => BasicType::Int16,
            'q' => BasicType::UInt16,
            'i' => BasicType::Int32,
            'u' => BasicType::UInt32,
            'x' => BasicType::Int64,
            't' => BasicType::UInt64,
            'd' => BasicType::Double,
            'h' => BasicType::UnixFd,
            's' => BasicType::String,
            'o' => BasicType::ObjectPath,
            'g' => BasicType::Signature,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            BasicType::Byte => 'y',
            BasicType::Boolean => 'b',
            BasicType::Int16 => 'n',
            BasicType::UInt16 => 'q',
            BasicType::Int32 => 'i',
            BasicType::UInt32 => 'u',
            BasicType::Int64 => 'x',
            BasicType::UInt64 => 't',
            BasicType::Double => 'd',
            BasicType::UnixFd => 'h',
            BasicType::String => 's',
            BasicType::ObjectPath => 'o',
            BasicType::Signature => 'g',
        }
    }
}

/// One complete type parsed from a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Basic(BasicType),
    Array(Box<TypeNode>),
    /// Non-empty, ordered fields.
    Struct(Vec<TypeNode>),
    /// Only ever appears as the element of an [`TypeNode::Array`], which makes the array a map.
    DictEntry {
        key: BasicType,
        value: Box<TypeNode>,
    },
    Variant,
}

impl TypeNode {
    pub fn is_basic(&self) -> bool {
        matches!(self, TypeNode::Basic(_))
    }

    /// `true` for an array of dict entries, i.e. a map.
    pub fn is_dict(&self) -> bool {
        matches!(self, TypeNode::Array(elem) if matches!(**elem, TypeNode::DictEntry { .. }))
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Basic(basic) => write!(f, "{}", basic.code()),
            TypeNode::Array(elem) => write!(f, "a{elem}"),
            TypeNode::Struct(fields) => {
                f.write_str("(")?;
                for field in fields {
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
            TypeNode::DictEntry { key, value } => write!(f, "{{{}{value}}}", key.code()),
            TypeNode::Variant => f.write_str("v"),
        }
    }
}

/// Writes a sequence of complete types back out as one signature.
pub fn to_signature(types: &[TypeNode]) -> String {
    types.iter().map(ToString::to_string).collect()
}

/// Parse a signature holding zero or more complete types.
///
/// # Arguments
///
/// * `signature` - the signature string, e.g. `"sa{sv}"`
///
/// # Returns: `Result<Vec<TypeNode>, SignatureError>`
/// * `Ok(Vec<TypeNode>)` - one node per complete type, in order. Empty for `""`.
/// * `Err(SignatureError)` - the signature breaks the grammar or a protocol limit
pub fn parse(signature: &str) -> Result<Vec<TypeNode>, SignatureError> {
    trace!("Parsing signature {signature:?}");
    let mut parser = Parser::new(signature)?;
    let mut types = Vec::new();
    while !parser.at_end() {
        types.push(parser.parse_type(Position::TopLevel)?);
    }
    trace!("Parsed {} types from {signature:?}", types.len());
    Ok(types)
}

/// Parse a signature that must hold exactly one complete type, as property types do.
pub fn parse_single(signature: &str) -> Result<TypeNode, SignatureError> {
    let mut parser = Parser::new(signature)?;
    let node = parser.parse_type(Position::TopLevel)?;
    if !parser.at_end() {
        return Err(parser.fault_here(SignatureFault::TrailingInput));
    }
    Ok(node)
}

/// Where the type being parsed sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    TopLevel,
    ArrayElement,
    Field,
}

struct Parser<'a> {
    signature: &'a str,
    pos: usize,
    array_depth: usize,
    struct_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(signature: &'a str) -> Result<Self, SignatureError> {
        let parser = Self {
            signature,
            pos: 0,
            array_depth: 0,
            struct_depth: 0,
        };
        if signature.len() > config::MAX_SIGNATURE_LEN {
            return Err(SignatureError {
                signature: signature.to_string(),
                position: config::MAX_SIGNATURE_LEN,
                fault: SignatureFault::TooLong(signature.len()),
            });
        }
        Ok(parser)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.signature.len()
    }

    // `pos` only ever advances past ASCII, so it always sits on a char boundary.
    fn peek(&self) -> Option<char> {
        self.signature[self.pos..].chars().next()
    }

    fn fault_at(&self, position: usize, fault: SignatureFault) -> SignatureError {
        SignatureError {
            signature: self.signature.to_string(),
            position,
            fault,
        }
    }

    fn fault_here(&self, fault: SignatureFault) -> SignatureError {
        self.fault_at(self.pos, fault)
    }

    fn parse_type(&mut self, position: Position) -> Result<TypeNode, SignatureError> {
        let Some(c) = self.peek() else {
            return Err(self.fault_here(SignatureFault::UnexpectedEnd));
        };
        if let Some(basic) = BasicType::from_code(c) {
            self.pos += 1;
            return Ok(TypeNode::Basic(basic));
        }
        match c {
            'v' => {
                self.pos += 1;
                Ok(TypeNode::Variant)
            }
            'a' => self.parse_array(),
            '(' => self.parse_struct(),
            '{' if position == Position::ArrayElement => self.parse_dict_entry(),
            '{' => Err(self.fault_here(SignatureFault::DictEntryOutsideArray)),
            ')' | '}' => Err(self.fault_here(SignatureFault::UnmatchedCloser(c))),
            _ => Err(self.fault_here(SignatureFault::UnexpectedChar(c))),
        }
    }

    fn parse_array(&mut self) -> Result<TypeNode, SignatureError> {
        if self.array_depth == config::MAX_ARRAY_DEPTH {
            return Err(self.fault_here(SignatureFault::TooDeep));
        }
        self.pos += 1;
        self.array_depth += 1;
        let elem = self.parse_type(Position::ArrayElement)?;
        self.array_depth -= 1;
        Ok(TypeNode::Array(Box::new(elem)))
    }

    /// Parses fields up to and including `closer`. The opener must already be consumed.
    fn parse_fields(&mut self, closer: char) -> Result<Vec<TypeNode>, SignatureError> {
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.fault_here(SignatureFault::UnexpectedEnd)),
                Some(c) if c == closer => {
                    self.pos += 1;
                    return Ok(fields);
                }
                Some(_) => fields.push(self.parse_type(Position::Field)?),
            }
        }
    }

    fn enter_struct(&mut self) -> Result<usize, SignatureError> {
        if self.struct_depth == config::MAX_STRUCT_DEPTH {
            return Err(self.fault_here(SignatureFault::TooDeep));
        }
        let open = self.pos;
        self.pos += 1;
        self.struct_depth += 1;
        Ok(open)
    }

    fn parse_struct(&mut self) -> Result<TypeNode, SignatureError> {
        let open = self.enter_struct()?;
        let fields = self.parse_fields(')')?;
        self.struct_depth -= 1;
        if fields.is_empty() {
            return Err(self.fault_at(open, SignatureFault::EmptyStruct));
        }
        Ok(TypeNode::Struct(fields))
    }

    fn parse_dict_entry(&mut self) -> Result<TypeNode, SignatureError> {
        let open = self.enter_struct()?;
        let mut fields = self.parse_fields('}')?;
        self.struct_depth -= 1;
        if fields.len() != 2 {
            return Err(self.fault_at(open, SignatureFault::DictEntryArity(fields.len())));
        }
        let value = fields.pop().map(Box::new);
        match (fields.pop(), value) {
            (Some(TypeNode::Basic(key)), Some(value)) => Ok(TypeNode::DictEntry { key, value }),
            _ => Err(self.fault_at(open + 1, SignatureFault::DictKeyNotBasic)),
        }
    }
}
