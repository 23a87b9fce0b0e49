//! Literal pool entries of a bytecode unit.

use std::fmt;

use strum::{Display, EnumIter, FromRepr};

use crate::bytecode::Bytecode;

/// Type tag of a literal as written in the container.
///
/// The discriminant is the ASCII tag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(u8)]
pub enum LiteralType {
    /// Boolean word, stored verbatim
    Boolean = b'b',
    /// Nested precompiled script
    Bytecode = b'c',
    /// Floating point number
    Double = b'd',
    /// 32-bit integer
    Int = b'i',
    /// Precompiled procedure body
    ProcBody = b'p',
    /// Length-prefixed plain string
    String = b's',
    /// Base-85 encoded string
    XString = b'x',
}

impl LiteralType {
    /// Looks up the literal type for a container tag character.
    #[must_use]
    pub fn from_char(tag: char) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

/// A single entry of a literal pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Boolean word such as `true` or `no`
    Boolean(String),
    /// Nested precompiled script, e.g. the body of a `while` that could not be inlined
    Bytecode(Box<Bytecode>),
    /// Floating point number
    Double(f64),
    /// Integer
    Int(i32),
    /// Precompiled procedure body
    ProcBody(Box<Bytecode>),
    /// Plain string
    String(String),
    /// String that was stored base-85 encoded
    XString(String),
}

impl Literal {
    /// The type tag of this literal.
    #[must_use]
    pub fn literal_type(&self) -> LiteralType {
        match self {
            Literal::Boolean(_) => LiteralType::Boolean,
            Literal::Bytecode(_) => LiteralType::Bytecode,
            Literal::Double(_) => LiteralType::Double,
            Literal::Int(_) => LiteralType::Int,
            Literal::ProcBody(_) => LiteralType::ProcBody,
            Literal::String(_) => LiteralType::String,
            Literal::XString(_) => LiteralType::XString,
        }
    }

    /// The nested bytecode unit carried by this literal, if any.
    #[must_use]
    pub fn nested(&self) -> Option<&Bytecode> {
        match self {
            Literal::Bytecode(bytecode) | Literal::ProcBody(bytecode) => Some(bytecode),
            _ => None,
        }
    }

    /// Text of the literal as it appears in source.
    ///
    /// Empty strings render as `""`. Nested bytecode has no textual form on its own and
    /// renders as a placeholder; the decompiler substitutes the recovered script instead.
    #[must_use]
    pub fn to_source_string(&self) -> String {
        match self {
            Literal::String(value) | Literal::XString(value) => {
                if value.is_empty() {
                    "\"\"".to_string()
                } else {
                    value.clone()
                }
            }
            Literal::Boolean(value) => value.clone(),
            Literal::Double(value) => value.to_string(),
            Literal::Int(value) => value.to_string(),
            Literal::Bytecode(_) => "Bytecode".to_string(),
            Literal::ProcBody(_) => "Procbody".to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_strings() {
        assert_eq!(Literal::String(String::new()).to_source_string(), "\"\"");
        assert_eq!(Literal::XString("puts".into()).to_source_string(), "puts");
        assert_eq!(Literal::Int(-4).to_source_string(), "-4");
        assert_eq!(Literal::Double(1.5).to_source_string(), "1.5");
        assert_eq!(Literal::Boolean("yes".into()).to_string(), "yes");
    }

    #[test]
    fn tags() {
        assert_eq!(LiteralType::from_char('p'), Some(LiteralType::ProcBody));
        assert_eq!(LiteralType::from_char('q'), None);
        assert_eq!(LiteralType::from_char('é'), None);
        assert_eq!(Literal::Int(1).literal_type(), LiteralType::Int);
    }
}
