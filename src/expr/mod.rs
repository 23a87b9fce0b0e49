//! Expression trees describing recovered Tcl source.
//!
//! Every [`crate::code::Command`] carries an immutable [`Expr`] built by the reduction passes.
//! The tree only describes shape; turning it into text, with indentation for nested bodies, is
//! the job of [`Formatter`].
//!
//! # Examples
//!
//! ```rust
//! use tclscope::expr::{Expr, Operator};
//!
//! let sum = Expr::op(Operator::Add, vec![Expr::var(Expr::literal("x")), Expr::literal("1")]);
//! let set = Expr::words(vec![Expr::literal("set"), Expr::literal("y"), sum]);
//! assert_eq!(set.to_string(), "set y $x + 1");
//!
//! let body = Expr::catch(vec![Expr::words(vec![Expr::literal("open"), Expr::literal("f")])]);
//! assert_eq!(body.to_string(), "catch { open f }");
//! ```

mod formatter;

pub use formatter::{Formatter, DEFAULT_INDENT_WIDTH};

use std::fmt;

use crate::disassembler::Opcode;

/// Operators of Tcl's expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Neq,
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Expon,
    Not,
    Land,
    Lor,
    Bitxor,
    Bitor,
    Bitnot,
    Bitand,
    Lshift,
    Rshift,
    Uminus,
    Uplus,
}

impl Operator {
    /// Source spelling of the operator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Add | Operator::Uplus => "+",
            Operator::Sub | Operator::Uminus => "-",
            Operator::Mult => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Expon => "**",
            Operator::Not => "!",
            Operator::Land => "&&",
            Operator::Lor => "||",
            Operator::Bitxor => "^",
            Operator::Bitor => "|",
            Operator::Bitnot => "~",
            Operator::Bitand => "&",
            Operator::Lshift => "<<",
            Operator::Rshift => ">>",
        }
    }

    /// The operator computed by an expression opcode.
    #[must_use]
    pub fn from_opcode(opcode: Opcode) -> Option<Operator> {
        let operator = match opcode {
            Opcode::Gt => Operator::Gt,
            Opcode::Lt => Operator::Lt,
            Opcode::Ge => Operator::Ge,
            Opcode::Le => Operator::Le,
            Opcode::Eq => Operator::Eq,
            Opcode::Neq => Operator::Neq,
            Opcode::Add => Operator::Add,
            Opcode::Sub => Operator::Sub,
            Opcode::Mult => Operator::Mult,
            Opcode::Div => Operator::Div,
            Opcode::Mod => Operator::Mod,
            Opcode::Expon => Operator::Expon,
            Opcode::Not => Operator::Not,
            Opcode::Land => Operator::Land,
            Opcode::Lor => Operator::Lor,
            Opcode::Bitxor => Operator::Bitxor,
            Opcode::Bitor => Operator::Bitor,
            Opcode::Bitnot => Operator::Bitnot,
            Opcode::Bitand => Operator::Bitand,
            Opcode::Lshift => Operator::Lshift,
            Opcode::Rshift => Operator::Rshift,
            Opcode::Uminus => Operator::Uminus,
            Opcode::Uplus => Operator::Uplus,
            _ => return None,
        };
        Some(operator)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A node of a recovered source fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Text emitted verbatim
    Literal(String),
    /// Arguments joined by a delimiter
    Concat {
        /// Text placed between arguments
        delimiter: String,
        /// The joined parts
        args: Vec<Expr>,
    },
    /// `name(key)`
    ArrayRef {
        /// Array variable
        name: Box<Expr>,
        /// Element key
        key: Box<Expr>,
    },
    /// A braced script or expression body
    Body(Vec<Expr>),
    /// Unary `<op><arg>` or binary `<a> <op> <b>`
    Operation {
        /// The operator
        op: Operator,
        /// One or two operands
        args: Vec<Expr>,
    },
    /// `"value"`
    Quoted(Box<Expr>),
    /// `$name`
    VariableRef(Box<Expr>),
}

impl Expr {
    /// Verbatim text.
    pub fn literal(text: impl Into<String>) -> Expr {
        Expr::Literal(text.into())
    }

    /// A single word, quoted so it survives Tcl's parser.
    #[must_use]
    pub fn word(text: &str) -> Expr {
        Expr::Literal(quote_word(text))
    }

    /// Command-word form: the arguments joined by single spaces.
    #[must_use]
    pub fn words(args: Vec<Expr>) -> Expr {
        Expr::concat(" ", args)
    }

    /// Arguments joined by `delimiter`.
    pub fn concat(delimiter: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Concat {
            delimiter: delimiter.into(),
            args,
        }
    }

    /// `$name`
    #[must_use]
    pub fn var(name: Expr) -> Expr {
        Expr::VariableRef(Box::new(name))
    }

    /// `name(key)`
    #[must_use]
    pub fn array(name: Expr, key: Expr) -> Expr {
        Expr::ArrayRef {
            name: Box::new(name),
            key: Box::new(key),
        }
    }

    /// Operator application.
    #[must_use]
    pub fn op(op: Operator, args: Vec<Expr>) -> Expr {
        Expr::Operation { op, args }
    }

    /// `"value"`
    #[must_use]
    pub fn quoted(value: Expr) -> Expr {
        Expr::Quoted(Box::new(value))
    }

    /// A braced body.
    #[must_use]
    pub fn body(items: Vec<Expr>) -> Expr {
        Expr::Body(items)
    }

    /// `catch { ... }`
    #[must_use]
    pub fn catch(items: Vec<Expr>) -> Expr {
        Expr::words(vec![Expr::literal("catch"), Expr::body(items)])
    }

    /// `[ ... ]` command substitution around a command-word form.
    #[must_use]
    pub fn substitution(command: Expr) -> Expr {
        Expr::concat(
            "",
            vec![Expr::literal("["), command, Expr::literal("]")],
        )
    }

    /// Returns `true` for the space-joined command-word form.
    #[must_use]
    pub fn is_words(&self) -> bool {
        matches!(self, Expr::Concat { delimiter, .. } if delimiter == " ")
    }

    /// Returns the text of a literal node.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Removes one level of enclosing braces from a braced literal word.
    ///
    /// Used where the braces were only quoting, such as the argument of `expr`.
    #[must_use]
    pub fn unbraced(self) -> Expr {
        match &self {
            Expr::Literal(text) if is_braced(text) => {
                Expr::Literal(text[1..text.len() - 1].to_string())
            }
            _ => self,
        }
    }

    /// Renders the expression with the given indentation width.
    #[must_use]
    pub fn render(&self, indent_width: usize) -> String {
        let mut formatter = Formatter::new(indent_width);
        formatter.write_expr(self);
        formatter.finish()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_INDENT_WIDTH))
    }
}

fn is_braced(text: &str) -> bool {
    text.len() >= 2
        && text.starts_with('{')
        && text.ends_with('}')
        && braces_balanced(&text[1..text.len() - 1])
}

fn braces_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    depth == 0 && !escaped
}

/// Quotes `text` so that Tcl parses it back as exactly one word with the same value.
///
/// Plain words are returned unchanged, empty strings become `""`. Words containing whitespace
/// or characters with special meaning are braced when their braces balance, otherwise every
/// special character is backslash-escaped.
///
/// # Examples
///
/// ```rust
/// use tclscope::expr::quote_word;
///
/// assert_eq!(quote_word("puts"), "puts");
/// assert_eq!(quote_word(""), "\"\"");
/// assert_eq!(quote_word("hello world"), "{hello world}");
/// assert_eq!(quote_word("a}b"), "a\\}b");
/// ```
#[must_use]
pub fn quote_word(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }

    let special = |c: char| {
        c.is_whitespace() || matches!(c, '"' | '$' | '[' | ']' | '\\' | '{' | '}' | ';')
    };
    if !text.chars().any(special) && !text.starts_with('#') {
        return text.to_string();
    }

    if braces_balanced(text) {
        return format!("{{{}}}", text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if special(c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    if escaped.starts_with('#') {
        escaped.insert(0, '\\');
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations() {
        let neg = Expr::op(Operator::Uminus, vec![Expr::literal("4")]);
        assert_eq!(neg.to_string(), "-4");

        let power = Expr::op(Operator::Expon, vec![Expr::literal("2"), Expr::literal("8")]);
        assert_eq!(power.to_string(), "2 ** 8");
        assert_eq!(Operator::from_opcode(Opcode::Bitnot), Some(Operator::Bitnot));
        assert_eq!(Operator::from_opcode(Opcode::Push1), None);
    }

    #[test]
    fn references() {
        let element = Expr::var(Expr::array(Expr::literal("env"), Expr::literal("HOME")));
        assert_eq!(element.to_string(), "$env(HOME)");

        let quoted = Expr::quoted(Expr::concat(
            "",
            vec![Expr::literal("id-"), Expr::var(Expr::literal("n"))],
        ));
        assert_eq!(quoted.to_string(), "\"id-$n\"");
    }

    #[test]
    fn substitution() {
        let call = Expr::words(vec![Expr::literal("llength"), Expr::var(Expr::literal("l"))]);
        assert!(call.is_words());
        assert_eq!(Expr::substitution(call).to_string(), "[llength $l]");
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_word("a b"), "{a b}");
        assert_eq!(quote_word("$x"), "{$x}");
        assert_eq!(quote_word("#comment"), "{#comment}");
        assert_eq!(quote_word("{a"), "\\{a");
        assert_eq!(quote_word("x\\"), "x\\\\");
        assert_eq!(quote_word("a b}"), "a\\ b\\}");
    }

    #[test]
    fn unbraced() {
        assert_eq!(
            Expr::word("$x + 1").unbraced(),
            Expr::literal("$x + 1")
        );
        assert_eq!(Expr::literal("{a}{b}").unbraced(), Expr::literal("{a}{b}"));
        assert_eq!(Expr::literal("plain").unbraced(), Expr::literal("plain"));
    }
}
