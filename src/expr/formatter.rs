//! Text rendering of [`Expr`] trees.

use crate::expr::Expr;

/// Spaces per nesting level when nothing else is configured.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Accumulates rendered source text and tracks the indentation of nested bodies.
///
/// # Examples
///
/// ```rust
/// use tclscope::expr::{Expr, Formatter};
///
/// let body = Expr::body(vec![Expr::literal("a"), Expr::literal("b")]);
/// let mut formatter = Formatter::new(2);
/// formatter.write_str("if 1 ");
/// formatter.write_expr(&body);
/// assert_eq!(formatter.finish(), "if 1 {\n  a\n  b\n}");
/// ```
#[derive(Debug, Clone)]
pub struct Formatter {
    out: String,
    level: usize,
    indent_width: usize,
    start_of_line: bool,
}

impl Formatter {
    /// Creates an empty formatter.
    #[must_use]
    pub fn new(indent_width: usize) -> Self {
        Formatter {
            out: String::new(),
            level: 0,
            indent_width,
            start_of_line: true,
        }
    }

    /// Appends text. Every line that starts inside `text` is indented to the current level.
    pub fn write_str(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.write_line_part(first);
        }
        for line in lines {
            self.newline();
            self.write_line_part(line);
        }
    }

    /// Ends the current line.
    pub fn newline(&mut self) {
        self.out.push('\n');
        self.start_of_line = true;
    }

    /// Increases the nesting level by one.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decreases the nesting level by one.
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Renders an expression tree.
    pub fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(text) => self.write_str(text),
            Expr::Concat { delimiter, args } => {
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        self.write_str(delimiter);
                    }
                    self.write_expr(arg);
                }
            }
            Expr::ArrayRef { name, key } => {
                self.write_expr(name);
                self.write_str("(");
                self.write_expr(key);
                self.write_str(")");
            }
            Expr::Body(items) => self.write_body(items),
            Expr::Operation { op, args } => match args.as_slice() {
                [operand] => {
                    self.write_str(op.symbol());
                    self.write_expr(operand);
                }
                [left, right, ..] => {
                    self.write_expr(left);
                    self.write_str(" ");
                    self.write_str(op.symbol());
                    self.write_str(" ");
                    self.write_expr(right);
                }
                [] => self.write_str(op.symbol()),
            },
            Expr::Quoted(value) => {
                self.write_str("\"");
                self.write_expr(value);
                self.write_str("\"");
            }
            Expr::VariableRef(name) => {
                self.write_str("$");
                self.write_expr(name);
            }
        }
    }

    /// Consumes the formatter and returns the rendered text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn write_body(&mut self, items: &[Expr]) {
        match items {
            [] => self.write_str("{}"),
            [item] => {
                self.write_str("{ ");
                self.write_expr(item);
                self.write_str(" }");
            }
            _ => {
                self.write_str("{");
                self.newline();
                self.indent();
                for item in items {
                    self.write_expr(item);
                    self.newline();
                }
                self.unindent();
                self.write_str("}");
            }
        }
    }

    fn write_line_part(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.start_of_line {
            self.out.push_str(&" ".repeat(self.level * self.indent_width));
            self.start_of_line = false;
        }
        self.out.push_str(text);
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::new(DEFAULT_INDENT_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Expr {
        Expr::words(items.iter().map(|item| Expr::literal(*item)).collect())
    }

    #[test]
    fn single_item_body() {
        let expr = Expr::words(vec![
            Expr::literal("expr"),
            Expr::body(vec![Expr::literal("$a > 0")]),
        ]);
        assert_eq!(expr.to_string(), "expr { $a > 0 }");
    }

    #[test]
    fn nested_bodies() {
        let inner = Expr::catch(vec![words(&["open", "f"]), words(&["close", "f"])]);
        let outer = Expr::catch(vec![inner, words(&["puts", "done"])]);

        assert_eq!(
            outer.to_string(),
            "catch {\n    catch {\n        open f\n        close f\n    }\n    puts done\n}"
        );
    }

    #[test]
    fn multiline_literal_is_reindented() {
        let body = Expr::body(vec![Expr::literal("a {\n  b\n}"), Expr::literal("c")]);
        assert_eq!(body.render(2), "{\n  a {\n    b\n  }\n  c\n}");
    }

    #[test]
    fn empty_body() {
        assert_eq!(Expr::catch(Vec::new()).to_string(), "catch {}");
    }
}
