// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Local arithmetic shortcut.
//!
//! Messages made only of numbers, whitespace, `+ - * / ( )` and `.` are
//! answered locally. The grammar is the usual one:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

/// Whether `message` is a candidate for local evaluation.
pub fn is_arithmetic(message: &str) -> bool {
    let trimmed = message.trim();
    !trimmed.is_empty()
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(c))
}

/// Deepest nesting of unary signs and parentheses the evaluator accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Evaluate `input`. `None` on syntax errors, non-finite results (division
/// by zero included) and nesting deeper than [`MAX_NESTING_DEPTH`].
pub fn evaluate(input: &str) -> Option<f64> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() || !value.is_finite() {
        return None;
    }
    Some(value)
}

/// Render a result the way a calculator would: integers without a decimal
/// point.
pub fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::Open,
                    _ => Token::Close,
                });
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                while let Some(&(idx, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = idx + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(input[start..end].parse().ok()?));
            }
            _ => return None,
        }
    }

    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == Token::Star { value * rhs } else { value / rhs };
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<f64> {
        if self.depth >= MAX_NESTING_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = self.nested_factor();
        self.depth -= 1;
        value
    }

    fn nested_factor(&mut self) -> Option<f64> {
        match self.bump()? {
            Token::Plus => self.factor(),
            Token::Minus => self.factor().map(|v| -v),
            Token::Number(n) => Some(n),
            Token::Open => {
                let value = self.expr()?;
                match self.bump()? {
                    Token::Close => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_arithmetic_messages() {
        assert!(is_arithmetic("2 + 2"));
        assert!(is_arithmetic(" (1.5*4) / 3 "));
        assert!(!is_arithmetic("what is 2 + 2"));
        assert!(!is_arithmetic("()"));
        assert!(!is_arithmetic(""));
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4"), Some(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Some(20.0));
        assert_eq!(evaluate("10 - 4 - 3"), Some(3.0));
        assert_eq!(evaluate("-3 * -(2 + 1)"), Some(9.0));
        assert_eq!(evaluate("7 / 2"), Some(3.5));
    }

    #[test]
    fn test_invalid_expressions() {
        assert_eq!(evaluate("1 +"), None);
        assert_eq!(evaluate("(1 + 2"), None);
        assert_eq!(evaluate("1 2"), None);
        assert_eq!(evaluate("1..2"), None);
        assert_eq!(evaluate("1 / 0"), None);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let unary = format!("{}1", "-".repeat(200_000));
        assert!(is_arithmetic(&unary));
        assert_eq!(evaluate(&unary), None);

        let parens = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(evaluate(&parens), None);

        let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&shallow), Some(1.0));
        assert_eq!(evaluate(&format!("{}1", "-".repeat(10))), Some(1.0));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(4.0), "4");
        assert_eq!(format_result(-12.0), "-12");
        assert_eq!(format_result(3.5), "3.5");
    }
}
