//! Assembling recognized symbols into text, and evaluating that text.
//!
//! Evaluation is a closed arithmetic grammar, never general code execution:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | call
//! call   := atom ('(' expr? ')')*
//! atom   := number | '(' expr ')'
//! ```
//!
//! Operator chains and call suffixes are stored flat and evaluated in a loop,
//! so only parentheses and unary signs add nesting, and both are capped.
//!
//! A call parses but always fails at evaluation time, so `2(3)` reports the
//! same "not callable" error a dynamic evaluator would instead of a syntax error.

use std::fmt;
use std::sync::OnceLock;

use inkcalc_vision::Symbol;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const INVALID_SYNTAX: &str = "invalid syntax";
const UNCLOSED_PAREN: &str = "'(' was never closed";
const UNMATCHED_PAREN: &str = "unmatched ')'";
const LEADING_ZEROS: &str =
    "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers";
const TOO_DEEP: &str = "too many nested parentheses";

/// Parser recursion limit; unary chains count toward it as well.
const MAX_DEPTH: usize = 200;

static EQUATION_CHARSET: OnceLock<Regex> = OnceLock::new();

fn equation_charset() -> &'static Regex {
    EQUATION_CHARSET.get_or_init(|| {
        Regex::new(r"^[0-9+\-*/().\s]+$").expect("equation charset pattern is valid")
    })
}

/// A computed value.
///
/// Integers are exact only within `i64`. A literal or an intermediate result
/// outside that range continues as an `f64` and loses precision, so
/// `99999999999999999999+1` yields `1e20`. Values beyond `f64` range are
/// rejected with [`EvalError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Collapses a float with no fractional part into an integer.
    pub fn normalized(self) -> Self {
        match self {
            Number::Float(f)
                if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Number::Int(f as i64)
            }
            other => other,
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            Number::Int(_) => "int",
            Number::Float(_) => "float",
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Invalid equation format")]
    InvalidFormat,
    #[error("{0}")]
    Syntax(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),
    #[error("numerical result out of range")]
    Overflow,
}

/// Joins glyphs left to right with no separators.
pub fn assemble(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.glyph).collect()
}

/// Maps display operators to ASCII, drops whitespace, cuts at the first `=`
/// and removes `?` placeholders.
pub fn sanitize(expression: &str) -> String {
    let normalized: String = expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            '−' => '-',
            other => other,
        })
        .collect();
    let lhs = normalized
        .split_once('=')
        .map_or(normalized.as_str(), |(lhs, _)| lhs);
    lhs.replace('?', "")
}

pub fn evaluate(expression: &str) -> Result<Number, EvalError> {
    let text = sanitize(expression);
    if !equation_charset().is_match(&text) {
        return Err(EvalError::InvalidFormat);
    }
    let tokens = tokenize(&text)?;
    let ast = Parser::new(&tokens).parse()?;
    Ok(eval(&ast)?.normalized())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => {
                depth += 1;
                Token::LParen
            }
            b')' => {
                depth = depth.checked_sub(1).ok_or(EvalError::Syntax(UNMATCHED_PAREN))?;
                Token::RParen
            }
            b'0'..=b'9' | b'.' => {
                let (number, end) = number_literal(text, i)?;
                tokens.push(Token::Num(number));
                i = end;
                continue;
            }
            _ => return Err(EvalError::Syntax(INVALID_SYNTAX)),
        };
        tokens.push(token);
        i += 1;
    }

    if depth > 0 {
        return Err(EvalError::Syntax(UNCLOSED_PAREN));
    }
    Ok(tokens)
}

/// Reads `digits ['.' digits]` or `'.' digits` starting at `start`.
fn number_literal(text: &str, start: usize) -> Result<(Number, usize), EvalError> {
    let bytes = text.as_bytes();
    let skip_digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = skip_digits(start);
    let is_float = end < bytes.len() && bytes[end] == b'.';
    if is_float {
        end = skip_digits(end + 1);
    }
    let literal = &text[start..end];

    if literal == "." {
        return Err(EvalError::Syntax(INVALID_SYNTAX));
    }
    let parse_float = || -> Result<Number, EvalError> {
        let value: f64 = literal.parse().map_err(|_| EvalError::Syntax(INVALID_SYNTAX))?;
        finite(Number::Float(value))
    };
    let number = if is_float {
        parse_float()?
    } else {
        if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
            return Err(EvalError::Syntax(LEADING_ZEROS));
        }
        match literal.parse::<i64>() {
            Ok(i) => Number::Int(i),
            // Wider than i64: keep the magnitude as a float.
            Err(_) => parse_float()?,
        }
    };
    Ok((number, end))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(Number),
    Pos(Box<Expr>),
    Neg(Box<Expr>),
    /// `first (op operand)*`, folded left to right.
    Chain(Box<Expr>, Vec<(Op, Expr)>),
    /// A callee followed by one or more `(...)` suffixes.
    Call(Box<Expr>, Vec<Option<Expr>>),
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<Expr, EvalError> {
        let expr = self.expr()?;
        if self.pos != self.tokens.len() {
            return Err(EvalError::Syntax(INVALID_SYNTAX));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Syntax(TOO_DEEP));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        self.chain(Self::term, |token| match token {
            Token::Plus => Some(Op::Add),
            Token::Minus => Some(Op::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        self.chain(Self::unary, |token| match token {
            Token::Star => Some(Op::Mul),
            Token::Slash => Some(Op::Div),
            _ => None,
        })
    }

    fn chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, EvalError>,
        operator: fn(Token) -> Option<Op>,
    ) -> Result<Expr, EvalError> {
        let first = operand(self)?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            rest.push((op, operand(self)?));
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Expr::Chain(Box::new(first), rest))
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let wrap: fn(Box<Expr>) -> Expr = match self.peek() {
            Some(Token::Plus) => Expr::Pos,
            Some(Token::Minus) => Expr::Neg,
            _ => return self.call(),
        };
        self.pos += 1;
        self.descend()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(wrap(Box::new(operand)))
    }

    fn call(&mut self) -> Result<Expr, EvalError> {
        let callee = self.atom()?;
        let mut suffixes = Vec::new();
        while self.peek() == Some(Token::LParen) {
            self.pos += 1;
            let argument = if self.peek() == Some(Token::RParen) {
                None
            } else {
                Some(self.nested()?)
            };
            self.expect_close()?;
            suffixes.push(argument);
        }
        if suffixes.is_empty() {
            return Ok(callee);
        }
        Ok(Expr::Call(Box::new(callee), suffixes))
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                let inner = self.nested()?;
                self.expect_close()?;
                Ok(inner)
            }
            _ => Err(EvalError::Syntax(INVALID_SYNTAX)),
        }
    }

    fn nested(&mut self) -> Result<Expr, EvalError> {
        self.descend()?;
        let inner = self.expr()?;
        self.depth -= 1;
        Ok(inner)
    }

    fn expect_close(&mut self) -> Result<(), EvalError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            _ => Err(EvalError::Syntax(INVALID_SYNTAX)),
        }
    }
}

fn eval(expr: &Expr) -> Result<Number, EvalError> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Pos(operand) => eval(operand),
        Expr::Neg(operand) => Ok(match eval(operand)? {
            Number::Int(i) => i.checked_neg().map_or(Number::Float(-(i as f64)), Number::Int),
            Number::Float(f) => Number::Float(-f),
        }),
        Expr::Chain(first, rest) => rest
            .iter()
            .try_fold(eval(first)?, |acc, (op, operand)| apply(*op, acc, eval(operand)?)),
        Expr::Call(callee, suffixes) => {
            let callee = eval(callee)?;
            // The first call already fails; later suffixes are never reached.
            if let Some(Some(argument)) = suffixes.first() {
                eval(argument)?;
            }
            Err(EvalError::NotCallable(callee.type_name()))
        }
    }
}

fn apply(op: Op, lhs: Number, rhs: Number) -> Result<Number, EvalError> {
    let value = match op {
        Op::Add => int_or_float(lhs, rhs, i64::checked_add, |a, b| a + b),
        Op::Sub => int_or_float(lhs, rhs, i64::checked_sub, |a, b| a - b),
        Op::Mul => int_or_float(lhs, rhs, i64::checked_mul, |a, b| a * b),
        Op::Div => {
            let divisor = rhs.as_f64();
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Number::Float(lhs.as_f64() / divisor)
        }
    };
    finite(value)
}

fn finite(value: Number) -> Result<Number, EvalError> {
    match value {
        Number::Float(f) if !f.is_finite() => Err(EvalError::Overflow),
        other => Ok(other),
    }
}

/// Integer arithmetic while both sides are integers and the result fits,
/// float arithmetic otherwise.
fn int_or_float(
    lhs: Number,
    rhs: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    if let (Number::Int(a), Number::Int(b)) = (lhs, rhs) {
        if let Some(value) = int_op(a, b) {
            return Number::Int(value);
        }
    }
    Number::Float(float_op(lhs.as_f64(), rhs.as_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkcalc_vision::BoundingBox;

    fn symbol(glyph: &'static str, x: u32) -> Symbol {
        Symbol {
            glyph,
            bounding_box: BoundingBox::new(x, 0, 12, 20),
        }
    }

    #[test]
    fn test_assemble_keeps_order_without_separators() {
        let symbols = [symbol("1", 0), symbol("2", 20), symbol("×", 40), symbol("3", 60)];
        assert_eq!(assemble(&symbols), "12×3");
        assert_eq!(assemble(&[]), "");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("12 + 3 = ?"), "12+3");
        assert_eq!(sanitize("6÷2×4"), "6/2*4");
        assert_eq!(sanitize("7−2"), "7-2");
        assert_eq!(sanitize("1+1=2=3"), "1+1");
        assert_eq!(sanitize("?4?+1"), "4+1");
    }

    #[test]
    fn test_integer_results() {
        assert_eq!(evaluate("12+3=?"), Ok(Number::Int(15)));
        assert_eq!(evaluate("6÷2"), Ok(Number::Int(3)));
        assert_eq!(evaluate("2+3×4"), Ok(Number::Int(14)));
        assert_eq!(evaluate("(2+3)×4"), Ok(Number::Int(20)));
        assert_eq!(evaluate("1-2"), Ok(Number::Int(-1)));
    }

    #[test]
    fn test_float_results() {
        assert_eq!(evaluate("7/2"), Ok(Number::Float(3.5)));
        assert_eq!(evaluate("1.5+1"), Ok(Number::Float(2.5)));
        assert_eq!(evaluate(".5+.25"), Ok(Number::Float(0.75)));
        assert_eq!(evaluate("5.*2"), Ok(Number::Int(10)));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(evaluate("-3+5"), Ok(Number::Int(2)));
        assert_eq!(evaluate("2--3"), Ok(Number::Int(5)));
        assert_eq!(evaluate("2*-3"), Ok(Number::Int(-6)));
        assert_eq!(evaluate("+-+4"), Ok(Number::Int(-4)));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(evaluate("10-4-3"), Ok(Number::Int(3)));
        assert_eq!(evaluate("16/4/2"), Ok(Number::Int(2)));
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(evaluate("12+x"), Err(EvalError::InvalidFormat));
        assert_eq!(evaluate("=?"), Err(EvalError::InvalidFormat));
        assert_eq!(evaluate(""), Err(EvalError::InvalidFormat));
        assert_eq!(EvalError::InvalidFormat.to_string(), "Invalid equation format");
    }

    #[test]
    fn test_division_by_zero() {
        let err = evaluate("5/0").unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
        assert_eq!(err.to_string(), "division by zero");
        assert_eq!(evaluate("5÷(2-2.0)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(evaluate("1+"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("×3"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("2**3"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("8//2"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("()"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("1.2.3"), Err(EvalError::Syntax(INVALID_SYNTAX)));
        assert_eq!(evaluate("."), Err(EvalError::Syntax(INVALID_SYNTAX)));
    }

    #[test]
    fn test_parenthesis_errors() {
        assert_eq!(evaluate("(1+2"), Err(EvalError::Syntax(UNCLOSED_PAREN)));
        assert_eq!(evaluate("1+2)"), Err(EvalError::Syntax(UNMATCHED_PAREN)));
        assert_eq!(evaluate(")("), Err(EvalError::Syntax(UNMATCHED_PAREN)));
    }

    #[test]
    fn test_syntax_is_checked_before_evaluation() {
        assert_eq!(evaluate("1/0+"), Err(EvalError::Syntax(INVALID_SYNTAX)));
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(evaluate("012+1"), Err(EvalError::Syntax(LEADING_ZEROS)));
        assert_eq!(evaluate("00+1"), Ok(Number::Int(1)));
        assert_eq!(evaluate("0.5*4"), Ok(Number::Int(2)));
    }

    #[test]
    fn test_implicit_multiplication_is_not_callable() {
        assert_eq!(evaluate("2(3)"), Err(EvalError::NotCallable("int")));
        assert_eq!(evaluate("2.5()"), Err(EvalError::NotCallable("float")));
        assert_eq!(evaluate("2(1/0)"), Err(EvalError::DivisionByZero));
        assert_eq!(
            EvalError::NotCallable("int").to_string(),
            "'int' object is not callable"
        );
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let big = format!("{}+1", i64::MAX);
        assert!(matches!(evaluate(&big), Ok(Number::Float(_))));
    }

    #[test]
    fn test_huge_values_are_out_of_range() {
        let wide = "9".repeat(400);
        assert_eq!(evaluate(&wide), Err(EvalError::Overflow));

        let product = format!("{0}*{0}", "9".repeat(200));
        assert_eq!(evaluate(&product), Err(EvalError::Overflow));
        assert_eq!(
            EvalError::Overflow.to_string(),
            "numerical result out of range"
        );

        let wider_than_i64 = format!("{}+1", "9".repeat(20));
        assert_eq!(evaluate(&wider_than_i64), Ok(Number::Float(1e20)));
    }

    #[test]
    fn test_long_sum_is_evaluated_iteratively() {
        let sum = vec!["1"; 100_000].join("+");
        assert_eq!(evaluate(&sum), Ok(Number::Int(100_000)));

        let alternating = vec!["2*3"; 10_000].join("-");
        assert_eq!(evaluate(&alternating), Ok(Number::Int(6 - 6 * 9_999)));
    }

    #[test]
    fn test_long_call_chain_is_not_callable() {
        let calls = format!("2{}", "()".repeat(200_000));
        assert_eq!(evaluate(&calls), Err(EvalError::NotCallable("int")));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(evaluate(&deep), Err(EvalError::Syntax(TOO_DEEP)));
        let fine = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(evaluate(&fine), Ok(Number::Int(1)));
    }

    #[test]
    fn test_number_serialization() {
        assert_eq!(serde_json::to_string(&Number::Int(15)).unwrap(), "15");
        assert_eq!(serde_json::to_string(&Number::Float(2.5)).unwrap(), "2.5");
        assert_eq!(Number::Float(15.0).normalized(), Number::Int(15));
        assert_eq!(Number::Float(1e300).normalized(), Number::Float(1e300));
    }
}
