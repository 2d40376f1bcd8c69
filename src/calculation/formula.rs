//! Rate formula expression language.
//!
//! A formula is a small arithmetic expression over four bound variables:
//! `ORP`, `HRP`, `TOH` and `multiplier`. Supported syntax is numeric
//! literals, `+ - * /` (with `×` and `x` accepted for multiplication),
//! unary minus and parentheses. Nothing else is evaluated.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

const MAX_DEPTH: usize = 32;

/// A variable a formula may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormulaVar {
    /// Ordinary rate of pay.
    Orp,
    /// Hourly rate of pay.
    Hrp,
    /// Total overtime hours.
    Toh,
    /// The formula's multiplier.
    Multiplier,
}

impl FormulaVar {
    fn from_word(word: &str) -> Option<FormulaVar> {
        match word.to_ascii_lowercase().as_str() {
            "orp" => Some(FormulaVar::Orp),
            "hrp" => Some(FormulaVar::Hrp),
            "toh" => Some(FormulaVar::Toh),
            "multiplier" => Some(FormulaVar::Multiplier),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FormulaVar::Orp => "ORP",
            FormulaVar::Hrp => "HRP",
            FormulaVar::Toh => "TOH",
            FormulaVar::Multiplier => "multiplier",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

/// Values bound to the formula variables for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaBindings {
    /// Ordinary rate of pay.
    pub orp: Decimal,
    /// Hourly rate of pay.
    pub hrp: Decimal,
    /// Total overtime hours.
    pub toh: Decimal,
    /// The formula's multiplier.
    pub multiplier: Decimal,
}

impl FormulaBindings {
    fn get(&self, var: FormulaVar) -> Decimal {
        match var {
            FormulaVar::Orp => self.orp,
            FormulaVar::Hrp => self.hrp,
            FormulaVar::Toh => self.toh,
            FormulaVar::Multiplier => self.multiplier,
        }
    }
}

/// A parsed formula.
///
/// # Example
///
/// ```
/// use otms_engine::calculation::{FormulaBindings, FormulaExpr};
/// use rust_decimal::Decimal;
///
/// let expr = FormulaExpr::parse("multiplier × HRP × TOH").unwrap();
/// let bindings = FormulaBindings {
///     orp: Decimal::new(100, 0),
///     hrp: Decimal::new(1250, 2),
///     toh: Decimal::new(2, 0),
///     multiplier: Decimal::new(15, 1),
/// };
/// assert_eq!(expr.evaluate(&bindings).unwrap(), Decimal::new(375, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FormulaExpr {
    /// A numeric literal.
    Number(Decimal),
    /// A bound variable.
    Var(FormulaVar),
    /// Unary minus.
    Neg(Box<FormulaExpr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<FormulaExpr>,
        /// Right operand.
        rhs: Box<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// The canonical `multiplier × HRP × TOH` formula.
    pub fn canonical() -> FormulaExpr {
        FormulaExpr::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(FormulaExpr::Binary {
                op: BinaryOp::Mul,
                lhs: Box::new(FormulaExpr::Var(FormulaVar::Multiplier)),
                rhs: Box::new(FormulaExpr::Var(FormulaVar::Hrp)),
            }),
            rhs: Box::new(FormulaExpr::Var(FormulaVar::Toh)),
        }
    }

    /// Parses formula text. Blank text yields [`FormulaExpr::canonical`].
    pub fn parse(text: &str) -> EngineResult<FormulaExpr> {
        if text.trim().is_empty() {
            return Ok(FormulaExpr::canonical());
        }
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            text,
            tokens,
            pos: 0,
        };
        let expr = parser.expr(0)?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected {}", token.describe())));
        }
        Ok(expr)
    }

    /// Evaluates the expression with checked decimal arithmetic.
    pub fn evaluate(&self, bindings: &FormulaBindings) -> EngineResult<Decimal> {
        match self {
            FormulaExpr::Number(n) => Ok(*n),
            FormulaExpr::Var(v) => Ok(bindings.get(*v)),
            FormulaExpr::Neg(inner) => Ok(-inner.evaluate(bindings)?),
            FormulaExpr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(bindings)?;
                let r = rhs.evaluate(bindings)?;
                let value = match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div if r.is_zero() => {
                        return Err(EngineError::InvalidFormula {
                            formula: self.to_string(),
                            message: "division by zero".to_string(),
                        });
                    }
                    BinaryOp::Div => l.checked_div(r),
                };
                value.ok_or_else(|| EngineError::InvalidFormula {
                    formula: self.to_string(),
                    message: "arithmetic overflow".to_string(),
                })
            }
        }
    }

    /// Returns true if the expression references `var`.
    pub fn references(&self, var: FormulaVar) -> bool {
        match self {
            FormulaExpr::Number(_) => false,
            FormulaExpr::Var(v) => *v == var,
            FormulaExpr::Neg(inner) => inner.references(var),
            FormulaExpr::Binary { lhs, rhs, .. } => lhs.references(var) || rhs.references(var),
        }
    }
}

impl std::fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n.normalize()),
            FormulaExpr::Var(v) => f.write_str(v.name()),
            FormulaExpr::Neg(inner) => write!(f, "-{}", inner),
            FormulaExpr::Binary { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.symbol(), rhs)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Var(FormulaVar),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Var(v) => format!("variable {}", v.name()),
            Token::Op(op) => format!("operator '{}'", op.symbol()),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(text: &str) -> EngineResult<Vec<Token>> {
    let err = |message: String| EngineError::InvalidFormula {
        formula: text.to_string(),
        message,
    };

    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '×' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Op(BinaryOp::Add),
                    '-' => Token::Op(BinaryOp::Sub),
                    '/' => Token::Op(BinaryOp::Div),
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    _ => Token::Op(BinaryOp::Mul),
                });
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[start..end];
                let value = literal
                    .parse::<Decimal>()
                    .map_err(|_| err(format!("invalid number '{}'", literal)))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &text[start..end];
                if word.eq_ignore_ascii_case("x") {
                    tokens.push(Token::Op(BinaryOp::Mul));
                } else {
                    let var = FormulaVar::from_word(word)
                        .ok_or_else(|| err(format!("unknown variable '{}'", word)))?;
                    tokens.push(Token::Var(var));
                }
            }
            other => return Err(err(format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, message: String) -> EngineError {
        EngineError::InvalidFormula {
            formula: self.text.to_string(),
            message,
        }
    }

    fn expr(&mut self, depth: usize) -> EngineResult<FormulaExpr> {
        let mut lhs = self.term(depth)?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term(depth)?;
            lhs = FormulaExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self, depth: usize) -> EngineResult<FormulaExpr> {
        let mut lhs = self.factor(depth)?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.factor(depth)?;
            lhs = FormulaExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self, depth: usize) -> EngineResult<FormulaExpr> {
        if depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply".to_string()));
        }
        match self.advance() {
            Some(Token::Number(n)) => Ok(FormulaExpr::Number(n)),
            Some(Token::Var(v)) => Ok(FormulaExpr::Var(v)),
            Some(Token::Op(BinaryOp::Sub)) => {
                Ok(FormulaExpr::Neg(Box::new(self.factor(depth + 1)?)))
            }
            Some(Token::LParen) => {
                let inner = self.expr(depth + 1)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("missing ')'".to_string())),
                }
            }
            Some(token) => Err(self.error(format!("unexpected {}", token.describe()))),
            None => Err(self.error("unexpected end of formula".to_string())),
        }
    }
}
