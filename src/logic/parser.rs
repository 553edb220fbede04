//! Parsing of textual logic expressions.
//!
//! Accepts the operator spellings `and`, `&`, `&&`, `or`, `|`, `||` in any
//! letter case, with brackets binding tighter than either and `and` binding
//! tighter than `or`. Brackets need no surrounding whitespace, so `A and(B
//! or C)` reads the same as `A and (B or C)`.
//!
//! Codes are resolved against the owning query after the expression parses,
//! left to right, so a syntax problem is always reported before an unknown
//! code.

use crate::diag::{Diag, Span};
use crate::logic::{Logic, LogicOp};
use smol_str::SmolStr;
use std::fmt;

/// Parses a logic expression, resolving codes through `is_known`.
pub fn parse_logic(
    source: &str,
    is_known: impl Fn(&str) -> bool,
) -> Result<Logic, LogicError> {
    let tokens = tokenize(source);
    if tokens.is_empty() {
        return Err(LogicError::EmptyExpression);
    }
    let mut parser = Parser::new(tokens);
    let logic = parser.parse()?;
    for (code, span) in parser.codes_seen {
        if !is_known(&code) {
            return Err(LogicError::UnknownCode {
                code,
                span,
            });
        }
    }
    Ok(logic)
}

// ============================================================================
// Scanning
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    And,
    Or,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    /// Canonical text: operators normalized, words uppercased.
    text: SmolStr,
    span: Span,
}

/// Splits the expression into words, operators, and brackets. Nothing here
/// can fail: unrecognized character runs come out as words and are caught
/// at resolution time.
fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    text: SmolStr::new("("),
                    span: start..start + 1,
                });
            }
            ')' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    text: SmolStr::new(")"),
                    span: start..start + 1,
                });
            }
            '&' | '|' => {
                chars.next();
                let mut end = start + 1;
                // & and && read the same, as do | and ||
                if let Some(&(next, c)) = chars.peek() {
                    if c == ch {
                        chars.next();
                        end = next + 1;
                    }
                }
                let (kind, text) = if ch == '&' {
                    (TokenKind::And, SmolStr::new("AND"))
                } else {
                    (TokenKind::Or, SmolStr::new("OR"))
                };
                tokens.push(Token {
                    kind,
                    text,
                    span: start..end,
                });
            }
            _ => {
                let mut end = start;
                while let Some(&(pos, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '&' | '|') {
                        break;
                    }
                    chars.next();
                    end = pos + c.len_utf8();
                }
                let word = source[start..end].to_uppercase();
                let kind = match word.as_str() {
                    "AND" => TokenKind::And,
                    "OR" => TokenKind::Or,
                    _ => TokenKind::Word,
                };
                tokens.push(Token {
                    kind,
                    text: SmolStr::new(word),
                    span: start..end,
                });
            }
        }
    }

    tokens
}

// ============================================================================
// Parsing
// ============================================================================

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Codes encountered, left to right, for post-parse resolution.
    codes_seen: Vec<(SmolStr, Span)>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            codes_seen: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<Logic, LogicError> {
        let logic = self.parse_expr(PREC_OR)?;
        match self.peek() {
            None => Ok(logic),
            Some(token) if token.kind == TokenKind::RParen => {
                Err(LogicError::UnmatchedCloseBracket {
                    expression: self.render_all(),
                    span: token.span.clone(),
                })
            }
            Some(token) if token.kind == TokenKind::LParen => {
                Err(LogicError::UnexpectedOpenBracket {
                    after: self.render_consumed(),
                    span: token.span.clone(),
                })
            }
            Some(token) => Err(LogicError::ExpectedOperator {
                after: self.render_consumed(),
                found: token.text.to_string(),
                span: token.span.clone(),
            }),
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Logic, LogicError> {
        let mut left = self.parse_primary()?;
        loop {
            let (op, prec) = match self.peek().map(|t| t.kind) {
                Some(TokenKind::And) => (LogicOp::And, PREC_AND),
                Some(TokenKind::Or) => (LogicOp::Or, PREC_OR),
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_expr(prec + 1)?;
            left = Logic::group(left, op, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Logic, LogicError> {
        let token = match self.peek().cloned() {
            Some(token) => token,
            None => {
                return Err(LogicError::UnexpectedEnd {
                    span: self.end_span(),
                });
            }
        };
        match token.kind {
            TokenKind::Word => {
                self.bump();
                self.codes_seen.push((token.text.clone(), token.span));
                Ok(Logic::Code(token.text))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr(PREC_OR)?;
                match self.peek() {
                    Some(t) if t.kind == TokenKind::RParen => {
                        self.bump();
                        Ok(inner)
                    }
                    Some(t) if t.kind == TokenKind::LParen => {
                        Err(LogicError::UnexpectedOpenBracket {
                            after: self.render_consumed(),
                            span: t.span.clone(),
                        })
                    }
                    Some(t) => Err(LogicError::ExpectedOperator {
                        after: self.render_consumed(),
                        found: t.text.to_string(),
                        span: t.span.clone(),
                    }),
                    None => Err(LogicError::UnmatchedOpenBracket {
                        expression: self.render_all(),
                        span: token.span,
                    }),
                }
            }
            TokenKind::RParen => Err(LogicError::ExpectedCode {
                found: token.text.to_string(),
                span: token.span,
            }),
            TokenKind::And | TokenKind::Or => Err(LogicError::ExpectedCode {
                found: token.text.to_string(),
                span: token.span,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn end_span(&self) -> Span {
        let end = self
            .tokens
            .last()
            .map(|t| t.span.end)
            .unwrap_or_default();
        end..end
    }

    fn render_consumed(&self) -> String {
        self.tokens[..self.pos]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_all(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A logic expression that failed to parse or resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// Nothing but whitespace.
    EmptyExpression,
    /// The expression ended where a code was needed.
    UnexpectedEnd { span: Span },
    /// An operator or closing bracket where a code was needed.
    ExpectedCode { found: String, span: Span },
    /// Two expressions with no operator between them.
    ExpectedOperator {
        after: String,
        found: String,
        span: Span,
    },
    /// An opening bracket directly after an expression.
    UnexpectedOpenBracket { after: String, span: Span },
    UnmatchedOpenBracket { expression: String, span: Span },
    UnmatchedCloseBracket { expression: String, span: Span },
    /// A code the owning query has no constraint for.
    UnknownCode { code: SmolStr, span: Span },
}

impl LogicError {
    pub fn span(&self) -> Span {
        match self {
            LogicError::EmptyExpression => 0..0,
            LogicError::UnexpectedEnd { span }
            | LogicError::ExpectedCode { span, .. }
            | LogicError::ExpectedOperator { span, .. }
            | LogicError::UnexpectedOpenBracket { span, .. }
            | LogicError::UnmatchedOpenBracket { span, .. }
            | LogicError::UnmatchedCloseBracket { span, .. }
            | LogicError::UnknownCode { span, .. } => span.clone(),
        }
    }

    pub fn to_diag(&self) -> Diag {
        let (code, label) = match self {
            LogicError::EmptyExpression => ("logic::empty", "nothing to parse"),
            LogicError::UnexpectedEnd { .. } => ("logic::syntax", "expression ends here"),
            LogicError::ExpectedCode { .. } => ("logic::syntax", "operator without a code"),
            LogicError::ExpectedOperator { .. } => ("logic::syntax", "no operator before this"),
            LogicError::UnexpectedOpenBracket { .. } => {
                ("logic::brackets", "bracket out of place")
            }
            LogicError::UnmatchedOpenBracket { .. } => ("logic::brackets", "never closed"),
            LogicError::UnmatchedCloseBracket { .. } => ("logic::brackets", "never opened"),
            LogicError::UnknownCode { .. } => ("logic::code", "not a constraint code"),
        };
        let mut diag = Diag::error(self.to_string())
            .with_primary_label(self.span(), label)
            .with_code(code);
        if matches!(self, LogicError::ExpectedOperator { .. }) {
            diag = diag.with_help("join codes with 'and' or 'or'");
        }
        diag
    }
}

impl fmt::Display for LogicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicError::EmptyExpression => f.write_str("Empty logic expression"),
            LogicError::UnexpectedEnd { .. } => {
                f.write_str("Expected a constraint code - but the expression ended")
            }
            LogicError::ExpectedCode { found, .. } => {
                write!(f, "Expected a constraint code - but got: '{found}'")
            }
            LogicError::ExpectedOperator { after, found, .. } => {
                write!(f, "Expected an operator after: '{after}' - but got: '{found}'")
            }
            LogicError::UnexpectedOpenBracket { after, .. } => write!(
                f,
                "Logic grouping error after: '{after}' - got an unexpected opening bracket"
            ),
            LogicError::UnmatchedOpenBracket { expression, .. } => {
                write!(f, "Unmatched opening bracket in: \"{expression}\"")
            }
            LogicError::UnmatchedCloseBracket { expression, .. } => {
                write!(f, "Unmatched closing bracket in: \"{expression}\"")
            }
            LogicError::UnknownCode { code, .. } => {
                write!(f, "There is no constraint with the code '{code}' on this query")
            }
        }
    }
}

impl std::error::Error for LogicError {}
