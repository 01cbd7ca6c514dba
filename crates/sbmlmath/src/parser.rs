use crate::kind::AstKind;
use crate::lexer::{tokenize, LexError, Token, TokenKind};
use crate::node::{AstNode, NodeError};
use crate::options::ConversionOptions;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("unexpected token at {pos}: expected {expected}, got {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
    },
    #[error("empty expression")]
    EmptyExpression,
    #[error("`{name}` at {pos} cannot take {count} arguments")]
    Arity {
        name: String,
        count: usize,
        pos: usize,
    },
    #[error("invalid number literal at {pos}: {literal}")]
    InvalidNumber { literal: String, pos: usize },
    #[error("expression nested deeper than {limit} at {pos}")]
    DepthExceeded { limit: usize, pos: usize },
}

impl ParseError {
    /// Character offset the error points at, when there is one.
    pub fn pos(&self) -> Option<usize> {
        match self {
            ParseError::Lex(LexError::UnexpectedCharacter { pos, .. })
            | ParseError::UnexpectedToken { pos, .. }
            | ParseError::Arity { pos, .. }
            | ParseError::InvalidNumber { pos, .. }
            | ParseError::DepthExceeded { pos, .. } => Some(*pos),
            ParseError::EmptyExpression => None,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    max_depth: usize,
}

pub fn parse_formula(input: &str) -> Result<AstNode, ParseError> {
    parse_formula_with_options(input, &ConversionOptions::default())
}

pub fn parse_formula_with_options(
    input: &str,
    options: &ConversionOptions,
) -> Result<AstNode, ParseError> {
    tracing::debug!(len = input.len(), "parsing infix formula");
    let tokens = tokenize(input)?;
    Parser::new(tokens, options.max_depth).parse()
}

impl Parser {
    pub fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
            max_depth,
        }
    }

    pub fn parse(mut self) -> Result<AstNode, ParseError> {
        if self.check(TokenKind::Eof) {
            return Err(ParseError::EmptyExpression);
        }
        let expression = self.parse_expr()?;
        self.expect(TokenKind::Eof)?;
        Ok(expression)
    }

    /// `expr := term (("+"|"-") term)*`; a run of `+` collects into one node.
    fn parse_expr(&mut self) -> Result<AstNode, ParseError> {
        self.enter()?;
        let mut node = self.parse_term()?;
        let mut open_sum = false;
        loop {
            let pos = self.peek().pos;
            let kind = if self.match_kind(TokenKind::Plus) {
                AstKind::Plus
            } else if self.match_kind(TokenKind::Minus) {
                AstKind::Minus
            } else {
                break;
            };
            let right = self.parse_term()?;
            if kind == AstKind::Plus && open_sum {
                node.add_child(right).map_err(|err| arity_error(kind, pos, err))?;
            } else {
                node = build(kind, vec![node, right], pos)?;
                open_sum = kind == AstKind::Plus;
            }
        }
        self.leave();
        Ok(node)
    }

    /// `term := factor (("*"|"/") factor)*`; a run of `*` collects into one node.
    fn parse_term(&mut self) -> Result<AstNode, ParseError> {
        let mut node = self.parse_factor()?;
        let mut open_product = false;
        loop {
            let pos = self.peek().pos;
            let kind = if self.match_kind(TokenKind::Star) {
                AstKind::Times
            } else if self.match_kind(TokenKind::Slash) {
                AstKind::Divide
            } else {
                break;
            };
            let right = self.parse_factor()?;
            if kind == AstKind::Times && open_product {
                node.add_child(right).map_err(|err| arity_error(kind, pos, err))?;
            } else {
                node = build(kind, vec![node, right], pos)?;
                open_product = kind == AstKind::Times;
            }
        }
        Ok(node)
    }

    /// `factor := unary ("^" factor)?`
    fn parse_factor(&mut self) -> Result<AstNode, ParseError> {
        let base = self.parse_unary()?;
        let pos = self.peek().pos;
        if !self.match_kind(TokenKind::Caret) {
            return Ok(base);
        }
        self.enter()?;
        let exponent = self.parse_factor()?;
        self.leave();
        build(AstKind::Power, vec![base, exponent], pos)
    }

    /// `unary := "-" unary | atom`; a minus directly before a number is
    /// part of the literal.
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        if !self.check(TokenKind::Minus) {
            return self.parse_atom();
        }
        let minus = self.advance();
        let next = self.peek().clone();
        if is_number_token(next.kind) {
            self.advance();
            return number_node(&next, true);
        }
        if next.kind == TokenKind::Identifier
            && infinity_name(&next.lexeme)
            && !self.check_at(1, TokenKind::LParen)
        {
            self.advance();
            return Ok(AstNode::real(f64::NEG_INFINITY));
        }
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        build(AstKind::Minus, vec![operand], minus.pos)
    }

    fn parse_atom(&mut self) -> Result<AstNode, ParseError> {
        if let Some(rational) = self.try_rational()? {
            return Ok(rational);
        }
        let token = self.advance();
        match token.kind {
            TokenKind::Integer | TokenKind::Real | TokenKind::RealE => number_node(&token, false),
            TokenKind::Identifier if self.check(TokenKind::LParen) => self.parse_call(token),
            TokenKind::Identifier => Ok(identifier_node(&token.lexeme)),
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "number, name or `(`".to_string(),
                found: describe(&token),
                pos: token.pos,
            }),
        }
    }

    fn parse_call(&mut self, name: Token) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.match_kind(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let Some(kind) = AstKind::from_function_name(&name.lexeme) else {
            return Ok(AstNode::function(name.lexeme, args));
        };
        let single_argument_alias = matches!(name.lexeme.as_str(), "sqrt" | "log10");
        if !kind.arity().allows(args.len()) || (single_argument_alias && args.len() != 1) {
            return Err(ParseError::Arity {
                name: name.lexeme,
                count: args.len(),
                pos: name.pos,
            });
        }
        if kind == AstKind::Lambda {
            if let Some(bound) = args[..args.len() - 1]
                .iter()
                .find(|arg| arg.kind() != AstKind::Name)
            {
                return Err(ParseError::UnexpectedToken {
                    expected: "bound variable name".to_string(),
                    found: bound.kind().to_string(),
                    pos: name.pos,
                });
            }
        }

        let mut node = build(kind, args, name.pos)?;
        if matches!(kind, AstKind::Delay | AstKind::RateOf) {
            if let Some(keyword) = kind.infix_keyword() {
                node.set_name(keyword).map_err(|err| arity_error(kind, name.pos, err))?;
            }
        }
        Ok(node)
    }

    /// `(n/d)` written without spaces is a rational literal; anything
    /// else starting with `(` is a grouped expression.
    fn try_rational(&mut self) -> Result<Option<AstNode>, ParseError> {
        if !self.check(TokenKind::LParen) {
            return Ok(None);
        }
        let mut cursor = self.index + 1;
        let numerator = self.adjacent_integer(&mut cursor);
        let Some(numerator) = numerator else {
            return Ok(None);
        };
        if !self.adjacent_kind(&mut cursor, TokenKind::Slash) {
            return Ok(None);
        }
        let Some(denominator) = self.adjacent_integer(&mut cursor) else {
            return Ok(None);
        };
        if !self.adjacent_kind(&mut cursor, TokenKind::RParen) {
            return Ok(None);
        }

        let numerator = parse_i64(&numerator.0, numerator.1)?;
        let denominator = parse_i64(&denominator.0, denominator.1)?;
        self.index = cursor;
        Ok(Some(AstNode::rational(numerator, denominator)))
    }

    /// Reads an optionally signed integer literal touching the previous
    /// token; returns its text and position.
    fn adjacent_integer(&self, cursor: &mut usize) -> Option<(String, usize)> {
        let mut at = *cursor;
        let mut literal = String::new();
        if self.touches(at) && self.tokens[at].kind == TokenKind::Minus {
            literal.push('-');
            at += 1;
        }
        if !self.touches(at) || self.tokens[at].kind != TokenKind::Integer {
            return None;
        }
        literal.push_str(&self.tokens[at].lexeme);
        let pos = self.tokens[*cursor].pos;
        *cursor = at + 1;
        Some((literal, pos))
    }

    fn adjacent_kind(&self, cursor: &mut usize, kind: TokenKind) -> bool {
        if self.touches(*cursor) && self.tokens[*cursor].kind == kind {
            *cursor += 1;
            return true;
        }
        false
    }

    fn touches(&self, at: usize) -> bool {
        at > 0 && at < self.tokens.len() && self.tokens[at].pos == self.tokens[at - 1].end()
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::DepthExceeded {
                limit: self.max_depth,
                pos: self.peek().pos,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_at(&self, offset: usize, kind: TokenKind) -> bool {
        self.tokens
            .get(self.index + offset)
            .is_some_and(|token| token.kind == kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{:?}", kind),
                found: describe(&token),
                pos: token.pos,
            })
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }
}

fn build(kind: AstKind, children: Vec<AstNode>, pos: usize) -> Result<AstNode, ParseError> {
    AstNode::with_children(kind, children).map_err(|err| arity_error(kind, pos, err))
}

fn arity_error(kind: AstKind, pos: usize, err: NodeError) -> ParseError {
    let count = match err {
        NodeError::Arity { count, .. } => count,
        _ => 0,
    };
    ParseError::Arity {
        name: kind.to_string(),
        count,
        pos,
    }
}

fn is_number_token(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Integer | TokenKind::Real | TokenKind::RealE)
}

fn infinity_name(name: &str) -> bool {
    matches!(name, "INF" | "inf" | "infinity")
}

fn identifier_node(name: &str) -> AstNode {
    if infinity_name(name) {
        return AstNode::real(f64::INFINITY);
    }
    if matches!(name, "NaN" | "notanumber") {
        return AstNode::real(f64::NAN);
    }
    match AstKind::from_reserved_name(name) {
        Some(kind) => AstNode::symbol(kind, name),
        None => AstNode::name(name),
    }
}

fn number_node(token: &Token, negative: bool) -> Result<AstNode, ParseError> {
    let sign = if negative { "-" } else { "" };
    let literal = format!("{sign}{}", token.lexeme);
    let invalid = || ParseError::InvalidNumber {
        literal: literal.clone(),
        pos: token.pos,
    };
    match token.kind {
        TokenKind::Integer => match literal.parse::<i64>() {
            Ok(value) => Ok(AstNode::integer(value)),
            // too wide for an integer node; keep the magnitude as a real
            Err(_) => literal.parse::<f64>().map(AstNode::real).map_err(|_| invalid()),
        },
        TokenKind::Real => literal.parse::<f64>().map(AstNode::real).map_err(|_| invalid()),
        TokenKind::RealE => {
            let marker = literal
                .find(|ch| matches!(ch, 'e' | 'E'))
                .ok_or_else(invalid)?;
            let mantissa = literal[..marker].parse::<f64>().map_err(|_| invalid())?;
            let exponent = literal[marker + 1..].parse::<i64>().map_err(|_| invalid())?;
            Ok(AstNode::real_e(mantissa, exponent))
        }
        _ => Err(ParseError::UnexpectedToken {
            expected: "number".to_string(),
            found: describe(token),
            pos: token.pos,
        }),
    }
}

fn parse_i64(literal: &str, pos: usize) -> Result<i64, ParseError> {
    literal.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
        literal: literal.to_string(),
        pos,
    })
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("`{}`", token.lexeme),
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
