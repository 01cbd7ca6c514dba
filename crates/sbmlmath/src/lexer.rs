#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Character offset of the first character.
    pub pos: usize,
}

impl Token {
    /// Character offset just past the token.
    pub fn end(&self) -> usize {
        self.pos + self.lexeme.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Integer,
    Real,
    /// A number with an exponent suffix, `6.02e23`.
    RealE,
    Identifier,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut index = 0usize;
    let mut tokens = Vec::new();

    while index < chars.len() {
        let ch = chars[index];
        if ch.is_whitespace() {
            index += 1;
            continue;
        }

        if ch.is_ascii_alphabetic() {
            tokens.push(consume_identifier(&chars, &mut index));
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && next_is_digit(&chars, index)) {
            tokens.push(consume_number(&chars, &mut index));
            continue;
        }

        let token = one_char_op(ch, index).ok_or(LexError::UnexpectedCharacter { ch, pos: index })?;
        tokens.push(token);
        index += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        pos: chars.len(),
    });

    Ok(tokens)
}

fn consume_identifier(chars: &[char], index: &mut usize) -> Token {
    let start = *index;
    *index += 1;
    while *index < chars.len() && (chars[*index].is_ascii_alphanumeric() || chars[*index] == '_') {
        *index += 1;
    }
    Token {
        kind: TokenKind::Identifier,
        lexeme: chars[start..*index].iter().collect(),
        pos: start,
    }
}

fn consume_number(chars: &[char], index: &mut usize) -> Token {
    let start = *index;
    skip_digits(chars, index);

    let mut kind = TokenKind::Integer;
    if *index < chars.len() && chars[*index] == '.' {
        kind = TokenKind::Real;
        *index += 1;
        skip_digits(chars, index);
    }

    if *index < chars.len() && matches!(chars[*index], 'e' | 'E') {
        let marker = *index;
        let mut cursor = marker + 1;
        if cursor < chars.len() && matches!(chars[cursor], '+' | '-') {
            cursor += 1;
        }
        // `2e` or `2ex` leaves the `e` to the identifier that follows.
        if cursor < chars.len() && chars[cursor].is_ascii_digit() {
            *index = cursor;
            skip_digits(chars, index);
            kind = TokenKind::RealE;
        }
    }

    Token {
        kind,
        lexeme: chars[start..*index].iter().collect(),
        pos: start,
    }
}

fn skip_digits(chars: &[char], index: &mut usize) {
    while *index < chars.len() && chars[*index].is_ascii_digit() {
        *index += 1;
    }
}

fn next_is_digit(chars: &[char], index: usize) -> bool {
    chars.get(index + 1).is_some_and(char::is_ascii_digit)
}

fn one_char_op(ch: char, pos: usize) -> Option<Token> {
    let kind = match ch {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '^' => TokenKind::Caret,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        ',' => TokenKind::Comma,
        _ => return None,
    };
    Some(Token {
        kind,
        lexeme: ch.to_string(),
        pos,
    })
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
