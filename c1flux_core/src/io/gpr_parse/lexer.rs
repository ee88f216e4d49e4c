//! Lex a GPR string into a series of tokens for later parsing
use thiserror::Error;

/// Token of a GPR rule, keywords are case-insensitive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Gene identifier, e.g. `b1241`
    Identifier(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
    Eof,
}

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, always terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            '(' => self.tokens.push(Token::LeftParen),
            ')' => self.tokens.push(Token::RightParen),
            c if Lexer::is_identifier_char(c) => self.read_identifier(),
            c if c.is_whitespace() => {}
            other => {
                return Err(LexerError::InvalidCharacter {
                    character: other,
                    position: self.start,
                })
            }
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_identifier(&mut self) {
        while !self.is_at_end() && Lexer::is_identifier_char(self.source[self.current]) {
            self.current += 1;
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let token = match text.to_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Identifier(text),
        };
        self.tokens.push(token);
    }

    /// Gene ids may contain letters, digits, `_`, `.`, `-` and `:` (e.g. `b1241`, `gene.12`)
    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LexerError {
    #[error("Invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_gene() {
        let tokens = Lexer::new("b1241").lex().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Identifier(String::from("b1241")), Token::Eof]
        );
    }

    #[test]
    fn grouping_and_keywords() {
        let tokens = Lexer::new("(b0114 OR b0115) and NOT gene.12-a").lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::Identifier(String::from("b0114")),
                Token::Or,
                Token::Identifier(String::from("b0115")),
                Token::RightParen,
                Token::And,
                Token::Not,
                Token::Identifier(String::from("gene.12-a")),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keywords_inside_identifiers() {
        let tokens = Lexer::new("andA ornithine").lex().unwrap();
        assert_eq!(tokens[0], Token::Identifier(String::from("andA")));
        assert_eq!(tokens[1], Token::Identifier(String::from("ornithine")));
    }

    #[test]
    fn invalid_character() {
        assert_eq!(
            Lexer::new("b0001 & b0002").lex(),
            Err(LexerError::InvalidCharacter {
                character: '&',
                position: 6
            })
        );
    }
}
