use indexmap::IndexMap;
use thiserror::Error;

use crate::io::gpr_parse::lexer::Token;
use crate::metabolic_model::gene::{Gene, Gpr, GprOperatorType};

/*
GPR Grammar:
expression -> or ;
or -> and ( "OR" and )* ;
and -> unary ( "AND" unary )* ;
unary -> "NOT" unary | primary ;
primary -> GENE | "(" expression ")" ;

e.g. ( Gene1 AND Gene2) OR (Gene3 AND NOT Gene4)
 */

/// GPR Parser
pub struct GprParser<'gm> {
    /// Vector of tokens from the GPR string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
    /// Map containing the Genes, genes seen in the rule which are missing are added
    gene_map: &'gm mut IndexMap<String, Gene>,
}

impl<'gm> GprParser<'gm> {
    /// Create a new GprParser, `tokens` must end with [`Token::Eof`]
    pub fn new(tokens: Vec<Token>, gene_map: &'gm mut IndexMap<String, Gene>) -> GprParser<'gm> {
        GprParser {
            tokens,
            current: 0,
            gene_map,
        }
    }

    // region Parsing Functions

    /// Parse the token vector into a GPR AST
    pub fn parse(&mut self) -> Result<Gpr, ParseError> {
        let gpr = self.or()?;
        if !self.is_at_end() {
            return Err(ParseError::EarlyTermination(self.current));
        }
        Ok(gpr)
    }

    fn or(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.and()?;
        while self.match_token(&Token::Or) {
            let right = self.and()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::Or, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_token(&Token::And) {
            let right = self.unary()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::And, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Gpr, ParseError> {
        if self.match_token(&Token::Not) {
            let operand = self.unary()?;
            return Gpr::new_unary_operation(GprOperatorType::Not, operand)
                .map_err(|_| ParseError::InvalidUnaryOperator);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Gpr, ParseError> {
        if let Some(identifier) = self.match_identifier() {
            self.insert_if_needed(&identifier);
            return Ok(Gpr::new_gene_node(&identifier));
        }

        if self.match_token(&Token::LeftParen) {
            let expr = self.or()?;
            self.consume(&Token::RightParen, "Expect ')' after expression.")?;
            return Ok(expr);
        }

        Err(ParseError::ExpectedExpression)
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// If the current token matches `token` advance past it and return true
    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.current += 1;
            return true;
        }
        false
    }

    /// If the current token is an identifier, advance past it and return the gene id
    fn match_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = self.peek() {
            let id = id.clone();
            self.current += 1;
            return Some(id);
        }
        None
    }

    fn check(&self, token: &Token) -> bool {
        !self.is_at_end() && self.peek() == token
    }

    fn is_at_end(&self) -> bool {
        self.peek() == &Token::Eof
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&Token::Eof)
    }

    /// Advance past a required token (such as a closing parenthesis), or error with `msg`
    fn consume(&mut self, token: &Token, msg: &str) -> Result<(), ParseError> {
        if self.match_token(token) {
            return Ok(());
        }
        Err(ParseError::MissingToken(msg.to_string()))
    }

    // endregion parsing helper functions

    /// Add an active gene for `gene_id` if the map doesn't contain it yet
    fn insert_if_needed(&mut self, gene_id: &str) {
        if !self.gene_map.contains_key(gene_id) {
            self.gene_map
                .insert(gene_id.to_string(), Gene::new_active(gene_id));
        }
    }
}

/// Enum representing possible parse errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    /// Token was expected to be a binary operator but was not
    #[error("Invalid binary operator encountered, expected only `and` and `or`")]
    InvalidBinaryOperator,
    /// Token was expected to be a unary operator but was not
    #[error("Invalid unary operator encountered, expected only `not`")]
    InvalidUnaryOperator,
    /// Missing expected token (e.g. a right parenthesis)
    #[error("Missing expected token: {0}")]
    MissingToken(String),
    /// No expression found when one was expected
    #[error("No expression found, check that the GPR string is not empty")]
    ExpectedExpression,
    /// Expression was not completed when parsing terminated
    #[error("Parsing terminated early at token {0}, check for an operator missing between two genes")]
    EarlyTermination(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gpr_parse::lexer::Lexer;
    use crate::metabolic_model::gene::GprOperation;

    fn parse(rule: &str, gene_map: &mut IndexMap<String, Gene>) -> Result<Gpr, ParseError> {
        let tokens = Lexer::new(rule).lex().unwrap();
        GprParser::new(tokens, gene_map).parse()
    }

    #[test]
    fn single_gene_parse() {
        let mut gene_map = IndexMap::new();
        let gpr = parse("b1101", &mut gene_map).unwrap();
        assert_eq!(gpr, Gpr::new_gene_node("b1101"));
        assert!(gene_map.contains_key("b1101"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let mut gene_map = IndexMap::new();
        let gpr = parse("b0001 or b0002 and b0003", &mut gene_map).unwrap();
        match gpr {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                assert_eq!(*left, Gpr::new_gene_node("b0001"));
                assert_eq!(right.to_string_id(), "(b0002 and b0003)");
            }
            _ => panic!("Should have been an OR operation"),
        }
        assert_eq!(gene_map.len(), 3);
    }

    #[test]
    fn repeated_binary_is_left_associative() {
        let mut gene_map = IndexMap::new();
        let gpr = parse("b0001 and b0002 and b0003", &mut gene_map).unwrap();
        assert_eq!(gpr.to_string_id(), "((b0001 and b0002) and b0003)");
    }

    #[test]
    fn grouping_and_not() {
        let mut gene_map = IndexMap::new();
        let gpr = parse("(b3916 or b1723) and not b0018", &mut gene_map).unwrap();
        assert_eq!(gpr.to_string_id(), "((b3916 or b1723) and (not b0018))");
    }

    #[test]
    fn existing_genes_are_kept() {
        let mut gene_map = IndexMap::new();
        let mut inactive = Gene::new_active("b0001");
        inactive.activity = crate::metabolic_model::gene::GeneActivity::Inactive;
        gene_map.insert("b0001".to_string(), inactive.clone());
        parse("b0001 or b0002", &mut gene_map).unwrap();
        assert_eq!(gene_map["b0001"], inactive);
    }

    #[test]
    fn invalid_parse() {
        let mut gene_map = IndexMap::new();
        assert_eq!(
            parse("b0001 not b0023", &mut gene_map),
            Err(ParseError::EarlyTermination(1))
        );
        assert_eq!(
            parse("(b0001 or b0002", &mut gene_map),
            Err(ParseError::MissingToken(
                "Expect ')' after expression.".to_string()
            ))
        );
        assert_eq!(parse("", &mut gene_map), Err(ParseError::ExpectedExpression));
        assert_eq!(
            parse("b0001 and", &mut gene_map),
            Err(ParseError::ExpectedExpression)
        );
    }
}
