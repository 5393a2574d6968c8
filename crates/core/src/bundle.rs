//! Bundle: the working set passed between pipeline stages
//!
//! A bundle is an ordered sequence of tokens. Building one never reorders
//! or duplicates tokens. The one normalization applied is singleton
//! transparency: a bundle whose only token is a `Group` *is* that group's
//! contents, because "one result that happens to be a sequence" and "the
//! sequence itself" must be indistinguishable to the next stage.
//!
//! The empty bundle is the canonical "nothing".

use crate::token::Token;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    tokens: Vec<Token>,
}

impl Bundle {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        while tokens.len() == 1 {
            match &tokens[0] {
                Token::Group(inner) => tokens = inner.to_vec(),
                _ => break,
            }
        }
        Self { tokens }
    }

    /// The empty bundle
    pub fn nothing() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }

    /// The lone token of a singleton bundle
    pub fn single(&self) -> Option<&Token> {
        match self.tokens.as_slice() {
            [token] => Some(token),
            _ => None,
        }
    }

    /// Collapse into one token: the token itself for a singleton, a group otherwise
    pub fn into_token(self) -> Token {
        Token::group(self.tokens)
    }

    /// First error token, looking through groups but not into lists
    pub fn first_error(&self) -> Option<&Token> {
        fn find(tokens: &[Token]) -> Option<&Token> {
            tokens.iter().find_map(|token| match token {
                Token::Error(_) => Some(token),
                Token::Group(inner) => find(inner),
                _ => None,
            })
        }
        find(&self.tokens)
    }

    /// True if the bundle is exactly one error token
    pub fn is_error(&self) -> bool {
        matches!(self.single(), Some(Token::Error(_)))
    }
}

impl From<Token> for Bundle {
    fn from(token: Token) -> Self {
        Bundle::new(vec![token])
    }
}

impl From<Vec<Token>> for Bundle {
    fn from(tokens: Vec<Token>) -> Self {
        Bundle::new(tokens)
    }
}

impl FromIterator<Token> for Bundle {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Bundle::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Bundle {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

// A singleton bundle compares equal to its token
impl PartialEq<Token> for Bundle {
    fn eq(&self, other: &Token) -> bool {
        *self == Bundle::from(other.clone())
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_group_unwraps() {
        let group = Token::group(vec![Token::int(1), Token::int(2)]);
        let bundle = Bundle::from(group);
        assert_eq!(bundle.as_slice(), &[Token::int(1), Token::int(2)]);
    }

    #[test]
    fn test_nested_singleton_groups_unwrap() {
        let inner = Token::Group(vec![Token::int(1), Token::int(2)].into());
        let outer = Token::Group(vec![inner].into());
        assert_eq!(Bundle::from(outer).len(), 2);
    }

    #[test]
    fn test_order_preserved() {
        let bundle: Bundle = [3, 1, 2].into_iter().map(Token::int).collect();
        let values: Vec<i64> = bundle.iter().filter_map(Token::as_int).collect();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_bundle_equals_token() {
        assert_eq!(Bundle::from(Token::int(4)), Token::int(4));
        assert_ne!(Bundle::nothing(), Token::int(4));
    }

    #[test]
    fn test_into_token_round_trip() {
        let bundle = Bundle::new(vec![Token::sym("a"), Token::sym("b")]);
        let token = bundle.clone().into_token();
        assert_eq!(Bundle::from(token), bundle);
        assert_eq!(Bundle::nothing().into_token(), Token::group(vec![]));
    }

    #[test]
    fn test_error_detection() {
        let err = Token::error(crate::error::ErrorToken::new(
            "t",
            crate::error::ErrorKind::NotCallable,
        ));
        let bundle = Bundle::new(vec![Token::int(1), err.clone()]);
        assert_eq!(bundle.first_error(), Some(&err));
        assert!(!bundle.is_error());
        assert!(Bundle::from(err).is_error());
    }

    #[test]
    fn test_error_found_inside_group() {
        let err = Token::error(crate::error::ErrorToken::new(
            "div",
            crate::error::ErrorKind::DivisionByZero,
        ));
        let group = Token::group(vec![Token::int(1), err.clone()]);
        let bundle = Bundle::new(vec![Token::int(0), group]);
        assert_eq!(bundle.first_error(), Some(&err));

        let frozen = Bundle::new(vec![Token::list(vec![err])]);
        assert_eq!(frozen.first_error(), None);
    }
}
