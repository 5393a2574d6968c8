//! Serialization of tokens
//!
//! Tokens share their payloads through `Arc` and may hold operations, so
//! they are not serialized directly. `TypedToken` mirrors `Token` with
//! owned data and can go through serde/bincode, which is how evaluation
//! inputs and results are persisted or exchanged.
//!
//! Operation tokens cannot be serialized: code is not data.

use crate::error::{ErrorKind, ErrorToken};
use crate::token::Token;
use num_rational::Rational64;
use serde::{Deserialize, Serialize};

/// Error during serialization/deserialization
#[derive(Debug)]
pub enum SerializeError {
    /// Cannot serialize operation tokens
    OpNotSerializable(String),
    /// Bincode encoding/decoding error (preserves original error for debugging)
    BincodeError(Box<bincode::Error>),
    /// Invalid data structure
    InvalidData(String),
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::OpNotSerializable(name) => {
                write!(f, "Operation '{}' cannot be serialized - code is not data", name)
            }
            SerializeError::BincodeError(e) => write!(f, "Bincode error: {}", e),
            SerializeError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializeError::BincodeError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<bincode::Error> for SerializeError {
    fn from(e: bincode::Error) -> Self {
        SerializeError::BincodeError(Box::new(e))
    }
}

/// Serializable representation of tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypedToken {
    Int(i64),
    Bool(bool),
    Ratio { numer: i64, denom: i64 },
    Sym(String),
    Compound { tag: String, fields: Vec<TypedToken> },
    List(Vec<TypedToken>),
    Group(Vec<TypedToken>),
    Error {
        op: String,
        kind: ErrorKind,
        inputs: Vec<TypedToken>,
    },
}

fn typed_all(tokens: &[Token]) -> Result<Vec<TypedToken>, SerializeError> {
    tokens.iter().map(TypedToken::from_token).collect()
}

fn tokens_all(typed: &[TypedToken]) -> Result<Vec<Token>, SerializeError> {
    typed.iter().map(TypedToken::to_token).collect()
}

impl TypedToken {
    /// Convert from a runtime token
    ///
    /// Returns error if the token (or anything nested in it) is an operation.
    pub fn from_token(token: &Token) -> Result<Self, SerializeError> {
        match token {
            Token::Int(v) => Ok(TypedToken::Int(*v)),
            Token::Bool(v) => Ok(TypedToken::Bool(*v)),
            Token::Ratio(r) => Ok(TypedToken::Ratio {
                numer: *r.numer(),
                denom: *r.denom(),
            }),
            Token::Sym(s) => Ok(TypedToken::Sym(s.to_string())),
            Token::Compound(c) => Ok(TypedToken::Compound {
                tag: c.tag.to_string(),
                fields: typed_all(&c.fields)?,
            }),
            Token::List(items) => Ok(TypedToken::List(typed_all(items)?)),
            Token::Group(items) => Ok(TypedToken::Group(typed_all(items)?)),
            Token::Error(e) => Ok(TypedToken::Error {
                op: e.op.to_string(),
                kind: e.kind.clone(),
                inputs: typed_all(&e.inputs)?,
            }),
            Token::Op(op) => Err(SerializeError::OpNotSerializable(op.name().to_string())),
        }
    }

    /// Convert back to a runtime token
    pub fn to_token(&self) -> Result<Token, SerializeError> {
        match self {
            TypedToken::Int(v) => Ok(Token::Int(*v)),
            TypedToken::Bool(v) => Ok(Token::Bool(*v)),
            TypedToken::Ratio { numer, denom } => {
                if *denom == 0 {
                    return Err(SerializeError::InvalidData(format!(
                        "ratio {}/0 has a zero denominator",
                        numer
                    )));
                }
                // reduced ratios always carry a positive denominator
                if *denom < 0 {
                    return Err(SerializeError::InvalidData(format!(
                        "ratio {}/{} has a negative denominator",
                        numer, denom
                    )));
                }
                Ok(Token::Ratio(Rational64::new(*numer, *denom)))
            }
            TypedToken::Sym(s) => Ok(Token::sym(s.as_str())),
            TypedToken::Compound { tag, fields } => {
                Ok(Token::compound(tag.as_str(), tokens_all(fields)?))
            }
            TypedToken::List(items) => Ok(Token::list(tokens_all(items)?)),
            TypedToken::Group(items) => Ok(Token::group(tokens_all(items)?)),
            TypedToken::Error { op, kind, inputs } => Ok(Token::error(
                ErrorToken::new(op.as_str(), kind.clone()).with_inputs(tokens_all(inputs)?),
            )),
        }
    }

    /// Serialize to binary format (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        bincode::serialize(self).map_err(SerializeError::from)
    }

    /// Deserialize from binary format (bincode)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializeError> {
        bincode::deserialize(bytes).map_err(SerializeError::from)
    }
}

/// Extension trait for Token to add serialization methods
pub trait TokenSerialize {
    /// Convert to serializable TypedToken
    fn to_typed(&self) -> Result<TypedToken, SerializeError>;

    /// Serialize directly to bytes
    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError>;
}

impl TokenSerialize for Token {
    fn to_typed(&self) -> Result<TypedToken, SerializeError> {
        TypedToken::from_token(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        TypedToken::from_token(self)?.to_bytes()
    }
}
