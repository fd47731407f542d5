//! Domain entities: input records for building and querying part trees

use crate::domain::arena::Quantity;
use crate::domain::error::DomainError;

/// One line of a definition file: `<parent> <quantity> <child>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub parent: String,
    pub quantity: Quantity,
    pub child: String,
}

impl Definition {
    /// Parse a definition record.
    ///
    /// The parent is everything before the first space, the child everything
    /// after the last space, and the quantity the digits in between.
    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidDefinition {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let (parent, rest) = line
            .split_once(' ')
            .ok_or_else(|| invalid("expected '<parent> <quantity> <child>'"))?;
        let (quantity, child) = rest
            .rsplit_once(' ')
            .ok_or_else(|| invalid("expected '<parent> <quantity> <child>'"))?;

        if parent.is_empty() {
            return Err(invalid("missing parent name"));
        }
        if child.is_empty() {
            return Err(invalid("missing child name"));
        }

        Ok(Self {
            parent: parent.to_string(),
            quantity: parse_quantity(quantity)?,
            child: child.to_string(),
        })
    }
}

/// Strict unsigned decimal: no sign, no whitespace, no empty string.
pub fn parse_quantity(text: &str) -> Result<Quantity, DomainError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidQuantity(text.to_string()));
    }
    text.parse()
        .map_err(|_| DomainError::InvalidQuantity(text.to_string()))
}

/// One line of a query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `whatis <name>`: list the direct sub-parts of a part
    WhatIs { name: String },
    /// `howmany <parent> <child>`: quantity of a direct sub-part
    HowMany { parent: String, child: String },
}

impl Query {
    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidQuery {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let (keyword, args) = line.split_once(' ').unwrap_or((line, ""));
        match keyword {
            "whatis" => {
                if args.is_empty() {
                    return Err(invalid("expected 'whatis <name>'"));
                }
                Ok(Query::WhatIs {
                    name: args.to_string(),
                })
            }
            "howmany" => match args.split_once(' ') {
                Some((parent, child)) if !parent.is_empty() && !child.is_empty() => {
                    Ok(Query::HowMany {
                        parent: parent.to_string(),
                        child: child.to_string(),
                    })
                }
                _ => Err(invalid("expected 'howmany <parent> <child>'")),
            },
            other => Err(invalid(&format!("unknown command '{}'", other))),
        }
    }
}

/// Uppercases the first character, leaves the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
