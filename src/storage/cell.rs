//! Interprets a column's raw payload bytes as a typed value, and the reverse:
//! parses a SQL literal into the fixed-width bytes a column stores.

use crate::core::error::{Result, RootDbError};
use crate::storage::column::{Column, ColumnType};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(String),
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::Bool(_) => "BOOL",
            Value::Char(_) => "CHAR",
            Value::Null => "NULL",
        }
    }
}

/// Decodes `bytes` (exactly `col.size` wide) according to `col.col_type`.
/// Caller is responsible for consulting the null bitmap first.
pub fn decode_cell(col: &Column, bytes: &[u8]) -> Result<Value> {
    match col.col_type {
        ColumnType::Int => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                RootDbError::TypeError(format!("column {} expected 8 bytes for INT", col.name))
            })?;
            Ok(Value::Int(i64::from_le_bytes(arr)))
        }
        ColumnType::Float => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                RootDbError::TypeError(format!("column {} expected 8 bytes for FLOAT", col.name))
            })?;
            Ok(Value::Float(f64::from_bits(u64::from_le_bytes(arr))))
        }
        ColumnType::Bool => Ok(Value::Bool(bytes[0] != 0)),
        ColumnType::Char => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            let s = String::from_utf8_lossy(&bytes[..end]).into_owned();
            Ok(Value::Char(s))
        }
    }
}

/// Parses a SQL literal string into the fixed-width byte payload for `col`.
pub fn encode_literal(col: &Column, literal: &str) -> Result<Vec<u8>> {
    match col.col_type {
        ColumnType::Int => {
            let v: i64 = literal
                .parse()
                .map_err(|_| RootDbError::TypeError(format!("'{literal}' is not a valid INT")))?;
            Ok(v.to_le_bytes().to_vec())
        }
        ColumnType::Float => {
            let v: f64 = literal
                .parse()
                .map_err(|_| RootDbError::TypeError(format!("'{literal}' is not a valid FLOAT")))?;
            Ok(v.to_bits().to_le_bytes().to_vec())
        }
        ColumnType::Bool => {
            let v = match literal.to_ascii_uppercase().as_str() {
                "TRUE" | "1" => true,
                "FALSE" | "0" => false,
                _ => return Err(RootDbError::TypeError(format!("'{literal}' is not a valid BOOL"))),
            };
            Ok(vec![if v { 1 } else { 0 }])
        }
        ColumnType::Char => {
            let bytes = literal.as_bytes();
            if bytes.len() > col.size as usize {
                return Err(RootDbError::ConstraintViolation(format!(
                    "value for column {} exceeds declared size {}",
                    col.name, col.size
                )));
            }
            let mut out = vec![0u8; col.size as usize];
            out[..bytes.len()].copy_from_slice(bytes);
            Ok(out)
        }
    }
}

impl Value {
    /// Equality/ordering comparison used by residual WHERE predicates.
    /// BOOL rejects ordering operators; type mismatches are a `TypeError`.
    pub fn compare(&self, other: &Value) -> Result<std::cmp::Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => {
                a.partial_cmp(b).ok_or_else(|| RootDbError::TypeError("NaN comparison".to_string()))
            }
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
            (Value::Null, Value::Null) => Ok(std::cmp::Ordering::Equal),
            _ => Err(RootDbError::TypeError(format!(
                "cannot compare {} with {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_col() -> Column {
        Column::new("id".to_string(), ColumnType::Int, 8, false, false, true)
    }

    fn char_col() -> Column {
        Column::new("name".to_string(), ColumnType::Char, 5, false, true, false)
    }

    #[test]
    fn int_round_trips() {
        let col = int_col();
        let bytes = encode_literal(&col, "42").unwrap();
        assert_eq!(decode_cell(&col, &bytes).unwrap(), Value::Int(42));
    }

    #[test]
    fn float_round_trips_via_bits() {
        let col = Column::new("v".to_string(), ColumnType::Float, 8, false, false, false);
        let bytes = encode_literal(&col, "1.23").unwrap();
        assert_eq!(decode_cell(&col, &bytes).unwrap(), Value::Float(1.23));
    }

    #[test]
    fn char_pads_and_trims_at_decode() {
        let col = char_col();
        let bytes = encode_literal(&col, "hi").unwrap();
        assert_eq!(bytes.len(), 5);
        assert_eq!(decode_cell(&col, &bytes).unwrap(), Value::Char("hi".to_string()));
    }

    #[test]
    fn char_too_long_is_constraint_violation() {
        let col = char_col();
        assert!(encode_literal(&col, "waytoolong").is_err());
    }

    #[test]
    fn bool_ordering_is_rejected_by_convention_at_executor_layer() {
        // compare() itself permits Ord on bools; the executor is responsible
        // for rejecting <, <=, >, >= on BOOL per the type-directed rules.
        let a = Value::Bool(true);
        let b = Value::Bool(false);
        assert_eq!(a.compare(&b).unwrap(), std::cmp::Ordering::Greater);
    }
}
