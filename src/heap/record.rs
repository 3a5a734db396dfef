//! Row marshalling.
//!
//! A row is stored as its column values concatenated in declared schema
//! order, with no header and no null bitmap:
//!
//! ```text
//! INT  : i32, 4 bytes little-endian
//! TEXT : u16 length (little-endian) followed by that many raw bytes
//! ```
//!
//! Column order is part of a table's identity; the same schema must be used
//! to read a record as was used to write it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::page::MAX_RECORD_SIZE;
use crate::datum::{ColumnAttribute, DataType, Identifier, Row, SchemaError, Value};

/// Encodes `row` in schema order.
///
/// # Errors
///
/// Returns `SchemaError::MissingColumn` or `SchemaError::TypeMismatch` if the
/// row does not fit the schema, `SchemaError::TextTooLong` for a TEXT value
/// over 65535 bytes, and `SchemaError::RowTooLarge` if the result cannot fit
/// in one block.
pub fn marshal(
    table_name: &str,
    column_names: &[Identifier],
    column_attributes: &[ColumnAttribute],
    row: &Row,
) -> Result<Bytes, SchemaError> {
    let mut buf = BytesMut::new();
    for (name, attribute) in column_names.iter().zip(column_attributes) {
        let value = row.get(name).ok_or_else(|| SchemaError::MissingColumn {
            table: table_name.to_string(),
            column: name.clone(),
        })?;
        match (attribute.data_type, value) {
            (DataType::Int, Value::Int(n)) => buf.put_i32_le(*n),
            (DataType::Text, Value::Text(s)) => {
                let len = u16::try_from(s.len()).map_err(|_| SchemaError::TextTooLong {
                    column: name.clone(),
                    len: s.len(),
                })?;
                buf.put_u16_le(len);
                buf.put_slice(s.as_bytes());
            }
            (expected, value) => {
                return Err(SchemaError::TypeMismatch {
                    column: name.clone(),
                    expected,
                    found: value.data_type(),
                });
            }
        }
    }
    if buf.len() > MAX_RECORD_SIZE {
        return Err(SchemaError::RowTooLarge {
            size: buf.len(),
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(buf.freeze())
}

/// Decodes a record written by [`marshal`] under the same schema.
///
/// # Errors
///
/// Returns `SchemaError::Malformed` if the bytes are truncated, carry trailing
/// data, or hold TEXT that is not valid UTF-8.
pub fn unmarshal(
    column_names: &[Identifier],
    column_attributes: &[ColumnAttribute],
    data: &[u8],
) -> Result<Row, SchemaError> {
    let mut buf = data;
    let mut row = Row::new();
    for (name, attribute) in column_names.iter().zip(column_attributes) {
        let value = match attribute.data_type {
            DataType::Int => {
                ensure_remaining(buf, 4, name)?;
                Value::Int(buf.get_i32_le())
            }
            DataType::Text => {
                ensure_remaining(buf, 2, name)?;
                let len = buf.get_u16_le() as usize;
                ensure_remaining(buf, len, name)?;
                let text = std::str::from_utf8(&buf[..len]).map_err(|e| {
                    SchemaError::Malformed(format!("column \"{}\": {}", name, e))
                })?;
                let value = Value::Text(text.to_string());
                buf.advance(len);
                value
            }
        };
        row.insert(name.clone(), value);
    }
    if buf.has_remaining() {
        return Err(SchemaError::Malformed(format!(
            "{} trailing bytes",
            buf.remaining()
        )));
    }
    Ok(row)
}

fn ensure_remaining(buf: &[u8], needed: usize, column: &str) -> Result<(), SchemaError> {
    if buf.len() < needed {
        return Err(SchemaError::Malformed(format!(
            "column \"{}\" needs {} bytes, {} left",
            column,
            needed,
            buf.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn schema() -> (Vec<Identifier>, Vec<ColumnAttribute>) {
        (
            vec!["a".to_string(), "b".to_string()],
            vec![
                ColumnAttribute::new(DataType::Int),
                ColumnAttribute::new(DataType::Text),
            ],
        )
    }

    #[test]
    fn test_marshal_layout() {
        let (names, attrs) = schema();
        let data = marshal("t", &names, &attrs, &row! { "a" => 12, "b" => "Hello!" }).unwrap();

        assert_eq!(
            &data[..],
            &[12, 0, 0, 0, 6, 0, b'H', b'e', b'l', b'l', b'o', b'!']
        );
    }

    #[test]
    fn test_roundtrip() {
        let (names, attrs) = schema();
        for row in [
            row! { "a" => 0, "b" => "" },
            row! { "a" => -1, "b" => "x" },
            row! { "a" => i32::MAX, "b" => "quoted 'text'" },
            row! { "a" => i32::MIN, "b" => "caf\u{e9}" },
        ] {
            let data = marshal("t", &names, &attrs, &row).unwrap();
            assert_eq!(unmarshal(&names, &attrs, &data).unwrap(), row);
        }
    }

    #[test]
    fn test_marshal_follows_schema_order() {
        let names = vec!["b".to_string(), "a".to_string()];
        let attrs = vec![
            ColumnAttribute::new(DataType::Text),
            ColumnAttribute::new(DataType::Int),
        ];
        let data = marshal("t", &names, &attrs, &row! { "a" => 1, "b" => "z" }).unwrap();
        assert_eq!(&data[..], &[1, 0, b'z', 1, 0, 0, 0]);
    }

    #[test]
    fn test_marshal_missing_column() {
        let (names, attrs) = schema();
        let err = marshal("t", &names, &attrs, &row! { "a" => 1 }).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                table: "t".to_string(),
                column: "b".to_string()
            }
        );
    }

    #[test]
    fn test_marshal_type_mismatch() {
        let (names, attrs) = schema();
        let err = marshal("t", &names, &attrs, &row! { "a" => "one", "b" => "x" }).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::TypeMismatch {
                expected: DataType::Int,
                found: DataType::Text,
                ..
            }
        ));
    }

    #[test]
    fn test_marshal_too_large() {
        let (names, attrs) = schema();
        let long = "x".repeat(MAX_RECORD_SIZE);
        let err = marshal("t", &names, &attrs, &row! { "a" => 1, "b" => long }).unwrap_err();
        assert!(matches!(err, SchemaError::RowTooLarge { .. }));

        let fits = "x".repeat(MAX_RECORD_SIZE - 6);
        let data = marshal("t", &names, &attrs, &row! { "a" => 1, "b" => fits }).unwrap();
        assert_eq!(data.len(), MAX_RECORD_SIZE);
    }

    #[test]
    fn test_marshal_text_too_long() {
        let names = vec!["b".to_string()];
        let attrs = vec![ColumnAttribute::new(DataType::Text)];
        let long = "x".repeat(u16::MAX as usize + 1);
        let err = marshal("t", &names, &attrs, &row! { "b" => long }).unwrap_err();
        assert_eq!(
            err,
            SchemaError::TextTooLong {
                column: "b".to_string(),
                len: u16::MAX as usize + 1
            }
        );
    }

    #[test]
    fn test_unmarshal_malformed() {
        let (names, attrs) = schema();

        assert!(matches!(
            unmarshal(&names, &attrs, &[1, 0, 0]),
            Err(SchemaError::Malformed(_))
        ));
        assert!(matches!(
            unmarshal(&names, &attrs, &[1, 0, 0, 0, 5, 0, b'a']),
            Err(SchemaError::Malformed(_))
        ));
        assert!(matches!(
            unmarshal(&names, &attrs, &[1, 0, 0, 0, 1, 0, 0xFF]),
            Err(SchemaError::Malformed(_))
        ));
        assert!(matches!(
            unmarshal(&names, &attrs, &[1, 0, 0, 0, 0, 0, 9]),
            Err(SchemaError::Malformed(_))
        ));
    }
}
