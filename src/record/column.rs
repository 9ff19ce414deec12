use serde::{Deserialize, Serialize};

use crate::core::{DataType, Value};

/// One column of one record instance: declared type, ordinal position,
/// optional text length bound and the current value.
///
/// Created with a `Null` value at record construction; mutated in place
/// through the owning record's set-by-ordinal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    data_type: DataType,
    ordinal: usize,
    max_length: usize,
    value: Value,
}

impl Column {
    pub fn new(data_type: DataType, ordinal: usize) -> Self {
        Self {
            data_type,
            ordinal,
            max_length: 0,
            value: Value::Null,
        }
    }

    /// Bound the stored text length. 0 means unbounded.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Store a value, truncating text that exceeds a positive length bound
    /// to exactly that many characters.
    pub fn assign(&mut self, value: Value) {
        self.value = match value {
            Value::Text(s)
                if self.data_type == DataType::Text
                    && self.max_length > 0
                    && s.chars().count() > self.max_length =>
            {
                Value::Text(s.chars().take(self.max_length).collect())
            }
            other => other,
        };
    }
}
