use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Validated metadata schema of a product. Ids are unique within each list and the
/// order of every list is kept as it was declared.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct DeviceMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: Vec<PropertyMetadata>,
    pub functions: Vec<FunctionMetadata>,
    pub events: Vec<EventMetadata>,
}

impl DeviceMetadata {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value_type: ValueType,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FunctionMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub inputs: Vec<PropertyMetadata>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct EventMetadata {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parameters: Vec<PropertyMetadata>,
}

// Serialized as `{"type": "<name>"}`
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "int" => Ok(ValueType::Int),
            "long" => Ok(ValueType::Long),
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            "boolean" => Ok(ValueType::Boolean),
            "date" => Ok(ValueType::Date),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("string", ValueType::String)]
    #[case("int", ValueType::Int)]
    #[case("boolean", ValueType::Boolean)]
    fn parses_known_value_types(#[case] input: &str, #[case] expected: ValueType) {
        assert_eq!(input.parse::<ValueType>(), Ok(expected));
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn rejects_unknown_value_types() {
        assert_eq!("decimal".parse::<ValueType>(), Err("decimal".to_string()));
    }

    #[test]
    fn serializes_the_value_type_as_a_tagged_object() {
        let property = PropertyMetadata {
            id: "times".to_string(),
            name: None,
            value_type: ValueType::Int,
        };

        let json = serde_json::to_value(&property).unwrap();

        assert_eq!(json, serde_json::json!({ "id": "times", "valueType": { "type": "int" } }));
    }
}
