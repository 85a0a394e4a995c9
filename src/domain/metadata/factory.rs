use crate::domain::metadata::serialized_metadata::{SerializedEvent, SerializedFunction, SerializedMetadata, SerializedProperty};
use crate::domain::metadata::{DeviceMetadata, EventMetadata, FunctionMetadata, PropertyMetadata, ValueType};
use std::collections::HashSet;
use thiserror::Error;

pub fn from_json(json: &str) -> Result<DeviceMetadata, MetadataError> {
    let metadata = serde_json::from_str::<SerializedMetadata>(json)?;
    if metadata.id.is_empty() {
        return Err(MetadataError::EmptyId { scope: "metadata".to_string() });
    }

    ensure_unique_ids("properties", metadata.properties.iter().map(|property| property.id.as_str()))?;
    ensure_unique_ids("functions", metadata.functions.iter().map(|function| function.id.as_str()))?;
    ensure_unique_ids("events", metadata.events.iter().map(|event| event.id.as_str()))?;

    Ok(DeviceMetadata {
        id: metadata.id,
        name: metadata.name,
        properties: to_properties(metadata.properties)?,
        functions: metadata.functions.into_iter().map(to_function).collect::<Result<_, _>>()?,
        events: metadata.events.into_iter().map(to_event).collect::<Result<_, _>>()?,
    })
}

fn to_function(function: SerializedFunction) -> Result<FunctionMetadata, MetadataError> {
    let scope = format!("inputs of function '{}'", function.id);
    ensure_unique_ids(&scope, function.inputs.iter().map(|input| input.id.as_str()))?;

    Ok(FunctionMetadata {
        id: function.id,
        name: function.name,
        inputs: to_properties(function.inputs)?,
    })
}

fn to_event(event: SerializedEvent) -> Result<EventMetadata, MetadataError> {
    let scope = format!("parameters of event '{}'", event.id);
    ensure_unique_ids(&scope, event.parameters.iter().map(|parameter| parameter.id.as_str()))?;

    Ok(EventMetadata {
        id: event.id,
        name: event.name,
        parameters: to_properties(event.parameters)?,
    })
}

fn to_properties(properties: Vec<SerializedProperty>) -> Result<Vec<PropertyMetadata>, MetadataError> {
    properties
        .into_iter()
        .map(|property| {
            let value_type = property
                .value_type
                .kind
                .parse::<ValueType>()
                .map_err(|value_type| MetadataError::UnknownValueType {
                    id: property.id.clone(),
                    value_type,
                })?;

            Ok(PropertyMetadata {
                id: property.id,
                name: property.name,
                value_type,
            })
        })
        .collect()
}

fn ensure_unique_ids<'a>(scope: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), MetadataError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(MetadataError::EmptyId { scope: scope.to_string() });
        }
        if !seen.insert(id) {
            return Err(MetadataError::DuplicateId {
                scope: scope.to_string(),
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("json deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("empty id in {scope}")]
    EmptyId { scope: String },
    #[error("duplicate id '{id}' in {scope}")]
    DuplicateId { scope: String, id: String },
    #[error("unknown value type '{value_type}' for '{id}'")]
    UnknownValueType { id: String, value_type: String },
}
