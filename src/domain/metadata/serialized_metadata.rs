use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SerializedMetadata {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) properties: Vec<SerializedProperty>,
    #[serde(default)]
    pub(crate) functions: Vec<SerializedFunction>,
    #[serde(default)]
    pub(crate) events: Vec<SerializedEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedProperty {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) value_type: SerializedValueType,
}

#[derive(Debug, Deserialize)]
pub struct SerializedValueType {
    #[serde(rename = "type")]
    pub(crate) kind: String,
}

#[derive(Debug, Deserialize)]
pub struct SerializedFunction {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) inputs: Vec<SerializedProperty>,
}

#[derive(Debug, Deserialize)]
pub struct SerializedEvent {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) parameters: Vec<SerializedProperty>,
}
