use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
    pub protocol: String,
}

impl ProductInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, protocol: impl Into<String>) -> Self {
        ProductInfo {
            id: id.into(),
            name: name.into(),
            protocol: protocol.into(),
        }
    }
}
