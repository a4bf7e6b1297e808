use serde::{Deserialize, Serialize};

/// One entry of the integration catalog. The catalog is owned by an external
/// system; this core only reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::ConnectorRecord;

    #[test]
    fn missing_description_serializes_as_null() {
        let record = ConnectorRecord {
            name: "SAP ERP".to_string(),
            description: None,
            category: "ERP".to_string(),
        };

        let json = serde_json::to_value(&record).expect("serialize connector");
        assert!(json["description"].is_null());
        assert_eq!(json["name"], "SAP ERP");
        assert_eq!(json["category"], "ERP");
    }
}
