//! Dependency discovery over raw model documents.
//!
//! References are collected in a fixed order: `extends` first, then component
//! schemas across `contents`, then relationship targets across `contents`.
//! Duplicates collapse onto their first occurrence. Interfaces defined inline
//! (inside `extends` or a component `schema`) are walked for their own
//! references; identifiers they define are not treated as dependencies.

use std::collections::HashSet;

use serde_json::{value::RawValue, Map, Value};
use thiserror::Error;

use crate::{dtmi::Dtmi, messages};

const ID_KEY: &str = "@id";
const TYPE_KEY: &str = "@type";
const EXTENDS_KEY: &str = "extends";
const CONTENTS_KEY: &str = "contents";
const SCHEMA_KEY: &str = "schema";
const TARGET_KEY: &str = "target";
const COMPONENT_TYPE: &str = "Component";
const RELATIONSHIP_TYPE: &str = "Relationship";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Enumerates supported `ExtractError` values.
pub enum ExtractError {
    #[error("Model content is not valid JSON: {0}. ")]
    MalformedJson(String),
    #[error("Model content has an unexpected shape: {0}. ")]
    UnexpectedShape(String),
    #[error("{}", messages::invalid_dtmi_format(.reference))]
    InvalidReference { reference: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One member of an expanded bundle: its declared identifier and raw text.
pub struct BundledModel {
    pub id: String,
    pub content: String,
}

/// Shape of a JSON value sitting where a model reference may appear.
enum ReferenceShape<'a> {
    ScalarRef(&'a str),
    ArrayOfRefs(&'a [Value]),
    InlineDefinition(&'a Map<String, Value>),
    NoRef,
}

fn classify(value: &Value) -> ReferenceShape<'_> {
    match value {
        Value::String(reference) => ReferenceShape::ScalarRef(reference),
        Value::Array(items) => ReferenceShape::ArrayOfRefs(items),
        Value::Object(definition) => ReferenceShape::InlineDefinition(definition),
        Value::Null | Value::Bool(_) | Value::Number(_) => ReferenceShape::NoRef,
    }
}

#[derive(Default)]
struct DependencyCollector {
    found: Vec<Dtmi>,
    seen: HashSet<String>,
    defined: HashSet<String>,
}

impl DependencyCollector {
    fn push_reference(&mut self, reference: &str) -> Result<(), ExtractError> {
        let dtmi = Dtmi::parse(reference).map_err(|_| ExtractError::InvalidReference {
            reference: reference.to_string(),
        })?;
        if self.seen.insert(dtmi.as_str().to_string()) {
            self.found.push(dtmi);
        }
        Ok(())
    }

    fn visit_interface(&mut self, interface: &Map<String, Value>) -> Result<(), ExtractError> {
        if let Some(Value::String(id)) = interface.get(ID_KEY) {
            self.defined.insert(id.clone());
        }
        if let Some(extends) = interface.get(EXTENDS_KEY) {
            self.visit_extends(extends)?;
        }

        let contents = match interface.get(CONTENTS_KEY) {
            None => return Ok(()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ExtractError::UnexpectedShape(
                    "\"contents\" must be an array".to_string(),
                ))
            }
        };
        let mut items = Vec::with_capacity(contents.len());
        for item in contents {
            let Value::Object(item) = item else {
                return Err(ExtractError::UnexpectedShape(
                    "\"contents\" entries must be objects".to_string(),
                ));
            };
            items.push(item);
        }

        for item in items.iter().filter(|item| has_type(item, COMPONENT_TYPE)) {
            if let Some(schema) = item.get(SCHEMA_KEY) {
                self.visit_component_schema(schema)?;
            }
        }
        for item in items.iter().filter(|item| has_type(item, RELATIONSHIP_TYPE)) {
            match item.get(TARGET_KEY) {
                None => {}
                Some(Value::String(target)) => self.push_reference(target)?,
                Some(_) => {
                    return Err(ExtractError::UnexpectedShape(
                        "relationship \"target\" must be a string".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    fn visit_extends(&mut self, extends: &Value) -> Result<(), ExtractError> {
        match classify(extends) {
            ReferenceShape::ScalarRef(reference) => self.push_reference(reference),
            ReferenceShape::InlineDefinition(definition) => self.visit_interface(definition),
            ReferenceShape::ArrayOfRefs(items) => {
                for item in items {
                    match classify(item) {
                        ReferenceShape::ScalarRef(reference) => self.push_reference(reference)?,
                        ReferenceShape::InlineDefinition(definition) => {
                            self.visit_interface(definition)?
                        }
                        ReferenceShape::ArrayOfRefs(_) | ReferenceShape::NoRef => {
                            return Err(ExtractError::UnexpectedShape(
                                "\"extends\" entries must be identifiers or interfaces"
                                    .to_string(),
                            ))
                        }
                    }
                }
                Ok(())
            }
            ReferenceShape::NoRef => Err(ExtractError::UnexpectedShape(
                "\"extends\" must be an identifier, an interface, or an array of them"
                    .to_string(),
            )),
        }
    }

    fn visit_component_schema(&mut self, schema: &Value) -> Result<(), ExtractError> {
        match classify(schema) {
            ReferenceShape::ScalarRef(reference) => self.push_reference(reference),
            ReferenceShape::InlineDefinition(definition) => self.visit_interface(definition),
            ReferenceShape::ArrayOfRefs(items) => {
                for item in items {
                    match classify(item) {
                        ReferenceShape::ScalarRef(reference) => self.push_reference(reference)?,
                        ReferenceShape::InlineDefinition(definition) => {
                            self.visit_interface(definition)?
                        }
                        ReferenceShape::ArrayOfRefs(_) | ReferenceShape::NoRef => {}
                    }
                }
                Ok(())
            }
            ReferenceShape::NoRef => Ok(()),
        }
    }

    fn finish(self) -> Vec<Dtmi> {
        let defined = self.defined;
        self.found
            .into_iter()
            .filter(|dtmi| !defined.contains(dtmi.as_str()))
            .collect()
    }
}

fn has_type(item: &Map<String, Value>, wanted: &str) -> bool {
    match item.get(TYPE_KEY) {
        Some(Value::String(kind)) => kind == wanted,
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind.as_str() == Some(wanted)),
        _ => false,
    }
}

/// Returns the ordered, de-duplicated identifiers `content` depends on.
pub fn extract_dependencies(content: &str) -> Result<Vec<Dtmi>, ExtractError> {
    let document = serde_json::from_str::<Value>(content)
        .map_err(|error| ExtractError::MalformedJson(error.to_string()))?;
    let mut collector = DependencyCollector::default();
    match &document {
        Value::Object(interface) => collector.visit_interface(interface)?,
        Value::Array(interfaces) => {
            for interface in interfaces {
                let Value::Object(interface) = interface else {
                    return Err(ExtractError::UnexpectedShape(
                        "model arrays must contain only objects".to_string(),
                    ));
                };
                collector.visit_interface(interface)?;
            }
        }
        _ => {
            return Err(ExtractError::UnexpectedShape(
                "model document must be a JSON object".to_string(),
            ))
        }
    }
    Ok(collector.finish())
}

/// Declared self-identifier (`@id`) of a single model document.
pub fn model_id(content: &str) -> Result<Option<String>, ExtractError> {
    let document = serde_json::from_str::<Value>(content)
        .map_err(|error| ExtractError::MalformedJson(error.to_string()))?;
    let Value::Object(model) = document else {
        return Err(ExtractError::UnexpectedShape(
            "model document must be a JSON object".to_string(),
        ));
    };
    match model.get(ID_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(_) => Err(ExtractError::UnexpectedShape(
            "\"@id\" must be a string".to_string(),
        )),
    }
}

/// Splits an expanded bundle into its member models, preserving each
/// member's raw JSON text.
pub fn split_expanded(content: &str) -> Result<Vec<BundledModel>, ExtractError> {
    let document = serde_json::from_str::<Box<RawValue>>(content)
        .map_err(|error| ExtractError::MalformedJson(error.to_string()))?;
    let members = serde_json::from_str::<Vec<Box<RawValue>>>(document.get()).map_err(|_| {
        ExtractError::UnexpectedShape("expanded document must be a JSON array".to_string())
    })?;
    let mut models = Vec::with_capacity(members.len());
    for member in members {
        let raw = member.get();
        let id = model_id(raw)?.ok_or_else(|| {
            ExtractError::UnexpectedShape("expanded model is missing \"@id\"".to_string())
        })?;
        Dtmi::parse(&id).map_err(|_| ExtractError::InvalidReference {
            reference: id.clone(),
        })?;
        models.push(BundledModel {
            id,
            content: raw.to_string(),
        });
    }
    Ok(models)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{extract_dependencies, model_id, split_expanded, ExtractError};

    fn ids(content: &str) -> Vec<String> {
        extract_dependencies(content)
            .expect("extraction should succeed")
            .into_iter()
            .map(|dtmi| dtmi.into_string())
            .collect()
    }

    #[test]
    fn unit_extracts_components_in_document_order_without_duplicates() {
        let document = json!({
            "@id": "dtmi:com:example:TemperatureController;1",
            "@type": "Interface",
            "contents": [
                {"@type": "Component", "name": "thermostat1", "schema": "dtmi:com:example:Thermostat;1"},
                {"@type": "Component", "name": "thermostat2", "schema": "dtmi:com:example:Thermostat;1"},
                {"@type": ["Telemetry", "Temperature"], "name": "workingSet", "schema": "double"},
                {"@type": "Component", "name": "deviceInformation", "schema": "dtmi:azure:DeviceManagement:DeviceInformation;1"}
            ]
        });
        assert_eq!(
            ids(&document.to_string()),
            vec![
                "dtmi:com:example:Thermostat;1",
                "dtmi:azure:DeviceManagement:DeviceInformation;1"
            ]
        );
    }

    #[test]
    fn unit_extends_precedes_schemas_which_precede_relationship_targets() {
        let document = json!({
            "@id": "dtmi:com:example:Building;1",
            "extends": ["dtmi:com:example:Room;1", "dtmi:com:example:Freezer;1"],
            "contents": [
                {"@type": "Relationship", "name": "floor", "target": "dtmi:com:example:Floor;1"},
                {"@type": "Component", "name": "camera", "schema": "dtmi:com:example:Camera;3"}
            ]
        });
        assert_eq!(
            ids(&document.to_string()),
            vec![
                "dtmi:com:example:Room;1",
                "dtmi:com:example:Freezer;1",
                "dtmi:com:example:Camera;3",
                "dtmi:com:example:Floor;1"
            ]
        );
    }

    #[test]
    fn unit_single_extends_reference_is_accepted() {
        let document = json!({"@id": "dtmi:com:example:ConferenceRoom;1", "extends": "dtmi:com:example:Room;1"});
        assert_eq!(ids(&document.to_string()), vec!["dtmi:com:example:Room;1"]);
    }

    #[test]
    fn unit_inline_interfaces_contribute_their_references_but_not_their_ids() {
        let document = json!({
            "@id": "dtmi:com:example:Phone;3",
            "extends": [{
                "@id": "dtmi:com:example:Phone:base;1",
                "@type": "Interface",
                "extends": "dtmi:com:example:Device;1"
            }],
            "contents": [{
                "@type": "Component",
                "name": "sensor",
                "schema": {
                    "@id": "dtmi:com:example:Phone:sensor;1",
                    "@type": "Interface",
                    "contents": [
                        {"@type": "Component", "name": "info", "schema": "dtmi:azure:DeviceManagement:DeviceInformation;1"}
                    ]
                }
            }, {
                "@type": "Relationship",
                "name": "self",
                "target": "dtmi:com:example:Phone:base;1"
            }]
        });
        assert_eq!(
            ids(&document.to_string()),
            vec![
                "dtmi:com:example:Device;1",
                "dtmi:azure:DeviceManagement:DeviceInformation;1"
            ]
        );
    }

    #[test]
    fn unit_no_references_yields_empty_list() {
        let document = json!({"@id": "dtmi:com:example:Thermostat;1", "contents": [
            {"@type": "Property", "name": "targetTemperature", "schema": "double"}
        ]});
        assert!(ids(&document.to_string()).is_empty());
    }

    #[test]
    fn unit_invalid_reference_is_reported_not_skipped() {
        let document = json!({"@id": "dtmi:com:example:invalidmodel;2", "extends": "dtmi:com:example:Room:1"});
        assert_eq!(
            extract_dependencies(&document.to_string()),
            Err(ExtractError::InvalidReference {
                reference: "dtmi:com:example:Room:1".to_string()
            })
        );
    }

    #[test]
    fn unit_malformed_documents_are_errors() {
        assert!(matches!(
            extract_dependencies("{\"@id\": "),
            Err(ExtractError::MalformedJson(_))
        ));
        assert!(matches!(
            extract_dependencies("42"),
            Err(ExtractError::UnexpectedShape(_))
        ));
        assert!(matches!(
            extract_dependencies("{\"contents\": {\"@type\": \"Component\"}}"),
            Err(ExtractError::UnexpectedShape(_))
        ));
        assert!(matches!(
            extract_dependencies("{\"extends\": 7}"),
            Err(ExtractError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn unit_model_id_reads_declared_identifier() {
        assert_eq!(
            model_id("{\"@id\": \"dtmi:com:example:Thermostat;1\", \"contents\": []}"),
            Ok(Some("dtmi:com:example:Thermostat;1".to_string()))
        );
        assert_eq!(model_id("{\"contents\": []}"), Ok(None));
        assert!(matches!(
            model_id("not json"),
            Err(ExtractError::MalformedJson(_))
        ));
        assert!(matches!(
            model_id("{\"@id\": 42}"),
            Err(ExtractError::UnexpectedShape(_))
        ));
        assert!(matches!(
            model_id("[\"dtmi:com:example:Thermostat;1\"]"),
            Err(ExtractError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn unit_split_expanded_preserves_member_text() {
        let bundle = r#"[
  {"@id": "dtmi:com:example:TemperatureController;1", "contents": []},
  {"@id": "dtmi:com:example:Thermostat;1", "displayName": "Thermostat"}
]"#;
        let members = split_expanded(bundle).expect("valid bundle");
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, "dtmi:com:example:TemperatureController;1");
        assert_eq!(
            members[1].content,
            r#"{"@id": "dtmi:com:example:Thermostat;1", "displayName": "Thermostat"}"#
        );
        assert!(matches!(
            split_expanded("{\"@id\": \"dtmi:a;1\"}"),
            Err(ExtractError::UnexpectedShape(_))
        ));
        assert!(matches!(
            split_expanded("[{\"@id\": "),
            Err(ExtractError::MalformedJson(_))
        ));
        assert!(split_expanded("[{\"displayName\": \"no id\"}]").is_err());
    }
}
