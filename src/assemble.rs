//! Top-level JSON Schema document assembly.
//!
//! Builds the draft-07 envelope around the properties extracted from a CUE
//! source document. Two documents exist: the cluster configuration (from
//! `#Config`) and the node list (from `#Node`, wrapped in a `nodes` array).

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::extract;
use crate::segment;

pub const SCHEMA_BASE_URL: &str = "https://github.com/MatherlyNet/talos-cluster";

const DRAFT07_URI: &str = "http://json-schema.org/draft-07/schema#";

fn envelope(file_name: &str, title: &str, description: &str) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("$schema".into(), Value::from(DRAFT07_URI));
    doc.insert("$id".into(), Value::from(format!("{SCHEMA_BASE_URL}/{file_name}")));
    doc.insert("title".into(), Value::from(title));
    doc.insert("description".into(), Value::from(description));
    doc.insert("type".into(), Value::from("object"));
    doc.insert("additionalProperties".into(), Value::Bool(false));
    doc
}

fn properties_and_required(block: &str) -> (Value, Value) {
    let (properties, required) = segment::parse_block_fields(block);
    let mut props = Map::new();
    for (name, prop) in &properties {
        props.insert(name.clone(), prop.to_value());
    }
    let required = Value::Array(required.into_iter().map(Value::from).collect());
    (Value::Object(props), required)
}

/// Schema for `cluster.yaml`, derived from the `#Config` definition.
pub fn cluster_schema(source: &str) -> Result<Value, SchemaError> {
    let block = extract::extract_block(source, "#Config")?;
    let (props, required) = properties_and_required(block);

    let mut doc = envelope(
        "cluster.schema.json",
        "Cluster Configuration",
        "Configuration schema for matherlynet-talos-cluster GitOps template",
    );
    doc.insert("properties".into(), props);
    doc.insert("required".into(), required);
    Ok(Value::Object(doc))
}

/// Schema for `nodes.yaml`: a required `nodes` array whose items follow the
/// `#Node` definition.
pub fn nodes_schema(source: &str) -> Result<Value, SchemaError> {
    let block = extract::extract_block(source, "#Node")?;
    let (props, required) = properties_and_required(block);

    let mut item = Map::new();
    item.insert("type".into(), Value::from("object"));
    item.insert("additionalProperties".into(), Value::Bool(false));
    item.insert("properties".into(), props);
    item.insert("required".into(), required);

    let mut nodes = Map::new();
    nodes.insert("type".into(), Value::from("array"));
    nodes.insert("description".into(), Value::from("List of cluster nodes"));
    nodes.insert("items".into(), Value::Object(item));
    nodes.insert("minItems".into(), Value::from(1));

    let mut top_props = Map::new();
    top_props.insert("nodes".into(), Value::Object(nodes));

    let mut doc = envelope(
        "nodes.schema.json",
        "Nodes Configuration",
        "Node definitions for matherlynet-talos-cluster",
    );
    doc.insert("properties".into(), Value::Object(top_props));
    doc.insert("required".into(), Value::Array(vec![Value::from("nodes")]));
    Ok(Value::Object(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLUSTER_CUE: &str = "\
// Cluster schema definition
#Config: {
	// CIDR for cluster nodes
	node_cidr: string & =~\"^(\\\\d{1,3}\\\\.){3}\\\\d{1,3}/\\\\d{1,2}$\"

	// Optional cluster name
	cluster_name?: *\"home-kubernetes\" | string

	mtu?: >=1450 & <=9000

	role: \"controller\" | \"worker\"

	_internal: string
}
";

    const NODES_CUE: &str = "\
#Node: {
	// Node hostname
	name: string & !=\"\"

	address: net.IPv4

	// Optional labels
	labels?: {
		[string]: \"a\" | \"b\"
	}

	tags?: [...string]
}
";

    #[test]
    fn cluster_document_envelope_and_ordering() {
        let doc = cluster_schema(CLUSTER_CUE).unwrap();
        assert_eq!(doc["$schema"], "http://json-schema.org/draft-07/schema#");
        assert_eq!(doc["$id"], format!("{SCHEMA_BASE_URL}/cluster.schema.json"));
        assert_eq!(doc["title"], "Cluster Configuration");
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["additionalProperties"], json!(false));

        let props = doc["properties"].as_object().unwrap();
        let names: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["node_cidr", "cluster_name", "mtu", "role"]);

        assert_eq!(doc["required"], json!(["node_cidr", "role"]));
    }

    #[test]
    fn cluster_fields_translate_with_descriptions() {
        let doc = cluster_schema(CLUSTER_CUE).unwrap();
        assert_eq!(
            doc["properties"]["node_cidr"],
            json!({
                "type": "string",
                "pattern": "^(\\d{1,3}\\.){3}\\d{1,3}/\\d{1,2}$",
                "description": "CIDR for cluster nodes"
            })
        );
        assert_eq!(
            doc["properties"]["cluster_name"],
            json!({
                "type": "string",
                "default": "home-kubernetes",
                "description": "Optional cluster name"
            })
        );
        assert_eq!(
            doc["properties"]["mtu"],
            json!({"type": "integer", "minimum": 1450, "maximum": 9000})
        );
    }

    #[test]
    fn internal_fields_never_reach_the_output() {
        let doc = cluster_schema(CLUSTER_CUE).unwrap();
        assert!(doc["properties"].get("_internal").is_none());
        assert!(!doc["required"].as_array().unwrap().iter().any(|v| v == "_internal"));
    }

    #[test]
    fn nodes_document_wraps_items_in_a_required_array() {
        let doc = nodes_schema(NODES_CUE).unwrap();
        assert_eq!(doc["title"], "Nodes Configuration");
        assert_eq!(doc["required"], json!(["nodes"]));

        let nodes = &doc["properties"]["nodes"];
        assert_eq!(nodes["type"], "array");
        assert_eq!(nodes["minItems"], 1);
        assert_eq!(nodes["description"], "List of cluster nodes");

        let item = &nodes["items"];
        assert_eq!(item["type"], "object");
        assert_eq!(item["additionalProperties"], json!(false));
        assert_eq!(item["required"], json!(["name", "address"]));
        assert_eq!(
            item["properties"]["name"],
            json!({"type": "string", "minLength": 1, "description": "Node hostname"})
        );
        assert_eq!(
            item["properties"]["labels"],
            json!({
                "type": "object",
                "additionalProperties": {"type": "string", "enum": ["a", "b"]},
                "description": "Optional labels"
            })
        );
        assert_eq!(
            item["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn repeated_runs_serialize_byte_identically() {
        let a = serde_json::to_string_pretty(&cluster_schema(CLUSTER_CUE).unwrap()).unwrap();
        let b = serde_json::to_string_pretty(&cluster_schema(CLUSTER_CUE).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn one_missing_block_does_not_poison_the_sibling() {
        let err = cluster_schema(NODES_CUE).unwrap_err();
        assert!(matches!(err, SchemaError::BlockNotFound(ref id) if id == "#Config"));
        // the nodes document still assembles from its own source
        assert!(nodes_schema(NODES_CUE).is_ok());
    }
}
