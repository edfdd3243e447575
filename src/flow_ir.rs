use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Typed intermediate representation of a compiled workflow.
///
/// Everything references everything else by node id. A `Flow` is only ever
/// produced by [`crate::assemble::assemble_flow`] and then transformed by
/// value; nothing mutates one in place after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub models: Vec<ModelRef>,
    pub tools: Vec<ToolSpec>,
    pub agents: Vec<AgentSpec>,
    pub edges: Vec<Edge>,
}

impl Flow {
    pub fn model(&self, id: &str) -> Option<&ModelRef> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn tool(&self, id: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn agent(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Replace tool shapes with the given set, consuming the flow.
    ///
    /// Tools absent from `shapes` keep the shapes they already carry.
    pub fn with_tool_shapes(mut self, mut shapes: ToolShapes) -> Flow {
        for tool in &mut self.tools {
            if let Some(shape) = shapes.swap_remove(&tool.id) {
                tool.input_shape = shape.input;
                tool.output_shape = shape.output;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: String,
    pub provider: Provider,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_shape: Shape,
    #[serde(default)]
    pub output_shape: Shape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Supervisor,
    Observer,
    #[default]
    Content,
    Search,
    Image,
    Planning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub model_ref: String,
    /// Bound tool ids in inbound-edge order; duplicates are kept.
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRef {
    pub node_id: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: PortRef,
    pub to: PortRef,
}

/// The kind tag of a single schema field.
///
/// Unknown tags are kept verbatim in [`FieldKind::Other`] so that hand-written
/// overrides using newer tags still emit (as an accept-anything validator).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Other(String),
}

impl FieldKind {
    pub fn from_tag(tag: &str) -> FieldKind {
        match tag {
            "string" => FieldKind::String,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "array" => FieldKind::Array,
            "object" => FieldKind::Object,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
            FieldKind::Other(tag) => tag,
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldKind::from_tag(&tag))
    }
}

/// Field name -> kind, in insertion order.
pub type Shape = IndexMap<String, FieldKind>;

/// Input and output shape of one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolShape {
    pub input: Shape,
    pub output: Shape,
}

/// Tool id -> shapes, in flow tool order.
pub type ToolShapes = IndexMap<String, ToolShape>;
