pub const AGENT_TYPE: &str = "@n8n/n8n-nodes-langchain.agent";
pub const CHAT_MODEL_TYPE: &str = "@n8n/n8n-nodes-langchain.lmChatOpenAi";
pub const AGENT_TOOL_TYPE: &str = "@n8n/n8n-nodes-langchain.agentTool";
pub const HTTP_REQUEST_TOOL_TYPE: &str = "n8n-nodes-base.httpRequestTool";
pub const MEMORY_BUFFER_WINDOW_TYPE: &str = "@n8n/n8n-nodes-langchain.memoryBufferWindow";
pub const CHAT_TRIGGER_TYPE: &str = "@n8n/n8n-nodes-langchain.chatTrigger";

/// Classification of a node's type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A conversational agent; becomes an `AgentSpec`.
    Agent,
    /// A chat model provider node; becomes a `ModelRef`.
    ChatModel,
    /// An agent exposed to other agents as a tool.
    AgentTool,
    HttpRequestTool,
    MemoryBufferWindow,
    ChatTrigger,
    /// Any node type the compiler has no knowledge of.
    Other(String),
}

impl NodeKind {
    /// Whether nodes of this kind are surfaced as tools.
    pub fn is_tool(&self) -> bool {
        matches!(
            self,
            NodeKind::AgentTool
                | NodeKind::HttpRequestTool
                | NodeKind::MemoryBufferWindow
                | NodeKind::ChatTrigger
        )
    }

    pub fn type_tag(&self) -> &str {
        match self {
            NodeKind::Agent => AGENT_TYPE,
            NodeKind::ChatModel => CHAT_MODEL_TYPE,
            NodeKind::AgentTool => AGENT_TOOL_TYPE,
            NodeKind::HttpRequestTool => HTTP_REQUEST_TOOL_TYPE,
            NodeKind::MemoryBufferWindow => MEMORY_BUFFER_WINDOW_TYPE,
            NodeKind::ChatTrigger => CHAT_TRIGGER_TYPE,
            NodeKind::Other(tag) => tag,
        }
    }
}

/// Classify a node type string into [`NodeKind`].
pub fn classify_node_type(node_type: &str) -> NodeKind {
    match node_type {
        AGENT_TYPE => NodeKind::Agent,
        CHAT_MODEL_TYPE => NodeKind::ChatModel,
        AGENT_TOOL_TYPE => NodeKind::AgentTool,
        HTTP_REQUEST_TOOL_TYPE => NodeKind::HttpRequestTool,
        MEMORY_BUFFER_WINDOW_TYPE => NodeKind::MemoryBufferWindow,
        CHAT_TRIGGER_TYPE => NodeKind::ChatTrigger,
        other => NodeKind::Other(other.to_string()),
    }
}
