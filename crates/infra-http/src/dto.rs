// Wire representations (manager & store APIs)

use crate::error::{HttpError, Result};
use chrono::{DateTime, Utc};
use mbyte_core::domain::{DomainError, Node, NodeKind, NodePage, ProcessId};
use serde::Deserialize;

/// Timestamps arrive either as epoch millis or as RFC 3339 text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(DateTime<Utc>),
}

impl RawTimestamp {
    fn into_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis),
            RawTimestamp::Text(at) => Some(at),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDto {
    pub id: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    creation: Option<RawTimestamp>,
    #[serde(default)]
    modification: Option<RawTimestamp>,
    #[serde(default)]
    pub root: bool,
}

impl TryFrom<NodeDto> for Node {
    type Error = DomainError;

    fn try_from(dto: NodeDto) -> std::result::Result<Self, Self::Error> {
        let id = dto
            .id
            .filter(|id| !id.is_empty())
            .ok_or(DomainError::MissingField("id"))?;
        let kind = NodeKind::parse(dto.node_type.as_deref().ok_or(DomainError::MissingField("type"))?)?;

        Ok(Node {
            id,
            parent: dto.parent.filter(|p| !p.is_empty()),
            kind,
            name: dto.name.unwrap_or_default(),
            mimetype: dto.mimetype,
            size: dto.size,
            creation: dto.creation.and_then(RawTimestamp::into_datetime),
            modification: dto.modification.and_then(RawTimestamp::into_datetime),
            root: dto.root,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodePageDto {
    #[serde(default)]
    pub values: Vec<NodeDto>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl TryFrom<NodePageDto> for NodePage {
    type Error = DomainError;

    fn try_from(dto: NodePageDto) -> std::result::Result<Self, Self::Error> {
        Ok(NodePage {
            values: dto
                .values
                .into_iter()
                .map(Node::try_from)
                .collect::<std::result::Result<_, _>>()?,
            total: dto.total,
        })
    }
}

pub fn decode_nodes(dtos: Vec<NodeDto>) -> Result<Vec<Node>> {
    dtos.into_iter()
        .map(|dto| Node::try_from(dto).map_err(HttpError::from))
        .collect()
}

/// Process id from a start-command answer: a JSON string, `{ "id": ... }`, or bare text
pub fn decode_process_id(body: &str) -> Result<ProcessId> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StartResponse {
        Id(String),
        Object { id: String },
    }

    let trimmed = body.trim();
    let id = match serde_json::from_str::<StartResponse>(trimmed) {
        Ok(StartResponse::Id(id)) | Ok(StartResponse::Object { id }) => id,
        Err(_) if !trimmed.is_empty() && !trimmed.starts_with(['{', '[', '"']) => {
            trimmed.to_string()
        }
        Err(e) => {
            return Err(HttpError::Decode(format!(
                "invalid start command response: {}",
                e
            )))
        }
    };

    if id.is_empty() {
        return Err(HttpError::Decode(
            "invalid start command response: missing id".to_string(),
        ));
    }
    Ok(id)
}
