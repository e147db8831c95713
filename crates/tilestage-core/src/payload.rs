//! Payloads exchanged with the content collaborator.
//!
//! The editor emits a [`Request`]; the host performs it and hands back the
//! raw [`Envelope`], which [`Reply::decode`] interprets according to the
//! request that produced it. Transport is the host's business.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::layer::LayerId;
use crate::meta::MetaRegistry;

/// Wire grids keyed by layer: rows of tile reference strings, `""` for an
/// empty cell.
pub type LayerRows = BTreeMap<LayerId, Vec<Vec<String>>>;

/// An operation on the content collaborator. `cg` selects the graphic set
/// whose content is read or written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Request {
    /// Read the metadata registry.
    #[serde(rename = "read/meta")]
    ReadMeta { cg: u8, file: Vec<String> },
    /// Read the menu and the first stage.
    #[serde(rename = "read/game")]
    ReadGame { cg: u8, file: Vec<String> },
    /// Read a fresh stage template.
    #[serde(rename = "read/stage")]
    NewStage { cg: u8, file: Vec<String> },
    /// Move `next` stages away from `stage`.
    #[serde(rename = "next/stage")]
    NextStage { cg: u8, stage: u32, next: i32 },
    /// Persist the stage layers. Stage `0` asks for a new number.
    #[serde(rename = "write/stage")]
    SaveStage {
        content: String,
        cg: u8,
        stage: u32,
        blocks: LayerRows,
    },
}

impl Request {
    /// The wire discriminator.
    pub fn method(&self) -> &'static str {
        match self {
            Self::ReadMeta { .. } => "read/meta",
            Self::ReadGame { .. } => "read/game",
            Self::NewStage { .. } => "read/stage",
            Self::NextStage { .. } => "next/stage",
            Self::SaveStage { .. } => "write/stage",
        }
    }
}

/// A raw response: `data` on success, `error` on failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A decoded response.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Meta(Box<MetaRegistry>),
    /// Menu plus first stage: replaces every layer.
    Game(LayerRows),
    /// A fresh stage template.
    Stage(LayerRows),
    /// The stage reached by navigation.
    Navigated { stage: u32, layers: LayerRows },
    /// The number the stage was saved under.
    Saved { stage: u32 },
}

#[derive(Deserialize)]
struct NavigatedData {
    stage: u32,
    blocks: Value,
}

#[derive(Deserialize)]
struct SavedData {
    stage: u32,
}

impl Reply {
    /// Interpret `envelope` as the answer to `request`.
    pub fn decode(request: &Request, envelope: Envelope) -> Result<Self, Error> {
        if let Some(message) = envelope.error {
            return Err(Error::Service(message));
        }
        let data = envelope.data.ok_or(Error::MissingData)?;
        Ok(match request {
            Request::ReadMeta { .. } => Self::Meta(Box::new(MetaRegistry::from_value(data)?)),
            Request::ReadGame { .. } => Self::Game(layer_rows(data)?),
            Request::NewStage { .. } => Self::Stage(layer_rows(data)?),
            Request::NextStage { .. } => {
                let nav: NavigatedData = serde_json::from_value(data)?;
                Self::Navigated {
                    stage: nav.stage,
                    layers: layer_rows(nav.blocks)?,
                }
            }
            Request::SaveStage { .. } => {
                let saved: SavedData = serde_json::from_value(data)?;
                Self::Saved { stage: saved.stage }
            }
        })
    }
}

/// Extract the layer grids of a payload object. Keys that are not layer
/// names are skipped.
pub fn layer_rows(data: Value) -> Result<LayerRows, Error> {
    let object: BTreeMap<String, Value> = serde_json::from_value(data)?;
    let mut rows = LayerRows::new();
    for (key, value) in object {
        match key.parse::<LayerId>() {
            Ok(id) => {
                rows.insert(id, serde_json::from_value(value)?);
            }
            Err(_) => log::warn!("ignoring non-layer key `{key}` in stage payload"),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_method_tag() {
        let req = Request::NextStage {
            cg: 1,
            stage: 3,
            next: -1,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({ "method": "next/stage", "cg": 1, "stage": 3, "next": -1 }));
        assert_eq!(req.method(), "next/stage");
    }

    #[test]
    fn save_request_keys_layers_by_name() {
        let mut blocks = LayerRows::new();
        blocks.insert(LayerId(1), vec![vec!["".into()]]);
        let req = Request::SaveStage {
            content: "stage".into(),
            cg: 0,
            stage: 0,
            blocks,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["method"], "write/stage");
        assert_eq!(v["blocks"]["layer1"], json!([[""]]));
    }

    #[test]
    fn decode_stage_skips_unknown_keys() {
        let req = Request::NewStage {
            cg: 0,
            file: vec!["stage/new".into()],
        };
        let env = Envelope::ok(json!({ "layer2": [["", "layer2/tree/00"]], "title": "x" }));
        let Reply::Stage(rows) = Reply::decode(&req, env).unwrap() else {
            panic!("expected a stage reply");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[&LayerId(2)][0][1], "layer2/tree/00");
    }

    #[test]
    fn decode_navigation_and_save() {
        let nav = Request::NextStage {
            cg: 0,
            stage: 1,
            next: 1,
        };
        let env = Envelope::ok(json!({ "stage": 2, "blocks": { "layer1": [[""]] } }));
        assert!(matches!(
            Reply::decode(&nav, env).unwrap(),
            Reply::Navigated { stage: 2, ref layers } if layers.contains_key(&LayerId(1))
        ));

        let save = Request::SaveStage {
            content: "stage".into(),
            cg: 0,
            stage: 0,
            blocks: LayerRows::new(),
        };
        let reply = Reply::decode(&save, Envelope::ok(json!({ "stage": 12 }))).unwrap();
        assert_eq!(reply, Reply::Saved { stage: 12 });
    }

    #[test]
    fn decode_surfaces_service_errors() {
        let req = Request::ReadGame {
            cg: 0,
            file: vec![],
        };
        assert!(matches!(
            Reply::decode(&req, Envelope::err("method not found")),
            Err(Error::Service(ref m)) if m == "method not found"
        ));
        assert!(matches!(Reply::decode(&req, Envelope::default()), Err(Error::MissingData)));
    }

    #[test]
    fn decode_meta() {
        let req = Request::ReadMeta {
            cg: 0,
            file: vec!["meta/make/sprite".into()],
        };
        let env = Envelope::ok(json!({ "lastBlock": 5 }));
        let Reply::Meta(meta) = Reply::decode(&req, env).unwrap() else {
            panic!("expected metadata");
        };
        assert_eq!(meta.last_variant(crate::meta::VariantKind::Block), 5);
    }
}
