use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::user::User;
use crate::time::ServerTimestamp;

/// Question key (or property key) → submitted values.
pub type ValueMap = BTreeMap<String, Vec<String>>;

/// The folded, versioned state of one assessment at a point in its event log.
///
/// This is also the body of an `AssessmentVersionQueryResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AssessmentVersion {
    pub assessment_uuid: Uuid,
    pub aggregate_uuid: Uuid,
    pub assessment_type: Option<String>,
    pub form_version: String,
    #[ts(type = "string")]
    pub created_at: ServerTimestamp,
    #[ts(type = "string")]
    pub updated_at: ServerTimestamp,
    pub answers: ValueMap,
    pub properties: ValueMap,
    pub collections: Vec<Collection>,
    pub collaborators: Vec<User>,
    pub identifiers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Collection {
    pub uuid: Uuid,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: ServerTimestamp,
    #[ts(type = "string")]
    pub updated_at: ServerTimestamp,
    pub items: Vec<CollectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CollectionItem {
    pub uuid: Uuid,
    #[ts(type = "string")]
    pub created_at: ServerTimestamp,
    #[ts(type = "string")]
    pub updated_at: ServerTimestamp,
    pub answers: ValueMap,
    pub properties: ValueMap,
}

impl AssessmentVersion {
    pub fn collection(&self, uuid: Uuid) -> Option<&Collection> {
        self.collections.iter().find(|c| c.uuid == uuid)
    }

    pub fn collection_named(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn collection_mut(&mut self, uuid: Uuid) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.uuid == uuid)
    }

    /// The collection holding `item_uuid`, and the item's position in it.
    pub fn find_item(&self, item_uuid: Uuid) -> Option<(&Collection, usize)> {
        self.collections.iter().find_map(|c| {
            c.items
                .iter()
                .position(|item| item.uuid == item_uuid)
                .map(|index| (c, index))
        })
    }

    pub fn item_mut(&mut self, item_uuid: Uuid) -> Option<(&mut Collection, usize)> {
        self.collections.iter_mut().find_map(|c| {
            let index = c.items.iter().position(|item| item.uuid == item_uuid)?;
            Some((c, index))
        })
    }

    /// Record `user` as a collaborator unless already present (matched by id).
    pub fn add_collaborator(&mut self, user: &User) {
        if !self.collaborators.iter().any(|u| u.id == user.id) {
            self.collaborators.push(user.clone());
        }
    }
}

/// Apply an added/removed change set to a value map.
///
/// Each added key's value list replaces whatever was stored under that key;
/// removals are applied after additions.
pub fn merge_values(target: &mut ValueMap, added: &ValueMap, removed: &[String]) {
    for (key, values) in added {
        target.insert(key.clone(), values.clone());
    }
    for key in removed {
        target.remove(key);
    }
}
