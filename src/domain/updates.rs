use serde::Deserialize;

use crate::domain::ItemId;

/// Payload of the `updates.json` change feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Updates {
    pub items: Vec<ItemId>,
    pub profiles: Vec<String>,
}

impl Updates {
    pub fn head(&self) -> Option<ItemId> {
        self.items.first().copied()
    }
}
