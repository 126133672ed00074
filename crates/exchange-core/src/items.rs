// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Item registry and search
//
// Items are stored as an ordered JSON array. Positions in that array are the
// only item identity, so a position can go stale after a deletion.

use crate::fuzzy::Similarity;
use crate::prompt::Prompter;
use crate::storage::{self, JsonFile};
use crate::types::{AppError, Item, ItemFields, ItemType, Properties};
use std::path::PathBuf;
use std::sync::RwLock;

/// An item that matched a search, with its position and scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub index: usize,
    pub item: Item,
    pub name_score: u8,
    pub description_score: u8,
}

/// File-based item list
pub struct ItemRegistry {
    items: RwLock<Vec<Item>>,
    file: JsonFile,
}

impl ItemRegistry {
    /// Open the store; a missing or empty file is an empty list
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = JsonFile::new(path);
        let items = file.load_or_init(Vec::new)?;

        Ok(Self {
            items: RwLock::new(items),
            file,
        })
    }

    /// Validate an item against its type's schema and append it
    pub fn add_item(
        &self,
        fields: ItemFields,
        schema: &ItemType,
        values: Properties,
    ) -> Result<Item, AppError> {
        fields.validate()?;
        if schema.name.is_empty() {
            return Err(AppError::Validation("An item type must be selected".to_string()));
        }
        let properties = conform_properties(&schema.properties, values)?;

        let item = Item {
            fields,
            item_type: schema.name.clone(),
            properties,
        };

        let mut items = storage::write(&self.items);
        let mut next = items.clone();
        next.push(item.clone());
        self.file.save(&next)?;
        *items = next;

        tracing::info!("Added item {} of type {}", item.name(), item.item_type);
        Ok(item)
    }

    /// Remove the item at `index` once the user confirms. A stale index or a
    /// declined confirmation leaves the list untouched.
    pub fn delete_item(
        &self,
        index: usize,
        prompter: &dyn Prompter,
    ) -> Result<Option<Item>, AppError> {
        let Some(name) = self.get(index).map(|item| item.fields.name) else {
            tracing::debug!("Ignoring delete of stale item index {}", index);
            return Ok(None);
        };

        if !prompter.confirm("Confirm deletion", &format!("Delete item '{}'?", name)) {
            return Ok(None);
        }

        let mut items = storage::write(&self.items);
        if index >= items.len() {
            return Ok(None);
        }
        let mut next = items.clone();
        let removed = next.remove(index);
        self.file.save(&next)?;
        *items = next;

        tracing::info!("Deleted item {} at index {}", removed.name(), index);
        Ok(Some(removed))
    }

    /// Overwrite the fields and property values of the item at `index`.
    /// The property names must stay the ones the item already has.
    pub fn update_item(
        &self,
        index: usize,
        fields: ItemFields,
        properties: Properties,
    ) -> Result<Item, AppError> {
        fields.validate()?;

        let mut items = storage::write(&self.items);
        let current = items
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("Item at index {}", index)))?;

        let names: Vec<String> = current.properties.keys().cloned().collect();
        let updated = Item {
            fields,
            item_type: current.item_type.clone(),
            properties: conform_properties(&names, properties)?,
        };

        let mut next = items.clone();
        next[index] = updated.clone();
        self.file.save(&next)?;
        *items = next;

        tracing::info!("Updated item {} at index {}", updated.name(), index);
        Ok(updated)
    }

    /// Bring every item of type `original_name` in line with `schema`.
    /// Values of surviving properties are kept, new properties get
    /// `placeholder`, dropped properties are discarded, and the items are
    /// re-tagged with the schema's name. Returns the number of items touched.
    pub fn reconcile_items_of_type(
        &self,
        original_name: &str,
        schema: &ItemType,
        placeholder: &str,
    ) -> Result<usize, AppError> {
        let mut items = storage::write(&self.items);
        let mut next = items.clone();
        let mut touched = 0;
        for item in next.iter_mut().filter(|i| i.item_type == original_name) {
            let mut properties = Properties::with_capacity(schema.properties.len());
            for name in &schema.properties {
                let value = item
                    .properties
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| placeholder.to_string());
                properties.insert(name.clone(), value);
            }
            item.properties = properties;
            item.item_type = schema.name.clone();
            touched += 1;
        }

        if touched > 0 {
            self.file.save(&next)?;
            *items = next;
            tracing::info!(
                "Reconciled {} items of type {} with schema {}",
                touched,
                original_name,
                schema.name
            );
        }
        Ok(touched)
    }

    /// Items of exactly `item_type` whose name or description scores at least
    /// `threshold` against `keyword`, in list order
    pub fn search(
        &self,
        item_type: &str,
        keyword: &str,
        threshold: u8,
        matcher: &dyn Similarity,
    ) -> Result<Vec<SearchHit>, AppError> {
        if item_type.is_empty() || keyword.is_empty() {
            return Err(AppError::Validation(
                "Item type and keyword are required".to_string(),
            ));
        }

        let items = storage::read(&self.items);
        let hits: Vec<SearchHit> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.item_type == item_type)
            .filter_map(|(index, item)| {
                let name_score = matcher.score(keyword, item.name());
                let description_score = matcher.score(keyword, item.description());
                tracing::debug!(
                    "Search {:?} against {:?}: name {}, description {}",
                    keyword,
                    item.name(),
                    name_score,
                    description_score
                );

                (name_score >= threshold || description_score >= threshold).then(|| SearchHit {
                    index,
                    item: item.clone(),
                    name_score,
                    description_score,
                })
            })
            .collect();

        Ok(hits)
    }

    pub fn list(&self) -> Vec<Item> {
        storage::read(&self.items).clone()
    }

    pub fn get(&self, index: usize) -> Option<Item> {
        storage::read(&self.items).get(index).cloned()
    }

    pub fn len(&self) -> usize {
        storage::read(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Order `values` by `names`, rejecting missing, empty and unknown properties
fn conform_properties(names: &[String], mut values: Properties) -> Result<Properties, AppError> {
    let mut properties = Properties::with_capacity(names.len());
    for name in names {
        match values.shift_remove(name) {
            Some(value) if !value.trim().is_empty() => {
                properties.insert(name.clone(), value);
            }
            _ => {
                return Err(AppError::Validation(format!(
                    "All properties are required, missing: {}",
                    name
                )))
            }
        }
    }

    if let Some(unknown) = values.keys().next() {
        return Err(AppError::Validation(format!(
            "Unknown property for this item type: {}",
            unknown
        )));
    }

    Ok(properties)
}
