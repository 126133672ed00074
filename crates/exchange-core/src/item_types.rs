// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Item type registry
//
// Item types are stored as a JSON object mapping each type name to its
// ordered list of property labels.

use crate::storage::{self, JsonFile};
use crate::types::{AppError, ItemType};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::RwLock;

type Schemas = IndexMap<String, Vec<String>>;

fn default_schemas() -> Schemas {
    let mut schemas = Schemas::new();
    schemas.insert(
        "Books".to_string(),
        vec!["Author".to_string(), "Publisher".to_string()],
    );
    schemas.insert(
        "Food".to_string(),
        vec!["Production date".to_string(), "Shelf life".to_string()],
    );
    schemas.insert(
        "Tools".to_string(),
        vec!["Brand".to_string(), "Model".to_string()],
    );
    schemas
}

/// File-based store of item type schemas
pub struct ItemTypeRegistry {
    schemas: RwLock<Schemas>,
    file: JsonFile,
}

impl ItemTypeRegistry {
    /// Open the store, seeding the example types on first run
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = JsonFile::new(path);
        let schemas = file.load_or_init(default_schemas)?;

        Ok(Self {
            schemas: RwLock::new(schemas),
            file,
        })
    }

    /// Insert a type, overwriting any existing type of the same name
    pub fn define_type(&self, name: &str, properties: Vec<String>) -> Result<ItemType, AppError> {
        let schema = ItemType::new(name, properties);
        if schema.name.is_empty() {
            return Err(AppError::Validation("Item type name is required".to_string()));
        }

        let mut schemas = storage::write(&self.schemas);
        let mut next = schemas.clone();
        next.insert(schema.name.clone(), schema.properties.clone());
        self.file.save(&next)?;
        *schemas = next;

        tracing::info!(
            "Defined item type {} with {} properties",
            schema.name,
            schema.properties.len()
        );
        Ok(schema)
    }

    /// Store the schema under `new_name` and drop `old_name` when it differs.
    /// Renaming onto another existing type is rejected.
    /// Existing items are not touched here; see `ItemRegistry::reconcile_items_of_type`.
    pub fn rename_or_modify(
        &self,
        old_name: &str,
        new_name: &str,
        properties: Vec<String>,
    ) -> Result<ItemType, AppError> {
        let schema = ItemType::new(new_name, properties);
        if schema.name.is_empty() || schema.properties.is_empty() {
            return Err(AppError::Validation(
                "A new type name and at least one property are required".to_string(),
            ));
        }

        let mut schemas = storage::write(&self.schemas);
        let Some(position) = schemas.get_index_of(old_name) else {
            return Err(AppError::NotFound(format!("Item type {}", old_name)));
        };
        if schema.name != old_name && schemas.contains_key(&schema.name) {
            return Err(AppError::Validation(format!(
                "Item type {} already exists",
                schema.name
            )));
        }

        let mut next = schemas.clone();
        if schema.name == old_name {
            if let Some((_, properties)) = next.get_index_mut(position) {
                *properties = schema.properties.clone();
            }
        } else {
            // Keep the renamed type where the old one was listed.
            next.shift_remove(old_name);
            next.shift_insert(position, schema.name.clone(), schema.properties.clone());
        }
        self.file.save(&next)?;
        *schemas = next;

        tracing::info!("Item type {} modified as {}", old_name, schema.name);
        Ok(schema)
    }

    /// Type names in store order
    pub fn list_types(&self) -> Vec<String> {
        storage::read(&self.schemas).keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<ItemType> {
        storage::read(&self.schemas)
            .get(name)
            .map(|properties| ItemType {
                name: name.to_string(),
                properties: properties.clone(),
            })
    }

    pub fn properties_of(&self, name: &str) -> Result<Vec<String>, AppError> {
        self.get(name)
            .map(|schema| schema.properties)
            .ok_or_else(|| AppError::NotFound(format!("Item type {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_registry() -> (TempDir, ItemTypeRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = ItemTypeRegistry::open(dir.path().join("item_types.json")).unwrap();
        (dir, registry)
    }

    fn props(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_first_run_seeds_defaults() {
        let (_dir, registry) = open_registry();
        assert_eq!(registry.list_types(), vec!["Books", "Food", "Tools"]);
        assert_eq!(
            registry.properties_of("Books").unwrap(),
            vec!["Author", "Publisher"]
        );
    }

    #[test]
    fn test_define_overwrites() {
        let (_dir, registry) = open_registry();
        registry.define_type("Books", props(&["ISBN"])).unwrap();
        registry.define_type("Clothes", props(&["Size", "", "Color"])).unwrap();

        assert_eq!(registry.properties_of("Books").unwrap(), vec!["ISBN"]);
        assert_eq!(registry.properties_of("Clothes").unwrap(), vec!["Size", "Color"]);
        assert_eq!(registry.list_types().len(), 4);
    }

    #[test]
    fn test_define_requires_name() {
        let (_dir, registry) = open_registry();
        assert!(matches!(
            registry.define_type("  ", props(&["A"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rename_replaces_old_name_in_place() {
        let (_dir, registry) = open_registry();
        registry
            .rename_or_modify("Food", "Snacks", props(&["Flavor"]))
            .unwrap();

        assert_eq!(registry.list_types(), vec!["Books", "Snacks", "Tools"]);
        assert!(registry.get("Food").is_none());
        assert_eq!(registry.properties_of("Snacks").unwrap(), vec!["Flavor"]);
    }

    #[test]
    fn test_modify_same_name() {
        let (_dir, registry) = open_registry();
        registry
            .rename_or_modify("Tools", "Tools", props(&["Brand", "Weight"]))
            .unwrap();
        assert_eq!(
            registry.properties_of("Tools").unwrap(),
            vec!["Brand", "Weight"]
        );
    }

    #[test]
    fn test_rename_unknown_type() {
        let (_dir, registry) = open_registry();
        assert!(matches!(
            registry.rename_or_modify("Furniture", "Chairs", props(&["Legs"])),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_onto_existing_type_is_rejected() {
        let (_dir, registry) = open_registry();
        assert!(matches!(
            registry.rename_or_modify("Books", "Tools", props(&["Author"])),
            Err(AppError::Validation(_))
        ));
        assert_eq!(registry.list_types(), vec!["Books", "Food", "Tools"]);
        assert_eq!(registry.properties_of("Tools").unwrap(), vec!["Brand", "Model"]);
    }

    #[test]
    fn test_failed_write_keeps_memory_unchanged() {
        let (dir, registry) = open_registry();
        let path = dir.path().join("item_types.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            registry.define_type("Bikes", props(&["Gears"])),
            Err(AppError::FileIo(_))
        ));
        assert!(matches!(
            registry.rename_or_modify("Food", "Snacks", props(&["Flavor"])),
            Err(AppError::FileIo(_))
        ));
        assert_eq!(registry.list_types(), vec!["Books", "Food", "Tools"]);
    }

    #[test]
    fn test_rename_requires_properties() {
        let (_dir, registry) = open_registry();
        assert!(matches!(
            registry.rename_or_modify("Books", "Books", props(&[" "])),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            registry.properties_of("Books").unwrap(),
            vec!["Author", "Publisher"]
        );
    }

    #[test]
    fn test_reopen_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item_types.json");
        {
            let registry = ItemTypeRegistry::open(&path).unwrap();
            registry.define_type("Bikes", props(&["Gears"])).unwrap();
        }
        let reopened = ItemTypeRegistry::open(&path).unwrap();
        assert_eq!(reopened.list_types(), vec!["Books", "Food", "Tools", "Bikes"]);
    }
}
