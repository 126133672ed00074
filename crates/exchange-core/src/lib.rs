// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Shared logic for all frontends
//
// This crate provides:
// - Account, ItemType, Item and AppError types
// - AccountRegistry, ItemTypeRegistry and ItemRegistry file-backed stores
// - Fuzzy partial-ratio matching for item search
// - Exchange, the role-checked service layer frontends call
// - SettingsStore for persistent settings
//
// Frontend-specific code lives in separate crates.

pub mod accounts;
pub mod exchange;
pub mod fuzzy;
pub mod item_types;
pub mod items;
pub mod prompt;
pub mod settings;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use accounts::{AccountRegistry, ADMIN_USERNAME};
pub use exchange::{format_item, Exchange};
pub use fuzzy::{partial_ratio, ratio, PartialRatio, Similarity};
pub use item_types::ItemTypeRegistry;
pub use items::{ItemRegistry, SearchHit};
pub use prompt::{AutoPrompter, Prompter};
pub use settings::{ExchangeSettings, SettingsStore};
pub use storage::JsonFile;
pub use types::{
    Account, AccountStatus, AppError, Item, ItemFields, ItemType, Properties, Role, Session,
};
