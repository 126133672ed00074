// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Service layer
//
// Bundles the three stores and enforces who may do what: the admin account
// manages users, item types and the item list; approved members post items.

use crate::accounts::{AccountRegistry, ADMIN_USERNAME};
use crate::fuzzy::{PartialRatio, Similarity};
use crate::item_types::ItemTypeRegistry;
use crate::items::{ItemRegistry, SearchHit};
use crate::prompt::Prompter;
use crate::settings::ExchangeSettings;
use crate::types::{Account, AppError, Item, ItemFields, ItemType, Properties, Role, Session};

/// The exchange board: stores plus the operations frontends call
pub struct Exchange {
    settings: ExchangeSettings,
    accounts: AccountRegistry,
    item_types: ItemTypeRegistry,
    items: ItemRegistry,
    matcher: Box<dyn Similarity + Send + Sync>,
}

impl Exchange {
    /// Open all stores under the settings' data directory
    pub fn open(settings: ExchangeSettings) -> Result<Self, AppError> {
        tracing::info!("Opening exchange data in {:?}", settings.data_dir);
        let accounts = AccountRegistry::open(settings.users_path())?;
        let item_types = ItemTypeRegistry::open(settings.item_types_path())?;
        let items = ItemRegistry::open(settings.items_path())?;

        Ok(Self {
            settings,
            accounts,
            item_types,
            items,
            matcher: Box::new(PartialRatio),
        })
    }

    /// Replace the similarity function used by search
    pub fn with_matcher(mut self, matcher: impl Similarity + Send + Sync + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    // Accounts

    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
        address: &str,
        contact: &str,
    ) -> Result<(), AppError> {
        self.accounts
            .register(username, password, confirm, address, contact)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        self.accounts.authenticate(username, password)?;
        let role = if username == ADMIN_USERNAME {
            Role::Admin
        } else {
            Role::Member
        };

        tracing::info!("{} logged in as {:?}", username, role);
        Ok(Session {
            username: username.to_string(),
            role,
        })
    }

    fn require_admin(&self, session: &Session, action: &str) -> Result<(), AppError> {
        if session.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "only the administrator can {}",
                action
            )))
        }
    }

    fn require_member(&self, session: &Session, action: &str) -> Result<(), AppError> {
        if session.is_admin() {
            return Err(AppError::PermissionDenied(format!(
                "the administrator cannot {}",
                action
            )));
        }

        // Approval may have been withdrawn since login.
        match self.accounts.get(&session.username) {
            Some(account) if account.is_approved() => Ok(()),
            Some(_) => Err(AppError::NotApproved(session.username.clone())),
            None => Err(AppError::NotFound(format!(
                "User {} does not exist",
                session.username
            ))),
        }
    }

    pub fn approve_user(&self, session: &Session, username: &str) -> Result<(), AppError> {
        self.require_admin(session, "approve users")?;
        self.accounts.approve(username)
    }

    pub fn reject_user(&self, session: &Session, username: &str) -> Result<(), AppError> {
        self.require_admin(session, "reject users")?;
        self.accounts.reject(username)
    }

    pub fn user_info(&self, session: &Session, username: &str) -> Result<Account, AppError> {
        self.require_admin(session, "view user details")?;
        self.accounts
            .get(username)
            .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", username)))
    }

    pub fn list_users(&self, session: &Session) -> Result<Vec<String>, AppError> {
        self.require_admin(session, "list users")?;
        Ok(self.accounts.list_usernames())
    }

    pub fn pending_users(&self, session: &Session) -> Result<Vec<String>, AppError> {
        self.require_admin(session, "list pending users")?;
        Ok(self.accounts.pending_usernames())
    }

    // Item types

    /// Define a type. Redefining an existing type backfills its items.
    pub fn add_item_type(
        &self,
        session: &Session,
        name: &str,
        properties: Vec<String>,
    ) -> Result<ItemType, AppError> {
        self.require_admin(session, "define item types")?;
        let schema = self.item_types.define_type(name, properties)?;
        self.items
            .reconcile_items_of_type(&schema.name, &schema, &self.settings.placeholder)?;
        Ok(schema)
    }

    /// Rename and/or change the properties of a type, then backfill its items.
    /// Returns the stored schema and the number of items reconciled.
    pub fn modify_item_type(
        &self,
        session: &Session,
        old_name: &str,
        new_name: &str,
        properties: Vec<String>,
    ) -> Result<(ItemType, usize), AppError> {
        self.require_admin(session, "modify item types")?;
        let schema = self
            .item_types
            .rename_or_modify(old_name, new_name, properties)?;
        let touched =
            self.items
                .reconcile_items_of_type(old_name, &schema, &self.settings.placeholder)?;
        Ok((schema, touched))
    }

    pub fn item_types(&self) -> Vec<String> {
        self.item_types.list_types()
    }

    pub fn item_type_properties(&self, name: &str) -> Result<Vec<String>, AppError> {
        self.item_types.properties_of(name)
    }

    // Items

    pub fn items(&self) -> Vec<Item> {
        self.items.list()
    }

    pub fn add_item(
        &self,
        session: &Session,
        fields: ItemFields,
        item_type: &str,
        values: Properties,
    ) -> Result<Item, AppError> {
        self.require_member(session, "post items")?;
        if item_type.is_empty() {
            return Err(AppError::Validation("An item type must be selected".to_string()));
        }
        let schema = self
            .item_types
            .get(item_type)
            .ok_or_else(|| AppError::Validation(format!("Unknown item type: {}", item_type)))?;

        self.items.add_item(fields, &schema, values)
    }

    pub fn update_item(
        &self,
        session: &Session,
        index: usize,
        fields: ItemFields,
        properties: Properties,
    ) -> Result<Item, AppError> {
        self.require_admin(session, "edit items")?;
        self.items.update_item(index, fields, properties)
    }

    pub fn delete_item(
        &self,
        session: &Session,
        index: usize,
        prompter: &dyn Prompter,
    ) -> Result<Option<Item>, AppError> {
        self.require_admin(session, "delete items")?;
        self.items.delete_item(index, prompter)
    }

    /// Fuzzy search within one item type using the configured threshold
    pub fn search(&self, item_type: &str, keyword: &str) -> Result<Vec<SearchHit>, AppError> {
        self.items.search(
            item_type,
            keyword,
            self.settings.search_threshold,
            self.matcher.as_ref(),
        )
    }
}

/// Multi-line description of an item: name, contact fields, then properties
pub fn format_item(item: &Item) -> String {
    let mut lines = vec![
        format!("Name: {}", item.fields.name),
        format!("Description: {}", item.fields.description),
        format!("Address: {}", item.fields.address),
        format!("Phone: {}", item.fields.phone),
        format!("Email: {}", item.fields.email),
        format!("Type: {}", item.item_type),
    ];
    lines.extend(
        item.properties
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoPrompter;
    use tempfile::TempDir;

    fn open_exchange() -> (TempDir, Exchange) {
        let dir = tempfile::tempdir().unwrap();
        let exchange = Exchange::open(ExchangeSettings::with_data_dir(dir.path())).unwrap();
        (dir, exchange)
    }

    fn admin(exchange: &Exchange) -> Session {
        exchange.login(ADMIN_USERNAME, "123456").unwrap()
    }

    fn member(exchange: &Exchange, name: &str) -> Session {
        exchange.sign_up(name, "pw", "pw", "Dorm", "contact").unwrap();
        exchange.approve_user(&admin(exchange), name).unwrap();
        exchange.login(name, "pw").unwrap()
    }

    fn fields(name: &str) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            description: "good condition".to_string(),
            address: "Dorm 2".to_string(),
            phone: "555-0101".to_string(),
            email: "m@example.org".to_string(),
        }
    }

    fn values(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_login_roles() {
        let (_dir, exchange) = open_exchange();
        assert!(admin(&exchange).is_admin());
        assert_eq!(member(&exchange, "ivan").role, Role::Member);
    }

    #[test]
    fn test_member_cannot_manage() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        assert!(matches!(
            exchange.approve_user(&ivan, "ivan"),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            exchange.add_item_type(&ivan, "Bikes", vec!["Gears".to_string()]),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            exchange.delete_item(&ivan, 0, &AutoPrompter::YES),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_admin_cannot_post_items() {
        let (_dir, exchange) = open_exchange();
        let result = exchange.add_item(
            &admin(&exchange),
            fields("Lamp"),
            "Tools",
            values(&[("Brand", "Ikea"), ("Model", "Tertial")]),
        );
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[test]
    fn test_rejected_after_login_cannot_post() {
        let (_dir, exchange) = open_exchange();
        let judy = member(&exchange, "judy");
        exchange.reject_user(&admin(&exchange), "judy").unwrap();

        let result = exchange.add_item(
            &judy,
            fields("Lamp"),
            "Tools",
            values(&[("Brand", "Ikea"), ("Model", "Tertial")]),
        );
        assert!(matches!(result, Err(AppError::NotApproved(_))));
    }

    #[test]
    fn test_add_item_unknown_type() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        assert!(matches!(
            exchange.add_item(&ivan, fields("Lamp"), "Furniture", Properties::new()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            exchange.add_item(&ivan, fields("Lamp"), "", Properties::new()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_modify_type_backfills_items() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        let root = admin(&exchange);
        exchange
            .add_item_type(&root, "Gadgets", vec!["A".to_string(), "B".to_string()])
            .unwrap();
        exchange
            .add_item(&ivan, fields("Radio"), "Gadgets", values(&[("A", "x"), ("B", "y")]))
            .unwrap();

        let (schema, touched) = exchange
            .modify_item_type(&root, "Gadgets", "Gadgets", vec!["B".to_string(), "C".to_string()])
            .unwrap();
        assert_eq!(schema.properties, vec!["B", "C"]);
        assert_eq!(touched, 1);
        assert_eq!(
            exchange.items()[0].properties,
            values(&[("B", "y"), ("C", "unknown")])
        );
    }

    #[test]
    fn test_rename_type_retags_items() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        exchange
            .add_item(
                &ivan,
                fields("Dune"),
                "Books",
                values(&[("Author", "Herbert"), ("Publisher", "Ace")]),
            )
            .unwrap();

        exchange
            .modify_item_type(
                &admin(&exchange),
                "Books",
                "Novels",
                vec!["Author".to_string()],
            )
            .unwrap();

        assert!(!exchange.item_types().contains(&"Books".to_string()));
        assert_eq!(exchange.items()[0].item_type, "Novels");
        assert_eq!(exchange.search("Novels", "Dune").unwrap().len(), 1);
        assert!(exchange.search("Books", "Dune").unwrap().is_empty());
    }

    #[test]
    fn test_rename_onto_existing_type_keeps_its_items() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        exchange
            .add_item(
                &ivan,
                fields("Drill"),
                "Tools",
                values(&[("Brand", "Bosch"), ("Model", "X")]),
            )
            .unwrap();

        let root = admin(&exchange);
        let result = exchange.modify_item_type(&root, "Books", "Tools", vec!["Author".to_string()]);
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            exchange.item_type_properties("Tools").unwrap(),
            vec!["Brand", "Model"]
        );
        assert!(exchange.item_types().contains(&"Books".to_string()));

        let item = &exchange.items()[0];
        assert_eq!(item.item_type, "Tools");
        assert_eq!(item.properties, values(&[("Brand", "Bosch"), ("Model", "X")]));
    }

    #[test]
    fn test_redefining_type_backfills_items() {
        let (_dir, exchange) = open_exchange();
        let ivan = member(&exchange, "ivan");
        exchange
            .add_item(
                &ivan,
                fields("Drill"),
                "Tools",
                values(&[("Brand", "Bosch"), ("Model", "X")]),
            )
            .unwrap();

        let root = admin(&exchange);
        exchange
            .add_item_type(&root, "Tools", vec!["Brand".to_string(), "Voltage".to_string()])
            .unwrap();

        let item = &exchange.items()[0];
        assert_eq!(
            item.properties,
            values(&[("Brand", "Bosch"), ("Voltage", "unknown")])
        );
        let updated = exchange.update_item(
            &root,
            0,
            fields("Drill"),
            values(&[("Brand", "Bosch"), ("Model", "X")]),
        );
        assert!(matches!(updated, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_custom_matcher() {
        struct Exact;
        impl Similarity for Exact {
            fn score(&self, needle: &str, haystack: &str) -> u8 {
                if needle == haystack {
                    100
                } else {
                    0
                }
            }
        }

        let (_dir, exchange) = open_exchange();
        let exchange = exchange.with_matcher(Exact);
        let ivan = member(&exchange, "ivan");
        exchange
            .add_item(
                &ivan,
                fields("Hammer"),
                "Tools",
                values(&[("Brand", "Stanley"), ("Model", "16oz")]),
            )
            .unwrap();

        assert!(exchange.search("Tools", "Hamme").unwrap().is_empty());
        assert_eq!(exchange.search("Tools", "Hammer").unwrap().len(), 1);
    }

    #[test]
    fn test_format_item() {
        let item = Item {
            fields: fields("Lamp"),
            item_type: "Tools".to_string(),
            properties: values(&[("Brand", "Ikea")]),
        };
        let text = format_item(&item);
        assert!(text.starts_with("Name: Lamp\n"));
        assert!(text.ends_with("Brand: Ikea"));
    }
}
