// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Terminal - Menus
//
// Every handler returns `None` once stdin is closed, which unwinds to `run`.

use crate::console::Console;
use exchange_core::{
    format_item, AppError, Exchange, ItemFields, Prompter, Properties, Session,
};

pub struct Shell {
    exchange: Exchange,
    console: Console,
}

impl Shell {
    pub fn new(exchange: Exchange, console: Console) -> Self {
        Self { exchange, console }
    }

    pub fn run(&self) {
        self.console.inform("Welcome", "Campus Exchange");
        while self.main_menu().is_some() {}
        tracing::info!("Input closed, exiting");
    }

    /// Show an error dialog for a failed operation
    fn report<T>(&self, result: Result<T, AppError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.console.error("Error", &e.to_string());
                None
            }
        }
    }

    fn main_menu(&self) -> Option<()> {
        println!("\n1. Log in\n2. Sign up\n0. Quit");
        match self.console.ask("Choice")?.trim() {
            "1" => self.login(),
            "2" => self.sign_up(),
            "0" => None,
            _ => Some(()),
        }
    }

    fn login(&self) -> Option<()> {
        let username = self.console.ask("Username")?;
        let password = self.console.ask("Password")?;

        match self.exchange.login(username.trim(), &password) {
            Ok(session) if session.is_admin() => self.admin_panel(&session),
            Ok(session) => self.member_panel(&session),
            Err(AppError::NotFound(_)) => {
                if self
                    .console
                    .confirm("Notice", "You are not registered yet. Sign up now?")
                {
                    self.sign_up()
                } else {
                    Some(())
                }
            }
            Err(e) => {
                self.console.error("Login failed", &e.to_string());
                Some(())
            }
        }
    }

    fn sign_up(&self) -> Option<()> {
        let username = self.console.ask("New username")?;
        let password = self.console.ask("Password")?;
        let confirm = self.console.ask("Confirm password")?;
        let address = self.console.ask("Address")?;
        let contact = self.console.ask("Contact")?;

        let result = self
            .exchange
            .sign_up(&username, &password, &confirm, &address, &contact);
        if self.report(result).is_some() {
            self.console.inform(
                "Welcome",
                "Registration complete, waiting for administrator approval",
            );
        }
        Some(())
    }

    // Admin panel

    fn admin_panel(&self, session: &Session) -> Option<()> {
        loop {
            println!(
                "\n-- Admin --\n1. Review pending users\n2. View user info\n3. Add item type\n\
                 4. Modify item type\n5. View item type properties\n6. Manage items\n0. Log out"
            );
            match self.console.ask("Choice")?.trim() {
                "1" => self.review_pending(session)?,
                "2" => self.view_user(session)?,
                "3" => self.add_item_type(session)?,
                "4" => self.modify_item_type(session)?,
                "5" => self.view_type_properties()?,
                "6" => self.manage_items(session)?,
                "0" => return Some(()),
                _ => {}
            }
        }
    }

    fn review_pending(&self, session: &Session) -> Option<()> {
        let Some(pending) = self.report(self.exchange.pending_users(session)) else {
            return Some(());
        };
        let Some(index) = self.console.choose("User", &pending)? else {
            return Some(());
        };
        let username = &pending[index];

        let decision = self.console.ask("(a)pprove or (r)eject")?;
        match decision.trim() {
            "a" => {
                if self.report(self.exchange.approve_user(session, username)).is_some() {
                    self.console.inform("Done", &format!("{} approved", username));
                }
            }
            "r" => {
                if self.report(self.exchange.reject_user(session, username)).is_some() {
                    self.console.inform("Done", &format!("{} rejected", username));
                }
            }
            _ => {}
        }
        Some(())
    }

    fn view_user(&self, session: &Session) -> Option<()> {
        let Some(users) = self.report(self.exchange.list_users(session)) else {
            return Some(());
        };
        let Some(index) = self.console.choose("User", &users)? else {
            return Some(());
        };

        if let Some(account) = self.report(self.exchange.user_info(session, &users[index])) {
            self.console.inform(
                "User",
                &format!(
                    "Username: {}\nAddress: {}\nContact: {}\nStatus: {}",
                    users[index], account.address, account.contact, account.status
                ),
            );
        }
        Some(())
    }

    /// Read property labels until a blank line
    fn ask_properties(&self) -> Option<Vec<String>> {
        let mut properties = Vec::new();
        loop {
            let label = self.console.ask("Property (blank to finish)")?;
            if label.trim().is_empty() {
                return Some(properties);
            }
            properties.push(label);
        }
    }

    fn add_item_type(&self, session: &Session) -> Option<()> {
        let name = self.console.ask("Item type name")?;
        let properties = self.ask_properties()?;

        if let Some(schema) = self.report(self.exchange.add_item_type(session, &name, properties)) {
            self.console
                .inform("Success", &format!("Item type '{}' saved", schema.name));
        }
        Some(())
    }

    fn modify_item_type(&self, session: &Session) -> Option<()> {
        let types = self.exchange.item_types();
        let Some(index) = self.console.choose("Item type", &types)? else {
            return Some(());
        };
        let old_name = &types[index];
        if let Ok(current) = self.exchange.item_type_properties(old_name) {
            println!("Current properties: {}", current.join(", "));
        }

        let new_name = self.console.ask("New name")?;
        let properties = self.ask_properties()?;
        let result = self
            .exchange
            .modify_item_type(session, old_name, &new_name, properties);

        if let Some((schema, touched)) = self.report(result) {
            self.console.inform(
                "Success",
                &format!(
                    "Item type '{}' changed to '{}', {} items updated",
                    old_name, schema.name, touched
                ),
            );
        }
        Some(())
    }

    fn view_type_properties(&self) -> Option<()> {
        let types = self.exchange.item_types();
        let Some(index) = self.console.choose("Item type", &types)? else {
            return Some(());
        };

        if let Some(properties) = self.report(self.exchange.item_type_properties(&types[index])) {
            self.console.inform(
                "Properties",
                &format!("'{}':\n{}", types[index], properties.join("\n")),
            );
        }
        Some(())
    }

    fn manage_items(&self, session: &Session) -> Option<()> {
        let names: Vec<String> = self
            .exchange
            .items()
            .into_iter()
            .map(|item| item.fields.name)
            .collect();
        let Some(index) = self.console.choose("Item", &names)? else {
            return Some(());
        };

        match self.console.ask("(e)dit or (d)elete")?.trim() {
            "e" => self.edit_item(session, index),
            "d" => {
                let result = self.exchange.delete_item(session, index, &self.console);
                if let Some(Some(item)) = self.report(result) {
                    self.console
                        .inform("Success", &format!("Item '{}' deleted", item.fields.name));
                }
                Some(())
            }
            _ => Some(()),
        }
    }

    /// Ask for a value, keeping `current` when the answer is blank
    fn ask_with_default(&self, label: &str, current: &str) -> Option<String> {
        let answer = self.console.ask(&format!("{} [{}]", label, current))?;
        Some(if answer.trim().is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    fn edit_item(&self, session: &Session, index: usize) -> Option<()> {
        let Some(item) = self.exchange.items().into_iter().nth(index) else {
            self.console.error("Error", "The item no longer exists");
            return Some(());
        };

        let fields = ItemFields {
            name: self.ask_with_default("Name", &item.fields.name)?,
            description: self.ask_with_default("Description", &item.fields.description)?,
            address: self.ask_with_default("Address", &item.fields.address)?,
            phone: self.ask_with_default("Phone", &item.fields.phone)?,
            email: self.ask_with_default("Email", &item.fields.email)?,
        };
        let mut properties = Properties::new();
        for (name, value) in &item.properties {
            properties.insert(name.clone(), self.ask_with_default(name, value)?);
        }

        let result = self
            .exchange
            .update_item(session, index, fields, properties);
        if self.report(result).is_some() {
            self.console.inform("Success", "Item updated");
        }
        Some(())
    }

    // Member panel

    fn member_panel(&self, session: &Session) -> Option<()> {
        loop {
            println!(
                "\n-- Welcome, {} --\n1. Post an item\n2. Search items\n0. Log out",
                session.username
            );
            match self.console.ask("Choice")?.trim() {
                "1" => self.post_item(session)?,
                "2" => self.search()?,
                "0" => return Some(()),
                _ => {}
            }
        }
    }

    fn post_item(&self, session: &Session) -> Option<()> {
        let fields = ItemFields {
            name: self.console.ask("Item name")?,
            description: self.console.ask("Description")?,
            address: self.console.ask("Address")?,
            phone: self.console.ask("Phone")?,
            email: self.console.ask("Email")?,
        };

        let types = self.exchange.item_types();
        let Some(index) = self.console.choose("Item type", &types)? else {
            self.console.error("Error", "An item type must be selected");
            return Some(());
        };
        let item_type = &types[index];

        let Some(names) = self.report(self.exchange.item_type_properties(item_type)) else {
            return Some(());
        };
        let mut values = Properties::new();
        for name in names {
            let value = self.console.ask(&name)?;
            values.insert(name, value);
        }

        let result = self.exchange.add_item(session, fields, item_type, values);
        if let Some(item) = self.report(result) {
            self.console
                .inform("Success", &format!("Item '{}' added", item.fields.name));
        }
        Some(())
    }

    fn search(&self) -> Option<()> {
        let types = self.exchange.item_types();
        let Some(index) = self.console.choose("Item type", &types)? else {
            return Some(());
        };
        let keyword = self.console.ask("Keyword (name or description)")?;

        let Some(hits) = self.report(self.exchange.search(&types[index], keyword.trim())) else {
            return Some(());
        };
        if hits.is_empty() {
            self.console.inform("No results", "No matching items found.");
        } else {
            let text = hits
                .iter()
                .enumerate()
                .map(|(i, hit)| format!("Item {}:\n{}", i + 1, format_item(&hit.item)))
                .collect::<Vec<_>>()
                .join("\n\n");
            self.console.inform("Search results", &text);
        }
        Some(())
    }
}
