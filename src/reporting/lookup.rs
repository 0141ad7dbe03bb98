//! Id to display-name maps for vendors and customers.

use std::collections::HashMap;

use crate::models::{Customer, Vendor};

/// Display names keyed by record id. The first record for an id wins.
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    names: HashMap<String, String>,
}

impl NameLookup {
    fn build<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut names = HashMap::new();
        for (id, name) in entries {
            names
                .entry(id.to_string())
                .or_insert_with(|| name.to_string());
        }
        Self { names }
    }

    pub fn vendors(vendors: &[Vendor]) -> Self {
        Self::build(vendors.iter().map(|v| (v.id.as_str(), v.display_name())))
    }

    pub fn customers(customers: &[Customer]) -> Self {
        Self::build(customers.iter().map(|c| (c.id.as_str(), c.display_name())))
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

/// Both lookups built for one report run.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub vendors: NameLookup,
    pub customers: NameLookup,
}

impl Lookups {
    pub fn build(vendors: &[Vendor], customers: &[Customer]) -> Self {
        Self {
            vendors: NameLookup::vendors(vendors),
            customers: NameLookup::customers(customers),
        }
    }
}
