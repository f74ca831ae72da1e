//! Named template library.
//!
//! Palette entries and user-saved sections live here; entries are id-less
//! templates, stamped out through `add_block` at insertion time. The library
//! is part of the durable document state.

use serde::{Deserialize, Serialize};

use blockforge_model::BlockTemplate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTemplate {
    pub name: String,
    pub template: BlockTemplate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateLibrary {
    templates: Vec<NamedTemplate>,
}

impl TemplateLibrary {
    /// Add or replace the entry with the same name.
    pub fn add(&mut self, name: &str, template: BlockTemplate) {
        match self.templates.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.template = template,
            None => self.templates.push(NamedTemplate {
                name: name.to_string(),
                template,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BlockTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .map(|t| &t.template)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.name != name);
        self.templates.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
