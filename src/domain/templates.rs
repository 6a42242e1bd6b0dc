//! Named style templates persisted in a key-value store.

use crate::domain::alerts::RandomSource;
use crate::domain::errors::{StorageError, TemplateError};
use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::tools::{Tool, ToolOptions};
use serde::{Deserialize, Serialize};

pub const TEMPLATES_KEY: &str = "lineTool_templates";

/// Durable string storage (localStorage in the browser)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTemplate {
    pub id: String,
    pub name: String,
    /// Milliseconds since the epoch
    pub created: u64,
    pub styles: ToolOptions,
}

/// Style-only subset of a tool's options kept by a template
pub fn extract_styles(options: &ToolOptions) -> ToolOptions {
    ToolOptions {
        line_color: options.line_color.clone(),
        color: options.color.clone(),
        width: options.width,
        line_width: options.line_width,
        ..ToolOptions::default()
    }
}

pub struct TemplateStore<S: KeyValueStore> {
    storage: S,
    random: Box<dyn RandomSource>,
    capacity: usize,
}

impl<S: KeyValueStore> TemplateStore<S> {
    pub fn new(storage: S, random: Box<dyn RandomSource>, capacity: usize) -> Self {
        Self { storage, random, capacity }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored templates; unreadable data yields an empty list
    pub fn list(&self) -> Vec<StyleTemplate> {
        let raw = match self.storage.get(TEMPLATES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                get_logger().warn(LogComponent::Domain("TemplateStore"), &format!("storage read failed: {:?}", e));
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            get_logger().warn(LogComponent::Domain("TemplateStore"), &format!("discarding corrupt templates: {}", e));
            Vec::new()
        })
    }

    fn persist(&self, templates: &[StyleTemplate]) -> Result<(), TemplateError> {
        let raw = serde_json::to_string(templates)?;
        self.storage
            .set(TEMPLATES_KEY, &raw)
            .map_err(|e| TemplateError::Serialization(format!("{:?}", e)))
    }

    fn generate_id(&self, now: u64) -> String {
        const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let suffix: String = (0..9)
            .map(|_| {
                let i = ((self.random.next_f64() * 36.0) as usize).min(35);
                ALPHABET[i] as char
            })
            .collect();
        format!("template_{}_{}", now, suffix)
    }

    /// Save the style subset of `options` under `name`
    pub fn save(&self, name: &str, options: &ToolOptions) -> Result<StyleTemplate, TemplateError> {
        let mut templates = self.list();
        if templates.len() >= self.capacity {
            get_logger().warn(
                LogComponent::Domain("TemplateStore"),
                &format!("template limit of {} reached", self.capacity),
            );
            return Err(TemplateError::StoreFull { max: self.capacity });
        }

        let now = get_time_provider().current_timestamp();
        let name = match name.trim() {
            "" => format!("Template {}", templates.len() + 1),
            trimmed => trimmed.to_string(),
        };
        let template = StyleTemplate { id: self.generate_id(now), name, created: now, styles: extract_styles(options) };
        templates.push(template.clone());
        self.persist(&templates)?;
        Ok(template)
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut templates = self.list();
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return false;
        }
        match self.persist(&templates) {
            Ok(()) => true,
            Err(e) => {
                get_logger().warn(LogComponent::Domain("TemplateStore"), &format!("delete failed: {}", e));
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<StyleTemplate> {
        self.list().into_iter().find(|t| t.id == id)
    }

    /// Merge a template's styles into `tool`; false if it does not exist
    pub fn apply(&self, id: &str, tool: &mut Tool) -> bool {
        match self.get(id) {
            Some(template) => {
                tool.apply_options(&template.styles);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_drops_non_style_fields() {
        let options = ToolOptions {
            line_color: Some("#ff0000".into()),
            line_width: Some(3.0),
            text: Some("note".into()),
            extend_right: Some(true),
            ..ToolOptions::default()
        };
        let styles = extract_styles(&options);
        assert_eq!(styles.line_color.as_deref(), Some("#ff0000"));
        assert_eq!(styles.line_width, Some(3.0));
        assert!(styles.text.is_none());
        assert!(styles.extend_right.is_none());
    }
}
