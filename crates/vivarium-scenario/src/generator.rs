//! Bulk entity generators.
//!
//! A generator turns one template into `quantity` entity documents with ids
//! `<id_prefix>0`, `<id_prefix>1`, ... Every `random(...)` string in the
//! template is drawn again for each entity, from the loader's seeded RNG, so
//! the same seed always yields the same population.

use serde_json::Value;

use crate::document::{EntityDocument, GeneratorDocument};
use crate::random_param;
use crate::ScenarioError;

impl GeneratorDocument {
    pub fn id_prefix(&self) -> String {
        self.id_prefix
            .clone()
            .unwrap_or_else(|| format!("generated_{}_", self.kind.to_ascii_lowercase()))
    }

    /// Expand into entity documents.
    ///
    /// Template fields override the generated `id` and `type`.
    pub fn generate<R: rand::Rng>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<EntityDocument>, ScenarioError> {
        let prefix = self.id_prefix();
        tracing::debug!(
            kind = %self.kind,
            quantity = self.quantity,
            %prefix,
            "expanding generator"
        );

        (0..self.quantity)
            .map(|i| -> Result<EntityDocument, ScenarioError> {
                let mut object = serde_json::Map::new();
                object.insert("id".to_owned(), Value::from(format!("{prefix}{i}")));
                object.insert("type".to_owned(), Value::from(self.kind.clone()));
                for (key, value) in &self.template {
                    object.insert(key.clone(), random_param::expand(value, rng)?);
                }
                Ok(serde_json::from_value(Value::Object(object))?)
            })
            .collect()
    }
}
