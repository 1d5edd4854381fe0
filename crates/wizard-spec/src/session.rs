use serde_json::{Map, Value};

/// Session key holding the current step.
pub const CURRENT_STEP_KEY: &str = "current_step";

/// Session key holding the raw answers of the page with primary key `pk`.
pub fn form_key(pk: u64) -> String {
    format!("form_{pk}")
}

/// Opaque per-user key-value storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
}

impl SessionStore for Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}
