use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::Backend;

/// In-process stand-in for the planning API.
///
/// Collections behave like the REST resources: the backend assigns
/// identifiers on POST, merges bodies on PUT and removes on DELETE. Fixed
/// GET routes serve aggregate rows. Failures can be scripted one request at
/// a time.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    routes: HashMap<String, Value>,
    faults: VecDeque<Fault>,
    requests: Vec<(String, String)>,
}

struct Collection {
    id_field: String,
    rows: Vec<Value>,
    next_id: i64,
}

struct Fault {
    method: String,
    path: String,
    message: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, path: &str, id_field: &str, rows: Vec<Value>) -> Self {
        let next_id = rows
            .iter()
            .filter_map(|r| r.get(id_field).and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;
        if let Ok(mut inner) = self.inner.lock() {
            inner.collections.insert(
                path.to_string(),
                Collection { id_field: id_field.to_string(), rows, next_id },
            );
        }
        self
    }

    pub fn with_route(self, path: &str, body: Value) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.routes.insert(path.to_string(), body);
        }
        self
    }

    /// Make the next matching request fail with `message`.
    pub fn fail_next(&self, method: &str, path: &str, message: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.faults.push_back(Fault {
                method: method.to_string(),
                path: path.to_string(),
                message: message.to_string(),
            });
        }
    }

    /// Every request seen so far as `(method, path)`.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.inner.lock().map(|i| i.requests.clone()).unwrap_or_default()
    }

    pub fn rows(&self, path: &str) -> Vec<Value> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.collections.get(path).map(|c| c.rows.clone()))
            .unwrap_or_default()
    }

    fn handle(&self, method: &str, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut inner = self.inner.lock().map_err(|_| anyhow!("backend lock poisoned"))?;
        inner.requests.push((method.to_string(), path.to_string()));

        if let Some(pos) = inner
            .faults
            .iter()
            .position(|f| f.method == method && f.path == path)
        {
            if let Some(fault) = inner.faults.remove(pos) {
                return Err(anyhow!("{} {} failed: {}", method, path, fault.message));
            }
        }

        if method == "GET" {
            if let Some(route) = inner.routes.get(path) {
                return Ok(route.clone());
            }
        }

        let (collection, id) = match path.split_once('/') {
            Some((c, id)) => (c, Some(id)),
            None => (path, None),
        };
        let col = inner
            .collections
            .get_mut(collection)
            .ok_or_else(|| anyhow!("{} {} failed: 404 - not found", method, path))?;

        match (method, id) {
            ("GET", None) => Ok(Value::Array(col.rows.clone())),
            ("POST", None) => {
                let mut row = match body {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                row.insert(col.id_field.clone(), Value::from(col.next_id));
                col.next_id += 1;
                let row = Value::Object(row);
                col.rows.push(row.clone());
                Ok(row)
            }
            ("PUT", Some(id)) => {
                let pos = find(col, id)
                    .ok_or_else(|| anyhow!("{} {} failed: 404 - not found", method, path))?;
                if let (Some(Value::Object(patch)), Value::Object(row)) = (body, &mut col.rows[pos]) {
                    for (k, v) in patch {
                        row.insert(k.clone(), v.clone());
                    }
                }
                Ok(col.rows[pos].clone())
            }
            ("DELETE", Some(id)) => {
                let pos = find(col, id)
                    .ok_or_else(|| anyhow!("{} {} failed: 404 - not found", method, path))?;
                col.rows.remove(pos);
                Ok(Value::Null)
            }
            _ => Err(anyhow!("{} {} failed: 405 - method not allowed", method, path)),
        }
    }
}

fn find(col: &Collection, id: &str) -> Option<usize> {
    let id: i64 = id.parse().ok()?;
    col.rows
        .iter()
        .position(|r| r.get(&col.id_field).and_then(Value::as_i64) == Some(id))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, path: &str) -> Result<Value> {
        self.handle("GET", path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.handle("POST", path, Some(body))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.handle("PUT", path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.handle("DELETE", path, None).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn post_assigns_next_identifier() {
        let mem = MemoryBackend::new().with_collection("boqs", "boq_id", vec![json!({"boq_id": 7})]);
        let row = mem.post("boqs", &json!({"title": "Civil"})).await.unwrap();
        assert_eq!(row["boq_id"], 8);
        assert_eq!(mem.rows("boqs").len(), 2);
    }

    #[tokio::test]
    async fn fault_is_one_shot() {
        let mem = MemoryBackend::new().with_collection("boqs", "boq_id", vec![]);
        mem.fail_next("GET", "boqs", "Network Error");
        assert!(mem.get("boqs").await.is_err());
        assert!(mem.get("boqs").await.is_ok());
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let mem = MemoryBackend::new().with_collection("boqs", "boq_id", vec![]);
        let err = mem.delete("boqs/3").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
