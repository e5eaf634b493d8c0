use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{utc_stamp, RequestStore};
use crate::core::request::Request;

/// Requests as `<id>.json` files in one directory.
pub struct FileRequestStore {
    dir: PathBuf,
}

impl FileRequestStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

/// True when `id` can name a file inside the requests directory: one plain
/// path component, no separators or `..`.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
        && Path::new(id).file_name().is_some_and(|name| name == id)
}

/// Parse a stored request, filling blank fields with defaults.
pub fn read_request(path: &Path) -> Result<Request> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut request: Request = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    request.normalize();
    Ok(request)
}

/// Pretty JSON with a trailing newline.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// `*.json` files directly inside `dir`, in name order. A missing directory is empty.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

impl RequestStore for FileRequestStore {
    fn list(&self) -> Result<Vec<Request>> {
        let mut requests = Vec::new();
        for path in json_files(&self.dir)? {
            match read_request(&path) {
                Ok(request) => requests.push(request),
                Err(e) => tracing::warn!("skipping request file: {e:#}"),
            }
        }
        requests.sort_by_cached_key(|r| r.name.to_lowercase());
        Ok(requests)
    }

    fn save(&self, mut request: Request) -> Result<Request> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let id = request.id.trim();
        if is_plain_id(id) {
            request.id = id.to_string();
        } else {
            if !id.is_empty() {
                tracing::warn!("replacing unusable request id {:?}", request.id);
            }
            request.id = uuid::Uuid::new_v4().to_string();
        }
        request.normalize();
        request.updated_at = utc_stamp();
        write_json(&self.path_for(&request.id), &request)?;
        tracing::debug!("saved request {}", request.id);
        Ok(request)
    }

    fn delete(&self, id: &str) -> Result<()> {
        if !is_plain_id(id) {
            bail!("invalid request id {id:?}");
        }
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileRequestStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileRequestStore::new(tmp.path().join("requests"));
        (tmp, store)
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let (_tmp, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_assigns_id_and_stamp() {
        let (_tmp, store) = store();
        let mut draft = Request::new("post", "http://example.test");
        draft.name = "  ".to_string();
        let saved = store.save(draft).unwrap();
        assert_eq!(saved.id.len(), 36);
        assert_eq!(saved.name, "New Request");
        assert_eq!(saved.method, "POST");
        assert!(saved.updated_at.ends_with('Z'));
        assert!(!saved.updated_at.contains('.'));

        let text = fs::read_to_string(store.path_for(&saved.id)).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(store.list().unwrap(), vec![saved]);
    }

    #[test]
    fn test_save_keeps_existing_id() {
        let (_tmp, store) = store();
        let mut req = Request::new("GET", "http://a.test");
        req.id = "fixed".to_string();
        store.save(req.clone()).unwrap();
        req.url = "http://b.test".to_string();
        store.save(req).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].url, "http://b.test");
    }

    #[test]
    fn test_list_sorts_and_skips_bad_files() {
        let (_tmp, store) = store();
        for name in ["beta", "Alpha", "gamma"] {
            let mut req = Request::new("GET", "http://x.test");
            req.name = name.to_string();
            store.save(req).unwrap();
        }
        fs::write(store.dir.join("broken.json"), "{ nope").unwrap();
        fs::write(store.dir.join("notes.txt"), "ignored").unwrap();
        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let (_tmp, store) = store();
        fs::create_dir_all(&store.dir).unwrap();
        fs::write(store.dir.join("p.json"), r#"{"id":"p","url":"http://p.test"}"#).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list[0].method, "GET");
        assert_eq!(list[0].auth_type, "none");
        assert_eq!(list[0].name, "New Request");
    }

    #[test]
    fn test_path_like_ids_are_replaced() {
        let (tmp, store) = store();
        let mut req = Request::new("GET", "http://x.test");
        req.id = "../../escaped".to_string();
        let saved = store.save(req).unwrap();
        assert_eq!(saved.id.len(), 36);
        assert!(store.path_for(&saved.id).exists());
        assert!(!tmp.path().join("escaped.json").exists());
        assert!(!tmp.path().parent().unwrap().join("escaped.json").exists());
    }

    #[test]
    fn test_delete_rejects_path_like_ids() {
        let (tmp, store) = store();
        let victim = tmp.path().join("victim.json");
        fs::write(&victim, "{}").unwrap();
        assert!(store.delete("../victim").is_err());
        assert!(victim.exists());
    }

    #[test]
    fn test_plain_ids() {
        assert!(is_plain_id("3f2b9c1e-aaaa-bbbb-cccc-000000000000"));
        assert!(is_plain_id("fixed"));
        for bad in ["", ".", "..", "../x", "a/b", "a\\b", "/abs"] {
            assert!(!is_plain_id(bad), "{bad:?}");
        }
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_tmp, store) = store();
        let saved = store.save(Request::new("GET", "http://x.test")).unwrap();
        store.delete(&saved.id).unwrap();
        store.delete(&saved.id).unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
