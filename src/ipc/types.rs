use std::path::PathBuf;

use crate::app::App;
use crate::store::SqliteBlobStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub app: Option<App<SqliteBlobStore>>,
}
