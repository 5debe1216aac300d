//! Клиент удалённого каталога плагинов.
//!
//! Один GET фиксированного JSON-документа. Без кеша, без ETag, без пагинации:
//! любой сетевой сбой или ошибка разбора превращаются в `None`, и UI
//! предлагает повторить загрузку.

use crate::error::Result;
use crate::settings;
use crate::types::PluginsData;

pub const PLUGINS_JSON_URL: &str =
    "https://raw.githubusercontent.com/srmooon/MoonPlugs/main/plugins.json";

async fn fetch(url: &str) -> Result<PluginsData> {
    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .build()?;
    let data = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<PluginsData>()
        .await?;
    Ok(data)
}

#[tauri::command]
pub async fn fetch_plugins() -> Option<PluginsData> {
    let cfg = settings::load();
    let url = cfg.catalog_url.as_deref().unwrap_or(PLUGINS_JSON_URL);
    match fetch(url).await {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Failed to fetch plugin catalog: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_document_parses() {
        let json = r#"{
            "name": "MoonPlugs",
            "author": "srmooon",
            "plugins": [
                {
                    "id": "foo",
                    "name": "Foo",
                    "description": "does foo",
                    "version": "1.2.0",
                    "author": "bar",
                    "repository": "https://example/foo.git",
                    "files": ["index.ts"],
                    "tags": ["utility"]
                }
            ]
        }"#;
        let data: PluginsData = serde_json::from_str(json).unwrap();
        assert_eq!(data.plugins.len(), 1);
        assert_eq!(data.plugins[0].id, "foo");
    }
}
