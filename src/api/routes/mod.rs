pub mod meta;
pub mod refresh;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::api::state::AppState;
    use crate::config::AppConfig;

    pub const HEADER: &str = "deck1,deck2,wins,losses,ties,total,win_rate\n";

    /// Three decks, all above the default sample thresholds.
    pub const SAMPLE_ROWS: &str = "Lugia,Gardevoir,60,40,0,100,60\n\
                                   Gardevoir,Charizard,55,45,0,100,55\n\
                                   Lugia,Charizard,30,20,0,50,60\n";

    pub fn write_dataset(dir: &std::path::Path, rows: &str) {
        let raw = dir.join("raw");
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::write(raw.join("matchups.csv"), format!("{}{}", HEADER, rows)).unwrap();
    }

    pub fn test_state(rows: Option<&str>) -> (tempfile::TempDir, AppState) {
        let tmp = tempfile::tempdir().unwrap();
        if let Some(rows) = rows {
            write_dataset(tmp.path(), rows);
        }
        let config = AppConfig {
            data_dir: tmp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let state = AppState::new(config).unwrap();
        (tmp, state)
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri)).await
    }

    pub async fn post_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().method("POST").uri(uri)).await
    }

    async fn send(app: axum::Router, builder: axum::http::request::Builder) -> (StatusCode, Value) {
        let resp = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
