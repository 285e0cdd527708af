use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{
    deck_leaderboards, matchup_highlights, matchup_matrix, DeckLeaderboards, MatchupHighlights,
    MatchupMatrix,
};
use crate::models::{
    deck_slug, display_name, AggregationResult, DeckAggregate, DeckInsights, MatchupData, TierTable,
};

const DEFAULT_MATRIX_SIZE: usize = 8;
const MAX_MATRIX_SIZE: usize = 32;
const DEFAULT_HIGHLIGHTS: usize = 5;
const MAX_HIGHLIGHTS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct MatrixParams {
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HighlightParams {
    pub limit: Option<usize>,
}

/// The full aggregation stamped with its dataset.
#[derive(Debug, Serialize)]
pub struct MetaDataResponse {
    pub dataset_id: String,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AggregationResult,
}

#[derive(Debug, Serialize)]
pub struct DecksResponse {
    pub decks: Vec<DeckAggregate>,
    pub unranked_decks: Vec<String>,
    pub total_games: u64,
}

#[derive(Debug, Serialize)]
pub struct DeckDetailResponse {
    pub slug: String,
    pub display_name: String,
    pub deck: DeckAggregate,
    pub matchups: Vec<MatchupData>,
    pub insights: Option<DeckInsights>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn meta_data(State(state): State<AppState>) -> Result<Json<MetaDataResponse>, ApiError> {
    let report = state.current_report().await?;
    Ok(Json(MetaDataResponse {
        dataset_id: report.dataset_id.to_string(),
        computed_at: report.computed_at,
        result: report.result.clone(),
    }))
}

pub async fn tiers(State(state): State<AppState>) -> Result<Json<TierTable>, ApiError> {
    let report = state.current_report().await?;
    Ok(Json(report.result.tiers.clone()))
}

pub async fn decks(State(state): State<AppState>) -> Result<Json<DecksResponse>, ApiError> {
    let report = state.current_report().await?;
    let result = &report.result;
    Ok(Json(DecksResponse {
        decks: result.ranked_decks().into_iter().cloned().collect(),
        unranked_decks: result.unranked_decks.clone(),
        total_games: result.total_games,
    }))
}

pub async fn deck_leaders(
    State(state): State<AppState>,
    params: Result<Query<HighlightParams>, QueryRejection>,
) -> Result<Json<DeckLeaderboards>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HIGHLIGHTS)
        .clamp(1, MAX_HIGHLIGHTS);

    let report = state.current_report().await?;
    Ok(Json(deck_leaderboards(&report.result, limit)))
}

pub async fn deck_detail(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeckDetailResponse>, ApiError> {
    let report = state.current_report().await?;
    let result = &report.result;
    let deck = result
        .find_deck(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Deck {} not found", key)))?;

    Ok(Json(DeckDetailResponse {
        slug: deck_slug(&deck.name),
        display_name: display_name(&deck.name),
        deck: deck.clone(),
        matchups: result.matchups.get(&deck.name).cloned().unwrap_or_default(),
        insights: result.insights.get(&deck.name).cloned(),
    }))
}

pub async fn matchup_matrix_route(
    State(state): State<AppState>,
    params: Result<Query<MatrixParams>, QueryRejection>,
) -> Result<Json<MatchupMatrix>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let top = params
        .top
        .unwrap_or(DEFAULT_MATRIX_SIZE)
        .clamp(1, MAX_MATRIX_SIZE);

    let report = state.current_report().await?;
    Ok(Json(matchup_matrix(&report.result, top)))
}

pub async fn matchup_highlights_route(
    State(state): State<AppState>,
    params: Result<Query<HighlightParams>, QueryRejection>,
) -> Result<Json<MatchupHighlights>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HIGHLIGHTS)
        .clamp(1, MAX_HIGHLIGHTS);

    let report = state.current_report().await?;
    Ok(Json(matchup_highlights(&report.result, limit)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::build_router;
    use crate::api::routes::testing::{get_json, test_state, SAMPLE_ROWS};

    #[tokio::test]
    async fn test_health() {
        let (_tmp, state) = test_state(None);
        let (status, json) = get_json(build_router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_meta_data() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/meta-data").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["dataset_id"].as_str().unwrap().len(), 16);
        assert_eq!(json["tiers"]["S"][0]["name"], "Lugia");
        assert_eq!(json["ranking"].as_array().unwrap().len(), 3);
        assert_eq!(json["deck_details"]["Lugia"]["total_games"], 75);
        assert_eq!(json["total_games"], 250);
        assert!(json["insights"]["Gardevoir"].is_object());
        assert!(json["matchups"]["Charizard"].is_array());
    }

    #[tokio::test]
    async fn test_meta_data_without_dataset() {
        let (_tmp, state) = test_state(None);
        let (status, json) = get_json(build_router(state), "/api/meta-data").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "NO_DATA");
    }

    #[tokio::test]
    async fn test_meta_data_header_only_dataset() {
        let (_tmp, state) = test_state(Some(""));
        let (status, json) = get_json(build_router(state), "/api/meta-data").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "NO_DATA");
    }

    #[tokio::test]
    async fn test_tiers() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/tiers").await;

        assert_eq!(status, StatusCode::OK);
        for tier in ["S", "A", "B", "C", "D", "F"] {
            assert!(json[tier].is_array(), "missing tier {}", tier);
        }
        assert_eq!(json["S"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decks_in_ranking_order() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/decks").await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json["decks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Lugia", "Gardevoir", "Charizard"]);
        assert_eq!(json["unranked_decks"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_decks_lists_unranked() {
        let rows = format!("{}Lugia,Palkia,6,4,0,10,60\n", SAMPLE_ROWS);
        let (_tmp, state) = test_state(Some(&rows));
        let (_, json) = get_json(build_router(state), "/api/decks").await;

        assert_eq!(json["unranked_decks"][0], "Palkia");
    }

    #[tokio::test]
    async fn test_deck_detail_by_slug() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/decks/lugia").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["deck"]["name"], "Lugia");
        assert_eq!(json["slug"], "lugia");
        assert_eq!(json["display_name"], "Lugia");
        assert_eq!(json["matchups"].as_array().unwrap().len(), 2);
        assert_eq!(json["insights"]["meta_position"], 1);
    }

    #[tokio::test]
    async fn test_deck_detail_not_found() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/decks/palkia").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_matchup_matrix() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/matchups/matrix?top=2").await;

        assert_eq!(status, StatusCode::OK);
        let decks = json["decks"].as_array().unwrap();
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[0], "Gardevoir");
        assert_eq!(json["cells"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_matchup_matrix_clamps_size() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let app = build_router(state);

        let (status, json) = get_json(app.clone(), "/api/matchups/matrix?top=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["decks"].as_array().unwrap().len(), 1);

        let (_, json) = get_json(app, "/api/matchups/matrix").await;
        assert_eq!(json["decks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_matchup_matrix_rejects_bad_query() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) =
            get_json(build_router(state), "/api/matchups/matrix?top=lots").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_matchup_highlights() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) =
            get_json(build_router(state), "/api/matchups/highlights?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        let best = json["best_performing"].as_array().unwrap();
        assert_eq!(best.len(), 2);
        assert_eq!(best[0]["deck"], "Lugia");
        assert_eq!(json["most_played"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deck_leaders() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let (status, json) = get_json(build_router(state), "/api/decks/leaders?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        let names = |board: &str| -> Vec<String> {
            json[board]
                .as_array()
                .unwrap()
                .iter()
                .map(|d| d["name"].as_str().unwrap().to_string())
                .collect()
        };
        // Gardevoir 100 games; Charizard and Lugia tie at 75
        assert_eq!(names("most_played"), vec!["Gardevoir", "Charizard"]);
        assert_eq!(names("highest_win_rate"), vec!["Lugia", "Gardevoir"]);
        assert_eq!(names("most_favorable"), vec!["Lugia", "Gardevoir"]);
    }

    #[tokio::test]
    async fn test_deck_leaders_clamps_limit() {
        let (_tmp, state) = test_state(Some(SAMPLE_ROWS));
        let app = build_router(state);

        let (status, json) = get_json(app.clone(), "/api/decks/leaders?limit=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["most_played"].as_array().unwrap().len(), 1);

        let (_, json) = get_json(app, "/api/decks/leaders").await;
        assert_eq!(json["highest_win_rate"].as_array().unwrap().len(), 3);
    }
}
