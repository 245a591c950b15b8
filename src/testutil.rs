//! Loopback stub servers for tests
//!
//! Emulates just enough of the spreadsheet backend and the channel-manager
//! API to exercise the real clients over HTTP.

use crate::config::SpreadsheetConfig;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use std::sync::Arc;

pub const DOC_ID: &str = "abc123";
pub const DOC_URL: &str = "https://docs.google.com/spreadsheets/d/abc123";
pub const WORKSHEET_ID: i64 = 211369863;
pub const WORKSHEET_TITLE: &str = "Pricing";

pub struct SheetsStub {
    pub api_base: String,
    pub token_uri: String,
    pub grid: Arc<Mutex<Vec<Vec<String>>>>,
}

#[derive(Clone)]
struct SheetsStubState {
    grid: Arc<Mutex<Vec<Vec<String>>>>,
    auth_ok: bool,
}

fn s(v: &str) -> String {
    v.to_string()
}

/// Header plus three rooms; Comp_Avg_Standard = 100/150/200, no overrides.
pub fn sample_grid() -> Vec<Vec<String>> {
    vec![
        vec![
            s("Room_Type"),
            s("Current_Rate"),
            s("Comp_Avg_Standard"),
            s("Occupancy_Pct"),
            s("Base_Recommended"),
            s("Weekend_Adjusted"),
            s("Season_Adjusted"),
            s("Final_Recommended"),
            s("Manual_Override"),
            s("Push_to_NB"),
        ],
        vec![s("Standard"), s("120"), s("100"), s("80"), s("97"), s("99"), s("95"), s("91"), s(""), s("")],
        vec![s("Deluxe"), s("170"), s("150"), s("72"), s("145.5"), s("149"), s("142"), s("140.25"), s(""), s("")],
        vec![s("Suite"), s("230"), s("200"), s("65"), s("194"), s("198"), s("190"), s("188"), s(""), s("")],
    ]
}

/// Spreadsheet config pointing at a stub.
pub fn sheets_config(stub: &SheetsStub) -> SpreadsheetConfig {
    serde_json::from_value(serde_json::json!({
        "document_url": DOC_URL,
        "worksheet": {"by_id": WORKSHEET_ID},
        "token_uri": stub.token_uri,
        "api_base": stub.api_base,
    }))
    .unwrap()
}

/// Parse an A1 cell address into a 1-based (row, col) pair.
fn parse_a1(a1: &str) -> (usize, usize) {
    let letters: String = a1.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits: String = a1.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1));
    (digits.parse().unwrap(), col)
}

async fn token_handler(State(state): State<SheetsStubState>) -> impl IntoResponse {
    if state.auth_ok {
        Json(serde_json::json!({"access_token": "stub-token"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid_grant").into_response()
    }
}

async fn metadata_handler(Path(id): Path<String>) -> impl IntoResponse {
    if id == DOC_ID {
        Json(serde_json::json!({
            "sheets": [{"properties": {"sheetId": WORKSHEET_ID, "title": WORKSHEET_TITLE}}]
        }))
        .into_response()
    } else {
        (StatusCode::NOT_FOUND, "document not found").into_response()
    }
}

async fn read_handler(
    State(state): State<SheetsStubState>,
    Path((id, range)): Path<(String, String)>,
) -> impl IntoResponse {
    if id != DOC_ID {
        return (StatusCode::NOT_FOUND, "document not found").into_response();
    }
    let grid = state.grid.lock();
    let sub_range = range.strip_prefix(&format!("{}!", WORKSHEET_TITLE));

    let values: Vec<Vec<String>> = match sub_range {
        // Bare worksheet title reads the whole grid.
        None if range == WORKSHEET_TITLE => grid.clone(),
        // Single-column range like "A:A"; one cell per row.
        Some(r) if r.contains(':') => {
            let letters: String = r.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
            let (_, col) = parse_a1(&format!("{}1", letters));
            grid.iter()
                .map(|row| vec![row.get(col - 1).cloned().unwrap_or_default()])
                .collect()
        }
        _ => return (StatusCode::BAD_REQUEST, "unsupported range").into_response(),
    };

    Json(serde_json::json!({ "values": values })).into_response()
}

async fn write_handler(
    State(state): State<SheetsStubState>,
    Path((id, range)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if id != DOC_ID {
        return (StatusCode::NOT_FOUND, "document not found").into_response();
    }
    let a1 = match range.strip_prefix(&format!("{}!", WORKSHEET_TITLE)) {
        Some(a1) => a1,
        None => return (StatusCode::BAD_REQUEST, "unsupported range").into_response(),
    };
    let (row, col) = parse_a1(a1);
    let value = body["values"][0][0].as_str().unwrap_or_default().to_string();

    let mut grid = state.grid.lock();
    while grid.len() < row {
        grid.push(Vec::new());
    }
    let cells = &mut grid[row - 1];
    while cells.len() < col {
        cells.push(String::new());
    }
    cells[col - 1] = value;

    Json(serde_json::json!({"updatedCells": 1})).into_response()
}

/// Spin up a spreadsheet-backend stub on a loopback port.
pub async fn spawn_sheets_stub(grid: Vec<Vec<String>>, auth_ok: bool) -> SheetsStub {
    let shared = Arc::new(Mutex::new(grid));
    let state = SheetsStubState {
        grid: shared.clone(),
        auth_ok,
    };

    let app = Router::new()
        .route("/token", post(token_handler))
        .route("/v4/spreadsheets/:id", get(metadata_handler))
        .route(
            "/v4/spreadsheets/:id/values/:range",
            get(read_handler).put(write_handler),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    SheetsStub {
        api_base: format!("http://{}", addr),
        token_uri: format!("http://{}/token", addr),
        grid: shared,
    }
}

/// One recorded channel-manager push.
#[derive(Debug, Clone)]
pub struct RecordedPush {
    pub property_id: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

pub struct ChannelStub {
    pub api_base: String,
    pub requests: Arc<Mutex<Vec<RecordedPush>>>,
}

#[derive(Clone)]
struct ChannelStubState {
    requests: Arc<Mutex<Vec<RecordedPush>>>,
    respond_status: u16,
}

async fn rates_handler(
    State(state): State<ChannelStubState>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.requests.lock().push(RecordedPush {
        property_id,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });

    let status = StatusCode::from_u16(state.respond_status).unwrap();
    if status.is_success() {
        (status, Json(serde_json::json!({"status": "accepted"}))).into_response()
    } else {
        (status, "rate rejected by channel manager").into_response()
    }
}

/// Spin up a channel-manager stub that answers every push with one status.
pub async fn spawn_channel_stub(respond_status: u16) -> ChannelStub {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ChannelStubState {
        requests: requests.clone(),
        respond_status,
    };

    let app = Router::new()
        .route("/v1/properties/:property_id/rates", put(rates_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ChannelStub {
        api_base: format!("http://{}", addr),
        requests,
    }
}
