use axum::{debug_handler, extract::State, http::StatusCode, routing::post, Json, Router};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// How the mock login endpoint behaves for the lifetime of one listener.
#[derive(Copy, Clone, Debug)]
pub enum Behavior {
    /// 200 with a token envelope.
    Ok,
    /// 500 with an error envelope on every request.
    ServerError,
    /// 200 with a token envelope after the given delay.
    Delay(Duration),
}

pub async fn run(addr: SocketAddr, behavior: Behavior) {
    let app = router(behavior);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

pub fn router(behavior: Behavior) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .with_state(behavior)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[allow(unused)]
    pub password: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
    message: String,
    data: LoginData,
}

#[derive(Serialize)]
struct LoginData {
    id: u64,
    username: String,
    token: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

#[debug_handler]
async fn login(
    State(behavior): State<Behavior>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    counter!("mock-login.requests").increment(1);
    REQUESTS.fetch_add(1, Ordering::Relaxed);
    debug!("Login attempt for {}", request.email);

    match behavior {
        Behavior::ServerError => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                message: "internal server error".to_string(),
            }),
        )),
        Behavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Ok(Json(success(&request.email)))
        }
        Behavior::Ok => Ok(Json(success(&request.email))),
    }
}

fn success(email: &str) -> SuccessResponse {
    SuccessResponse {
        success: true,
        message: "Login success".to_string(),
        data: LoginData {
            id: 1,
            username: email.split('@').next().unwrap_or("user").to_string(),
            token: "header.payload.signature".to_string(),
        },
    }
}

/** RPS Printer **/

static REQUESTS: AtomicU64 = AtomicU64::new(0);

pub async fn rps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = REQUESTS.fetch_min(0, Ordering::Relaxed);
        println!("{requests} RPS");
    }
}
