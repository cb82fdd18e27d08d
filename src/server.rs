use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;

use crate::answers::AnswerResolver;
use crate::content::{self, EXAM_PRESETS, SUBJECTS};
use crate::error::{ServiceError, ServiceResult};
use crate::gemini::SharedGenerator;
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::planner::PlanGenerator;
use crate::quiz::{self, DEFAULT_DIFFICULTY, DEFAULT_QUESTION_COUNT, QuizGenerator};
use crate::schedules::{NewSchedule, ScheduleManager};
use crate::storage::{ANSWER_CACHE_FILE, JsonStore, SCHEDULES_FILE};
use crate::types::{
    AnswerCache, ExamPreset, Mcq, QuizScore, ScheduleFile, ScheduleRecord, ScheduleView,
};

pub const MAX_QUIZ_QUESTIONS: usize = 20;

/// Everything a request handler can reach. Each collection sits behind its
/// own mutex so one writer touches a file at a time.
pub struct AppState {
    resolver: Mutex<AnswerResolver>,
    schedules: Mutex<ScheduleManager>,
    quizzes: QuizGenerator,
    ai_enabled: bool,
}

impl AppState {
    pub fn new(
        resolver: AnswerResolver,
        schedules: ScheduleManager,
        quizzes: QuizGenerator,
        ai_enabled: bool,
    ) -> Self {
        Self {
            resolver: Mutex::new(resolver),
            schedules: Mutex::new(schedules),
            quizzes,
            ai_enabled,
        }
    }

    /// Load both collections from `data_dir` and wire every component to the
    /// same (optional) model client.
    pub fn open(data_dir: &FsPath, generator: Option<SharedGenerator>) -> ServiceResult<Self> {
        let cache: JsonStore<AnswerCache> = JsonStore::load(data_dir.join(ANSWER_CACHE_FILE))?;
        let schedule_store: JsonStore<ScheduleFile> =
            JsonStore::load(data_dir.join(SCHEDULES_FILE))?;
        tracing::info!(
            cached_answers = cache.data().len(),
            schedules = schedule_store.data().schedules.len(),
            data_dir = %data_dir.display(),
            "store loaded"
        );
        let ai_enabled = generator.is_some();
        Ok(Self::new(
            AnswerResolver::new(cache, generator.clone()),
            ScheduleManager::new(schedule_store, PlanGenerator::new(generator.clone())),
            QuizGenerator::new(generator),
            ai_enabled,
        ))
    }

    fn resolver(&self) -> ServiceResult<MutexGuard<'_, AnswerResolver>> {
        self.resolver
            .lock()
            .map_err(|_| ServiceError::Other("answer resolver lock poisoned".to_string()))
    }

    fn schedules(&self) -> ServiceResult<MutexGuard<'_, ScheduleManager>> {
        self.schedules
            .lock()
            .map_err(|_| ServiceError::Other("schedule store lock poisoned".to_string()))
    }
}

pub type SharedState = Arc<AppState>;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::ScheduleNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Run a synchronous store/model operation off the async runtime.
async fn blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Other(format!("spawn_blocking failed: {}", e)))?
}

#[derive(Debug, Serialize)]
struct QuestionAnswer {
    question: &'static str,
    answer: &'static str,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    subject: String,
    question: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct QuizQuery {
    count: Option<usize>,
    difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    subject: String,
    mcqs: Vec<Mcq>,
}

#[derive(Debug, Deserialize)]
struct GradeRequest {
    mcqs: Vec<Mcq>,
    #[serde(default)]
    selections: Vec<Option<String>>,
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": PKG_NAME,
        "version": PKG_VERSION,
        "ai_enabled": state.ai_enabled,
    }))
}

async fn list_subjects() -> Json<&'static [&'static str]> {
    Json(SUBJECTS)
}

async fn subject_questions(Path(subject): Path<String>) -> Json<Vec<QuestionAnswer>> {
    Json(
        content::questions_for(&subject)
            .iter()
            .map(|&(question, answer)| QuestionAnswer { question, answer })
            .collect(),
    )
}

async fn ask(
    State(state): State<SharedState>,
    Path(subject): Path<String>,
    Json(request): Json<AskRequest>,
) -> ServiceResult<Json<AskResponse>> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(ServiceError::InvalidInput(
            "question must not be empty".to_string(),
        ));
    }
    let response = blocking(move || {
        let answer = state.resolver()?.resolve(&subject, &question);
        Ok(AskResponse {
            subject,
            question,
            answer,
        })
    })
    .await?;
    Ok(Json(response))
}

async fn generate_quiz(
    State(state): State<SharedState>,
    Path(subject): Path<String>,
    Query(query): Query<QuizQuery>,
) -> ServiceResult<Json<QuizResponse>> {
    let count = query
        .count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .min(MAX_QUIZ_QUESTIONS);
    let difficulty = query
        .difficulty
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());
    let quizzes = state.quizzes.clone();
    let response = blocking(move || {
        let mcqs = quizzes.generate(&subject, count, &difficulty);
        Ok(QuizResponse { subject, mcqs })
    })
    .await?;
    Ok(Json(response))
}

async fn grade_quiz(Json(request): Json<GradeRequest>) -> Json<QuizScore> {
    Json(quiz::grade(&request.mcqs, &request.selections))
}

async fn list_presets() -> Json<&'static [ExamPreset]> {
    Json(EXAM_PRESETS)
}

async fn list_schedules(
    State(state): State<SharedState>,
) -> ServiceResult<Json<Vec<ScheduleRecord>>> {
    let schedules = blocking(move || Ok(state.schedules()?.list().to_vec())).await?;
    Ok(Json(schedules))
}

async fn create_schedule(
    State(state): State<SharedState>,
    Json(request): Json<NewSchedule>,
) -> ServiceResult<(StatusCode, Json<ScheduleRecord>)> {
    let record = blocking(move || state.schedules()?.create(request)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn view_schedule(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ServiceResult<Json<ScheduleView>> {
    let today = Local::now().date_naive();
    let view = blocking(move || state.schedules()?.view(id, today)).await?;
    Ok(Json(view))
}

async fn delete_schedule(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> ServiceResult<StatusCode> {
    blocking(move || state.schedules()?.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects))
        .route("/subjects/{subject}/questions", get(subject_questions))
        .route("/subjects/{subject}/ask", post(ask))
        .route("/subjects/{subject}/quiz", get(generate_quiz))
        .route("/subjects/{subject}/quiz/grade", post(grade_quiz))
        .route("/presets", get(list_presets))
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/{id}",
            get(view_schedule).delete(delete_schedule),
        )
        .with_state(state)
}

/// Accept connections until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: SharedState) -> ServiceResult<()> {
    let service = TowerToHyperService::new(router(state));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("HTTP accept error: {e}");
                    continue;
                }
            },
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping HTTP server");
                break;
            }
        };
        let io = TokioIo::new(stream);
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(err) = Builder::new(TokioExecutor::new())
                .serve_connection(io, service)
                .await
            {
                tracing::debug!(%peer, "HTTP connection error: {err}");
            }
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedGenerator;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(dir: &tempfile::TempDir, generator: Option<SharedGenerator>) -> Router {
        router(Arc::new(AppState::open(dir.path(), generator).unwrap()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn static_content_routes() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None);

        let (status, subjects) = call(&app, "GET", "/subjects", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(subjects, json!(["Math", "Science", "English", "Electronics"]));

        let (_, questions) = call(&app, "GET", "/subjects/English/questions", None).await;
        assert_eq!(questions[0], json!({"question": "Synonym of happy?", "answer": "Joyful"}));

        let (_, presets) = call(&app, "GET", "/presets", None).await;
        assert_eq!(presets.as_array().unwrap().len(), EXAM_PRESETS.len());

        let (_, health) = call(&app, "GET", "/health", None).await;
        assert_eq!(health["ai_enabled"], json!(false));
    }

    #[tokio::test]
    async fn ask_uses_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, Some(ScriptedGenerator::replying("unused")));

        let (status, body) = call(
            &app,
            "POST",
            "/subjects/Science/ask",
            Some(json!({"question": "What is H2O?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], json!("H2O is water"));

        let (status, _) = call(
            &app,
            "POST",
            "/subjects/Science/ask",
            Some(json!({"question": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quiz_and_grading() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None);

        let (status, body) = call(&app, "GET", "/subjects/Math/quiz?count=3", None).await;
        assert_eq!(status, StatusCode::OK);
        let mcqs = body["mcqs"].clone();
        assert_eq!(mcqs.as_array().unwrap().len(), 3);

        let (_, score) = call(
            &app,
            "POST",
            "/subjects/Math/quiz/grade",
            Some(json!({"mcqs": mcqs, "selections": ["Option A", "Option C", null]})),
        )
        .await;
        assert_eq!(score, json!({"score": 1, "total": 3}));
    }

    #[tokio::test]
    async fn schedule_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None);

        let (status, created) = call(
            &app,
            "POST",
            "/schedules",
            Some(json!({"exam_type": "GATE", "weeks": 24, "hours_per_day": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        let (status, view) = call(&app, "GET", &format!("/schedules/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["name"], created["name"]);
        assert_eq!(view["current_week"], json!(1));

        let (_, all) = call(&app, "GET", "/schedules", None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        let (status, _) = call(&app, "DELETE", &format!("/schedules/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, "GET", &format!("/schedules/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = call(&app, "DELETE", "/schedules/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn open_reads_existing_data_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ANSWER_CACHE_FILE),
            r#"{"What is gravity?": "A pull between masses"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(SCHEDULES_FILE),
            r#"[{"id": 7, "name": "GATE", "exam_type": "GATE", "subjects": [], "weeks": 4,
                "hours_per_day": 2, "created_date": "2025-01-01", "start_date": "2025-01-01",
                "status": "active"}]"#,
        )
        .unwrap();
        let app = app(&dir, Some(ScriptedGenerator::failing("offline")));

        let (_, all) = call(&app, "GET", "/schedules", None).await;
        assert_eq!(all[0]["id"], json!(7));

        let (_, body) = call(
            &app,
            "POST",
            "/subjects/Science/ask",
            Some(json!({"question": "What is gravity?"})),
        )
        .await;
        assert_eq!(body["answer"], json!("A pull between masses"));
    }

    #[tokio::test]
    async fn invalid_schedule_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, None);
        let (status, _) = call(
            &app,
            "POST",
            "/schedules",
            Some(json!({"exam_type": "Custom", "weeks": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
