//! HTTP routes of the review tool.
//!
//! * `GET /` shows an image picked from the `index`, `update` and `random` query parameters.
//! * `POST /save` records a decision and redirects to the next image without one.
//! * `GET /images/<path>` serves the raw dataset files.
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error};
use rand::Rng;
use serde::Deserialize;
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::dataset::{Dataset, save_to_refined};
use crate::error::ReviewError;
use crate::page::{PageView, render};
use crate::records::{
    ProcessedRecord, RecordMap, RecordStore, next_unprocessed_index, random_unprocessed_index,
};

const MAX_FORM_SIZE: u64 = 64 * 1024;

/// Shared by every request.
#[derive(Debug)]
pub struct ReviewState {
    pub dataset: Dataset,
    pub refined_dir: PathBuf,
    pub records: RecordStore,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub index: Option<String>,
    pub update: Option<String>,
    pub random: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveForm {
    pub filename: String,
    pub label: String,
    pub confirmed: Option<String>,
    pub skip: Option<String>,
    pub index: String,
}

impl SaveForm {
    fn is_checked(field: &Option<String>) -> bool {
        field.as_deref() == Some("on")
    }
}

/// Picks the image to show for a `GET /` query.
///
/// * `random=true`: any file without a decision.
/// * `index=N&update=...`: exactly `N`, even if already reviewed.
/// * `index=N`: the first file without a decision from `N` on.
/// * anything else: the first file without a decision.
pub fn resolve_index<R: Rng>(
    query: &PageQuery,
    files: &[String],
    records: &RecordMap,
    rng: &mut R,
) -> Option<usize> {
    if query.random.as_deref() == Some("true") {
        return random_unprocessed_index(files, records, rng);
    }

    let requested = query
        .index
        .as_deref()
        .and_then(|idx| idx.trim().parse::<usize>().ok());
    let pinned = query.update.as_deref().is_some_and(|u| !u.is_empty());

    match requested {
        None => next_unprocessed_index(files, records, 0),
        Some(idx) if pinned => Some(idx),
        Some(idx) => next_unprocessed_index(files, records, idx),
    }
}

fn pick_index(query: &PageQuery, files: &[String], records: &RecordMap) -> Option<usize> {
    resolve_index(query, files, records, &mut rand::rng())
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    warp::reply::with_status(message.into(), status).into_response()
}

fn internal_error(error: &ReviewError) -> Response {
    error!("{}", error);
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

async fn show_page(query: PageQuery, state: Arc<ReviewState>) -> Result<Response, Infallible> {
    let files = match state.dataset.image_files().await {
        Ok(files) => files,
        Err(error) => return Ok(internal_error(&error)),
    };
    let records = state.records.snapshot().await;

    let Some(index) = pick_index(&query, &files, &records) else {
        return Ok(error_reply(
            StatusCode::NOT_FOUND,
            "No more unprocessed images",
        ));
    };

    let Some(filename) = files.get(index) else {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Image not found"));
    };

    let label = match state.dataset.load_caption(filename).await {
        Ok(label) => label,
        Err(error) => return Ok(internal_error(&error)),
    };

    let processed = files
        .iter()
        .filter(|f| records.get(*f).is_some_and(ProcessedRecord::is_processed))
        .count();

    let view = PageView {
        filename,
        label: &label,
        index,
        total: files.len(),
        processed,
        record: records.get(filename).copied().unwrap_or_default(),
    };

    Ok(warp::reply::html(render(&view).into_string()).into_response())
}

async fn save_review(form: SaveForm, state: Arc<ReviewState>) -> Result<Response, Infallible> {
    let Ok(id) = form.index.trim().parse::<i64>() else {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "ID is invalid"));
    };

    if let Err(error) = state.dataset.resolve(&form.filename) {
        return Ok(error_reply(StatusCode::BAD_REQUEST, error.to_string()));
    }

    let record = ProcessedRecord {
        confirmed: SaveForm::is_checked(&form.confirmed),
        skipped: SaveForm::is_checked(&form.skip),
        id,
    };

    if record.confirmed {
        if let Err(error) =
            save_to_refined(&state.dataset, &state.refined_dir, &form.filename, &form.label).await
        {
            return Ok(internal_error(&error));
        }
    }

    if let Err(error) = state.records.update(&form.filename, record).await {
        error!(
            "Error saving processed records to {}: {}",
            state.records.path().display(),
            error
        );
    }
    debug!("Recorded {:?} for {}", record, form.filename);

    let files = match state.dataset.image_files().await {
        Ok(files) => files,
        Err(error) => return Ok(internal_error(&error)),
    };
    let records = state.records.snapshot().await;

    let Some(next) = next_unprocessed_index(&files, &records, 0) else {
        return Ok(error_reply(
            StatusCode::NOT_FOUND,
            "No more unprocessed images",
        ));
    };

    match format!("/?index={next}").parse::<Uri>() {
        Ok(location) => Ok(warp::redirect::see_other(location).into_response()),
        Err(error) => Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            error.to_string(),
        )),
    }
}

fn with_state(
    state: Arc<ReviewState>,
) -> impl Filter<Extract = (Arc<ReviewState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn routes(
    state: Arc<ReviewState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let page = warp::get()
        .and(warp::path::end())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(show_page);

    let save = warp::post()
        .and(warp::path("save"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_FORM_SIZE))
        .and(warp::body::form::<SaveForm>())
        .and(with_state(state.clone()))
        .and_then(save_review);

    let images = warp::path("images").and(warp::fs::dir(state.dataset.root().to_path_buf()));

    page.or(save).or(images)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        refined: PathBuf,
        processed: PathBuf,
        state: Arc<ReviewState>,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("dataset");
        let refined = dir.path().join("refined");
        let processed = dir.path().join("processed.json");

        std::fs::create_dir_all(root.join("Studio A")).unwrap();
        std::fs::write(root.join("Studio A/x"), b"image x").unwrap();
        std::fs::write(root.join("Studio A/x.txt"), b"scraped caption").unwrap();
        std::fs::write(root.join("Studio A/y.jpg"), b"image y").unwrap();

        let state = Arc::new(ReviewState {
            dataset: Dataset::new(&root),
            refined_dir: refined.clone(),
            records: RecordStore::load(&processed).await,
        });

        Fixture {
            _dir: dir,
            root,
            refined,
            processed,
            state,
        }
    }

    fn form_request(body: &str) -> warp::test::RequestBuilder {
        warp::test::request()
            .method("POST")
            .path("/save")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn index_resolution() {
        let files: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut records = RecordMap::new();
        records.insert(
            "a".into(),
            ProcessedRecord {
                confirmed: true,
                ..Default::default()
            },
        );
        let mut rng = StdRng::seed_from_u64(3);
        let query = |index: Option<&str>, update: Option<&str>| PageQuery {
            index: index.map(String::from),
            update: update.map(String::from),
            random: None,
        };

        assert_eq!(resolve_index(&query(None, None), &files, &records, &mut rng), Some(1));
        assert_eq!(resolve_index(&query(Some("-3"), None), &files, &records, &mut rng), Some(1));
        assert_eq!(resolve_index(&query(Some("2"), None), &files, &records, &mut rng), Some(2));
        assert_eq!(resolve_index(&query(Some("0"), Some("1")), &files, &records, &mut rng), Some(0));
        assert_eq!(resolve_index(&query(Some("0"), Some("")), &files, &records, &mut rng), Some(1));
        assert_eq!(resolve_index(&query(Some("9"), Some("1")), &files, &records, &mut rng), Some(9));

        let random = PageQuery {
            random: Some("true".into()),
            ..Default::default()
        };
        let picked = resolve_index(&random, &files, &records, &mut rng).unwrap();
        assert!(picked == 1 || picked == 2);
    }

    #[tokio::test]
    async fn confirm_copies_into_refined_and_redirects() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = form_request("filename=Studio%20A%2Fx&label=hello&confirmed=on&index=0")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/?index=1");
        assert_eq!(read(&fx.refined.join("Studio A/x")), "image x");
        assert_eq!(read(&fx.refined.join("Studio A/x.txt")), "hello");

        let saved: serde_json::Value = serde_json::from_str(&read(&fx.processed)).unwrap();
        assert_eq!(saved["Studio A/x"]["confirmed"], true);
        assert_eq!(saved["Studio A/x"]["skipped"], false);
        assert_eq!(saved["Studio A/x"]["id"], 0);
    }

    #[tokio::test]
    async fn skip_records_without_copying() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = form_request("filename=Studio%20A%2Fx&label=ignored&skip=on&index=0")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(!fx.refined.exists());

        let page = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(page.status(), StatusCode::OK);
        let body = String::from_utf8_lossy(page.body()).to_string();
        assert!(body.contains("Studio A/y.jpg"));
    }

    #[tokio::test]
    async fn page_shows_caption_of_first_unprocessed() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = String::from_utf8_lossy(res.body()).to_string();
        assert!(body.contains("scraped caption"));
        assert!(body.contains(r#"value="Studio A/x""#));
    }

    #[tokio::test]
    async fn out_of_bounds_index_is_not_found() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = warp::test::request()
            .path("/?index=5&update=true")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = warp::test::request().path("/?index=5").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_index_is_bad_request() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = form_request("filename=Studio%20A%2Fx&label=hello&confirmed=on&index=abc")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = form_request("filename=..%2Fescape&label=x&index=0")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!fx.processed.exists());
    }

    #[tokio::test]
    async fn last_decision_leaves_nothing_to_review() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        form_request("filename=Studio%20A%2Fx&skip=on&index=0")
            .reply(&filter)
            .await;
        let res = form_request("filename=Studio%20A%2Fy.jpg&skip=on&index=1")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = warp::test::request().path("/?random=true").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        // Reviewed images can still be opened directly.
        let res = warp::test::request()
            .path("/?index=1&update=true")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_raw_images() {
        let fx = fixture().await;
        let filter = routes(fx.state.clone());

        let res = warp::test::request()
            .path("/images/Studio%20A/y.jpg")
            .reply(&filter)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"image y");
        assert!(fx.root.join("Studio A/y.jpg").exists());
    }
}
