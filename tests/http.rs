use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const USER_INFO: &str = "user_id,region,age_range,gender\n\
1,England,18-24,F\n\
2,England,25-34,M\n\
3,Scotland,18-24,F\n\
4,Wales,35-44,M\n";

const WEB_USAGE: &str = "session_id,date,region,play_time\n\
s1,2020-01-02 09:30:00,England,10\n\
s2,2020-01-01 21:00:00,England,5\n\
s1,2020-01-02 09:30:00,England,10\n\
s3,2020-01-01,Scotland,7.5\n";

const GENRES: &str = "region,genre_1,session_counts\n\
England,Drama,12\n\
Scotland,News,4\n\
England,News,3\n";

const MOST_POPULAR: &str = "title,channel,rank\n\
EastEnders,BBC One,1\n\
Doctor Who,BBC One,2\n\
Newsround,CBBC,3\n";

#[derive(Debug, Deserialize)]
struct RegionSummary {
    region: String,
    distinct_sessions: u64,
    total_play_time: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("viewing_dashboard_http_{}_{}", std::process::id(), nanos));
    path
}

fn write_fixtures(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create data dir");
    for (name, contents) in [
        ("cleaned_user_info.csv", USER_INFO),
        ("cleaned_web_usage.csv", WEB_USAGE),
        ("genre_analysis.csv", GENRES),
        ("iplayer_most_popular.csv", MOST_POPULAR),
    ] {
        std::fs::write(dir.join(name), contents).expect("write fixture");
    }
}

fn server_command(port: u16, data_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_viewing_dashboard"));
    command
        .env("PORT", port.to_string())
        .env("DASHBOARD_DATA_DIR", data_dir)
        .env("DASHBOARD_TITLE", "Fixture Dashboard")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/summary")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = unique_data_dir();
    write_fixtures(&data_dir);
    let child = server_command(port, &data_dir)
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post_callback(server: &TestServer, body: Value) -> reqwest::Response {
    Client::new()
        .post(format!("{}/api/callback", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

fn collect_ids(node: &Value, ids: &mut Vec<String>) {
    if let Some(id) = node.get("id").and_then(Value::as_str) {
        ids.push(id.to_string());
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            collect_ids(child, ids);
        }
    }
}

#[tokio::test]
async fn http_index_renders_shell() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let html = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("<title>Fixture Dashboard</title>"));
    assert!(html.contains("2020-01-01 to 2020-01-02"));
    assert!(html.contains("Regional User Breakdown"));
    assert!(html.contains("Regional Viewing Trends"));
}

#[tokio::test]
async fn http_summary_counts_distinct_sessions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let summary: Vec<RegionSummary> = Client::new()
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].region, "England");
    assert_eq!(summary[0].distinct_sessions, 2);
    assert_eq!(summary[0].total_play_time, 25.0);
    assert_eq!(summary[1].region, "Scotland");
    assert_eq!(summary[1].total_play_time, 7.5);
}

#[tokio::test]
async fn http_tab_callbacks_return_tab_content() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = post_callback(&server, json!({ "input": "tabs", "value": "tab-1" })).await;
    assert!(response.status().is_success());
    let update: Value = response.json().await.unwrap();
    assert_eq!(update["output"], json!("tabs-content"));
    let mut ids = Vec::new();
    collect_ids(&update["children"], &mut ids);
    assert_eq!(ids, vec!["regions-graph", "gender-graph", "age-graph"]);

    let response = post_callback(&server, json!({ "input": "tabs", "value": "tab-2" })).await;
    let update: Value = response.json().await.unwrap();
    let mut ids = Vec::new();
    collect_ids(&update["children"], &mut ids);
    assert_eq!(
        ids,
        vec![
            "summary-field",
            "summary-graph",
            "popular-table",
            "popular-table-output",
            "genre-graph",
            "daily-graph",
        ]
    );

    let again: Value = post_callback(&server, json!({ "input": "tabs", "value": "tab-2" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again, update);

    let by_path: Value = Client::new()
        .get(format!("{}/api/tabs/tab-2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_path, update);
}

#[tokio::test]
async fn http_summary_field_rebuilds_pie() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = post_callback(&server, json!({ "input": "summary-field", "value": "play_time" })).await;
    assert!(response.status().is_success());
    let update: Value = response.json().await.unwrap();
    assert_eq!(update["output"], json!("summary-graph"));
    assert_eq!(update["figure"]["data"][0]["type"], json!("pie"));
    assert_eq!(update["figure"]["data"][0]["values"], json!([25.0, 7.5]));
    assert_eq!(update["figure"]["data"][0]["labels"], json!(["England", "Scotland"]));
    assert_eq!(update["figure"]["layout"]["title"]["text"], json!("play_time by region"));
}

#[tokio::test]
async fn http_table_edit_clears_output() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let expected = json!({ "output": "popular-table-output", "children": { "node": "empty" } });
    for value in [
        Value::Null,
        json!([]),
        json!([{ "title": "EastEnders", "channel": "BBC One", "rank": 1 }]),
    ] {
        let response = post_callback(&server, json!({ "input": "popular-table", "value": value })).await;
        assert!(response.status().is_success());
        let update: Value = response.json().await.unwrap();
        assert_eq!(update, expected);
    }
}

#[tokio::test]
async fn http_rejects_unknown_inputs() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = post_callback(&server, json!({ "input": "tabs", "value": "tab-3" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_callback(&server, json!({ "input": "summary-field", "value": "user_id" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_callback(&server, json!({ "input": "tabs", "value": " tab-2 " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_callback(&server, json!({ "input": "nowhere", "value": 1 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = Client::new()
        .get(format!("{}/api/tabs/tab-3", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_malformed_callback_body_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/callback", server.base_url);

    let response = post_callback(&server, json!({ "value": "tab-1" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(&url)
        .header("content-type", "text/plain")
        .body(r#"{"input":"tabs","value":"tab-1"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_missing_dataset_fails_startup() {
    let data_dir = unique_data_dir();
    write_fixtures(&data_dir);
    std::fs::remove_file(data_dir.join("genre_analysis.csv")).unwrap();

    let mut child = server_command(pick_free_port(), &data_dir)
        .spawn()
        .expect("failed to spawn server");

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("server started without its genre dataset");
        }
        sleep(Duration::from_millis(50)).await;
    };
    assert!(!status.success());
}
