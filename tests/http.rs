use alarm_app::{AlarmApi, Alarm, AlarmDraft, ApiClient};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

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
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("alarm_app_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/alarm")).send().await {
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
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_alarm_app"))
        .env("PORT", port.to_string())
        .env("ALARM_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
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

async fn list(client: &Client, base_url: &str) -> Vec<Alarm> {
    client
        .get(format!("{base_url}/api/alarm"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_create_then_list_returns_alarm() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/alarm", server.base_url))
        .json(&serde_json::json!({
            "hours": 7,
            "minutes": 5,
            "days": [1, 3, 5],
            "isEnabled": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    let id = body["id"].as_i64().expect("id in response");
    assert!(id > 0);

    let alarms = list(&client, &server.base_url).await;
    let alarm = alarms.iter().find(|alarm| alarm.id == id).expect("missing alarm");
    assert_eq!((alarm.hours, alarm.minutes), (7, 5));
    assert_eq!(alarm.days.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert!(alarm.is_enabled);

    let ids: Vec<i64> = alarms.iter().map(|alarm| alarm.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn http_invalid_alarm_is_rejected_with_error_body() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = list(&client, &server.base_url).await.len();

    let response = client
        .post(format!("{}/api/alarm", server.base_url))
        .json(&serde_json::json!({
            "hours": 25,
            "minutes": 0,
            "days": [],
            "isEnabled": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "hours must be less than 24");

    assert_eq!(list(&client, &server.base_url).await.len(), before);
}

#[tokio::test]
async fn http_update_and_delete_round_trip_through_client() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let api = ApiClient::new(server.base_url.clone());

    let id = api
        .create(&AlarmDraft {
            hours: 6,
            minutes: 30,
            days: Default::default(),
            is_enabled: true,
        })
        .await
        .unwrap();

    let updated = Alarm {
        id,
        hours: 6,
        minutes: 45,
        days: [0, 6].into_iter().collect(),
        is_enabled: false,
    };
    api.update(&updated).await.unwrap();
    let alarms = api.list().await.unwrap();
    assert_eq!(alarms.iter().find(|alarm| alarm.id == id), Some(&updated));

    api.remove(id).await.unwrap();
    let alarms = api.list().await.unwrap();
    assert!(alarms.iter().all(|alarm| alarm.id != id));

    let err = api.remove(id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.to_string(), format!("alarm {id} not found"));
}

#[tokio::test]
async fn http_update_of_unknown_alarm_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let api = ApiClient::new(server.base_url.clone());

    let err = api
        .update(&Alarm {
            id: 999_999,
            hours: 8,
            minutes: 0,
            days: Default::default(),
            is_enabled: true,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn http_stop_succeeds_when_nothing_rings() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/stop", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    ApiClient::new(server.base_url.clone()).stop().await.unwrap();
}
