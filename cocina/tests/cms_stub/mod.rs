use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A request as the stub saw it, with the query string percent-decoded.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub authorization: Option<String>,
}

/// A local HTTP server standing in for a CMS API.
pub struct CmsStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CmsStub {
    /// Serve every request with `respond(decoded_url)`, which returns a status and a JSON body.
    pub fn spawn(respond: impl Fn(&str) -> (u16, String) + Send + 'static) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start cms stub server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = url_escape::decode(&request.url().replace('+', " ")).into_owned();
            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.to_string());
            recorded.lock().unwrap().push(Recorded {
                url: url.clone(),
                authorization,
            });

            let (status, body) = respond(&url);
            let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("build header");
            let _ = request.respond(
                tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header),
            );
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for CmsStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// An address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";
