// Shared fixtures for integration tests
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use omnilink_bridge::transport::simulated::SimulatedController;
use omnilink_bridge::{BridgeConfig, OmniBridge, Transport};

pub const KEY1: &str = "00-11-22-33-44-55-66-77";
pub const KEY2: &str = "88-99-AA-BB-CC-DD-EE-FF";

pub fn config() -> BridgeConfig {
    BridgeConfig::builder()
        .host("omni.test")
        .keys(KEY1, KEY2)
        .max_connect_retries(0)
        .build()
}

pub async fn activate(sim: &Arc<SimulatedController>) -> OmniBridge {
    activate_with(sim, config()).await
}

pub async fn activate_with(sim: &Arc<SimulatedController>, config: BridgeConfig) -> OmniBridge {
    let transport: Arc<dyn Transport> = sim.clone();
    OmniBridge::activate(config, transport)
        .await
        .expect("bridge should activate")
}

/// Yield until `sim` has `n` requests blocked inside it.
pub async fn wait_in_flight(sim: &SimulatedController, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while sim.in_flight() < n {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("requests never reached the controller");
}

/// Log output captured from a thread-local subscriber.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture log output on this thread until the guard is dropped.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
