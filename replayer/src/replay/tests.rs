use super::*;
use crate::client::TransportError;
use crate::dataset::WirePackage;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::Instant;

/// Records when each package arrived; answers with a scripted status per call
struct RecordingSink {
    started: Instant,
    sent: Mutex<Vec<(Duration, i64)>>,
    script: Vec<Result<u16, ()>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self::scripted(Vec::new())
    }

    /// Calls beyond the script answer 200
    fn scripted(script: Vec<Result<u16, ()>>) -> Self {
        Self {
            started: Instant::now(),
            sent: Mutex::new(Vec::new()),
            script,
        }
    }

    fn offsets(&self) -> Vec<Duration> {
        self.sent.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    fn timestamps(&self) -> Vec<i64> {
        self.sent.lock().unwrap().iter().map(|(_, ts)| *ts).collect()
    }
}

#[async_trait]
impl PackageSink for RecordingSink {
    async fn send(&self, package: &WirePackage) -> Result<u16, TransportError> {
        let mut sent = self.sent.lock().unwrap();
        let call = sent.len();
        sent.push((self.started.elapsed(), package.timestamp));

        match self.script.get(call) {
            Some(Ok(status)) => Ok(*status),
            Some(Err(())) => Err(TransportError::Network(network_error())),
            None => Ok(200),
        }
    }
}

/// A real reqwest error: a request with an unparseable URL fails before I/O
fn network_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("http://")
        .build()
        .unwrap_err()
}

fn raw(timestamp: &str) -> Result<RawRow, DecodeError> {
    Ok(RawRow {
        ip: format!("198.51.100.{}", timestamp.len()),
        latitude: "1.0".to_string(),
        longitude: "2.0".to_string(),
        timestamp: timestamp.to_string(),
        suspicious: "0".to_string(),
    })
}

fn no_shutdown() -> watch::Receiver<bool> {
    // keep the sender alive for the whole test
    let (tx, rx) = watch::channel(false);
    std::mem::forget(tx);
    rx
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn test_pacing_delay_rule() {
    assert_eq!(pacing_delay(None, 100), None);
    assert_eq!(pacing_delay(Some(100), 103), Some(secs(3)));
    assert_eq!(pacing_delay(Some(103), 103), None);
    assert_eq!(pacing_delay(Some(110), 104), None);
}

#[tokio::test(start_paused = true)]
async fn test_replay_reproduces_recorded_gaps() {
    let replayer = Replayer::new(RecordingSink::new());
    let rows = ["100", "103", "103", "110"].map(raw);

    let summary = replayer.run(rows, no_shutdown()).await;

    assert_eq!(summary.sent, 4);
    assert!(!summary.interrupted);
    // no wait before the first send, then 3s, 0s, 7s
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(3), secs(3), secs(10)]);
    assert_eq!(replayer.sink.timestamps(), vec![100, 103, 103, 110]);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_timestamp_sends_immediately_without_reordering() {
    let replayer = Replayer::new(RecordingSink::new());
    let rows = ["100", "105", "101", "106"].map(raw);

    replayer.run(rows, no_shutdown()).await;

    assert_eq!(replayer.sink.timestamps(), vec![100, 105, 101, 106]);
    // 101 follows 105 with no wait; 106 then waits 5s measured from 101
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(5), secs(5), secs(10)]);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_row_is_skipped_without_touching_pacing() {
    let replayer = Replayer::new(RecordingSink::new());
    let rows = vec![raw("100"), raw("not-a-time"), raw("104")];

    let summary = replayer.run(rows, no_shutdown()).await;

    assert_eq!(summary.sent, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(replayer.sink.timestamps(), vec![100, 104]);
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(4)]);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_row_is_skipped() {
    let replayer = Replayer::new(RecordingSink::new());
    let bad_row = crate::dataset::rows(crate::dataset::reader(
        "ip address,Latitude,Longitude,Timestamp,suspicious\n1.1.1.1,1\n".as_bytes(),
    ))
    .next()
    .unwrap();
    assert!(bad_row.is_err());

    let rows = vec![raw("10"), bad_row, raw("12")];
    let summary = replayer.run(rows, no_shutdown()).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(2)]);
}

#[tokio::test(start_paused = true)]
async fn test_send_failures_do_not_stop_or_shift_the_run() {
    let replayer = Replayer::new(RecordingSink::scripted(vec![Ok(200), Err(()), Ok(500)]));
    let rows = ["0", "2", "5", "6"].map(raw);

    let summary = replayer.run(rows, no_shutdown()).await;

    assert_eq!(
        summary,
        ReplaySummary {
            sent: 2,
            rejected: 1,
            failed: 1,
            skipped: 0,
            interrupted: false,
        }
    );
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(2), secs(5), secs(6)]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_pacing_sleep() {
    let replayer = Replayer::new(RecordingSink::new());
    let (tx, rx) = watch::channel(false);
    let rows = ["100", "3700", "3701"].map(raw);

    tokio::spawn(async move {
        tokio::time::sleep(secs(5)).await;
        tx.send(true).unwrap();
    });

    let summary = replayer.run(rows, rx).await;

    assert!(summary.interrupted);
    assert_eq!(summary.sent, 1);
    assert_eq!(replayer.sink.timestamps(), vec![100]);
    assert!(replayer.sink.started.elapsed() < secs(3600));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_shutdown_sender_does_not_cut_sleep_short() {
    let replayer = Replayer::new(RecordingSink::new());
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let summary = replayer.run(["1", "31"].map(raw), rx).await;

    assert!(!summary.interrupted);
    assert_eq!(replayer.sink.offsets(), vec![secs(0), secs(30)]);
}
