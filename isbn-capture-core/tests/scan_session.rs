mod support;

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use isbn_capture_core::{
    CallbackDelegate, Identifier, ScanConfiguration, ScanError, ScanOutcome, ScanSession, ScanState,
};

use support::{MockCamera, MockOcr, RecordingDelegate, ScriptedBarcode};

fn fast_config() -> ScanConfiguration {
    ScanConfiguration {
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    }
}

fn session(
    camera: MockCamera,
    barcode: ScriptedBarcode,
    ocr: MockOcr,
) -> (ScanSession<MockCamera, ScriptedBarcode, MockOcr>, Arc<RecordingDelegate>) {
    let delegate = Arc::new(RecordingDelegate::default());
    let mut session = ScanSession::new(camera, barcode, ocr);
    session.set_delegate(delegate.clone());
    session.configure(fast_config()).unwrap();
    (session, delegate)
}

#[test]
fn barcode_channel_accepts_first_valid_identifier() {
    let camera = MockCamera::new();
    let camera_counters = camera.counters.clone();
    let ocr = MockOcr::blank();
    let engine = ocr.counters.clone();
    let (mut session, delegate) =
        session(camera, ScriptedBarcode::always("978-0-89279-079-6"), ocr);

    session.start().unwrap();
    let outcome = session.wait();

    assert_eq!(outcome, ScanOutcome::Accepted("9780892790796".parse().unwrap()));
    assert_eq!(delegate.outcomes(), vec![outcome]);
    assert_eq!(camera_counters.stops(), 1);
    assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
    assert_eq!(engine.terminates.load(Ordering::SeqCst), 1);
    assert!(matches!(session.state(), ScanState::Completed(_)));
}

#[test]
fn both_channels_valid_in_same_cycle_delivers_one_outcome() {
    let camera = MockCamera::new();
    let camera_counters = camera.counters.clone();
    let barcode = ScriptedBarcode::always("9780892790796");
    let releases = barcode.releases.clone();
    let ocr = MockOcr::new("ISBN 0-306-40615-2");
    let engine = ocr.counters.clone();
    let (mut session, delegate) = session(camera, barcode, ocr);

    session.start().unwrap();
    let outcome = session.wait();
    session.stop();

    let id = outcome.identifier().expect("one channel must win").to_string();
    assert!(id == "9780892790796" || id == "0306406152", "unexpected {id}");
    assert_eq!(delegate.outcomes().len(), 1);
    assert_eq!(camera_counters.stops(), 1);
    assert_eq!(engine.terminates.load(Ordering::SeqCst), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn ocr_channel_extracts_prefixed_isbn_from_binarized_copy() {
    let ocr = MockOcr::new("Printed 2024\nISBN: 9780892790796\n$12.99");
    let engine = ocr.counters.clone();
    let (mut session, _delegate) = session(MockCamera::new(), ScriptedBarcode::silent(), ocr);
    session
        .configure(ScanConfiguration {
            enable_barcode: false,
            ..fast_config()
        })
        .unwrap();

    session.start().unwrap();
    let outcome = session.wait();

    assert_eq!(outcome, ScanOutcome::Accepted("9780892790796".parse().unwrap()));
    assert!(engine.recognitions.load(Ordering::SeqCst) >= 1);
    assert_eq!(engine.non_binary_frames.load(Ordering::SeqCst), 0);
}

#[test]
fn no_camera_fails_but_manual_entry_still_accepted() {
    let camera = MockCamera::failing(ScanError::NoCameraFound);
    let counters = camera.counters.clone();
    let ocr = MockOcr::blank();
    let engine = ocr.counters.clone();
    let (mut session, delegate) = session(camera, ScriptedBarcode::silent(), ocr);

    let err = session.start().unwrap_err();
    assert_eq!(err, ScanError::NoCameraFound);
    assert_eq!(session.state(), ScanState::Failed(ScanError::NoCameraFound));
    assert_eq!(counters.starts.load(Ordering::SeqCst), 0);
    assert!(delegate.errors.lock().contains(&ScanError::NoCameraFound));
    assert_eq!(engine.inits.load(Ordering::SeqCst), 0);

    let id = session.submit_manual("0-306-40615-2").unwrap();
    assert_eq!(id.as_str(), "0306406152");
    assert_eq!(session.stop(), ScanOutcome::Accepted(id));
    assert_eq!(delegate.outcomes().len(), 1);
}

#[test]
fn no_camera_then_close_reports_failure_once() {
    let (mut session, delegate) = session(
        MockCamera::failing(ScanError::PermissionDenied),
        ScriptedBarcode::silent(),
        MockOcr::blank(),
    );

    assert!(session.start().is_err());
    let outcome = session.stop();

    assert_eq!(outcome, ScanOutcome::Failed(ScanError::PermissionDenied));
    assert_eq!(session.stop(), outcome);
    assert_eq!(delegate.outcomes(), vec![outcome]);
}

#[test]
fn dropping_after_failed_start_reports_failure_once() {
    let camera = MockCamera::failing(ScanError::PermissionDenied);
    let counters = camera.counters.clone();
    let (mut session, delegate) = session(camera, ScriptedBarcode::silent(), MockOcr::blank());

    assert_eq!(session.start(), Err(ScanError::PermissionDenied));
    drop(session);

    assert_eq!(counters.starts.load(Ordering::SeqCst), 1);
    assert_eq!(
        delegate.outcomes(),
        vec![ScanOutcome::Failed(ScanError::PermissionDenied)]
    );
}

#[test]
fn manual_entry_racing_a_barcode_matches_the_delivered_outcome() {
    let scanned: Identifier = "9780892790796".parse().unwrap();
    for _ in 0..25 {
        let (mut session, delegate) = session(
            MockCamera::new(),
            ScriptedBarcode::always("9780892790796"),
            MockOcr::blank(),
        );
        session.start().unwrap();

        let submitted = session.submit_manual("0-306-40615-2");
        let outcome = session.wait();

        match submitted {
            Ok(id) => assert_eq!(outcome, ScanOutcome::Accepted(id)),
            Err(_) => assert_eq!(outcome, ScanOutcome::Accepted(scanned.clone())),
        }
        assert_eq!(delegate.outcomes(), vec![outcome]);
    }
}

#[test]
fn stop_is_idempotent() {
    let camera = MockCamera::new();
    let counters = camera.counters.clone();
    let ocr = MockOcr::blank();
    let engine = ocr.counters.clone();
    let (mut session, delegate) = session(camera, ScriptedBarcode::silent(), ocr);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(30));

    assert_eq!(session.stop(), ScanOutcome::Cancelled);
    assert_eq!(session.stop(), ScanOutcome::Cancelled);
    drop(session);

    assert_eq!(counters.starts.load(Ordering::SeqCst), 1);
    assert_eq!(counters.stops(), 1);
    assert_eq!(engine.terminates.load(Ordering::SeqCst), 1);
    assert_eq!(delegate.outcomes(), vec![ScanOutcome::Cancelled]);
}

#[test]
fn manual_entry_rejection_keeps_scanning() {
    let (mut session, delegate) =
        session(MockCamera::new(), ScriptedBarcode::silent(), MockOcr::blank());
    session.start().unwrap();

    let err = session.submit_manual("12345").unwrap_err();
    assert_eq!(err, ScanError::ManualEntryRejected("12345".into()));
    assert!(session.is_active());

    let id = session.submit_manual("978 0 89279 079 6").unwrap();
    assert_eq!(session.wait(), ScanOutcome::Accepted(id));
    assert_eq!(delegate.outcomes().len(), 1);
}

#[test]
fn repeated_rejected_candidate_is_skipped() {
    let (mut session, delegate) =
        session(MockCamera::new(), ScriptedBarcode::always("12345"), MockOcr::blank());
    session
        .configure(ScanConfiguration {
            enable_ocr: false,
            ..fast_config()
        })
        .unwrap();

    session.start().unwrap();
    thread::sleep(Duration::from_millis(200));
    session.stop();

    let diagnostics = session.diagnostics();
    assert_eq!(diagnostics.candidates_rejected, 1);
    assert!(diagnostics.duplicates_skipped >= 1);
    assert_eq!(delegate.statuses.lock().len(), 1);
}

#[test]
fn recognition_fault_does_not_end_the_loop() {
    let barcode = ScriptedBarcode::new(
        vec![
            Err(ScanError::RecognitionFault("bad frame".into())),
            Ok(None),
            Ok(Some("9780306406157".into())),
        ],
        None,
    );
    let (mut session, _delegate) = session(MockCamera::new(), barcode, MockOcr::blank());

    session.start().unwrap();
    let outcome = session.wait();

    assert_eq!(outcome, ScanOutcome::Accepted("9780306406157".parse().unwrap()));
    assert_eq!(session.diagnostics().recognition_faults, 1);
}

#[test]
fn panicking_engine_is_contained_and_released() {
    let barcode = ScriptedBarcode::new(vec![Ok(None), Ok(None)], Some("9780306406157"));
    let ocr = MockOcr::panicking();
    let engine = ocr.counters.clone();
    let (mut session, _delegate) = session(MockCamera::new(), barcode, ocr);

    session.start().unwrap();
    let outcome = session.wait();

    assert!(matches!(outcome, ScanOutcome::Accepted(_)));
    assert_eq!(engine.terminates.load(Ordering::SeqCst), 1);
}

#[test]
fn slow_channel_is_never_invoked_concurrently() {
    let ocr = MockOcr::slow("", Duration::from_millis(60));
    let engine = ocr.counters.clone();
    let (mut session, _delegate) = session(MockCamera::new(), ScriptedBarcode::silent(), ocr);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    session.stop();

    assert_eq!(engine.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(session.diagnostics().busy_skips > 0);
}

#[test]
fn timeout_fails_the_session_and_releases_camera() {
    let camera = MockCamera::new();
    let counters = camera.counters.clone();
    let (mut session, _delegate) = session(camera, ScriptedBarcode::silent(), MockOcr::blank());
    session
        .configure(ScanConfiguration {
            timeout: Some(Duration::from_millis(80)),
            ..fast_config()
        })
        .unwrap();

    session.start().unwrap();

    assert_eq!(session.wait(), ScanOutcome::Failed(ScanError::Timeout));
    assert_eq!(counters.stops(), 1);
}

#[test]
fn engine_failure_falls_back_to_barcode_only() {
    let ocr = MockOcr::unavailable();
    let engine = ocr.counters.clone();
    let (mut session, delegate) =
        session(MockCamera::new(), ScriptedBarcode::always("9780306406157"), ocr);

    session.start().unwrap();
    let outcome = session.wait();

    assert!(matches!(outcome, ScanOutcome::Accepted(_)));
    assert_eq!(engine.recognitions.load(Ordering::SeqCst), 0);
    assert_eq!(engine.terminates.load(Ordering::SeqCst), 0);
    assert!(delegate
        .errors
        .lock()
        .iter()
        .any(|e| matches!(e, ScanError::EngineUnavailable(_))));
}

#[test]
fn camera_release_fault_does_not_skip_other_steps() {
    let camera = MockCamera::new().with_stop_error(ScanError::DeviceNotAvailable("busy".into()));
    let barcode = ScriptedBarcode::always("9780306406157");
    let releases = barcode.releases.clone();
    let ocr = MockOcr::blank();
    let engine = ocr.counters.clone();
    let (mut session, delegate) = session(camera, barcode, ocr);

    session.start().unwrap();
    session.wait();

    assert_eq!(engine.terminates.load(Ordering::SeqCst), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert!(delegate
        .errors
        .lock()
        .iter()
        .any(|e| matches!(e, ScanError::ResourceRelease(_))));
}

#[test]
fn cannot_start_twice_while_scanning() {
    let (mut session, _delegate) =
        session(MockCamera::new(), ScriptedBarcode::silent(), MockOcr::blank());
    session.start().unwrap();

    let err = session.start().unwrap_err();

    assert!(matches!(err, ScanError::ConfigurationFailed(_)));
    session.stop();
}

#[test]
fn session_can_be_restarted_after_completion() {
    let camera = MockCamera::new();
    let counters = camera.counters.clone();
    let (mut session, delegate) =
        session(camera, ScriptedBarcode::always("9780306406157"), MockOcr::blank());

    session.start().unwrap();
    session.wait();
    session.start().unwrap();
    session.wait();

    assert_eq!(counters.starts.load(Ordering::SeqCst), 2);
    assert_eq!(counters.stops(), 2);
    assert_eq!(delegate.outcomes().len(), 2);
}

#[test]
fn callback_delegate_receives_accepted_identifier() {
    let (tx, rx) = mpsc::channel();
    let cancelled_tx = tx.clone();
    let mut session = ScanSession::new(
        MockCamera::new(),
        ScriptedBarcode::always("0306406152"),
        MockOcr::blank(),
    );
    session.set_delegate(Arc::new(CallbackDelegate::new(
        move |id| tx.send(Some(id.to_string())).unwrap(),
        move || cancelled_tx.send(None).unwrap(),
    )));
    session.configure(fast_config()).unwrap();

    session.start().unwrap();
    session.wait();

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        Some("0306406152".to_string())
    );
}

#[test]
fn callback_delegate_reports_cancel() {
    let (tx, rx) = mpsc::channel();
    let mut session =
        ScanSession::new(MockCamera::new(), ScriptedBarcode::silent(), MockOcr::blank());
    session.set_delegate(Arc::new(CallbackDelegate::new(
        |_| panic!("nothing should be accepted"),
        move || tx.send(()).unwrap(),
    )));
    session.configure(fast_config()).unwrap();

    session.start().unwrap();
    session.stop();

    assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
}
