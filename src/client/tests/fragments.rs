use super::*;
use tempfile::TempDir;

fn batch() -> (Vec<String>, Vec<f64>, Vec<f64>) {
    (
        vec![
            "AgnesShacklock-01.trs".to_string(),
            "BR2044_OllyOhlson.eaf".to_string(),
            "UC427_ViktoriaPapp_A_ENG.eaf".to_string(),
        ],
        vec![1.0, 2.5, 10.0],
        vec![2.0, 3.75, 12.125],
    )
}

#[tokio::test]
async fn test_sound_fragments_written_in_order() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .and(header("accept", "audio/wav"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF....WAVE".to_vec()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (ids, starts, ends) = batch();
    let outcome = client
        .get_sound_fragments(&ids, &starts, &ends, Some(16000), Some(temp_dir.path()))
        .await;

    assert!(outcome.is_ok(), "unexpected errors: {:?}", outcome.errors);
    let files = outcome.result.unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(
        files[0].as_deref(),
        Some(temp_dir.path().join("AgnesShacklock-01__1.000-2.000.wav").as_path())
    );
    assert_eq!(
        files[2].as_deref(),
        Some(temp_dir.path().join("UC427_ViktoriaPapp_A_ENG__10.000-12.125.wav").as_path())
    );
    for file in files.iter().flatten() {
        assert_eq!(std::fs::read(file).unwrap(), b"RIFF....WAVE");
    }

    // Items are fetched in input order with their own parameters
    let requests = mock_server.received_requests().await.unwrap();
    let queries: Vec<String> = requests
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        queries[1],
        "id=BR2044_OllyOhlson.eaf&start=2.5&end=3.75&sampleRate=16000"
    );
}

#[tokio::test]
async fn test_failed_item_leaves_gap_and_batch_continues() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .and(query_param("id", "BR2044_OllyOhlson.eaf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (ids, starts, ends) = batch();
    let outcome = client
        .get_sound_fragments(&ids, &starts, &ends, None, Some(temp_dir.path()))
        .await;

    let files = outcome.result.unwrap();
    assert_eq!(files.len(), 3);
    assert!(files[0].is_some());
    assert!(files[1].is_none());
    assert!(files[2].is_some());

    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("fragment 1 (BR2044_OllyOhlson.eaf"), "got {}", errors[0]);
    assert!(errors[0].contains("HTTP 500"));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_mismatched_lengths_rejected_without_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (ids, starts, mut ends) = batch();
    ends.pop();
    let outcome = client
        .get_sound_fragments(&ids, &starts, &ends, None, None)
        .await;

    assert_eq!(outcome.result, None);
    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("same length"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disposition_filename_used_and_directory_created() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("textgrids");

    Mock::given(method("GET"))
        .and(path(base_path("api/serialize/fragment")))
        .and(query_param("mimeType", "text/praat-textgrid"))
        .and(header("accept", "text/praat-textgrid"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename=\"../AgnesShacklock-01__1.000-2.000.TextGrid\"",
                )
                .set_body_string("File type = \"ooTextFile\""),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ids = vec!["AgnesShacklock-01.trs".to_string()];
    let layers = vec!["orthography".to_string(), "phonemes".to_string()];
    let outcome = client
        .get_fragments(&ids, &[1.0], &[2.0], &layers, "text/praat-textgrid", Some(&dir))
        .await;

    assert!(outcome.is_ok(), "unexpected errors: {:?}", outcome.errors);
    let expected = dir.join("AgnesShacklock-01__1.000-2.000.TextGrid");
    assert_eq!(outcome.result.unwrap(), vec![Some(expected.clone())]);
    assert!(dir.is_dir());
    assert!(std::fs::read_to_string(expected).unwrap().contains("ooTextFile"));

    let requests = mock_server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("layerId=orthography&layerId=phonemes"));
}

#[tokio::test]
async fn test_write_failure_is_per_item_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server)
        .with_file_store(Arc::new(RecordingStore::failing_writes()));
    let (ids, starts, ends) = batch();
    let outcome = client
        .get_sound_fragments(&ids, &starts, &ends, None, Some(std::path::Path::new("/clips")))
        .await;

    assert_eq!(outcome.result, Some(vec![None, None, None]));
    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors[2].starts_with("fragment 2 "));
    assert!(errors[2].contains("disk full"));
}

#[tokio::test]
async fn test_directory_failure_fails_batch() {
    let mock_server = MockServer::start().await;

    let client = client_for(&mock_server)
        .with_file_store(Arc::new(RecordingStore::failing_dirs()));
    let (ids, starts, ends) = batch();
    let outcome = client
        .get_sound_fragments(&ids, &starts, &ends, None, Some(std::path::Path::new("/clips")))
        .await;

    assert_eq!(outcome.result, None);
    assert!(outcome.first_error().unwrap().contains("could not create directory /clips"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sound_fragments_for_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&mock_server)
        .await;

    let store = Arc::new(RecordingStore::default());
    let client = client_for(&mock_server).with_file_store(store.clone());
    let matches = vec![crate::types::Match {
        match_id: "g_3;em_11_23;n_19985-n_20003;p_4;#=ew_0_12611;prefix=001-".to_string(),
        transcript: "AgnesShacklock-01.trs".to_string(),
        line: 60.897,
        line_end: 67.922,
        ..Default::default()
    }];
    let outcome = client
        .get_sound_fragments_for_matches(&matches, None, Some(std::path::Path::new("/clips")))
        .await;

    assert!(outcome.is_ok());
    let files = store.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(
        files[0].0,
        std::path::PathBuf::from("/clips/AgnesShacklock-01__60.897-67.922.wav")
    );
    assert_eq!(store.dirs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_directory_from_config() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.fragments.temp_dir = Some(temp_dir.path().to_path_buf());
    config.fragments.sample_rate = Some(8000);
    let client = StoreClient::new(config).unwrap();

    let ids = vec!["AgnesShacklock-01.trs".to_string()];
    let outcome = client
        .get_sound_fragments(&ids, &[0.0], &[1.5], None, None)
        .await;

    let files = outcome.result.unwrap();
    assert!(files[0].as_ref().unwrap().starts_with(temp_dir.path()));

    let requests = mock_server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("start=0"));
    assert!(query.contains("sampleRate=8000"));
}

#[tokio::test]
async fn test_cancel_fails_rest_of_batch() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"RIFF".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let canceller = client.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel_pending();
    });

    let (ids, starts, ends) = batch();
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        client.get_sound_fragments(&ids, &starts, &ends, None, Some(temp_dir.path())),
    )
    .await
    .expect("cancelled batch should settle promptly");

    assert_eq!(outcome.result.unwrap(), vec![None, None, None]);
    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e.ends_with(": cancelled")), "got {:?}", errors);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_envelope_relayed_for_failed_fragment() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(error_envelope(&["Invalid transcript ID: nobody.trs"])),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let ids = vec!["nobody.trs".to_string()];
    let outcome = client
        .get_sound_fragments(&ids, &[0.0], &[1.0], None, Some(temp_dir.path()))
        .await;

    let errors = outcome.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].ends_with("Invalid transcript ID: nobody.trs"),
        "got {}",
        errors[0]
    );
}

#[tokio::test]
async fn test_slow_fragment_uses_transfer_timeout() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(base_path("soundfragment")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"RIFF".to_vec())
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(store_path("getId")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!("demo")))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.http.timeout = Duration::from_millis(200);
    config.http.transfer_timeout = Duration::from_secs(5);
    let client = StoreClient::new(config).unwrap();

    let ids = vec!["AgnesShacklock-01.trs".to_string()];
    let outcome = client
        .get_sound_fragments(&ids, &[0.0], &[1.0], None, Some(temp_dir.path()))
        .await;
    assert!(outcome.is_ok(), "unexpected errors: {:?}", outcome.errors);

    // Ordinary store calls keep the shorter limit
    let outcome = client
        .issue("getId", &Parameters::new(), None, Method::Get)
        .await;
    let errors = outcome.errors.unwrap();
    assert!(errors[0].starts_with("failed: timed out"), "got {}", errors[0]);
}
