use rbplaylist::{Coordinator, Error, RadioEvent, SnapshotStore, Track};
use tempfile::TempDir;

#[test]
fn test_decorated_links_share_one_entry() {
    let radio = Coordinator::new();
    radio
        .resolve_and_add("general", "https://youtu.be/fB63ztKnGvo?t=12", "a")
        .unwrap();
    radio
        .resolve_and_add(
            "cyle",
            "https://www.youtube.com/watch?v=fB63ztKnGvo&feature=share&utm_source=chat",
            "b",
        )
        .unwrap();

    let tracks = radio.tracks();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].link, "https://www.youtube.com/watch?v=fB63ztKnGvo");
    assert_eq!(tracks[0].contributor, "a");
}

#[test]
fn test_queue_cycles_back_to_start() {
    let radio = Coordinator::new();
    for link in [
        "https://youtu.be/fB63ztKnGvo",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://youtu.be/9bZkp7q19f0",
    ] {
        radio.resolve_and_add("general", link, "").unwrap();
    }

    let start = radio.current("general").unwrap().unwrap();
    for _ in 0..3 {
        radio.next("general").unwrap();
    }
    assert_eq!(radio.current("general").unwrap(), Some(start.clone()));
    for _ in 0..3 {
        radio.previous("general").unwrap();
    }
    assert_eq!(radio.current("general").unwrap(), Some(start));
}

#[test]
fn test_unknown_phrase_is_not_found() {
    let radio = Coordinator::new();
    radio.seed(Track::from_link(
        "https://youtu.be/fB63ztKnGvo",
        "Disclosure",
        "Omen",
        "",
    ));

    assert!(matches!(
        radio.resolve_and_add("general", "Unknown Band - Unknown Song", "x"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(radio.play_now("Unknown Band"), Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("snapshots/radiobot.json"));

    let radio = Coordinator::new();
    radio
        .resolve_and_add("general", "https://youtu.be/fB63ztKnGvo", "cyle")
        .unwrap();
    radio
        .resolve_and_add("general", "https://youtu.be/dQw4w9WgXcQ", "bob")
        .unwrap();
    radio
        .set_track("https://youtu.be/dQw4w9WgXcQ", "Rick Astley", "Never Gonna Give You Up", "")
        .unwrap();
    radio.next("general").unwrap();
    assert!(radio.flush(&store).await.unwrap());

    let restarted = Coordinator::new();
    let mut rx = restarted.subscribe();
    let report = restarted.restore(store.load().await.unwrap().unwrap());
    assert_eq!(report.tracks, 2);
    assert_eq!(report.queues, 1);
    assert!(matches!(
        rx.recv().await.unwrap(),
        RadioEvent::Updated { queue: None }
    ));

    assert_eq!(restarted.tracks(), radio.tracks());
    assert_eq!(
        restarted.queue_overview("general").unwrap(),
        radio.queue_overview("general").unwrap()
    );
    assert_eq!(
        restarted.current("general").unwrap().map(|t| t.display_name()),
        Some("Rick Astley - Never Gonna Give You Up".to_string())
    );
}

#[tokio::test]
async fn test_periodic_snapshot_task() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("radiobot.json"));

    let radio = Coordinator::new();
    radio
        .resolve_and_add("general", "https://youtu.be/fB63ztKnGvo", "")
        .unwrap();

    let task = radio.spawn_snapshot_task(store.clone(), std::time::Duration::from_millis(10));
    for _ in 0..100 {
        if !radio.is_dirty() && store.path().exists() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    task.abort();

    let snapshot = store.load().await.unwrap().unwrap();
    assert_eq!(snapshot.library.len(), 1);
    assert_eq!(snapshot.playlists[0].name, "general");
}

#[cfg(feature = "rbconfig")]
#[tokio::test]
async fn test_configured_default_queue_receives_single_playlist() {
    use rbplaylist::RadioConfigExt;

    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "radio:\n  default_queue: lobby\n",
    )
    .unwrap();
    let config = rbconfig::Config::load_config(dir.path().to_str().unwrap()).unwrap();

    let store = config.snapshot_store().unwrap();
    assert_eq!(store.default_queue(), "lobby");

    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(
        store.path(),
        r#"{"library": [{"link": "https://youtu.be/fB63ztKnGvo"}], "playlist": ["fB63ztKnGvo"]}"#,
    )
    .unwrap();

    let radio = Coordinator::new();
    radio.restore(store.load().await.unwrap().unwrap());
    assert_eq!(radio.queue_names(), vec!["lobby".to_string()]);
}
