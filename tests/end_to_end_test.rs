use papergraph::graph::schema;
use papergraph::{
    run_batch, AppConfig, Error, FeedError, FeedPaths, FileSink, MemorySink, PatternQuery,
    ResultSink, Session, SnapshotStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("files")
}

fn demo_queries() -> Vec<PatternQuery> {
    vec![
        PatternQuery::Q1 {
            title: "Transactional failure recovery for a distributed key-value store".into(),
        },
        PatternQuery::Q1 { title: "paperXX".into() },
        PatternQuery::Q2 { conference: "10KM_Laredo".into() },
        PatternQuery::Q2 { conference: "SRDS".into() },
        PatternQuery::Q3 { author: "Gurtov".into() },
        PatternQuery::Q3 { author: "Feng".into() },
        PatternQuery::Q3 { author: "Soriente".into() },
        PatternQuery::Q4 { journal: "IEEE Network".into(), volume: 27 },
        PatternQuery::Q4 { journal: "KSII".into(), volume: 8 },
    ]
}

fn write_feeds(dir: &Path, conferences: &str, journals: &str, friendships: &str) -> FeedPaths {
    let paths = FeedPaths::in_dir(dir);
    fs::write(&paths.conferences, conferences).unwrap();
    fs::write(&paths.journals, journals).unwrap();
    fs::write(&paths.friendships, friendships).unwrap();
    paths
}

#[test]
fn test_demo_batch() {
    let mut session = Session::in_memory();
    let report = session.populate(&FeedPaths::in_dir(demo_dir())).unwrap();

    assert_eq!(report.conferences.records, 4);
    assert_eq!(report.journals.records, 4);
    assert_eq!(report.friendships.records, 3);
    assert!(report.friendships.stopped_at_blank);
    assert_eq!(session.store().node_count(), 22);
    assert_eq!(session.store().edge_count(), 31);

    let mut sink = MemorySink::new();
    session.run_queries(&demo_queries(), &mut sink).unwrap();

    assert_eq!(
        sink.lines(),
        &[
            "Q1: Transactional failure recovery for a distributed key-value store,(Feng,Gurtov),Kim",
            "Q1: paperXX,()",
            "Q2: 10KM_Laredo,(Energy-aware routing in mobile ad hoc networks)",
            "Q2: SRDS,(Transactional failure recovery for a distributed key-value store,Byzantine quorum systems revisited)",
            "Q3: Gurtov,(Transactional failure recovery for a distributed key-value store,Energy-aware routing in mobile ad hoc networks,Host identity protocol deployment)",
            "Q3: Feng,(Transactional failure recovery for a distributed key-value store,Byzantine quorum systems revisited,Multipath transport for vehicular networks,Adaptive video streaming over LTE)",
            "Q3: Soriente,(Byzantine quorum systems revisited,Secure pairing of wearable devices,Lightweight key management for sensor networks)",
            "Q4: Host identity protocol deployment,Gurtov,Kim",
            "Q4: Multipath transport for vehicular networks,Feng,Ruiz",
            "Q4: Adaptive video streaming over LTE,Park,Ortega",
        ]
    );
}

#[test]
fn test_demo_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config").join("papergraph.yaml");
    let config = AppConfig::load(path).unwrap();
    assert_eq!(config.queries, demo_queries());
    assert_eq!(config.data_dir, PathBuf::from("demos/files"));
}

#[test]
fn test_run_batch_appends_to_result_log() {
    let dir = TempDir::new().unwrap();
    write_feeds(
        dir.path(),
        "title,authors,conference,year,city,reviewer\nT1,Smith,SRDS,2019,Lyon,Ruiz\n",
        "title,authors,journal,volume,reviewer\n",
        "reviewer,author\n",
    );
    let config = AppConfig {
        data_dir: dir.path().to_path_buf(),
        result_log: dir.path().join("results.log"),
        queries: vec![
            PatternQuery::Q3 { author: "Smith".into() },
            PatternQuery::Q2 { conference: "NoSuchConf".into() },
        ],
        ..AppConfig::default()
    };

    for _ in 0..2 {
        let mut sink = FileSink::open(&config.result_log).unwrap();
        run_batch(&config, &mut sink).unwrap();
        sink.flush().unwrap();
    }

    let log = fs::read_to_string(&config.result_log).unwrap();
    assert_eq!(
        log,
        "Q3: Smith,(T1)\nQ2: NoSuchConf,()\nQ3: Smith,(T1)\nQ2: NoSuchConf,()\n"
    );
}

#[test]
fn test_reingest_after_reload_keeps_nodes_and_multiplies_edges() {
    let dir = TempDir::new().unwrap();
    let feeds = write_feeds(
        dir.path(),
        "title,authors,conference,year,city,reviewer\nP,A;B,SRDS,2019,Lyon,R\n",
        "title,authors,journal,volume,reviewer\nP2,A2,J,1,R2\n",
        "reviewer,author\nR2,A2\n",
    );
    let store_path = dir.path().join("store").join("graph.snapshot");

    let mut first = Session::open(&store_path).unwrap();
    first.populate(&feeds).unwrap();
    let nodes = first.store().node_count();
    let edges = first.store().edge_count();
    first.close().unwrap();

    let mut second = Session::open(&store_path).unwrap();
    assert_eq!(second.store().node_count(), nodes);
    assert_eq!(second.store().edge_count(), edges);

    let report = second.populate(&feeds).unwrap();
    assert_eq!(report.conferences.nodes_created, 0);
    assert_eq!(report.journals.nodes_created, 0);
    assert_eq!(report.friendships.nodes_created, 0);
    assert_eq!(second.store().node_count(), nodes);
    assert_eq!(second.store().edge_count(), edges * 2);

    // Duplicated edges do not duplicate query output
    let q1 = second.query(&PatternQuery::Q1 { title: "P".into() });
    assert_eq!(q1.rows[0].to_string(), "P,(A,B),R");
    let q4 = second.query(&PatternQuery::Q4 { journal: "J".into(), volume: 1 });
    assert_eq!(q4.lines(), vec!["Q4: P2,A2,R2"]);
    second.close().unwrap();

    let stats = SnapshotStore::new(&store_path).open().unwrap().statistics();
    assert_eq!(stats.edges_per_type.get(schema::IS_FRIEND), Some(&2));
}

#[test]
fn test_missing_feed_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut session = Session::in_memory();
    let err = session.populate(&FeedPaths::in_dir(dir.path())).unwrap_err();
    assert!(matches!(err, Error::Feed(FeedError::Io { .. })));
}

#[test]
fn test_corrupt_store_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.snapshot");
    fs::write(&path, b"not a snapshot").unwrap();

    assert!(matches!(Session::open(&path), Err(Error::StoreUnavailable(_))));
}

#[test]
fn test_malformed_rows_do_not_stop_ingestion() {
    let dir = TempDir::new().unwrap();
    let feeds = write_feeds(
        dir.path(),
        "title,authors,conference,year,city,reviewer\nbroken,row\nT1,Smith,SRDS,2019,Lyon,Ruiz\n",
        "title,authors,journal,volume,reviewer\nP2,,J,1,R2\n",
        "reviewer,author\nlonely\nR2,Smith\n",
    );

    let mut session = Session::in_memory();
    let report = session.populate(&feeds).unwrap();
    assert_eq!(report.conferences.malformed, 1);
    assert_eq!(report.conferences.records, 1);
    assert_eq!(report.friendships.malformed, 1);
    assert_eq!(report.friendships.records, 1);

    let q3 = session.query(&PatternQuery::Q3 { author: "Smith".into() });
    assert_eq!(q3.lines(), vec!["Q3: Smith,(T1)"]);
    // A paper with an empty author list still lands in its journal
    let q1 = session.query(&PatternQuery::Q1 { title: "P2".into() });
    assert_eq!(q1.lines(), vec!["Q1: P2,()"]);
}

#[test]
fn test_latin1_bytes_do_not_stop_populate() {
    let dir = TempDir::new().unwrap();
    let feeds = write_feeds(
        dir.path(),
        "title,authors,conference,year,city,reviewer\n",
        "title,authors,journal,volume,reviewer\n",
        "reviewer,author\nR,B\n",
    );
    // Latin-1 encoded surname between two valid records
    fs::write(
        &feeds.journals,
        b"title,authors,journal,volume,reviewer\nP1,A,KSII,8,R\nP2,N\xfanez,KSII,8,R\nP3,B,KSII,8,R\n",
    )
    .unwrap();

    let mut session = Session::in_memory();
    let report = session.populate(&feeds).unwrap();
    assert_eq!(report.journals.records, 3);
    assert_eq!(report.friendships.records, 1);

    let q4 = session.query(&PatternQuery::Q4 { journal: "KSII".into(), volume: 8 });
    assert_eq!(q4.lines(), vec!["Q4: P3,B,R"]);
}
