//! Static log corpora and on-disk fixtures used across harnesses.

use std::path::Path;

/// Syslog-style schema: time, level and message.
pub const SYSLOG_PATTERN: &str = r"^(?P<time>\S+ +\S+ \S+) level=(?P<level>\S+) msg=(?P<msg>.*)$";

/// Layout matching the `time` group of [`SYSLOG_PATTERN`].
pub const SYSLOG_LAYOUT: &str = "Jan _2 15:04:05";

/// Three lines over two minutes; the first two share a bucket.
pub const CORPUS_SYSLOG: &[&str] = &[
    "Jan  5 10:00:01 level=info msg=a",
    "Jan  5 10:00:45 level=info msg=b",
    "Jan  5 10:01:02 level=info msg=c",
];

/// Lines that do not match [`SYSLOG_PATTERN`].
pub const CORPUS_GARBAGE: &[&str] = &[
    "this is not a log line",
    "Jan  5 10:00:01 msg=missing-level",
    "level=info msg=no-time",
];

/// Access-log lines with an explicit year and zone offset.
pub const ACCESS_PATTERN: &str =
    r#"^\S+ - - \[(?P<time>[^\]]+)\] "(?P<method>\S+) (?P<path>\S+) \S+" (?P<status>\d+)"#;
pub const ACCESS_LAYOUT: &str = "02/Jan/2006:15:04:05 -0700";
pub const CORPUS_ACCESS: &[&str] = &[
    r#"10.0.0.1 - - [05/Jan/2024:12:00:10 +0200] "GET /index.html HTTP/1.1" 200"#,
    r#"10.0.0.2 - - [05/Jan/2024:12:00:50 +0200] "POST /api HTTP/1.1" 500"#,
    r#"10.0.0.1 - - [05/Jan/2024:12:05:00 +0200] "GET /favicon.ico HTTP/1.1" 404"#,
];

/// Generate `n` syslog lines, `per_minute` to a bucket, across consecutive
/// minutes starting at `Jan  5 00:00`.
pub fn corpus_high_volume(n: usize, per_minute: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let minute = i / per_minute.max(1);
            format!(
                "Jan  5 {:02}:{:02}:{:02} level=info msg=line-{}",
                minute / 60 % 24,
                minute % 60,
                i % 60,
                i
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SQLite fixtures
// ---------------------------------------------------------------------------

/// Create `hits.db` in `dir` with a small `hits` table and return its path.
///
/// Rows: 2024-01-05 10:00 (3, host a), 2024-01-05 10:01 (4, host b),
/// 2024-02-20 00:00 (9, no host).
pub fn seed_hits_db(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("hits.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"CREATE TABLE hits (ts TEXT NOT NULL, n INTEGER NOT NULL, meta TEXT);
           INSERT INTO hits VALUES ('2024-01-05T10:00:00Z', 3, '{"host":"a"}');
           INSERT INTO hits VALUES ('2024-01-05T10:01:00Z', 4, '{"host":"b"}');
           INSERT INTO hits VALUES ('2024-02-20T00:00:00Z', 9, NULL);"#,
    )
    .unwrap();
    path
}

/// Write a file into the static public directory.
pub fn write_public_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}
