//! Integration tests for the cover fetcher.
//!
//! A canned [`CoverSource`] stands in for the iTunes API so the full
//! parse, search, score, resolve and download flow runs offline. The real
//! [`ItunesClient`] is exercised against a local HTTP server.

use archive_media_tools::core::covers::{
    parse_items, CoverFetcher, CoverFetcherConfig, CoverSource, ItunesClient, ItunesConfig,
    SearchResult,
};
use archive_media_tools::error::CoverError;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

/// Answers searches from a fixed catalogue and "downloads" by writing the URL
struct Catalogue {
    movies: Vec<(String, SearchResult)>,
}

impl Catalogue {
    fn new() -> Self {
        let entry = |term: &str, title: &str, date: &str, art: &str| {
            let result: SearchResult = serde_json::from_value(serde_json::json!({
                "trackName": title,
                "releaseDate": date,
                "artworkUrl100": art,
            }))
            .unwrap();
            (term.to_string(), result)
        };

        Self {
            movies: vec![
                entry(
                    "Halloween",
                    "Halloween II",
                    "1981-10-30T07:00:00Z",
                    "https://is1.example/h2/100x100bb.jpg",
                ),
                entry(
                    "Halloween",
                    "Halloween",
                    "1978-10-25T07:00:00Z",
                    "https://is1.example/h1/100x100bb.jpg",
                ),
                entry(
                    "History of the World: Part I",
                    "History of the World: Part I",
                    "1981-06-12T07:00:00Z",
                    "https://is1.example/hw/100x100bb-85.jpg",
                ),
            ],
        }
    }
}

impl CoverSource for Catalogue {
    fn search(&self, term: &str) -> Result<Vec<SearchResult>, CoverError> {
        Ok(self
            .movies
            .iter()
            .filter(|(key, _)| key == term)
            .map(|(_, result)| result.clone())
            .collect())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64, CoverError> {
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(dest, url).unwrap();
        Ok(url.len() as u64)
    }
}

fn fetcher(temp: &TempDir) -> CoverFetcher<Catalogue> {
    CoverFetcher::new(
        Catalogue::new(),
        CoverFetcherConfig {
            covers_dir: temp.child("covers").path().to_path_buf(),
            ..Default::default()
        },
    )
}

#[test]
fn batch_saves_matches_and_reports_misses() {
    let temp = TempDir::new().unwrap();
    let queries = parse_items(&[
        "Halloween:1978",
        "History of the World, Part I:1981",
        "Nonexistent Picture",
    ]);

    let outcomes = fetcher(&temp).fetch_all(&queries);

    let saved: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok())
        .map(|c| c.filename.as_str())
        .collect();
    assert_eq!(
        saved,
        vec!["halloween-1978.jpg", "history-of-the-world-part-i-1981.jpg"]
    );
    assert!(matches!(outcomes[2], Err(CoverError::NoResults { .. })));

    temp.child("covers/halloween-1978.jpg")
        .assert("https://is1.example/h1/1000x1000bb.jpg");
    temp.child("covers/history-of-the-world-part-i-1981.jpg")
        .assert(predicate::str::ends_with("/1000x1000bb-85.jpg"));
    temp.child("covers/nonexistent-picture.jpg")
        .assert(predicate::path::missing());
}

#[test]
fn covers_dir_is_created_on_demand() {
    let temp = TempDir::new().unwrap();
    temp.child("covers").assert(predicate::path::missing());

    let cover = fetcher(&temp)
        .fetch(&parse_items(&["Halloween"])[0])
        .unwrap();

    // Without a year both results tie and the first one wins
    assert_eq!(cover.filename, "halloween-ii-1981.jpg");
    temp.child("covers").assert(predicate::path::is_dir());
}

/// A canned HTTP response
struct Reply {
    status: u16,
    body: Vec<u8>,
    chunked: bool,
}

impl Reply {
    fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string().into_bytes(),
            chunked: false,
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            chunked: false,
        }
    }
}

/// Serve one response per connection from `handler(base_url, request_target)`.
///
/// Returns the base URL and the request targets seen so far.
fn serve<F>(handler: F) -> (String, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str, &str) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&seen);
    let server_base = base.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let target = read_request_target(&stream);
            log.lock().unwrap().push(target.clone());
            write_reply(&mut stream, &handler(&server_base, &target));
        }
    });

    (base, seen)
}

fn read_request_target(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
            break;
        }
    }

    request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string()
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) {
    let reason = match reply.status {
        200 => "OK",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    write!(stream, "HTTP/1.1 {} {}\r\nConnection: close\r\n", reply.status, reason).unwrap();

    if reply.chunked {
        write!(stream, "Transfer-Encoding: chunked\r\n\r\n").unwrap();
        for chunk in reply.body.chunks(1000) {
            write!(stream, "{:x}\r\n", chunk.len()).unwrap();
            stream.write_all(chunk).unwrap();
            write!(stream, "\r\n").unwrap();
        }
        write!(stream, "0\r\n\r\n").unwrap();
    } else {
        write!(stream, "Content-Length: {}\r\n\r\n", reply.body.len()).unwrap();
        stream.write_all(&reply.body).unwrap();
    }
    stream.flush().unwrap();
}

fn artwork_bytes() -> Vec<u8> {
    (0..5000u32).map(|i| (i % 251) as u8).collect()
}

fn client(base: &str) -> ItunesClient {
    ItunesClient::new(ItunesConfig {
        search_url: format!("{base}/search"),
        ..Default::default()
    })
    .unwrap()
}

fn entries(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn search_sends_api_parameters_and_parses_results() {
    let (base, seen) = serve(|_, _| {
        Reply::json(serde_json::json!({
            "resultCount": 1,
            "results": [{
                "trackName": "Raging Bull",
                "releaseDate": "1980-11-14T08:00:00Z",
                "artworkUrl100": "https://is1.example/rb/100x100bb.jpg"
            }]
        }))
    });

    let results = client(&base).search("Raging Bull").unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].display_title(), "Raging Bull");
    assert_eq!(results[0].release_year(), Some(1980));

    let target = seen.lock().unwrap()[0].clone();
    assert!(target.starts_with("/search?"), "{target}");
    for param in ["term=Raging+Bull", "entity=movie", "media=movie", "limit=10", "country=US"] {
        assert!(target.contains(param), "{param} missing from {target}");
    }
}

#[test]
fn chunked_download_is_written_whole() {
    let (base, _) = serve(|_, _| Reply {
        status: 200,
        body: artwork_bytes(),
        chunked: true,
    });
    let temp = TempDir::new().unwrap();
    let dest = temp.child("covers/raging-bull-1980.jpg");

    let bytes = client(&base)
        .download(&format!("{base}/art/1000x1000bb.jpg"), dest.path())
        .unwrap();

    assert_eq!(bytes, 5000);
    assert_eq!(fs::read(dest.path()).unwrap(), artwork_bytes());
    // Nothing but the finished file is left behind
    assert_eq!(entries(temp.child("covers").path()), vec!["raging-bull-1980.jpg"]);
}

#[test]
fn http_error_leaves_no_file() {
    let (base, _) = serve(|_, _| Reply::status(404));
    let temp = TempDir::new().unwrap();
    let dest = temp.child("covers/missing.jpg");

    let err = client(&base)
        .download(&format!("{base}/art/1000x1000bb.jpg"), dest.path())
        .unwrap_err();

    assert!(matches!(err, CoverError::Http { .. }), "{err}");
    dest.assert(predicate::path::missing());
    assert!(entries(temp.child("covers").path()).is_empty());
}

#[test]
fn failing_searches_only_fail_their_own_query() {
    let (base, seen) = serve(|base, target| {
        if target.starts_with("/art/") {
            Reply {
                status: 200,
                body: artwork_bytes(),
                chunked: true,
            }
        } else if target.contains("term=Raging+Bull&") {
            Reply::json(serde_json::json!({
                "results": [{
                    "trackName": "Raging Bull",
                    "releaseDate": "1980-11-14T08:00:00Z",
                    "artworkUrl100": format!("{base}/art/100x100bb.jpg")
                }]
            }))
        } else {
            Reply::status(500)
        }
    });
    let temp = TempDir::new().unwrap();
    let fetcher = CoverFetcher::new(
        client(&base),
        CoverFetcherConfig {
            covers_dir: temp.child("covers").path().to_path_buf(),
            ..Default::default()
        },
    );

    let outcomes = fetcher.fetch_all(&parse_items(&["Broken Film", "Raging Bull:1980"]));

    assert!(matches!(outcomes[0], Err(CoverError::NoResults { .. })));
    let saved = outcomes[1].as_ref().unwrap();
    assert_eq!(saved.filename, "raging-bull-1980.jpg");
    assert_eq!(saved.bytes, 5000);
    temp.child("covers/raging-bull-1980.jpg")
        .assert(predicate::path::is_file());

    let seen = seen.lock().unwrap();
    let broken: Vec<_> = seen.iter().filter(|t| t.contains("term=Broken+Film")).collect();
    // Every variant was tried before giving up
    assert_eq!(broken.len(), 2);
    assert!(seen.iter().any(|t| t == "/art/1000x1000bb.jpg"));
}
