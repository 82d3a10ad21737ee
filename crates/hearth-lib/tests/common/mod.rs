#![allow(dead_code)]

use hearth_lib::game::{OsFamily, PlatformDescriptor};
use hearth_lib::utils::hash::sha1_hex;
use hearth_lib::HearthConfig;
use serde_json::{json, Value};
use std::io::{Cursor, Write};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VERSION: &str = "1.20";

/// Build an in-memory zip archive
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    use zip::write::FileOptions;
    for (name, data) in entries {
        zip.start_file::<&str, ()>(name, FileOptions::default())
            .unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn linux() -> PlatformDescriptor {
    PlatformDescriptor::new(OsFamily::Linux, "x86_64")
}

/// A remote file served by the mock server
pub struct Served {
    pub route: String,
    pub body: Vec<u8>,
    pub delay_ms: u64,
    pub hits: Option<u64>,
}

impl Served {
    pub fn new(route: &str, body: &[u8]) -> Self {
        Self {
            route: route.to_string(),
            body: body.to_vec(),
            delay_ms: 0,
            hits: None,
        }
    }

    pub fn delayed(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn expect(mut self, hits: u64) -> Self {
        self.hits = Some(hits);
        self
    }

    pub fn sha1(&self) -> String {
        sha1_hex(&self.body)
    }
}

pub struct Fixture {
    pub server: MockServer,
    pub tmp: TempDir,
    pub config: HearthConfig,
}

impl Fixture {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let tmp = TempDir::new().expect("tmpdir");
        let config = HearthConfig {
            index_url: format!("{}/index.json", server.uri()),
            concurrency: 4,
            ..HearthConfig::with_root(tmp.path().join("root"))
        };
        Self {
            server,
            tmp,
            config,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.server.uri(), route)
    }

    pub async fn serve(&self, file: &Served) {
        let mut mock = Mock::given(method("GET"))
            .and(path(file.route.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(file.body.clone())
                    .set_delay(Duration::from_millis(file.delay_ms)),
            );
        if let Some(hits) = file.hits {
            mock = mock.expect(hits);
        }
        mock.mount(&self.server).await;
    }

    pub async fn serve_json(&self, route: &str, value: &Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(value.to_string()))
            .mount(&self.server)
            .await;
    }

    /// Index listing one release that points at `/v/1.20.json`
    pub async fn serve_index(&self) {
        let index = json!({
            "latest": {"release": VERSION, "snapshot": VERSION},
            "versions": [
                {"id": VERSION, "type": "release", "url": self.url("/v/1.20.json")}
            ]
        });
        self.serve_json("/index.json", &index).await;
    }

    pub fn library(&self, name: &str, path: &str, file: &Served) -> Value {
        json!({
            "name": name,
            "downloads": {"artifact": {
                "path": path,
                "url": self.url(&file.route),
                "sha1": file.sha1()
            }}
        })
    }

    pub fn descriptor(&self, client: &Served, libraries: Vec<Value>) -> Value {
        json!({
            "id": VERSION,
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assetIndex": {"id": "5"},
            "javaVersion": {"majorVersion": 17},
            "downloads": {"client": {"url": self.url(&client.route), "sha1": client.sha1()}},
            "arguments": {
                "jvm": ["-Djava.library.path=${natives_directory}", "-cp", "${classpath}"],
                "game": ["--username", "${auth_player_name}", "--version", "${version_name}",
                         "--gameDir", "${game_directory}", "--uuid", "${auth_uuid}"]
            },
            "libraries": libraries
        })
    }
}
