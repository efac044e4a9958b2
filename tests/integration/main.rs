//! Integration tests for cpan-index

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary isolated from the user's config and environment
    pub(crate) fn cpan_index(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("cpan-index");
        cmd.env("HOME", home)
            .env_remove("CPAN_INDEX_URL")
            .env_remove("CPAN_INDEX_CACHE_DIR")
            .env_remove("CPAN_INDEX_TIMEOUT")
            .arg("--config")
            .arg(home.join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("CPAN package index"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cpan-index"));
    }

    #[test]
    fn path_with_cache_dir() {
        let home = TempDir::new().unwrap();
        let expected = home.path().join("cache").join("02packages.details.txt.gz");
        cpan_index(home.path())
            .args(["path", "--cache-dir"])
            .arg(home.path().join("cache"))
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.display().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn path_defaults_under_perl_cpm() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .arg("path")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                ".perl-cpm/sources/https%cpan.metacpan.org/02packages.details.txt.gz",
            ));
    }

    #[test]
    fn path_does_not_create_directories() {
        let home = TempDir::new().unwrap();
        let cache = home.path().join("cache");
        cpan_index(home.path())
            .arg("path")
            .arg("--cache-dir")
            .arg(&cache)
            .assert()
            .success();
        assert!(!cache.exists());
    }

    #[test]
    fn url_without_file_name_fails() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .args(["path", "--url", "https://cpan.metacpan.org/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid URL"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .args(["config", "show", "--timeout", "9"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[source]"))
            .stdout(predicate::str::contains("timeout_secs = 9"));
    }

    #[test]
    fn config_init_then_invalid_file() {
        let home = TempDir::new().unwrap();
        cpan_index(home.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(home.path().join("config.toml").exists());

        std::fs::write(home.path().join("config.toml"), "[network\n").unwrap();
        cpan_index(home.path())
            .arg("path")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));

        cpan_index(home.path())
            .args(["config", "init", "--force"])
            .assert()
            .success();
        cpan_index(home.path()).arg("path").assert().success();
    }
}

mod refresh_tests {
    use super::cli_tests::cpan_index;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use predicates::prelude::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = "/modules/02packages.details.txt.gz";
    const LAST_MODIFIED: &str = "Thu, 14 Mar 2024 09:26:53 GMT";
    const CONTENT: &str =
        "File:         02packages.details.txt\n\nMoose  2.2207  E/ET/ETHER/Moose-2.2207.tar.gz\n";
    const STAMP_LINE: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\S* \(\d+h\d+m\d+s ago\)\n$";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn index_response() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("Last-Modified", LAST_MODIFIED)
            .set_body_bytes(gzip(CONTENT.as_bytes()))
    }

    /// Run the binary against `server` off the async runtime
    async fn run(
        home: PathBuf,
        server: &MockServer,
        args: &'static [&'static str],
    ) -> assert_cmd::assert::Assert {
        let url = format!("{}{}", server.uri(), INDEX);
        tokio::task::spawn_blocking(move || {
            cpan_index(&home)
                .args(args)
                .arg("--url")
                .arg(url)
                .arg("--cache-dir")
                .arg(home.join("cache"))
                .assert()
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cat_prints_decompressed_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .respond_with(index_response())
            .expect(1)
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();

        run(home.path().to_path_buf(), &server, &[])
            .await
            .success()
            .stdout(CONTENT);

        assert!(home
            .path()
            .join("cache")
            .join("02packages.details.txt.gz")
            .exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_run_uses_conditional_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .and(header_exists("If-Modified-Since"))
            .respond_with(ResponseTemplate::new(304))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .respond_with(index_response())
            .expect(1)
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();

        run(home.path().to_path_buf(), &server, &["cat"])
            .await
            .success()
            .stdout(CONTENT);
        run(home.path().to_path_buf(), &server, &["cat"])
            .await
            .success()
            .stdout(CONTENT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mtime_prints_age() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(INDEX))
            .respond_with(index_response())
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();

        let variants: [&'static [&'static str]; 3] = [&["mtime"], &["-t"], &["time"]];
        for args in variants {
            run(home.path().to_path_buf(), &server, args)
                .await
                .success()
                .stdout(predicate::str::is_match(STAMP_LINE).unwrap());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unexpected_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();

        run(home.path().to_path_buf(), &server, &[])
            .await
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("404 Not Found"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_last_modified_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(CONTENT.as_bytes())))
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();

        run(home.path().to_path_buf(), &server, &[])
            .await
            .failure()
            .stderr(predicate::str::contains("Last-Modified"));
        assert!(!home
            .path()
            .join("cache")
            .join("02packages.details.txt.gz")
            .exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn corrupt_cache_is_reported_with_hint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server)
            .await;
        let home = TempDir::new().unwrap();
        let cache = home.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("02packages.details.txt.gz"), CONTENT).unwrap();

        run(home.path().to_path_buf(), &server, &[])
            .await
            .failure()
            .stderr(predicate::str::contains("corrupt"))
            .stderr(predicate::str::contains("Hint:"));
    }
}
