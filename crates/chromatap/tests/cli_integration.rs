//! Integration tests for the `chromatap` binary.
//!
//! These tests exercise the CLI binary via `assert_cmd`, verifying that the
//! hardware-free subcommands (help, version, config, palette, sample, value)
//! produce expected output.

use std::net::UdpSocket;
use std::path::Path;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("chromatap")
}

/// Helper: write a solid-color PNG.
fn write_png(path: &Path, w: u32, h: u32, rgb: [u8; 3]) {
    image::RgbImage::from_pixel(w, h, image::Rgb(rgb))
        .save(path)
        .unwrap();
}

/// Helper: a config file in a temp dir, so the user's real config is never read.
fn temp_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chromatap"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_config_json_produces_valid_json() {
    let (_dir, path) = temp_config("osc_port = 4000\n");
    let output = cli()
        .args(["--json", "config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(
        json["settings"].is_object(),
        "JSON output should contain 'settings' object"
    );
    assert_eq!(json["settings"]["osc_port"], 4000);
    assert_eq!(json["settings"]["shutter_channel"], 4);
    assert_eq!(json["config_file_exists"], true);
    assert_eq!(json["valid"], true);
}

#[test]
fn cli_config_reports_problems() {
    let (_dir, path) = temp_config("led_count = 0\n");
    cli()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Problems:"))
        .stdout(predicate::str::contains("led_count must be at least 1"));
}

#[test]
fn cli_missing_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(["config", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"));
}

#[test]
fn cli_config_init_writes_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chromatap").join("config.toml");

    cli()
        .args(["config", "--init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(loaded)"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# chromatap configuration"));
    assert!(text.contains("osc_port = 3000"));

    cli()
        .args(["config", "--init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ── --verbose flag ──

#[test]
fn cli_verbose_flag_accepted() {
    let (_dir, path) = temp_config("");
    cli()
        .args(["-v", "palette", "--config"])
        .arg(&path)
        .assert()
        .success();
}

// ── palette ──

#[test]
fn cli_palette_json_lists_default_palette() {
    let (_dir, path) = temp_config("");
    let output = cli()
        .args(["palette", "--json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["color"], "#FF0000");
    assert_eq!(entries[3]["color"], "#008000");
    assert_eq!(json["dark_threshold"], 30);
    assert_eq!(json["dark_color"], "#191919");
}

#[test]
fn cli_palette_custom_entries() {
    let (_dir, path) = temp_config("palette = [\"cyan\", \"#800080\"]\n");
    cli()
        .args(["palette", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 entries"))
        .stdout(predicate::str::contains("#00FFFF"));
}

#[test]
fn cli_palette_invalid_entry_fails() {
    let (_dir, path) = temp_config("palette = [\"chartreuse-ish\"]\n");
    cli()
        .args(["palette", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

// ── sample ──

#[test]
fn cli_sample_resolves_red() {
    let (dir, path) = temp_config("");
    let img = dir.path().join("red.png");
    write_png(&img, 640, 480, [250, 10, 10]);

    let output = cli()
        .args(["--json", "--config"])
        .arg(&path)
        .arg("sample")
        .arg(&img)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["sampled"], "#FA0A0A");
    assert_eq!(json["resolved"], "#FF0000");
    assert_eq!(json["palette_index"], 0);
    assert_eq!(json["dark_override"], false);
    assert_eq!(json["region"], serde_json::json!([100, 100]));
}

#[test]
fn cli_sample_dark_image_uses_override() {
    let (dir, path) = temp_config("");
    let img = dir.path().join("dark.png");
    write_png(&img, 200, 200, [5, 5, 5]);

    cli()
        .args(["sample", "--config"])
        .arg(&path)
        .arg(&img)
        .assert()
        .success()
        .stdout(predicate::str::contains("#191919 (dark override)"));
}

#[test]
fn cli_sample_writes_preview() {
    let (dir, path) = temp_config("");
    let img = dir.path().join("blue.png");
    let preview = dir.path().join("preview.png");
    write_png(&img, 300, 300, [0, 0, 240]);

    cli()
        .args(["sample", "--config"])
        .arg(&path)
        .arg(&img)
        .arg("--preview")
        .arg(&preview)
        .assert()
        .success();

    let canvas = image::open(&preview).unwrap().to_rgb8();
    assert_eq!(canvas.dimensions(), (120, 220));
    assert_eq!(canvas.get_pixel(50, 50).0, [0, 0, 255]);
    assert_eq!(canvas.get_pixel(50, 150).0, [0, 0, 240]);
}

#[test]
fn cli_sample_missing_file_fails() {
    let (dir, path) = temp_config("");
    cli()
        .args(["sample", "--config"])
        .arg(&path)
        .arg(dir.path().join("nope.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ── value ──

#[test]
fn cli_value_sends_osc_packet() {
    let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
    rx.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let port = rx.local_addr().unwrap().port();
    let (_dir, path) = temp_config(&format!("osc_host = \"127.0.0.1\"\nosc_port = {port}\n"));

    cli()
        .args(["value", "orange", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("/value 255 165 0"));

    let mut buf = [0u8; 64];
    let (n, _) = rx.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..8], b"/value\0\0");
    assert_eq!(&buf[8..16], b",iii\0\0\0\0");
    assert_eq!(&buf[16..n], &[0, 0, 0, 255, 0, 0, 0, 165, 0, 0, 0, 0]);
}

#[test]
fn cli_value_rejects_bad_color() {
    let (_dir, path) = temp_config("");
    cli()
        .args(["value", "#GG0000", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ── run ──
// The loop needs a terminal or hardware; only argument handling is tested here.

#[test]
fn cli_run_help_succeeds() {
    cli()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-keys"));
}

#[test]
fn cli_run_rejects_invalid_config() {
    let (_dir, path) = temp_config("button_pins = []\n");
    cli()
        .args(["run", "--no-keys", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("button_pins cannot be empty"));
}
