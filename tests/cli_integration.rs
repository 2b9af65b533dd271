//! Integration tests for the keyrotor CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`. Secret
//! material is passed through the same environment variables a deployment
//! would use; every inherited one is cleared first.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use predicates::prelude::*;

const SECRET_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const SECRET_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Helper: a keyrotor Command with a clean secret environment.
fn keyrotor(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("keyrotor").expect("binary should exist");
    cmd.env_remove("JWT_SECRET")
        .env_remove("JWT_SECRET_PREVIOUS")
        .env_remove("ENCRYPTION_KEY")
        .env_remove("ENCRYPTION_KEY_PREVIOUS")
        .env_remove("KEYROTOR_ENVIRONMENT")
        .env_remove("KEYROTOR_LOG")
        .arg("--config-dir")
        .arg(dir.path());
    cmd
}

/// Helper: a keyrotor Command configured with secret A and key 1.
fn configured(dir: &TempDir) -> Command {
    let mut cmd = keyrotor(dir);
    cmd.env("JWT_SECRET", SECRET_A)
        .env("ENCRYPTION_KEY", STANDARD.encode([1u8; 32]));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn help_flag_shows_usage() {
    #[allow(deprecated)]
    Command::cargo_bin("keyrotor")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotating JWT secrets"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("encrypt"))
        .stdout(predicate::str::contains("decrypt"))
        .stdout(predicate::str::contains("re-encrypt"))
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn missing_secrets_is_fatal() {
    let tmp = TempDir::new().unwrap();
    keyrotor(&tmp)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No JWT secrets configured"));
}

#[test]
fn short_secret_is_rejected_with_its_length() {
    let tmp = TempDir::new().unwrap();
    keyrotor(&tmp)
        .env("JWT_SECRET", "short-secret")
        .env("ENCRYPTION_KEY", STANDARD.encode([1u8; 32]))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("12 characters"));
}

#[test]
fn status_lists_counts() {
    let tmp = TempDir::new().unwrap();
    configured(&tmp)
        .env("JWT_SECRET_PREVIOUS", SECRET_B)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("JWT secrets"))
        .stdout(predicate::str::contains("2"))
        .stdout(predicate::str::contains("Key 0 (current)"));
}

#[test]
fn config_file_is_read_from_config_dir() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".keyrotor.toml")
        .write_str(&format!(
            "jwt_secret = \"{SECRET_A}\"\nencryption_key = \"{}\"\ngrace_period_secs = 7200\n",
            STANDARD.encode([3u8; 32])
        ))
        .unwrap();

    keyrotor(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("2h"));
}

#[test]
fn config_dir_can_come_from_the_environment() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".keyrotor.toml")
        .write_str(&format!(
            "jwt_secret = \"{SECRET_A}\"\nencryption_key = \"{}\"\ngrace_period_secs = 300\n",
            STANDARD.encode([3u8; 32])
        ))
        .unwrap();

    #[allow(deprecated)]
    Command::cargo_bin("keyrotor")
        .unwrap()
        .env_remove("JWT_SECRET")
        .env_remove("ENCRYPTION_KEY")
        .env_remove("JWT_SECRET_PREVIOUS")
        .env_remove("ENCRYPTION_KEY_PREVIOUS")
        .env_remove("KEYROTOR_ENVIRONMENT")
        .env("KEYROTOR_CONFIG_DIR", tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("5m"));
}

#[test]
fn previous_secret_without_current_is_fatal() {
    let tmp = TempDir::new().unwrap();
    keyrotor(&tmp)
        .env("JWT_SECRET_PREVIOUS", SECRET_A)
        .env("ENCRYPTION_KEY", STANDARD.encode([1u8; 32]))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET_PREVIOUS is set but JWT_SECRET is not"));
}

#[test]
fn encrypt_then_decrypt_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let payload = stdout_of(configured(&tmp).args(["encrypt", "hello-world"]));
    assert!(payload.starts_with("0:"));

    let plaintext = stdout_of(configured(&tmp).args(["decrypt", payload.as_str()]));
    assert_eq!(plaintext, "hello-world");
}

#[test]
fn decrypt_after_key_rotation_warns_but_succeeds() {
    let tmp = TempDir::new().unwrap();
    let payload = stdout_of(configured(&tmp).args(["encrypt", "iban"]));

    keyrotor(&tmp)
        .env("JWT_SECRET", SECRET_A)
        .env("ENCRYPTION_KEY", STANDARD.encode([2u8; 32]))
        .env("ENCRYPTION_KEY_PREVIOUS", STANDARD.encode([1u8; 32]))
        .args(["decrypt", payload.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("iban"));
}

#[test]
fn sign_then_verify_after_secret_rotation() {
    let tmp = TempDir::new().unwrap();
    let token = stdout_of(configured(&tmp).args([
        "sign",
        "--subject",
        "u-1",
        "--email",
        "u1@example.com",
        "--role",
        "client",
    ]));

    keyrotor(&tmp)
        .env("JWT_SECRET", SECRET_B)
        .env("JWT_SECRET_PREVIOUS", SECRET_A)
        .env("ENCRYPTION_KEY", STANDARD.encode([1u8; 32]))
        .args(["verify", token.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("u1@example.com"));
}

#[test]
fn verify_garbage_reports_token_invalid() {
    let tmp = TempDir::new().unwrap();
    configured(&tmp)
        .args(["verify", "not-a-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOKEN_INVALID"));
}

#[test]
fn re_encrypt_batch_reports_per_record_failures() {
    let tmp = TempDir::new().unwrap();
    let current = stdout_of(configured(&tmp).args(["encrypt", "one"]));
    // Legacy, un-indexed form: the index check alone cannot skip it.
    let old = current.strip_prefix("0:").unwrap().to_string();

    let batch = tmp.child("batch.json");
    batch
        .write_str(&format!(
            r#"[{{"id": 1, "payload": "{old}"}}, {{"id": "two", "payload": "garbage"}}]"#
        ))
        .unwrap();

    let out = stdout_of(
        keyrotor(&tmp)
            .env("JWT_SECRET", SECRET_A)
            .env("ENCRYPTION_KEY", STANDARD.encode([2u8; 32]))
            .env("ENCRYPTION_KEY_PREVIOUS", STANDARD.encode([1u8; 32]))
            .arg("re-encrypt")
            .arg(batch.path()),
    );

    let results: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(results[0]["id"], 1);
    assert_eq!(results[0]["success"], true);
    assert!(results[0]["payload"].as_str().unwrap().starts_with("0:"));
    assert_eq!(results[1]["id"], "two");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].is_string());
}
