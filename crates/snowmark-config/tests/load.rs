#![allow(clippy::unwrap_used, reason = "Fine in tests")]
//! Loading configuration files from disk.
use std::fs;

use snowmark_config::Config;
use snowmark_render::AllowListPolicy;
use tempfile::TempDir;

#[test]
fn test_load_toml_file() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("snowmark.toml");
  fs::write(
    &path,
    r#"
jobs = 2

[render]
emoji = false
heading_id_prefix = "doc-"

[policy]
tag_names = ["p", "h1"]
"#,
  )
  .unwrap();

  let config = Config::load(&[path], &[]).unwrap();
  assert_eq!(config.jobs, Some(2));
  assert!(!config.render.emoji);
  assert!(config.render.math);
  assert_eq!(config.render.heading_id_prefix, "doc-");

  let policy = config.policy.unwrap();
  assert_eq!(policy.tag_names.len(), 2);
  // Tables not given keep their built-in values.
  assert_eq!(policy.strip, AllowListPolicy::default().strip);
}

#[test]
fn test_load_json_file() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("config.json");
  fs::write(&path, r#"{"render": {"math": false}, "jobs": 3}"#).unwrap();

  let config = Config::from_file(&path).unwrap();
  assert!(!config.render.math);
  assert_eq!(config.jobs, Some(3));
  assert!(config.policy.is_none());
}

#[test]
fn test_later_files_win() {
  let dir = TempDir::new().unwrap();
  let first = dir.path().join("a.toml");
  let second = dir.path().join("b.toml");
  fs::write(&first, "jobs = 2\n[render]\nemoji = false\n").unwrap();
  fs::write(&second, "[render]\nmath = false\n").unwrap();

  let config = Config::load(&[first, second], &[]).unwrap();
  assert_eq!(config.jobs, Some(2));
  assert!(!config.render.math);
  assert!(!config.render.emoji);
}

#[test]
fn test_later_file_without_render_table_keeps_render_settings() {
  let dir = TempDir::new().unwrap();
  let first = dir.path().join("a.toml");
  let second = dir.path().join("b.toml");
  fs::write(
    &first,
    "[render]\nemoji = false\nheading_id_prefix = \"doc-\"\n",
  )
  .unwrap();
  fs::write(&second, "jobs = 2\n").unwrap();

  let config = Config::load(&[first, second], &[]).unwrap();
  assert!(!config.render.emoji);
  assert_eq!(config.render.heading_id_prefix, "doc-");
  assert_eq!(config.jobs, Some(2));
}

#[test]
fn test_overrides_apply_after_files() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("snowmark.toml");
  fs::write(&path, "[render]\nheading_id_prefix = \"a-\"\n").unwrap();

  let config = Config::load(&[path], &[
    "render.heading_id_prefix=b-".to_string(),
  ])
  .unwrap();
  assert_eq!(config.render.heading_id_prefix, "b-");
}

#[test]
fn test_invalid_files_are_rejected() {
  let dir = TempDir::new().unwrap();

  let unknown_policy_key = dir.path().join("bad.toml");
  fs::write(&unknown_policy_key, "[policy]\ntags = [\"p\"]\n").unwrap();
  let err = Config::load(&[unknown_policy_key], &[]).unwrap_err();
  assert!(err.to_string().contains("Failed to parse TOML config"));

  let no_extension = dir.path().join("snowmark");
  fs::write(&no_extension, "").unwrap();
  let err = Config::from_file(&no_extension).unwrap_err();
  assert!(err.to_string().contains("no extension"));

  let yaml = dir.path().join("snowmark.yaml");
  fs::write(&yaml, "").unwrap();
  let err = Config::from_file(&yaml).unwrap_err();
  assert!(err.to_string().contains("Unsupported config file format"));

  let unknown_render_key = dir.path().join("typo.toml");
  fs::write(&unknown_render_key, "[render]\nemojis = false\n").unwrap();
  assert!(Config::load(&[unknown_render_key], &[]).is_err());

  let zero_depth = dir.path().join("zero.toml");
  fs::write(&zero_depth, "[render]\nmax_nesting_depth = 0\n").unwrap();
  assert!(Config::load(&[zero_depth], &[]).is_err());
}

#[test]
fn test_generate_default_config() {
  let dir = TempDir::new().unwrap();

  for format in ["toml", "json"] {
    let path = dir.path().join(format!("snowmark.{format}"));
    Config::generate_default_config(format, &path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), Config::default());
  }

  let err = Config::generate_default_config("ini", &dir.path().join("x.ini"))
    .unwrap_err();
  assert!(err.to_string().contains("Template error"));
}
