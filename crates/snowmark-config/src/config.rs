use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};
use snowmark_render::{AllowListPolicy, MarkdownRenderer, RenderOptions};

use crate::{
  error::ConfigError,
  render::{RenderConfig, RenderLayer, parse_usize},
};

/// Configuration for snowmark.
///
/// [`Config`] holds the renderer settings, an optional custom sanitizer
/// allow-list and the degree of parallelism for batch rendering. Fields are
/// typically loaded from a TOML or JSON config file, but can also be set via
/// `--config KEY=VALUE` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Renderer settings.
  pub render: RenderConfig,

  /// Sanitizer allow-list. Tables left out fall back to the built-in policy;
  /// with no `[policy]` at all the built-in policy is used as is.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub policy: Option<AllowListPolicy>,

  /// Number of threads to use for parallel rendering.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jobs: Option<usize>,
}

/// The settings one config file actually spells out.
///
/// Everything a file leaves out is `None` here, so that merging several files
/// only overrides what each of them sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
  pub render: RenderLayer,
  pub policy: Option<AllowListPolicy>,
  pub jobs:   Option<usize>,
}

impl ConfigLayer {
  /// Read one config file (TOML or JSON, by extension).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  #[allow(
    clippy::option_if_let_else,
    reason = "Clearer with explicit match on extension"
  )]
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse JSON config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          "toml" => {
            toml::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse TOML config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// Settings the file leaves out keep their defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    config.merge(ConfigLayer::from_file(path)?);
    Ok(config)
  }

  /// Load configuration from files and overrides, merging them.
  ///
  /// Explicit config files are merged in order. Without any, a config file
  /// in a standard location is used if one exists, otherwise the defaults.
  /// `KEY=VALUE` overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is invalid, or
  /// the resulting configuration does not validate.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    if config_files.is_empty() {
      if let Some(discovered_config) = Self::find_config_file() {
        log::info!(
          "Using discovered config file: {}",
          discovered_config.display()
        );
        let layer = ConfigLayer::from_file(&discovered_config).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load discovered config from {}: {}",
            discovered_config.display(),
            e
          ))
        })?;
        config.merge(layer);
      }
    }

    for config_path in config_files {
      let layer = ConfigLayer::from_file(config_path).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          config_path.display(),
          e
        ))
      })?;
      config.merge(layer);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Keys are `jobs` or `render.<field>`. The policy can only be set from a
  /// file.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// use snowmark_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "render.emoji=false".to_string(),
  ///     "render.heading_id_prefix=doc-".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert!(!config.render.emoji);
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    if key == "jobs" {
      self.jobs = if value.is_empty() {
        None
      } else {
        Some(parse_usize(key, value)?)
      };
      return Ok(());
    }

    if let Some(render_key) = key.strip_prefix("render.") {
      return self.render.apply_override(render_key, value);
    }

    if key == "policy" || key.starts_with("policy.") {
      return Err(ConfigError::Config(format!(
        "Cannot override '{key}' from the command line. Set the [policy] \
         table in a config file instead."
      )));
    }

    Err(ConfigError::Config(format!(
      "Unknown configuration key: '{key}'. See documentation for supported \
       keys."
    )))
  }

  /// Merge a config file layer into this config, with the layer's values
  /// taking precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: the layer's [`Some`] value replaces this
  ///   config's value
  /// - The `render` table: merged field by field, keys the layer leaves out
  ///   keep their current value
  pub fn merge(&mut self, other: ConfigLayer) {
    self.render.merge(other.render);
    if other.policy.is_some() {
      self.policy = other.policy;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
  }

  /// Check the configuration for values the renderer cannot work with.
  ///
  /// # Errors
  ///
  /// Returns an error describing the first invalid value.
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.render.validate()?;
    if self.jobs == Some(0) {
      return Err(ConfigError::Config("jobs must be at least 1".to_string()));
    }
    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        if let Some(found) = first_existing(&current_dir, &[
          "snowmark.toml",
          "snowmark.json",
          ".snowmark.toml",
          ".snowmark.json",
        ]) {
          return Some(found);
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("snowmark");
          if let Some(found) =
            first_existing(&xdg_config_dir, &["config.toml", "config.json"])
          {
            return Some(found);
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("snowmark");
          return first_existing(&home_config_dir, &[
            "config.toml",
            "config.json",
          ]);
        }

        None
      })
      .clone()
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Renderer options described by this configuration.
  #[must_use]
  pub fn render_options(&self) -> RenderOptions {
    self.render.to_render_options()
  }

  /// The allow-list the sanitizer should use.
  #[must_use]
  pub fn effective_policy(&self) -> AllowListPolicy {
    self.policy.clone().unwrap_or_default().normalized()
  }

  /// Build a renderer from this configuration.
  #[must_use]
  pub fn renderer(&self) -> MarkdownRenderer {
    MarkdownRenderer::new(self.render_options())
      .with_policy(self.effective_policy())
  }
}

fn first_existing(dir: &Path, filenames: &[&str]) -> Option<PathBuf> {
  filenames
    .iter()
    .map(|filename| dir.join(filename))
    .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_config_merge_option_fields() {
    let mut base = Config::default();
    base.jobs = Some(4);
    base.policy = None;

    base.merge(ConfigLayer {
      policy: Some(AllowListPolicy::text_only()),
      ..ConfigLayer::default()
    });

    assert_eq!(base.jobs, Some(4));
    assert_eq!(base.policy, Some(AllowListPolicy::text_only()));
  }

  #[test]
  fn test_config_merge_render_fields() {
    let mut base = Config::default();
    base.render.emoji = false;
    base.render.heading_id_prefix = "doc-".to_string();

    base.merge(ConfigLayer {
      render: RenderLayer {
        math: Some(false),
        ..RenderLayer::default()
      },
      ..ConfigLayer::default()
    });

    assert!(!base.render.emoji);
    assert!(!base.render.math);
    assert_eq!(base.render.heading_id_prefix, "doc-");
  }

  #[test]
  fn test_config_merge_without_render_table() {
    let mut base = Config::default();
    base.render.emoji = false;

    let layer: ConfigLayer = toml::from_str("jobs = 2").unwrap();
    base.merge(layer);

    assert!(!base.render.emoji);
    assert_eq!(base.jobs, Some(2));
  }

  #[test]
  fn test_layer_rejects_unknown_keys() {
    assert!(toml::from_str::<ConfigLayer>("[render]\nemojis = true").is_err());
    assert!(toml::from_str::<ConfigLayer>("title = \"x\"").is_err());
  }

  #[test]
  fn test_apply_overrides_boolean() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "render.gfm=no".to_string(),
        "render.highlight_code=0".to_string(),
      ])
      .unwrap();

    assert!(!config.render.gfm);
    assert!(!config.render.highlight_code);
  }

  #[test]
  fn test_apply_overrides_string() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "render.fallback_message = Could not render this page".to_string(),
      ])
      .unwrap();

    assert_eq!(config.render.fallback_message, "Could not render this page");
  }

  #[test]
  fn test_apply_overrides_numeric() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "jobs=8".to_string(),
        "render.max_nesting_depth=32".to_string(),
      ])
      .unwrap();

    assert_eq!(config.jobs, Some(8));
    assert_eq!(config.render.max_nesting_depth, 32);

    config.apply_overrides(&["jobs=".to_string()]).unwrap();
    assert_eq!(config.jobs, None);
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&["render.gfm".to_string()]);

    assert!(result.is_err());
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Invalid config override format")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    let err = config
      .apply_overrides(&["render.nonexistent=value".to_string()])
      .unwrap_err()
      .to_string();
    assert!(err.contains("Unknown configuration key: 'render.nonexistent'"));

    let err = config
      .apply_overrides(&["title=value".to_string()])
      .unwrap_err()
      .to_string();
    assert!(err.contains("Unknown configuration key: 'title'"));
  }

  #[test]
  fn test_apply_overrides_policy_is_rejected() {
    let mut config = Config::default();
    let err = config
      .apply_overrides(&["policy.strip=script".to_string()])
      .unwrap_err()
      .to_string();
    assert!(err.contains("Cannot override 'policy.strip'"));
  }

  #[test]
  fn test_apply_overrides_invalid_numeric() {
    let mut config = Config::default();

    let result = config.apply_overrides(&["jobs=not_a_number".to_string()]);

    assert!(result.is_err());
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected a positive integer")
    );
  }

  #[test]
  fn test_validate_rejects_zero_jobs() {
    let mut config = Config::default();
    config.jobs = Some(0);
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_effective_policy() {
    let mut config = Config::default();
    assert_eq!(config.effective_policy(), AllowListPolicy::default());

    let mut policy = AllowListPolicy::text_only();
    policy.tag_names.insert("P".to_string());
    config.policy = Some(policy);
    assert!(config.effective_policy().tag_names.contains("p"));
  }

  #[test]
  fn test_renderer_uses_config() {
    let mut config = Config::default();
    config.render.highlight_code = false;
    config.render.heading_id_prefix = "sec-".to_string();
    config.policy = Some(AllowListPolicy::text_only());

    let result = config.renderer().render("# Hi");
    assert_eq!(result.html_content, "Hi");
    assert!(result.toc_items.is_empty());

    config.policy = None;
    let result = config.renderer().render("# Hi");
    assert_eq!(result.html_content, "<h1 id=\"sec-hi\">Hi</h1>");
  }
}
