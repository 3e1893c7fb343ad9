use std::{
  fs,
  io::{self, Write},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info, warn};
use snowmark::{
  cli::{Cli, Commands},
  render,
};
use snowmark_config::Config;
use snowmark_render::syntax::create_default_manager;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling. Logs go
  // to stderr, stdout is reserved for output.
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    // Check if file already exists and that we're not forcing overwrite
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!("Failed to generate configuration file: {}", output.display())
    })?;

    info!(
      "Configuration file created successfully. Edit it to customize \
       rendering."
    );
    return Ok(());
  }

  let config = Config::load(&cli.config_files, &cli.config_overrides)?;
  let mut stdout = io::stdout().lock();

  match cli.command {
    Commands::Render {
      inputs,
      output_dir,
      pretty,
      jobs,
    } => {
      let renderer = config.renderer();

      if render::is_stdin(&inputs) {
        let response = render::render_stdin(&renderer);
        writeln!(stdout, "{}", render::to_json(&response, pretty)?)?;
        if !response.success {
          bail!(
            "Failed to read markdown from stdin: {}",
            response.error.unwrap_or_default()
          );
        }
        return Ok(());
      }

      let files = render::collect_inputs(&inputs)?;
      if files.is_empty() {
        warn!("No markdown files found");
        return Ok(());
      }

      let thread_count = jobs.or(config.jobs).unwrap_or_else(num_cpus::get);
      rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build_global()?;

      let responses = render::render_files(
        &renderer,
        &files,
        output_dir.as_deref(),
        pretty,
      )?;

      if let Some(output_dir) = &output_dir {
        info!(
          "Wrote {} files to {}",
          responses.len(),
          output_dir.display()
        );
      } else {
        for response in &responses {
          writeln!(stdout, "{}", render::to_json(response, pretty)?)?;
        }
      }

      let failed = responses.iter().filter(|r| !r.success).count();
      if failed > 0 {
        bail!("{failed} of {} inputs could not be read", responses.len());
      }
    },

    Commands::Policy { format } => {
      let policy = config.effective_policy();
      let text = if format == "json" {
        serde_json::to_string_pretty(&policy)?
      } else {
        toml::to_string(&policy)?
      };
      writeln!(stdout, "{}", text.trim_end())?;
    },

    Commands::Stylesheet { theme } => {
      let manager = create_default_manager()?;
      let theme = theme.or_else(|| config.render.theme.clone());
      let css = manager.stylesheet(theme.as_deref())?;
      write!(stdout, "{css}")?;
    },

    Commands::Init { .. } => {},
  }

  Ok(())
}
