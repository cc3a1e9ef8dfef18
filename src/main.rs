use anyhow::Result;
use clap::Parser;

use tagger::cli::{run_release_workflow, ReleaseOutcome, ReleaseWorkflowArgs};
use tagger::error::TaggerError;
use tagger::{config, logging, ui};

#[derive(clap::Parser)]
#[command(
    name = "tagger",
    version,
    about = "Cut a release: changelog, version bump, tag, GitHub release and packaged app"
)]
struct Args {
    #[arg(help = "Name of the new tag, e.g. 2.1.0.0")]
    tag: String,

    #[arg(long, help = "Should the release be created as a prerelease")]
    prerelease: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(short, long, help = "Show debug diagnostics on stderr")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let workflow_args = ReleaseWorkflowArgs {
        tag: args.tag,
        prerelease: args.prerelease,
        force: args.force,
    };

    match run_release_workflow(workflow_args, config) {
        Ok(ReleaseOutcome::Completed(summary)) => {
            ui::display_release_summary(
                &summary.tag,
                summary.release_id,
                &summary.archive.display().to_string(),
            );
            if !summary.warnings.is_empty() {
                ui::display_status(&format!(
                    "{} warning(s) were reported above",
                    summary.warnings.len()
                ));
            }
            Ok(())
        }
        Ok(ReleaseOutcome::Aborted { stage }) => {
            println!("Operation cancelled by user at stage '{}'.", stage);
            Ok(())
        }
        Err(e) => {
            match e.downcast_ref::<TaggerError>() {
                Some(err) => {
                    ui::display_failure(err);
                    if e.chain().count() > 1 {
                        ui::display_status(&format!("{:#}", e));
                    }
                }
                None => ui::display_error(&format!("{:#}", e)),
            }
            std::process::exit(1);
        }
    }
}
