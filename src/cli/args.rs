use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tfrstate::find::Param;
use tfrstate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find directories where a given terraform_remote_state data source is used"
)]
pub struct Cli {
    /// Log level (e.g. debug, info, warn), overrides RUST_LOG
    #[arg(long, global = true, env = "TFRSTATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find directories where a given terraform_remote_state data source is used
    Find(FindArgs),
    /// Show version
    Version(VersionArgs),
}

#[derive(clap::Args, Debug)]
pub struct FindArgs {
    /// Output format. One of 'json' (default), 'markdown'
    #[arg(long, default_value = "json")]
    pub output_format: OutputFormat,

    /// The file path to the plan file in JSON format
    #[arg(long)]
    pub plan_json: Option<PathBuf>,

    /// The directory where Terraform configuration files are searched
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// The directory of the Terraform root module whose backend is searched
    #[arg(long)]
    pub backend_dir: Option<PathBuf>,

    /// S3 bucket name of terraform_remote_state data sources
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// S3 key of terraform_remote_state data sources
    #[arg(long)]
    pub s3_key: Option<String>,

    /// GCS bucket name of terraform_remote_state data sources
    #[arg(long)]
    pub gcs_bucket: Option<String>,

    /// GCS prefix of terraform_remote_state data sources
    #[arg(long)]
    pub gcs_prefix: Option<String>,

    /// Output name of terraform_remote_state data sources
    #[arg(short = 'o', long = "output")]
    pub outputs: Vec<String>,
}

impl FindArgs {
    pub fn into_param(self, pwd: PathBuf) -> Param {
        Param {
            plan_file: self.plan_json,
            base_dir: self.base_dir,
            backend_dir: self.backend_dir,
            s3_bucket: self.s3_bucket,
            s3_key: self.s3_key,
            gcs_bucket: self.gcs_bucket,
            gcs_prefix: self.gcs_prefix,
            outputs: self.outputs,
            pwd,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Print the version as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn find_args(args: &[&str]) -> FindArgs {
        let cli = Cli::parse_from(args);
        if let Command::Find(args) = cli.command {
            args
        } else {
            panic!("Expected Find command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_find_args_defaults() {
        let args = find_args(&["tfrstate", "find", "--backend-dir", "net"]);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.base_dir, PathBuf::from("."));
        assert_eq!(args.backend_dir, Some(PathBuf::from("net")));
        assert!(args.outputs.is_empty());
        assert!(args.plan_json.is_none());
    }

    #[test]
    fn test_find_args_repeated_outputs() {
        let args = find_args(&[
            "tfrstate",
            "find",
            "--s3-bucket=b1",
            "--s3-key=k1",
            "-o",
            "vpc_id",
            "--output=subnet_ids",
        ]);
        assert_eq!(args.outputs, vec!["vpc_id", "subnet_ids"]);
        assert_eq!(args.s3_bucket, Some("b1".to_string()));
        assert_eq!(args.s3_key, Some("k1".to_string()));
    }

    #[test]
    fn test_find_args_markdown_format() {
        let args = find_args(&["tfrstate", "find", "--output-format", "markdown"]);
        assert_eq!(args.output_format, OutputFormat::Markdown);
    }

    #[test]
    fn test_find_args_unsupported_format() {
        let result = Cli::try_parse_from(["tfrstate", "find", "--output-format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_is_global() {
        let cli = Cli::parse_from(["tfrstate", "find", "--log-level", "debug"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_into_param() {
        let args = find_args(&[
            "tfrstate",
            "find",
            "--gcs-bucket",
            "b1",
            "--gcs-prefix",
            "state",
            "--plan-json",
            "plan.json",
            "--base-dir",
            "infra",
        ]);
        let param = args.into_param(PathBuf::from("/work"));
        assert_eq!(param.gcs_bucket, Some("b1".to_string()));
        assert_eq!(param.gcs_prefix, Some("state".to_string()));
        assert_eq!(param.plan_file, Some(PathBuf::from("plan.json")));
        assert_eq!(param.base_dir, PathBuf::from("infra"));
        assert_eq!(param.pwd, PathBuf::from("/work"));
    }

    #[test]
    fn test_version_json_flag() {
        let cli = Cli::parse_from(["tfrstate", "version", "--json"]);
        match cli.command {
            Command::Version(args) => assert!(args.json),
            other => panic!("Expected Version command, got {:?}", other),
        }
    }
}
