//! Worker process for `pg_embedded_setup_unpriv` when the Diesel suites run
//! as root.
//!
//! Usage: `pg_worker <setup|start|stop> <payload.json>`. The payload is a
//! serialised [`pg_embedded_setup_unpriv::worker::WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let (step, payload_path) = parse_args(env::args_os().skip(1))?;
    let payload = read_payload(Path::new(&payload_path))?;
    run_step(step, payload)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<(Step, OsString)> {
    let raw_step = args.next().ok_or_else(|| eyre!("missing step argument"))?;
    let step = match raw_step.to_string_lossy().as_ref() {
        "setup" => Step::Setup,
        "start" => Step::Start,
        "stop" => Step::Stop,
        other => bail!("unknown pg_worker step '{other}' (expected setup, start or stop)"),
    };
    let payload_path = args
        .next()
        .ok_or_else(|| eyre!("missing payload path argument"))?;
    if let Some(extra) = args.next() {
        bail!("unexpected argument: {}", extra.to_string_lossy());
    }
    Ok((step, payload_path))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let bytes = fs::read(path).with_context(|| format!("reading payload {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing payload {}", path.display()))
}

fn run_step(step: Step, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("rebuilding postgres settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: the worker is single-threaded until the runtime below starts.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building worker runtime")?;
    let mut cluster = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match step {
                Step::Setup => cluster.setup().await,
                Step::Start => cluster.start().await,
                Step::Stop => cluster.stop().await,
            }
        })
        .with_context(|| format!("postgres {} failed", step.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(raw: &[&str]) -> impl Iterator<Item = OsString> {
        raw.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[rstest]
    #[case("setup", Step::Setup)]
    #[case("start", Step::Start)]
    #[case("stop", Step::Stop)]
    fn parses_known_steps(#[case] raw: &str, #[case] expected: Step) {
        let (step, path) = parse_args(args(&[raw, "/tmp/payload.json"])).expect("valid args");
        assert_eq!(step, expected);
        assert_eq!(path, OsString::from("/tmp/payload.json"));
    }

    #[rstest]
    #[case(&[], "missing step")]
    #[case(&["restart", "/tmp/p.json"], "unknown pg_worker step")]
    #[case(&["start"], "missing payload path")]
    #[case(&["start", "/tmp/p.json", "extra"], "unexpected argument")]
    fn rejects_malformed_arguments(#[case] raw: &[&str], #[case] message: &str) {
        let err = parse_args(args(raw)).expect_err("malformed args");
        assert!(err.to_string().contains(message), "{err}");
    }
}
