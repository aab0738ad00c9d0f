use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::info;

use halo_corrector::config::{
    load_job, load_jobs, CorrectorSection, GuessSection, IntegratorSection, Job, JobFile,
    OutputConfig, SystemSection, DEFAULT_SAMPLES,
};
use halo_corrector::correction::batch::correct_all;
use halo_corrector::io::csv::write_trajectory_file;
use halo_corrector::io::json::{write_summary_file, CorrectionSummary};
use halo_corrector::system::{jacobi_constant, lagrange_points, monodromy_with, stability_index};
use halo_corrector::{
    CorrectionMode, CorrectionResult, Corrector, Cr3bpSystem, IterationState, SynodicState,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Single-shooting corrector for xz-plane symmetric CR3BP orbits"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one TOML job file
    Run {
        job: PathBuf,
        /// Also compute the monodromy matrix and stability index
        #[arg(long, default_value_t = false)]
        stability: bool,
    },
    /// Correct a guess given on the command line
    Correct(CorrectArgs),
    /// Run every job file in a directory in parallel
    Batch {
        dir: PathBuf,
        /// Write all summaries to one JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Print libration points and their Jacobi constants
    Lagrange {
        #[arg(long, default_value = "earth-moon")]
        system: String,
    },
}

#[derive(Args)]
struct CorrectArgs {
    /// System name such as earth-moon or sun-earth
    #[arg(long, conflicts_with = "mu")]
    system: Option<String>,

    /// Mass ratio, instead of a named system
    #[arg(long)]
    mu: Option<f64>,

    /// Initial state x,y,z,vx,vy,vz (nondimensional)
    #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
    state: Vec<f64>,

    /// Full-period guess (nondimensional)
    #[arg(long)]
    period: f64,

    /// fix-period or fix-z
    #[arg(long, default_value = "fix-period")]
    mode: CorrectionMode,

    #[arg(long, default_value_t = 1e-11)]
    tolerance: f64,

    #[arg(long, default_value_t = 10)]
    max_iterations: usize,

    /// Log every iteration
    #[arg(long, default_value_t = false)]
    verbose: bool,

    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long)]
    json: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    #[arg(long, default_value_t = false)]
    stability: bool,
}

impl CorrectArgs {
    /// Build a job file from the flags and run it through the same
    /// validation as TOML jobs.
    fn into_job(self) -> anyhow::Result<Job> {
        let state: [f64; 6] = self
            .state
            .as_slice()
            .try_into()
            .context("--state needs exactly six components")?;

        let file = JobFile {
            name: None,
            system: SystemSection {
                name: self.system,
                mu: self.mu,
            },
            guess: GuessSection {
                state,
                period: self.period,
            },
            corrector: CorrectorSection {
                mode: Some(self.mode.to_string()),
                tolerance: Some(self.tolerance),
                max_iterations: Some(self.max_iterations),
                verbose: Some(self.verbose),
            },
            integrator: IntegratorSection::default(),
            output: OutputConfig {
                csv: self.csv,
                json: self.json,
                samples: self.samples,
            },
        };
        Ok(file.resolve()?)
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { job, stability } => {
            let job = load_job(&job).with_context(|| format!("loading {}", job.display()))?;
            run_job(&job, stability)
        }
        Command::Correct(args) => {
            let stability = args.stability;
            run_job(&args.into_job()?, stability)
        }
        Command::Batch { dir, json } => run_batch(&dir, json),
        Command::Lagrange { system } => {
            print_lagrange(&Cr3bpSystem::lookup(&system)?);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Single job
// ---------------------------------------------------------------------------

fn run_job(job: &Job, with_stability: bool) -> anyhow::Result<()> {
    let corrector = Corrector::with_tolerances(job.tolerances);
    let mut history: Vec<IterationState> = Vec::new();
    let result = corrector.correct_with(
        job.system.mu,
        &job.state,
        job.period,
        &job.corrector,
        &mut |r: &IterationState| history.push(*r),
    )?;

    let nu = if with_stability && result.converged {
        let m = monodromy_with(corrector.propagator(), job.system.mu, &result.state, result.period)?;
        Some(stability_index(&m))
    } else {
        None
    };

    print_report(job, &result, &history, nu);

    if let Some(path) = &job.output.csv {
        let traj = corrector.propagator().sample(
            job.system.mu,
            &result.state,
            result.period,
            job.output.samples,
        )?;
        write_trajectory_file(path, &traj)?;
        info!("wrote {} samples to {}", traj.len(), path.display());
    }
    if let Some(path) = &job.output.json {
        let mut summary = CorrectionSummary::new(
            &job.name,
            &job.system,
            job.corrector.mode,
            &job.state,
            job.period,
            &result,
        );
        if let Some(nu) = nu {
            summary = summary.with_stability_index(nu);
        }
        write_summary_file(path, &summary)?;
        info!("wrote summary to {}", path.display());
    }
    Ok(())
}

fn print_report(job: &Job, result: &CorrectionResult, history: &[IterationState], nu: Option<f64>) {
    let s = &result.state;

    println!();
    println!("====================================================================");
    println!("  DIFFERENTIAL CORRECTION: {}", job.name);
    println!("====================================================================");
    println!();
    println!("  System:        {}", job.system);
    println!("  Mode:          {}", job.corrector.mode);
    println!(
        "  Tolerance:     {:>8.1e}       Max iterations: {}",
        job.corrector.tolerance, job.corrector.max_iterations
    );
    println!();

    println!("  Iterations");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  {:>4}  {:>12}  {:>18}  {:>18}", "#", "residual", "x0", "T");
    for r in history {
        println!(
            "  {:>4}  {:>12.3e}  {:>18.12}  {:>18.12}",
            r.iteration,
            r.residual_norm,
            r.state.pos.x,
            2.0 * r.half_period
        );
    }
    println!();

    println!("  Result");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Converged:     {:>8}       Iterations:    {}",
        if result.converged { "yes" } else { "NO" },
        result.iterations
    );
    println!("  x0  = {:>20.15}   vx0 = {:>20.15}", s.pos.x, s.vel.x);
    println!("  y0  = {:>20.15}   vy0 = {:>20.15}", s.pos.y, s.vel.y);
    println!("  z0  = {:>20.15}   vz0 = {:>20.15}", s.pos.z, s.vel.z);
    println!("  Period:        {:.15}", result.period);
    if job.system.has_physical_scales() {
        println!(
            "                 {:.4} days",
            job.system.period_to_days(result.period)
        );
    }
    println!("  Jacobi:        {:.15}", jacobi_constant(job.system.mu, s));
    if let Some(nu) = nu {
        println!("  Stability:     {:.6}", nu);
    }
    println!("====================================================================");
    println!();
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

fn run_batch(dir: &std::path::Path, json: Option<PathBuf>) -> anyhow::Result<()> {
    let jobs = load_jobs(dir).with_context(|| format!("loading jobs from {}", dir.display()))?;
    if jobs.is_empty() {
        bail!("no *.toml job files in {}", dir.display());
    }
    let batch: Vec<_> = jobs.iter().map(Job::to_correction_job).collect();
    let outcomes = correct_all(&batch);

    println!();
    println!(
        "  {:<28}  {:>10}  {:>5}  {:>10}  {:>18}",
        "job", "mode", "iter", "residual", "period"
    );
    println!("  {}", "─".repeat(80));

    let mut summaries = Vec::new();
    for (job, outcome) in jobs.iter().zip(&outcomes) {
        match &outcome.result {
            Ok(r) => {
                println!(
                    "  {:<28}  {:>10}  {:>5}  {:>10.2e}  {:>18.12}{}",
                    job.name,
                    job.corrector.mode.to_string(),
                    r.iterations,
                    r.residual_norm,
                    r.period,
                    if r.converged { "" } else { "  (not converged)" }
                );
                summaries.push(CorrectionSummary::new(
                    &job.name,
                    &job.system,
                    job.corrector.mode,
                    &job.state,
                    job.period,
                    r,
                ));
            }
            Err(e) => println!("  {:<28}  FAILED: {}", job.name, e),
        }
    }
    println!();

    if let Some(path) = json {
        write_summary_file(&path, &summaries)?;
        info!("wrote {} summaries to {}", summaries.len(), path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Libration points
// ---------------------------------------------------------------------------

fn print_lagrange(system: &Cr3bpSystem) {
    println!();
    println!("  {}", system);
    println!("  {}", "─".repeat(66));
    println!("  {:>3}  {:>18}  {:>18}  {:>18}", "", "x", "y", "C");
    for (i, p) in lagrange_points(system.mu).iter().enumerate() {
        let at_rest = SynodicState {
            pos: *p,
            vel: nalgebra::Vector3::zeros(),
        };
        println!(
            "  L{:<2}  {:>18.15}  {:>18.15}  {:>18.15}",
            i + 1,
            p.x,
            p.y,
            jacobi_constant(system.mu, &at_rest)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_corrector::config::ConfigError;

    fn correct_args(extra: &[&str]) -> anyhow::Result<Job> {
        let mut argv = vec![
            "halo-corrector",
            "correct",
            "--state",
            "1.154,0,-0.1384,0,-0.2149,0",
            "--period",
            "3.3731",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv)?.command {
            Command::Correct(args) => args.into_job(),
            _ => unreachable!("parsed a different subcommand"),
        }
    }

    fn config_error(extra: &[&str]) -> ConfigError {
        let err = correct_args(extra).unwrap_err();
        match err.downcast::<ConfigError>() {
            Ok(e) => e,
            Err(other) => panic!("expected a config error, got {}", other),
        }
    }

    #[test]
    fn inline_arguments_build_a_job() {
        let job = correct_args(&["--system", "earth-moon", "--mode", "fix-z"]).unwrap();
        assert_eq!(job.system.name, "earth-moon");
        assert_eq!(job.corrector.mode, CorrectionMode::FixZ);
        assert_eq!(job.period, 3.3731);
        assert_eq!(job.state.pos.z, -0.1384);
        assert_eq!(job.output.samples, DEFAULT_SAMPLES);
    }

    #[test]
    fn inline_arguments_are_validated_like_job_files() {
        assert!(matches!(
            config_error(&["--mu", "0.7"]),
            ConfigError::InvalidValue { field: "system.mu", .. }
        ));
        assert!(matches!(
            config_error(&["--mu", "0.01", "--tolerance", "0"]),
            ConfigError::InvalidValue { field: "corrector.tolerance", .. }
        ));
        assert!(matches!(
            config_error(&["--mu", "0.01", "--samples", "1"]),
            ConfigError::InvalidValue { field: "output.samples", .. }
        ));
        assert!(matches!(config_error(&[]), ConfigError::SystemSpec));
    }

    #[test]
    fn non_positive_period_is_rejected() {
        let argv = [
            "halo-corrector",
            "correct",
            "--mu",
            "0.01",
            "--state",
            "1.154,0,-0.1384,0,-0.2149,0",
            "--period=-1",
        ];
        let Command::Correct(args) = Cli::try_parse_from(argv).unwrap().command else {
            unreachable!("parsed a different subcommand")
        };
        let err = args.into_job().unwrap_err().downcast::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::InvalidValue { field: "guess.period", .. }));
    }
}
