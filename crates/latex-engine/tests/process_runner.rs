//! Tests that spawn real processes through `TokioProcessRunner`

#![cfg(unix)]

use std::time::{Duration, Instant};

use latex_engine::{
    BuildFailure, EngineConfig, Invocation, LatexCommand, LatexService, ProcessRunner,
    TokioProcessRunner,
};

fn sh(script: &str) -> Invocation {
    Invocation::new("sh").arg("-c").arg(script)
}

#[tokio::test]
async fn captures_both_streams_and_exit_code() {
    let output = TokioProcessRunner
        .run(&sh("echo out; echo err 1>&2; exit 3"), Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(output.exit_code, Some(3));
    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
    assert!(!output.success());
}

#[tokio::test]
async fn runs_in_working_directory() {
    let dir = std::env::temp_dir();
    let output = TokioProcessRunner
        .run(&sh("pwd").current_dir(&dir), Duration::from_secs(10))
        .await
        .unwrap();

    let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
    assert_eq!(reported, std::fs::canonicalize(&dir).unwrap());
}

#[tokio::test]
async fn missing_program_is_spawn_failure() {
    let err = TokioProcessRunner
        .run(
            &Invocation::new("overtex-definitely-not-installed"),
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BuildFailure::Spawn { .. }));
}

#[tokio::test]
async fn slow_process_times_out() {
    let started = Instant::now();
    let err = TokioProcessRunner
        .run(&sh("sleep 5"), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, BuildFailure::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn timeout_keeps_output_written_before_kill() {
    let started = Instant::now();
    let err = TokioProcessRunner
        .run(
            &sh("echo 'Latexmk: applying rule pdflatex'; echo '! Emergency stop' 1>&2; sleep 5"),
            Duration::from_millis(500),
        )
        .await
        .unwrap_err();

    let partial = err.partial_output().expect("timeout carries partial output");
    assert_eq!(partial.exit_code, None);
    assert_eq!(partial.stdout, "Latexmk: applying rule pdflatex\n");
    assert_eq!(partial.stderr, "! Emergency stop\n");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn arguments_are_not_interpreted_by_a_shell() {
    let output = TokioProcessRunner
        .run(
            &Invocation::new("echo").arg("$(whoami) && `id` > /tmp/x"),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

    assert_eq!(output.stdout, "$(whoami) && `id` > /tmp/x\n");
}

/// Compiles a real document when latexmk is available; skipped otherwise.
#[tokio::test]
async fn builds_real_document_when_latexmk_installed() {
    let workspace = std::env::temp_dir().join(format!("overtex-it-{}", std::process::id()));
    let tex_dir = workspace.join("tex");
    std::fs::create_dir_all(&tex_dir).unwrap();
    std::fs::write(
        tex_dir.join("main.tex"),
        "\\documentclass{article}\\begin{document}Hello\\end{document}\n",
    )
    .unwrap();

    let service = LatexService::new(
        EngineConfig::new(&workspace).with_build_timeout(Duration::from_secs(120)),
    );
    if !service.check_installed(LatexCommand::Latexmk).await {
        eprintln!("Skipping: latexmk not installed");
        let _ = std::fs::remove_dir_all(&workspace);
        return;
    }

    let result = service
        .build("main.tex", "tex", LatexCommand::Latexmk)
        .await
        .unwrap();

    assert!(result.success, "build failed: {:?}", result);
    assert!(result.message.contains("success"));
    assert!(!result.logs.is_empty());
    let output_path = result.output_path.unwrap();
    assert!(output_path.ends_with("main.pdf"));
    assert!(std::path::Path::new(&output_path).exists());

    let _ = std::fs::remove_dir_all(&workspace);
}
