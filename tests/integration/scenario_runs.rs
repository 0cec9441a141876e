//! End-to-end scenario runs driven from a TOML file.

use syncbench::config::{AppConfig, OutputFormat};
use syncbench::report::run_all;

fn temp_config(contents: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("syncbench_it_config_{}.toml", uuid::Uuid::new_v4()));
    let path = p.to_string_lossy().to_string();
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_run_from_config_file() {
    let path = temp_config(
        r#"
[simulation]
repetitions = 100
sample_length = 500

[output]
format = "json"

[[scenarios]]
name = "three-store"
probabilities = [0.1, 0.2, 0.3]

[[scenarios]]
name = "pair"
probabilities = [0.5, 0.5]
"#,
    );

    let cfg = AppConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(cfg.output.format, OutputFormat::Json);

    let run = run_all(&cfg).unwrap();
    assert_eq!(run.scenarios.len(), 2);

    let three = &run.scenarios[0];
    assert!(three.error().unwrap() < 0.02, "error {:?}", three.error());
    assert!(three.three_store_closed_form.is_some());

    // 0.25 / 0.75
    let pair = &run.scenarios[1];
    assert!((pair.exact.unwrap() - 1.0 / 3.0).abs() < 1e-12);

    let text = run.render_text(3, false);
    assert!(text.starts_with("three-store: 0.1"), "{text}");
    assert!(text.contains("\npair: 0.3"), "{text}");
}

#[test]
fn test_invalid_config_file_rejected() {
    let path = temp_config("[[scenarios]]\nname = \"x\"\nprobabilities = [1.5, 0.2]\n");
    let result = AppConfig::load(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
