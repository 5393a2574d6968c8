//! Engine configuration loaded from files, and its effect on evaluation

use std::io::Write;
use tempfile::NamedTempFile;
use tokflow_runtime::{
    Bundle, ConfigError, Engine, EngineConfig, ErrorKind, EvalError, Op, Token, pipe,
};
use tracing_subscriber::EnvFilter;

// RUST_LOG=tokflow_runtime=trace shows every application
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    init_tracing();
    let file = config_file("max_depth = 32\nstrict_access = true\n");
    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        EngineConfig::new().with_max_depth(32).with_strict_access(true)
    );
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_bad_toml_reports_parse_error() {
    let file = config_file("max_depth = \"deep\"");
    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("Failed to parse config"));
}

#[test]
fn test_depth_limit_from_file_aborts_run() {
    init_tracing();
    let file = config_file("max_depth = 2");
    let engine = Engine::with_config(EngineConfig::load(file.path()).unwrap());

    let nested = Op::transform(Op::transform(Op::identity()));
    let result = engine.run(&nested, [Token::int(1)]);
    assert_eq!(result, Err(EvalError::DepthExceeded { limit: 2 }));

    let flat = pipe![Op::reverse(), Op::reverse()];
    assert_eq!(
        engine.run(&flat, [Token::int(1), Token::int(2)]).unwrap(),
        Bundle::new(vec![Token::int(1), Token::int(2)])
    );
}

#[test]
fn test_strict_access_from_file() {
    let file = config_file("strict_access = true");
    let engine = Engine::with_config(EngineConfig::load(file.path()).unwrap());
    let out = engine.run(&Op::get(5), [Token::int(1)]).unwrap();
    let err = out.single().and_then(Token::as_error).unwrap();
    assert_eq!(err.kind, ErrorKind::IndexOutOfRange);

    let tolerant = Engine::new();
    assert_eq!(
        tolerant.run(&Op::get(5), [Token::int(1)]).unwrap(),
        Bundle::nothing()
    );
}
