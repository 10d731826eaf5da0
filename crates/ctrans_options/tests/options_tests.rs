//! Config file parsing tests.

use ctrans_options::{parse_config, parse_config_file, ConfigError, OutputTarget};

#[test]
fn test_parse_full_config() {
    let config = parse_config(
        r#"{
            "compilerOptions": {
                "target": "mips",
                "outFile": "build/out.s",
                "indent": "    ",
                "emitTrailer": false,
                "verbosity": 2
            },
            "files": ["main.c"]
        }"#,
    )
    .unwrap();
    let options = config.compiler_options.unwrap();
    assert_eq!(options.target(), OutputTarget::Mips);
    assert_eq!(options.out_file.as_deref(), Some("build/out.s"));
    assert_eq!(options.indent(), "    ");
    assert!(!options.emit_trailer());
    assert_eq!(options.verbosity(), 2);
    assert_eq!(config.files, Some(vec!["main.c".to_string()]));
}

#[test]
fn test_parse_empty_config() {
    let config = parse_config("{}").unwrap();
    assert!(config.compiler_options.is_none());
    assert!(config.files.is_none());
}

#[test]
fn test_python_target() {
    let config = parse_config(r#"{ "compilerOptions": { "target": "python" } }"#).unwrap();
    assert_eq!(config.compiler_options.unwrap().target(), OutputTarget::Python);
}

#[test]
fn test_unknown_option_is_rejected() {
    let err = parse_config(r#"{ "compilerOptions": { "optimize": true } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_unknown_target_is_rejected() {
    assert!(parse_config(r#"{ "compilerOptions": { "target": "x86" } }"#).is_err());
}

#[test]
fn test_missing_file() {
    let err = parse_config_file("/nonexistent/ctrans.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().starts_with("cannot read /nonexistent/ctrans.json"));
}
