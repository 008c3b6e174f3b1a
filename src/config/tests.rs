use std::io::Write;

use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.remote.base_url.is_none());
    assert!(settings.remote.credentials.is_none());
    assert_eq!(
        settings.remote.timeout,
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    );
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.remote.base_url = Some("https://file.example/wp-json".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = RemoteOverrides {
        base_url: Some("https://cli.example/wp-json".to_string()),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides).expect("overrides");
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.remote.base_url.expect("base url").host_str(),
        Some("cli.example")
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn password_file_is_read_and_trimmed() {
    let mut file = tempfile::NamedTempFile::new().expect("tmp file");
    file.write_all(b"abcd efgh ijkl\n").expect("write tmp");

    let mut raw = RawSettings::default();
    let overrides = RemoteOverrides {
        username: Some("editor".to_string()),
        application_password_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides).expect("overrides");
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.remote.credentials,
        Some(Credentials {
            username: "editor".to_string(),
            application_password: "abcd efgh ijkl".to_string(),
        })
    );
}

#[test]
fn missing_password_file_is_reported() {
    let mut raw = RawSettings::default();
    let overrides = RemoteOverrides {
        application_password_file: Some(PathBuf::from("/nonexistent/postblock-password")),
        ..Default::default()
    };

    let err = raw.apply_overrides(&overrides).expect_err("missing file");
    assert!(matches!(err, LoadError::File { .. }));
}

#[test]
fn username_without_password_is_rejected() {
    let mut raw = RawSettings::default();
    raw.remote.username = Some("editor".to_string());

    let err = Settings::from_raw(raw).expect_err("incomplete credentials");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "remote.username",
            ..
        }
    ));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.remote.timeout_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "remote.timeout_seconds",
            ..
        }
    ));
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.remote.base_url = Some("ftp://example.com".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_base_url_means_unset() {
    let mut raw = RawSettings::default();
    raw.remote.base_url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.remote.base_url.is_none());
}

#[test]
fn credentials_debug_hides_password() {
    let creds = Credentials {
        username: "editor".to_string(),
        application_password: "secret".to_string(),
    };
    let rendered = format!("{creds:?}");
    assert!(rendered.contains("editor"));
    assert!(!rendered.contains("secret"));
}

#[test]
fn parse_preview_arguments() {
    let args = CliArgs::parse_from([
        "postblock",
        "--base-url",
        "https://example.com/wp-json",
        "preview",
        "--categories",
        "5,7",
    ]);

    assert_eq!(
        args.overrides.base_url.as_deref(),
        Some("https://example.com/wp-json")
    );
    match args.command {
        Command::Preview(preview) => assert_eq!(
            preview.categories,
            vec![CategoryValue::Id(5), CategoryValue::Id(7)]
        ),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_edit_arguments() {
    let args = CliArgs::parse_from([
        "postblock",
        "edit",
        "--file",
        "block.json",
        "add",
        "bind:0:9",
        "mode:dynamic_gb",
        "select:all",
    ]);

    match args.command {
        Command::Edit(edit) => {
            assert_eq!(edit.file, PathBuf::from("block.json"));
            assert!(edit.output.is_none());
            assert_eq!(
                edit.actions,
                vec![
                    EditAction::Add,
                    EditAction::Bind {
                        index: 0,
                        media_id: 9
                    },
                    EditAction::Mode("dynamic_gb".to_string()),
                    EditAction::Select(CategoryValue::All),
                ]
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
