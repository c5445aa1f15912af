use crate::helpers::cli_runner::CliRunner;
use crate::helpers::temp_files::TempFileManager;

use serde_json::Value;

fn cfg_json(res: &crate::helpers::cli_runner::CliResult) -> Value {
    assert_eq!(res.exit_code, 0, "stderr={}", res.stderr);
    serde_json::from_str(&res.stdout).expect("cfg prints JSON")
}

#[test]
fn defaults_come_from_the_engine() {
    let json = cfg_json(&CliRunner::new().run(&["cfg"]));
    assert_eq!(json["ante"]["value"], 1);
    assert_eq!(json["starting_stack"]["value"], 2);
    assert_eq!(json["bet_size"]["value"], 1);
    assert!(json["seed"]["value"].is_null());
    assert_eq!(json["ai"]["value"], "baseline");
    for key in ["ante", "starting_stack", "bet_size", "seed", "ai"] {
        assert_eq!(json[key]["source"], "default", "{key}");
    }
}

#[test]
fn env_overrides_file_overrides_default() {
    let tfm = TempFileManager::new();
    let cfg_path = tfm.create_file("kuhn.toml", "seed = 456\nbet_size = 2\nstarting_stack = 5\n");
    let cfg_path = cfg_path.to_string_lossy().into_owned();

    let json = cfg_json(&CliRunner::new().run_with_env(
        &["cfg"],
        &[("KUHN_CONFIG", &cfg_path), ("KUHN_SEED", "7")],
    ));
    assert_eq!(json["seed"]["value"], 7);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["bet_size"]["value"], 2);
    assert_eq!(json["bet_size"]["source"], "file");
    assert_eq!(json["ante"]["source"], "default");
}

#[test]
fn flag_seed_beats_env_seed() {
    let cli = CliRunner::new();
    let res = cli.run_with_env(&["deal", "--seed", "3"], &[("KUHN_SEED", "99")]);
    assert!(res.stdout.contains("Seed: 3"), "{}", res.stdout);

    let res = cli.run_with_env(&["deal"], &[("KUHN_SEED", "99")]);
    assert!(res.stdout.contains("Seed: 99"), "{}", res.stdout);
}

#[test]
fn invalid_config_fails_every_command() {
    let cli = CliRunner::new();
    for args in [&["cfg"][..], &["deal"][..], &["sim", "--hands", "1"][..]] {
        let res = cli.run_with_env(args, &[("KUHN_BET_SIZE", "0")]);
        assert_eq!(res.exit_code, 2, "{args:?}");
        assert!(res.stderr.contains("Configuration error"), "{}", res.stderr);
    }
}

#[test]
fn malformed_file_is_reported() {
    let tfm = TempFileManager::new();
    let cfg_path = tfm.create_file("broken.toml", "seed = \"not a number\"\n");
    let res = CliRunner::new().run_with_env(
        &["cfg"],
        &[("KUHN_CONFIG", cfg_path.to_string_lossy().as_ref())],
    );
    assert_eq!(res.exit_code, 2);
    assert!(res.stderr.contains("cannot parse config file"), "{}", res.stderr);
}
