//! Integration tests for pass-env

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn pass_env() -> Command {
        cargo_bin_cmd!("pass-env")
    }

    #[test]
    fn help_displays() {
        pass_env()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("NAME=PASS_NAME"));
    }

    #[test]
    fn version_displays() {
        pass_env()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pass-env"));
    }

    #[test]
    fn config_path_honors_flag() {
        pass_env()
            .args(["--config", "/tmp/pass-env-test/config.toml", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/tmp/pass-env-test/config.toml"));
    }

    #[test]
    fn cache_key_is_order_independent() {
        let first = pass_env()
            .args(["cache", "key", "A=x/a", "B=y/b"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let second = pass_env()
            .args(["cache", "key", "B=y/b", "A=x/a"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap().trim().len(), 64);
    }

    #[test]
    fn cache_key_rejects_bad_pair() {
        pass_env()
            .args(["cache", "key", "NOPE"])
            .assert()
            .code(128)
            .stderr(predicate::str::contains("Invalid env pair"));
    }

    #[test]
    fn help_explains_env_options_need_exec() {
        pass_env()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("only accepted after `exec`"))
            .stdout(predicate::str::contains("pass-env exec -i"));
    }

    #[test]
    fn unknown_subcommand_flag_fails() {
        pass_env().args(["cache", "--bogus"]).assert().failure();
    }
}

#[cfg(unix)]
mod store_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const FAKE_PASS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/support/fake-pass.sh");

    /// Primary store, state directory and config pointing at the fake pass
    struct Env {
        dir: TempDir,
    }

    impl Env {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let env = Self { dir };

            fs::create_dir_all(env.primary()).unwrap();
            fs::write(env.primary().join(".gpg-id"), "me@example.com\n").unwrap();
            env.put("services/api-key", "abc123\n");
            env.put("prod/db", "xyz789\nsecond line\n");

            fs::write(
                env.config(),
                format!("[vault]\nprogram = \"sh\"\nargs = [\"{}\"]\n", FAKE_PASS),
            )
            .unwrap();
            env
        }

        fn primary(&self) -> PathBuf {
            self.dir.path().join("password-store")
        }

        fn state(&self) -> PathBuf {
            self.dir.path().join("state")
        }

        fn config(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn put(&self, name: &str, value: &str) {
            let file = self.primary().join(format!("{}.gpg", name));
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, value).unwrap();
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("pass-env");
            cmd.arg("--config")
                .arg(self.config())
                .arg("--state-dir")
                .arg(self.state())
                .env_remove("PASSWORD_STORE_DIR")
                .env_remove("PASS_ENV_CONFIG")
                .env_remove("PASS_ENV_STATE_DIR");
            cmd
        }

        fn init(&self) -> &Self {
            self.cmd()
                .args(["init", "--pass-store"])
                .arg(self.primary())
                .assert()
                .success()
                .stdout(predicate::str::contains("Initialized pass-env"));
            self
        }

        fn cache_entries(&self) -> usize {
            count_entries(&self.state().join("store"))
        }
    }

    fn count_entries(dir: &Path) -> usize {
        let Ok(read) = fs::read_dir(dir) else {
            return 0;
        };
        read.filter_map(Result::ok)
            .map(|e| e.path())
            .map(|p| {
                if p.is_dir() {
                    count_entries(&p)
                } else {
                    usize::from(p.extension().is_some_and(|e| e == "gpg"))
                }
            })
            .sum()
    }

    const ECHO_API_KEY: [&str; 3] = ["sh", "-c", "printf '%s' \"$API_KEY\""];

    #[test]
    fn exec_requires_init() {
        let env = Env::new();
        env.cmd()
            .args(["API_KEY=services/api-key", "true"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not initialized"))
            .stderr(predicate::str::contains("pass-env init"));
    }

    #[test]
    fn init_creates_state() {
        let env = Env::new();
        env.init();

        assert!(env.state().join("store").join(".gpg-id").is_file());
        assert!(env.state().join("store.index").is_file());
        assert_eq!(
            fs::read_link(env.state().join(".pass-store")).unwrap(),
            env.primary()
        );
    }

    #[test]
    fn init_twice_fails() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["init", "--pass-store"])
            .arg(env.primary())
            .assert()
            .failure()
            .stderr(predicate::str::contains("already initialized"));
    }

    #[test]
    fn exec_injects_secret() {
        let env = Env::new();
        env.init();

        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("abc123");
        assert_eq!(env.cache_entries(), 1);
    }

    #[test]
    fn exec_keeps_first_line_only() {
        let env = Env::new();
        env.init();

        env.cmd()
            .args(["exec", "DB=prod/db", "sh", "-c", "printf '%s' \"$DB\""])
            .assert()
            .success()
            .stdout("xyz789");
    }

    #[test]
    fn cached_value_survives_rotation_until_cleared() {
        let env = Env::new();
        env.init();
        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success();

        env.put("services/api-key", "rotated\n");
        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("abc123");

        env.cmd()
            .args(["cache", "clear", "services/api-key"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 1 cache entries for: services/api-key"));
        assert_eq!(env.cache_entries(), 0);

        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("rotated");
    }

    #[test]
    fn clear_without_dependents() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["cache", "clear", "nothing/here"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache entries found"));
    }

    #[test]
    fn no_cache_leaves_store_empty() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["exec", "--no-cache", "API_KEY=services/api-key"])
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("abc123");
        assert_eq!(env.cache_entries(), 0);
    }

    #[test]
    fn missing_secret_exits_129() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["API_KEY=services/api-key", "MISSING=nope/missing", "true"])
            .assert()
            .code(129)
            .stderr(predicate::str::contains("nope/missing"));
        assert_eq!(env.cache_entries(), 0);
    }

    #[test]
    fn missing_command_exits_128() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["exec", "API_KEY=services/api-key"])
            .assert()
            .code(128)
            .stderr(predicate::str::contains("no command provided"));
    }

    #[test]
    fn child_exit_status_is_forwarded() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["API_KEY=services/api-key", "sh", "-c", "exit 42"])
            .assert()
            .code(42);
    }

    #[test]
    fn env_options_pass_through() {
        let env = Env::new();
        env.init();
        env.cmd()
            .env("LEAKED", "yes")
            .args(["exec", "-i", "API_KEY=services/api-key", "/bin/sh", "-c"])
            .arg("printf '%s:%s' \"$API_KEY\" \"${LEAKED:-none}\"")
            .assert()
            .success()
            .stdout("abc123:none");
    }

    #[test]
    fn alias_expands_in_exec() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["alias", "api", "API_KEY=services/api-key"])
            .assert()
            .success();
        env.cmd()
            .args(["alias"])
            .assert()
            .success()
            .stdout(predicate::str::contains("API_KEY=services/api-key"));

        env.cmd()
            .arg("api")
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("abc123");
    }

    #[test]
    fn alias_named_like_command_is_not_consumed_after_pair() {
        let env = Env::new();
        env.init();
        env.cmd()
            .args(["alias", "sh", "MISSING=nope/missing"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Warning:"));

        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success()
            .stdout("abc123");
    }

    #[test]
    fn cache_index_and_show() {
        let env = Env::new();
        env.init();
        env.cmd()
            .arg("API_KEY=services/api-key")
            .args(ECHO_API_KEY)
            .assert()
            .success();

        let key = env
            .cmd()
            .args(["cache", "key", "API_KEY=services/api-key"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let key = String::from_utf8(key).unwrap().trim().to_string();

        env.cmd()
            .args(["cache", "index", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("services/api-key {}", key)));

        env.cmd()
            .args(["cache", "show", &key])
            .assert()
            .success()
            .stdout(predicate::str::contains("API_KEY=abc123"));
    }
}
