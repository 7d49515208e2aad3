use std::time::Duration;

use minit::config::Config;
use minit::supervisor::supervise;

// supervise() owns process-global state (signal handlers, waitpid on any
// child), so only one sequence may run at a time within this test binary.
static SUPERVISE_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn mk_cfg(pre: Option<&str>, main: &str, post: Option<&str>) -> Config {
    Config {
        pre_start: pre.map(String::from),
        main: main.to_string(),
        post_stop: post.map(String::from),
        grace: Duration::ZERO,
        env: Vec::new(),
    }
}

#[tokio::test]
async fn full_success_sequence_exits_zero() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(Some("/bin/true"), "/bin/true", Some("/bin/true"));
    assert_eq!(supervise(&cfg).await, 0);
}

#[tokio::test]
async fn main_alone_succeeding_exits_zero() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/bin/true", None);
    assert_eq!(supervise(&cfg).await, 0);
}

#[tokio::test]
async fn main_failure_exits_one() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/bin/false", None);
    assert_eq!(supervise(&cfg).await, 1);
}

#[tokio::test]
async fn true_false_true_scenario_exits_one() {
    // all three phases run; main's failure decides the code
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(Some("/bin/true"), "/bin/false", Some("/bin/true"));
    assert_eq!(supervise(&cfg).await, 1);
}

#[tokio::test]
async fn pre_failure_skips_main_and_post() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let main_marker = dir.path().join("main-ran");
    let post_marker = dir.path().join("post-ran");

    let cfg = mk_cfg(
        Some("/bin/false"),
        &format!("/usr/bin/touch {}", main_marker.display()),
        Some(&format!("/usr/bin/touch {}", post_marker.display())),
    );
    assert_eq!(supervise(&cfg).await, 1);
    assert!(!main_marker.exists());
    assert!(!post_marker.exists());
}

#[tokio::test]
async fn post_still_runs_after_main_failure() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("post-ran");

    let cfg = mk_cfg(
        None,
        "/bin/false",
        Some(&format!("/usr/bin/touch {}", marker.display())),
    );
    assert_eq!(supervise(&cfg).await, 1);
    assert!(marker.exists());
}

#[tokio::test]
async fn post_failure_overrides_main_success() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/bin/true", Some("/bin/false"));
    assert_eq!(supervise(&cfg).await, 1);
}

#[tokio::test]
async fn missing_executable_is_a_phase_failure() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/definitely/not/here", None);
    assert_eq!(supervise(&cfg).await, 1);
}

#[tokio::test]
async fn arguments_are_split_on_whitespace() {
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/bin/sh -c exit", None);
    assert_eq!(supervise(&cfg).await, 0);
}

#[tokio::test]
async fn extra_env_reaches_the_child() {
    // printenv exits non-zero when the variable is absent
    let _guard = SUPERVISE_LOCK.lock().await;
    let mut cfg = mk_cfg(None, "/usr/bin/printenv MINIT_TEST_MARKER", None);
    cfg.env = vec![("MINIT_TEST_MARKER".to_string(), "1".to_string())];
    assert_eq!(supervise(&cfg).await, 0);
}

#[tokio::test]
async fn supervisor_environment_is_preserved() {
    // PATH comes from the supervisor's own environment, not the extras
    let _guard = SUPERVISE_LOCK.lock().await;
    let cfg = mk_cfg(None, "/usr/bin/printenv PATH", None);
    assert_eq!(supervise(&cfg).await, 0);
}

#[test]
fn empty_main_never_reaches_the_core() {
    let cfg = mk_cfg(None, "  ", None);
    assert!(cfg.validate().is_err());
}
