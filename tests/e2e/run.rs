#![cfg(unix)]

use std::{fs, os::unix::fs::PermissionsExt, path::Path};

use kuttl_test_framework::{Framework, Interface};
use uptest::e2e::{E2eError, run};

use super::Workspace;

const BUCKET: &str = "apiVersion: s3.aws.upbound.io/v1beta1\nkind: Bucket\nmetadata:\n  name: example-bucket\n";

/// A stand-in for kuttl that records its arguments and the case it was
/// given, then exits with `code`.
fn fake_kuttl(workspace: &Workspace, code: i32) -> Framework {
    let record = workspace.path().join("record");
    let script = workspace.write(
        "bin/kuttl",
        &format!(
            "#!/bin/sh\n{{ echo \"$KUBECTL $*\"; ls \"$4/case\"; }} > '{}'\nexit {code}\n",
            record.display()
        ),
    );
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    Framework::new(Interface {
        kuttl_command: script.display().to_string(),
        kubectl_command: "kubectl".to_owned(),
    })
}

fn record(workspace: &Workspace) -> String {
    fs::read_to_string(workspace.path().join("record")).unwrap()
}

#[tokio::test]
async fn passing_run_writes_case_and_cleans_up() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);
    let options = workspace.options(vec![bucket]);

    run(&options, &fake_kuttl(&workspace, 0)).await.unwrap();

    let test_directory = workspace.test_directory();
    assert_eq!(
        record(&workspace),
        format!(
            "kubectl test --start-kind=false --skip-cluster-delete {} --timeout 10\n\
             00-apply.yaml\n00-assert.yaml\n01-assert.yaml\n01-update.yaml\n\
             02-assert.yaml\n02-import.yaml\n03-assert.yaml\n03-delete.yaml\n",
            test_directory.display()
        )
    );
    assert!(!test_directory.exists());
}

#[tokio::test]
async fn failing_run_reports_exit_code() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);
    let options = workspace.options(vec![bucket]);

    let error = run(&options, &fake_kuttl(&workspace, 3)).await.unwrap_err();
    assert!(matches!(error, E2eError::Failed { code: Some(3) }), "{error}");
    assert_eq!(error.to_string(), "kuttl failed with exit code 3");
    assert_eq!(error.exit_code(), 1);
    assert!(!workspace.test_directory().join("case").exists());
}

#[tokio::test]
async fn stale_case_is_replaced_and_other_files_kept() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);
    let mut options = workspace.options(vec![bucket]);
    options.plan.skip_import = true;
    workspace.write("uptest-e2e/case/02-import.yaml", "stale");
    workspace.write("uptest-e2e/notes.txt", "keep me");

    run(&options, &fake_kuttl(&workspace, 0)).await.unwrap();

    assert!(!record(&workspace).contains("02-import.yaml"));
    let test_directory = workspace.test_directory();
    assert!(!test_directory.join("case").exists());
    assert_eq!(
        fs::read_to_string(test_directory.join("notes.txt")).unwrap(),
        "keep me"
    );
}

#[tokio::test]
async fn missing_executor_is_a_software_error() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);
    let options = workspace.options(vec![bucket]);
    let framework = Framework::new(Interface {
        kuttl_command: Path::new("/nonexistent/kubectl-kuttl").display().to_string(),
        kubectl_command: "kubectl".to_owned(),
    });

    let error = run(&options, &framework).await.unwrap_err();
    assert!(matches!(error, E2eError::Execute { .. }), "{error}");
    assert_eq!(error.exit_code(), exitcode::SOFTWARE);
}
