use indoc::indoc;
use similar_asserts::assert_eq;
use uptest::e2e::{E2eError, synthesize};

use super::Workspace;

const BUCKET: &str = indoc! {"
    apiVersion: s3.aws.upbound.io/v1beta1
    kind: Bucket
    metadata:
      name: example-bucket
      annotations:
        meta.upbound.io/example-id: s3/v1beta1/bucket
        uptest.upbound.io/pre-assert-hook: ../hooks/check-bucket.sh
        uptest.upbound.io/conditions: Ready,Synced
    spec:
      forProvider:
        region: ${data.region}
"};

const POLICY: &str = indoc! {"
    apiVersion: s3.aws.upbound.io/v1beta1
    kind: BucketPolicy
    metadata:
      name: example-policy
      annotations:
        uptest.upbound.io/timeout: '60'
    spec:
      forProvider:
        bucketRef:
          name: example-bucket
    ---
    apiVersion: v1
    kind: Secret
    metadata:
      name: example-creds
      namespace: upbound-system
    type: Opaque
"};

const MANUAL: &str = indoc! {"
    apiVersion: route53.aws.upbound.io/v1beta1
    kind: Zone
    metadata:
      name: example-zone
      annotations:
        upjet.upbound.io/manual-intervention: requires a registered domain
"};

#[test]
fn synthesizes_case_from_manifest_files() {
    let workspace = Workspace::new();
    let bucket = workspace.write("examples/s3/bucket.yaml", BUCKET);
    let policy = workspace.write("examples/s3/policy.yaml", POLICY);
    let zone = workspace.write("examples/route53/zone.yaml", MANUAL);
    let data_source = workspace.write("datasource.yaml", "region: eu-central-1\n");

    let mut options = workspace.options(vec![bucket, policy, zone]);
    options.data_source_path = Some(data_source);

    let synthesis = synthesize(&options).unwrap();

    assert_eq!(synthesis.timeout_seconds, 60);
    assert_eq!(synthesis.skipped.len(), 1);
    assert_eq!(synthesis.skipped[0].resource.name, "example-zone");
    assert_eq!(synthesis.skipped[0].reason, "requires a registered domain");
    assert_eq!(synthesis.inputs.len(), 1);
    assert_eq!(
        synthesis.inputs[0].to_string(),
        "secret./example-creds in namespace upbound-system"
    );

    let apply = synthesis.case.get("00-apply.yaml").unwrap();
    assert!(apply.contains("region: eu-central-1\n"), "{apply}");
    assert!(apply.contains("name: example-creds\n"));
    assert!(!apply.contains("example-zone"));

    let hook = workspace.path().join("examples/hooks/check-bucket.sh");
    let assert_apply = synthesis.case.get("00-assert.yaml").unwrap();
    assert!(assert_apply.contains("\ntimeout: 60\n"));
    assert!(assert_apply.contains(&format!("- script: if [ -f {} ]", hook.display())));
    assert!(assert_apply.contains(
        "- command: ${KUBECTL} wait bucket.s3.aws.upbound.io/example-bucket --for=condition=Synced --timeout 10s\n"
    ));
    assert!(assert_apply.contains(
        "- command: ${KUBECTL} wait bucketpolicy.s3.aws.upbound.io/example-policy --for=condition=Ready --timeout 60s\n"
    ));
    assert!(!assert_apply.contains("example-creds"));

    // The bucket is the root of the example, so only it is imported.
    let import = synthesis.case.get("02-import.yaml").unwrap();
    assert!(import.contains("bucket.s3.aws.upbound.io/example-bucket"));
    assert!(!import.contains("example-policy"));

    let delete = synthesis.case.get("03-delete.yaml").unwrap();
    let policy_at = delete
        .find("delete bucketpolicy.s3.aws.upbound.io/example-policy")
        .unwrap();
    let bucket_at = delete
        .find("delete bucket.s3.aws.upbound.io/example-bucket")
        .unwrap();
    assert!(policy_at < bucket_at);
}

#[test]
fn only_skipped_resources_is_a_config_error() {
    let workspace = Workspace::new();
    let zone = workspace.write("zone.yaml", MANUAL);

    let error = synthesize(&workspace.options(vec![zone])).unwrap_err();
    assert!(matches!(error, E2eError::Plan { .. }), "{error}");
    assert_eq!(error.to_string(), "cannot build test plan: no resources to test");
    assert_eq!(error.exit_code(), exitcode::CONFIG);
}

#[test]
fn invalid_annotation_names_the_resource() {
    let workspace = Workspace::new();
    let bucket = workspace.write(
        "bucket.yaml",
        &BUCKET.replace("conditions: Ready,Synced", "timeout: abc"),
    );

    let error = synthesize(&workspace.options(vec![bucket])).unwrap_err();
    assert!(matches!(error, E2eError::Extract { .. }), "{error}");
    assert!(
        error.to_string().starts_with(
            r#"cannot build test plan: resource bucket.s3.aws.upbound.io/example-bucket: timeout value "abc" is not valid"#
        ),
        "{error}"
    );
    assert_eq!(error.exit_code(), exitcode::CONFIG);
}

#[test]
fn missing_manifest_is_a_config_error() {
    let workspace = Workspace::new();
    let missing = workspace.path().join("missing.yaml");
    let error = synthesize(&workspace.options(vec![missing])).unwrap_err();
    assert!(matches!(error, E2eError::Prepare { .. }), "{error}");
    assert_eq!(error.exit_code(), exitcode::CONFIG);
}

#[test]
fn synthesis_does_not_touch_test_directory() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);

    synthesize(&workspace.options(vec![bucket])).unwrap();
    assert!(!workspace.test_directory().exists());
}

#[test]
fn skip_flags_omit_phases() {
    let workspace = Workspace::new();
    let bucket = workspace.write("bucket.yaml", BUCKET);
    let mut options = workspace.options(vec![bucket]);
    options.plan.skip_update = true;
    options.plan.skip_delete = true;

    let synthesis = synthesize(&options).unwrap();
    assert_eq!(
        synthesis.case.file_names().collect::<Vec<_>>(),
        ["00-apply.yaml", "00-assert.yaml", "02-import.yaml", "02-assert.yaml"]
    );
}
