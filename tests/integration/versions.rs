//! The `versions` command.

use cse_manifest::test_utils::SAMPLE_TEMPLATE;
use predicates::prelude::*;

use crate::common::TestSite;

#[test]
fn test_versions_text() {
    let site = TestSite::new();
    site.command()
        .args(["versions", SAMPLE_TEMPLATE])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.26.8+vmware.1"))
        .stdout(predicate::str::contains("v2.3.1"))
        .stdout(predicate::str::contains("v1.26.8---vmware.1-tkg.1"))
        .stdout(predicate::str::contains("v3.5.6_vmware.20"));
}

#[test]
fn test_versions_json() {
    let site = TestSite::new();
    let output = site
        .command()
        .args(["versions", &format!("{SAMPLE_TEMPLATE}.ova"), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let bundle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bundle["kubernetes_version"], "v1.26.8+vmware.1");
    assert_eq!(bundle["core_dns_version"], "v1.9.3_vmware.16");
}

#[test]
fn test_versions_rejects_photon() {
    let site = TestSite::new();
    site.command()
        .args(["versions", "photon-3-kube-v1.27.5+vmware.1-tkg.1-cac282289bb29b217b808a2b9b0c0c46"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("uses Photon"))
        .stderr(predicate::str::contains("Ubuntu"));
}

#[test]
fn test_versions_rejects_non_kubernetes_ova() {
    let site = TestSite::new();
    site.command()
        .args(["versions", "randomOVA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a Kubernetes template OVA"));
}

#[test]
fn test_versions_unknown_key_suggests_closest() {
    let site = TestSite::new();
    site.command()
        .args(["versions", "ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no known TKG combination"))
        .stderr(predicate::str::contains(
            "Did you mean a template built from 'v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8'",
        ));
}

#[test]
fn test_configured_compatibility_table_replaces_embedded() {
    let site = TestSite::new();
    let table = site.write(
        "tkg_versions.json",
        r#"{
  "v1.30.2+vmware.1-tkg.7-abcdef0123456789": {
    "tkg": "v9.9.9",
    "etcd": "v3.5.12_vmware.1",
    "coreDns": "v1.11.1_vmware.1"
  }
}"#,
    );
    site.write(
        "config.toml",
        &format!("compatibility_table = '{}'\n", table.display()),
    );

    site.command()
        .args(["versions", "ubuntu-2204-kube-v1.30.2+vmware.1-tkg.7-abcdef0123456789"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v9.9.9"))
        .stdout(predicate::str::contains("v1.30.2---vmware.1-tkg.7"));

    // The embedded table is no longer consulted
    site.command().args(["versions", SAMPLE_TEMPLATE]).assert().failure();
}

#[test]
fn test_invalid_compatibility_table_is_reported() {
    let site = TestSite::new();
    let table = site.write("tkg_versions.json", r#"{"1.30.2-tkg.7-abc": {"tkg": "x", "etcd": "y", "coreDns": "z"}}"#);
    let config = site.write("other.toml", &format!("compatibility_table = '{}'\n", table.display()));

    site.command()
        .arg("--config")
        .arg(&config)
        .args(["versions", SAMPLE_TEMPLATE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid compatibility table"))
        .stderr(predicate::str::contains("must start with 'v'"));
}
