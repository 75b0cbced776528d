//! The `render` command.

use cse_manifest::test_utils::SAMPLE_TOKEN;
use predicates::prelude::*;
use serde::Deserialize;

use crate::common::TestSite;

fn documents(yaml: &str) -> Vec<serde_yaml::Value> {
    serde_yaml::Deserializer::from_str(yaml)
        .map(|doc| serde_yaml::Value::deserialize(doc).unwrap())
        .filter(|doc| !doc.is_null())
        .collect()
}

#[test]
fn test_render_encoded_manifest() {
    let site = TestSite::new();
    let output = site.render(&[]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let encoded = stdout.trim_end();
    assert!(!encoded.contains('\n'));
    assert!(encoded.contains("\\n---\\n"));

    // Quoting the body yields a JSON string holding the YAML
    let yaml: String = serde_json::from_str(&format!("\"{encoded}\"")).unwrap();
    let docs = documents(&yaml);
    assert_eq!(docs.len(), 11);
    assert_eq!(docs[0]["metadata"]["name"].as_str(), Some("demo-workers"));
}

#[test]
fn test_render_yaml() {
    let site = TestSite::new();
    let output = site.render(&["--yaml"]).output().unwrap();
    assert!(output.status.success());

    let yaml = String::from_utf8(output.stdout).unwrap();
    let kinds: Vec<String> = documents(&yaml)
        .iter()
        .map(|doc| doc["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds.iter().filter(|k| *k == "MachineDeployment").count(), 2);
    assert!(kinds.contains(&"KubeadmControlPlane".to_string()));
    assert_eq!(kinds.last().map(String::as_str), Some("KubeadmControlPlane"));
}

#[test]
fn test_render_payload_to_file() {
    let site = TestSite::new();
    let out = site.file("entity.json");
    site.render(&["--payload", "-o", &out.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Wrote"));

    let entity: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(entity["kind"], "CAPVCDCluster");
    assert_eq!(entity["name"], "demo");
    assert_eq!(entity["spec"]["vcdKe"]["secure"]["apiToken"], SAMPLE_TOKEN);
    assert_eq!(entity["spec"]["vcdKe"]["defaultStorageClassOptions"]["filesystem"], "xfs");
    assert_eq!(entity["spec"]["vcdKe"]["defaultStorageClassOptions"]["useDeleteReclaimPolicy"], false);
    assert!(!entity["spec"]["capiYaml"].as_str().unwrap().contains("kind: MachineHealthCheck"));
}

#[test]
fn test_render_with_health_check() {
    let site = TestSite::new();
    site.extend_cluster("node_health_check = true");

    let output = site.render(&["--yaml"]).output().unwrap();
    assert!(output.status.success());
    let yaml = String::from_utf8(output.stdout).unwrap();
    assert!(yaml.contains("kind: MachineHealthCheck"));
    assert!(yaml.contains("maxUnhealthy: \"100%\""));
}

#[test]
fn test_render_with_token_file() {
    let site = TestSite::new();
    let token = site.write(
        "token.json",
        r#"{"token_type": "API Token", "refresh_token": "file-token"}"#,
    );

    let output = site
        .render(&["--payload", "--token-file", &token.to_string_lossy()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let entity: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entity["spec"]["vcdKe"]["secure"]["apiToken"], "file-token");
}

#[test]
fn test_render_rejects_bad_token_file() {
    let site = TestSite::new();
    let token = site.write(
        "token.json",
        r#"{"token_type": "Bearer", "refresh_token": "file-token"}"#,
    );

    site.render(&["--token-file", &token.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not resolve credentials"))
        .stderr(predicate::str::contains("Bearer"));
}

#[test]
fn test_render_reports_invalid_settings() {
    let site = TestSite::new();
    site.write(
        "cluster.toml",
        &cse_manifest::test_utils::CLUSTER_TOML.replace("machine_count = 3", "machine_count = 2"),
    );

    site.render(&[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("control_plane.machine_count"))
        .stderr(predicate::str::contains("must be an odd number"));
}

#[test]
fn test_render_reports_unknown_template() {
    let site = TestSite::new();
    site.write(
        "cluster.toml",
        &cse_manifest::test_utils::CLUSTER_TOML
            .replace("urn:vcloud:vapptemplate:1", "urn:vcloud:vapptemplate:404"),
    );

    site.render(&[])
        .assert()
        .failure()
        .stderr(predicate::str::contains("urn:vcloud:vapptemplate:404"));
}

#[test]
fn test_render_config_defaults_fill_cidrs() {
    let site = TestSite::new();
    site.write("config.toml", "[defaults]\npod_cidr = \"192.168.0.0/16\"\n");

    site.render(&["--yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192.168.0.0/16"));
}
